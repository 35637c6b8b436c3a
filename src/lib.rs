#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod client;
pub mod error;
pub(crate) mod serde_helpers;
pub mod types;

pub use client::{Client, Config};
use reqwest::Request;

use crate::error::Error;
use crate::types::Response;

pub type Result<T> = std::result::Result<T, Error>;

/// Production base URL of the marketing API.
pub const BASE_URL: &str = "https://ads.tiktok.com/open_api/v1.2";

/// Sandbox base URL of the marketing API.
pub const SANDBOX_URL: &str = "https://sandbox-ads.tiktok.com/open_api/v1.2";

/// Sends `request` and normalizes the body into a [`Response`].
///
/// Transport failures and non-success statuses are returned as errors, no retries happen.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request(client: &reqwest::Client, request: Request) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let body = response.text().await?;
    let response = Response::from_body(body);

    #[cfg(feature = "tracing")]
    if let Response::Text(text) = &response {
        tracing::debug!(method = %method, path = %path, body = %text, "non-JSON response body");
    }

    Ok(response)
}
