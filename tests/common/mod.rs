#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(unused, reason = "Each test crate only uses part of the shared setup")]

use httpmock::MockServer;
use tiktok_marketing_sdk::auth::Advertiser;
use tiktok_marketing_sdk::{Client, Config};

pub const APP_ID: &str = "7100000000000000001";
pub const SECRET: &str = "0a1b2c3d4e5f60718293a4b5c6d7e8f9";

pub const ADVERTISER_ID: &str = "7000000000000000042";
pub const ACCESS_TOKEN: &str = "a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0";

pub const PAGE_ID: &str = "7200000000000000007";

/// Mount point of the API on the mock servers, mirroring the real base URLs.
pub const PREFIX: &str = "/open_api/v1.2";

#[must_use]
pub fn path(endpoint: &str) -> String {
    format!("{PREFIX}/{endpoint}")
}

/// Plain-HTTP URL of `endpoint` on `server`. The mock servers also accept TLS, and
/// `MockServer::url` hands out `https` URLs signed by a CA no client trusts.
#[must_use]
pub fn http_url(server: &MockServer, endpoint: &str) -> String {
    format!("http://{}{endpoint}", server.address())
}

#[must_use]
pub fn advertiser() -> Advertiser {
    Advertiser::builder()
        .advertiser_id(ADVERTISER_ID)
        .access_token(ACCESS_TOKEN)
        .build()
}

/// A client whose production base URL is `server` and whose sandbox base URL is `sandbox`.
pub fn client_with_sandbox(server: &MockServer, sandbox: &MockServer) -> Client {
    let config = Config::builder()
        .base_url(http_url(server, PREFIX))
        .sandbox_url(http_url(sandbox, PREFIX))
        .build();

    Client::builder()
        .app_id(APP_ID)
        .secret(SECRET)
        .config(config)
        .build()
        .unwrap()
}

/// A client with both base URLs pointing at `server`.
pub fn client(server: &MockServer) -> Client {
    client_with_sandbox(server, server)
}
