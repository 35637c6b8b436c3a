//! Request options and the normalized response type shared by every endpoint.

use bon::Builder;
/// HTTP method accepted by [`crate::Client::execute`].
pub use reqwest::Method;
use serde::de::DeserializeOwned;
/// Dynamically typed JSON: `Object | Array | String | Number | Bool | Null`.
pub use serde_json::{Map, Value};

use crate::Result;
use crate::error::NotJson;

/// Per-request transport options. None of these are sent to the API.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder)]
pub struct RequestOptions {
    /// Route the request to the sandbox environment instead of production.
    #[builder(default)]
    pub sandbox: bool,
    /// Verify the server's TLS certificate. Defaults to `true`.
    #[builder(default = true)]
    pub verify_tls: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RequestOptions {
    /// Production, with TLS verification.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Sandbox, with TLS verification.
    #[must_use]
    pub fn sandbox() -> Self {
        Self::builder().sandbox(true).build()
    }
}

/// A response body after the API envelope has been removed.
///
/// The API wraps payloads as `{"code": .., "message": .., "data": {..}}`. When a non-null
/// `data` member is present only its value is kept, otherwise the whole decoded document is.
/// Bodies that are not JSON at all are handed back verbatim as [`Response::Text`].
/// Any decodable document is [`Response::Json`], including `[]`, `0`, `false` and `null`.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Json(Value),
    Text(String),
}

impl Response {
    /// Normalizes a raw response body.
    #[must_use]
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(mut object)) => match object.remove("data") {
                Some(data) if !data.is_null() => Response::Json(data),
                Some(data) => {
                    object.insert("data".to_owned(), data);
                    Response::Json(Value::Object(object))
                }
                None => Response::Json(Value::Object(object)),
            },
            Ok(value) => Response::Json(value),
            Err(_) => Response::Text(body),
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Response::Json(value) => Some(value),
            Response::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Response::Json(_) => None,
            Response::Text(text) => Some(text),
        }
    }

    /// Looks up a member of a JSON object response.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json()?.get(key)
    }

    /// Converts into a [`Value`], turning raw text into a JSON string.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Response::Json(value) => value,
            Response::Text(text) => Value::String(text),
        }
    }

    /// Deserializes a JSON response into a typed structure. With the `tracing` feature,
    /// fields the type does not know about are logged.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::error::Kind::Internal`] if the response is not JSON or does not
    /// match `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Response::Json(value) => crate::serde_helpers::deserialize_with_warnings(value.clone()),
            Response::Text(_) => Err(NotJson.into()),
        }
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Response::Json(value)
    }
}
