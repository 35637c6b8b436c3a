use std::env;

use bon::Builder;
/// Secret string types that redact values in debug output for security.
pub use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::Result;
use crate::error::Error;

/// Environment variable consulted when no app id is given to [`crate::Client`].
pub const APP_ID_VAR: &str = "TIKTOK_APP_ID";

/// Environment variable consulted when no app secret is given to [`crate::Client`].
pub const SECRET_VAR: &str = "TIKTOK_SECRET";

/// App credentials issued by the TikTok for Business developer portal. They are appended to
/// the body of every request made by [`crate::Client`].
#[derive(Clone, Debug)]
pub struct Credentials {
    pub(crate) app_id: String,
    pub(crate) secret: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(app_id: String, secret: String) -> Self {
        Self {
            app_id,
            secret: SecretString::from(secret),
        }
    }

    /// Resolves each value that was not supplied from [`APP_ID_VAR`] / [`SECRET_VAR`].
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Configuration`] error if a value is neither supplied
    /// nor present in the environment.
    pub fn resolve(app_id: Option<String>, secret: Option<String>) -> Result<Self> {
        let app_id = match app_id {
            Some(app_id) => app_id,
            None => from_env(APP_ID_VAR)?,
        };
        let secret = match secret {
            Some(secret) => secret,
            None => from_env(SECRET_VAR)?,
        };

        Ok(Self::new(app_id, secret))
    }

    /// Reads both values from the environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, None)
    }

    /// Returns the app id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the app secret.
    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }
}

fn from_env(var: &str) -> Result<String> {
    env::var(var).map_err(|e| Error::configuration(format!("{var} could not be read: {e}")))
}

/// An advertiser account the caller acts on behalf of. The client only reads it.
///
/// # Example
///
/// ```
/// use tiktok_marketing_sdk::auth::Advertiser;
///
/// let advertiser = Advertiser::builder()
///     .advertiser_id("7001234567890123456")
///     .access_token("ad0c2f0d5e6b4a...")
///     .build();
/// ```
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct Advertiser {
    #[builder(into)]
    pub advertiser_id: String,
    #[builder(with = |token: impl Into<String>| SecretString::from(token.into()))]
    pub access_token: SecretString,
}

/// The result of exchanging an authorization code, see [`crate::Client::access_token`].
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: SecretString,
    #[serde(default)]
    pub advertiser_ids: Vec<String>,
    #[serde(default)]
    pub scope: Vec<i64>,
}

impl AccessToken {
    /// Builds an [`Advertiser`] for each advertiser this token was granted for.
    #[must_use]
    pub fn advertisers(&self) -> Vec<Advertiser> {
        self.advertiser_ids
            .iter()
            .map(|id| Advertiser {
                advertiser_id: id.clone(),
                access_token: self.access_token.clone(),
            })
            .collect()
    }
}
