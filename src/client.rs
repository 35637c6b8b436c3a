//! Client for the TikTok for Business marketing API.
//!
//! ## Available Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `oauth2/access_token/` | POST | Exchange an authorization code for an access token |
//! | `subscription/subscribe/` | POST | Subscribe a callback URL to a lead form |
//! | `subscription/unsubscribe/` | POST | Remove a lead subscription |
//! | `subscription/get/` | GET | List lead subscriptions |
//! | `pages/get/` | GET | List lead-generation forms |
//! | `pages/leads/mock/create/` | POST | Create a test lead |
//! | `pages/leads/mock/delete/` | POST | Delete a test lead |
//! | `pages/leads/mock/get/` | GET | Fetch the test lead of a form |
//! | `pages/leads/task/` | GET | Start a lead export task |
//! | `pages/leads/task/download/` | GET | Download the result of a lead export task |
//!
//! # Example
//!
//! ```no_run
//! use tiktok_marketing_sdk::Client;
//! use tiktok_marketing_sdk::auth::Advertiser;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads TIKTOK_APP_ID and TIKTOK_SECRET
//! let client = Client::from_env()?;
//!
//! let advertiser = Advertiser::builder()
//!     .advertiser_id("7001234567890123456")
//!     .access_token("ad0c2f0d5e6b4a...")
//!     .build();
//!
//! let forms = client.forms(&advertiser, false, false).await?;
//! println!("{forms:?}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use bon::{Builder, bon};
use reqwest::{
    Client as ReqwestClient, Method, Request, RequestBuilder,
    header::{HeaderMap, HeaderValue},
};
use secrecy::ExposeSecret as _;
use serde_json::{Map, Value};
use url::Url;

use crate::auth::{Advertiser, Credentials};
use crate::error::{Error, Kind};
use crate::types::{RequestOptions, Response};
use crate::{BASE_URL, Result, SANDBOX_URL};

/// Fixed wait between starting a lead export task and downloading it. The task status is
/// never checked.
pub const LEAD_EXPORT_DELAY: Duration = Duration::from_secs(10);

const DEFAULT_USER_AGENT: &str = "tiktok_marketing_sdk";

const ACCESS_TOKEN_HEADER: &str = "Access-Token";

/// Configuration for [`Client`]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// Production base URL. Defaults to [`BASE_URL`]; override for testing.
    #[builder(into, default = BASE_URL.to_owned())]
    base_url: String,
    /// Sandbox base URL. Defaults to [`SANDBOX_URL`]; override for testing.
    #[builder(into, default = SANDBOX_URL.to_owned())]
    sandbox_url: String,
    /// Per-request timeout. Unset means the transport default (none).
    timeout: Option<Duration>,
    #[builder(into, default = DEFAULT_USER_AGENT.to_owned())]
    user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

#[derive(Debug)]
struct ClientInner {
    credentials: Credentials,
    /// Production base, without a trailing slash
    base_url: String,
    /// Sandbox base, without a trailing slash
    sandbox_url: String,
    client: ReqwestClient,
    /// Same as `client` but accepts any server certificate.
    unverified_client: ReqwestClient,
}

/// HTTP client for the TikTok marketing API.
///
/// Every request body carries the app id and secret the client was built with. Cloning is
/// cheap and clones share the underlying connection pools.
///
/// # Example
///
/// ```no_run
/// use tiktok_marketing_sdk::{Client, Config};
///
/// # fn example() -> tiktok_marketing_sdk::Result<()> {
/// // Explicit credentials
/// let client = Client::builder()
///     .app_id("my-app-id")
///     .secret("my-secret")
///     .build()?;
///
/// // Missing values fall back to TIKTOK_APP_ID / TIKTOK_SECRET
/// let client = Client::builder()
///     .app_id("my-app-id")
///     .config(Config::builder().user_agent("my-crm/1.0").build())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[bon]
impl Client {
    /// Builds a client. `app_id` and `secret` that are not set are read from
    /// [`crate::auth::APP_ID_VAR`] and [`crate::auth::SECRET_VAR`].
    ///
    /// # Errors
    ///
    /// Returns an error if a credential cannot be resolved, a base URL is invalid, or the HTTP
    /// client fails to build.
    #[builder]
    pub fn new(
        #[builder(into)] app_id: Option<String>,
        #[builder(into)] secret: Option<String>,
        #[builder(default)] config: Config,
    ) -> Result<Client> {
        let credentials = Credentials::resolve(app_id, secret)?;
        Self::with_credentials(credentials, &config)
    }

    /// Creates a client with credentials read from the environment.
    pub fn from_env() -> Result<Client> {
        Self::with_credentials(Credentials::from_env()?, &Config::default())
    }

    pub fn with_credentials(credentials: Credentials, config: &Config) -> Result<Client> {
        let base_url = normalize_base(&config.base_url)?;
        let sandbox_url = normalize_base(&config.sandbox_url)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                credentials,
                base_url,
                sandbox_url,
                client: http_client(config, true)?,
                unverified_client: http_client(config, false)?,
            }),
        })
    }

    /// Returns the app id sent with every request.
    #[must_use]
    pub fn app_id(&self) -> &str {
        self.inner.credentials.app_id()
    }

    /// Returns the base URL requests with the given options are sent to.
    #[must_use]
    pub fn base_url(&self, options: RequestOptions) -> &str {
        if options.sandbox {
            &self.inner.sandbox_url
        } else {
            &self.inner.base_url
        }
    }

    /// Sends `body` to `<base_url>/<path>` and unwraps the response envelope.
    ///
    /// `app_id` and `secret` are merged into `body`, replacing any value the caller set for
    /// those keys. When `body` has a string `access_token` it is also sent as the
    /// `Access-Token` header. GET requests carry the JSON body as well.
    ///
    /// # Errors
    ///
    /// Transport failures ([`crate::error::Kind::Transport`]) and non-success statuses
    /// ([`crate::error::Kind::Status`]) are returned unmodified; nothing is retried.
    /// A body that is not JSON is not an error, see [`Response::Text`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self, body, options),
            fields(sandbox = options.sandbox, verify_tls = options.verify_tls)
        )
    )]
    pub async fn execute(
        &self,
        path: &str,
        mut body: Map<String, Value>,
        method: Method,
        options: RequestOptions,
    ) -> Result<Response> {
        let credentials = &self.inner.credentials;
        body.insert("app_id".to_owned(), credentials.app_id().into());
        body.insert(
            "secret".to_owned(),
            credentials.secret().expose_secret().into(),
        );

        let url = Url::parse(&format!("{}/{path}", self.base_url(options)))?;
        let client = if options.verify_tls {
            &self.inner.client
        } else {
            &self.inner.unverified_client
        };

        let mut builder = client.request(method, url).json(&body);
        if let Some(Value::String(token)) = body.get("access_token") {
            builder = builder.header(ACCESS_TOKEN_HEADER, HeaderValue::from_str(token)?);
        }
        let request = build_request(builder)?;

        crate::request(client, request).await
    }

    async fn post(&self, path: &str, body: Map<String, Value>) -> Result<Response> {
        self.execute(path, body, Method::POST, RequestOptions::default())
            .await
    }

    async fn get(&self, path: &str, body: Map<String, Value>) -> Result<Response> {
        self.execute(path, body, Method::GET, RequestOptions::default())
            .await
    }

    /// Exchanges the `auth_code` handed to the redirect URL for an access token. Use
    /// [`Response::parse`] with [`crate::auth::AccessToken`] for a typed view.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::error::Kind::Configuration`] without sending anything if
    /// `auth_code` is empty.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tiktok_marketing_sdk::Client;
    /// use tiktok_marketing_sdk::auth::AccessToken;
    ///
    /// # async fn example(auth_code: &str) -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::from_env()?;
    /// let token: AccessToken = client.access_token(auth_code).await?.parse()?;
    ///
    /// for advertiser in token.advertisers() {
    ///     println!("authorized for {}", advertiser.advertiser_id);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn access_token(&self, auth_code: &str) -> Result<Response> {
        if auth_code.is_empty() {
            return Err(Error::configuration(
                "auth_code missing, was the authorization flow completed?",
            ));
        }

        let mut body = Map::new();
        body.insert("auth_code".to_owned(), auth_code.into());

        self.post("oauth2/access_token/", body).await
    }

    /// Subscribes `callback_url` to new leads of the form `form_id`.
    pub async fn subscribe_to_leads(
        &self,
        advertiser: &Advertiser,
        form_id: &str,
        callback_url: &str,
    ) -> Result<Response> {
        let mut detail = scoped(advertiser);
        detail.insert("page_id".to_owned(), form_id.into());

        let mut body = Map::new();
        body.insert("subscription_detail".to_owned(), Value::Object(detail));
        body.insert("object".to_owned(), "LEAD".into());
        body.insert("url".to_owned(), callback_url.into());

        self.post("subscription/subscribe/", body).await
    }

    pub async fn unsubscribe_to_leads(&self, subscription_id: &str) -> Result<Response> {
        let mut body = Map::new();
        body.insert("subscription_id".to_owned(), subscription_id.into());

        self.post("subscription/unsubscribe/", body).await
    }

    /// Lists the app's lead subscriptions.
    pub async fn subscriptions(&self) -> Result<Response> {
        let mut body = Map::new();
        body.insert("object".to_owned(), "LEAD".into());

        self.get("subscription/get/", body).await
    }

    /// Lists the advertiser's lead-generation forms.
    ///
    /// Unless `full` is set, a result carrying a `list` member is reduced to that list. An
    /// empty result is returned as `[]`.
    pub async fn forms(
        &self,
        advertiser: &Advertiser,
        full: bool,
        sandbox: bool,
    ) -> Result<Response> {
        let mut body = scoped(advertiser);
        body.insert("business_type".to_owned(), "LEAD_GEN".into());

        let options = RequestOptions::builder().sandbox(sandbox).build();
        let result = self.execute("pages/get/", body, Method::GET, options).await?;

        Ok(select_forms(result, full))
    }

    /// Replaces the test lead of `page_id`: the current one is deleted first, then a new one
    /// is created. If the delete fails the create is not attempted.
    pub async fn create_test_lead(
        &self,
        advertiser: &Advertiser,
        page_id: &str,
    ) -> Result<Response> {
        self.delete_test_lead(advertiser, page_id).await?;

        let mut body = scoped(advertiser);
        body.insert("page_id".to_owned(), page_id.into());

        self.post("pages/leads/mock/create/", body).await
    }

    /// Deletes the test lead of `page_id`.
    ///
    /// When the fetched lead has no `meta_data` there is nothing to delete and the fetch
    /// result is returned as is.
    pub async fn delete_test_lead(
        &self,
        advertiser: &Advertiser,
        page_id: &str,
    ) -> Result<Response> {
        let lead = self.test_lead(advertiser, page_id).await?;

        let lead_id = lead
            .get("meta_data")
            .filter(|meta| !meta.is_null())
            .map(|meta| meta.get("lead_id").cloned().unwrap_or(Value::Null));
        let Some(lead_id) = lead_id else {
            return Ok(lead);
        };

        let mut body = scoped(advertiser);
        body.insert("lead_id".to_owned(), lead_id);

        self.post("pages/leads/mock/delete/", body).await
    }

    pub async fn test_lead(&self, advertiser: &Advertiser, page_id: &str) -> Result<Response> {
        let mut body = scoped(advertiser);
        body.insert("page_id".to_owned(), page_id.into());

        self.get("pages/leads/mock/get/", body).await
    }

    /// Exports the leads of `page_id`.
    ///
    /// Starts an export task, waits [`LEAD_EXPORT_DELAY`] and downloads the task's result.
    /// The wait is unconditional: the task is not polled, so a task still running after the
    /// delay yields whatever the download endpoint answers.
    pub async fn leads(&self, advertiser: &Advertiser, page_id: &str) -> Result<Response> {
        let mut body = scoped(advertiser);
        body.insert("page_id".to_owned(), page_id.into());

        let task = self.get("pages/leads/task/", body).await?;
        let task_id = task.get("task_id").cloned().unwrap_or(Value::Null);

        #[cfg(feature = "tracing")]
        tracing::debug!(task_id = %task_id, delay = ?LEAD_EXPORT_DELAY, "waiting for lead export");

        tokio::time::sleep(LEAD_EXPORT_DELAY).await;

        let mut body = scoped(advertiser);
        body.insert("task_id".to_owned(), task_id);

        self.get("pages/leads/task/download/", body).await
    }
}

/// Body fields identifying the advertiser an operation acts for.
fn scoped(advertiser: &Advertiser) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert(
        "advertiser_id".to_owned(),
        advertiser.advertiser_id.as_str().into(),
    );
    body.insert(
        "access_token".to_owned(),
        advertiser.access_token.expose_secret().into(),
    );
    body
}

fn select_forms(result: Response, full: bool) -> Response {
    let result = match result {
        Response::Json(Value::Object(mut object)) if !full && object.contains_key("list") => {
            Response::Json(object.remove("list").unwrap_or(Value::Null))
        }
        other => other,
    };

    match result {
        Response::Json(Value::Null) => Response::Json(Value::Array(Vec::new())),
        Response::Text(text) if text.is_empty() => Response::Json(Value::Array(Vec::new())),
        other => other,
    }
}

/// Nothing has been sent yet, so a failure here is [`Kind::Internal`], not a transport one.
fn build_request(builder: RequestBuilder) -> Result<Request> {
    builder
        .build()
        .map_err(|e| Error::with_source(Kind::Internal, e))
}

fn normalize_base(base: &str) -> Result<String> {
    let base = base.trim_end_matches('/');
    Url::parse(base)?;
    Ok(base.to_owned())
}

fn http_client(config: &Config, verify_tls: bool) -> Result<ReqwestClient> {
    let mut headers = HeaderMap::new();

    headers.insert("Accept", HeaderValue::from_static("*/*"));
    headers.insert("Content-Type", HeaderValue::from_static("application/json"));

    let mut builder = ReqwestClient::builder()
        .default_headers(headers)
        .user_agent(config.user_agent.as_str());
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if !verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn forms_should_reduce_to_list_unless_full() {
        let response = Response::Json(json!({"list": [1, 2, 3], "page_info": {"page": 1}}));

        assert_eq!(
            select_forms(response.clone(), false),
            Response::Json(json!([1, 2, 3]))
        );
        assert_eq!(select_forms(response.clone(), true), response);
    }

    #[test]
    fn forms_without_list_should_pass_through() {
        let response = Response::Json(json!({"page_info": {"total_number": 0}}));

        assert_eq!(select_forms(response.clone(), false), response);
    }

    #[test]
    fn empty_forms_should_become_empty_array() {
        assert_eq!(
            select_forms(Response::Json(Value::Null), false),
            Response::Json(json!([]))
        );
        assert_eq!(
            select_forms(Response::Json(json!({"list": null})), false),
            Response::Json(json!([]))
        );
        assert_eq!(
            select_forms(Response::Text(String::new()), true),
            Response::Json(json!([]))
        );
    }

    #[test]
    fn base_urls_should_be_normalized() {
        let config = Config::builder()
            .base_url("http://127.0.0.1:9000/")
            .build();
        let client = Client::with_credentials(
            Credentials::new("app".to_owned(), "secret".to_owned()),
            &config,
        )
        .expect("client");

        assert_eq!(client.base_url(RequestOptions::production()), "http://127.0.0.1:9000");
        assert_eq!(client.base_url(RequestOptions::sandbox()), SANDBOX_URL);
    }

    #[test]
    fn invalid_base_url_should_fail() {
        let config = Config::builder().base_url("not a url").build();

        let result = Client::with_credentials(
            Credentials::new("app".to_owned(), "secret".to_owned()),
            &config,
        );

        let Err(err) = result else {
            panic!("base URL should be rejected");
        };
        assert_eq!(err.kind(), Kind::Internal);
    }

    #[test]
    fn request_build_failure_should_be_internal() {
        let builder = ReqwestClient::new().get("not a url");

        let Err(err) = build_request(builder) else {
            panic!("unparseable URL should not build");
        };
        assert_eq!(err.kind(), Kind::Internal);
        assert!(err.downcast_ref::<reqwest::Error>().is_some());
    }

    #[test]
    fn scoped_body_should_carry_advertiser() {
        let advertiser = Advertiser::builder()
            .advertiser_id("42")
            .access_token("tok")
            .build();

        assert_eq!(
            Value::Object(scoped(&advertiser)),
            json!({"advertiser_id": "42", "access_token": "tok"})
        );
    }
}
