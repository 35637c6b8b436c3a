//! Kept in its own test binary: it mutates the process environment.

use httpmock::{Method::GET, MockServer};
use serde_json::json;
use tiktok_marketing_sdk::auth::{APP_ID_VAR, SECRET_VAR};
use tiktok_marketing_sdk::error::{Kind, StatusCode};
use tiktok_marketing_sdk::{Client, Config};

#[tokio::test]
async fn credentials_should_fall_back_to_environment() -> anyhow::Result<()> {
    // SAFETY: this is the only test in this binary, no other thread touches the environment.
    unsafe {
        std::env::remove_var(APP_ID_VAR);
        std::env::remove_var(SECRET_VAR);
    }

    let Err(err) = Client::from_env() else {
        panic!("credentials should be missing");
    };
    assert_eq!(err.kind(), Kind::Configuration);

    // SAFETY: see above.
    unsafe {
        std::env::set_var(APP_ID_VAR, "env-app-id");
        std::env::set_var(SECRET_VAR, "env-secret");
    }

    let client = Client::from_env()?;
    assert_eq!(client.app_id(), "env-app-id");

    let client = Client::builder().app_id("explicit").build()?;
    assert_eq!(client.app_id(), "explicit");

    let server = MockServer::start();
    let client = Client::builder()
        .config(Config::builder().base_url(format!("http://{}", server.address())).build())
        .build()?;

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/subscription/get/")
            .json_body(json!({"object": "LEAD", "app_id": "env-app-id", "secret": "env-secret"}));
        then.status(StatusCode::OK).json_body(json!({"data": {"list": []}}));
    });

    client.subscriptions().await?;
    mock.assert();

    Ok(())
}
