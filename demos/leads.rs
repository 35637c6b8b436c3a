//! Lists the lead forms of an advertiser, refreshes the test lead of the first one and
//! exports its leads.
//!
//! ```sh
//! TIKTOK_APP_ID=.. TIKTOK_SECRET=.. TIKTOK_ADVERTISER_ID=.. TIKTOK_ACCESS_TOKEN=.. \
//!     RUST_LOG=debug cargo run --example leads --features tracing
//! ```

use std::env;

use tiktok_marketing_sdk::Client;
use tiktok_marketing_sdk::auth::Advertiser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = Client::from_env()?;
    let advertiser = Advertiser::builder()
        .advertiser_id(env::var("TIKTOK_ADVERTISER_ID")?)
        .access_token(env::var("TIKTOK_ACCESS_TOKEN")?)
        .build();

    let forms = client.forms(&advertiser, false, false).await?;
    info!(forms = ?forms, "lead forms");

    let Some(page_id) = forms
        .as_json()
        .and_then(|forms| forms.get(0))
        .and_then(|form| form.get("page_id"))
        .and_then(|page_id| page_id.as_str())
        .map(str::to_owned)
    else {
        warn!("advertiser has no lead forms");
        return Ok(());
    };

    let lead = client.create_test_lead(&advertiser, &page_id).await?;
    info!(page_id = %page_id, lead = ?lead, "created test lead");

    let leads = client.leads(&advertiser, &page_id).await?;
    info!(page_id = %page_id, leads = ?leads, "exported leads");

    Ok(())
}
