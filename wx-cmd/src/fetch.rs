//! Download a forecast payload and save it for the other commands.

use log::info;
use wx_owm::client::OwmClient;

/// A client for `api_base`, refusing a blank key up front.
pub fn client_for(api_key: &str, api_base: &str) -> anyhow::Result<OwmClient> {
    if api_key.trim().is_empty() {
        anyhow::bail!("An API key is required (--api-key or OWM_API_KEY)");
    }
    Ok(OwmClient::with_base_url(api_key, api_base)?)
}

/// Fetch the forecast for `city` and write it, pretty-printed, to `output`.
pub async fn run_fetch(
    city: &str,
    output: &str,
    api_key: &str,
    api_base: &str,
) -> anyhow::Result<()> {
    let client = client_for(api_key, api_base)?;

    info!("Fetching forecast for {:?}", city);
    let forecast = client.forecast_for_city(city).await?;
    let entries = forecast.list.as_ref().map_or(0, Vec::len);

    let body = serde_json::to_string_pretty(&forecast)?;
    tokio::fs::write(output, body).await?;

    info!(
        "Fetch complete. {} entries for {} written to {}",
        entries,
        forecast.city_name().unwrap_or(city),
        output
    );
    Ok(())
}
