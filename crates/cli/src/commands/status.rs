use eyre::{bail, Result};
use packbridge_client::HttpBuildClient;
use packbridge_config::Settings;

pub async fn execute(settings: Settings) -> Result<()> {
    let client = HttpBuildClient::new(settings.build_url.clone(), settings.request_timeout())?;

    if client.is_running().await {
        println!("Build service is running at {}", client.url());
        Ok(())
    } else {
        bail!("no build service is answering at {}", client.url())
    }
}
