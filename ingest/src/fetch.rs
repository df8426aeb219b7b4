use tracing::debug;
use url::Url;

use common::{Error, Result};

use crate::utils::retry::retry_with_backoff;

/// Downloads a source CSV, retrying transient failures with backoff.
pub async fn download(client: &rquest::Client, url: &str) -> Result<Vec<u8>> {
    let parsed = Url::parse(url)?;

    retry_with_backoff(3, 500, || async {
        debug!(url = %parsed, "Requesting source file");
        let response = client.get(parsed.as_str()).send().await?;
        if !response.status().is_success() {
            return Err(Error::Storage(format!(
                "source returned status {} for {}",
                response.status(),
                parsed
            )));
        }
        Ok(response.bytes().await?.to_vec())
    })
    .await
}
