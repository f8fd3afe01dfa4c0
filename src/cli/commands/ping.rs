use serde_json::{json, Value};

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config;

pub async fn handle(url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = url.unwrap_or_else(|| format!("http://localhost:{}", config::config().api.port));
    let health_url = format!("{}/health", base.trim_end_matches('/'));

    let client = reqwest::Client::new();
    let response = client
        .get(&health_url)
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Could not reach {}: {}", health_url, e))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        output_success(
            &output_format,
            &format!("{} is healthy", base),
            Some(json!({ "status": status.as_u16(), "health": body })),
        )
    } else {
        output_error(&output_format, &format!("{} answered {}", base, status))?;
        Err(anyhow::anyhow!("Server unhealthy"))
    }
}
