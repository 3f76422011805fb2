use serde_json::Value;

use crate::cli::{utils::output_success, OutputFormat};

pub async fn check(base_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let response = client.get(&url).send().await?;
    let status = response.status();
    let body: Value = response.json().await?;

    if !status.is_success() {
        let detail = body
            .pointer("/data/database_error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        anyhow::bail!("{} is unhealthy ({}): {}", base_url, status, detail);
    }

    output_success(output_format, &format!("{} is healthy", base_url), body.get("data").cloned())
}
