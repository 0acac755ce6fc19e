use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::time::Duration;

#[derive(Debug, Deserialize)]
pub struct FlareSolverrResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub solution: Option<Solution>,
}

#[derive(Debug, Deserialize)]
pub struct Solution {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub response: String,
}

/// Fetches `url` through a FlareSolverr instance and returns the rendered page source.
pub async fn fetch_via_flaresolverr(
    client: &Client,
    flaresolverr_url: &str,
    url: &str,
    max_timeout: u64,
) -> Result<String> {
    let data = json!({
        "cmd": "request.get",
        "url": url,
        "maxTimeout": max_timeout
    });

    let response = client
        .post(flaresolverr_url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        // FlareSolverr may take up to maxTimeout on its side
        .timeout(Duration::from_millis(max_timeout + 10_000))
        .json(&data)
        .send()
        .await
        .context("Failed to send request to FlareSolverr")?;

    let status = response.status();
    let body = response.text().await.context("Failed to read FlareSolverr response body")?;

    if !status.is_success() {
        return Err(anyhow!("FlareSolverr returned {}: {}", status, body));
    }

    let payload: FlareSolverrResponse =
        serde_json::from_str(&body).context("Failed to parse FlareSolverr response as JSON")?;

    if payload.status != "ok" {
        return Err(anyhow!("FlareSolverr status '{}': {}", payload.status, payload.message));
    }

    let solution = payload
        .solution
        .ok_or_else(|| anyhow!("FlareSolverr response has no solution"))?;

    if !(200..300).contains(&solution.status) {
        return Err(anyhow!("{} answered {} through FlareSolverr", solution.url, solution.status));
    }

    Ok(solution.response)
}
