use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use tokio::time::Duration;

use crate::config::config::{AppConfig, FlareSolverrConfig};
use crate::fetch::flaresolverr::fetch_via_flaresolverr;

/// HTTP access to the store: API calls and page fetches.
#[derive(Clone)]
pub struct MenuClient {
    client: Client,
    flaresolverr: FlareSolverrConfig,
}

impl MenuClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let origin = config.store.origin();

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.http.user_agent)?);
        headers.insert(ORIGIN, HeaderValue::from_str(&origin)?);
        headers.insert(REFERER, HeaderValue::from_str(&format!("{}/", origin))?);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/html;q=0.9, */*;q=0.8"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(MenuClient {
            client,
            flaresolverr: config.flaresolverr.clone(),
        })
    }

    pub async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{} answered {}", url, status));
        }

        response
            .json::<Value>()
            .await
            .with_context(|| format!("Failed to parse response from {} as JSON", url))
    }

    /// Page source, through FlareSolverr when one is configured.
    pub async fn get_page(&self, url: &str) -> Result<String> {
        if let Some(flaresolverr_url) = self.flaresolverr_url() {
            println!("{}", format!("Fetching {} through FlareSolverr", url).cyan());
            return fetch_via_flaresolverr(&self.client, flaresolverr_url, url, self.flaresolverr.max_timeout).await;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        let body = response.text().await.context("Failed to read response body")?;

        if !status.is_success() {
            return Err(anyhow!("{} answered {}", url, status));
        }

        Ok(body)
    }

    fn flaresolverr_url(&self) -> Option<&str> {
        self.flaresolverr
            .flaresolverr_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::Filter;

    #[tokio::test]
    async fn sends_store_headers_with_api_calls() {
        let route = warp::path("products")
            .and(warp::header::<String>("origin"))
            .and(warp::header::<String>("referer"))
            .map(|origin: String, referer: String| {
                warp::reply::json(&serde_json::json!({ "origin": origin, "referer": referer }))
            });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let base = format!("http://{}", addr);

        let client = MenuClient::new(&AppConfig::default()).unwrap();
        let body = client.get_json(&format!("{}/products", base)).await.unwrap();

        assert_eq!(body["origin"], "https://cafe-ipiranga.ola.click");
        assert_eq!(body["referer"], "https://cafe-ipiranga.ola.click/");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let route = warp::path("products").map(|| {
            warp::reply::with_status("forbidden", warp::http::StatusCode::FORBIDDEN)
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let base = format!("http://{}", addr);

        let client = MenuClient::new(&AppConfig::default()).unwrap();

        let err = client.get_json(&format!("{}/products", base)).await.unwrap_err();
        assert!(err.to_string().contains("403"));
        assert!(client.get_page(&format!("{}/products", base)).await.is_err());
    }

    #[tokio::test]
    async fn page_goes_through_flaresolverr_when_configured() {
        let route = warp::post().and(warp::path("v1")).map(|| {
            warp::reply::json(&serde_json::json!({
                "status": "ok",
                "message": "",
                "solution": { "url": "x", "status": 200, "response": "<p>rendered</p>" }
            }))
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let base = format!("http://{}", addr);

        let mut config = AppConfig::default();
        config.flaresolverr.flaresolverr_url = Some(format!("{}/v1", base));
        let client = MenuClient::new(&config).unwrap();

        let html = client.get_page("https://cafe-ipiranga.ola.click/products").await.unwrap();
        assert_eq!(html, "<p>rendered</p>");
    }
}
