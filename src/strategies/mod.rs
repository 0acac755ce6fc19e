use std::fmt;

use anyhow::{anyhow, bail, Result};
use colored::Colorize;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::config::config::AppConfig;
use crate::fetch::client::MenuClient;
use crate::menu::Menu;

pub mod api;
pub mod browser;
pub mod embedded_state;
pub mod static_html;

/// Ways of getting the menu, from cheapest to heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Public products API
    Api,
    /// Product list embedded in the page's hydration state
    Embedded,
    /// Product cards in the static page markup
    Html,
    /// WebDriver session with infinite-scroll capture
    Browser,
}

impl StrategyKind {
    pub fn default_order() -> Vec<StrategyKind> {
        vec![
            StrategyKind::Api,
            StrategyKind::Embedded,
            StrategyKind::Html,
            StrategyKind::Browser,
        ]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Api => "api",
            StrategyKind::Embedded => "embedded",
            StrategyKind::Html => "html",
            StrategyKind::Browser => "browser",
        };
        f.write_str(name)
    }
}

/// State shared by the strategies of one run.
pub struct StrategyContext<'a> {
    pub config: &'a AppConfig,
    pub client: MenuClient,
    // Outcome of the single store page fetch, success or failure
    page: OnceCell<Result<String, String>>,
}

impl<'a> StrategyContext<'a> {
    pub fn new(config: &'a AppConfig) -> Result<Self> {
        Ok(StrategyContext {
            config,
            client: MenuClient::new(config)?,
            page: OnceCell::new(),
        })
    }

    /// Store page source; fetched on first use only.
    pub async fn page(&self) -> Result<&str> {
        let page = self
            .page
            .get_or_init(|| async {
                let url = self.config.store.page_url();
                println!("Fetching store page: {}", url);
                self.client.get_page(&url).await.map_err(|e| format!("{:#}", e))
            })
            .await;

        match page {
            Ok(html) => Ok(html.as_str()),
            Err(e) => Err(anyhow!("Store page unavailable: {}", e)),
        }
    }
}

async fn run_strategy(kind: StrategyKind, context: &StrategyContext<'_>) -> Result<Menu> {
    match kind {
        StrategyKind::Api => api::fetch_menu_from_api(context).await,
        StrategyKind::Embedded => embedded_state::fetch_menu_from_embedded_state(context).await,
        StrategyKind::Html => static_html::fetch_menu_from_static_html(context).await,
        StrategyKind::Browser => browser::fetch_menu_with_browser(context.config).await,
    }
}

/// Runs the strategies in order until one yields a non-empty menu.
pub async fn run_cascade(context: &StrategyContext<'_>, order: &[StrategyKind]) -> Result<(StrategyKind, Menu)> {
    let mut tried: Vec<StrategyKind> = Vec::new();

    for &kind in order {
        if tried.contains(&kind) {
            continue;
        }
        tried.push(kind);

        println!("{}", format!("Trying strategy '{}'", kind).cyan());

        match run_strategy(kind, context).await {
            Ok(menu) if !menu.is_empty() => {
                println!(
                    "{}",
                    format!("Strategy '{}' succeeded with {} items", kind, menu.item_count()).green()
                );
                return Ok((kind, menu));
            }
            Ok(_) => eprintln!("{}", format!("Strategy '{}' produced no items", kind).yellow()),
            Err(e) => eprintln!("{}", format!("Strategy '{}' failed: {:#}", kind, e).red()),
        }
    }

    if tried.is_empty() {
        bail!("No strategy selected");
    }

    bail!(
        "No strategy produced menu data (tried: {})",
        tried.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )
}
