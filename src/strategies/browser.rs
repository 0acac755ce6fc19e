use anyhow::{anyhow, Result};
use colored::Colorize;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tokio::time::Duration;

use crate::config::config::{AppConfig, BrowserConfig};
use crate::extractors::olaclick::extract_menu_html::{extract_menu_html, MenuSelectors};
use crate::menu::Menu;
use crate::utilities::generate_random_delay::generate_random_delay;

/// Accumulates menu snapshots taken while scrolling a lazily-loaded page.
///
/// Items that scroll out of a virtualized list are kept; items seen again
/// are not duplicated. Capture is considered finished after `idle_rounds`
/// consecutive snapshots that bring nothing new.
pub struct ScrollCapture {
    menu: Menu,
    idle: usize,
    idle_rounds: usize,
}

impl ScrollCapture {
    pub fn new(menu: Menu, idle_rounds: usize) -> Self {
        ScrollCapture {
            menu,
            idle: 0,
            idle_rounds: idle_rounds.max(1),
        }
    }

    /// Merges a snapshot; returns whether scrolling should continue.
    pub fn record(&mut self, snapshot: Menu) -> bool {
        if self.menu.merge(snapshot) == 0 {
            self.idle += 1;
        } else {
            self.idle = 0;
        }
        self.idle < self.idle_rounds
    }

    pub fn item_count(&self) -> usize {
        self.menu.item_count()
    }

    pub fn into_menu(self) -> Menu {
        self.menu
    }
}

async fn connect(browser: &BrowserConfig) -> Result<Client> {
    let mut capabilities = Map::new();
    if browser.headless {
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", "--disable-gpu", "--no-sandbox", "--window-size=1280,2000"] }),
        );
        capabilities.insert("moz:firefoxOptions".to_string(), json!({ "args": ["-headless"] }));
    }

    ClientBuilder::native()
        .capabilities(capabilities)
        .connect(&browser.webdriver_url)
        .await
        .map_err(|e| anyhow!("Failed to connect to WebDriver at {}: {}", browser.webdriver_url, e))
}

/// Drives a real browser through the store page, scrolling until no new
/// products show up.
pub async fn fetch_menu_with_browser(config: &AppConfig) -> Result<Menu> {
    let selectors = MenuSelectors::parse(&config.selectors)?;
    let client = connect(&config.browser).await?;

    let result = capture_menu(&client, config, &selectors).await;

    if let Err(e) = client.close().await {
        eprintln!("{}", format!("Failed to close WebDriver session: {}", e).yellow());
    }

    result
}

async fn capture_menu(client: &Client, config: &AppConfig, selectors: &MenuSelectors) -> Result<Menu> {
    let browser = &config.browser;
    let url = config.store.page_url();

    println!("Opening {} in the browser", url);
    client
        .goto(&url)
        .await
        .map_err(|e| anyhow!("Failed to open {}: {}", url, e))?;

    let waited = client
        .wait()
        .at_most(Duration::from_secs(browser.wait_timeout_secs))
        .for_element(Locator::Css(&config.selectors.item_card))
        .await;
    if let Err(e) = waited {
        eprintln!("{}", format!("No product card appeared, capturing anyway: {}", e).yellow());
    }

    let mut capture = ScrollCapture::new(
        Menu::new(&config.output.default_emoji, &config.output.default_category),
        browser.idle_rounds,
    );

    for step in 0..=browser.max_scrolls {
        let source = client
            .source()
            .await
            .map_err(|e| anyhow!("Failed to read page source: {}", e))?;

        let snapshot = extract_menu_html(&source, selectors, &config.output);
        let visible = snapshot.item_count();
        let keep_scrolling = capture.record(snapshot);

        println!(
            "Scroll {}: {} items on screen, {} captured",
            step,
            visible,
            capture.item_count()
        );

        if !keep_scrolling || step == browser.max_scrolls {
            break;
        }

        client
            .execute("window.scrollBy(0, window.innerHeight); return window.scrollY;", Vec::<Value>::new())
            .await
            .map_err(|e| anyhow!("Failed to scroll: {}", e))?;

        generate_random_delay(browser.scroll_delay_min_ms, browser.scroll_delay_max_ms).await;
    }

    println!(
        "{}",
        format!("Browser capture finished with {} items", capture.item_count()).green()
    );

    Ok(capture.into_menu())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuItem;
    use std::sync::{Arc, Mutex};
    use warp::http::StatusCode;
    use warp::Filter;

    fn snapshot(names: &[&str]) -> Menu {
        let mut menu = Menu::new("🍽️", "Outros");
        for name in names {
            menu.push_item(
                "Lanches",
                MenuItem {
                    name: name.to_string(),
                    description: String::new(),
                    price: "R$ 10,00".to_string(),
                    image: String::new(),
                    addons: Vec::new(),
                },
            );
        }
        menu
    }

    #[test]
    fn keeps_items_that_scrolled_out_of_view() {
        let mut capture = ScrollCapture::new(snapshot(&[]), 2);

        assert!(capture.record(snapshot(&["A", "B", "C"])));
        assert!(capture.record(snapshot(&["C", "D", "E"])));
        assert!(capture.record(snapshot(&["E", "F"])));

        let menu = capture.into_menu();
        let names: Vec<&str> = menu.get("Lanches").unwrap().items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn stops_after_consecutive_idle_snapshots() {
        let mut capture = ScrollCapture::new(snapshot(&[]), 2);

        assert!(capture.record(snapshot(&["A"])));
        assert!(capture.record(snapshot(&["A"])));
        // New item resets the idle counter
        assert!(capture.record(snapshot(&["A", "B"])));
        assert!(capture.record(snapshot(&["B"])));
        assert!(!capture.record(snapshot(&["A", "B"])));
        assert_eq!(capture.item_count(), 2);
    }

    #[test]
    fn zero_idle_rounds_still_allows_one_capture() {
        let mut capture = ScrollCapture::new(snapshot(&[]), 0);

        assert!(capture.record(snapshot(&["A"])));
        assert!(!capture.record(snapshot(&["A"])));
    }

    #[tokio::test]
    async fn session_is_closed_when_capture_fails() {
        let closed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = closed.clone();

        let new_session = warp::post()
            .and(warp::path!("session"))
            .map(|| warp::reply::json(&json!({ "value": { "sessionId": "s1", "capabilities": {} } })));
        let navigate = warp::post().and(warp::path!("session" / String / "url")).map(|_id: String| {
            warp::reply::with_status(
                warp::reply::json(&json!({
                    "value": { "error": "unknown error", "message": "navigation failed", "stacktrace": "" }
                })),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        });
        let delete_session = warp::delete().and(warp::path!("session" / String)).map(move |id: String| {
            recorded.lock().unwrap().push(id);
            warp::reply::json(&json!({ "value": null }))
        });

        let (addr, server) =
            warp::serve(new_session.or(navigate).or(delete_session)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let mut config = AppConfig::default();
        config.browser.webdriver_url = format!("http://{}", addr);

        let err = fetch_menu_with_browser(&config).await.unwrap_err();

        assert!(err.to_string().contains("Failed to open"));
        assert!(closed.lock().unwrap().iter().any(|id| id == "s1"));
    }
}
