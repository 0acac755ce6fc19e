use anyhow::{bail, Result};
use colored::Colorize;

use crate::extractors::olaclick::process_products::{count_products, process_products};
use crate::menu::Menu;
use crate::strategies::StrategyContext;

/// Asks the products API directly, by company id and then by slug.
pub async fn fetch_menu_from_api(context: &StrategyContext<'_>) -> Result<Menu> {
    let store = &context.config.store;
    println!("Trying API access for company {} ({})", store.company_id, store.slug);

    for url in store.api_endpoints() {
        println!("Testing endpoint: {}", url);

        match context.client.get_json(&url).await {
            Ok(payload) => {
                let records = count_products(&payload);
                if records > 0 {
                    println!("{}", format!("API returned {} records", records).green());
                    return Ok(process_products(&payload, &context.config.output));
                }
                println!("{}", "API answered without products".yellow());
            }
            Err(e) => eprintln!("{}", format!("API request failed: {:#}", e).red()),
        }
    }

    bail!("No API endpoint returned products")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::AppConfig;
    use serde_json::json;
    use warp::Filter;

    #[tokio::test]
    async fn falls_back_to_slug_endpoint() {
        let by_id = warp::path!("v1" / "companies" / String / "products")
            .map(|_id: String| warp::reply::json(&json!({ "data": [] })));
        let by_slug = warp::path!("v1" / "companies" / "slug" / String / "products").map(|slug: String| {
            assert_eq!(slug, "cafe-ipiranga");
            warp::reply::json(&json!({ "data": [
                { "name": "Cappuccino", "price": 11.5, "category": { "name": "☕ Cafés" } },
                { "name": "Escondido", "price": 1, "visible": false }
            ] }))
        });
        let (addr, server) = warp::serve(by_slug.or(by_id)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let mut config = AppConfig::default();
        config.store.api_base_url = format!("http://{}/v1", addr);
        let context = StrategyContext::new(&config).unwrap();

        let menu = fetch_menu_from_api(&context).await.unwrap();

        let cafes = menu.get("Cafés").unwrap();
        assert_eq!(cafes.emoji, "☕");
        assert_eq!(cafes.items[0].price, "R$ 11,50");
        assert_eq!(menu.item_count(), 1);
    }

    #[tokio::test]
    async fn fails_when_no_endpoint_answers() {
        let route = warp::any().map(|| warp::reply::with_status("nope", warp::http::StatusCode::SERVICE_UNAVAILABLE));
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let mut config = AppConfig::default();
        config.store.api_base_url = format!("http://{}/v1", addr);
        let context = StrategyContext::new(&config).unwrap();

        assert!(fetch_menu_from_api(&context).await.is_err());
    }
}
