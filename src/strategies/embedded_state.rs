use anyhow::{anyhow, Result};
use colored::Colorize;
use serde_json::Value;

use crate::extractors::olaclick::extract_embedded_products::extract_embedded_products;
use crate::extractors::olaclick::process_products::process_products;
use crate::menu::Menu;
use crate::strategies::StrategyContext;

/// Looks for the product list the page ships for client-side hydration.
pub async fn fetch_menu_from_embedded_state(context: &StrategyContext<'_>) -> Result<Menu> {
    println!("Looking for embedded state in the store page");
    let page = context.page().await?;

    let products = extract_embedded_products(page)
        .ok_or_else(|| anyhow!("No embedded product list found in the store page"))?;

    println!("{}", format!("Found {} products in the page state", products.len()).green());

    Ok(process_products(&Value::Array(products), &context.config.output))
}
