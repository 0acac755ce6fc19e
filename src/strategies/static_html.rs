use anyhow::Result;

use crate::extractors::olaclick::extract_menu_html::{extract_menu_html, MenuSelectors};
use crate::menu::Menu;
use crate::strategies::StrategyContext;

/// Parses product cards out of the store page markup.
pub async fn fetch_menu_from_static_html(context: &StrategyContext<'_>) -> Result<Menu> {
    let selectors = MenuSelectors::parse(&context.config.selectors)?;
    let page = context.page().await?;

    let menu = extract_menu_html(page, &selectors, &context.config.output);
    println!("Found {} product cards in the page markup", menu.item_count());

    Ok(menu)
}
