use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

use crate::config::config::{OutputConfig, SelectorConfig};
use crate::menu::{Menu, MenuItem};
use crate::utilities::extract_style_url::extract_style_url;
use crate::utilities::normalize::{absolutize_url, clean_text, format_price, parse_price_text};

/// Compiled selector lists for a rendered store page.
pub struct MenuSelectors {
    category_section: Selector,
    category_title: Selector,
    item_card: Selector,
    item_name: Selector,
    item_description: Selector,
    item_price: Selector,
    item_image: Selector,
    styled: Selector,
}

fn parse_selector(name: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid {} selector '{}': {:?}", name, css, e))
}

impl MenuSelectors {
    pub fn parse(config: &SelectorConfig) -> Result<Self> {
        Ok(MenuSelectors {
            category_section: parse_selector("category_section", &config.category_section)?,
            category_title: parse_selector("category_title", &config.category_title)?,
            item_card: parse_selector("item_card", &config.item_card)?,
            item_name: parse_selector("item_name", &config.item_name)?,
            item_description: parse_selector("item_description", &config.item_description)?,
            item_price: parse_selector("item_price", &config.item_price)?,
            item_image: parse_selector("item_image", &config.item_image)?,
            styled: parse_selector("styled", "[style]")?,
        })
    }
}

fn element_text(element: ElementRef) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Parses the product cards of a rendered store page.
///
/// A card belongs to the category of its closest enclosing section; cards
/// outside any section take the last category heading seen before them, or
/// the default category.
pub fn extract_menu_html(html_content: &str, selectors: &MenuSelectors, output: &OutputConfig) -> Menu {
    let document = Html::parse_document(html_content);
    let mut menu = Menu::new(&output.default_emoji, &output.default_category);

    // Outermost matches only, so a card wrapper and its inner element count once
    let all_cards: HashSet<_> = document.select(&selectors.item_card).map(|card| card.id()).collect();
    let inside_card = |element: &ElementRef| element.ancestors().any(|node| all_cards.contains(&node.id()));
    let cards: HashSet<_> = document
        .select(&selectors.item_card)
        .filter(|card| !inside_card(card))
        .map(|card| card.id())
        .collect();

    let mut section_titles = HashMap::new();
    for section in document.select(&selectors.category_section) {
        if let Some(title) = section
            .select(&selectors.category_title)
            .find(|title| !inside_card(title))
            .map(element_text)
            .filter(|title| !title.is_empty())
        {
            section_titles.insert(section.id(), title);
        }
    }

    let mut current_heading: Option<String> = None;

    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        if selectors.category_title.matches(&element) && !inside_card(&element) && !cards.contains(&element.id()) {
            let heading = element_text(element);
            if !heading.is_empty() {
                current_heading = Some(heading);
            }
            continue;
        }

        if !cards.contains(&element.id()) {
            continue;
        }

        let label = element
            .ancestors()
            .find_map(|ancestor| section_titles.get(&ancestor.id()))
            .or(current_heading.as_ref())
            .map(String::as_str)
            .unwrap_or(output.default_category.as_str());

        if let Some(item) = parse_card(element, selectors, output) {
            menu.push_item(label, item);
        }
    }

    menu
}

fn parse_card(card: ElementRef, selectors: &MenuSelectors, output: &OutputConfig) -> Option<MenuItem> {
    let name = card
        .select(&selectors.item_name)
        .map(element_text)
        .find(|name| !name.is_empty())?;

    let price_text = card.select(&selectors.item_price).map(element_text).find(|text| !text.is_empty());
    let price = price_text.as_deref().and_then(parse_price_text).unwrap_or(0.0);

    let description = card
        .select(&selectors.item_description)
        .map(element_text)
        .find(|text| {
            !text.is_empty()
                && *text != name
                && Some(text) != price_text.as_ref()
                && !text.contains(output.currency_prefix.as_str())
        })
        .unwrap_or_default();

    let image = card_image(card, selectors).unwrap_or_else(|| output.placeholder_image.clone());

    Some(MenuItem {
        name,
        description,
        price: format_price(price, &output.currency_prefix),
        image,
        addons: Vec::new(),
    })
}

fn card_image(card: ElementRef, selectors: &MenuSelectors) -> Option<String> {
    let from_img = card.select(&selectors.item_image).find_map(|img| {
        ["src", "data-src", "data-lazy-src"]
            .iter()
            .filter_map(|attr| img.value().attr(attr))
            .map(str::trim)
            .find(|src| !src.is_empty() && !src.starts_with("data:"))
            .map(absolutize_url)
    });

    from_img.or_else(|| {
        std::iter::once(card)
            .chain(card.select(&selectors.styled))
            .filter_map(|element| element.value().attr("style"))
            .find_map(extract_style_url)
    })
}
