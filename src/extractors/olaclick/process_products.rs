use colored::Colorize;
use serde_json::Value;

use crate::config::config::OutputConfig;
use crate::menu::{Addon, AddonOption, Menu, MenuItem};
use crate::utilities::normalize::{absolutize_url, clean_text, format_price, price_from_value};

/// A product found in an API or embedded-state payload, with the label of
/// the category group it was nested under, if any.
struct RawProduct<'a> {
    group: Option<&'a str>,
    value: &'a Value,
}

/// Flattens the payload shapes seen in the wild:
/// a product list, `{"data": [...]}`, `{"data": {"products": [...]}}`,
/// or a list of category groups `[{"name": "...", "products": [...]}]`.
fn collect_products<'a>(payload: &'a Value, group: Option<&'a str>, out: &mut Vec<RawProduct<'a>>) {
    match payload {
        Value::Array(entries) => {
            for entry in entries {
                let is_group = entry.get("products").is_some_and(Value::is_array) && entry.get("price").is_none();
                if is_group {
                    let label = entry.get("name").and_then(Value::as_str).or(group);
                    collect_products(&entry["products"], label, out);
                } else {
                    out.push(RawProduct { group, value: entry });
                }
            }
        }
        Value::Object(obj) => {
            if let Some(data) = obj.get("data") {
                collect_products(data, group, out);
            } else if let Some(products) = obj.get("products") {
                collect_products(products, group, out);
            }
        }
        _ => {}
    }
}

/// Number of product entries a payload carries, before filtering.
pub fn count_products(payload: &Value) -> usize {
    let mut products = Vec::new();
    collect_products(payload, None, &mut products);
    products.len()
}

/// Converts a raw product payload into the normalized menu.
pub fn process_products(payload: &Value, output: &OutputConfig) -> Menu {
    let mut products = Vec::new();
    collect_products(payload, None, &mut products);

    let mut menu = Menu::new(&output.default_emoji, &output.default_category);
    let mut count = 0;

    for product in products {
        let Some(item) = product.value.as_object() else {
            eprintln!("{}", format!("Skipping product that is not an object: {}", product.value).yellow());
            continue;
        };

        if is_hidden(item.get("visible")) {
            continue;
        }

        let category = category_label(item.get("category"))
            .or(product.group)
            .unwrap_or(output.default_category.as_str());

        let name = item
            .get("name")
            .and_then(Value::as_str)
            .map(clean_text)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| output.default_item_name.clone());

        let description = item
            .get("description")
            .and_then(Value::as_str)
            .map(clean_text)
            .unwrap_or_default();

        let price = format_price(price_from_value(item.get("price")), &output.currency_prefix);

        let image = image_url(product.value).unwrap_or_else(|| output.placeholder_image.clone());

        let addons = option_groups(product.value, &output.currency_prefix);

        menu.push_item(
            category,
            MenuItem {
                name,
                description,
                price,
                image,
                addons,
            },
        );
        count += 1;
    }

    println!("Processing finished: {} items organized", count);
    menu
}

fn is_hidden(visible: Option<&Value>) -> bool {
    match visible {
        None => false,
        Some(Value::Bool(visible)) => !visible,
        Some(Value::Null) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(values)) => values.is_empty(),
        Some(Value::Object(fields)) => fields.is_empty(),
    }
}

fn category_label(category: Option<&Value>) -> Option<&str> {
    let label = match category? {
        Value::Object(obj) => obj.get("name").and_then(Value::as_str),
        Value::String(label) => Some(label.as_str()),
        _ => None,
    };
    label.filter(|label| !label.trim().is_empty())
}

fn image_url(product: &Value) -> Option<String> {
    let candidate = ["image", "image_url", "imageUrl"]
        .iter()
        .filter_map(|key| product.get(*key))
        .chain(product.get("images").and_then(|images| images.get(0)))
        .find_map(|value| match value {
            Value::String(url) => Some(url.as_str()),
            Value::Object(obj) => obj.get("url").and_then(Value::as_str),
            _ => None,
        }
        .filter(|url| !url.trim().is_empty()))?;

    let url = absolutize_url(candidate);
    if url.is_empty() {
        None
    } else {
        Some(url)
    }
}

fn option_groups(product: &Value, currency_prefix: &str) -> Vec<Addon> {
    let Some(groups) = ["option_groups", "optionGroups", "modifiers"]
        .iter()
        .find_map(|key| product.get(*key).and_then(Value::as_array))
    else {
        return Vec::new();
    };

    groups
        .iter()
        .filter_map(|group| {
            let name = group
                .get("name")
                .or_else(|| group.get("title"))
                .and_then(Value::as_str)
                .map(clean_text)
                .filter(|name| !name.is_empty())?;

            let options = group
                .get("options")
                .or_else(|| group.get("items"))
                .and_then(Value::as_array)
                .map(|options| {
                    options
                        .iter()
                        .filter_map(|option| {
                            let name = option.get("name").and_then(Value::as_str).map(clean_text)?;
                            Some(AddonOption {
                                name,
                                price: format_price(price_from_value(option.get("price")), currency_prefix),
                            })
                        })
                        .filter(|option| !option.name.is_empty())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();

            Some(Addon { name, options })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_flat_product_list() {
        let payload = json!([
            {
                "name": "  X-Burger ",
                "description": "Pão &amp; carne",
                "price": 18.9,
                "image": "//cdn.ola.click/x.jpg",
                "category": { "name": "🍔 Lanches" }
            },
            {
                "name": "Suco",
                "price": "8",
                "category": { "name": "Bebidas" }
            }
        ]);

        let menu = process_products(&payload, &OutputConfig::default());

        let lanches = menu.get("Lanches").unwrap();
        assert_eq!(lanches.emoji, "🍔");
        assert_eq!(lanches.items[0].name, "X-Burger");
        assert_eq!(lanches.items[0].description, "Pão & carne");
        assert_eq!(lanches.items[0].price, "R$ 18,90");
        assert_eq!(lanches.items[0].image, "https://cdn.ola.click/x.jpg");

        let bebidas = menu.get("Bebidas").unwrap();
        assert_eq!(bebidas.emoji, "🍽️");
        assert_eq!(bebidas.items[0].price, "R$ 8,00");
        assert_eq!(bebidas.items[0].image, "https://placehold.co/400x300?text=Sem+Imagem");
        assert_eq!(bebidas.items[0].description, "");
    }

    #[test]
    fn unwraps_data_envelope_and_category_groups() {
        let payload = json!({
            "data": [
                { "name": "🍕 Pizzas", "products": [ { "name": "Calabresa", "price": 40 } ] },
                { "name": "Doces", "products": [ { "name": "Brigadeiro", "price": 3, "category": "Sobremesas" } ] }
            ]
        });

        let menu = process_products(&payload, &OutputConfig::default());

        assert_eq!(menu.get("Pizzas").unwrap().emoji, "🍕");
        assert_eq!(menu.get("Pizzas").unwrap().items[0].name, "Calabresa");
        assert_eq!(menu.get("Sobremesas").unwrap().items[0].name, "Brigadeiro");
        assert!(menu.get("Doces").is_none());
        assert_eq!(count_products(&payload), 2);
    }

    #[test]
    fn skips_hidden_and_malformed_products() {
        let payload = json!({ "data": { "products": [
            { "name": "Oculto", "visible": false },
            { "name": "Nulo", "visible": null },
            { "name": "Vazio", "visible": "" },
            { "name": "Zero", "visible": 0 },
            "not a product",
            { "name": "Visível", "visible": true }
        ] } });

        let menu = process_products(&payload, &OutputConfig::default());

        assert_eq!(menu.item_count(), 1);
        assert_eq!(menu.get("Outros").unwrap().items[0].name, "Visível");
    }

    #[test]
    fn fills_defaults_for_missing_fields() {
        let payload = json!([{ "category": null, "name": "", "price": null }]);

        let menu = process_products(&payload, &OutputConfig::default());
        let item = &menu.get("Outros").unwrap().items[0];

        assert_eq!(item.name, "Sem Nome");
        assert_eq!(item.price, "R$ 0,00");
        assert!(item.addons.is_empty());
    }

    #[test]
    fn reads_image_variants() {
        assert_eq!(
            image_url(&json!({ "imageUrl": "https://a/b.png" })),
            Some("https://a/b.png".to_string())
        );
        assert_eq!(
            image_url(&json!({ "images": [ { "url": "https://a/c.png" } ] })),
            Some("https://a/c.png".to_string())
        );
        assert_eq!(
            image_url(&json!({ "image": "", "image_url": "https://a/d.png" })),
            Some("https://a/d.png".to_string())
        );
        assert_eq!(image_url(&json!({ "image": "" })), None);
        assert_eq!(image_url(&json!({ "image": null })), None);
    }

    #[test]
    fn maps_option_groups_to_addons() {
        let payload = json!([{
            "name": "Açaí 500ml",
            "price": 20,
            "optionGroups": [
                { "name": "Complementos", "options": [
                    { "name": "Granola", "price": 2 },
                    { "name": "Leite ninho", "price": "3.5" }
                ] },
                { "title": "Calda", "items": [ { "name": "Morango" } ] },
                { "options": [] }
            ]
        }]);

        let menu = process_products(&payload, &OutputConfig::default());
        let addons = &menu.get("Outros").unwrap().items[0].addons;

        assert_eq!(addons.len(), 2);
        assert_eq!(addons[0].name, "Complementos");
        assert_eq!(addons[0].options[1].price, "R$ 3,50");
        assert_eq!(addons[1].name, "Calda");
        assert_eq!(addons[1].options[0].price, "R$ 0,00");
    }
}
