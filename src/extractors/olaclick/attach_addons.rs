use colored::Colorize;

use crate::config::config::AddonRule;
use crate::menu::{Addon, AddonOption, Menu};
use crate::utilities::normalize::format_price;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Entries left after dropping blank ones.
fn terms(values: &[String]) -> Vec<&str> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).collect()
}

fn rule_matches(rule: &AddonRule, category: &str, item_name: &str) -> bool {
    let categories = terms(&rule.categories);
    let category_ok = categories.is_empty()
        || categories
            .iter()
            .any(|c| c.to_lowercase() == category.to_lowercase());

    let keywords = terms(&rule.keywords);
    let keyword_ok = keywords.is_empty() || keywords.iter().any(|k| contains_ci(item_name, k));

    let excluded = terms(&rule.exclude_keywords)
        .iter()
        .any(|k| contains_ci(item_name, k));

    category_ok && keyword_ok && !excluded
}

/// Attaches the configured option groups to matching items.
/// Returns the number of groups attached.
pub fn attach_addons(menu: &mut Menu, rules: &[AddonRule], currency_prefix: &str) -> usize {
    let mut attached = 0;

    for rule in rules {
        if rule.group.trim().is_empty() {
            eprintln!("{}", "Ignoring addon rule without a group name".yellow());
            continue;
        }
        if terms(&rule.categories).is_empty() && terms(&rule.keywords).is_empty() {
            eprintln!(
                "{}",
                format!("Ignoring addon rule '{}': it names no category and no keyword", rule.group).yellow()
            );
            continue;
        }

        let addon = Addon {
            name: rule.group.trim().to_string(),
            options: rule
                .options
                .iter()
                .map(|option| AddonOption {
                    name: option.name.trim().to_string(),
                    price: format_price(option.price, currency_prefix),
                })
                .collect(),
        };

        for category in menu.categories_mut() {
            for item in category.items.iter_mut() {
                if !rule_matches(rule, &category.name, &item.name) {
                    continue;
                }
                if item.addons.iter().any(|a| a.name.eq_ignore_ascii_case(&addon.name)) {
                    continue;
                }
                item.addons.push(addon.clone());
                attached += 1;
            }
        }
    }

    attached
}
