use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::utilities::normalize::split_category;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AddonOption {
    pub name: String,
    pub price: String,
}

/// Option group offered with an item ("Adicionais", "Escolha o molho", ...).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Addon {
    pub name: String,
    pub options: Vec<AddonOption>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MenuItem {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub addons: Vec<Addon>,
}

impl MenuItem {
    fn dedup_key(&self) -> (String, String) {
        (self.name.to_lowercase(), self.price.clone())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Category {
    #[serde(skip)]
    pub name: String,
    pub emoji: String,
    pub items: Vec<MenuItem>,
}

/// Categories in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Menu {
    categories: Vec<Category>,
    default_emoji: String,
    default_category: String,
}

impl Menu {
    pub fn new(default_emoji: &str, default_category: &str) -> Self {
        Menu {
            categories: Vec::new(),
            default_emoji: default_emoji.to_string(),
            default_category: default_category.to_string(),
        }
    }

    /// Adds an item under a raw category label such as `"🍔 Lanches"`.
    pub fn push_item(&mut self, category_label: &str, item: MenuItem) {
        let (emoji, name) = split_category(category_label, &self.default_emoji, &self.default_category);
        self.category_mut(name, emoji).items.push(item);
    }

    /// Folds `other` into this menu, skipping items already present in the
    /// same category. Returns how many items were new.
    pub fn merge(&mut self, other: Menu) -> usize {
        let mut added = 0;

        for incoming in other.categories {
            let category = self.category_mut(incoming.name, incoming.emoji);
            let mut seen: HashSet<(String, String)> =
                category.items.iter().map(MenuItem::dedup_key).collect();

            for item in incoming.items {
                if seen.insert(item.dedup_key()) {
                    category.items.push(item);
                    added += 1;
                }
            }
        }

        added
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut [Category] {
        &mut self.categories
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    fn category_mut(&mut self, name: String, emoji: String) -> &mut Category {
        let index = match self.categories.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.categories.push(Category {
                    name,
                    emoji,
                    items: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        &mut self.categories[index]
    }
}

impl Serialize for Menu {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(&category.name, category)?;
        }
        map.end()
    }
}
