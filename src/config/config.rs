use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::strategies::StrategyKind;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base: BaseConfig,
    pub store: StoreConfig,
    pub http: HttpConfig,
    pub flaresolverr: FlareSolverrConfig,
    pub browser: BrowserConfig,
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
    pub strategies: StrategiesConfig,
    pub addons: AddonsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub name: String,
    pub version: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        BaseConfig {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The one store this tool snapshots.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub slug: String,
    pub company_id: String,
    pub api_base_url: String,
    /// Public menu page. Derived from the slug when unset.
    pub site_url: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            slug: "cafe-ipiranga".to_string(),
            company_id: "5020ff7e-3077-4507-911a-7820e15488e3".to_string(),
            api_base_url: "https://api.olaclick.com/v1".to_string(),
            site_url: None,
        }
    }
}

impl StoreConfig {
    /// Store front origin, e.g. `https://cafe-ipiranga.ola.click`.
    pub fn origin(&self) -> String {
        format!("https://{}.ola.click", self.slug)
    }

    pub fn page_url(&self) -> String {
        match &self.site_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => format!("{}/products", self.origin()),
        }
    }

    /// API endpoints in the order they are tried.
    pub fn api_endpoints(&self) -> Vec<String> {
        let base = self.api_base_url.trim_end_matches('/');
        let mut endpoints = Vec::new();

        if !self.company_id.trim().is_empty() {
            endpoints.push(format!("{}/companies/{}/products", base, self.company_id.trim()));
        }
        if !self.slug.trim().is_empty() {
            endpoints.push(format!(
                "{}/companies/slug/{}/products",
                base,
                urlencoding::encode(self.slug.trim())
            ));
        }

        endpoints
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlareSolverrConfig {
    /// When set, store pages are fetched through FlareSolverr instead of directly.
    pub flaresolverr_url: Option<String>,
    pub max_timeout: u64,
}

impl Default for FlareSolverrConfig {
    fn default() -> Self {
        FlareSolverrConfig {
            flaresolverr_url: None,
            max_timeout: 60000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub wait_timeout_secs: u64,
    pub max_scrolls: usize,
    pub idle_rounds: usize,
    pub scroll_delay_min_ms: u64,
    pub scroll_delay_max_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        BrowserConfig {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            wait_timeout_secs: 30,
            max_scrolls: 60,
            idle_rounds: 3,
            scroll_delay_min_ms: 600,
            scroll_delay_max_ms: 1500,
        }
    }
}

/// CSS selector lists used on rendered store pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub category_section: String,
    pub category_title: String,
    pub item_card: String,
    pub item_name: String,
    pub item_description: String,
    pub item_price: String,
    pub item_image: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            category_section: "section[data-category], div.category-section, div.products-category, section.category".to_string(),
            category_title: "h2, h3, .category-name, .category-title".to_string(),
            item_card: "div.product-card, a.product-card, div.product-item, li.product-item, [data-product-id]".to_string(),
            item_name: ".product-name, .product-title, .product-card__name, h4, h3".to_string(),
            item_description: ".product-description, .product-card__description, p".to_string(),
            item_price: ".product-price, .product-card__price, .price".to_string(),
            item_image: "img".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub placeholder_image: String,
    pub default_emoji: String,
    pub default_category: String,
    pub default_item_name: String,
    pub currency_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            path: "menu.json".to_string(),
            placeholder_image: "https://placehold.co/400x300?text=Sem+Imagem".to_string(),
            default_emoji: "🍽️".to_string(),
            default_category: "Outros".to_string(),
            default_item_name: "Sem Nome".to_string(),
            currency_prefix: "R$".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategiesConfig {
    pub order: Vec<StrategyKind>,
}

impl Default for StrategiesConfig {
    fn default() -> Self {
        StrategiesConfig {
            order: StrategyKind::default_order(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddonsConfig {
    pub rules: Vec<AddonRule>,
}

/// Attaches an option group to every item it matches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddonRule {
    pub group: String,
    pub options: Vec<AddonOptionRule>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddonOptionRule {
    pub name: String,
    pub price: f64,
}

pub fn load_config(file_path: &str) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(File::new(file_path, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("strategies.order")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize::<AppConfig>()
}
