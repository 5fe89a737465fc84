//! Configuration loader and validator for the recipes proxy.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Environment variable holding the listen port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable holding the Notion integration token.
pub const NOTION_KEY_ENV: &str = "NOTION_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub notion: Notion,
    pub recipes: Recipes,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Server {
    pub host: String,
    /// No default: must come from the file or `PORT`.
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 0,
        }
    }
}

/// Notion API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Notion {
    pub token: String,
    pub version: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Notion {
    fn default() -> Self {
        Self {
            token: String::new(),
            version: "2022-06-28".into(),
            base_url: "https://api.notion.com/".into(),
            timeout_secs: 60,
        }
    }
}

/// Property names and fixed content of the recipes database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Recipes {
    /// Properties read when listing entries.
    pub summary_fields: SummaryFields,
    /// Properties written when creating an entry.
    pub create_fields: CreateFields,
    pub icon: String,
    pub headings: Headings,
    pub children_page_size: u32,
}

impl Default for Recipes {
    fn default() -> Self {
        Self {
            summary_fields: SummaryFields::default(),
            create_fields: CreateFields::default(),
            icon: "🍨".into(),
            headings: Headings::default(),
            children_page_size: 50,
        }
    }
}

/// Title and multi-select property names read from each database entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SummaryFields {
    pub title: String,
    pub tags: String,
}

impl Default for SummaryFields {
    fn default() -> Self {
        Self {
            title: "Nombre".into(),
            tags: "Etiqueta".into(),
        }
    }
}

/// Title and multi-select property names written on new entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CreateFields {
    pub title: String,
    pub tags: String,
}

impl Default for CreateFields {
    fn default() -> Self {
        Self {
            title: "Name".into(),
            tags: "Tags".into(),
        }
    }
}

/// Section headings inserted between the caller's blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Headings {
    pub ingredients: String,
    pub steps: String,
    pub details: String,
}

impl Default for Headings {
    fn default() -> Self {
        Self {
            ingredients: "Ingredientes".into(),
            steps: "Pasos".into(),
            details: "Detalles".into(),
        }
    }
}

impl Config {
    /// Overlay `PORT` and `NOTION_KEY` using `lookup` (usually `std::env::var`).
    /// Values that are unset or unparsable leave the current setting alone.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV).and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(token) = lookup(NOTION_KEY_ENV).filter(|t| !t.trim().is_empty()) {
            self.notion.token = token;
        }
    }

    /// `host:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Load configuration from a YAML file.
/// - If `path` is None, uses `config.yaml` in the current working directory.
///
/// The result is not validated yet: environment overrides are applied first.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.host.trim().is_empty() {
        return Err(ConfigError::Invalid("server.host must be non-empty"));
    }
    if cfg.server.port == 0 {
        return Err(ConfigError::Invalid("server.port must be set (or PORT)"));
    }

    if cfg.notion.token.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.token must be non-empty (or NOTION_KEY)"));
    }
    if cfg.notion.version.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.version must be non-empty"));
    }
    if Url::parse(&cfg.notion.base_url).is_err() {
        return Err(ConfigError::Invalid("notion.base_url must be a valid URL"));
    }
    if cfg.notion.timeout_secs == 0 {
        return Err(ConfigError::Invalid("notion.timeout_secs must be > 0"));
    }

    let r = &cfg.recipes;
    if r.summary_fields.title.trim().is_empty() || r.summary_fields.tags.trim().is_empty() {
        return Err(ConfigError::Invalid("recipes.summary_fields must be non-empty"));
    }
    if r.create_fields.title.trim().is_empty() || r.create_fields.tags.trim().is_empty() {
        return Err(ConfigError::Invalid("recipes.create_fields must be non-empty"));
    }
    if r.icon.trim().is_empty() {
        return Err(ConfigError::Invalid("recipes.icon must be non-empty"));
    }
    let h = &r.headings;
    if h.ingredients.trim().is_empty() || h.steps.trim().is_empty() || h.details.trim().is_empty() {
        return Err(ConfigError::Invalid("recipes.headings must be non-empty"));
    }
    // Notion caps page_size at 100.
    if r.children_page_size == 0 || r.children_page_size > 100 {
        return Err(ConfigError::Invalid("recipes.children_page_size must be in 1..=100"));
    }

    Ok(())
}

/// Returns an example YAML configuration.
pub fn example() -> &'static str {
    r#"server:
  host: "0.0.0.0"
  port: 3000

notion:
  token: "YOUR_NOTION_INTEGRATION_TOKEN"
  version: "2022-06-28"
  base_url: "https://api.notion.com/"
  timeout_secs: 60

recipes:
  summary_fields:
    title: "Nombre"
    tags: "Etiqueta"
  create_fields:
    title: "Name"
    tags: "Tags"
  icon: "🍨"
  headings:
    ingredients: "Ingredientes"
    steps: "Pasos"
    details: "Detalles"
  children_page_size: 50
"#
}
