// File: src/config.rs
// Purpose: Configuration parsing from waymark.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use waymark_router::{ResolveContext, RouteFolder};
use waymark_stack::{HttpMethod, MiddlewareUse, SlotOrder, DEFAULT_SLOTS};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "waymark.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Application source directory (default: "src")
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// API route root below the source directory (default: "api")
    #[serde(default = "default_api_dir")]
    pub api_dir: String,

    /// Page route root below the source directory (default: "pages")
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Route file extensions (default: ["rs", "rsx"])
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// File stem of a directory's own route (default: "index")
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// File stem of a page layout (default: "layout")
    #[serde(default = "default_layout_name")]
    pub layout_name: String,

    /// Whether literal segments match case-insensitively (default: false)
    #[serde(default = "default_false")]
    pub case_insensitive: bool,
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Canonical slot order
    #[serde(default = "default_slots")]
    pub slots: Vec<String>,

    /// Core middleware applied to every API route
    #[serde(default = "default_core")]
    pub core: Vec<CoreMiddleware>,
}

/// One core middleware, named for display and code generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreMiddleware {
    pub name: String,

    #[serde(default)]
    pub slot: Option<String>,

    #[serde(default)]
    pub on: Option<Vec<String>>,
}

// Default values
fn default_name() -> String {
    "waymark-app".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_api_dir() -> String {
    "api".to_string()
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["rs".to_string(), "rsx".to_string()]
}

fn default_index_name() -> String {
    "index".to_string()
}

fn default_layout_name() -> String {
    "layout".to_string()
}

fn default_slots() -> Vec<String> {
    DEFAULT_SLOTS.iter().map(|slot| slot.to_string()).collect()
}

fn default_core() -> Vec<CoreMiddleware> {
    ["errorHandler", "params", "bodyparser", "payload"]
        .iter()
        .map(|slot| CoreMiddleware {
            name: slot.to_string(),
            slot: Some(slot.to_string()),
            on: None,
        })
        .collect()
}

fn default_false() -> bool {
    false
}

// Default implementations
impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            api_dir: default_api_dir(),
            pages_dir: default_pages_dir(),
            extensions: default_extensions(),
            index_name: default_index_name(),
            layout_name: default_layout_name(),
            case_insensitive: false,
        }
    }
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            slots: default_slots(),
            core: default_core(),
        }
    }
}

impl Config {
    /// Load configuration from waymark.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./waymark.toml)
    pub fn load_default() -> Result<Self> {
        Self::load(CONFIG_FILE)
    }

    /// Naming conventions for one route folder of the project at `root`
    pub fn resolve_context(&self, root: &Path, folder: RouteFolder) -> ResolveContext {
        let routing = &self.routing;
        let folder_dir = match folder {
            RouteFolder::Api => &routing.api_dir,
            RouteFolder::Pages => &routing.pages_dir,
        };

        ResolveContext::new(root.join(&routing.source_dir), folder)
            .with_folder_dir(folder_dir.as_str())
            .with_extensions(routing.extensions.iter().cloned())
            .with_index_name(routing.index_name.as_str())
            .with_layout_name(routing.layout_name.as_str())
    }

    pub fn slot_order(&self) -> SlotOrder {
        SlotOrder::new(self.middleware.slots.iter().cloned())
    }

    /// Core middleware as stack definitions, labelled by name
    pub fn core_middleware(&self) -> Result<Vec<MiddlewareUse<String>>> {
        self.middleware
            .core
            .iter()
            .map(|core| {
                let mut def = MiddlewareUse::new([core.name.clone()]);
                if let Some(slot) = &core.slot {
                    def = def.with_slot(slot.as_str());
                }
                if let Some(on) = &core.on {
                    let methods = on
                        .iter()
                        .map(|method| method.parse::<HttpMethod>())
                        .collect::<Result<Vec<_>, _>>()
                        .with_context(|| format!("Invalid `on` for core middleware `{}`", core.name))?;
                    def = def.with_on(methods);
                }
                Ok(def)
            })
            .collect()
    }
}
