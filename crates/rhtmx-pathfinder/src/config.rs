// File: src/config.rs
// Purpose: Route table parsing from routes.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::field::FieldValidator;
use crate::route::{RouteCollection, RouteDefinition, RouteProperties};
use crate::router::{Router, RouterBuilder};

/// Default route table file name
pub const DEFAULT_CONFIG_FILE: &str = "routes.toml";

/// A route table described in TOML
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouteTableConfig {
    #[serde(default)]
    pub router: RouterSettings,

    #[serde(default)]
    pub tags: Vec<TagConfig>,

    #[serde(default)]
    pub fields: Vec<FieldConfig>,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

/// Router-wide switches
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouterSettings {
    /// Reject duplicate route names (default: false)
    #[serde(default = "default_false")]
    pub strict_names: bool,
}

/// A named regex fragment usable as `[!:name:!]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagConfig {
    pub name: String,
    pub regex: String,
}

/// An "equals" field: the announced value must equal every bound property
/// the route sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,

    #[serde(default)]
    pub binds: Vec<String>,
}

/// A single route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub pattern: String,

    /// Handler reference stored as the route abstraction
    pub handler: String,

    /// Route name (auto-generated when absent)
    #[serde(default)]
    pub name: Option<String>,

    /// Role property exposed to field validators
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub before: Vec<HookConfig>,

    #[serde(default)]
    pub after: Vec<HookConfig>,
}

/// A before/after hook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    pub handler: String,

    #[serde(default = "default_priority")]
    pub priority: i32,
}

/// Routes registered under a common prefix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    pub prefix: String,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

// Default values
fn default_false() -> bool {
    false
}

fn default_priority() -> i32 {
    0
}

/// Route abstraction produced from a route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerRef {
    pub handler: String,
    pub role: Option<String>,
}

impl HandlerRef {
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            role: None,
        }
    }
}

impl RouteProperties for HandlerRef {
    const PROPERTIES: &'static [&'static str] = &["handler", "role"];

    fn property(&self, name: &str) -> Option<String> {
        match name {
            "handler" => Some(self.handler.clone()),
            "role" => self.role.clone(),
            _ => None,
        }
    }
}

impl RouteConfig {
    fn to_definition(&self) -> RouteDefinition<HandlerRef> {
        let mut definition = RouteDefinition::new(HandlerRef {
            handler: self.handler.clone(),
            role: self.role.clone(),
        });
        if let Some(name) = &self.name {
            definition.set_name(name.as_str());
        }
        for hook in &self.before {
            definition.push_before(HandlerRef::new(hook.handler.as_str()), hook.priority);
        }
        for hook in &self.after {
            definition.push_after(HandlerRef::new(hook.handler.as_str()), hook.priority);
        }
        definition
    }
}

impl FieldConfig {
    fn to_validator(&self) -> FieldValidator {
        let validator = FieldValidator::new(self.name.as_str(), |value, props| {
            props.iter().all(|(_, expected)| expected == value)
        });
        self.binds
            .iter()
            .fold(validator, |validator, property| validator.bind(property.as_str()))
    }
}

impl RouteTableConfig {
    /// Load a route table from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means an empty table
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read route table: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse route table: {:?}", path))
    }

    /// Load the route table from the default path (./routes.toml)
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_FILE)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Registers tags, fields, routes and mounts, in that order
    pub fn into_builder(self) -> Result<RouterBuilder<HandlerRef>> {
        let mut builder = RouterBuilder::new();
        builder.strict_names(self.router.strict_names);

        for tag in &self.tags {
            builder
                .add_tag(&tag.name, &tag.regex)
                .with_context(|| format!("Invalid tag {:?}", tag.name))?;
        }

        for field in &self.fields {
            builder.add_field(field.to_validator());
        }

        for route in &self.routes {
            builder
                .register_route(&route.pattern, route.to_definition())
                .with_context(|| format!("Invalid route pattern {:?}", route.pattern))?;
        }

        for mount in &self.mounts {
            let mut collection = RouteCollection::new();
            for route in &mount.routes {
                collection.register_route(route.pattern.as_str(), route.to_definition());
            }
            builder
                .mount(&mount.prefix, collection)
                .with_context(|| format!("Invalid routes under {:?}", mount.prefix))?;
        }

        Ok(builder)
    }

    pub fn build_router(self) -> Result<Router<HandlerRef>> {
        let router = self.into_builder()?.build()?;
        Ok(router)
    }
}
