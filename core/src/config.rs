//! Declarative route configuration.
//!
//! ```json
//! {
//!   "routes": { "GET": [["/users/(id)", "Users@show"]], "ANY": [["/", "Home@index"]] },
//!   "hooks":  { "before": [["/admin/(:catchall)", "Auth@check", "GET"]], "after": [] }
//! }
//! ```

use crate::errors::{error_codes, ProjectError};
use crate::routing::table::RouteTable;
use crate::routing::types::{HookType, HttpMethod};
use serde::Deserialize;
use std::path::Path;

/// `[pattern, handler]` or `[pattern, handler, method]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RouteEntry {
    WithMethod(String, String, String),
    Pair(String, String),
}

impl RouteEntry {
    pub fn pattern(&self) -> &str {
        match self {
            RouteEntry::WithMethod(pattern, _, _) | RouteEntry::Pair(pattern, _) => pattern.as_str(),
        }
    }

    pub fn handler(&self) -> &str {
        match self {
            RouteEntry::WithMethod(_, handler, _) | RouteEntry::Pair(_, handler) => handler.as_str(),
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            RouteEntry::WithMethod(_, _, method) => Some(method.as_str()),
            RouteEntry::Pair(..) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    #[serde(default)]
    pub before: Vec<RouteEntry>,
    #[serde(default)]
    pub after: Vec<RouteEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Method name to entries, in document order.
    #[serde(default)]
    pub routes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub hooks: HookConfig,
}

impl RouteConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ProjectError> {
        serde_json::from_str(json).map_err(invalid)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ProjectError> {
        serde_json::from_value(value).map_err(invalid)
    }

    pub fn from_path(path: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProjectError::config(
                error_codes::CONFIG_IO,
                format!("Cannot read {}: {}", path.display(), e),
            )
        })?;
        Self::from_json_str(&content)
    }

    /// Main route entries grouped by method, in document order.
    pub fn route_entries(&self) -> Result<Vec<(HttpMethod, Vec<RouteEntry>)>, ProjectError> {
        self.routes
            .iter()
            .map(|(method, entries)| parse_bucket(method, entries))
            .collect()
    }
}

fn parse_bucket(
    method: &str,
    entries: &serde_json::Value,
) -> Result<(HttpMethod, Vec<RouteEntry>), ProjectError> {
    let method = HttpMethod::parse(method)?;
    let entries: Vec<RouteEntry> = serde_json::from_value(entries.clone()).map_err(invalid)?;
    Ok((method, entries))
}

impl RouteTable {
    pub fn from_config(config: &RouteConfig) -> Result<Self, ProjectError> {
        let mut table = RouteTable::new();
        table.load_config(config)?;
        Ok(table)
    }

    /// Register every route and hook in `config`, stopping at the first failure.
    pub fn load_config(&mut self, config: &RouteConfig) -> Result<(), ProjectError> {
        for (method, entries) in &config.routes {
            let (method, entries) = parse_bucket(method, entries)?;
            for entry in entries {
                let method = match entry.method() {
                    Some(own) => HttpMethod::parse(own)?,
                    None => method.clone(),
                };
                self.register(HookType::Main, method, entry.pattern(), entry.handler().into())?;
            }
        }

        for (hook, entries) in [
            (HookType::Before, &config.hooks.before),
            (HookType::After, &config.hooks.after),
        ] {
            for entry in entries {
                let method = match entry.method() {
                    Some(method) => HttpMethod::parse(method)?,
                    None => HttpMethod::ANY,
                };
                self.register(hook, method, entry.pattern(), entry.handler().into())?;
            }
        }

        log::debug!("Loaded {} routes from config", self.len());
        Ok(())
    }
}

fn invalid(e: serde_json::Error) -> ProjectError {
    ProjectError::config(
        error_codes::INVALID_CONFIG,
        format!("Invalid route config: {}", e),
    )
}
