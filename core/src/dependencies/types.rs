use crate::errors::{error_codes, ProjectError};
use crate::routing::types::{HandlerFn, HandlerResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyScope {
    Singleton,
    Request,
    Transient,
}

/// An instance exposing named actions, the target of `"Identifier@action"` handlers.
pub trait Controller: Send + Sync {
    fn call(&self, action: &str, args: &[String]) -> HandlerResult;
}

pub type ControllerFactory = Box<dyn Fn() -> Arc<dyn Controller> + Send + Sync>;

pub struct Dependency {
    pub key: String,
    pub scope: DependencyScope,
    pub factory: ControllerFactory,
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Request-scoped instances, owned by one dispatcher for the life of one request.
#[derive(Default)]
pub struct RequestScope {
    pub(crate) instances: HashMap<String, Arc<dyn Controller>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

/// Controller assembled from named closures.
#[derive(Default, Clone)]
pub struct ActionController {
    actions: HashMap<String, Arc<HandlerFn>>,
}

impl ActionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[String]) -> HandlerResult + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(f));
        self
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }
}

impl Controller for ActionController {
    fn call(&self, action: &str, args: &[String]) -> HandlerResult {
        let handler = self.actions.get(action).ok_or_else(|| {
            ProjectError::resolution(
                error_codes::ACTION_NOT_FOUND,
                format!("Action '{}' is not defined", action),
            )
        })?;
        handler(args)
    }
}

impl fmt::Debug for ActionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.actions.keys().collect();
        names.sort();
        f.debug_struct("ActionController")
            .field("actions", &names)
            .finish()
    }
}
