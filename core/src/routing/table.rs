use crate::dependencies::{Container, DependencyResolver};
use crate::errors::{error_codes, ProjectError};
use crate::routing::parser::compile_pattern;
use crate::routing::types::{Handler, HookType, HttpMethod, Route, RouteMatch};

/// Registered routes and hooks, in registration order, plus the container their
/// handler references resolve against.
///
/// Built once, then shared read-only by any number of dispatchers.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    before: Vec<Route>,
    after: Vec<Route>,
    container: DependencyResolver,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a main route for every method.
    pub fn add(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), ProjectError> {
        self.register(HookType::Main, HttpMethod::ANY, pattern, handler.into())
    }

    pub fn add_for(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> Result<(), ProjectError> {
        self.register(HookType::Main, method, pattern, handler.into())
    }

    pub fn get(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), ProjectError> {
        self.add_for(HttpMethod::GET, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), ProjectError> {
        self.add_for(HttpMethod::POST, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), ProjectError> {
        self.add_for(HttpMethod::PUT, pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), ProjectError> {
        self.add_for(HttpMethod::PATCH, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), ProjectError> {
        self.add_for(HttpMethod::DELETE, pattern, handler)
    }

    pub fn options(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), ProjectError> {
        self.add_for(HttpMethod::OPTIONS, pattern, handler)
    }

    pub fn before(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), ProjectError> {
        self.register(HookType::Before, HttpMethod::ANY, pattern, handler.into())
    }

    pub fn before_for(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> Result<(), ProjectError> {
        self.register(HookType::Before, method, pattern, handler.into())
    }

    pub fn after(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), ProjectError> {
        self.register(HookType::After, HttpMethod::ANY, pattern, handler.into())
    }

    pub fn after_for(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> Result<(), ProjectError> {
        self.register(HookType::After, method, pattern, handler.into())
    }

    /// Register the conventional verb set for a resource controller.
    ///
    /// Each verb gets one route bound to `controller@<verb>`: GET and OPTIONS serve
    /// both the collection and a member through an optional id, POST targets the
    /// collection, PUT/PATCH/DELETE target a member.
    pub fn restful(&mut self, base: &str, controller: &str) -> Result<(), ProjectError> {
        let base = base.trim().trim_end_matches('/');
        let collection = if base.is_empty() { "/" } else { base };
        let member = format!("{}/(id)", base);
        let maybe_member = format!("{}/(?id)", base);

        for method in HttpMethod::VERBS.iter() {
            let pattern = match method {
                HttpMethod::GET | HttpMethod::OPTIONS => maybe_member.as_str(),
                HttpMethod::POST => collection,
                _ => member.as_str(),
            };
            let handler = format!("{}@{}", controller, method.as_str().to_lowercase());
            self.add_for(method.clone(), pattern, handler)?;
        }
        Ok(())
    }

    /// Compile and store one route. A pattern error leaves the table untouched.
    pub fn register(
        &mut self,
        hook: HookType,
        method: HttpMethod,
        pattern: &str,
        handler: Handler,
    ) -> Result<(), ProjectError> {
        if !method.is_routable() {
            return Err(ProjectError::config(
                error_codes::INVALID_HTTP_METHOD,
                format!("Routes cannot be registered for method {}", method),
            ));
        }
        let segments = compile_pattern(pattern)?;

        let key = match &handler {
            Handler::Callable(callable) => {
                let key = self.unique_key(registration_key(hook, &method, pattern));
                self.container.register_callable(key.clone(), callable.clone());
                key
            }
            Handler::Named { identifier, .. } => {
                self.container.declare(identifier.clone());
                identifier.clone()
            }
            Handler::Key(key) => key.clone(),
        };

        log::debug!(
            "Registering {} route {} {} -> {:?}",
            hook,
            method,
            pattern,
            handler
        );

        let route = Route {
            pattern: pattern.to_string(),
            segments,
            method,
            hook,
            handler,
            key,
        };
        self.bucket_mut(hook).push(route);
        Ok(())
    }

    /// Routes of a hook type in registration order.
    pub fn routes(&self, hook: HookType) -> &[Route] {
        match hook {
            HookType::Main => &self.routes,
            HookType::Before => &self.before,
            HookType::After => &self.after,
        }
    }

    /// Routes of a hook type applicable to `method`; `ANY` routes keep their
    /// registration position among method-specific ones.
    pub fn routes_for<'a>(
        &'a self,
        method: &'a HttpMethod,
        hook: HookType,
    ) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes(hook)
            .iter()
            .filter(move |route| route.method.accepts(method))
    }

    /// Main routes grouped under the method they were registered with, in order of
    /// each method's first registration.
    pub fn routes_by_method(&self) -> Vec<(HttpMethod, Vec<&Route>)> {
        let mut groups: Vec<(HttpMethod, Vec<&Route>)> = Vec::new();
        for route in &self.routes {
            match groups.iter_mut().find(|(method, _)| *method == route.method) {
                Some((_, routes)) => routes.push(route),
                None => groups.push((route.method.clone(), vec![route])),
            }
        }
        groups
    }

    /// First route, in registration order, whose pattern matches `path`.
    pub fn find<'a>(
        &'a self,
        method: &HttpMethod,
        hook: HookType,
        path: &[String],
    ) -> Option<RouteMatch<'a>> {
        self.routes(hook)
            .iter()
            .filter(|route| route.method.accepts(method))
            .find_map(|route| {
                route
                    .try_match(path)
                    .map(|captures| RouteMatch { route, captures })
            })
    }

    pub fn len(&self) -> usize {
        self.routes.len() + self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn container(&self) -> &DependencyResolver {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut DependencyResolver {
        &mut self.container
    }

    /// `base` itself when free, otherwise `base#2`, `base#3`, ...
    fn unique_key(&self, base: String) -> String {
        if !self.container.registered(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let key = format!("{}#{}", base, n);
            if !self.container.registered(&key) {
                return key;
            }
            n += 1;
        }
    }

    fn bucket_mut(&mut self, hook: HookType) -> &mut Vec<Route> {
        match hook {
            HookType::Main => &mut self.routes,
            HookType::Before => &mut self.before,
            HookType::After => &mut self.after,
        }
    }
}

fn registration_key(hook: HookType, method: &HttpMethod, pattern: &str) -> String {
    match (hook, method) {
        (HookType::Main, HttpMethod::ANY) => pattern.to_string(),
        (HookType::Main, _) => format!("{} {}", method, pattern),
        _ => format!("{}:{} {}", hook, method, pattern),
    }
}
