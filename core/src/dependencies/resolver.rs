use crate::dependencies::types::{Controller, Dependency, DependencyScope, RequestScope};
use crate::errors::{error_codes, ProjectError};
use crate::routing::types::HandlerFn;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Lookup contract the dispatcher consumes to turn handler references into invokables.
pub trait Container: Send + Sync {
    fn registered(&self, name: &str) -> bool;

    fn resolve(
        &self,
        name: &str,
        scope: &mut RequestScope,
    ) -> Result<Arc<dyn Controller>, ProjectError>;

    fn callable(&self, key: &str) -> Result<Arc<HandlerFn>, ProjectError>;
}

pub struct DependencyResolver {
    dependencies: HashMap<String, Dependency>,
    declared: HashSet<String>,
    callables: HashMap<String, Arc<HandlerFn>>,
    singletons: Mutex<HashMap<String, Arc<dyn Controller>>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self {
            dependencies: HashMap::new(),
            declared: HashSet::new(),
            callables: HashMap::new(),
            singletons: Mutex::new(HashMap::new()),
        }
    }

    /// Mark a name as resolvable before its factory is bound.
    pub fn declare(&mut self, name: impl Into<String>) {
        self.declared.insert(name.into());
    }

    pub fn register(&mut self, dependency: Dependency) {
        log::debug!(
            "Registering dependency {} with scope {:?}",
            dependency.key,
            dependency.scope
        );
        self.singletons.lock().remove(&dependency.key);
        self.dependencies.insert(dependency.key.clone(), dependency);
    }

    pub fn singleton<C, F>(&mut self, key: impl Into<String>, factory: F)
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.bind(key.into(), DependencyScope::Singleton, factory);
    }

    pub fn request<C, F>(&mut self, key: impl Into<String>, factory: F)
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.bind(key.into(), DependencyScope::Request, factory);
    }

    pub fn transient<C, F>(&mut self, key: impl Into<String>, factory: F)
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.bind(key.into(), DependencyScope::Transient, factory);
    }

    /// Bind an already built instance as a singleton.
    pub fn instance(&mut self, key: impl Into<String>, controller: Arc<dyn Controller>) {
        let key = key.into();
        self.register(Dependency {
            key: key.clone(),
            scope: DependencyScope::Singleton,
            factory: Box::new(move || Arc::clone(&controller)),
        });
    }

    pub fn register_callable(&mut self, key: impl Into<String>, callable: Arc<HandlerFn>) {
        let key = key.into();
        log::debug!("Registering callable {}", key);
        self.callables.insert(key, callable);
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    pub fn registered_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .dependencies
            .keys()
            .chain(self.declared.iter())
            .chain(self.callables.keys())
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    fn bind<C, F>(&mut self, key: String, scope: DependencyScope, factory: F)
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.register(Dependency {
            key,
            scope,
            factory: Box::new(move || Arc::new(factory()) as Arc<dyn Controller>),
        });
    }
}

impl Container for DependencyResolver {
    fn registered(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
            || self.declared.contains(name)
            || self.callables.contains_key(name)
    }

    fn resolve(
        &self,
        name: &str,
        scope: &mut RequestScope,
    ) -> Result<Arc<dyn Controller>, ProjectError> {
        let dep = match self.dependencies.get(name) {
            Some(dep) => dep,
            None if self.declared.contains(name) => {
                return Err(ProjectError::resolution(
                    error_codes::DEPENDENCY_UNBOUND,
                    format!("Dependency '{}' is declared but has no factory bound", name),
                ))
            }
            None => {
                return Err(ProjectError::resolution(
                    error_codes::DEPENDENCY_NOT_FOUND,
                    format!("Dependency '{}' not registered", name),
                ))
            }
        };

        match dep.scope {
            DependencyScope::Singleton => {
                let mut singletons = self.singletons.lock();
                let instance = singletons
                    .entry(name.to_string())
                    .or_insert_with(|| (dep.factory)());
                Ok(Arc::clone(instance))
            }
            DependencyScope::Request => {
                let instance = scope
                    .instances
                    .entry(name.to_string())
                    .or_insert_with(|| (dep.factory)());
                Ok(Arc::clone(instance))
            }
            DependencyScope::Transient => Ok((dep.factory)()),
        }
    }

    fn callable(&self, key: &str) -> Result<Arc<HandlerFn>, ProjectError> {
        self.callables.get(key).cloned().ok_or_else(|| {
            ProjectError::resolution(
                error_codes::CALLABLE_NOT_FOUND,
                format!("No callable registered under '{}'", key),
            )
        })
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("registered", &self.registered_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::types::ActionController;
    use crate::routing::types::HandlerResult;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_factory(counter: Arc<AtomicUsize>) -> impl Fn() -> ActionController + Send + Sync {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ActionController::new().action("index", |_| Ok(json!("ok")))
        }
    }

    #[test]
    fn test_singleton_built_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let mut resolver = DependencyResolver::new();
        resolver.singleton("Home", counting_factory(Arc::clone(&built)));

        let mut first = RequestScope::new();
        let mut second = RequestScope::new();
        resolver.resolve("Home", &mut first).unwrap();
        resolver.resolve("Home", &mut second).unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_request_scope_built_once_per_scope() {
        let built = Arc::new(AtomicUsize::new(0));
        let mut resolver = DependencyResolver::new();
        resolver.request("Home", counting_factory(Arc::clone(&built)));

        let mut scope = RequestScope::new();
        resolver.resolve("Home", &mut scope).unwrap();
        resolver.resolve("Home", &mut scope).unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 1);

        scope.clear();
        resolver.resolve("Home", &mut scope).unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_transient_built_every_time() {
        let built = Arc::new(AtomicUsize::new(0));
        let mut resolver = DependencyResolver::new();
        resolver.transient("Home", counting_factory(Arc::clone(&built)));

        let mut scope = RequestScope::new();
        resolver.resolve("Home", &mut scope).unwrap();
        resolver.resolve("Home", &mut scope).unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_declared_but_unbound() {
        let mut resolver = DependencyResolver::new();
        resolver.declare("TestController");
        assert!(resolver.registered("TestController"));

        match resolver.resolve("TestController", &mut RequestScope::new()) {
            Err(ProjectError::HandlerResolution { code, .. }) => {
                assert_eq!(code, error_codes::DEPENDENCY_UNBOUND)
            }
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("expected resolution failure"),
        }
    }

    #[test]
    fn test_unknown_dependency() {
        let resolver = DependencyResolver::new();
        assert!(!resolver.registered("Nope"));
        match resolver.resolve("Nope", &mut RequestScope::new()) {
            Err(ProjectError::HandlerResolution { code, .. }) => {
                assert_eq!(code, error_codes::DEPENDENCY_NOT_FOUND)
            }
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("expected resolution failure"),
        }
    }

    #[test]
    fn test_callables_by_key() {
        let mut resolver = DependencyResolver::new();
        resolver.register_callable(
            "/test/route",
            Arc::new(|_: &[String]| -> HandlerResult { Ok(json!(true)) }),
        );

        assert!(resolver.registered("/test/route"));
        let callable = resolver.callable("/test/route").unwrap();
        assert_eq!(callable(&[]).unwrap(), json!(true));
        assert!(resolver.callable("/other").is_err());
    }

    #[test]
    fn test_rebinding_drops_cached_singleton() {
        let mut resolver = DependencyResolver::new();
        resolver.singleton("Home", || {
            ActionController::new().action("index", |_| Ok(json!("first")))
        });
        let mut scope = RequestScope::new();
        let first = resolver.resolve("Home", &mut scope).unwrap();
        assert_eq!(first.call("index", &[]).unwrap(), json!("first"));

        resolver.singleton("Home", || {
            ActionController::new().action("index", |_| Ok(json!("second")))
        });
        let second = resolver.resolve("Home", &mut scope).unwrap();
        assert_eq!(second.call("index", &[]).unwrap(), json!("second"));
    }
}
