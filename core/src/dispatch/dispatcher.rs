use crate::dependencies::{Container, RequestScope};
use crate::dispatch::context::{DispatchContext, Environment};
use crate::errors::ProjectError;
use crate::routing::table::RouteTable;
use crate::routing::types::{Handler, HandlerResult, HookType, HttpMethod, RouteMatch};
use std::collections::HashMap;

/// Progress of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Uninitialized,
    EnvironmentSet,
    BeforeMatched,
    BeforeSkipped,
    MainMatched,
    AfterMatched,
    AfterSkipped,
    Executed,
}

/// Resolves and runs one request against a shared, read-only [`RouteTable`].
///
/// Order of execution in [`Dispatcher::run`]: first matching before-hook, first
/// matching main route, first matching after-hook. Hook return values are
/// discarded; any error aborts the remaining sequence.
pub struct Dispatcher<'a> {
    table: &'a RouteTable,
    container: &'a dyn Container,
    environment: Option<Environment>,
    context: Option<DispatchContext>,
    matches: HashMap<HookType, RouteMatch<'a>>,
    request_scope: RequestScope,
    state: DispatchState,
}

impl<'a> Dispatcher<'a> {
    pub fn new(table: &'a RouteTable) -> Self {
        Self::with_container(table, table.container())
    }

    /// Resolve handler references through `container` instead of the table's own.
    pub fn with_container(table: &'a RouteTable, container: &'a dyn Container) -> Self {
        Self {
            table,
            container,
            environment: None,
            context: None,
            matches: HashMap::new(),
            request_scope: RequestScope::new(),
            state: DispatchState::Uninitialized,
        }
    }

    /// Store the request's server variables. Derivation happens on first use.
    pub fn set_environment(&mut self, env: Environment) {
        self.environment = Some(env);
        self.context = None;
        self.matches.clear();
        self.request_scope.clear();
        self.state = DispatchState::EnvironmentSet;
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Derived request context; fails if no usable environment was set.
    pub fn context(&mut self) -> Result<&DispatchContext, ProjectError> {
        if self.context.is_none() {
            let env = self
                .environment
                .as_ref()
                .ok_or_else(|| ProjectError::EnvironmentMissing {
                    message: "Dispatcher has no environment; call set_environment first"
                        .to_string(),
                })?;
            let derived = DispatchContext::from_environment(env)?;
            log::debug!("Derived {} {} from environment", derived.method, derived.path);
            self.context = Some(derived);
        }

        self.context.as_ref().ok_or_else(|| ProjectError::EnvironmentMissing {
            message: "Dispatch context unavailable".to_string(),
        })
    }

    /// Look for the first `hook` route applicable to `method` that matches the
    /// request path, and remember it. Absence is `Ok(false)`, never an error.
    pub fn match_route(&mut self, method: &HttpMethod, hook: HookType) -> Result<bool, ProjectError> {
        let table = self.table;
        let ctx = self.context()?;
        let found = table.find(method, hook, &ctx.segments);
        let path = ctx.path.clone();

        match found {
            Some(route_match) => {
                log::debug!(
                    "Matched {} route {} for {} {}",
                    hook,
                    route_match.route.pattern,
                    method,
                    path
                );
                self.matches.insert(hook, route_match);
                Ok(true)
            }
            None => {
                log::debug!("No {} route for {} {}", hook, method, path);
                self.matches.remove(&hook);
                Ok(false)
            }
        }
    }

    /// The route recorded by the last successful `match_route` for `hook`.
    pub fn matched(&self, hook: HookType) -> Option<&RouteMatch<'a>> {
        self.matches.get(&hook)
    }

    /// Run before-hook, main handler and after-hook; return the main handler's value.
    pub fn run(&mut self) -> HandlerResult {
        if self.environment.is_none() {
            return Err(ProjectError::EnvironmentMissing {
                message: "run() called before set_environment".to_string(),
            });
        }
        let method = self.context()?.method.clone();

        if self.match_route(&method, HookType::Before)? {
            self.state = DispatchState::BeforeMatched;
            self.invoke(HookType::Before)?;
        } else {
            self.state = DispatchState::BeforeSkipped;
        }

        if !self.match_route(&method, HookType::Main)? {
            let path = self.context()?.path.clone();
            log::warn!("Route not found: {} {}", method, path);
            return Err(ProjectError::RouteNotFound {
                method: method.to_string(),
                path,
            });
        }
        self.state = DispatchState::MainMatched;
        let result = self.invoke(HookType::Main)?;

        if self.match_route(&method, HookType::After)? {
            self.state = DispatchState::AfterMatched;
            self.invoke(HookType::After)?;
        } else {
            self.state = DispatchState::AfterSkipped;
        }

        self.state = DispatchState::Executed;
        log::info!(
            "Dispatched {} {}",
            method,
            self.context.as_ref().map_or("/", |ctx| ctx.path.as_str())
        );
        Ok(result)
    }

    fn invoke(&mut self, hook: HookType) -> HandlerResult {
        let route_match = match self.matches.get(&hook) {
            Some(route_match) => route_match.clone(),
            None => return Ok(serde_json::Value::Null),
        };
        let args = route_match.captures.as_slice();

        match &route_match.route.handler {
            Handler::Callable(callable) => callable(args),
            Handler::Named { identifier, action } => {
                let controller = self.container.resolve(identifier, &mut self.request_scope)?;
                controller.call(action, args)
            }
            Handler::Key(key) => {
                let callable = self.container.callable(key)?;
                callable(args)
            }
        }
    }
}
