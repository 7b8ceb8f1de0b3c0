pub use crate::config::{HookConfig, RouteConfig, RouteEntry};
pub use crate::dependencies::{
    ActionController, Container, Controller, Dependency, DependencyResolver, DependencyScope,
    RequestScope,
};
pub use crate::dispatch::{DispatchContext, DispatchState, Dispatcher, Environment};
pub use crate::errors::{error_codes, ProjectError};
pub use crate::routing::{
    compile_pattern, Handler, HandlerFn, HandlerResult, HookType, HttpMethod, Route, RouteMatch,
    RouteTable, Segment,
};
pub use crate::view::ViewData;
