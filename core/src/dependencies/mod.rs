pub mod resolver;
pub mod types;

pub use resolver::{Container, DependencyResolver};
pub use types::{
    ActionController, Controller, ControllerFactory, Dependency, DependencyScope, RequestScope,
};
