//! # ROUTEKIT CORE LIBRARY
//!
//! **URL ROUTE REGISTRY AND REQUEST DISPATCHER**
//!
//! **ARCHITECTURE**: Pattern compiler, ordered route table, hook-aware dispatcher
//! **GUARANTEE**: First registered match wins; tables are read-only once dispatch begins
//! **COLLABORATORS**: Handler references resolve through the `Container` trait
//!
//! ## USAGE
//!
//! ```rust
//! use routekit::api::*;
//! use serde_json::json;
//!
//! let mut table = RouteTable::new();
//! table.get("/hello/(name)", Handler::callable(|args| Ok(json!(format!("Hello {}", args[0])))))?;
//!
//! let mut dispatcher = Dispatcher::new(&table);
//! dispatcher.set_environment(
//!     Environment::new()
//!         .with("SCRIPT_NAME", "/index.php")
//!         .with("REQUEST_URI", "/index.php/hello/world")
//!         .with("REQUEST_METHOD", "GET"),
//! );
//! assert_eq!(dispatcher.run()?, json!("Hello world"));
//! # Ok::<(), ProjectError>(())
//! ```

pub mod api;
pub mod config;
pub mod dependencies;
pub mod dispatch;
pub mod errors;
pub mod routing;
pub mod view;

pub use routing::{HookType, HttpMethod, RouteTable};
pub use dispatch::Dispatcher;
pub use errors::ProjectError;
