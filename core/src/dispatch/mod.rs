pub mod context;
pub mod dispatcher;

pub use context::{derive_path, parse_query_string, DispatchContext, Environment};
pub use dispatcher::{DispatchState, Dispatcher};
