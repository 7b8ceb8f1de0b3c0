pub mod matcher;
pub mod parser;
pub mod table;
pub mod types;

pub use matcher::{match_segments, split_path};
pub use parser::compile_pattern;
pub use table::RouteTable;
pub use types::{Handler, HandlerFn, HandlerResult, HookType, HttpMethod, Route, RouteMatch, Segment};
