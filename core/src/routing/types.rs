use crate::errors::{error_codes, ProjectError};
use crate::routing::matcher::match_segments;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Value a handler hands back to the dispatcher.
pub type HandlerResult = Result<serde_json::Value, ProjectError>;

/// Direct invokable: receives captured segments positionally.
pub type HandlerFn = dyn Fn(&[String]) -> HandlerResult + Send + Sync;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
    TRACE,
    /// Registered through an unqualified add; applies to every method.
    ANY,
    /// A request method outside the supported set. Only `ANY` routes match it.
    Other(String),
}

impl HttpMethod {
    /// Verbs covered by the proxy helpers and `restful` registration.
    pub const VERBS: [HttpMethod; 6] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::PATCH,
        HttpMethod::DELETE,
        HttpMethod::OPTIONS,
    ];

    /// Strict parse used for registration and config: unknown names are rejected.
    pub fn parse(method: &str) -> Result<Self, ProjectError> {
        match method.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            "PATCH" => Ok(HttpMethod::PATCH),
            "HEAD" => Ok(HttpMethod::HEAD),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "TRACE" => Ok(HttpMethod::TRACE),
            "ANY" => Ok(HttpMethod::ANY),
            _ => Err(ProjectError::config(
                error_codes::INVALID_HTTP_METHOD,
                format!("Invalid HTTP method: {}", method),
            )),
        }
    }

    /// Lenient parse used for request environments. A request never carries `ANY`.
    pub fn from_request(method: &str) -> Self {
        let upper = method.trim().to_uppercase();
        match Self::parse(&upper) {
            Ok(HttpMethod::ANY) | Err(_) => HttpMethod::Other(upper),
            Ok(parsed) => parsed,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::TRACE => "TRACE",
            HttpMethod::ANY => "ANY",
            HttpMethod::Other(name) => name.as_str(),
        }
    }

    /// Methods a route can be registered under: the proxy verbs and `ANY`.
    pub fn is_routable(&self) -> bool {
        *self == HttpMethod::ANY || Self::VERBS.contains(self)
    }

    /// Whether a route registered under `self` applies to a request for `requested`.
    pub fn accepts(&self, requested: &HttpMethod) -> bool {
        *self == HttpMethod::ANY || *requested == HttpMethod::ANY || self == requested
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Classification of a route: the main handler or a hook around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookType {
    Main,
    Before,
    After,
}

impl HookType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookType::Main => "main",
            HookType::Before => "before",
            HookType::After => "after",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookType {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" | "" => Ok(HookType::Main),
            "before" => Ok(HookType::Before),
            "after" => Ok(HookType::After),
            _ => Err(ProjectError::config(
                error_codes::INVALID_CONFIG,
                format!("Invalid hook type: {}", s),
            )),
        }
    }
}

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Required { name: String },
    Optional { name: String },
    CatchAll { name: String },
}

impl Segment {
    /// Segments that always consume path: everything except `Optional`.
    pub fn is_mandatory(&self) -> bool {
        !matches!(self, Segment::Optional { .. })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Required { name } | Segment::Optional { name } | Segment::CatchAll { name } => {
                Some(name)
            }
        }
    }
}

/// What a route invokes once matched.
#[derive(Clone)]
pub enum Handler {
    /// Closure stored on the route and called directly.
    Callable(Arc<HandlerFn>),
    /// `"Identifier@action"`, resolved through the container at call time.
    Named { identifier: String, action: String },
    /// Any other string: a direct invokable registered in the container under this key.
    Key(String),
}

impl Handler {
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Callable(Arc::new(f))
    }

    /// Splits `"Identifier@action"`; exactly one `@` with both sides present.
    pub fn parse_reference(reference: &str) -> Self {
        let mut parts = reference.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(identifier), Some(action), None)
                if !identifier.is_empty() && !action.is_empty() =>
            {
                Handler::Named {
                    identifier: identifier.to_string(),
                    action: action.to_string(),
                }
            }
            _ => Handler::Key(reference.to_string()),
        }
    }
}

impl From<&str> for Handler {
    fn from(reference: &str) -> Self {
        Handler::parse_reference(reference)
    }
}

impl From<String> for Handler {
    fn from(reference: String) -> Self {
        Handler::parse_reference(&reference)
    }
}

impl From<Arc<HandlerFn>> for Handler {
    fn from(f: Arc<HandlerFn>) -> Self {
        Handler::Callable(f)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Callable(_) => f.write_str("Callable(<fn>)"),
            Handler::Named { identifier, action } => write!(f, "Named({}@{})", identifier, action),
            Handler::Key(key) => write!(f, "Key({})", key),
        }
    }
}

/// A compiled pattern bound to a handler, a method and a hook type.
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: String,
    pub segments: Vec<Segment>,
    pub method: HttpMethod,
    pub hook: HookType,
    pub handler: Handler,
    /// Name the handler was registered under in the container.
    pub key: String,
}

impl Route {
    pub fn try_match(&self, path: &[String]) -> Option<Vec<String>> {
        match_segments(&self.segments, path)
    }
}

/// Winning route plus the values captured from the path, in pattern order.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub captures: Vec<String>,
}
