use crate::errors::ProjectError;
use crate::routing::types::HttpMethod;
use std::collections::HashMap;

pub const REQUEST_URI: &str = "REQUEST_URI";
pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
pub const QUERY_STRING: &str = "QUERY_STRING";
pub const METHOD_OVERRIDE_HEADER: &str = "HTTP_X_HTTP_METHOD_OVERRIDE";
pub const METHOD_OVERRIDE_PARAM: &str = "_method";

/// Raw server variables for one request, handed in explicitly by the host.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Request data derived from an [`Environment`].
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchContext {
    /// Normalized `/`-rooted path, never empty.
    pub path: String,
    /// Percent-decoded path segments that routes match against.
    pub segments: Vec<String>,
    pub method: HttpMethod,
    pub query: HashMap<String, String>,
}

impl DispatchContext {
    pub fn from_environment(env: &Environment) -> Result<Self, ProjectError> {
        let uri = env.get(REQUEST_URI).ok_or_else(|| missing(REQUEST_URI))?;
        let raw_method = env.get(REQUEST_METHOD).ok_or_else(|| missing(REQUEST_METHOD))?;

        let query = match env.get(QUERY_STRING) {
            Some(qs) => parse_query_string(qs),
            None => uri
                .split_once('?')
                .map(|(_, qs)| parse_query_string(qs))
                .unwrap_or_default(),
        };

        let path = derive_path(uri, env.get(SCRIPT_NAME));
        let segments = decode_segments(&path);

        let mut method = HttpMethod::from_request(raw_method);
        if method == HttpMethod::POST {
            let requested = env
                .get(METHOD_OVERRIDE_HEADER)
                .or_else(|| query.get(METHOD_OVERRIDE_PARAM).map(String::as_str));
            if let Some(requested) = requested {
                match HttpMethod::from_request(requested) {
                    HttpMethod::Other(name) => {
                        log::warn!("Ignoring unsupported method override {}", name)
                    }
                    overridden => method = overridden,
                }
            }
        }

        Ok(Self {
            path,
            segments,
            method,
            query,
        })
    }
}

/// Effective path: query removed, script prefix stripped, slashes normalized.
pub fn derive_path(request_uri: &str, script_name: Option<&str>) -> String {
    let without_query = match request_uri.split_once('?') {
        Some((path, _)) => path,
        None => request_uri,
    };
    let without_authority = strip_authority(without_query);
    normalize_path(strip_script(without_authority, script_name))
}

pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Some((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|decoded| decoded.into_owned())
}

fn decode_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match urlencoding::decode(s) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => s.to_string(),
        })
        .collect()
}

/// Absolute-form request targets carry scheme and host ahead of the path.
fn strip_authority(uri: &str) -> &str {
    for scheme in ["http://", "https://"] {
        if let Some(rest) = uri.strip_prefix(scheme) {
            return match rest.find('/') {
                Some(index) => &rest[index..],
                None => "/",
            };
        }
    }
    uri
}

fn strip_script<'a>(uri: &'a str, script_name: Option<&str>) -> &'a str {
    let script = match script_name.map(str::trim) {
        Some(script) if !script.is_empty() && script != "/" => script,
        _ => return uri,
    };

    if let Some(rest) = strip_segment_prefix(uri, script) {
        return rest;
    }

    // Rewritten front-controller requests carry only the script's directory.
    if let Some(index) = script.rfind('/').filter(|&index| index > 0) {
        if let Some(rest) = strip_segment_prefix(uri, &script[..index]) {
            return rest;
        }
    }

    // Mounted front controllers sit below a prefix: drop everything through `/<basename>`.
    let basename = script.rsplit('/').next().unwrap_or(script);
    if basename.is_empty() {
        return uri;
    }
    let needle = format!("/{}", basename);
    let mut offset = 0;
    while let Some(found) = uri[offset..].find(&needle) {
        let end = offset + found + needle.len();
        let rest = &uri[end..];
        if rest.is_empty() || rest.starts_with('/') {
            return rest;
        }
        offset = end;
    }
    uri
}

fn strip_segment_prefix<'a>(uri: &'a str, prefix: &str) -> Option<&'a str> {
    uri.strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn missing(key: &str) -> ProjectError {
    ProjectError::EnvironmentMissing {
        message: format!("{} is not set in the request environment", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(uri: &str, method: &str) -> Environment {
        Environment::new()
            .with(SCRIPT_NAME, "/index.php")
            .with(REQUEST_URI, uri)
            .with(REQUEST_METHOD, method)
    }

    #[test]
    fn test_derive_path_strips_script_name() {
        assert_eq!(derive_path("/index.php/test", Some("/index.php")), "/test");
        assert_eq!(derive_path("/index.php", Some("/index.php")), "/");
        assert_eq!(derive_path("/test/a", Some("/index.php")), "/test/a");
        assert_eq!(derive_path("/index.phpx/a", Some("/index.php")), "/index.phpx/a");
    }

    #[test]
    fn test_derive_path_strips_script_directory() {
        assert_eq!(derive_path("/app/index.php/users", Some("/app/index.php")), "/users");
        assert_eq!(derive_path("/app/users", Some("/app/index.php")), "/users");
        assert_eq!(derive_path("/application/x", Some("/app/index.php")), "/application/x");
    }

    #[test]
    fn test_derive_path_strips_through_script_basename() {
        assert_eq!(derive_path("/api/index.php/users", Some("/index.php")), "/users");
        assert_eq!(derive_path("/api/index.php", Some("/index.php")), "/");
        assert_eq!(derive_path("/api/v1/index.php/a/b?x=1", Some("/index.php")), "/a/b");
        assert_eq!(
            derive_path("/api/index.phpx/index.php/users", Some("/index.php")),
            "/users"
        );
        assert_eq!(derive_path("/api/index.phpx/users", Some("/index.php")), "/api/index.phpx/users");
    }

    #[test]
    fn test_derive_path_strips_query_and_normalizes() {
        assert_eq!(derive_path("/test//a/?x=1", None), "/test/a");
        assert_eq!(derive_path("?x=1", None), "/");
        assert_eq!(derive_path("", None), "/");
        assert_eq!(derive_path("http://example.com/a/b?c", None), "/a/b");
    }

    #[test]
    fn test_parse_query_string_simple() {
        let result = parse_query_string("key1=value1&key2=value2");
        assert_eq!(result.get("key1"), Some(&"value1".to_string()));
        assert_eq!(result.get("key2"), Some(&"value2".to_string()));
    }

    #[test]
    fn test_parse_query_string_encoded() {
        let result = parse_query_string("name=John%20Doe&city=New+York&flag");
        assert_eq!(result.get("name"), Some(&"John Doe".to_string()));
        assert_eq!(result.get("city"), Some(&"New York".to_string()));
        assert_eq!(result.get("flag"), Some(&String::new()));
    }

    #[test]
    fn test_parse_query_string_empty() {
        assert!(parse_query_string("").is_empty());
    }

    #[test]
    fn test_context_from_environment() {
        let mut environment = env("/index.php/test/some%20thing?x=1", "get");
        environment.insert(QUERY_STRING, "test=test");

        let ctx = DispatchContext::from_environment(&environment).unwrap();
        assert_eq!(ctx.path, "/test/some%20thing");
        assert_eq!(ctx.segments, vec!["test".to_string(), "some thing".to_string()]);
        assert_eq!(ctx.method, HttpMethod::GET);
        assert_eq!(ctx.query.get("test"), Some(&"test".to_string()));
        assert!(ctx.query.get("x").is_none());
    }

    #[test]
    fn test_query_falls_back_to_uri() {
        let ctx = DispatchContext::from_environment(&env("/search?q=rust", "GET")).unwrap();
        assert_eq!(ctx.path, "/search");
        assert_eq!(ctx.query.get("q"), Some(&"rust".to_string()));
    }

    #[test]
    fn test_method_override() {
        let environment = env("/items/1", "POST").with(METHOD_OVERRIDE_HEADER, "delete");
        let ctx = DispatchContext::from_environment(&environment).unwrap();
        assert_eq!(ctx.method, HttpMethod::DELETE);

        let ctx = DispatchContext::from_environment(&env("/items/1?_method=PUT", "POST")).unwrap();
        assert_eq!(ctx.method, HttpMethod::PUT);

        let ctx = DispatchContext::from_environment(&env("/items/1?_method=PUT", "GET")).unwrap();
        assert_eq!(ctx.method, HttpMethod::GET);

        let environment = env("/items/1", "POST").with(METHOD_OVERRIDE_HEADER, "any");
        let ctx = DispatchContext::from_environment(&environment).unwrap();
        assert_eq!(ctx.method, HttpMethod::POST);
    }

    #[test]
    fn test_missing_variables() {
        let environment = Environment::new().with(REQUEST_METHOD, "GET");
        assert!(matches!(
            DispatchContext::from_environment(&environment),
            Err(ProjectError::EnvironmentMissing { .. })
        ));

        let environment = Environment::new().with(REQUEST_URI, "/");
        assert!(matches!(
            DispatchContext::from_environment(&environment),
            Err(ProjectError::EnvironmentMissing { .. })
        ));
    }

    #[test]
    fn test_environment_from_iter() {
        let environment: Environment = [(REQUEST_URI, "/"), (REQUEST_METHOD, "GET")]
            .into_iter()
            .collect();
        assert_eq!(environment.get(REQUEST_URI), Some("/"));
        assert_eq!(environment.get(SCRIPT_NAME), None);
    }
}
