use crate::routing::types::Segment;

/// Walk compiled segments and path segments in lockstep, returning captures on a match.
///
/// Optional segments never backtrack: one consumes a path segment only while more
/// path remains than the mandatory segments still ahead of it, so a trailing optional
/// always takes what is left.
pub fn match_segments(pattern: &[Segment], path: &[String]) -> Option<Vec<String>> {
    let mut mandatory_left = pattern.iter().filter(|s| s.is_mandatory()).count();
    let mut captures = Vec::new();
    let mut cursor = 0;

    for segment in pattern {
        let remaining = path.len() - cursor;
        match segment {
            Segment::Literal(expected) => {
                if remaining == 0 || path[cursor] != *expected {
                    return None;
                }
                cursor += 1;
                mandatory_left -= 1;
            }
            Segment::Required { .. } => {
                if remaining == 0 {
                    return None;
                }
                captures.push(path[cursor].clone());
                cursor += 1;
                mandatory_left -= 1;
            }
            Segment::Optional { name } => {
                if remaining > mandatory_left {
                    captures.push(path[cursor].clone());
                    cursor += 1;
                } else {
                    log::trace!("Optional segment {} skipped", name);
                }
            }
            Segment::CatchAll { .. } => {
                if remaining == 0 {
                    return None;
                }
                captures.push(path[cursor..].join("/"));
                cursor = path.len();
                mandatory_left -= 1;
            }
        }
    }

    if cursor == path.len() {
        Some(captures)
    } else {
        None
    }
}

/// Split a normalized path into raw segments, without decoding.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::parser::compile_pattern;

    fn try_match(pattern: &str, path: &str) -> Option<Vec<String>> {
        let segments = compile_pattern(pattern).unwrap();
        match_segments(&segments, &split_path(path))
    }

    #[test]
    fn test_root_matches_only_root() {
        assert_eq!(try_match("/", "/"), Some(vec![]));
        assert_eq!(try_match("/", "/test"), None);
    }

    #[test]
    fn test_literal_match() {
        assert_eq!(try_match("/test", "/test"), Some(vec![]));
        assert_eq!(try_match("/test", "/other"), None);
        assert_eq!(try_match("/test", "/"), None);
        assert_eq!(try_match("/test", "/test/extra"), None);
    }

    #[test]
    fn test_required_segments() {
        assert_eq!(
            try_match("/test/(required)", "/test/somesegment"),
            Some(vec!["somesegment".to_string()])
        );
        assert_eq!(
            try_match("/test/(required)/(required2)", "/test/a/b"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(try_match("/test/(required)", "/test"), None);
    }

    #[test]
    fn test_optional_present_and_absent() {
        assert_eq!(
            try_match("/test/(required)/(?optional)", "/test/a/b"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            try_match("/test/(required)/(?optional)", "/test/a"),
            Some(vec!["a".to_string()])
        );
        assert_eq!(try_match("/test/(?optional)", "/test"), Some(vec![]));
        assert_eq!(
            try_match("/test(/optional)", "/test/x"),
            Some(vec!["x".to_string()])
        );
    }

    #[test]
    fn test_interior_optional_yields_to_mandatory() {
        assert_eq!(
            try_match("/a/(?x)/b", "/a/b"),
            Some(vec![])
        );
        assert_eq!(
            try_match("/a/(?x)/b", "/a/z/b"),
            Some(vec!["z".to_string()])
        );
        assert_eq!(try_match("/a/(?x)/b", "/a/z/q"), None);
    }

    #[test]
    fn test_leftmost_optional_wins() {
        assert_eq!(
            try_match("/(?first)/(?second)", "/one"),
            Some(vec!["one".to_string()])
        );
        assert_eq!(
            try_match("/(?first)/(?second)", "/one/two"),
            Some(vec!["one".to_string(), "two".to_string()])
        );
    }

    #[test]
    fn test_catch_all_requires_a_segment() {
        assert_eq!(
            try_match("/test/(:catchall)", "/test/id/name"),
            Some(vec!["id/name".to_string()])
        );
        assert_eq!(
            try_match("/test/(:catch-all)", "/test/hello"),
            Some(vec!["hello".to_string()])
        );
        assert_eq!(try_match("/test/(:catchall)", "/test"), None);
    }

    #[test]
    fn test_optional_before_catch_all() {
        assert_eq!(
            try_match("/files/(?bucket)/(:catchall)", "/files/readme"),
            Some(vec!["readme".to_string()])
        );
        assert_eq!(
            try_match("/files/(?bucket)/(:catchall)", "/files/public/a/b"),
            Some(vec!["public".to_string(), "a/b".to_string()])
        );
    }

    #[test]
    fn test_split_path_drops_empty_segments() {
        assert_eq!(split_path("//a///b/"), vec!["a".to_string(), "b".to_string()]);
        assert!(split_path("/").is_empty());
    }
}
