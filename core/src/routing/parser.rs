use crate::errors::{error_codes, ProjectError};
use crate::routing::types::Segment;
use once_cell::sync::Lazy;
use regex::Regex;

/// `(name)`, `(?name)` and `(:modifier)` segments.
static PARAM_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\((?P<modifier>[?:]?)(?P<name>[^()/]*)\)$").expect("parameter segment regex")
});

/// Compile a route pattern into ordered segment matchers.
///
/// `/` compiles to an empty sequence and only matches the root path.
pub fn compile_pattern(pattern: &str) -> Result<Vec<Segment>, ProjectError> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(ProjectError::pattern(
            error_codes::EMPTY_PATTERN,
            "Route pattern cannot be empty",
        ));
    }

    let mut segments = Vec::new();
    for raw in split_top_level(trimmed)? {
        compile_raw_segment(raw, false, &mut segments)?;
    }

    if let Some(position) = segments
        .iter()
        .position(|s| matches!(s, Segment::CatchAll { .. }))
    {
        if position + 1 != segments.len() {
            return Err(ProjectError::pattern(
                error_codes::CATCH_ALL_NOT_FINAL,
                format!("Catch-all must be the final segment of '{}'", pattern),
            ));
        }
    }

    log::trace!("Compiled pattern {} into {} segments", pattern, segments.len());
    Ok(segments)
}

/// Split on `/` outside parentheses, dropping empty pieces.
fn split_top_level(pattern: &str) -> Result<Vec<&str>, ProjectError> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (index, ch) in pattern.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| unbalanced(pattern))?;
            }
            '/' if depth == 0 => {
                parts.push(&pattern[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced(pattern));
    }
    parts.push(&pattern[start..]);

    Ok(parts.into_iter().filter(|p| !p.is_empty()).collect())
}

/// Compile one top-level piece, which may carry trailing `(/optional)` groups.
fn compile_raw_segment(
    raw: &str,
    optional: bool,
    out: &mut Vec<Segment>,
) -> Result<(), ProjectError> {
    let (head, groups) = match find_optional_group(raw) {
        Some(index) => (&raw[..index], &raw[index..]),
        None => (raw, ""),
    };

    if !head.is_empty() {
        let segment = classify(head)?;
        out.push(if optional { make_optional(segment)? } else { segment });
    }

    let mut rest = groups;
    while !rest.is_empty() {
        let close = matching_paren(rest).ok_or_else(|| unbalanced(raw))?;
        // Skip the leading "(/" and the closing ")".
        let inner = &rest[2..close];
        for piece in split_top_level(inner)? {
            compile_raw_segment(piece, true, out)?;
        }
        rest = &rest[close + 1..];
        if !rest.is_empty() && !rest.starts_with("(/") {
            return Err(ProjectError::pattern(
                error_codes::UNBALANCED_PARENTHESES,
                format!("Unexpected text '{}' after optional group in '{}'", rest, raw),
            ));
        }
    }

    Ok(())
}

/// Byte offset of the first `(/` at depth zero.
fn find_optional_group(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    let mut depth: usize = 0;
    for (index, &byte) in bytes.iter().enumerate() {
        match byte {
            b'(' => {
                if depth == 0 && bytes.get(index + 1) == Some(&b'/') {
                    return Some(index);
                }
                depth += 1;
            }
            b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

/// Index of the `)` closing the `(` at offset zero.
fn matching_paren(group: &str) -> Option<usize> {
    let mut depth: usize = 0;
    for (index, byte) in group.bytes().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn classify(raw: &str) -> Result<Segment, ProjectError> {
    let captures = match PARAM_SEGMENT.captures(raw) {
        Some(captures) => captures,
        None => return Ok(Segment::Literal(raw.to_string())),
    };

    let modifier = captures.name("modifier").map_or("", |m| m.as_str());
    let name = captures.name("name").map_or("", |m| m.as_str()).trim();
    if name.is_empty() {
        return Err(ProjectError::pattern(
            error_codes::EMPTY_PARAMETER,
            format!("Parameter segment '{}' has no name", raw),
        ));
    }

    match modifier {
        "?" => Ok(Segment::Optional {
            name: name.to_string(),
        }),
        ":" if is_catch_all(name) => Ok(Segment::CatchAll {
            name: name.to_string(),
        }),
        ":" => Err(ProjectError::pattern(
            error_codes::UNKNOWN_MODIFIER,
            format!("Unknown segment modifier '{}'", raw),
        )),
        _ => Ok(Segment::Required {
            name: name.to_string(),
        }),
    }
}

fn is_catch_all(name: &str) -> bool {
    name.replace('-', "").eq_ignore_ascii_case("catchall")
}

fn make_optional(segment: Segment) -> Result<Segment, ProjectError> {
    match segment {
        Segment::Literal(name) | Segment::Required { name } | Segment::Optional { name } => {
            Ok(Segment::Optional { name })
        }
        Segment::CatchAll { name } => Err(ProjectError::pattern(
            error_codes::UNKNOWN_MODIFIER,
            format!("Catch-all '{}' cannot be optional", name),
        )),
    }
}

fn unbalanced(pattern: &str) -> ProjectError {
    ProjectError::pattern(
        error_codes::UNBALANCED_PARENTHESES,
        format!("Unbalanced parentheses in '{}'", pattern),
    )
}
