//! Handler-definition path to URL pattern conversion.
//!
//! # Rules (applied in order)
//! 1. Everything up to the last `api` directory is dropped; patterns start at `/api`
//! 2. A trailing `index` unit collapses onto its directory
//! 3. `[name]` becomes a parameter segment matching exactly one segment
//! 4. `[...name]` becomes a catch-all matching one or more segments; it must be last
//! 5. The unit's file extension is dropped
//!
//! # Design Decisions
//! - Conversion is a pure function of the path string
//! - Separators are normalized, so `\` paths resolve like `/` paths

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use crate::pipeline::request::{percent_decode, PathParams};

/// The directory name marking the root of the API tree.
pub const API_ROOT: &str = "api";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("`{0}` is not under an `{API_ROOT}` directory")]
    MissingApiRoot(String),

    #[error("`{path}`: catch-all segment `{segment}` must be the last segment")]
    CatchAllNotLast { path: String, segment: String },

    #[error("`{path}`: invalid dynamic segment `{segment}`")]
    InvalidSegment { path: String, segment: String },

    #[error("`{path}`: parameter `{name}` bound more than once")]
    DuplicateParam { path: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
    CatchAll(String),
}

impl Segment {
    fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 0,
            Segment::Param(_) => 1,
            Segment::CatchAll(_) => 2,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(s) => f.write_str(s),
            Segment::Param(name) => write!(f, ":{name}"),
            Segment::CatchAll(name) => write!(f, "*{name}"),
        }
    }
}

/// A resolved URL pattern such as `/api/articles/:slug`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Match a request path, binding parameter values on success.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = PathParams::default();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.insert(name.clone(), percent_decode(value));
                }
                Segment::CatchAll(name) => {
                    let rest = parts.get(i..).filter(|rest| !rest.is_empty())?;
                    let joined = rest.iter().map(|s| percent_decode(s)).collect::<Vec<_>>().join("/");
                    params.insert(name.clone(), joined);
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Ordering for match priority: at each position literal beats
    /// parameter beats catch-all; ties fall back to the rendered text.
    pub fn specificity_cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(&other.segments) {
            match a.rank().cmp(&b.rank()) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        other
            .segments
            .len()
            .cmp(&self.segments.len())
            .then_with(|| self.to_string().cmp(&other.to_string()))
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Convert a handler-definition unit path into its URL pattern.
pub fn file_path_to_route(file_path: &str) -> Result<RoutePattern, PatternError> {
    let normalized = file_path.replace('\\', "/");
    let raw: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

    let root = raw
        .iter()
        .rposition(|s| *s == API_ROOT)
        .ok_or_else(|| PatternError::MissingApiRoot(file_path.to_string()))?;
    let mut parts: Vec<&str> = raw[root..].to_vec();

    if let Some(last) = parts.pop() {
        parts.push(strip_extension(last));
    }
    if parts.len() > 1 && parts.last() == Some(&"index") {
        parts.pop();
    }

    let mut segments = Vec::with_capacity(parts.len());
    for part in &parts {
        segments.push(parse_segment(file_path, part)?);
    }

    validate(file_path, &segments)?;
    Ok(RoutePattern { segments })
}

fn strip_extension(unit: &str) -> &str {
    match unit.rfind('.') {
        // Keep `[...rest]` intact: its dots are not an extension.
        Some(idx) if idx > 0 && !unit[idx..].contains(']') => &unit[..idx],
        _ => unit,
    }
}

fn parse_segment(path: &str, part: &str) -> Result<Segment, PatternError> {
    let Some(inner) = part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) else {
        return Ok(Segment::Literal(part.to_string()));
    };

    let (name, catch_all) = match inner.strip_prefix("...") {
        Some(name) => (name, true),
        None => (inner, false),
    };

    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(PatternError::InvalidSegment {
            path: path.to_string(),
            segment: part.to_string(),
        });
    }

    Ok(if catch_all {
        Segment::CatchAll(name.to_string())
    } else {
        Segment::Param(name.to_string())
    })
}

fn validate(path: &str, segments: &[Segment]) -> Result<(), PatternError> {
    let mut seen: Vec<&str> = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        let name = match segment {
            Segment::Literal(_) => continue,
            Segment::CatchAll(_) if i + 1 != segments.len() => {
                return Err(PatternError::CatchAllNotLast {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
            Segment::CatchAll(name) | Segment::Param(name) => name.as_str(),
        };
        if seen.contains(&name) {
            return Err(PatternError::DuplicateParam {
                path: path.to_string(),
                name: name.to_string(),
            });
        }
        seen.push(name);
    }
    Ok(())
}
