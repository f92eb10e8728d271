//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse binding patterns (`/`, `/*`, `/hello`, `/hello/`, `/hello/*`)
//! - Match request paths on segment boundaries
//! - Report how many path characters a match covers
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/hello/*`, `/hello/` and `/hello` are the same pattern
//! - `/` and `/*` are the catch-all and match with length 0
//! - Wildcards are only allowed as the final `/*` segment

use std::fmt;

use thiserror::Error;

use crate::http::request::normalize_path;

/// A pattern that cannot be used as a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    NotAbsolute(String),
    #[error("pattern {0:?} may only use '*' as a trailing '/*'")]
    MisplacedWildcard(String),
}

/// A compiled binding pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches every path, with the lowest possible priority.
    CatchAll,
    /// Matches `base` itself and everything below it.
    Prefix(String),
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if !raw.starts_with('/') {
            return Err(PatternError::NotAbsolute(raw.to_string()));
        }

        let normalized = normalize_path(raw);
        let base = normalized.strip_suffix("/*").unwrap_or(&normalized);
        if base.contains('*') {
            return Err(PatternError::MisplacedWildcard(raw.to_string()));
        }

        let base = base.trim_end_matches('/');
        if base.is_empty() {
            Ok(PathPattern::CatchAll)
        } else {
            Ok(PathPattern::Prefix(base.to_string()))
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, PathPattern::CatchAll)
    }

    /// Number of path characters covered when `path` matches, else `None`.
    ///
    /// `path` is expected to be normalized already.
    pub fn match_len(&self, path: &str) -> Option<usize> {
        match self {
            PathPattern::CatchAll => Some(0),
            PathPattern::Prefix(base) => {
                let rest = path.strip_prefix(base.as_str())?;
                if rest.is_empty() || rest.starts_with('/') {
                    Some(base.len())
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::CatchAll => f.write_str("/"),
            PathPattern::Prefix(base) => write!(f, "{base}/*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalent_spellings() {
        let expected = PathPattern::Prefix("/hello".into());
        assert_eq!(PathPattern::parse("/hello/*").unwrap(), expected);
        assert_eq!(PathPattern::parse("/hello/").unwrap(), expected);
        assert_eq!(PathPattern::parse("/hello").unwrap(), expected);
        assert_eq!(PathPattern::parse("//hello/*").unwrap(), expected);
        assert_eq!(PathPattern::parse("/").unwrap(), PathPattern::CatchAll);
        assert_eq!(PathPattern::parse("/*").unwrap(), PathPattern::CatchAll);
    }

    #[test]
    fn rejects_bad_patterns() {
        assert!(matches!(PathPattern::parse("hello"), Err(PatternError::NotAbsolute(_))));
        assert!(matches!(PathPattern::parse(""), Err(PatternError::NotAbsolute(_))));
        assert!(matches!(
            PathPattern::parse("/he*llo"),
            Err(PatternError::MisplacedWildcard(_))
        ));
        assert!(matches!(
            PathPattern::parse("/*.html"),
            Err(PatternError::MisplacedWildcard(_))
        ));
    }

    #[test]
    fn respects_segment_boundary() {
        let pattern = PathPattern::parse("/hello/*").unwrap();
        assert_eq!(pattern.match_len("/hello"), Some(6));
        assert_eq!(pattern.match_len("/hello/"), Some(6));
        assert_eq!(pattern.match_len("/hello/anything/deeper"), Some(6));
        assert_eq!(pattern.match_len("/helloworld"), None);
        assert_eq!(pattern.match_len("/hellO"), None);
        assert_eq!(pattern.match_len("/"), None);
    }

    #[test]
    fn catch_all_matches_everything_with_zero_length() {
        let pattern = PathPattern::CatchAll;
        assert_eq!(pattern.match_len("/"), Some(0));
        assert_eq!(pattern.match_len("/helloX"), Some(0));
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(PathPattern::parse("/it").unwrap().to_string(), "/it/*");
        assert_eq!(PathPattern::CatchAll.to_string(), "/");
    }
}
