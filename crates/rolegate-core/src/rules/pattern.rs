//! Ant-style path patterns
//!
//! `*` matches within a single path segment, `**` matches any number of
//! segments. A pattern ending in `/**` also matches the bare prefix, so
//! `/userAuth/**` matches `/userAuth`.

use std::fmt;

use crate::error::RuleError;

/// Maximum iterations allowed for pattern matching to prevent ReDoS
const MAX_MATCH_ITERATIONS: usize = 10000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternPart {
    /// Literal text that must match exactly
    Literal(String),
    /// Single path segment wildcard (*)
    SingleWildcard,
    /// Multi-segment wildcard (**)
    MultiWildcard,
}

/// A compiled path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    pattern: String,
    parts: Vec<PatternPart>,
    /// Set when the pattern ends in `/**`
    bare_prefix: Option<String>,
}

impl PathPattern {
    /// Compile a pattern; it must be absolute
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        if !pattern.starts_with('/') {
            return Err(RuleError::InvalidPattern(pattern.to_string()));
        }
        if pattern.contains("***") {
            return Err(RuleError::InvalidPattern(pattern.to_string()));
        }

        let bare_prefix = pattern
            .strip_suffix("/**")
            .map(|p| if p.is_empty() { "/".to_string() } else { p.to_string() });

        Ok(Self {
            pattern: pattern.to_string(),
            parts: Self::compile(pattern),
            bare_prefix,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Compile a glob-like pattern into parts
    fn compile(pattern: &str) -> Vec<PatternPart> {
        let mut parts = Vec::new();
        let mut current = String::new();

        let chars: Vec<char> = pattern.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];

            if ch == '*' {
                if !current.is_empty() {
                    parts.push(PatternPart::Literal(current.clone()));
                    current.clear();
                }

                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    parts.push(PatternPart::MultiWildcard);
                    i += 2;
                } else {
                    parts.push(PatternPart::SingleWildcard);
                    i += 1;
                }
            } else {
                current.push(ch);
                i += 1;
            }
        }

        if !current.is_empty() {
            parts.push(PatternPart::Literal(current));
        }

        parts
    }

    /// Check whether a request path matches
    pub fn matches(&self, path: &str) -> bool {
        if self.bare_prefix.as_deref() == Some(path) {
            return true;
        }
        let mut iterations = 0;
        Self::match_recursive(&self.parts, path, 0, 0, &mut iterations)
    }

    fn match_recursive(
        parts: &[PatternPart],
        path: &str,
        part_idx: usize,
        path_pos: usize,
        iterations: &mut usize,
    ) -> bool {
        *iterations += 1;
        if *iterations > MAX_MATCH_ITERATIONS {
            tracing::warn!(
                "Pattern matching exceeded {} iterations, aborting",
                MAX_MATCH_ITERATIONS
            );
            return false;
        }

        if part_idx >= parts.len() {
            return path_pos >= path.len();
        }

        let path_remaining = &path[path_pos..];

        match &parts[part_idx] {
            PatternPart::Literal(lit) => {
                path_remaining.starts_with(lit.as_str())
                    && Self::match_recursive(parts, path, part_idx + 1, path_pos + lit.len(), iterations)
            }
            PatternPart::SingleWildcard => {
                // Any prefix of the current segment
                let segment_end = path_remaining.find('/').unwrap_or(path_remaining.len());
                path_remaining[..segment_end]
                    .char_indices()
                    .map(|(i, _)| i)
                    .chain(std::iter::once(segment_end))
                    .any(|i| Self::match_recursive(parts, path, part_idx + 1, path_pos + i, iterations))
            }
            PatternPart::MultiWildcard => {
                if part_idx + 1 == parts.len() {
                    return true;
                }

                // `/**/x`: whole segments only, including none
                if let PatternPart::Literal(next) = &parts[part_idx + 1]
                    && let Some(rest) = next.strip_prefix('/')
                    && path[..path_pos].ends_with('/')
                {
                    let zero_segments = path_remaining.starts_with(rest)
                        && Self::match_recursive(
                            parts,
                            path,
                            part_idx + 2,
                            path_pos + rest.len(),
                            iterations,
                        );
                    return zero_segments
                        || path_remaining
                            .match_indices('/')
                            .map(|(i, _)| i)
                            .any(|i| {
                                Self::match_recursive(parts, path, part_idx + 1, path_pos + i, iterations)
                            });
                }

                path_remaining
                    .char_indices()
                    .map(|(i, _)| i)
                    .chain(std::iter::once(path_remaining.len()))
                    .any(|i| Self::match_recursive(parts, path, part_idx + 1, path_pos + i, iterations))
            }
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(p: &str) -> PathPattern {
        PathPattern::new(p).unwrap()
    }

    #[test]
    fn test_exact_match() {
        let p = pattern("/login/page");
        assert!(p.matches("/login/page"));
        assert!(!p.matches("/login/page/extra"));
        assert!(!p.matches("/login"));
    }

    #[test]
    fn test_single_wildcard() {
        let p = pattern("/js/*.js");
        assert!(p.matches("/js/app.js"));
        assert!(!p.matches("/js/vendor/app.js"));
        assert!(!p.matches("/js/app.css"));

        let p = pattern("/userAuth/*");
        assert!(p.matches("/userAuth/test"));
        assert!(!p.matches("/userAuth/a/b"));
    }

    #[test]
    fn test_multi_wildcard() {
        let p = pattern("/adminAuth/**");
        assert!(p.matches("/adminAuth/test"));
        assert!(p.matches("/adminAuth/deep/nested/path"));
        assert!(p.matches("/adminAuth/"));
        assert!(!p.matches("/adminAuthz/test"));
        assert!(!p.matches("/userAuth/test"));
    }

    #[test]
    fn test_trailing_multi_wildcard_matches_prefix() {
        let p = pattern("/userAuth/**");
        assert!(p.matches("/userAuth"));

        let root = pattern("/**");
        assert!(root.matches("/"));
        assert!(root.matches("/anything/at/all"));
    }

    #[test]
    fn test_multi_wildcard_in_middle() {
        let p = pattern("/static/**/logo.png");
        assert!(p.matches("/static/images/logo.png"));
        assert!(p.matches("/static/a/b/c/logo.png"));
        assert!(!p.matches("/static/images/icon.png"));
    }

    #[test]
    fn test_multi_wildcard_in_middle_matches_whole_segments() {
        let p = pattern("/static/**/logo.png");
        assert!(p.matches("/static/logo.png"));
        assert!(!p.matches("/static/mylogo.png"));

        let p = pattern("/a/**/b");
        assert!(p.matches("/a/b"));
        assert!(p.matches("/a/x/b"));
        assert!(p.matches("/a/x/y/b"));
        assert!(!p.matches("/a/xb"));
        assert!(!p.matches("/a/x/yb"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathPattern::new("login/page"),
            Err(RuleError::InvalidPattern(_))
        ));
        assert!(matches!(
            PathPattern::new("/a/***"),
            Err(RuleError::InvalidPattern(_))
        ));
    }
}
