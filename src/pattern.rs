//! Filename pattern matching.
//!
//! A raw pattern is classified once, at compile time, as either an extension
//! suffix or an exact file name. Matching is case-insensitive for both
//! variants, except that a case-sensitive equality between the raw pattern
//! and the filename always wins first.
//!
//! | raw pattern    | classified as                 | matches                    |
//! |----------------|-------------------------------|----------------------------|
//! | `.py`          | `Extension(".py")`            | `main.py`, `MAIN.PY`       |
//! | `cursorrules`  | `Extension(".cursorrules")`   | `.cursorrules`, `a.cursorrules` |
//! | `README.md`    | `ExactName("README.md")`      | `readme.md`, not `notREADME.md` |

use tracing::trace;

/// One compiled match pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPattern {
    /// Matches filenames ending with `suffix` (which always starts with `.`).
    Extension {
        /// Pattern text as supplied by the user.
        raw: String,
        /// Lowercased suffix including the leading dot.
        suffix: String,
    },
    /// Matches filenames equal to `name`, ignoring case.
    ExactName {
        /// Pattern text as supplied by the user.
        raw: String,
        /// Lowercased file name.
        name: String,
    },
}

impl MatchPattern {
    /// Classifies one trimmed, non-empty raw pattern.
    #[must_use]
    pub fn compile(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if raw.starts_with('.') {
            Self::Extension {
                raw: raw.to_string(),
                suffix: lowered,
            }
        } else if raw.contains('.') {
            Self::ExactName {
                raw: raw.to_string(),
                name: lowered,
            }
        } else {
            Self::Extension {
                raw: raw.to_string(),
                suffix: format!(".{lowered}"),
            }
        }
    }

    /// Returns the pattern text as supplied by the user.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Extension { raw, .. } | Self::ExactName { raw, .. } => raw,
        }
    }

    /// Returns true if `filename` satisfies this pattern.
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        if self.raw() == filename {
            return true;
        }
        let lowered = filename.to_lowercase();
        match self {
            Self::Extension { suffix, .. } => lowered.ends_with(suffix.as_str()),
            Self::ExactName { name, .. } => lowered == *name,
        }
    }
}

/// An ordered set of compiled patterns; a filename matches if any pattern does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<MatchPattern>,
}

impl PatternSet {
    /// Compiles raw patterns, trimming each and discarding empty entries.
    #[must_use]
    pub fn compile<I, S>(raw_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = raw_patterns
            .into_iter()
            .filter_map(|raw| {
                let trimmed = raw.as_ref().trim();
                (!trimmed.is_empty()).then(|| MatchPattern::compile(trimmed))
            })
            .collect();
        Self { patterns }
    }

    /// Compiles a comma-separated pattern string such as `".py, README.md"`.
    #[must_use]
    pub fn parse(comma_separated: &str) -> Self {
        Self::compile(comma_separated.split(','))
    }

    /// Returns true when no usable pattern was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the compiled patterns in input order.
    #[must_use]
    pub fn patterns(&self) -> &[MatchPattern] {
        &self.patterns
    }

    /// Returns the raw pattern texts joined for display.
    #[must_use]
    pub fn describe(&self) -> String {
        self.patterns
            .iter()
            .map(MatchPattern::raw)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns true if `filename` matches any pattern in the set.
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        let filename = filename.trim();
        if filename.is_empty() {
            return false;
        }
        let matched = self.patterns.iter().any(|pattern| pattern.matches(filename));
        trace!(filename, matched, "pattern check");
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_prefixed_pattern_is_case_insensitive_extension() {
        let set = PatternSet::parse(".py");
        assert!(set.matches("main.py"));
        assert!(set.matches("MAIN.PY"));
        assert!(!set.matches("main.pyc"));
        assert!(!set.matches("py"));
    }

    #[test]
    fn test_bare_word_is_implicit_extension() {
        let set = PatternSet::parse("cursorrules");
        assert!(set.matches(".cursorrules"));
        assert!(set.matches("team.CursorRules"));
        assert!(!set.matches("CURSORRULES"), "no dot before the suffix");
        assert!(!set.matches("xcursorrules"));
    }

    #[test]
    fn test_bare_word_exact_equality_wins_first() {
        // Case-sensitive equality is checked before the extension rule.
        let set = PatternSet::parse("Makefile");
        assert!(set.matches("Makefile"));
        assert!(!set.matches("makefile"));
    }

    #[test]
    fn test_dotted_pattern_is_case_insensitive_exact_name() {
        let set = PatternSet::parse("README.md");
        assert!(set.matches("README.md"));
        assert!(set.matches("readme.MD"));
        assert!(!set.matches("notREADME.md"));
        assert!(!set.matches("README.md.bak"));
    }

    #[test]
    fn test_dotfile_pattern_matches_by_suffix() {
        let set = PatternSet::parse(".cursorrules");
        assert!(set.matches(".cursorrules"));
        assert!(set.matches("project.cursorrules"));
    }

    #[test]
    fn test_any_pattern_matches() {
        let set = PatternSet::parse(".rs, Cargo.toml ,md");
        assert!(set.matches("lib.rs"));
        assert!(set.matches("cargo.toml"));
        assert!(set.matches("NOTES.md"));
        assert!(!set.matches("Cargo.lock"));
    }

    #[test]
    fn test_parse_discards_empty_entries() {
        let set = PatternSet::parse(" , .py,, ");
        assert_eq!(set.patterns().len(), 1);
        assert_eq!(set.describe(), ".py");
        assert!(PatternSet::parse(" , ").is_empty());
    }

    #[test]
    fn test_empty_set_and_empty_filename_never_match() {
        assert!(!PatternSet::default().matches("main.py"));
        assert!(!PatternSet::parse(".py").matches("   "));
    }

    #[test]
    fn test_filename_is_trimmed_before_matching() {
        assert!(PatternSet::parse(".py").matches("  main.py "));
    }

    #[test]
    fn test_compile_classifies_variants() {
        assert_eq!(
            MatchPattern::compile("TXT"),
            MatchPattern::Extension {
                raw: "TXT".to_string(),
                suffix: ".txt".to_string()
            }
        );
        assert_eq!(
            MatchPattern::compile("Dockerfile.dev"),
            MatchPattern::ExactName {
                raw: "Dockerfile.dev".to_string(),
                name: "dockerfile.dev".to_string()
            }
        );
    }
}
