//! Comma-separated path pattern matching for search filters.
//!
//! Patterns are glob-like: `*` matches any character sequence (including
//! `/`) and `{a,b,c}` is alternation. A compiled pattern matches anywhere
//! inside the path, case-insensitively — `*.py` matches `src/app.py`.
//!
//! Patterns that fail to compile are skipped with a warning. A user-supplied
//! filter string can loosen a search result set but never break the query:
//! for exclusion a dropped pattern excludes nothing it alone would have
//! caught, and an inclusion list with zero usable patterns matches
//! everything (see [`PathFilter::is_empty`]).

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

/// A compiled set of path patterns.
pub struct PathFilter {
    set: GlobSet,
    patterns: usize,
}

impl PathFilter {
    /// Compile a comma-separated pattern list.
    ///
    /// Entries are trimmed; empty entries and patterns that fail to compile
    /// are dropped. The resulting filter may be empty.
    pub fn compile(pattern_list: &str) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut patterns = 0;

        for raw in split_patterns(pattern_list) {
            let pattern = raw.trim();
            if pattern.is_empty() {
                continue;
            }
            match compile_one(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    patterns += 1;
                }
                Err(e) => warn!(pattern, error = %e, "skipping unparseable path pattern"),
            }
        }

        let set = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "path pattern set failed to build; matching nothing");
            GlobSet::empty()
        });

        Self { set, patterns }
    }

    /// True if no pattern survived compilation.
    ///
    /// Inclusion callers treat an empty filter as "match everything";
    /// exclusion callers get "exclude nothing" for free from [`matches`]
    /// returning false.
    ///
    /// [`matches`]: PathFilter::matches
    pub fn is_empty(&self) -> bool {
        self.patterns == 0
    }

    /// True iff `path` matches at least one compiled pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

/// One-shot convenience over [`PathFilter::compile`] + [`PathFilter::matches`].
pub fn matches_any(path: &str, pattern_list: &str) -> bool {
    PathFilter::compile(pattern_list).matches(path)
}

/// Split a pattern list on commas, keeping commas inside `{...}` alternation
/// groups — `"*.{py,md}, *.rs"` is two patterns, not three.
fn split_patterns(list: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in list.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&list[start..]);
    out
}

/// Compile a single glob into an anchorless, case-insensitive matcher.
///
/// The pattern is padded with `*` on either side (when not already present)
/// so it is searched for anywhere within the path rather than matched
/// against the whole string.
fn compile_one(pattern: &str) -> Result<Glob, globset::Error> {
    let mut anchorless = String::with_capacity(pattern.len() + 2);
    if !pattern.starts_with('*') {
        anchorless.push('*');
    }
    anchorless.push_str(pattern);
    if !pattern.ends_with('*') {
        anchorless.push('*');
    }

    GlobBuilder::new(&anchorless)
        .case_insensitive(true)
        .literal_separator(false)
        .build()
}
