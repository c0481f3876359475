//! Path normalization and conversation keys.
//!
//! The backend and the local workspace do not agree on path spelling: the
//! same file may show up as `C:\Proj\src\App.py` and `c:/proj/src/app.py`.
//! Every comparison of file identity goes through [`NormalizedPath`], which
//! folds separator runs to a single `/` and lowercases the result.

use std::fmt;

/// A case-folded path with `/` separators, used for identity comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    /// Normalize a raw path string.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    /// Return the normalized string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this path ends with the whole components of `suffix`.
    ///
    /// Used to match a backend-relative filename against an absolute open path:
    /// `src/x.py` ends with `x.py` but `src/max.py` does not.
    #[must_use]
    pub fn ends_with(&self, suffix: &Self) -> bool {
        let wanted = suffix.0.trim_start_matches('/');
        if wanted.is_empty() {
            return false;
        }
        self.0 == wanted
            || self
                .0
                .strip_suffix(wanted)
                .is_some_and(|head| head.ends_with('/'))
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NormalizedPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Fold every run of `/` or `\` into one `/` and lowercase.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_separator = false;
    for c in raw.chars() {
        if c == '/' || c == '\\' {
            if !in_separator {
                out.push('/');
            }
            in_separator = true;
        } else {
            in_separator = false;
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Whether two raw paths refer to the same file.
#[must_use]
pub fn same_path(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Last component of a path, accepting either separator style.
#[must_use]
pub fn file_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw)
}

/// Key of a conversation buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversationKey {
    /// The conversation shown when no file is active.
    Global,
    /// The conversation attached to one open file.
    File(NormalizedPath),
}

impl ConversationKey {
    /// Key for an optional file path: `None` maps to the global buffer.
    #[must_use]
    pub fn for_path(path: Option<&str>) -> Self {
        path.map_or(Self::Global, |p| Self::File(NormalizedPath::new(p)))
    }

    /// Whether this is the global conversation.
    #[must_use]
    pub const fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::File(path) => write!(f, "{path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_and_case_fold() {
        assert_eq!(normalize(r"C:\Proj\\src\App.py"), "c:/proj/src/app.py");
        assert_eq!(normalize("c:/proj//src/app.py"), "c:/proj/src/app.py");
        assert!(same_path(r"C:\Proj\src\App.py", "c:/PROJ/src/app.py"));
    }

    #[test]
    fn different_files_stay_different() {
        assert!(!same_path("src/a.py", "src/b.py"));
    }

    #[test]
    fn keys_match_across_spellings() {
        let a = ConversationKey::for_path(Some(r"D:\work\Main.rs"));
        let b = ConversationKey::for_path(Some("d:/work/main.rs"));
        assert_eq!(a, b);
        assert_eq!(ConversationKey::for_path(None), ConversationKey::Global);
    }

    #[test]
    fn ends_with_matches_relative_filename() {
        let open = NormalizedPath::new(r"C:\proj\src\x.py");
        assert!(open.ends_with(&NormalizedPath::new("src/X.py")));
        assert!(!open.ends_with(&NormalizedPath::new("y.py")));
    }

    #[test]
    fn ends_with_respects_component_boundaries() {
        let open = NormalizedPath::new("src/max.py");
        assert!(!open.ends_with(&NormalizedPath::new("x.py")));
        assert!(!open.ends_with(&NormalizedPath::new("ax.py")));
        assert!(open.ends_with(&NormalizedPath::new("max.py")));
        assert!(open.ends_with(&NormalizedPath::new("/src/max.py")));
        assert!(!open.ends_with(&NormalizedPath::new("")));
    }

    #[test]
    fn file_name_accepts_both_separators() {
        assert_eq!(file_name(r"C:\proj\src\x.py"), "x.py");
        assert_eq!(file_name("src/y.rs"), "y.rs");
        assert_eq!(file_name("plain.txt"), "plain.txt");
    }
}
