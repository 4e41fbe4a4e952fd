use std::fmt;
use std::sync::Arc;

/// Entry-name test used by rules and hooks.
#[derive(Clone)]
pub enum Matcher {
    Any,
    Exact(String),
    Prefix(String),
    Suffix(String),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Matcher {
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::Suffix(suffix.into())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(s) => name == s,
            Self::Prefix(s) => name.starts_with(s.as_str()),
            Self::Suffix(s) => name.ends_with(s.as_str()),
            Self::Predicate(f) => f(name),
        }
    }
}

impl From<&str> for Matcher {
    fn from(name: &str) -> Self {
        Self::Exact(name.to_string())
    }
}

impl From<String> for Matcher {
    fn from(name: String) -> Self {
        Self::Exact(name)
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Exact(s) => f.debug_tuple("Exact").field(s).finish(),
            Self::Prefix(s) => f.debug_tuple("Prefix").field(s).finish(),
            Self::Suffix(s) => f.debug_tuple("Suffix").field(s).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        let m = Matcher::from("com/example/Red.class");
        assert!(m.matches("com/example/Red.class"));
        assert!(!m.matches("com/example/Red.class2"));
        assert!(!m.matches("Red.class"));
    }

    #[test]
    fn prefix_and_suffix() {
        assert!(Matcher::prefix("META-INF/").matches("META-INF/MANIFEST.MF"));
        assert!(!Matcher::prefix("META-INF/").matches("com/META-INF/"));
        assert!(Matcher::suffix(".class").matches("com/example/Blue.class"));
        assert!(!Matcher::suffix(".class").matches("Blue.class.txt"));
    }

    #[test]
    fn predicate_and_any() {
        let m = Matcher::predicate(|name| name.len() == 3);
        assert!(m.matches("abc"));
        assert!(!m.matches("abcd"));
        assert!(Matcher::Any.matches(""));
        assert_eq!(format!("{m:?}"), "Predicate(..)");
    }
}
