use crate::error::CatalogError;
use regex::Regex;
use tp_domain::LocationPath;

/// Predicate over location paths, compiled once per request.
/// A path matches if the pattern occurs anywhere in it (search, not full match).
/// Without a pattern every path matches.
#[derive(Debug, Clone)]
pub struct LocationFilter {
    pattern: Option<Regex>,
}

impl LocationFilter {
    pub fn compile(pattern: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            pattern: Some(Regex::new(pattern)?),
        })
    }

    pub fn everything() -> Self {
        Self { pattern: None }
    }

    pub fn matches(&self, path: &LocationPath) -> bool {
        self.pattern.as_ref().map_or(true, |p| p.is_match(&path.0))
    }
}
