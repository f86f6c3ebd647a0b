//! Ordered CSS selector alternatives.
//!
//! Host markup drifts between releases and A/B variants. A [`Locator`] holds
//! the known variants in priority order: queries use the first alternative
//! that matches at least one element, so a stale primary pattern falls
//! through to the next one instead of returning nothing.

use std::fmt;

use scraper::{ElementRef, Selector};

use crate::error::{DomError, Result};

/// A compiled, ordered list of CSS selector alternatives.
#[derive(Clone)]
pub struct Locator {
    alternatives: Vec<(String, Selector)>,
}

impl Locator {
    /// Compile every pattern, failing on the first invalid one.
    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let alternatives = patterns
            .iter()
            .map(|p| {
                let pattern = p.as_ref();
                Selector::parse(pattern)
                    .map(|selector| (pattern.to_owned(), selector))
                    .map_err(|e| DomError::InvalidSelector {
                        selector: pattern.to_owned(),
                        reason: format!("{e:?}"),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { alternatives })
    }

    /// Whether the locator has no alternatives.
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Source patterns in priority order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.alternatives.iter().map(|(p, _)| p.as_str())
    }

    /// Compiled selectors in priority order.
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.alternatives.iter().map(|(_, s)| s)
    }

    /// Whether any alternative matches the element.
    pub fn matches_any(&self, el: &ElementRef<'_>) -> bool {
        self.selectors().any(|s| s.matches(el))
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.patterns()).finish()
    }
}
