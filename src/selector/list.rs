//! Comma-joined selector lists as stored per label

use super::optimizer::{self, parse_nth_child, render_run};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ordered, de-duplicated selector entries of one label
///
/// Displays as the label's selector string (`a, b, c`). Parsing that string
/// back yields the same set of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList {
    entries: Vec<String>,
}

impl SelectorList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a selector string verbatim (de-duplicated, not optimized)
    pub fn parse(input: &str) -> Self {
        Self {
            entries: optimizer::split_selectors(input),
        }
    }

    /// The stored entries
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Membership of a concrete selector in the stored entries
    ///
    /// Exact string match, or a single `base:nth-child(k)` covered by a folded
    /// range entry with the same base. No document query is involved.
    pub fn contains(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if self.entries.iter().any(|s| s == selector) {
            return true;
        }
        let Some(wanted) = parse_nth_child(selector) else {
            return false;
        };
        self.entries
            .iter()
            .filter_map(|s| parse_nth_child(s))
            .any(|stored| stored.covers(&wanted))
    }

    /// Add an entry and re-optimize
    pub fn insert(&mut self, selector: &str) {
        let combined = optimizer::combine(&self.to_string(), selector);
        self.entries = optimizer::split_selectors(&combined);
    }

    /// Remove an entry and re-optimize the remainder
    ///
    /// A single `:nth-child(k)` inside a folded range splits the range.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, selector: &str) -> bool {
        let selector = selector.trim();
        let before = self.entries.len();
        self.entries.retain(|s| s != selector);
        let mut removed = self.entries.len() != before;

        if !removed {
            if let Some(wanted) = parse_nth_child(selector) {
                let mut next = Vec::with_capacity(self.entries.len() + 1);
                for entry in &self.entries {
                    match parse_nth_child(entry) {
                        Some(stored) if !removed && stored.covers(&wanted) => {
                            if stored.start < wanted.start {
                                next.extend(render_run(
                                    stored.base,
                                    stored.start,
                                    wanted.start - 1,
                                ));
                            }
                            if wanted.end < stored.end {
                                next.extend(render_run(stored.base, wanted.end + 1, stored.end));
                            }
                            removed = true;
                        }
                        _ => next.push(entry.clone()),
                    }
                }
                self.entries = next;
            }
        }

        if removed {
            self.entries = optimizer::optimize(std::mem::take(&mut self.entries));
        }
        removed
    }

    /// Replace `from` with `to` in place, keeping entries unique
    pub fn replace(&mut self, from: &str, to: &str) -> bool {
        let Some(pos) = self.entries.iter().position(|s| s == from) else {
            return false;
        };
        if self.entries.iter().any(|s| s == to) {
            self.entries.remove(pos);
        } else {
            self.entries[pos] = to.to_string();
        }
        self.entries = optimizer::optimize(std::mem::take(&mut self.entries));
        true
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entries.join(", "))
    }
}

impl FromStr for SelectorList {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for SelectorList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SelectorList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
