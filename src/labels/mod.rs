//! Semantic labels, their palette, and the label assignment store

mod store;

pub use store::{LabelAssignments, Toggle};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Border color for labels missing from the palette
pub const FALLBACK_COLOR: &str = "gray";

/// A user-defined semantic category such as "제목" or "날짜"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One palette entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub name: String,
    pub color: String,
}

/// Label display order and colors, fixed for the lifetime of a session
///
/// The order doubles as border precedence: earlier labels are drawn outermost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPalette {
    entries: Vec<(Label, String)>,
}

impl LabelPalette {
    /// Build a palette from `(label, color)` pairs in priority order
    pub fn new<I, L, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, C)>,
        L: Into<Label>,
        C: Into<String>,
    {
        let mut palette = Self { entries: Vec::new() };
        for (label, color) in entries {
            let label = label.into();
            if !palette.contains(&label) {
                palette.entries.push((label, color.into()));
            }
        }
        palette
    }

    /// Palette from configuration entries
    pub fn from_styles(styles: &[LabelStyle]) -> Self {
        Self::new(styles.iter().map(|s| (s.name.as_str(), s.color.as_str())))
    }

    /// Labels in priority order
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|(label, _)| label)
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.entries.iter().any(|(l, _)| l == label)
    }

    /// Border color for a label
    pub fn color(&self, label: &Label) -> &str {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, color)| color.as_str())
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Priority rank; labels outside the palette sort last
    pub fn priority(&self, label: &Label) -> usize {
        self.entries
            .iter()
            .position(|(l, _)| l == label)
            .unwrap_or(usize::MAX)
    }

    /// Sort labels by priority, keeping the relative order of unknown labels
    pub fn sort(&self, labels: &mut [Label]) {
        labels.sort_by_key(|label| self.priority(label));
    }
}

impl Default for LabelPalette {
    fn default() -> Self {
        Self::new([
            ("번호", "blue"),
            ("제목", "green"),
            ("날짜", "yellow"),
            ("조회수", "orange"),
            ("링크", "purple"),
        ])
    }
}
