//! Label assignment store: the ground truth of what is tagged as what

use super::Label;
use crate::selector::SelectorList;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Result of a membership toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Mapping from label to its selector list, in label display order
///
/// Every mutation is a single synchronous update, so readers never observe a
/// half-applied move between labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelAssignments {
    entries: Vec<(Label, SelectorList)>,
}

impl LabelAssignments {
    /// Create a store with empty selector sets for `labels`
    pub fn with_labels<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let mut store = Self::default();
        for label in labels {
            store.slot(label.into());
        }
        store
    }

    /// Labels in display order
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|(label, _)| label)
    }

    /// Labels with their selector lists
    pub fn iter(&self) -> impl Iterator<Item = (&Label, &SelectorList)> {
        self.entries.iter().map(|(label, list)| (label, list))
    }

    /// A label's selector list
    pub fn selectors(&self, label: &Label) -> Option<&SelectorList> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, list)| list)
    }

    /// A label's selector string; empty for unknown labels
    pub fn selector_string(&self, label: &Label) -> String {
        self.selectors(label).map(ToString::to_string).unwrap_or_default()
    }

    /// Replace a label's selector string wholesale
    pub fn set_selector(&mut self, label: &Label, selector_string: &str) {
        *self.slot(label.clone()) = SelectorList::parse(selector_string);
    }

    /// Remove `selector` from `label` if present, otherwise add it
    pub fn toggle_membership(&mut self, label: &Label, selector: &str) -> Toggle {
        let list = self.slot(label.clone());
        if list.contains(selector) {
            list.remove(selector);
            Toggle::Removed
        } else {
            list.insert(selector);
            Toggle::Added
        }
    }

    /// Add `selector` to `label` through the optimizer
    pub fn add(&mut self, label: &Label, selector: &str) {
        self.slot(label.clone()).insert(selector);
    }

    /// Remove `selector` from `label`
    pub fn remove(&mut self, label: &Label, selector: &str) -> bool {
        match self.slot_mut(label) {
            Some(list) => list.remove(selector),
            None => false,
        }
    }

    /// Swap a member of `label` for its refined form
    pub fn replace(&mut self, label: &Label, from: &str, to: &str) -> bool {
        match self.slot_mut(label) {
            Some(list) => list.replace(from, to),
            None => false,
        }
    }

    /// Labels whose stored entries contain `selector`
    pub fn members_of(&self, selector: &str) -> Vec<Label> {
        self.entries
            .iter()
            .filter(|(_, list)| list.contains(selector))
            .map(|(label, _)| label.clone())
            .collect()
    }

    /// Whether any label holds `selector`
    pub fn is_tagged(&self, selector: &str) -> bool {
        self.entries.iter().any(|(_, list)| list.contains(selector))
    }

    /// Move `selector` from one label to another in one step
    ///
    /// Nothing changes unless `selector` is a member of `from`.
    pub fn move_membership(&mut self, selector: &str, from: &Label, to: &Label) -> bool {
        if from == to {
            return self.selectors(from).is_some_and(|list| list.contains(selector));
        }
        let Some(source) = self.slot_mut(from) else {
            return false;
        };
        if !source.remove(selector) {
            return false;
        }
        self.slot(to.clone()).insert(selector);
        log::debug!("Moved `{selector}` from {from} to {to}");
        true
    }

    /// Every stored selector across labels, without duplicates
    pub fn all_selectors(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for (_, list) in &self.entries {
            for entry in list.entries() {
                if !out.contains(entry) {
                    out.push(entry.clone());
                }
            }
        }
        out
    }

    fn slot(&mut self, label: Label) -> &mut SelectorList {
        let pos = match self.entries.iter().position(|(l, _)| *l == label) {
            Some(pos) => pos,
            None => {
                self.entries.push((label, SelectorList::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    fn slot_mut(&mut self, label: &Label) -> Option<&mut SelectorList> {
        self.entries
            .iter_mut()
            .find(|(l, _)| l == label)
            .map(|(_, list)| list)
    }
}

impl Serialize for LabelAssignments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(label, list)| (label, list)))
    }
}

impl<'de> Deserialize<'de> for LabelAssignments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = LabelAssignments;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of label to selector string")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut store = LabelAssignments::default();
                while let Some((label, list)) = map.next_entry::<Label, SelectorList>()? {
                    *store.slot(label) = list;
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
