//! Per-element overlay state, kept in a side table keyed by `ElementId`

use crate::labels::Label;
use crate::renderer::Decoration;

/// Subtle outline added under every painted border
pub const BASE_SHADOW: &str = "0 0 0 1px rgba(0,0,0,0.1)";

/// One label's ring in a nested border
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderRing {
    pub width_px: u32,
    pub color: String,
}

/// The visual style the overlay owns on an element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paint {
    /// Outermost ring first
    pub rings: Vec<BorderRing>,
    pub box_shadow: String,
}

impl Paint {
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty() && self.box_shadow.is_empty()
    }

    /// CSS `border` value: the outermost ring
    pub fn border(&self) -> String {
        self.rings
            .first()
            .map(|ring| format!("{}px solid {}", ring.width_px, ring.color))
            .unwrap_or_default()
    }

    /// CSS `box-shadow` value: inner rings as inset shadows, then the base shadow
    pub fn shadow(&self) -> String {
        let mut layers: Vec<String> = self
            .rings
            .iter()
            .skip(1)
            .map(|ring| format!("inset 0 0 0 {}px {}", ring.width_px, ring.color))
            .collect();
        if !self.box_shadow.is_empty() {
            layers.push(self.box_shadow.clone());
        }
        layers.join(", ")
    }

    /// Inline style declarations
    pub fn style(&self) -> String {
        let mut declarations = Vec::new();
        let border = self.border();
        if !border.is_empty() {
            declarations.push(format!("border: {border}"));
        }
        let shadow = self.shadow();
        if !shadow.is_empty() {
            declarations.push(format!("box-shadow: {shadow}"));
        }
        declarations.join("; ")
    }
}

/// What a hover preview overwrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub paint: Paint,
    pub labels: Vec<Label>,
    pub title: String,
}

/// Ephemeral rendering state of one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    /// What is currently painted
    pub paint: Paint,
    /// State saved before a hover preview, restored on pointer-leave
    pub saved: Option<Snapshot>,
    /// Every label the element belongs to, for the tooltip
    pub labels: Vec<Label>,
    pub title: String,
}

impl OverlayState {
    /// Capture the visible part of the state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            paint: self.paint.clone(),
            labels: self.labels.clone(),
            title: self.title.clone(),
        }
    }

    /// Put a snapshot back
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.paint = snapshot.paint;
        self.labels = snapshot.labels;
        self.title = snapshot.title;
    }

    /// Nothing painted and nothing to restore
    pub fn is_blank(&self) -> bool {
        self.paint.is_empty() && self.saved.is_none() && self.title.is_empty()
    }

    pub fn decoration(&self) -> Option<Decoration> {
        let style = self.paint.style();
        if style.is_empty() && self.title.is_empty() {
            return None;
        }
        Some(Decoration {
            style,
            title: self.title.clone(),
        })
    }
}

/// Tooltip listing every label, including those beyond the visible cap
pub fn tooltip(labels: &[Label]) -> String {
    let names: Vec<&str> = labels.iter().map(Label::name).collect();
    format!("선택된 타입: {}", names.join(", "))
}
