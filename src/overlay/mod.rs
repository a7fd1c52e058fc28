//! Overlay renderer
//!
//! Paints nested label borders onto elements of the rendering surface. Visual
//! state lives in a side table keyed by element identity rather than on the
//! nodes themselves, and every full repaint starts from a clean slate.

mod state;

pub use state::{tooltip, BorderRing, OverlayState, Paint, Snapshot, BASE_SHADOW};

use crate::labels::{Label, LabelAssignments, LabelPalette};
use crate::renderer::{Decoration, ElementId, RenderSurface};
use std::collections::HashMap;

/// Maximum number of nested borders drawn on one element
pub const MAX_VISIBLE_LABELS: usize = 3;

/// Border width of the ring at `depth` (0 = outermost)
pub fn ring_width(depth: usize) -> u32 {
    2 + depth as u32 * 2
}

/// Owns transient per-element overlay state for one rendered document
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    palette: LabelPalette,
    max_visible: usize,
    states: HashMap<ElementId, OverlayState>,
}

impl OverlayRenderer {
    pub fn new(palette: LabelPalette) -> Self {
        Self {
            palette,
            max_visible: MAX_VISIBLE_LABELS,
            states: HashMap::new(),
        }
    }

    pub fn palette(&self) -> &LabelPalette {
        &self.palette
    }

    /// Overlay state of an element, if anything was ever painted on it
    pub fn state(&self, id: ElementId) -> Option<&OverlayState> {
        self.states.get(&id)
    }

    /// Elements that currently carry overlay state
    pub fn painted(&self) -> impl Iterator<Item = (&ElementId, &OverlayState)> {
        self.states.iter()
    }

    /// Presentation attributes for serialization
    pub fn decoration(&self, id: ElementId) -> Option<Decoration> {
        self.states.get(&id).and_then(OverlayState::decoration)
    }

    /// Drop all state, e.g. when the document is replaced
    pub fn reset(&mut self) {
        self.states.clear();
    }

    /// Clear everything, then paint every element from the store
    ///
    /// Invalid selectors are skipped individually.
    pub fn repaint(&mut self, surface: &RenderSurface, store: &LabelAssignments) {
        self.reset();

        let mut memberships: HashMap<ElementId, Vec<Label>> = HashMap::new();
        for (label, list) in store.iter() {
            for selector in list.entries() {
                match surface.query(selector) {
                    Ok(ids) => {
                        for id in ids {
                            let labels = memberships.entry(id).or_default();
                            if !labels.contains(label) {
                                labels.push(label.clone());
                            }
                        }
                    }
                    Err(e) => log::warn!("Skipping selector during repaint: {e}"),
                }
            }
        }

        log::debug!("Repainting {} element(s)", memberships.len());
        for (id, labels) in memberships {
            self.apply_border(id, &labels);
        }
    }

    /// Labels whose selectors match `id`, in priority order
    pub fn membership(
        &self,
        surface: &RenderSurface,
        store: &LabelAssignments,
        id: ElementId,
    ) -> Vec<Label> {
        let mut labels: Vec<Label> = store
            .iter()
            .filter(|(_, list)| {
                list.entries()
                    .iter()
                    .any(|selector| surface.query(selector).is_ok_and(|ids| ids.contains(&id)))
            })
            .map(|(label, _)| label.clone())
            .collect();
        self.palette.sort(&mut labels);
        labels
    }

    /// Paint nested borders for `labels`; an empty list clears the element
    pub fn apply_border(&mut self, id: ElementId, labels: &[Label]) {
        if labels.is_empty() {
            self.clear_element(id);
            return;
        }

        let mut ordered = labels.to_vec();
        self.palette.sort(&mut ordered);

        let rings = ordered
            .iter()
            .take(self.max_visible)
            .enumerate()
            .map(|(depth, label)| BorderRing {
                width_px: ring_width(depth),
                color: self.palette.color(label).to_string(),
            })
            .collect();

        let state = self.states.entry(id).or_default();
        state.paint = Paint {
            rings,
            box_shadow: BASE_SHADOW.to_string(),
        };
        state.title = tooltip(&ordered);
        state.labels = ordered;
    }

    /// Remove all overlay state from one element
    pub fn clear_element(&mut self, id: ElementId) {
        self.states.remove(&id);
    }

    /// Paint a hover preview for the active label, saving the prior paint once
    pub fn preview(&mut self, id: ElementId, active: &Label) {
        let state = self.states.entry(id).or_default();
        if state.saved.is_none() {
            state.saved = Some(state.snapshot());
        }
        state.paint = Paint {
            rings: vec![BorderRing {
                width_px: ring_width(0),
                color: self.palette.color(active).to_string(),
            }],
            box_shadow: BASE_SHADOW.to_string(),
        };
        state.labels = vec![active.clone()];
        state.title = tooltip(&state.labels);
    }

    /// Undo a hover preview
    ///
    /// Untagged elements are cleared. Tagged ones get their saved paint back,
    /// or a fresh paint from their current membership when nothing was saved.
    pub fn end_preview(
        &mut self,
        surface: &RenderSurface,
        store: &LabelAssignments,
        id: ElementId,
        tagged: bool,
    ) {
        if !tagged {
            self.clear_element(id);
            return;
        }

        let saved = self.states.get_mut(&id).and_then(|state| state.saved.take());
        match saved {
            Some(snapshot) if !snapshot.paint.is_empty() => {
                if let Some(state) = self.states.get_mut(&id) {
                    state.restore(snapshot);
                }
            }
            _ => {
                let labels = self.membership(surface, store, id);
                self.apply_border(id, &labels);
            }
        }
    }

    /// Put back every saved pre-hover paint and drop the snapshots
    pub fn restore_snapshots(&mut self) {
        for state in self.states.values_mut() {
            if let Some(snapshot) = state.saved.take() {
                state.restore(snapshot);
            }
        }
        self.states.retain(|_, state| !state.is_blank());
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(LabelPalette::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"
        <table>
            <tr><td class="num">1</td><td class="subject">Hello</td><td class="date">01.02</td></tr>
            <tr><td class="num">2</td><td class="subject">World</td><td class="date">01.03</td></tr>
        </table>
    "#;

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().map(|n| Label::from(*n)).collect()
    }

    #[test]
    fn test_repaint_paints_every_match() {
        let surface = RenderSurface::parse(PAGE);
        let mut store = LabelAssignments::with_labels(["번호", "제목"]);
        store.add(&"제목".into(), "td.subject");

        let mut overlay = OverlayRenderer::default();
        overlay.repaint(&surface, &store);

        for id in surface.query("td.subject").unwrap() {
            let state = overlay.state(id).unwrap();
            assert_eq!(state.paint.border(), "2px solid green");
            assert_eq!(state.title, "선택된 타입: 제목");
        }
        for id in surface.query("td.num").unwrap() {
            assert!(overlay.state(id).is_none());
        }
    }

    #[test]
    fn test_invalid_selector_is_skipped() {
        let surface = RenderSurface::parse(PAGE);
        let mut store = LabelAssignments::with_labels(["제목"]);
        store.set_selector(&"제목".into(), "td.num, td:::bad, td.subject, td.date");

        let mut overlay = OverlayRenderer::default();
        overlay.repaint(&surface, &store);

        assert_eq!(overlay.painted().count(), 6);
    }

    #[test]
    fn test_nested_borders_follow_priority_and_cap() {
        let surface = RenderSurface::parse(PAGE);
        let id = surface.first("td.subject").unwrap();
        let mut overlay = OverlayRenderer::default();

        overlay.apply_border(id, &labels(&["링크", "조회수", "번호", "제목"]));
        let state = overlay.state(id).unwrap();

        let colors: Vec<(u32, &str)> = state
            .paint
            .rings
            .iter()
            .map(|r| (r.width_px, r.color.as_str()))
            .collect();
        assert_eq!(colors, vec![(2, "blue"), (4, "green"), (6, "orange")]);
        assert_eq!(state.title, "선택된 타입: 번호, 제목, 조회수, 링크");
    }

    #[test]
    fn test_repaint_starts_from_clean_slate() {
        let surface = RenderSurface::parse(PAGE);
        let num = surface.first("td.num").unwrap();
        let mut overlay = OverlayRenderer::default();
        overlay.preview(num, &"번호".into());

        overlay.repaint(&surface, &LabelAssignments::with_labels(["번호"]));
        assert!(overlay.state(num).is_none());
    }

    #[test]
    fn test_preview_then_leave_untagged_clears() {
        let surface = RenderSurface::parse(PAGE);
        let store = LabelAssignments::with_labels(["제목"]);
        let id = surface.first("td.date").unwrap();
        let mut overlay = OverlayRenderer::default();

        overlay.preview(id, &"제목".into());
        assert_eq!(overlay.state(id).unwrap().paint.border(), "2px solid green");
        let saved = overlay.state(id).unwrap().saved.as_ref().unwrap();
        assert!(saved.paint.is_empty());

        overlay.end_preview(&surface, &store, id, false);
        assert!(overlay.state(id).is_none());
    }

    #[test]
    fn test_leave_after_commit_repaints_membership() {
        let surface = RenderSurface::parse(PAGE);
        let mut store = LabelAssignments::with_labels(["번호", "제목"]);
        let id = surface.first("td.subject").unwrap();
        let mut overlay = OverlayRenderer::default();

        overlay.preview(id, &"제목".into());
        store.add(&"번호".into(), "td.subject");
        store.add(&"제목".into(), "td.subject");
        overlay.end_preview(&surface, &store, id, true);

        let state = overlay.state(id).unwrap();
        assert_eq!(state.labels, labels(&["번호", "제목"]));
        assert!(state.saved.is_none());
    }

    #[test]
    fn test_restore_snapshots_drops_previews() {
        let surface = RenderSurface::parse(PAGE);
        let mut store = LabelAssignments::with_labels(["번호", "제목"]);
        store.add(&"번호".into(), "td.num");
        let mut overlay = OverlayRenderer::default();
        overlay.repaint(&surface, &store);

        let tagged = surface.first("td.num").unwrap();
        let untagged = surface.first("td.date").unwrap();
        overlay.preview(tagged, &"제목".into());
        overlay.preview(untagged, &"제목".into());

        overlay.restore_snapshots();
        assert_eq!(overlay.state(tagged).unwrap().paint.border(), "2px solid blue");
        assert_eq!(overlay.state(tagged).unwrap().labels, labels(&["번호"]));
        assert!(overlay.state(tagged).unwrap().saved.is_none());
        assert!(overlay.state(untagged).is_none());
    }
}
