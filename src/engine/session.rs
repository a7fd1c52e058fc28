//! One page analysis session

use crate::labels::{Label, LabelAssignments, LabelPalette};
use crate::overlay::OverlayRenderer;
use crate::renderer::{html, HtmlParser, RenderSurface};
use crate::ui::{
    ControllerState, EventOutcome, InteractionContext, InteractionController, PointerEvent,
};

/// A rendered document together with its label assignments and overlay
///
/// Sessions share nothing: each owns its store, overlay state and active
/// label.
#[derive(Debug)]
pub struct TaggingSession {
    url: String,
    surface: RenderSurface,
    allow_scripts: bool,
    store: LabelAssignments,
    overlay: OverlayRenderer,
    controller: InteractionController,
    repaint_pending: bool,
}

impl TaggingSession {
    /// Start a session on a parsed document with an empty store for every palette label
    pub fn new(url: impl Into<String>, surface: RenderSurface, palette: LabelPalette) -> Self {
        let store = LabelAssignments::with_labels(palette.labels().cloned());
        let mut session = Self {
            url: url.into(),
            surface,
            allow_scripts: false,
            store,
            overlay: OverlayRenderer::new(palette),
            controller: InteractionController::new(),
            repaint_pending: false,
        };
        session.repaint();
        session
    }

    /// Start a session from serialized HTML
    pub fn from_html(
        url: impl Into<String>,
        content: &str,
        parser: &HtmlParser,
        palette: LabelPalette,
    ) -> Self {
        let mut session = Self::new(url, RenderSurface::new(parser.parse(content)), palette);
        session.allow_scripts = parser.allows_scripts();
        session
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn assignments(&self) -> &LabelAssignments {
        &self.store
    }

    pub fn overlay(&self) -> &OverlayRenderer {
        &self.overlay
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    /// Swap in a freshly fetched document
    ///
    /// Overlay state belongs to the old document and is dropped; the store
    /// is kept and repainted onto the new one.
    pub fn replace_document(&mut self, url: impl Into<String>, surface: RenderSurface) {
        self.url = url.into();
        self.surface = surface;
        self.overlay.reset();
        self.controller.reset_document();
        self.repaint();
    }

    /// Replace the whole store, e.g. with assignments loaded for this page
    pub fn load_assignments(&mut self, assignments: LabelAssignments) {
        self.store = assignments;
        self.repaint();
    }

    /// Select the label clicks assign to; `None` stops tagging
    pub fn set_active_label(&mut self, label: Option<Label>) {
        self.tick();
        let ctx = InteractionContext {
            surface: &self.surface,
            store: &mut self.store,
            overlay: &mut self.overlay,
        };
        self.controller.set_active_label(label, ctx);
    }

    /// Deliver a pointer event
    ///
    /// A pending repaint from a text edit runs first.
    pub fn dispatch(&mut self, mut event: PointerEvent) -> EventOutcome {
        self.tick();
        let ctx = InteractionContext {
            surface: &self.surface,
            store: &mut self.store,
            overlay: &mut self.overlay,
        };
        self.controller.handle(&mut event, ctx)
    }

    /// Replace a label's selector string as typed; the repaint waits for [`tick`](Self::tick)
    pub fn edit_selector_text(&mut self, label: &Label, text: &str) {
        self.store.set_selector(label, text);
        self.repaint_pending = true;
    }

    /// Run a scheduled repaint; returns whether one ran
    pub fn tick(&mut self) -> bool {
        if !std::mem::take(&mut self.repaint_pending) {
            return false;
        }
        self.repaint();
        true
    }

    /// Serialize the document with the overlay applied inline
    pub fn render_html(&self) -> String {
        html::serialize(self.surface.document(), self.allow_scripts, |id| {
            self.overlay.decoration(id)
        })
    }

    /// Hand the assignments over for extraction
    pub fn into_assignments(self) -> LabelAssignments {
        self.store
    }

    fn repaint(&mut self) {
        self.overlay.repaint(&self.surface, &self.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><body><ul><li class="item">A</li><li class="item">B</li></ul><p>tail</p></body></html>"#;

    fn session() -> TaggingSession {
        TaggingSession::from_html(
            "https://board.example",
            PAGE,
            &HtmlParser::new(),
            LabelPalette::default(),
        )
    }

    #[test]
    fn test_new_session_is_idle_with_empty_labels() {
        let session = session();
        assert_eq!(session.state(), ControllerState::Idle);
        assert_eq!(session.assignments().labels().count(), 5);
        assert_eq!(session.overlay().painted().count(), 0);
    }

    #[test]
    fn test_text_edit_repaints_on_next_tick() {
        let mut session = session();
        session.edit_selector_text(&"제목".into(), "li.item");
        assert_eq!(session.overlay().painted().count(), 0);

        assert!(session.tick());
        assert_eq!(session.overlay().painted().count(), 2);
        assert!(!session.tick());
    }

    #[test]
    fn test_later_edit_supersedes_earlier_one() {
        let mut session = session();
        session.edit_selector_text(&"제목".into(), "li.item");
        session.edit_selector_text(&"제목".into(), "p");
        session.tick();

        let p = session.surface().first("p").unwrap();
        assert_eq!(session.overlay().painted().count(), 1);
        assert!(session.overlay().state(p).is_some());
    }

    #[test]
    fn test_dispatch_flushes_pending_repaint() {
        let mut session = session();
        session.set_active_label(Some("날짜".into()));
        session.edit_selector_text(&"제목".into(), "p");

        let li = session.surface().first("li").unwrap();
        session.dispatch(PointerEvent::enter(li));
        let p = session.surface().first("p").unwrap();
        assert_eq!(session.overlay().state(p).unwrap().paint.border(), "2px solid green");
    }

    #[test]
    fn test_replace_document_drops_overlay_state() {
        let mut session = session();
        session.set_active_label(Some("제목".into()));
        let li = session.surface().first("li").unwrap();
        session.dispatch(PointerEvent::click(li));

        session.replace_document(
            "https://board.example/2",
            RenderSurface::parse(r#"<ol><li class="item">C</li></ol>"#),
        );
        assert_eq!(session.url(), "https://board.example/2");
        assert_eq!(session.overlay().painted().count(), 1);
        assert_eq!(session.assignments().selector_string(&"제목".into()), "li.item");
    }

    #[test]
    fn test_render_html_inlines_overlay() {
        let mut session = session();
        session.edit_selector_text(&"제목".into(), "p");
        session.tick();

        let html = session.render_html();
        assert!(html.contains(
            r#"<p style="border: 2px solid green; box-shadow: 0 0 0 1px rgba(0,0,0,0.1)" title="선택된 타입: 제목">tail</p>"#
        ));
        assert!(html.contains(r#"<li class="item">A</li>"#));
    }
}
