//! Interaction controller: turns pointer events into label assignments

use super::events::{EventDispatcher, EventType, ListenerId, PointerEvent};
use crate::labels::{Label, LabelAssignments};
use crate::overlay::OverlayRenderer;
use crate::renderer::{ElementId, RenderSurface};
use crate::selector::{SelectorSynthesizer, SynthesisMode};

/// Tagging state of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// No active label; pointer events are inert
    Idle,
    /// Clicks toggle membership in the label
    Tagging(Label),
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Previewed,
    PreviewEnded,
    Added(String),
    Removed(String),
    Refined { from: String, to: String },
    /// Refinement produced the same selector
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    Click,
    Hover,
    Leave,
}

/// Borrowed view of everything an event handler may touch
pub struct InteractionContext<'a> {
    pub surface: &'a RenderSurface,
    pub store: &'a mut LabelAssignments,
    pub overlay: &'a mut OverlayRenderer,
}

/// Owns the active label and the listener bindings of one surface
#[derive(Debug)]
pub struct InteractionController {
    synthesizer: SelectorSynthesizer,
    active: Option<Label>,
    dispatcher: EventDispatcher<Handler>,
    bindings: Vec<ListenerId>,
    /// Element under the pointer and the selector computed for it
    hovered: Option<(ElementId, String)>,
}

impl InteractionController {
    /// Create an idle controller with its listeners attached
    pub fn new() -> Self {
        let mut controller = Self {
            synthesizer: SelectorSynthesizer::new(),
            active: None,
            dispatcher: EventDispatcher::new(),
            bindings: Vec::new(),
            hovered: None,
        };
        controller.rebind();
        controller
    }

    pub fn state(&self) -> ControllerState {
        match &self.active {
            Some(label) => ControllerState::Tagging(label.clone()),
            None => ControllerState::Idle,
        }
    }

    pub fn active_label(&self) -> Option<&Label> {
        self.active.as_ref()
    }

    /// Selector computed during the most recent hover
    pub fn hovered_selector(&self) -> Option<&str> {
        self.hovered.as_ref().map(|(_, selector)| selector.as_str())
    }

    /// Number of listeners attached for an event type
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.dispatcher.listener_count(event_type)
    }

    /// Switch the active label (`None` returns to idle)
    ///
    /// Switching between labels detaches and reattaches every listener,
    /// drops hover previews and repaints from the store. Deselecting keeps
    /// the listeners, which then ignore events.
    pub fn set_active_label(&mut self, label: Option<Label>, ctx: InteractionContext<'_>) {
        if self.active == label {
            return;
        }
        let previous = std::mem::replace(&mut self.active, label);
        log::debug!(
            "Active label {} -> {}",
            previous.as_ref().map_or("none", Label::name),
            self.active.as_ref().map_or("none", Label::name)
        );

        self.hovered = None;
        ctx.overlay.restore_snapshots();
        if self.active.is_some() {
            self.rebind();
            ctx.overlay.repaint(ctx.surface, ctx.store);
        }
    }

    /// Detach every listener, then attach a fresh set
    pub fn rebind(&mut self) {
        for id in self.bindings.drain(..) {
            self.dispatcher.unsubscribe(id);
        }
        self.bindings = vec![
            self.dispatcher.subscribe(EventType::Click, Handler::Click),
            self.dispatcher.subscribe(EventType::MouseOver, Handler::Hover),
            self.dispatcher.subscribe(EventType::MouseOut, Handler::Leave),
        ];
        log::debug!("Rebound {} listener(s)", self.bindings.len());
    }

    /// Forget per-document state; called when the document is replaced
    pub fn reset_document(&mut self) {
        self.hovered = None;
    }

    /// Dispatch one pointer event to the attached listeners
    pub fn handle(
        &mut self,
        event: &mut PointerEvent,
        mut ctx: InteractionContext<'_>,
    ) -> EventOutcome {
        let handlers: Vec<Handler> =
            self.dispatcher.listeners(event.event_type).copied().collect();
        let mut outcome = EventOutcome::Ignored;
        for handler in handlers {
            outcome = match handler {
                Handler::Click => self.on_click(event, &mut ctx),
                Handler::Hover => self.on_hover(event, &mut ctx),
                Handler::Leave => self.on_leave(event, &mut ctx),
            };
        }
        outcome
    }

    fn on_click(
        &mut self,
        event: &mut PointerEvent,
        ctx: &mut InteractionContext<'_>,
    ) -> EventOutcome {
        let Some(label) = self.active.clone() else {
            log::debug!("Click ignored: no active label");
            return EventOutcome::Ignored;
        };
        event.prevent_default();

        let selector = self.resolve_selector(ctx.surface, event.target);
        if selector.is_empty() {
            log::warn!("Click ignored: no selector for target");
            return EventOutcome::Ignored;
        }

        let is_member = ctx
            .store
            .selectors(&label)
            .is_some_and(|list| list.contains(&selector));

        if !is_member {
            ctx.store.add(&label, &selector);
            ctx.overlay.repaint(ctx.surface, ctx.store);
            log::debug!("Added `{selector}` to {label}");
            return EventOutcome::Added(selector);
        }

        if event.wants_refinement() {
            let refined = self
                .synthesizer
                .synthesize_at(ctx.surface, event.target, SynthesisMode::Refined);
            if refined.is_empty()
                || refined == selector
                || !ctx.store.replace(&label, &selector, &refined)
            {
                return EventOutcome::Unchanged;
            }
            self.hovered = Some((event.target, refined.clone()));
            ctx.overlay.repaint(ctx.surface, ctx.store);
            log::debug!("Refined `{selector}` to `{refined}` in {label}");
            return EventOutcome::Refined {
                from: selector,
                to: refined,
            };
        }

        ctx.store.remove(&label, &selector);
        ctx.overlay.repaint(ctx.surface, ctx.store);
        log::debug!("Removed `{selector}` from {label}");
        EventOutcome::Removed(selector)
    }

    fn on_hover(
        &mut self,
        event: &PointerEvent,
        ctx: &mut InteractionContext<'_>,
    ) -> EventOutcome {
        let Some(label) = self.active.clone() else {
            return EventOutcome::Ignored;
        };

        let selector = self
            .synthesizer
            .synthesize_at(ctx.surface, event.target, SynthesisMode::Standard);
        if selector.is_empty() {
            return EventOutcome::Ignored;
        }
        let tagged = ctx.store.is_tagged(&selector)
            || !ctx.overlay.membership(ctx.surface, ctx.store, event.target).is_empty();
        self.hovered = Some((event.target, selector));
        if tagged {
            return EventOutcome::Ignored;
        }
        ctx.overlay.preview(event.target, &label);
        EventOutcome::Previewed
    }

    fn on_leave(
        &mut self,
        event: &PointerEvent,
        ctx: &mut InteractionContext<'_>,
    ) -> EventOutcome {
        if self.active.is_none() {
            return EventOutcome::Ignored;
        }
        self.hovered = None;
        let tagged = !ctx.overlay.membership(ctx.surface, ctx.store, event.target).is_empty();
        ctx.overlay.end_preview(ctx.surface, ctx.store, event.target, tagged);
        EventOutcome::PreviewEnded
    }

    /// Prefer the hover selector when the click and the current hover are
    /// on the same branch of the tree
    fn resolve_selector(&self, surface: &RenderSurface, target: ElementId) -> String {
        match &self.hovered {
            Some((hovered, selector))
                if surface.contains(*hovered, target) || surface.contains(target, *hovered) =>
            {
                selector.clone()
            }
            _ => self
                .synthesizer
                .synthesize_at(surface, target, SynthesisMode::Standard),
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::events::Modifiers;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"
        <html><body>
            <ul>
                <li class="item">A</li>
                <li class="item">B</li>
            </ul>
            <div><span>x</span><span>y</span><span>z</span></div>
            <p id="note">note</p>
        </body></html>
    "#;

    struct Fixture {
        surface: RenderSurface,
        store: LabelAssignments,
        overlay: OverlayRenderer,
        controller: InteractionController,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                surface: RenderSurface::parse(PAGE),
                store: LabelAssignments::with_labels([
                    "번호", "제목", "날짜", "조회수", "링크",
                ]),
                overlay: OverlayRenderer::default(),
                controller: InteractionController::new(),
            }
        }

        fn activate(&mut self, label: Option<&str>) {
            let ctx = InteractionContext {
                surface: &self.surface,
                store: &mut self.store,
                overlay: &mut self.overlay,
            };
            self.controller.set_active_label(label.map(Label::from), ctx);
        }

        fn send(&mut self, mut event: PointerEvent) -> EventOutcome {
            let ctx = InteractionContext {
                surface: &self.surface,
                store: &mut self.store,
                overlay: &mut self.overlay,
            };
            self.controller.handle(&mut event, ctx)
        }

        fn id(&self, selector: &str) -> ElementId {
            self.surface.first(selector).unwrap()
        }
    }

    #[test]
    fn test_idle_controller_ignores_events() {
        let mut fx = Fixture::new();
        let li = fx.id("li");
        assert_eq!(fx.controller.state(), ControllerState::Idle);
        assert_eq!(fx.send(PointerEvent::enter(li)), EventOutcome::Ignored);
        assert_eq!(fx.send(PointerEvent::click(li)), EventOutcome::Ignored);
        assert_eq!(fx.store.all_selectors(), Vec::<String>::new());
        assert!(fx.overlay.state(li).is_none());
    }

    #[test]
    fn test_click_toggles_membership() {
        let mut fx = Fixture::new();
        fx.activate(Some("제목"));
        let li = fx.id("li");

        assert_eq!(fx.send(PointerEvent::click(li)), EventOutcome::Added("li.item".into()));
        for id in fx.surface.query("li.item").unwrap() {
            assert_eq!(fx.overlay.state(id).unwrap().paint.border(), "2px solid green");
        }

        assert_eq!(fx.send(PointerEvent::click(li)), EventOutcome::Removed("li.item".into()));
        assert!(fx.overlay.state(li).is_none());
    }

    #[test]
    fn test_click_leaves_other_labels_alone() {
        let mut fx = Fixture::new();
        let note = fx.id("#note");
        fx.activate(Some("제목"));
        fx.send(PointerEvent::click(note));
        fx.activate(Some("링크"));
        fx.send(PointerEvent::click(note));
        assert_eq!(
            fx.store.members_of("#note"),
            vec![Label::from("제목"), Label::from("링크")]
        );

        fx.send(PointerEvent::click(note));
        assert_eq!(fx.store.members_of("#note"), vec![Label::from("제목")]);
        assert_eq!(fx.overlay.state(note).unwrap().paint.border(), "2px solid green");
    }

    #[test]
    fn test_double_click_refines_member() {
        let mut fx = Fixture::new();
        fx.activate(Some("제목"));
        let li = fx.id("li");

        fx.send(PointerEvent::click(li));
        let outcome = fx.send(PointerEvent::double_click(li));
        assert_eq!(
            outcome,
            EventOutcome::Refined {
                from: "li.item".into(),
                to: "li.item:nth-child(1)".into()
            }
        );
        assert_eq!(fx.store.selector_string(&"제목".into()), "li.item:nth-child(1)");
        assert_eq!(fx.controller.hovered_selector(), Some("li.item:nth-child(1)"));
    }

    #[test]
    fn test_modifier_click_on_id_is_unchanged() {
        let mut fx = Fixture::new();
        fx.activate(Some("번호"));
        let note = fx.id("#note");
        fx.send(PointerEvent::click(note));

        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        assert_eq!(fx.send(PointerEvent::click_with(note, ctrl)), EventOutcome::Unchanged);
        assert_eq!(fx.store.selector_string(&"번호".into()), "#note");
    }

    #[test]
    fn test_sibling_clicks_fold_into_range() {
        let mut fx = Fixture::new();
        fx.activate(Some("날짜"));
        for span in fx.surface.query("span").unwrap() {
            fx.send(PointerEvent::click(span));
        }
        assert_eq!(
            fx.store.selector_string(&"날짜".into()),
            "body > div > span:nth-child(n+1):nth-child(-n+3)"
        );
        assert_eq!(fx.overlay.painted().count(), 3);
    }

    #[test]
    fn test_click_reuses_hover_selector_for_subtree() {
        let mut fx = Fixture::new();
        fx.activate(Some("제목"));
        let ul = fx.id("ul");
        let li = fx.id("li");

        fx.send(PointerEvent::enter(ul));
        let hovered = fx.controller.hovered_selector().unwrap().to_string();
        assert_eq!(fx.send(PointerEvent::click(li)), EventOutcome::Added(hovered));
    }

    #[test]
    fn test_click_reuses_hover_selector_of_descendant() {
        let mut fx = Fixture::new();
        fx.activate(Some("제목"));
        let ul = fx.id("ul");
        let li = fx.id("li");

        fx.send(PointerEvent::enter(li));
        assert_eq!(fx.send(PointerEvent::click(ul)), EventOutcome::Added("li.item".into()));
    }

    #[test]
    fn test_leave_forgets_hover_selector() {
        let mut fx = Fixture::new();
        fx.activate(Some("제목"));
        let ul = fx.id("ul");
        let li = fx.id("li");

        fx.send(PointerEvent::enter(ul));
        fx.send(PointerEvent::leave(ul));
        assert_eq!(fx.controller.hovered_selector(), None);
        assert_eq!(fx.send(PointerEvent::click(li)), EventOutcome::Added("li.item".into()));
        assert_eq!(fx.store.selector_string(&"제목".into()), "li.item");
    }

    #[test]
    fn test_hover_over_tagged_selector_keeps_paint() {
        let mut fx = Fixture::new();
        fx.activate(Some("제목"));
        let li = fx.id("li");
        fx.send(PointerEvent::click(li));

        fx.activate(Some("날짜"));
        assert_eq!(fx.send(PointerEvent::enter(li)), EventOutcome::Ignored);
        assert_eq!(fx.overlay.state(li).unwrap().paint.border(), "2px solid green");
    }

    #[test]
    fn test_hover_preview_and_leave() {
        let mut fx = Fixture::new();
        fx.activate(Some("조회수"));
        let note = fx.id("#note");

        assert_eq!(fx.send(PointerEvent::enter(note)), EventOutcome::Previewed);
        assert_eq!(fx.overlay.state(note).unwrap().paint.border(), "2px solid orange");

        fx.send(PointerEvent::leave(note));
        assert!(fx.overlay.state(note).is_none());
    }

    #[test]
    fn test_commit_during_hover_survives_leave() {
        let mut fx = Fixture::new();
        fx.activate(Some("조회수"));
        let note = fx.id("#note");

        fx.send(PointerEvent::enter(note));
        fx.send(PointerEvent::click(note));
        fx.send(PointerEvent::leave(note));

        let state = fx.overlay.state(note).unwrap();
        assert_eq!(state.paint.border(), "2px solid orange");
        assert_eq!(state.title, "선택된 타입: 조회수");
    }

    #[test]
    fn test_switching_label_leaves_no_preview_artifacts() {
        let mut fx = Fixture::new();
        fx.activate(Some("제목"));
        let li = fx.id("li");
        let span = fx.id("span");

        fx.send(PointerEvent::enter(li));
        fx.send(PointerEvent::click(li));
        fx.send(PointerEvent::enter(span));
        assert!(fx.overlay.state(span).unwrap().saved.is_some());

        fx.activate(Some("날짜"));
        assert!(fx.overlay.state(span).is_none());
        assert_eq!(fx.overlay.decoration(span), None);
        assert_eq!(fx.overlay.state(li).unwrap().paint.border(), "2px solid green");
        assert!(fx.overlay.painted().all(|(_, state)| state.saved.is_none()));
    }

    #[test]
    fn test_rebinding_never_duplicates_listeners() {
        let mut fx = Fixture::new();
        for label in ["제목", "날짜", "링크", "제목"] {
            fx.activate(Some(label));
        }
        fx.activate(None);
        for event_type in [EventType::Click, EventType::MouseOver, EventType::MouseOut] {
            assert_eq!(fx.controller.listener_count(event_type), 1);
        }
        assert_eq!(fx.controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_click_prevents_default_only_while_tagging() {
        let mut fx = Fixture::new();
        let li = fx.id("li");
        let mut event = PointerEvent::click(li);
        fx.controller.handle(
            &mut event,
            InteractionContext {
                surface: &fx.surface,
                store: &mut fx.store,
                overlay: &mut fx.overlay,
            },
        );
        assert!(!event.default_prevented);

        fx.activate(Some("제목"));
        let mut event = PointerEvent::click(li);
        fx.controller.handle(
            &mut event,
            InteractionContext {
                surface: &fx.surface,
                store: &mut fx.store,
                overlay: &mut fx.overlay,
            },
        );
        assert!(event.default_prevented);
    }
}
