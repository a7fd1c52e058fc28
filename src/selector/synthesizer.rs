//! Selector synthesis for a clicked or hovered element
//!
//! Priority: `#id`, then `tag.class1.class2`, then a structural path of
//! `tag[:nth-child(k)]` segments joined with ` > `. The result is
//! deterministic for a fixed DOM shape but not guaranteed unique: the class
//! and path branches may also match structurally identical siblings.

use crate::renderer::{ElementId, RenderSurface};
use scraper::ElementRef;

/// Maximum path segments (target plus ancestors) in standard mode
pub const STANDARD_PATH_SEGMENTS: usize = 6;
/// Maximum path segments in refined mode
pub const REFINED_PATH_SEGMENTS: usize = 8;

/// How specific the synthesized selector should be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthesisMode {
    /// Shortest stable selector
    #[default]
    Standard,
    /// Deeper variant: sibling suffixes on class selectors, ancestor classes in paths
    Refined,
}

/// Computes CSS selectors for elements
#[derive(Debug, Clone)]
pub struct SelectorSynthesizer {
    standard_segments: usize,
    refined_segments: usize,
}

impl SelectorSynthesizer {
    /// Create a synthesizer with the default path caps
    pub fn new() -> Self {
        Self {
            standard_segments: STANDARD_PATH_SEGMENTS,
            refined_segments: REFINED_PATH_SEGMENTS,
        }
    }

    /// Synthesize for an element identity; unknown identities yield `""`
    pub fn synthesize_at(
        &self,
        surface: &RenderSurface,
        id: ElementId,
        mode: SynthesisMode,
    ) -> String {
        match surface.element(id) {
            Some(element) => self.synthesize(element, mode),
            None => {
                log::warn!("Selector synthesis requested for a detached element");
                String::new()
            }
        }
    }

    /// Synthesize a selector for `element`
    ///
    /// Returns `""` only for an element without a tag name; callers treat that
    /// as "ignore this event".
    pub fn synthesize(&self, element: ElementRef<'_>, mode: SynthesisMode) -> String {
        let tag = element.value().name().to_ascii_lowercase();
        if tag.is_empty() {
            return String::new();
        }

        if let Some(id) = element.value().id().filter(|id| !id.is_empty()) {
            return format!("#{id}");
        }

        let classes: Vec<&str> = element.value().classes().collect();
        if !classes.is_empty() {
            let mut selector = format!("{tag}.{}", classes.join("."));
            if mode == SynthesisMode::Refined {
                if let Some(index) = sibling_index(&element) {
                    selector.push_str(&format!(":nth-child({index})"));
                }
            }
            return selector;
        }

        let limit = match mode {
            SynthesisMode::Standard => self.standard_segments,
            SynthesisMode::Refined => self.refined_segments,
        };
        let path = self.path(element, mode, limit);
        if path.is_empty() { tag } else { path }
    }

    fn path(&self, element: ElementRef<'_>, mode: SynthesisMode, limit: usize) -> String {
        let mut segments = Vec::new();
        let mut current = element;

        // Only elements with a parent element take part, so `html` never does.
        while let Some(parent) = current.parent().and_then(ElementRef::wrap) {
            let mut segment = current.value().name().to_ascii_lowercase();
            if mode == SynthesisMode::Refined {
                if let Some(first) = current.value().classes().next() {
                    segment.push('.');
                    segment.push_str(first);
                }
            }
            if let Some(index) = sibling_index(&current) {
                segment.push_str(&format!(":nth-child({index})"));
            }
            segments.push(segment);

            if segments.len() >= limit {
                break;
            }
            current = parent;
        }

        segments.reverse();
        segments.join(" > ")
    }
}

impl Default for SelectorSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// 1-based position among all element siblings, when 2+ siblings share the tag
fn sibling_index(element: &ElementRef<'_>) -> Option<usize> {
    let parent = element.parent()?;
    let name = element.value().name();
    let siblings: Vec<ElementRef<'_>> = parent.children().filter_map(ElementRef::wrap).collect();

    let same_tag = siblings.iter().filter(|s| s.value().name() == name).count();
    if same_tag < 2 {
        return None;
    }
    siblings
        .iter()
        .position(|s| s.id() == element.id())
        .map(|pos| pos + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn synth(html: &str, target: &str, mode: SynthesisMode) -> String {
        let surface = RenderSurface::parse(html);
        let id = surface.first(target).expect("target element");
        SelectorSynthesizer::new().synthesize_at(&surface, id, mode)
    }

    #[test]
    fn test_id_takes_priority_over_classes() {
        let html = r#"<div id="main" class="container wide">x</div>"#;
        assert_eq!(synth(html, "div", SynthesisMode::Standard), "#main");
        assert_eq!(synth(html, "div", SynthesisMode::Refined), "#main");
    }

    #[test]
    fn test_class_qualified_tag() {
        let html = r#"<ul><li class="item">A</li><li class="item">B</li></ul>"#;
        assert_eq!(synth(html, "li", SynthesisMode::Standard), "li.item");
    }

    #[test]
    fn test_all_classes_are_kept() {
        let html = r#"<span class="a  b c">x</span>"#;
        assert_eq!(synth(html, "span", SynthesisMode::Standard), "span.a.b.c");
    }

    #[test]
    fn test_refined_class_selector_gets_sibling_suffix() {
        let html = r#"<ul><li class="item">A</li><li class="item">B</li></ul>"#;
        assert_eq!(synth(html, "li:nth-child(2)", SynthesisMode::Refined), "li.item:nth-child(2)");
    }

    #[test]
    fn test_refined_class_selector_without_same_tag_siblings() {
        let html = r#"<div><h2 class="t">A</h2><p>B</p></div>"#;
        assert_eq!(synth(html, "h2", SynthesisMode::Refined), "h2.t");
    }

    #[test]
    fn test_structural_path_with_sibling_disambiguation() {
        let html = "<html><body><div><p>a</p><p>b</p></div></body></html>";
        assert_eq!(
            synth(html, "p:nth-child(2)", SynthesisMode::Standard),
            "body > div > p:nth-child(2)"
        );
    }

    #[test]
    fn test_nth_child_counts_all_element_siblings() {
        let html = "<div><span>s</span><p>a</p><p>b</p></div>";
        assert_eq!(
            synth(html, "div > p:nth-child(3)", SynthesisMode::Standard),
            "body > div > p:nth-child(3)"
        );
    }

    #[test]
    fn test_standard_path_is_capped() {
        let html = "<div><div><div><div><div><div><div><b>deep</b></div></div></div></div></div></div></div>";
        let selector = synth(html, "b", SynthesisMode::Standard);
        assert_eq!(selector.split(" > ").count(), STANDARD_PATH_SEGMENTS);
        assert!(selector.ends_with("b"));
    }

    #[test]
    fn test_refined_path_folds_ancestor_classes() {
        let html = r#"<div class="board list"><table><tr><td>1</td><td>2</td></tr></table></div>"#;
        let selector = synth(html, "td:nth-child(2)", SynthesisMode::Refined);
        assert_eq!(
            selector,
            "body > div.board > table > tbody > tr > td:nth-child(2)"
        );
    }

    #[test]
    fn test_refined_path_is_capped_deeper() {
        let html = "<div><div><div><div><div><div><div><div><div><b>deep</b></div></div></div></div></div></div></div></div></div>";
        let selector = synth(html, "b", SynthesisMode::Refined);
        assert_eq!(selector.split(" > ").count(), REFINED_PATH_SEGMENTS);
    }

    #[test]
    fn test_deterministic() {
        let html = "<div><p>a</p><p>b</p></div>";
        let first = synth(html, "p:nth-child(1)", SynthesisMode::Standard);
        let second = synth(html, "p:nth-child(1)", SynthesisMode::Standard);
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn test_synthesis_never_empty(depth in 0usize..12, siblings in 1usize..4, class in proptest::option::of("[a-z]{1,6}")) {
            let mut html = String::new();
            for _ in 0..depth {
                html.push_str("<div>");
            }
            for _ in 0..siblings {
                match &class {
                    Some(c) => html.push_str(&format!("<em class=\"{c}\">x</em>")),
                    None => html.push_str("<em>x</em>"),
                }
            }
            for _ in 0..depth {
                html.push_str("</div>");
            }
            let surface = RenderSurface::parse(&html);
            let synthesizer = SelectorSynthesizer::new();
            for id in surface.query("em").unwrap() {
                for mode in [SynthesisMode::Standard, SynthesisMode::Refined] {
                    let selector = synthesizer.synthesize_at(&surface, id, mode);
                    prop_assert!(!selector.is_empty());
                    // Every synthesized selector must at least match its own element.
                    prop_assert!(surface.query(&selector).unwrap().contains(&id));
                }
            }
        }
    }
}
