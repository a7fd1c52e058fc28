//! Rendering surface: the parsed document plus stable element identity

use crate::utils::error::RenderError;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

/// Stable identity of an element within one rendered document
///
/// Identities are only meaningful for the document that produced them and
/// must be discarded when the document is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(NodeId);

impl ElementId {
    /// Identity of a parsed element
    pub fn of(element: &ElementRef<'_>) -> Self {
        Self(element.id())
    }
}

/// The sandboxed document the overlay paints onto
#[derive(Debug, Clone)]
pub struct RenderSurface {
    document: Html,
}

impl RenderSurface {
    /// Wrap an already parsed document
    pub fn new(document: Html) -> Self {
        Self { document }
    }

    /// Parse a serialized HTML document with the default (script-free) parser
    pub fn parse(content: &str) -> Self {
        Self::new(super::HtmlParser::new().parse(content))
    }

    /// The underlying document
    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Resolve an identity back to its element
    pub fn element(&self, id: ElementId) -> Option<ElementRef<'_>> {
        self.document.tree.get(id.0).and_then(ElementRef::wrap)
    }

    /// All elements in document order
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document.tree.root().descendants().filter_map(ElementRef::wrap)
    }

    /// All element identities in document order
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.elements().map(|el| ElementId::of(&el)).collect()
    }

    /// Query the document, reporting syntax errors to the caller
    pub fn query(&self, selector: &str) -> Result<Vec<ElementId>, RenderError> {
        let parsed = Selector::parse(selector).map_err(|e| RenderError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self
            .document
            .select(&parsed)
            .map(|el| ElementId::of(&el))
            .collect())
    }

    /// First element matching `selector`; invalid selectors match nothing
    pub fn first(&self, selector: &str) -> Option<ElementId> {
        self.query(selector).ok()?.into_iter().next()
    }

    /// The element's parent element (`None` for the root element)
    pub fn parent_element(&self, id: ElementId) -> Option<ElementId> {
        let element = self.element(id)?;
        let parent = ElementRef::wrap(element.parent()?)?;
        Some(ElementId::of(&parent))
    }

    /// Whether `ancestor` is `node` or contains it
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_element(id);
        }
        false
    }

    /// Lower-cased tag name
    pub fn tag_name(&self, id: ElementId) -> Option<String> {
        self.element(id).map(|el| el.value().name().to_ascii_lowercase())
    }

    /// Trimmed text content
    pub fn text(&self, id: ElementId) -> String {
        self.element(id)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }
}
