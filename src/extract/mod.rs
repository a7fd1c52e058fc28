//! Field extraction with finalized selectors
//!
//! Two shapes are supported: labelled (`label -> text`, used for
//! notifications) and flat (one entry per selector, first match only).

use crate::labels::{Label, LabelAssignments};
use crate::network::PageFetcher;
use crate::renderer::{ElementId, HtmlParser, RenderSurface};
use crate::utils::{Result, SeltagError};
use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::sync::Arc;

/// Text extracted for one selector of a flat list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorContent {
    pub selector: String,
    /// Trimmed text of the first match; `None` when nothing matched
    pub content: Option<String>,
}

/// Extracted text per label, in label order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    entries: Vec<(Label, String)>,
}

impl ExtractionResult {
    pub fn new(entries: Vec<(Label, String)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, label: &Label) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &str)> {
        self.entries.iter().map(|(label, text)| (label, text.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, text)| text.is_empty())
    }

    /// One `label: text` line per label
    pub fn flatten(&self) -> String {
        self.entries
            .iter()
            .map(|(label, text)| format!("{label}: {text}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, text) in &self.entries {
            map.serialize_entry(label, text)?;
        }
        map.end()
    }
}

/// One `selector: text` line per entry
pub fn flatten_contents(contents: &[SelectorContent]) -> String {
    contents
        .iter()
        .map(|c| format!("{}: {}", c.selector, c.content.as_deref().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Labelled extraction over an already rendered document
///
/// Text of every element matched by any of a label's entries, in document
/// order and without repeats, joined with newlines. Invalid entries are
/// skipped.
pub fn extract_labelled(
    surface: &RenderSurface,
    assignments: &LabelAssignments,
) -> ExtractionResult {
    let entries = assignments
        .iter()
        .map(|(label, list)| {
            let mut matched: HashSet<ElementId> = HashSet::new();
            for selector in list.entries() {
                match surface.query(selector) {
                    Ok(ids) => matched.extend(ids),
                    Err(e) => log::warn!("Skipping selector during extraction: {e}"),
                }
            }
            let texts: Vec<String> = surface
                .element_ids()
                .into_iter()
                .filter(|id| matched.contains(id))
                .map(|id| surface.text(id))
                .collect();
            (label.clone(), texts.join("\n"))
        })
        .collect();
    ExtractionResult::new(entries)
}

/// Flat extraction: first match per selector
pub fn extract_flat(surface: &RenderSurface, selectors: &[String]) -> Vec<SelectorContent> {
    selectors
        .iter()
        .map(|selector| {
            let content = match surface.query(selector) {
                Ok(ids) => ids.first().map(|id| surface.text(*id)),
                Err(e) => {
                    log::warn!("Skipping selector during extraction: {e}");
                    None
                }
            };
            SelectorContent {
                selector: selector.clone(),
                content,
            }
        })
        .collect()
}

/// Extraction collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Fetch `url` and extract text for every label
    async fn extract(&self, url: &str, assignments: &LabelAssignments) -> Result<ExtractionResult>;

    /// Fetch `url` and extract the first match of each selector
    async fn extract_flat(&self, url: &str, selectors: &[String]) -> Result<Vec<SelectorContent>>;
}

/// Extractor that fetches the page and evaluates selectors on the parsed document
pub struct DocumentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    parser: HtmlParser,
}

impl DocumentExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, parser: HtmlParser) -> Self {
        Self { fetcher, parser }
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        Ok(self.fetcher.fetch(url).await?.into_body())
    }
}

#[async_trait]
impl Extractor for DocumentExtractor {
    async fn extract(&self, url: &str, assignments: &LabelAssignments) -> Result<ExtractionResult> {
        if assignments.all_selectors().is_empty() {
            return Err(SeltagError::Extraction("no selectors to extract".into()));
        }
        let html = self.fetch_html(url).await?;
        let surface = RenderSurface::new(self.parser.parse(&html));
        let result = extract_labelled(&surface, assignments);
        log::info!("Extracted {} label(s) from {url}", result.iter().count());
        Ok(result)
    }

    async fn extract_flat(&self, url: &str, selectors: &[String]) -> Result<Vec<SelectorContent>> {
        if selectors.is_empty() {
            return Err(SeltagError::Extraction("no selectors to extract".into()));
        }
        let html = self.fetch_html(url).await?;
        let surface = RenderSurface::new(self.parser.parse(&html));
        let contents = extract_flat(&surface, selectors);
        log::info!("Extracted {} selector(s) from {url}", contents.len());
        Ok(contents)
    }
}
