//! Candidate elements a user is likely to tag: headings, buttons and links

use super::{SelectorSynthesizer, SynthesisMode};
use crate::renderer::{ElementId, RenderSurface};
use serde::Serialize;

const CANDIDATE_QUERY: &str = "h1, h2, h3, button, input[type=\"submit\"], a";

/// Kind of candidate, in listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Title,
    Button,
    Link,
}

impl CandidateKind {
    fn of_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" | "h2" | "h3" => Some(Self::Title),
            "button" | "input" => Some(Self::Button),
            "a" => Some(Self::Link),
            _ => None,
        }
    }
}

/// One listed element with the selector a click on it would produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub kind: CandidateKind,
    /// Trimmed text, or the `value` of a submit input
    pub text: String,
    pub selector: String,
}

/// List titles, then buttons, then links, each group in document order
pub fn discover_candidates(
    surface: &RenderSurface,
    synthesizer: &SelectorSynthesizer,
) -> Vec<Candidate> {
    let ids = match surface.query(CANDIDATE_QUERY) {
        Ok(ids) => ids,
        Err(e) => {
            log::warn!("Candidate query failed: {e}");
            return Vec::new();
        }
    };

    let mut candidates: Vec<Candidate> = ids
        .into_iter()
        .filter_map(|id| {
            let tag = surface.tag_name(id)?;
            let kind = CandidateKind::of_tag(&tag)?;
            Some(Candidate {
                kind,
                text: candidate_text(surface, id, &tag),
                selector: synthesizer.synthesize_at(surface, id, SynthesisMode::Standard),
            })
        })
        .collect();
    candidates.sort_by_key(|candidate| candidate.kind);
    log::debug!("Found {} candidate element(s)", candidates.len());
    candidates
}

fn candidate_text(surface: &RenderSurface, id: ElementId, tag: &str) -> String {
    let value = (tag == "input")
        .then(|| surface.element(id))
        .flatten()
        .and_then(|el| el.value().attr("value").map(|v| v.trim().to_string()))
        .filter(|v| !v.is_empty());
    value.unwrap_or_else(|| surface.text(id))
}
