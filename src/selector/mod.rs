//! CSS selector synthesis and selector-set optimization

mod candidates;
mod list;
pub mod optimizer;
mod synthesizer;

pub use candidates::{discover_candidates, Candidate, CandidateKind};
pub use list::SelectorList;
pub use optimizer::{combine, optimize, split_selectors};
pub use synthesizer::{
    SelectorSynthesizer, SynthesisMode, REFINED_PATH_SEGMENTS, STANDARD_PATH_SEGMENTS,
};
