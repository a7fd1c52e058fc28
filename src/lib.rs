//! # Seltag - Interactive CSS Selector Tagging
//!
//! Point at a page, tag recurring fields by clicking them, extract those
//! fields with the resulting selectors and forward them by e-mail or chat.
//!
//! ## Architecture
//!
//! The tagging core, leaves first:
//!
//! - **selector**: selector synthesis for an element and compaction of selector sets
//! - **labels**: labels, their palette and the label assignment store
//! - **overlay**: nested label borders kept in a per-element side table
//! - **ui**: pointer events and the interaction controller
//! - **renderer**: the sandboxed rendering surface (parsing, identity, serialization)
//!
//! Around it:
//!
//! - **engine**: tagging sessions and the fetch/extract/notify pipeline
//! - **network**: page fetching
//! - **extract**: field extraction with finalized selectors
//! - **notify**: Kakao and e-mail delivery
//! - **config**: TOML configuration
//! - **utils**: shared error types

pub mod config;
pub mod engine;
pub mod extract;
pub mod labels;
pub mod network;
pub mod notify;
pub mod overlay;
pub mod renderer;
pub mod selector;
pub mod ui;
pub mod utils;

// Re-export main types for convenience
pub use engine::{Pipeline, TaggingSession};
pub use labels::{Label, LabelAssignments, LabelPalette};
pub use utils::error::{Result, SeltagError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "Seltag";
