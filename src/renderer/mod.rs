//! Rendering surface for Seltag
//!
//! Parses fetched HTML into a sandboxed document that the overlay paints on
//! and the interaction controller reads selectors from.

mod dom;
pub mod html;

pub use dom::{ElementId, RenderSurface};
pub use html::{failed_notice, Decoration, HtmlParser};
