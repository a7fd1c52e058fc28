//! Orchestration of the collaborators around a tagging session
//!
//! The pipeline follows the user's flow:
//! 1. Fetch the page and open a [`TaggingSession`] on it
//! 2. Extract text with the finalized assignments
//! 3. Forward the result through a notification channel

mod session;

pub use session::TaggingSession;

use crate::extract::{ExtractionResult, Extractor, SelectorContent};
use crate::labels::{LabelAssignments, LabelPalette};
use crate::network::PageFetcher;
use crate::notify::{Notice, Notifier};
use crate::renderer::{failed_notice, HtmlParser, RenderSurface};
use crate::selector::{discover_candidates, Candidate, SelectorSynthesizer};
use crate::utils::{Result, SeltagError};
use std::sync::Arc;
use thiserror::Error;

/// A page that could not be opened for tagging
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AnalysisFailure {
    pub error: SeltagError,
    /// Document to show in place of the page
    pub notice: String,
}

impl From<SeltagError> for AnalysisFailure {
    fn from(error: SeltagError) -> Self {
        let notice = failed_notice(&error.to_string());
        Self { error, notice }
    }
}

/// Fetch, extraction and notification around the tagging core
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn Extractor>,
    parser: HtmlParser,
    palette: LabelPalette,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn Extractor>,
        parser: HtmlParser,
        palette: LabelPalette,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            parser,
            palette,
        }
    }

    /// Fetch `url` and open a tagging session on it
    ///
    /// No retry; the caller may simply call again.
    pub async fn analyze(
        &self,
        url: &str,
    ) -> std::result::Result<TaggingSession, AnalysisFailure> {
        let response = self.fetcher.fetch(url).await?;
        let session =
            TaggingSession::from_html(url, response.body(), &self.parser, self.palette.clone());
        log::info!("Opened tagging session for {url}");
        Ok(session)
    }

    /// Fetch `url` and list the headings, buttons and links worth tagging
    pub async fn candidates(&self, url: &str) -> Result<Vec<Candidate>> {
        let response = self.fetcher.fetch(url).await?;
        let surface = RenderSurface::new(self.parser.parse(response.body()));
        Ok(discover_candidates(&surface, &SelectorSynthesizer::new()))
    }

    /// Extract text for every label
    pub async fn extract(
        &self,
        url: &str,
        assignments: &LabelAssignments,
    ) -> Result<ExtractionResult> {
        self.extractor.extract(url, assignments).await
    }

    /// Extract the first match of each selector
    pub async fn extract_flat(
        &self,
        url: &str,
        selectors: &[String],
    ) -> Result<Vec<SelectorContent>> {
        self.extractor.extract_flat(url, selectors).await
    }

    /// Deliver an extraction result
    pub async fn notify(
        &self,
        notifier: &dyn Notifier,
        url: &str,
        destination: Option<&str>,
        result: &ExtractionResult,
    ) -> Result<()> {
        let mut notice = Notice::from_result(url, result);
        if let Some(destination) = destination {
            notice = notice.with_destination(destination);
        }
        log::debug!("Sending notice for {url} via {}", notifier.name());
        notifier.send(&notice).await?;
        Ok(())
    }
}
