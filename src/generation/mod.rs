//! Paper content generation.
//!
//! # Data Flow
//! ```text
//! PaperGenerator::generate_*(input)
//!     → validate input (never reaches the provider when invalid)
//!     → Flow::run → Prompt::call → RetryOrchestrator → provider
//!
//! PaperGenerator::generate_paper(request)
//!     → validate every section's input
//!     → run the five flows concurrently (first failure wins)
//! ```

pub mod acknowledgement;
pub mod chapters;
pub mod conclusion;
pub mod dedication;
pub mod paper;
pub mod references;

use std::sync::Arc;

use crate::credentials::KeyStore;
use crate::error::{GenerationError, GenerationResult};
use crate::provider::{Flow, ModelClient, SafetySetting};

pub use acknowledgement::{AcknowledgementInput, AcknowledgementOutput};
pub use chapters::{Chapter, ChaptersInput, ChaptersOutput};
pub use conclusion::{ConclusionInput, ConclusionOutput};
pub use dedication::{DedicationInput, DedicationOutput};
pub use paper::{Paper, PaperRequest};
pub use references::{ReferencesInput, ReferencesOutput};

/// The five generation operations, defined once against a model client.
#[derive(Debug, Clone)]
pub struct PaperGenerator {
    client: ModelClient,
    dedication: Flow<DedicationInput, DedicationOutput>,
    acknowledgement: Flow<AcknowledgementInput, AcknowledgementOutput>,
    chapters: Flow<ChaptersInput, ChaptersOutput>,
    conclusion: Flow<ConclusionInput, ConclusionOutput>,
    references: Flow<ReferencesInput, ReferencesOutput>,
}

impl PaperGenerator {
    pub fn new(client: ModelClient) -> Self {
        Self {
            dedication: dedication::define(&client),
            acknowledgement: acknowledgement::define(&client),
            chapters: chapters::define(&client),
            conclusion: conclusion::define(&client),
            references: references::define(&client),
            client,
        }
    }

    /// Credential store behind this generator.
    pub fn store(&self) -> &Arc<KeyStore> {
        self.client.orchestrator().store()
    }

    pub async fn generate_dedication(&self, input: DedicationInput) -> GenerationResult<DedicationOutput> {
        self.dedication.run(input).await
    }

    pub async fn generate_acknowledgement(
        &self,
        input: AcknowledgementInput,
    ) -> GenerationResult<AcknowledgementOutput> {
        self.acknowledgement.run(input).await
    }

    pub async fn generate_chapters(&self, input: ChaptersInput) -> GenerationResult<ChaptersOutput> {
        self.chapters.run(input).await
    }

    pub async fn generate_conclusion(&self, input: ConclusionInput) -> GenerationResult<ConclusionOutput> {
        self.conclusion.run(input).await
    }

    pub async fn generate_references(&self, input: ReferencesInput) -> GenerationResult<ReferencesOutput> {
        self.references.run(input).await
    }
}

/// Reject blank required text fields.
pub(crate) fn require_text(field: &str, value: &str) -> GenerationResult<()> {
    if value.trim().is_empty() {
        Err(GenerationError::InvalidInput(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

/// Safety settings that leave academic content unfiltered.
pub(crate) fn permissive_safety() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_DANGEROUS_CONTENT",
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    ]
    .into_iter()
    .map(|category| SafetySetting::new(category, "BLOCK_NONE"))
    .collect()
}
