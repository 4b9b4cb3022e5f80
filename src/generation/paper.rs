//! Whole-paper generation.
//!
//! All five sections are requested concurrently. Inputs are validated up
//! front so an invalid request never sends anything to the provider; after
//! that the first failing section fails the paper and cancels the rest.

use serde::{Deserialize, Serialize};

use crate::error::GenerationResult;
use crate::generation::{
    chapters, require_text, AcknowledgementInput, Chapter, ChaptersInput, ConclusionInput, DedicationInput,
    PaperGenerator, ReferencesInput,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRequest {
    pub topic: String,
    pub number_of_chapters: u32,
    #[serde(default)]
    pub relevant_parties: String,
    #[serde(default)]
    pub key_highlights: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub topic: String,
    pub dedication: String,
    pub acknowledgement_section: String,
    pub chapters: Vec<Chapter>,
    pub conclusion: String,
    pub references: Vec<String>,
}

impl PaperGenerator {
    pub async fn generate_paper(&self, request: PaperRequest) -> GenerationResult<Paper> {
        let chapters_input = ChaptersInput {
            topic: request.topic.clone(),
            number_of_chapters: request.number_of_chapters,
        };
        require_text("topic", &request.topic)?;
        chapters::validate(&chapters_input)?;

        tracing::info!(
            topic = %request.topic,
            chapters = request.number_of_chapters,
            "Generating paper"
        );

        let (dedication, acknowledgement, chapters, conclusion, references) = tokio::try_join!(
            self.generate_dedication(DedicationInput {
                topic: request.topic.clone(),
            }),
            self.generate_acknowledgement(AcknowledgementInput {
                research_topic: request.topic.clone(),
                relevant_parties: request.relevant_parties.clone(),
            }),
            self.generate_chapters(chapters_input),
            self.generate_conclusion(ConclusionInput {
                topic: request.topic.clone(),
                key_highlights: request.key_highlights.clone(),
            }),
            self.generate_references(ReferencesInput {
                topic: request.topic.clone(),
            }),
        )?;

        Ok(Paper {
            topic: request.topic,
            dedication: dedication.dedication,
            acknowledgement_section: acknowledgement.acknowledgement_section,
            chapters: chapters.chapters,
            conclusion: conclusion.conclusion,
            references: references.references,
        })
    }
}
