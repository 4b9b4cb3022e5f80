//! Acknowledgement section.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::generation::require_text;
use crate::provider::{Flow, FlowDefinition, ModelClient, PromptDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgementInput {
    pub research_topic: String,
    /// Comma-separated people and institutions to thank. May be empty.
    #[serde(default)]
    pub relevant_parties: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgementOutput {
    pub acknowledgement_section: String,
}

const TEMPLATE: &str = "Write a professional, complete acknowledgement section for an academic paper.

Research topic: {{{researchTopic}}}
Parties and institutions to acknowledge: {{{relevantParties}}}

Express gratitude clearly and recognise the contribution of each party named above.";

pub(crate) fn define(client: &ModelClient) -> Flow<AcknowledgementInput, AcknowledgementOutput> {
    let prompt = client.define_prompt::<AcknowledgementInput, AcknowledgementOutput>(PromptDefinition::new(
        "generateAcknowledgementPrompt",
        TEMPLATE,
        json!({
            "type": "OBJECT",
            "properties": {
                "acknowledgementSection": { "type": "STRING" }
            },
            "required": ["acknowledgementSection"]
        }),
    ));

    client.define_flow(
        FlowDefinition::new("generateAcknowledgementFlow"),
        move |input: AcknowledgementInput| {
            let prompt = prompt.clone();
            async move {
                require_text("researchTopic", &input.research_topic)?;
                prompt.call(&input).await
            }
        },
    )
}
