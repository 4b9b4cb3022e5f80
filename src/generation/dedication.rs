//! Dedication page.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::generation::require_text;
use crate::provider::{Flow, FlowDefinition, ModelClient, PromptDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedicationInput {
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedicationOutput {
    /// Plain text, no markup.
    pub dedication: String,
}

const TEMPLATE: &str = "Write a sincere, fitting dedication for an academic paper on the topic of \
{{{topic}}}. Keep it to at most four sentences and return plain text without any HTML.";

pub(crate) fn define(client: &ModelClient) -> Flow<DedicationInput, DedicationOutput> {
    let prompt = client.define_prompt::<DedicationInput, DedicationOutput>(PromptDefinition::new(
        "dedicationPrompt",
        TEMPLATE,
        json!({
            "type": "OBJECT",
            "properties": {
                "dedication": { "type": "STRING", "description": "The dedication as plain text." }
            },
            "required": ["dedication"]
        }),
    ));

    client.define_flow(FlowDefinition::new("generateDedicationFlow"), move |input: DedicationInput| {
        let prompt = prompt.clone();
        async move {
            require_text("topic", &input.topic)?;
            prompt.call(&input).await
        }
    })
}
