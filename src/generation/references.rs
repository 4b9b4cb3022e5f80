//! Reference list.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::generation::require_text;
use crate::provider::{Flow, FlowDefinition, ModelClient, PromptDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencesInput {
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencesOutput {
    /// Formatted citation strings, in the order the model returned them.
    pub references: Vec<String>,
}

const TEMPLATE: &str = "You are an expert academic researcher. Generate a list of 5-7 relevant \
academic references for a paper on the following topic.

Topic: {{{topic}}}

Format every reference in one consistent, standard citation style (such as APA or MLA), each as a \
single string.";

pub(crate) fn define(client: &ModelClient) -> Flow<ReferencesInput, ReferencesOutput> {
    let prompt = client.define_prompt::<ReferencesInput, ReferencesOutput>(PromptDefinition::new(
        "generateReferencesPrompt",
        TEMPLATE,
        json!({
            "type": "OBJECT",
            "properties": {
                "references": {
                    "type": "ARRAY",
                    "description": "Five to seven academic references in a standard citation format.",
                    "items": { "type": "STRING" }
                }
            },
            "required": ["references"]
        }),
    ));

    client.define_flow(FlowDefinition::new("generateReferencesFlow"), move |input: ReferencesInput| {
        let prompt = prompt.clone();
        async move {
            require_text("topic", &input.topic)?;
            prompt.call(&input).await
        }
    })
}
