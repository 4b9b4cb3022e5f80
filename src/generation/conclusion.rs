//! Concluding section.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::generation::require_text;
use crate::provider::{Flow, FlowDefinition, ModelClient, PromptDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConclusionInput {
    pub topic: String,
    /// Free-text findings to reinforce. May be empty.
    #[serde(default)]
    pub key_highlights: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConclusionOutput {
    /// `<p>`-wrapped HTML paragraphs, no heading.
    pub conclusion: String,
}

const TEMPLATE: &str = "You are an expert academic writer. Write an insightful, elaborate conclusion \
for a research paper that summarises the research and closes with a strong final statement.

Topic: {{{topic}}}
Key highlights: {{{keyHighlights}}}

Return a single HTML string with every paragraph wrapped in <p> tags. Do not include a \
<h2>Conclusion</h2> heading or any other heading.";

pub(crate) fn define(client: &ModelClient) -> Flow<ConclusionInput, ConclusionOutput> {
    let prompt = client.define_prompt::<ConclusionInput, ConclusionOutput>(PromptDefinition::new(
        "generateConclusionPrompt",
        TEMPLATE,
        json!({
            "type": "OBJECT",
            "properties": {
                "conclusion": {
                    "type": "STRING",
                    "description": "The conclusion as one HTML string of <p> paragraphs, without a heading."
                }
            },
            "required": ["conclusion"]
        }),
    ));

    client.define_flow(FlowDefinition::new("generateConclusionFlow"), move |input: ConclusionInput| {
        let prompt = prompt.clone();
        async move {
            require_text("topic", &input.topic)?;
            prompt.call(&input).await
        }
    })
}
