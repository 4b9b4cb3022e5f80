//! Body chapters.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::GenerationError;
use crate::generation::{permissive_safety, require_text};
use crate::provider::{Flow, FlowDefinition, ModelClient, PromptDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaptersInput {
    pub topic: String,
    pub number_of_chapters: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Title without the "Chapter N:" prefix.
    pub title: String,
    /// Chapter HTML beginning with `<h1>Chapter N: Title</h1>`, structured
    /// with `<h2>`/`<h3>` headings.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaptersOutput {
    pub chapters: Vec<Chapter>,
}

const TEMPLATE: &str = r#"You are an expert academic writer. Write {{{numberOfChapters}}} detailed, well-structured body chapters for a paper on the topic "{{{topic}}}".

HTML format for each chapter's content:
- <h1>Chapter X: {Chapter Title}</h1> opens the chapter, with X the chapter number
- <h2>{Section Title}</h2> for sections; every chapter has at least two or three
- <h3>{Subsection Title}</h3> for subsections within a section
- <p>{text}</p> for paragraphs; each section has several substantive paragraphs
- <div class="equation">{text}</div> for mathematical equations
- <span class="definition">{text}</span> to highlight a key term inside a paragraph
- <div class="important">{text}</div> for a key takeaway or summary list
- <span class="quantum-number">{text}</span> for specific scientific terms
Never include <img> tags, images or figures.

Rules:
1. Produce exactly {{{numberOfChapters}}} chapters at university level.
2. The "content" field holds only that chapter's HTML and starts with its <h1> tag.
3. The "title" field holds the chapter title alone, without the "Chapter X:" prefix.
4. Do not write an abstract, introduction, conclusion or references."#;

pub(crate) fn validate(input: &ChaptersInput) -> Result<(), GenerationError> {
    require_text("topic", &input.topic)?;
    if input.number_of_chapters == 0 {
        return Err(GenerationError::InvalidInput(
            "numberOfChapters must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn define(client: &ModelClient) -> Flow<ChaptersInput, ChaptersOutput> {
    let definition = PromptDefinition::new(
        "generateChaptersPrompt",
        TEMPLATE,
        json!({
            "type": "OBJECT",
            "properties": {
                "chapters": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "title": {
                                "type": "STRING",
                                "description": "Chapter title without the \"Chapter X:\" prefix."
                            },
                            "content": {
                                "type": "STRING",
                                "description": "Full HTML of the chapter, starting with its <h1> heading."
                            }
                        },
                        "required": ["title", "content"]
                    }
                }
            },
            "required": ["chapters"]
        }),
    )
    .with_safety_settings(permissive_safety());
    let prompt = client.define_prompt::<ChaptersInput, ChaptersOutput>(definition);

    client.define_flow(FlowDefinition::new("generateChaptersFlow"), move |input: ChaptersInput| {
        let prompt = prompt.clone();
        async move {
            validate(&input)?;
            prompt.call(&input).await
        }
    })
}
