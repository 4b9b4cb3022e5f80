//! Typed prompts.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::GenerationError;
use crate::provider::{ModelClient, ModelRequest, SafetySetting};

/// Static description of a prompt.
///
/// `template` may reference input fields as `{{{fieldName}}}`, using the
/// input's serialized (camelCase) names.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptDefinition {
    pub name: String,
    pub template: String,
    pub output_schema: Value,
    pub safety_settings: Vec<SafetySetting>,
}

impl PromptDefinition {
    pub fn new(name: impl Into<String>, template: impl Into<String>, output_schema: Value) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            output_schema,
            safety_settings: Vec::new(),
        }
    }

    pub fn with_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = settings;
        self
    }
}

/// Callable produced by [`ModelClient::define_prompt`].
pub struct Prompt<I, O> {
    client: ModelClient,
    definition: Arc<PromptDefinition>,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> Clone for Prompt<I, O> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            definition: self.definition.clone(),
            _types: PhantomData,
        }
    }
}

impl<I, O> Prompt<I, O> {
    pub(crate) fn new(client: ModelClient, definition: PromptDefinition) -> Self {
        Self {
            client,
            definition: Arc::new(definition),
            _types: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

impl<I, O> Prompt<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    /// Render the template for `input` without calling the provider.
    pub fn render(&self, input: &I) -> Result<ModelRequest, GenerationError> {
        let vars = serde_json::to_value(input)
            .map_err(|e| GenerationError::InvalidInput(e.to_string()))?;
        let text = render_template(&self.definition.name, &self.definition.template, &vars)?;
        Ok(ModelRequest {
            prompt: self.definition.name.clone(),
            model: self.client.model().to_string(),
            text,
            response_schema: self.definition.output_schema.clone(),
            safety_settings: self.definition.safety_settings.clone(),
        })
    }

    /// Render, send through the orchestrator, and decode the output.
    pub async fn call(&self, input: &I) -> Result<O, GenerationError> {
        let request = self.render(input)?;
        let output = self.client.send(&request).await?;
        serde_json::from_value(output).map_err(|source| GenerationError::MalformedOutput {
            prompt: self.definition.name.clone(),
            source,
        })
    }
}

fn render_template(prompt: &str, template: &str, vars: &Value) -> Result<String, GenerationError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        let Some(end) = after.find("}}}") else {
            // Unterminated placeholder: keep the text verbatim
            out.push_str(&rest[start..]);
            return Ok(out);
        };

        let field = after[..end].trim();
        match vars.get(field) {
            Some(Value::String(s)) => out.push_str(s),
            Some(Value::Null) | None => {
                return Err(GenerationError::Template {
                    prompt: prompt.to_string(),
                    field: field.to_string(),
                })
            }
            Some(other) => out.push_str(&other.to_string()),
        }
        rest = &after[end + 3..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_template() {
        let vars = json!({"topic": "Quantum Dots", "numberOfChapters": 3});
        let text = render_template(
            "p",
            "Write {{{numberOfChapters}}} chapters on \"{{{topic}}}\" about {{{ topic }}}.",
            &vars,
        )
        .unwrap();
        assert_eq!(text, "Write 3 chapters on \"Quantum Dots\" about Quantum Dots.");
    }

    #[test]
    fn test_render_unknown_field() {
        let err = render_template("dedicationPrompt", "{{{missing}}}", &json!({})).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Template { ref field, .. } if field == "missing"
        ));
    }

    #[test]
    fn test_render_unterminated() {
        let text = render_template("p", "a {{{b", &json!({})).unwrap();
        assert_eq!(text, "a {{{b");
    }
}
