use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, error, info};

use super::errors::AgentError;
use super::prompt;
use crate::application::validator;
use crate::infrastructure::model::InferenceProvider;
use crate::infrastructure::template::ChatTemplate;
use crate::types::ChatMessage;

/// Terminal states of one JSON-mode invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonOutcome {
    Object(Value),
    DepthExhausted { depth: usize },
}

/// JSON-mode agent loop: instead of function calls, the model must return a
/// single object conforming to the declared schema. Validation failures are
/// fed back as corrective tool turns until the depth budget runs out.
pub struct JsonModeAgent<P: InferenceProvider> {
    provider: Arc<P>,
    template: ChatTemplate,
    schema: Value,
}

impl<P: InferenceProvider> JsonModeAgent<P> {
    pub fn new(provider: Arc<P>, template: ChatTemplate, schema: Value) -> Self {
        Self {
            provider,
            template,
            schema,
        }
    }

    pub async fn run(&self, query: &str, max_depth: usize) -> Result<JsonOutcome, AgentError> {
        info!("Running inference to generate a schema-conforming json object");

        let mut conversation = vec![
            ChatMessage::system(prompt::json_system_prompt(&self.schema)),
            ChatMessage::user(query),
        ];

        let mut depth = 0usize;
        loop {
            debug!(depth, turns = conversation.len(), "Submitting conversation to inference engine");
            let completion = self.provider.complete(&conversation).await?;
            let Some(assistant_message) = self.template.extract_assistant(&completion) else {
                // Extraction failure points at an engine or template problem
                // the loop cannot self-correct; fail the same way tool-call
                // mode does instead of ending without a terminal value.
                error!("Assistant message could not be extracted from completion");
                return Err(AgentError::EmptyAssistantMessage);
            };
            // The assistant turn stays in the conversation so the next round
            // sees what it is correcting.
            conversation.push(ChatMessage::assistant(assistant_message.clone()));

            match validator::validate_json_data(&assistant_message, &self.schema) {
                Ok(object) => {
                    info!("Json schema validation passed");
                    return Ok(JsonOutcome::Object(object));
                }
                Err(validation_error) => {
                    info!(error = %validation_error, "Json schema validation failed");
                    let mut tool_message = prompt::tool_turn_header(depth, query);
                    tool_message.push_str(&prompt::schema_error_block(&validation_error.to_string()));
                    conversation.push(ChatMessage::tool(tool_message));

                    depth += 1;
                    if depth >= max_depth {
                        info!(max_depth, "Maximum correction depth reached; stopping");
                        return Ok(JsonOutcome::DepthExhausted { depth });
                    }
                }
            }
        }
    }
}

/// Default target schema used when the caller supplies none: a fictional
/// character record with three required string fields and two optional
/// string arrays.
pub fn default_character_schema() -> Value {
    json!({
        "title": "Character",
        "type": "object",
        "properties": {
            "name": {"title": "Name", "type": "string"},
            "species": {"title": "Species", "type": "string"},
            "role": {"title": "Role", "type": "string"},
            "personality_traits": {
                "title": "Personality Traits",
                "type": "array",
                "items": {"type": "string"}
            },
            "special_attacks": {
                "title": "Special Attacks",
                "type": "array",
                "items": {"type": "string"}
            }
        },
        "required": ["name", "species", "role"],
        "additionalProperties": false
    })
}
