use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::errors::AgentError;
use super::prompt;
use super::wire::{self, ToolCallParse, ToolCallWire};
use crate::application::registry::ToolRegistry;
use crate::application::validator;
use crate::infrastructure::model::InferenceProvider;
use crate::infrastructure::template::ChatTemplate;
use crate::types::ChatMessage;

const DEFAULT_MAX_DEPTH: usize = 5;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Ceiling on corrective rounds; the sole backstop against an endless
    /// correction loop.
    pub max_depth: usize,
    /// Number of illustrative example exchanges injected into the initial
    /// prompt (tool-call mode only).
    pub num_fewshot: Option<usize>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            num_fewshot: None,
        }
    }
}

/// Terminal states of one loop invocation. Depth exhaustion is a defined
/// outcome, not an error: the model failed to converge within budget.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Final { message: String },
    DepthExhausted { depth: usize },
}

/// Tool-call mode agent loop. Owns the conversation for exactly one query:
/// each round sends the conversation to the inference engine, parses the
/// assistant message for tool calls, validates and executes them, and feeds
/// results or corrective feedback back as a tool turn.
pub struct ToolCallAgent<P: InferenceProvider> {
    provider: Arc<P>,
    registry: ToolRegistry,
    template: ChatTemplate,
}

impl<P: InferenceProvider> ToolCallAgent<P> {
    pub fn new(provider: Arc<P>, registry: ToolRegistry, template: ChatTemplate) -> Self {
        Self {
            provider,
            registry,
            template,
        }
    }

    pub async fn run(
        &self,
        query: &str,
        options: AgentOptions,
    ) -> Result<AgentOutcome, AgentError> {
        info!(functions = self.registry.len(), "Agent run started");
        if self.registry.is_empty() {
            warn!("No functions registered; the model can only answer directly");
        }

        // Signature set is fetched once, at loop start.
        let signatures = self.registry.signatures();

        let mut conversation =
            vec![ChatMessage::system(prompt::toolcall_system_prompt(&signatures))];
        if let Some(count) = options.num_fewshot {
            conversation.extend(prompt::fewshot_turns(count));
        }
        conversation.push(ChatMessage::user(prompt::first_turn_user_message(query)));

        let mut depth = 0usize;
        loop {
            debug!(depth, turns = conversation.len(), "Submitting conversation to inference engine");
            let completion = self.provider.complete(&conversation).await?;
            let Some(assistant_message) = self.template.extract_assistant(&completion) else {
                error!("Assistant message could not be extracted from completion");
                return Err(AgentError::EmptyAssistantMessage);
            };
            conversation.push(ChatMessage::assistant(assistant_message.clone()));

            let mut tool_message = prompt::tool_turn_header(depth, query);
            match wire::parse_tool_calls(&assistant_message) {
                ToolCallParse::Calls(calls) => {
                    info!(calls = calls.len(), "Parsed tool calls from assistant message");
                    for call in &calls {
                        tool_message.push_str(&self.dispatch_call(call, &signatures));
                    }
                    conversation.push(ChatMessage::tool(tool_message));
                }
                ToolCallParse::Malformed(parse_error) => {
                    info!(error = %parse_error, "Tool call payload failed to parse");
                    tool_message.push_str(&prompt::parse_error_block(&parse_error));
                    conversation.push(ChatMessage::tool(tool_message));
                }
                ToolCallParse::Absent => {
                    info!("Assistant returned a final answer");
                    return Ok(AgentOutcome::Final {
                        message: assistant_message,
                    });
                }
            }

            depth += 1;
            if depth >= options.max_depth {
                info!(
                    max_depth = options.max_depth,
                    "Maximum correction depth reached; stopping"
                );
                return Ok(AgentOutcome::DepthExhausted { depth });
            }
        }
    }

    /// Handle one parsed tool call: validate against the signature set,
    /// execute on success, and render a per-call response block either way.
    /// Failures never abort the loop; they become corrective feedback.
    fn dispatch_call(&self, call: &ToolCallWire, signatures: &[Value]) -> String {
        let arguments = Value::Object(call.arguments.clone());
        if let Err(validation_error) =
            validator::validate_function_call(&call.name, &arguments, signatures)
        {
            info!(function = %call.name, error = %validation_error, "Tool call failed signature validation");
            return prompt::validation_error_block(&call.name, &validation_error.to_string());
        }

        match self.registry.execute(&call.name, &call.arguments) {
            Ok(output) => {
                info!(function = %call.name, "Function call succeeded");
                prompt::result_block(&call.name, &output)
            }
            Err(execution_error) => {
                info!(function = %call.name, error = %execution_error, "Function call failed");
                prompt::execution_error_block(&call.name, &execution_error.to_string())
            }
        }
    }
}
