use serde_json::{Value, json};

use crate::types::ChatMessage;

/// System prompt for tool-call mode, carrying the full signature set inside
/// `<tools>` tags and the tag convention the model must answer with.
pub fn toolcall_system_prompt(signatures: &[Value]) -> String {
    let rendered = serde_json::to_string_pretty(signatures)
        .unwrap_or_else(|_| Value::Array(signatures.to_vec()).to_string());
    format!(
        "You are a function calling AI model. You are provided with function signatures \
         within <tools></tools> XML tags. You may call one or more functions to assist with \
         the user query. Don't make assumptions about what values to plug into functions.\n\
         <tools>\n{rendered}\n</tools>\n\
         For each function call return a json object with function name and arguments within \
         <tool_call></tool_call> XML tags as follows:\n\
         <tool_call>\n{{\"name\": <function-name>, \"arguments\": <args-dict>}}\n</tool_call>"
    )
}

/// System prompt for JSON mode, carrying the target schema verbatim.
pub fn json_system_prompt(schema: &Value) -> String {
    let rendered =
        serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "You are a helpful assistant that answers in JSON. Here's the json schema you must \
         adhere to:\n<schema>\n{rendered}\n</schema>"
    )
}

/// Seed user turn: the query plus the note that no tool results exist yet.
pub fn first_turn_user_message(query: &str) -> String {
    format!("{query}\nThis is the first turn and you don't have <tool_results> to analyze yet")
}

/// Header for the aggregated tool turn of one round, tagged with the depth
/// counter and the original query.
pub fn tool_turn_header(depth: usize, query: &str) -> String {
    format!("Agent iteration {depth} to assist with user query: {query}\n")
}

pub fn result_block(name: &str, content: &Value) -> String {
    let payload = json!({"name": name, "content": content});
    format!("<tool_response>\n{payload}\n</tool_response>\n")
}

pub fn execution_error_block(name: &str, error: &str) -> String {
    format!(
        "<tool_response>\nThere was an error when executing the function: {name}\n\
         Here's the error traceback: {error}\n\
         Please call this function again with correct arguments within XML tags \
         <tool_call></tool_call>\n</tool_response>\n"
    )
}

pub fn validation_error_block(name: &str, error: &str) -> String {
    format!(
        "<tool_response>\nThere was an error validating the function call against the \
         function signature: {name}\n\
         Here's the error traceback: {error}\n\
         Please call this function again with correct arguments within XML tags \
         <tool_call></tool_call>\n</tool_response>\n"
    )
}

pub fn parse_error_block(error: &str) -> String {
    format!(
        "<tool_response>\nThere was an error parsing function calls\n\
         Here's the error traceback: {error}\n\
         Please call the function again with correct syntax within XML tags \
         <tool_call></tool_call>\n</tool_response>\n"
    )
}

pub fn schema_error_block(error: &str) -> String {
    format!(
        "<tool_response>\nJson schema validation failed\n\
         Here's the error traceback: {error}\n\
         Please return a corrected json object that conforms to the schema\n</tool_response>\n"
    )
}

const FEWSHOT_EXAMPLES: &[(&str, &str)] = &[
    (
        "Fetch the current stock price for Nvidia (NVDA)",
        "<tool_call>\n{\"name\": \"get_stock_price\", \"arguments\": {\"symbol\": \"NVDA\"}}\n</tool_call>",
    ),
    (
        "What's the weather like in Berlin right now?",
        "<tool_call>\n{\"name\": \"get_weather\", \"arguments\": {\"city\": \"Berlin\"}}\n</tool_call>",
    ),
];

/// Illustrative turns biasing the model toward the tool-call format.
pub fn fewshot_turns(count: usize) -> Vec<ChatMessage> {
    FEWSHOT_EXAMPLES
        .iter()
        .take(count)
        .flat_map(|(user, assistant)| {
            [ChatMessage::user(*user), ChatMessage::assistant(*assistant)]
        })
        .collect()
}
