use serde::Deserialize;
use serde_json::{Map, Value};

pub const TOOL_CALL_START: &str = "<tool_call>";
pub const TOOL_CALL_END: &str = "</tool_call>";

/// Structured request embedded in an assistant message:
/// `{ "name": "...", "arguments": { ... } }` inside `<tool_call>` tags.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ToolCallWire {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

/// Outcome of scanning an assistant message for tool-call payloads. A plain
/// natural-language answer is `Absent`, which is a valid terminal state, not
/// an error; `Malformed` means a block was present but could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCallParse {
    Absent,
    Calls(Vec<ToolCallWire>),
    Malformed(String),
}

/// Extract every `<tool_call>...</tool_call>` block from assistant content.
pub fn parse_tool_calls(content: &str) -> ToolCallParse {
    let mut calls = Vec::new();
    let mut rest = content;

    loop {
        let Some(start) = rest.find(TOOL_CALL_START) else {
            break;
        };
        let after = &rest[start + TOOL_CALL_START.len()..];
        let Some(end) = after.find(TOOL_CALL_END) else {
            return ToolCallParse::Malformed("unterminated <tool_call> block".to_string());
        };
        let payload = after[..end].trim();
        match serde_json::from_str::<ToolCallWire>(payload) {
            Ok(call) => calls.push(call),
            Err(err) => {
                return ToolCallParse::Malformed(format!("invalid tool call json: {err}"));
            }
        }
        rest = &after[end + TOOL_CALL_END.len()..];
    }

    if calls.is_empty() {
        ToolCallParse::Absent
    } else {
        ToolCallParse::Calls(calls)
    }
}
