mod errors;
mod json_mode;
mod prompt;
mod runner;
mod wire;


pub use errors::AgentError;
pub use json_mode::{JsonModeAgent, JsonOutcome, default_character_schema};
pub use runner::{AgentOptions, AgentOutcome, ToolCallAgent};
pub use wire::{ToolCallParse, ToolCallWire, parse_tool_calls};
