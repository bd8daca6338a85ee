use crate::infrastructure::model::ModelError;
use thiserror::Error;

/// Fatal loop errors. Everything recoverable (parse, validation, and
/// execution failures) is fed back to the model as corrective context
/// instead of surfacing here.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("assistant message could not be extracted from the completion")]
    EmptyAssistantMessage,
}
