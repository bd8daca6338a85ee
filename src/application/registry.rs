use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{info, warn};

/// Handler invoked with arguments in declared parameter order. Optional
/// parameters the caller omitted arrive as `Value::Null`.
pub type ToolHandler = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("duplicate function name: {0}")]
    DuplicateFunction(String),
    #[error("duplicate parameter '{parameter}' on function '{name}'")]
    DuplicateParameter { name: String, parameter: String },
    #[error("required parameter '{parameter}' declared after optional parameters on function '{name}'")]
    RequiredAfterOptional { name: String, parameter: String },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown function requested: {0}")]
    UnknownFunction(String),
    #[error("missing required argument '{argument}' for function '{name}'")]
    MissingArgument { name: String, argument: String },
    #[error("function '{name}' failed: {message}")]
    Execution { name: String, message: String },
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub schema: Value,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            required: false,
        }
    }
}

#[derive(Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub handler: ToolHandler,
}

/// Name-keyed mapping from function name to a typed descriptor, built at
/// startup. Parameter order is part of the descriptor and is checked at
/// registration so positional binding can never silently misalign.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    order: Vec<String>,
    index: HashMap<String, ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: ToolSpec) -> Result<(), RegistrationError> {
        let key = spec.name.to_lowercase();
        if self.index.contains_key(&key) {
            return Err(RegistrationError::DuplicateFunction(spec.name));
        }

        let mut seen = Vec::with_capacity(spec.params.len());
        let mut optional_started = false;
        for param in &spec.params {
            if seen.contains(&param.name.as_str()) {
                return Err(RegistrationError::DuplicateParameter {
                    name: spec.name,
                    parameter: param.name.clone(),
                });
            }
            if param.required && optional_started {
                return Err(RegistrationError::RequiredAfterOptional {
                    name: spec.name,
                    parameter: param.name.clone(),
                });
            }
            optional_started |= !param.required;
            seen.push(param.name.as_str());
        }

        self.order.push(key.clone());
        self.index.insert(key, spec);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Machine-readable signature set in registration order, using the
    /// OpenAI function layout the system prompt embeds.
    pub fn signatures(&self) -> Vec<Value> {
        self.order
            .iter()
            .filter_map(|key| self.index.get(key))
            .map(|spec| {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for param in &spec.params {
                    properties.insert(param.name.clone(), param.schema.clone());
                    if param.required {
                        required.push(Value::String(param.name.clone()));
                    }
                }
                json!({
                    "type": "function",
                    "function": {
                        "name": spec.name,
                        "description": spec.description,
                        "parameters": {
                            "type": "object",
                            "properties": properties,
                            "required": required,
                        }
                    }
                })
            })
            .collect()
    }

    /// Resolve a function by name and invoke it with the supplied arguments
    /// bound positionally in declared parameter order.
    pub fn execute(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<Value, RegistryError> {
        let Some(spec) = self.index.get(&name.to_lowercase()) else {
            warn!(requested_function = %name, "Unknown function requested by model");
            return Err(RegistryError::UnknownFunction(name.to_string()));
        };

        let mut positional = Vec::with_capacity(spec.params.len());
        for param in &spec.params {
            match arguments.get(&param.name) {
                Some(value) => positional.push(value.clone()),
                None if param.required => {
                    return Err(RegistryError::MissingArgument {
                        name: spec.name.clone(),
                        argument: param.name.clone(),
                    });
                }
                None => positional.push(Value::Null),
            }
        }

        info!(function = %spec.name, arguments = positional.len(), "Invoking registered function");
        (spec.handler)(&positional).map_err(|message| RegistryError::Execution {
            name: spec.name.clone(),
            message,
        })
    }
}
