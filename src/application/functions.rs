use std::sync::Arc;

use chrono::{Local, Utc};
use serde_json::{Value, json};

use crate::application::registry::{ParamSpec, RegistrationError, ToolRegistry, ToolSpec};

/// Registry with the builtin demo functions the CLI ships with. Callers
/// embedding the loop build their own registry instead.
pub fn builtin_registry() -> Result<ToolRegistry, RegistrationError> {
    let mut registry = ToolRegistry::new();

    registry.register(ToolSpec {
        name: "get_current_time".to_string(),
        description: "Get the current date and time as an RFC 3339 timestamp.".to_string(),
        params: vec![ParamSpec::optional(
            "timezone",
            json!({
                "type": "string",
                "enum": ["local", "utc"],
                "description": "Clock to read; defaults to local"
            }),
        )],
        handler: Arc::new(|args| {
            let timezone = args.first().and_then(Value::as_str).unwrap_or("local");
            let now = match timezone {
                "utc" => Utc::now().to_rfc3339(),
                _ => Local::now().to_rfc3339(),
            };
            Ok(json!({"timezone": timezone, "now": now}))
        }),
    })?;

    registry.register(ToolSpec {
        name: "get_system_info".to_string(),
        description: "Report host operating system, CPU count, and memory usage.".to_string(),
        params: Vec::new(),
        handler: Arc::new(|_args| {
            let mut sys = sysinfo::System::new_all();
            sys.refresh_all();
            Ok(json!({
                "os": sysinfo::System::name(),
                "os_version": sysinfo::System::os_version(),
                "host_name": sysinfo::System::host_name(),
                "cpus": sys.cpus().len(),
                "total_memory_bytes": sys.total_memory(),
                "used_memory_bytes": sys.used_memory(),
            }))
        }),
    })?;

    Ok(registry)
}
