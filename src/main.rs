mod application;
mod config;
mod domain;
mod infrastructure;

pub use domain::types;

use application::agent::{
    AgentOptions, AgentOutcome, JsonModeAgent, JsonOutcome, ToolCallAgent,
    default_character_schema,
};
use application::functions;
use clap::{Parser, ValueEnum};
use config::AppConfig;
use infrastructure::model::OllamaClient;
use infrastructure::template::ChatTemplate;
use serde_json::{Value, json};
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(
    name = "pythia",
    version,
    about = "Bounded function-calling and json-mode loop for local chat models"
)]
struct Cli {
    /// Model identifier the inference engine should load.
    #[arg(long)]
    model: Option<String>,
    /// Base URL of the inference engine.
    #[arg(long)]
    ollama_url: Option<String>,
    /// Chat template identifier (chatml or zephyr).
    #[arg(long)]
    chat_template: Option<String>,
    /// Number of few-shot examples to inject (tool-call mode only).
    #[arg(long)]
    num_fewshot: Option<usize>,
    /// Maximum number of corrective rounds.
    #[arg(long)]
    max_depth: Option<usize>,
    /// CPU threads the engine may use.
    #[arg(long)]
    n_threads: Option<u32>,
    #[arg(long)]
    config: Option<String>,
    /// Target schema file for json mode; a builtin schema is used if absent.
    #[arg(long)]
    schema_file: Option<String>,
    #[arg(long)]
    prompt_file: Option<String>,
    #[arg(long, value_enum, default_value_t = RunMode::Tools)]
    mode: RunMode,
    prompt: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RunMode {
    Tools,
    Json,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Starting pythia");
    let cli = Cli::parse();
    debug!(?cli.mode, config = ?cli.config, model = ?cli.model, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let file_config = AppConfig::load(config_path)?;
    if let Some(path) = config_path {
        info!(path = %path.display(), "Loaded configuration from file");
    } else {
        info!("Loaded configuration using default path or defaults");
    }

    let model = cli.model.clone().unwrap_or(file_config.model);
    let base_url = cli.ollama_url.clone().unwrap_or(file_config.base_url);
    let template_name = cli
        .chat_template
        .clone()
        .unwrap_or(file_config.chat_template);
    let max_depth = cli.max_depth.unwrap_or(file_config.max_depth);
    let n_threads = cli.n_threads.unwrap_or(file_config.n_threads);

    let Some(template) = ChatTemplate::from_name(&template_name) else {
        return Err(format!("unknown chat template: {template_name}").into());
    };

    debug!(base_url = %base_url, model = %model, n_threads, "Creating inference provider");
    let provider = Arc::new(OllamaClient::new(base_url, model, template, n_threads));

    let query = load_prompt(&cli)?;
    info!(mode = ?cli.mode, max_depth, "Running loop in selected mode");

    match cli.mode {
        RunMode::Tools => {
            let registry = functions::builtin_registry()?;
            let agent = ToolCallAgent::new(provider, registry, template);
            let outcome = agent
                .run(
                    &query,
                    AgentOptions {
                        max_depth,
                        num_fewshot: cli.num_fewshot,
                    },
                )
                .await?;
            let output = match outcome {
                AgentOutcome::Final { message } => {
                    json!({"status": "final", "content": message})
                }
                AgentOutcome::DepthExhausted { depth } => {
                    json!({"status": "depth_exhausted", "depth": depth})
                }
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        RunMode::Json => {
            let schema = load_schema(&cli)?;
            let agent = JsonModeAgent::new(provider, template, schema);
            let outcome = agent.run(&query, max_depth).await?;
            let output = match outcome {
                JsonOutcome::Object(object) => {
                    json!({"status": "final", "object": object})
                }
                JsonOutcome::DepthExhausted { depth } => {
                    json!({"status": "depth_exhausted", "depth": depth})
                }
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    info!("Loop execution finished");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}

fn load_prompt(cli: &Cli) -> Result<String, Box<dyn Error>> {
    let raw = if let Some(path) = &cli.prompt_file {
        info!(path = %path, "Loading prompt from file");
        fs::read_to_string(path)?
    } else if !cli.prompt.is_empty() {
        info!("Using prompt provided through CLI arguments");
        cli.prompt.join(" ")
    } else if atty::isnt(atty::Stream::Stdin) {
        info!("Reading prompt from standard input");
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        warn!("Prompt not provided via arguments, file, or stdin");
        return Err("prompt required via arguments, file, or stdin".into());
    };

    // A whitespace-only file or pipe must not seed the loop with an
    // empty query.
    let prompt = raw.trim().to_string();
    if prompt.is_empty() {
        warn!("Prompt is empty after trimming whitespace");
        return Err("prompt required via arguments, file, or stdin".into());
    }
    Ok(prompt)
}

fn load_schema(cli: &Cli) -> Result<Value, Box<dyn Error>> {
    if let Some(path) = &cli.schema_file {
        info!(path = %path, "Loading target schema from file");
        let content = fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&content)?);
    }
    info!("Using builtin character schema");
    Ok(default_character_schema())
}
