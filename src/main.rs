//! EDMAS agent state tool
//!
//! Registers agents and inspects or edits their stored state snapshots.
//!
//! # Environment Variables
//! - `DATABASE_URL` - Document store location (default: sqlite://edmas.db)
//! - `EDMAS_PROJECT_ID` - Project namespace inside the store
//! - `EDMAS_CREDENTIALS_PATH` - Service-account credentials JSON
//! - `EDMAS_AGENT_COLLECTION` - Collection holding agent snapshots
//! - `EDMAS_RESTORE_POLICY` - `fresh` or `fail` when stored state is unreadable
//! - `OBSERVABILITY_ENABLED` - Enables the `metrics` command (default: true)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edmas::application::agents::{BaseAgent, BaseAgentOptions};
use edmas::application::bootstrap::PersistenceBootstrap;
use edmas::application::monitoring::AgentStatusRegistry;
use edmas::config::Config;
use edmas::domain::agent::codec::{decode_json, encode_json};
use edmas::domain::agent::{AgentKind, AgentState, AgentStatus};
use edmas::domain::repositories::AgentStateRepository;
use edmas::infrastructure::observability::Metrics;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "EDMAS agent state tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start (or resume) an agent and persist its snapshot
    Register {
        /// Agent type (analyzer, risk, execution, generic, ...)
        #[arg(short = 't', long = "type", default_value = "generic")]
        agent_type: String,

        /// Existing agent id to resume
        #[arg(long)]
        id: Option<String>,

        /// JSON file with the agent configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Record a heartbeat for an agent
    Heartbeat { agent_id: String },
    /// Set an agent's status (ACTIVE, PAUSED, EVOLVING, FAILED)
    Status { agent_id: String, status: String },
    /// Show one agent's snapshot
    Show { agent_id: String },
    /// List all stored agents
    List,
    /// Print an agent's stored document as JSON
    Export { agent_id: String },
    /// Validate and store a document from a JSON file
    Import { file: PathBuf },
    /// Delete an agent's stored snapshot
    Delete { agent_id: String },
    /// Print Prometheus gauges for every stored agent
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let persistence = PersistenceBootstrap::init(&config.store).await?;
    let repository = persistence.agent_state_repository.clone();

    match cli.command {
        Commands::Register {
            agent_type,
            id,
            config: config_path,
        } => {
            let configuration = match config_path {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {:?}", path))?;
                    serde_json::from_str(&content)
                        .with_context(|| format!("Invalid configuration JSON in {:?}", path))?
                }
                None => serde_json::Value::Null,
            };

            let mut options = BaseAgentOptions::new(agent_type.parse::<AgentKind>()?)
                .with_configuration(configuration)
                .with_restore_policy(config.restore_policy);
            if let Some(id) = id {
                options = options.with_agent_id(id);
            }

            let agent = BaseAgent::start(options, repository).await?;
            print_state(&agent.snapshot());
        }
        Commands::Heartbeat { agent_id } => {
            let state = load_existing(repository.as_ref(), &agent_id).await?;
            let next = state.advance_heartbeat(chrono::Utc::now())?;
            repository.save(&next).await?;
            print_state(&next);
        }
        Commands::Status { agent_id, status } => {
            let status: AgentStatus = status.parse()?;
            let state = load_existing(repository.as_ref(), &agent_id).await?;
            let next = state.with_status(status);
            repository.save(&next).await?;
            info!("Agent {} status {} -> {}", agent_id, state.status(), status);
            print_state(&next);
        }
        Commands::Show { agent_id } => {
            let state = load_existing(repository.as_ref(), &agent_id).await?;
            print_state(&state);
        }
        Commands::List => {
            let states = repository.list_all().await?;
            if states.is_empty() {
                println!("No agents stored.");
            }
            for state in states {
                println!(
                    "{:<24} {:<10} {:<9} score={:<8.4} ok={:<6} err={:<6} heartbeat={}",
                    state.agent_id(),
                    state.agent_type(),
                    state.status(),
                    state.performance_score(),
                    state.success_count(),
                    state.error_count(),
                    state.last_heartbeat()
                );
            }
        }
        Commands::Export { agent_id } => {
            let state = load_existing(repository.as_ref(), &agent_id).await?;
            println!("{}", encode_json(&state));
        }
        Commands::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let state = decode_json(&content)
                .with_context(|| format!("Rejected agent state document {:?}", file))?;
            repository.save(&state).await?;
            info!("Imported agent {}", state.agent_id());
        }
        Commands::Delete { agent_id } => {
            if repository.delete(&agent_id).await? {
                info!("Deleted agent {}", agent_id);
            } else {
                anyhow::bail!("No stored state for agent {}", agent_id);
            }
        }
        Commands::Metrics => {
            if !config.observability.enabled {
                anyhow::bail!("Observability is disabled (OBSERVABILITY_ENABLED=false)");
            }
            let metrics = Metrics::new()?;
            let registry = AgentStatusRegistry::new(metrics.clone());
            for state in repository.list_all().await? {
                registry.observe(Arc::new(state)).await;
            }
            print!("{}", metrics.render());
        }
    }

    Ok(())
}

async fn load_existing(
    repository: &dyn AgentStateRepository,
    agent_id: &str,
) -> Result<AgentState> {
    repository
        .load(agent_id)
        .await?
        .with_context(|| format!("No stored state for agent {}", agent_id))
}

fn print_state(state: &AgentState) {
    match serde_json::to_string_pretty(state) {
        Ok(text) => println!("{}", text),
        Err(e) => println!("{:?} ({})", state, e),
    }
}
