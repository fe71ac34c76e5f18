use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use ruleflow_rs::ruleflow::config::{EngineConfig, ExecutionMode, RunPolicy};
use ruleflow_rs::ruleflow::contact::{contact_context, Contact, ContactFactory};
use ruleflow_rs::ruleflow::workflow::factory::RunOutcome;
use ruleflow_rs::ruleflow::workflow::loader::RuleFormat;

use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether every workflow is eligible for a contact
    Check {
        /// Path to the workflow file (JSON or YAML)
        #[arg(short, long)]
        workflows: PathBuf,

        /// Path to the contact JSON file
        #[arg(short, long)]
        contact: PathBuf,
    },
    /// Run the workflows' activities against a contact
    Run {
        /// Path to the workflow file (JSON or YAML)
        #[arg(short, long)]
        workflows: PathBuf,

        /// Path to the contact JSON file
        #[arg(short, long)]
        contact: PathBuf,

        /// gated or unconditional (overrides RULEFLOW_RUN_POLICY)
        #[arg(long)]
        policy: Option<RunPolicy>,

        /// concurrent or sequential (overrides RULEFLOW_EXECUTION)
        #[arg(long)]
        execution: Option<ExecutionMode>,
    },
    /// Re-serialize a workflow file
    Convert {
        /// Path to the workflow file (JSON or YAML)
        #[arg(short, long)]
        workflows: PathBuf,

        /// Output format: json or yaml
        #[arg(short, long, default_value = "json")]
        format: String,
    },
}

async fn load_factory(path: &Path, config: EngineConfig) -> anyhow::Result<ContactFactory> {
    let mut factory = ContactFactory::with_config(config);
    let loaded = factory.load_from_file(path).await;
    if loaded == 0 {
        log::warn!("No workflows loaded from {}", path.display());
    } else {
        log::info!("Loaded {} workflow(s) from {}", loaded, path.display());
    }
    Ok(factory)
}

fn load_contact(path: &Path) -> anyhow::Result<Contact> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading contact {}", path.display()))?;
    let contact = serde_json::from_str(&content)
        .with_context(|| format!("parsing contact {}", path.display()))?;
    Ok(contact)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = EngineConfig::from_env()?;

    match args.command {
        Commands::Check {
            workflows,
            contact,
        } => {
            let mut factory = load_factory(&workflows, config).await?;
            let context = contact_context(load_contact(&contact)?);

            let eligible = factory.check_eligibility_only(context);
            println!("Eligible: {}", eligible);
        }
        Commands::Run {
            workflows,
            contact,
            policy,
            execution,
        } => {
            let mut config = config;
            if let Some(policy) = policy {
                config.run_policy = policy;
            }
            if let Some(execution) = execution {
                config.execution = execution;
            }
            log::info!(
                "Running with policy {} and execution {}",
                config.run_policy,
                config.execution
            );

            let mut factory = load_factory(&workflows, config).await?;
            let context = contact_context(load_contact(&contact)?);

            let report = factory.run_all(context.clone()).await;
            for outcome in &report.outcomes {
                match outcome {
                    RunOutcome::Completed { workflow } => println!("completed: {}", workflow),
                    RunOutcome::Skipped { workflow } => println!("skipped:   {}", workflow),
                    RunOutcome::Failed { workflow, error } => {
                        println!("failed:    {} ({})", workflow, error)
                    }
                }
            }

            let contact = context
                .0
                .read()
                .map_err(|_| anyhow::anyhow!("contact lock poisoned"))?
                .clone();
            println!("{}", serde_json::to_string_pretty(&contact)?);
        }
        Commands::Convert { workflows, format } => {
            let factory = load_factory(&workflows, config).await?;
            let output = match format.to_ascii_lowercase().as_str() {
                "yaml" | "yml" => factory.to_yaml()?,
                "json" => factory.to_json()?,
                other => anyhow::bail!("unknown format '{}', expected json or yaml", other),
            };
            log::info!(
                "Converted {} workflow(s) from {:?}",
                factory.len(),
                RuleFormat::from_path(&workflows)
            );
            println!("{}", output);
        }
    }

    Ok(())
}
