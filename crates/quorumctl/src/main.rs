//! Quorum command line tool.
//!
//! Talks to a running Quorum server over its HTTP API: register automation
//! definitions, run workflows, inspect executions, and score points.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::json;

#[derive(Parser)]
#[command(name = "quorumctl")]
#[command(version, about = "Quorum Command Line Tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quorum server URL
    #[arg(long, default_value = "http://localhost:8090")]
    server_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an automation definition from a YAML or JSON file
    ///
    /// Examples:
    ///     quorumctl register workflow ./definitions/welcome.yaml
    ///     quorumctl register rule ./definitions/big-dues.yaml
    ///     quorumctl register points-rule ./definitions/attendance.yaml
    #[command(verbatim_doc_comment)]
    Register {
        #[command(subcommand)]
        resource: RegisterResource,
    },
    /// Run a registered workflow
    Run {
        /// Workflow id
        workflow_id: String,

        /// Initial run context as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}")]
        context: String,
    },
    /// List workflow executions
    Executions {
        /// Filter by workflow id
        #[arg(long)]
        workflow_id: Option<String>,
    },
    /// Score an activity event against the points rules
    Score {
        /// Member id
        member_id: String,

        /// Activity trigger key
        trigger: String,

        /// Activity data as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}")]
        data: String,
    },
    /// Check server health
    Health,
}

#[derive(Subcommand)]
enum RegisterResource {
    /// Register a workflow definition
    Workflow {
        /// Definition file (YAML or JSON)
        file: PathBuf,
    },
    /// Register an automation rule
    Rule {
        /// Definition file (YAML or JSON)
        file: PathBuf,
    },
    /// Register a points rule
    PointsRule {
        /// Definition file (YAML or JSON)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = Client::new();
    let base = cli.server_url.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Register { resource } => {
            let (path, file) = match &resource {
                RegisterResource::Workflow { file } => ("/api/workflows/register", file),
                RegisterResource::Rule { file } => ("/api/rules/register", file),
                RegisterResource::PointsRule { file } => ("/api/points/rules/register", file),
            };
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let body = post(&client, &base, path, json!({ "content": content })).await?;
            print_json(&body);
        }
        Commands::Run {
            workflow_id,
            context,
        } => {
            let context: serde_json::Value =
                serde_json::from_str(&context).context("--context must be a JSON object")?;
            let path = format!("/api/workflows/{workflow_id}/run");
            let body = post(&client, &base, &path, json!({ "context": context })).await?;
            print_json(&body);
        }
        Commands::Executions { workflow_id } => {
            let mut url = format!("{base}/api/executions");
            if let Some(id) = workflow_id {
                url.push_str(&format!("?workflow_id={id}"));
            }
            let body = get(&client, &url).await?;
            print_json(&body);
        }
        Commands::Score {
            member_id,
            trigger,
            data,
        } => {
            let activity: serde_json::Value =
                serde_json::from_str(&data).context("--data must be a JSON object")?;
            let body = post(
                &client,
                &base,
                "/api/points/score",
                json!({
                    "memberId": member_id,
                    "trigger": trigger,
                    "activityData": activity,
                }),
            )
            .await?;
            print_json(&body);
        }
        Commands::Health => {
            let body = get(&client, &format!("{base}/api/health")).await?;
            print_json(&body);
        }
    }

    Ok(())
}

async fn post(
    client: &Client,
    base: &str,
    path: &str,
    body: serde_json::Value,
) -> Result<serde_json::Value> {
    let response = client
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .with_context(|| format!("Failed to reach server at {base}"))?;
    read_response(response).await
}

async fn get(client: &Client, url: &str) -> Result<serde_json::Value> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?;
    read_response(response).await
}

async fn read_response(response: reqwest::Response) -> Result<serde_json::Value> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .unwrap_or_else(|_| json!({"error": "non-JSON response"}));

    if !status.is_success() {
        anyhow::bail!(
            "Server returned {}: {}",
            status,
            body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown error")
        );
    }
    Ok(body)
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}
