use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use atelier::api::v1::project::{UpdateProjectRequest, UpdateProjectResponse};
use atelier::model::Artboard;
use atelier::project::ProjectId;
use atelier_client::api::ApiClient;
use atelier_client::config::ServerConfig;
use atelier_client::push::{push_artboards, PushConfig};
use atelier_client::size_parser::parse_size;

/// Command-line client for the Atelier project store.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// Server endpoint.
    #[arg(long, env = "ATELIER_ENDPOINT")]
    endpoint: Option<String>,

    /// Bearer token.
    #[arg(long, env = "ATELIER_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch one project and print it as JSON.
    Get {
        /// The project to fetch.
        project_id: String,
    },

    /// List all projects on the server.
    List,

    /// Upload artboards from a JSON file, chunking when large.
    Push {
        /// The project to update.
        project_id: String,

        /// Path to a JSON array of artboards.
        file: PathBuf,

        /// Target serialized size per chunk, e.g. "512KiB".
        #[arg(long, default_value = "1MiB")]
        chunk_size: String,

        /// Suppress the progress bar.
        #[arg(long)]
        quiet: bool,
    },

    /// Publish a project with an HTML snapshot.
    Publish {
        /// The project to publish.
        project_id: String,

        /// Path to the HTML file.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    let config = ServerConfig::new(opts.endpoint, opts.token);
    let api = ApiClient::from_server_config(config)?;

    match opts.command {
        Command::Get { project_id } => {
            let project_id = ProjectId::new(project_id)?;

            match api.get_project(&project_id).await? {
                Some(project) => println!("{}", serde_json::to_string_pretty(&project)?),
                None => return Err(anyhow!("Project '{}' does not exist", project_id)),
            }
        }
        Command::List => {
            for project in api.list_projects().await? {
                println!("{}\t{}", project.project_id, project.last_updated);
            }
        }
        Command::Push {
            project_id,
            file,
            chunk_size,
            quiet,
        } => {
            let project_id = ProjectId::new(project_id)?;

            let content = std::fs::read_to_string(&file)?;
            let artboards: Vec<serde_json::Value> = serde_json::from_str(&content)?;

            // Catch an obviously malformed file before uploading anything.
            for artboard in &artboards {
                serde_json::from_value::<Artboard>(artboard.clone()).map_err(|e| {
                    anyhow!("'{}' is not an array of artboards: {}", file.display(), e)
                })?;
            }

            let count = artboards.len();
            let push_config = PushConfig {
                chunk_size: parse_size(&chunk_size)?,
                quiet,
                ..Default::default()
            };

            push_artboards(&api, &project_id, artboards, push_config).await?;
            println!("Pushed {} artboards to '{}'", count, project_id);
        }
        Command::Publish { project_id, file } => {
            let project_id = ProjectId::new(project_id)?;
            let public_html = std::fs::read_to_string(&file)?;

            let request = UpdateProjectRequest {
                project_id: project_id.clone(),
                chat_history: None,
                artboards: None,
                public_html: Some(public_html),
                is_published: Some(true),
                chunk_index: None,
                total_chunks: None,
            };

            match api.update_project(&request).await? {
                UpdateProjectResponse::Updated => println!("Published '{}'", project_id),
                other => return Err(anyhow!("Unexpected response: {:?}", other)),
            }
        }
    }

    Ok(())
}
