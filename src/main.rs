use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use googlemeet::cli::{self, Context, OutputFormat};
use googlemeet::client::PageRequest;

#[derive(Parser)]
#[command(name = "googlemeet")]
#[command(about = "Google Meet API adapter", version)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (default: ~/.config/googlemeet/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect a Google account through OAuth2
    Login,
    /// Remove stored tokens
    Logout,
    /// Inspect or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Send a request to the Google Meet API
    Request {
        /// HTTP method: GET, POST, PUT, PATCH, DELETE, HEAD or OPTIONS
        method: String,
        /// Path relative to the API base URL (e.g. /spaces/abc)
        path: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
        /// Query parameter as key=value (repeatable)
        #[arg(long = "query", short = 'q')]
        query: Vec<String>,
    },
    /// Manage meeting spaces
    Space {
        #[command(subcommand)]
        action: SpaceAction,
    },
    /// Browse conference records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },
    /// Run the webhook listener
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the configuration, or a single property
    Show {
        property: Option<String>,
    },
    /// Show the generated oauth block
    Oauth,
    /// Set a configuration key (e.g. clientId, webhookSecret)
    Set {
        key: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum SpaceAction {
    /// Create a meeting space
    Create {
        /// Access type: open, trusted or restricted
        #[arg(long)]
        access_type: Option<String>,
    },
    /// Get a meeting space by name or meeting code
    Get { name: String },
    /// End the active conference in a space
    End { name: String },
}

#[derive(Subcommand)]
enum RecordsAction {
    /// List conference records
    List {
        /// Filter expression, e.g. space.name = "spaces/abc"
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        page_token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("googlemeet=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let ctx = Context::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Login => {
            cli::run_login(&ctx, format).await?;
        }
        Commands::Logout => {
            cli::run_logout(&ctx, format).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { property } => {
                cli::run_config_show(&ctx, property.as_deref(), format)?;
            }
            ConfigAction::Oauth => {
                cli::run_config_oauth(&ctx, format)?;
            }
            ConfigAction::Set { key, value } => {
                cli::run_config_set(&ctx, &key, &value, format)?;
            }
        },
        Commands::Request {
            method,
            path,
            body,
            query,
        } => {
            cli::run_request(&ctx, &method, &path, body.as_deref(), &query, format).await?;
        }
        Commands::Space { action } => match action {
            SpaceAction::Create { access_type } => {
                cli::run_space_create(&ctx, access_type.as_deref(), format).await?;
            }
            SpaceAction::Get { name } => {
                cli::run_space_get(&ctx, &name, format).await?;
            }
            SpaceAction::End { name } => {
                cli::run_space_end(&ctx, &name, format).await?;
            }
        },
        Commands::Records { action } => match action {
            RecordsAction::List {
                filter,
                page_size,
                page_token,
            } => {
                let page = PageRequest {
                    page_size,
                    page_token,
                };
                cli::run_records_list(&ctx, filter.as_deref(), page, format).await?;
            }
        },
        Commands::Serve { port, host } => {
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
            googlemeet::server::run_server(addr, ctx.config, ctx.events).await?;
        }
    }

    Ok(())
}
