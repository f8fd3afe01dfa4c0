pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "yatube")]
#[command(about = "yatube CLI - run and administer the blogging API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve {
        #[arg(long, help = "Port to listen on (defaults to API_PORT or 8000)")]
        port: Option<u16>,
        #[arg(long, help = "Use the in-memory store instead of Postgres")]
        memory: bool,
    },

    #[command(about = "Apply the database schema")]
    Migrate,

    #[command(about = "User management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Group management")]
    Group {
        #[command(subcommand)]
        cmd: commands::group::GroupCommands,
    },

    #[command(about = "Issue an API token for a user")]
    Token {
        #[arg(help = "Username to issue the token for")]
        username: String,
        #[arg(long, help = "Token lifetime in hours")]
        hours: Option<u64>,
    },

    #[command(about = "Check a running server's /health endpoint")]
    Ping {
        #[arg(long, help = "Server base URL (defaults to http://localhost:<API_PORT>)")]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { port, memory } => commands::serve::handle(port, memory).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Group { cmd } => commands::group::handle(cmd, output_format).await,
        Commands::Token { username, hours } => {
            commands::token::handle(&username, hours, output_format).await
        }
        Commands::Ping { url } => commands::ping::handle(url, output_format).await,
    }
}
