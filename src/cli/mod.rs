pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "campus")]
#[command(about = "Campus CLI - operator commands for the Campus API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, env = "CAMPUS_API_URL", default_value = "http://localhost:3000", help = "API base URL")]
    pub url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Materialize attendance sessions from recurring schedules")]
    Sessions {
        #[command(subcommand)]
        cmd: commands::sessions::SessionsCommands,
    },

    #[command(about = "Mint a bearer token signed with the local JWT_SECRET")]
    Token(commands::token::TokenArgs),

    #[command(about = "Check server health status from the /health endpoint")]
    Health,
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
    let client = client::ApiClient::new(&cli.url);

    match cli.command {
        Commands::Sessions { cmd } => commands::sessions::handle(cmd, &client, output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Health => commands::health::handle(&client, output_format).await,
    }
}
