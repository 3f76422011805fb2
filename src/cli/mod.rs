pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hub")]
#[command(about = "ProjectHub CLI - database and deployment helpers for the ProjectHub API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create an approved administrator account")]
    CreateAdmin {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Password (at least 8 characters)")]
        password: String,
    },

    #[command(about = "Check a running server's /health endpoint")]
    Health {
        #[arg(long, default_value = "http://localhost:3000", help = "Server base URL")]
        url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
        Commands::Migrate => commands::database::migrate(output_format).await,
        Commands::CreateAdmin { name, email, password } => {
            commands::database::create_admin(&name, &email, &password, output_format).await
        }
        Commands::Health { url } => commands::health::check(&url, output_format).await,
    }
}
