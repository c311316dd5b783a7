pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "pm")]
#[command(about = "Property Manager operator CLI - schema setup and user administration")]
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
    #[command(about = "Create missing tables and seed the first administrator")]
    Init,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
        Commands::Init => commands::init::handle(output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_add_with_global_json() {
        let cli = Cli::try_parse_from(["pm", "user", "add", "clerk@example.com", "--role", "staff", "--json"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::User {
                cmd: commands::user::UserCommands::Add { email, password, role },
            } => {
                assert_eq!(email, "clerk@example.com");
                assert_eq!(password, None);
                assert_eq!(role.as_deref(), Some("staff"));
            }
            _ => panic!("expected user add"),
        }
    }

    #[test]
    fn text_is_the_default_format() {
        let cli = Cli::try_parse_from(["pm", "init"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
    }
}
