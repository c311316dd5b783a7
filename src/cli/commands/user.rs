use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success, password_or_stdin};
use crate::cli::OutputFormat;
use crate::services::{UserError, UserService};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List user accounts")]
    List,

    #[command(about = "Create a user account")]
    Add {
        email: String,
        #[arg(long, help = "Password (read from stdin when omitted)")]
        password: Option<String>,
        #[arg(long, help = "Role name (default: admin)")]
        role: Option<String>,
    },

    #[command(about = "Replace a user's password")]
    Passwd {
        email: String,
        #[arg(long, help = "New password (read from stdin when omitted)")]
        password: Option<String>,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (_, db) = super::connect().await?;
    let users = UserService::new(db.clone());

    let result = match cmd {
        UserCommands::List => list(&users, output_format).await,
        UserCommands::Add { email, password, role } => {
            let password = password_or_stdin(password)?;
            match users.create_user(&email, &password, role.as_deref()).await {
                Ok(user) => output_success(
                    output_format,
                    &format!("Created user {}", user.email),
                    Some(json!({ "user": user })),
                ),
                Err(e) => Err(e.into()),
            }
        }
        UserCommands::Passwd { email, password } => {
            let password = password_or_stdin(password)?;
            match users.set_password(&email, &password).await {
                Ok(()) => output_success(output_format, &format!("Password updated for {}", email.trim()), None),
                Err(UserError::NotFound(email)) => {
                    output_error(output_format, &format!("No user with email {}", email))?;
                    anyhow::bail!("user not found")
                }
                Err(e) => Err(e.into()),
            }
        }
    };

    db.close().await;
    result
}

async fn list(users: &UserService, output_format: OutputFormat) -> anyhow::Result<()> {
    let all = users.list().await?;
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "users": all }))?);
        }
        OutputFormat::Text => {
            if all.is_empty() {
                println!("No users. Run `pm init` to create the first administrator.");
            }
            for user in all {
                println!(
                    "{:>4}  {:<32}  {:<8}  {}",
                    user.id,
                    user.email,
                    user.role,
                    user.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }
    Ok(())
}
