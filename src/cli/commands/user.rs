use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user")]
    Create {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "Delete a user with their posts, comments and follows")]
    Delete {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "List users")]
    List,
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = admin_store().await?;

    match cmd {
        UserCommands::Create { username } => {
            let username = username.trim();
            if username.is_empty() {
                return Err(anyhow::anyhow!("Username may not be blank"));
            }
            let user = store.insert_user(username).await?;
            output_success(
                &output_format,
                &format!("Created user '{}' (id {})", user.username, user.id),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::Delete { username } => {
            let user = store
                .user_by_username(&username)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;
            store.delete_user(user.id).await?;
            output_success(&output_format, &format!("Deleted user '{}'", username), None)
        }
        UserCommands::List => {
            let users = store.list_users().await?;
            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "users": users }))?);
                }
                OutputFormat::Text => {
                    println!("{:<8} {:<30} {}", "ID", "USERNAME", "JOINED");
                    println!("{}", "-".repeat(60));
                    for user in &users {
                        println!(
                            "{:<8} {:<30} {}",
                            user.id,
                            user.username,
                            user.date_joined.format("%Y-%m-%d %H:%M")
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
