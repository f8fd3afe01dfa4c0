use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::NewGroup;

#[derive(Subcommand)]
pub enum GroupCommands {
    #[command(about = "Create a group")]
    Create {
        #[arg(help = "Unique slug")]
        slug: String,
        #[arg(long, help = "Display title (defaults to the slug)")]
        title: Option<String>,
        #[arg(long, default_value = "", help = "Description")]
        description: String,
    },

    #[command(about = "List groups")]
    List,
}

pub async fn handle(cmd: GroupCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = admin_store().await?;

    match cmd {
        GroupCommands::Create {
            slug,
            title,
            description,
        } => {
            let group = store
                .insert_group(NewGroup {
                    title: title.unwrap_or_else(|| slug.clone()),
                    slug,
                    description,
                })
                .await?;
            output_success(
                &output_format,
                &format!("Created group '{}' (id {})", group.slug, group.id),
                Some(json!({ "group": group })),
            )
        }
        GroupCommands::List => {
            let groups = store.list_groups().await?;
            if groups.is_empty() {
                return output_empty_collection(&output_format, "groups", "No groups");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "groups": groups }))?);
                }
                OutputFormat::Text => {
                    println!("{:<8} {:<20} {:<25} {}", "ID", "SLUG", "TITLE", "DESCRIPTION");
                    println!("{}", "-".repeat(80));
                    for group in &groups {
                        println!(
                            "{:<8} {:<20} {:<25} {}",
                            group.id, group.slug, group.title, group.description
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
