use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config;

pub async fn handle(
    username: &str,
    hours: Option<u64>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let security = &config::config().security;
    let store = admin_store().await?;

    let user = store
        .user_by_username(username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;

    let hours = hours.unwrap_or(security.jwt_expiry_hours);
    let token = generate_jwt(&Claims::new(user.id, &user.username, hours), &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Token issued for '{}'", user.username),
            Some(json!({ "token": token, "expires_in_hours": hours })),
        ),
        // Bare token so it can be captured by a shell
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
