use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims, GlobalUserRole};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(help = "User id the token identifies")]
    pub user_id: String,

    #[arg(long, help = "Display name (defaults to the user id)")]
    pub user_name: Option<String>,

    #[arg(long, default_value = "user", help = "Global role: admin, moderator or user")]
    pub role: String,

    #[arg(long, help = "Lifetime in hours (defaults to the configured session expiry)")]
    pub expiry_hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    let role = GlobalUserRole::from_name(&args.role);
    let user_name = args.user_name.unwrap_or_else(|| args.user_id.clone());
    let expiry_hours = args.expiry_hours.unwrap_or(config.security.jwt_expiry_hours);

    let claims = Claims::new(&args.user_id, user_name, role, expiry_hours);
    let token = generate_jwt(&claims, &config.security.jwt_secret)?;

    output_success(
        &output_format,
        "Session token created",
        Some(json!({
            "token": token,
            "userId": args.user_id,
            "role": role.as_str(),
            "cookie": config.security.session_cookie_name,
        })),
    )
}
