use clap::Args;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, help = "Tenant the token is bound to")]
    pub tenant: Option<Uuid>,
    #[arg(long, default_value = "admin", help = "Role claim (use 'superadmin' for cross-tenant access)")]
    pub role: String,
    #[arg(long, default_value = "campus-cli", help = "Subject claim")]
    pub sub: String,
    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);
    let claims = Claims::new(args.sub, args.tenant, args.role, hours);
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "token": token, "expires_at": claims.exp })),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
