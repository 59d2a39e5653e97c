use clap::Subcommand;
use uuid::Uuid;

use crate::cli::client::{ApiClient, ApiReply};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::sessions::{parse_date, DateRange};

#[derive(Subcommand)]
pub enum SessionsCommands {
    #[command(about = "Ensure sessions exist for one date (defaults to today on the server)")]
    Ensure {
        #[arg(long, help = "Date as YYYY-MM-DD")]
        date: Option<String>,
        #[arg(long, help = "Tenant id (required for superadmin tokens)")]
        tenant: Option<Uuid>,
    },

    #[command(about = "Ensure sessions exist for every date in an inclusive range")]
    EnsureRange {
        #[arg(long, help = "First date as YYYY-MM-DD")]
        from: String,
        #[arg(long, help = "Last date as YYYY-MM-DD")]
        to: String,
        #[arg(long, help = "Tenant id (required for superadmin tokens)")]
        tenant: Option<Uuid>,
    },
}

pub async fn handle(cmd: SessionsCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let reply = match cmd {
        SessionsCommands::Ensure { date, tenant } => {
            let mut query = Vec::new();
            if let Some(date) = date {
                // Fail fast instead of round-tripping a bad date
                query.push(("date", parse_date("date", &date)?.to_string()));
            }
            client.post(&endpoint(tenant, "ensure"), &query).await?
        }
        SessionsCommands::EnsureRange { from, to, tenant } => {
            let range = DateRange::parse(Some(&from), Some(&to))?;
            let query = [("from", range.from().to_string()), ("to", range.to().to_string())];
            client.post(&endpoint(tenant, "ensure-range"), &query).await?
        }
    };

    report(reply, &output_format)
}

fn endpoint(tenant: Option<Uuid>, action: &str) -> String {
    match tenant {
        Some(tenant) => format!("/api/tenants/{}/sessions/{}", tenant, action),
        None => format!("/api/sessions/{}", action),
    }
}

fn report(reply: ApiReply, output_format: &OutputFormat) -> anyhow::Result<()> {
    if !reply.is_success() {
        output_error(output_format, &reply.error_message(), reply.error_code())?;
        anyhow::bail!("request failed with status {}", reply.status);
    }

    let data = reply.body.get("data").cloned().unwrap_or_default();
    let message = format!(
        "Sessions ensured for {}..{}: {} created, {} backfilled",
        data["from"].as_str().unwrap_or("?"),
        data["to"].as_str().unwrap_or("?"),
        data["created"].as_u64().unwrap_or(0),
        data["backfilled"].as_u64().unwrap_or(0),
    );
    output_success(output_format, &message, Some(data))
}
