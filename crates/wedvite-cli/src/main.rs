//! Wedvite CLI: inspect and maintain the local invitation store.
//!
//! Configuration comes from the environment (and `.env`); see `Config::from_env`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use wedvite_cli::{
    init_tracing, media_report, parse_record, print_records_table, print_storage_report,
    report_error,
};
use wedvite_core::{AppError, Config, InvitationRecord, TierKind};
use wedvite_services::InvitationPersistence;

#[derive(Parser, Debug)]
#[command(name = "wedvite", about = "Wedding invitation store CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show bytes used per tier against the configured ceiling
    Usage {
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List invitations (durable records with staged edits applied, unless --tier is given)
    List {
        /// Only one tier: durable or transient
        #[arg(long)]
        tier: Option<TierKind>,
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Print one invitation as JSON
    Show {
        /// Invitation ID
        id: String,
    },
    /// Save an invitation from a JSON file
    Save {
        /// Path to the invitation JSON
        file: std::path::PathBuf,
    },
    /// Promote staged invitations into the durable tier
    Commit,
    /// Throw away staged invitations
    Discard,
    /// Delete an invitation from both tiers
    Delete {
        /// Invitation ID
        id: String,
    },
    /// Delete durable invitations older than a number of days
    Sweep {
        /// Age threshold in days (defaults to RETENTION_DAYS)
        #[arg(long)]
        days: Option<u32>,
        /// Clamp the threshold to FORCED_RETENTION_DAYS
        #[arg(long)]
        forced: bool,
    },
    /// Report the size of every media field of one invitation
    Inspect {
        /// Invitation ID
        id: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn find(store: &InvitationPersistence, id: &str) -> anyhow::Result<InvitationRecord> {
    store
        .working_set()
        .await?
        .into_iter()
        .find(|record| record.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Invitation {} not found", id)).into())
}

fn read_record(path: &std::path::Path) -> anyhow::Result<InvitationRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let record = parse_record(&raw, chrono::Utc::now())
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(record)
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let store = InvitationPersistence::open(&config)
        .await
        .context("Failed to open invitation storage")?;

    match cli.command {
        Commands::Usage { format } => {
            let report = store.report().await?;
            match format.as_str() {
                "json" => print_json(&report)?,
                _ => print_storage_report(&report),
            }
        }
        Commands::List { tier, format } => {
            let records = match tier {
                Some(TierKind::Durable) => store.load_all().await?,
                Some(TierKind::Transient) => store.transient().load_all().await?,
                None => store.working_set().await?,
            };
            match format.as_str() {
                "json" => print_json(&records)?,
                _ => print_records_table(&records),
            }
        }
        Commands::Show { id } => {
            let record = find(&store, &id).await?;
            print_json(&record)?;
        }
        Commands::Save { file } => {
            let record = read_record(&file)?;
            let id = record.id.clone();
            let outcome = store.persist(record).await?;
            print_json(&serde_json::json!({ "id": id, "outcome": outcome }))?;
        }
        Commands::Commit => {
            let outcome = store.commit().await?;
            print_json(&outcome)?;
        }
        Commands::Discard => {
            store.discard_staged().await?;
            print_json(&serde_json::json!({ "success": true, "message": "Staged invitations discarded" }))?;
        }
        Commands::Delete { id } => {
            let deleted = store.delete(&id).await?;
            if !deleted {
                return Err(AppError::NotFound(format!("Invitation {} not found", id)).into());
            }
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Invitation {} deleted", id) }),
            )?;
        }
        Commands::Sweep { days, forced } => {
            let days = days.unwrap_or(config.retention_days);
            let report = store.sweep(days, forced).await?;
            print_json(&report)?;
        }
        Commands::Inspect { id } => {
            let record = find(&store, &id).await?;
            print_json(&serde_json::json!({
                "id": &record.id,
                "title": record.title(),
                "media": media_report(&record),
            }))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(
        environment = %config.environment,
        production = config.is_production(),
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    if let Err(err) = run(cli, config).await {
        if let Some(app_err) = err.downcast_ref::<AppError>() {
            report_error(app_err);
        }
        return Err(err);
    }

    Ok(())
}
