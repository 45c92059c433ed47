//! CertChain - credential reconciliation and verification CLI
//!
//! This binary provides:
//! - Credential verification by object id
//! - Holder and issuer views reconstructed from the ledger
//! - Achievement tier and badge calculation
//! - A watch loop that periodically re-derives an issuer's output
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use certchain_core::{
    collector_badges, AchievementTier, AdminCap, Credential, TierTable, UserProfile,
};
use certchain_indexer::clock::{Clock, SystemClock};
use certchain_indexer::config::{Config, LoggingConfig};
use certchain_indexer::refresh::RefreshScheduler;
use certchain_indexer::{AcquisitionPhase, Engine};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "certchain")]
#[command(
    version,
    about = "Ledger-backed credential reconciliation and verification",
    long_about = None
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "certchain.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a credential by object id
    Verify {
        /// Credential object id (0x + 64 hex digits)
        id: String,
    },

    /// List credentials held by an address
    Held {
        /// Holder address
        address: String,

        /// Only credentials issued by this address
        #[arg(long)]
        issuer: Option<String>,
    },

    /// Reconstruct the credentials an issuer produced
    Issued {
        /// Issuer address
        address: String,

        /// Institution address to match as well (defaults to the issuer's AdminCap)
        #[arg(long)]
        institution: Option<String>,

        /// Only credentials held by this address
        #[arg(long)]
        holder: Option<String>,
    },

    /// Show profile, capabilities and issuer tier for an address
    Profile {
        /// Address to inspect
        address: String,
    },

    /// Show the achievement tier for an issued count
    Tier {
        /// Number of credentials issued
        count: u64,
    },

    /// Show the collector badges of a holder
    Badges {
        /// Holder address
        address: String,
    },

    /// Periodically re-derive an issuer's output until interrupted
    Watch {
        /// Issuer address
        address: String,

        /// Institution address to match as well (defaults to the issuer's AdminCap)
        #[arg(long)]
        institution: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tier lookups are offline and need no configuration.
    if let Commands::Tier { count } = cli.command {
        init_logging(cli.debug, None)?;
        return print_json(&TierView::new(&TierTable::standard(), count));
    }

    let config = Config::from_file(&cli.config).context("Failed to load configuration")?;
    init_logging(cli.debug, Some(&config.logging))?;

    info!("CertChain {} starting", env!("CARGO_PKG_VERSION"));
    info!("  RPC URL: {}", config.network.rpc_url);
    info!("  Package: {}", config.contracts.package_id);

    let engine = Engine::connect(&config)?;

    match cli.command {
        Commands::Verify { id } => {
            let verdict = engine.verify(&id).await;
            print_json(&verdict)?;
            if !verdict.is_valid() {
                std::process::exit(1);
            }
        }
        Commands::Held { address, issuer } => {
            held(&engine, &address, issuer.as_deref()).await?
        }
        Commands::Issued {
            address,
            institution,
            holder,
        } => {
            issued(
                &engine,
                &address,
                institution.as_deref(),
                holder.as_deref(),
            )
            .await?
        }
        Commands::Profile { address } => profile(&engine, &address).await?,
        Commands::Badges { address } => badges(&engine, &address).await?,
        Commands::Watch {
            address,
            institution,
        } => watch(&engine, &config, &address, institution.as_deref()).await?,
        Commands::Tier { .. } => {}
    }

    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(debug: bool, logging: Option<&LoggingConfig>) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = logging.map(|l| l.level.as_str()).unwrap_or("warn");
    let env_filter = if debug {
        EnvFilter::new("certchain_indexer=debug,certchain=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| {
                EnvFilter::new(format!("certchain_indexer={level},certchain={level}"))
            })
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.is_some_and(|l| l.format == "json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

type LiveEngine = Engine<certchain_indexer::SuiRpcProvider, SystemClock>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeldEntry<'a> {
    #[serde(flatten)]
    credential: &'a Credential,
    display_url: Option<String>,
    is_expired: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeldView<'a> {
    address: &'a str,
    credentials: Vec<HeldEntry<'a>>,
    skipped: usize,
    notices: &'a [String],
}

async fn held(engine: &LiveEngine, address: &str, issuer: Option<&str>) -> Result<()> {
    let holdings = engine.held_by(address).await;
    let now = SystemClock.now_ms();

    let records: Vec<&Credential> = match issuer {
        Some(issuer) => holdings.credentials.by_issuer(issuer),
        None => holdings.credentials.records().iter().collect(),
    };
    let credentials = records
        .into_iter()
        .map(|credential| HeldEntry {
            credential,
            display_url: engine.display_url(credential),
            is_expired: credential.is_expired_at(now),
        })
        .collect();

    print_json(&HeldView {
        address,
        credentials,
        skipped: holdings.skipped,
        notices: &holdings.notices,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuedView<'a> {
    issuer: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    holder: Option<&'a str>,
    credentials: Vec<&'a Credential>,
    phase: AcquisitionPhase,
    events_matched: usize,
    skipped: usize,
    notices: &'a [String],
}

async fn issued(
    engine: &LiveEngine,
    address: &str,
    institution: Option<&str>,
    holder: Option<&str>,
) -> Result<()> {
    let target = engine.issuer_target(address, institution).await;
    let report = engine.issued_by(&target).await;

    let credentials = match holder {
        Some(holder) => report.credentials.by_owner(holder),
        None => report.credentials.records().iter().collect(),
    };

    print_json(&IssuedView {
        issuer: address,
        holder,
        credentials,
        phase: report.phase,
        events_matched: report.events_matched,
        skipped: report.skipped,
        notices: &report.notices,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TierView<'a> {
    count: u64,
    current: &'a AchievementTier,
    next: Option<&'a AchievementTier>,
    progress_percent: f64,
    unlocked: Vec<&'a str>,
}

impl<'a> TierView<'a> {
    fn new(table: &'a TierTable, count: u64) -> Self {
        Self {
            count,
            current: table.current_tier(count),
            next: table.next_tier(count),
            progress_percent: table.progress_percent(count),
            unlocked: table
                .unlocked(count)
                .into_iter()
                .map(|t| t.id.as_str())
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView<'a> {
    address: &'a str,
    profile: Option<UserProfile>,
    admin_caps: Vec<AdminCap>,
    issuer_tier: Option<TierView<'a>>,
}

async fn profile(engine: &LiveEngine, address: &str) -> Result<()> {
    let table = TierTable::standard();
    let profile = engine.profile_of(address).await;
    let admin_caps = engine.admin_caps_of(address).await;

    let issuer_tier = admin_caps
        .first()
        .map(|cap| TierView::new(&table, cap.total_issued));

    print_json(&ProfileView {
        address,
        profile,
        admin_caps,
        issuer_tier,
    })
}

async fn badges(engine: &LiveEngine, address: &str) -> Result<()> {
    let holdings = engine.held_by(address).await;
    let is_admin = !engine.admin_caps_of(address).await.is_empty();
    let joined_at_ms = match engine.profile_of(address).await {
        Some(profile) => profile.joined_at_ms,
        None => SystemClock.now_ms(),
    };

    print_json(&collector_badges(
        holdings.credentials.records(),
        is_admin,
        joined_at_ms,
    ))
}

async fn watch(
    engine: &LiveEngine,
    config: &Config,
    address: &str,
    institution: Option<&str>,
) -> Result<()> {
    let target = engine.issuer_target(address, institution).await;
    let scheduler = RefreshScheduler::from_config(&config.refresh);

    let task = || {
        let target = &target;
        async move {
            let report = engine.issued_by(target).await;
            if report.credentials.is_empty() && !report.notices.is_empty() {
                anyhow::bail!("{}", report.notices.join("; "));
            }
            info!(
                credentials = report.credentials.len(),
                phase = ?report.phase,
                "Issuer view refreshed"
            );
            println!("{}", serde_json::to_string(&report)?);
            Ok::<_, anyhow::Error>(report.credentials.len())
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown requested");
    };

    let stats = scheduler.run(task, shutdown).await;
    info!(
        refreshes = stats.refreshes,
        failures = stats.failures,
        "Watch finished"
    );
    Ok(())
}
