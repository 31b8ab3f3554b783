//! Dev console for manual smoke-testing against a live backend.
//!
//! Not a product surface: it prints report values as JSON so an engineer
//! can eyeball the pipeline without the dashboard in front of them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use panel_auth::FileTokenStore;
use panel_client::PanelClient;
use panel_config::{ConfigOverrides, PanelConfig};
use panel_report::ReportAssembler;

/// Credential mirror location for the console session.
const CREDENTIAL_FILE: &str = ".panel-credential.json";

#[derive(Parser)]
#[command(name = "panel")]
#[command(about = "Back-office panel dev console", long_about = None)]
struct Cli {
    /// Base API URL (overrides PANEL_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Tenant access key (overrides PANEL_ACCESS_KEY)
    #[arg(long)]
    key: Option<String>,

    /// Default entity code (overrides PANEL_ENTITY)
    #[arg(long)]
    entity: Option<i64>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire a token and print its introspected claims
    Token,

    /// Dump the company directory
    Companies,

    /// Till-session state indicators with resolved company names
    Registers,

    /// Bank-statement reconciliation report
    Reconciliation {
        /// Presentation window over the month series
        #[arg(long, default_value_t = 6)]
        months: usize,
    },

    /// Card-settlement report
    Settlement {
        /// Presentation window over the month series
        #[arg(long, default_value_t = 6)]
        months: usize,
    },

    /// Clear the cached credential (memory mirror and file)
    Logout,

    /// Run the full integration sequence: token, claims, registers, names
    Smoke,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Dev-time convenience; absence of the file is not an error.
    let _ = dotenvy::from_filename(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = PanelConfig::from_env(ConfigOverrides {
        base_url: cli.api_url,
        access_key: cli.key,
        default_entity: cli.entity,
        token_endpoint: None,
    });
    tracing::info!(base_url = %config.base_url, "console starting");

    let client = PanelClient::new(config, Box::new(FileTokenStore::new(CREDENTIAL_FILE)));
    let assembler = ReportAssembler::new(client);

    match cli.cmd {
        Commands::Token => {
            let token = assembler
                .client()
                .auth()
                .get_token()
                .await
                .context("token acquisition failed")?;
            println!("token acquired ({} chars)", token.len());
            match panel_auth::decode_token(&token) {
                Some(claims) => println!("{}", serde_json::to_string_pretty(&claims)?),
                None => println!("token payload is not introspectable"),
            }
        }

        Commands::Companies => {
            let companies = assembler.client().directory().all().await;
            println!("{}", serde_json::to_string_pretty(&companies)?);
        }

        Commands::Registers => {
            let report = assembler
                .build_register_report()
                .await
                .context("register report failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Reconciliation { months } => {
            let report = assembler
                .build_reconciliation_report(months)
                .await
                .context("reconciliation report failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Settlement { months } => {
            let report = assembler
                .build_settlement_report(months)
                .await
                .context("settlement report failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Logout => {
            assembler.client().auth().logout().await;
            println!("credential cleared");
        }

        Commands::Smoke => run_smoke(&assembler).await?,
    }

    Ok(())
}

/// The manual integration sequence: each step prints enough to judge the
/// backend wiring at a glance.
async fn run_smoke(assembler: &ReportAssembler) -> Result<()> {
    println!("1. acquiring token...");
    let token = assembler
        .client()
        .auth()
        .get_token()
        .await
        .context("token acquisition failed")?;
    println!("   ok ({} chars)", token.len());

    println!("2. introspecting claims...");
    match panel_auth::decode_token(&token) {
        Some(claims) => println!("   entity {} / user {}", claims.entity_code, claims.user_code),
        None => println!("   payload not introspectable"),
    }

    println!("3. fetching register state...");
    let table = assembler
        .client()
        .fetch_register_state()
        .await
        .context("register-state fetch failed")?;
    println!(
        "   {} rows (return code {})",
        table.rows.len(),
        table.return_code
    );

    println!("4. resolving company names...");
    let report = assembler
        .build_register_report()
        .await
        .context("register report failed")?;
    for indicator in report.indicators.iter().take(5) {
        println!(
            "   {}: {} open / {} closed",
            indicator.name, indicator.indicator.open_count, indicator.indicator.closed_count
        );
    }

    println!("smoke sequence completed");
    Ok(())
}
