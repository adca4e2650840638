//! Gate-check CLI.
//!
//! Runs lookups, validations and admissions against the configured ticket
//! store, for operators and smoke tests.
//!
//! ## Commands
//!
//! - `event`: Look up an event by id
//! - `validate`: Validate a scanned payload without admitting
//! - `admit`: Mark a ticket scanned (unconditional)
//! - `check-in`: Validate a payload and admit it if valid
//!
//! Exits 0 when the ticket (or event) was accepted, 1 otherwise.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gatecheck::{
    config::DEFAULT_LOG_FILTER, metrics::register_gatecheck_metrics, qr, AdmissionResult,
    CheckIn, Config, EventLookup, Gate, ValidationDecision,
};
use gatecheck_appsync::AppSyncTicketStore;
use gatecheck_core::environment::SystemClock;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gatecheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate and admit event tickets against the ticket store", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up an event by id
    Event {
        /// Event id
        event_id: String,
    },

    /// Validate a scanned payload for an event without admitting it
    Validate {
        /// Event being scanned for
        #[arg(long)]
        event: String,

        /// Raw QR payload or ticket id
        raw: String,
    },

    /// Mark a ticket scanned, without validating it first
    Admit {
        /// Ticket id
        ticket_id: String,

        /// Holder email (part of the store key)
        email: String,
    },

    /// Validate a scanned payload and admit it if valid
    CheckIn {
        /// Event being scanned for
        #[arg(long)]
        event: String,

        /// Raw QR payload or ticket id
        raw: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        api_url = %config.store.api_url,
        log_filter = %config.log_level,
        max_pages = config.gate.max_pages,
        require_explicit_validity = config.gate.require_explicit_validity,
        "Configuration loaded"
    );

    register_gatecheck_metrics();

    let store = AppSyncTicketStore::with_timeout(
        config.store.api_url.clone(),
        config.store.api_key.clone(),
        config.store.timeout(),
    )
    .context("Failed to configure the ticket store client")?;

    let gate = Gate::new(
        Arc::new(store),
        Arc::new(SystemClock),
        config.validation_config(),
    );

    let accepted = match cli.command {
        Commands::Event { event_id } => {
            let lookup = gate.directory().lookup_event(event_id.trim()).await;
            print_lookup(&lookup, cli.json)?;
            matches!(lookup, EventLookup::Found(_))
        },
        Commands::Validate { event, raw } => {
            let reference = qr::parse(&raw);
            if !reference.has_ticket_id() {
                println!("Invalid QR code: No ticket ID found");
                return Ok(ExitCode::FAILURE);
            }
            let decision = gate
                .engine()
                .validate(
                    event.trim(),
                    &reference.ticket_id,
                    reference.event_id.as_deref(),
                )
                .await;
            print_decision(&decision, cli.json)?;
            decision.is_admit()
        },
        Commands::Admit { ticket_id, email } => {
            let result = gate.committer().admit(ticket_id.trim(), email.trim()).await;
            print_admission(&result, cli.json)?;
            result.is_success()
        },
        Commands::CheckIn { event, raw } => {
            let reference = qr::parse(&raw);
            if !reference.has_ticket_id() {
                println!("Invalid QR code: No ticket ID found");
                return Ok(ExitCode::FAILURE);
            }
            let check_in = gate.check_in(event.trim(), &reference).await;
            print_check_in(&check_in, cli.json)?;
            check_in.is_admitted()
        },
    };

    Ok(if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize result")?
    );
    Ok(())
}

fn print_lookup(lookup: &EventLookup, json: bool) -> Result<()> {
    if json {
        return print_json(lookup);
    }

    match lookup {
        EventLookup::Found(summary) => {
            println!("{}", summary.name);
            println!("  Venue:       {}", summary.venue);
            println!("  Date:        {}", summary.start_date);
            println!("  Description: {}", summary.description);
            if let Some(poster) = &summary.poster_url {
                println!("  Poster:      {poster}");
            }
        },
        EventLookup::NotFound => println!("Event not found"),
        EventLookup::Failed { message } => println!("{message}"),
    }
    Ok(())
}

fn print_decision(decision: &ValidationDecision, json: bool) -> Result<()> {
    if json {
        return print_json(decision);
    }

    match decision {
        ValidationDecision::Admit(ticket) => {
            println!("VALID  {}", ticket.ticket_id);
            println!(
                "  Holder: {}",
                ticket.customer_email.as_deref().unwrap_or(gatecheck::gate::UNKNOWN_EMAIL)
            );
            println!("  Scans:  {}/{}", ticket.scan_count, ticket.max_scans);
        },
        ValidationDecision::Reject(rejection) => {
            println!("REJECT {}", rejection.violation);
            println!("  {}", rejection.message);
        },
    }
    Ok(())
}

fn print_admission(result: &AdmissionResult, json: bool) -> Result<()> {
    if json {
        return print_json(result);
    }

    match result {
        AdmissionResult::Admitted { ticket } => {
            println!("ADMITTED {}", ticket.ticket_id);
            if let Some(at) = &ticket.last_scanned_at {
                println!("  Scanned at: {at}");
            }
        },
        AdmissionResult::Failed { message } => println!("NOT ADMITTED  {message}"),
    }
    Ok(())
}

fn print_check_in(check_in: &CheckIn, json: bool) -> Result<()> {
    if json {
        return print_json(check_in);
    }

    print_decision(&check_in.decision, false)?;
    if let Some(admission) = &check_in.admission {
        print_admission(admission, false)?;
    }
    Ok(())
}
