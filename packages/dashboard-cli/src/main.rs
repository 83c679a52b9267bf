//! Payments dashboard from the terminal.
//!
//! The session lives in `DASHBOARD_STORAGE_DIR`, so `login` once and the
//! other commands pick it up until logout or until the server rejects it.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dashboard_client::{
    ClientConfig, Dashboard, GuardDecision, ListView, LoginOutcome, NavigationLog, Presentation,
    ReviewDecision, ReviewOutcome, Route, SortColumn,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod browse;
mod console;
mod render;

use console::{print_signed_out_hint, ConsoleNotifier};

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Payments dashboard CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Print one page of payments
    Payments {
        /// Exact payment ID
        #[arg(long)]
        id: Option<String>,

        /// completed, pending or failed
        #[arg(long)]
        status: Option<String>,

        /// Sort ascending by amount or created_at (default: newest first)
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortColumn>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Approve (or reject) a payment
    Review {
        id: String,

        #[arg(long)]
        reject: bool,
    },

    /// Interactive list with debounced search
    Browse,
}

fn parse_sort(raw: &str) -> std::result::Result<SortColumn, String> {
    SortColumn::parse(raw).ok_or_else(|| format!("unknown sort column: {raw}"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so tables on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,dashboard_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    tracing::debug!(
        api_base = %config.api_base,
        storage_dir = %config.storage_dir.display(),
        "Configuration loaded"
    );

    let nav = Arc::new(NavigationLog::new());
    let dashboard = Dashboard::from_config(&config, nav.clone(), Arc::new(ConsoleNotifier))
        .context("Failed to set up the dashboard client")?;

    let route = match &cli.command {
        Commands::Login { .. } => Some(Route::Login),
        Commands::Logout => None,
        _ => Some(Route::Dashboard),
    };
    if let Some(route) = route {
        match dashboard.guard.check(route.path()) {
            GuardDecision::Allow => {}
            GuardDecision::Redirect(Route::Dashboard) => {
                if let Some(session) = dashboard.store.get() {
                    println!("Already signed in as {}.", session.email.bold());
                }
                return Ok(ExitCode::SUCCESS);
            }
            GuardDecision::Redirect(Route::Login) => {
                print_signed_out_hint();
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    let ok = match cli.command {
        Commands::Login { email, password } => login(&dashboard, &email, &password).await,
        Commands::Logout => {
            dashboard.login.logout();
            nav.take_last();
            println!("Signed out.");
            true
        }
        Commands::Whoami => whoami(&dashboard),
        Commands::Payments {
            id,
            status,
            sort,
            page,
        } => payments(&dashboard, id, status, sort, page).await,
        Commands::Review { id, reject } => {
            let decision = if reject {
                ReviewDecision::Reject
            } else {
                ReviewDecision::Approve
            };
            review(&dashboard, &id, decision).await
        }
        Commands::Browse => browse::run(&dashboard.payments, &nav).await?,
    };

    if nav.take_last() == Some(Route::Login) {
        println!("{}", "Session ended by the server.".red().bold());
        print_signed_out_hint();
        return Ok(ExitCode::FAILURE);
    }
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn login(dashboard: &Dashboard, email: &str, password: &str) -> bool {
    match dashboard.login.login(email, password).await {
        LoginOutcome::SignedIn(session) => {
            println!("Signed in as {} ({})", session.email.bold(), session.role);
            true
        }
        LoginOutcome::Failed(_) | LoginOutcome::Evicted => false,
    }
}

fn whoami(dashboard: &Dashboard) -> bool {
    match dashboard.store.get() {
        Some(session) => {
            println!("{} ({})", session.email.bold(), session.role);
            true
        }
        None => {
            print_signed_out_hint();
            false
        }
    }
}

async fn payments(
    dashboard: &Dashboard,
    id: Option<String>,
    status: Option<String>,
    sort: Option<SortColumn>,
    page: u32,
) -> bool {
    let controller = &dashboard.payments;
    let mut query = controller.query().filtered_by_status(status);
    if let Some(id) = id {
        query = query.searching(&id);
    }
    if let Some(column) = sort {
        query = query.toggled_sort(column);
    }
    controller.open(query.at_page(page - 1)).await;

    // Still loading means the fetch ended in eviction; main reports it
    if controller.presentation() != Presentation::Loading {
        println!("{}", render::view(controller));
    }
    !matches!(controller.view(), ListView::Failed(_))
}

async fn review(dashboard: &Dashboard, id: &str, decision: ReviewDecision) -> bool {
    match dashboard.payments.review_with(id, decision).await {
        ReviewOutcome::Reviewed(_) => true,
        ReviewOutcome::NotPermitted => {
            println!("{}", "Your role may not review payments.".yellow());
            false
        }
        ReviewOutcome::Failed(_) | ReviewOutcome::Evicted => false,
    }
}
