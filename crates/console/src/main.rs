use anyhow::Context;
use clap::{Parser, Subcommand};
use engine::AttemptStateMachine;
use engine::models::{Equipment, Event, Lift, SessionKey, Sex};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod session;

use session::Session;

#[derive(Parser)]
#[command(name = "barra")]
#[command(about = "Barra Pronta competition-day console", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Meet configuration JSON (plates, bar weights, attempts, timer)
    #[arg(long, env = "BARRA_MEET_CONFIG")]
    meet_config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the plates for a bar weight
    Load {
        #[arg(long)]
        lift: Lift,
        #[arg(long)]
        weight: Decimal,
        /// Weight currently on the bar, to show which plates can stay
        #[arg(long)]
        previous: Option<Decimal>,
    },
    /// Compute IPF GL points
    Points {
        #[arg(long)]
        total: Decimal,
        #[arg(long)]
        bodyweight: Decimal,
        #[arg(long)]
        sex: Sex,
        #[arg(long, default_value = "classic")]
        equipment: Equipment,
        #[arg(long, default_value = "SBD")]
        event: Event,
    },
    /// Print the lifting order of a flight
    Order {
        entries: PathBuf,
        #[command(flatten)]
        session: SessionArgs,
        #[arg(long)]
        lift: Lift,
        #[arg(long, default_value_t = 1)]
        attempt: u8,
    },
    /// Run a live session for one flight, reading commands from stdin
    Run {
        entries: PathBuf,
        #[command(flatten)]
        session: SessionArgs,
        /// Write the entries back here when the session ends
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SessionArgs {
    #[arg(long, default_value_t = 1)]
    day: u32,
    #[arg(long, default_value_t = 1)]
    platform: u32,
    #[arg(long, default_value = "A")]
    flight: String,
}

impl From<SessionArgs> for SessionKey {
    fn from(args: SessionArgs) -> Self {
        SessionKey::new(args.day, args.platform, args.flight)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("console={},engine={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let meet = config::load_meet_config(cli.meet_config.as_deref())
        .context("Failed to load meet configuration")?;

    match cli.command {
        Commands::Load {
            lift,
            weight,
            previous,
        } => {
            let stack = commands::bar_load(&meet, lift, weight, previous);
            println!("{}", commands::render_stack(&meet, weight, &stack));
        }
        Commands::Points {
            total,
            bodyweight,
            sex,
            equipment,
            event,
        } => {
            println!(
                "{}",
                commands::score(total, bodyweight, sex, equipment, event)
            );
        }
        Commands::Order {
            entries,
            session,
            lift,
            attempt,
        } => {
            let entries = config::load_entries(&entries)?;
            let key = SessionKey::from(session);
            println!("{}", commands::render_order(&entries, &key, lift, attempt));
        }
        Commands::Run {
            entries,
            session,
            output,
        } => {
            let entries = config::load_entries(&entries)?;
            let key = SessionKey::from(session);
            tracing::info!("Starting session for {}", key);

            let machine = AttemptStateMachine::new(&meet).with_entries(entries);
            let session = Session::new(meet, key, machine);
            session.run().await?;

            if let Some(output) = output {
                config::save_entries(&output, &session.entries().await)?;
            }
        }
    }

    Ok(())
}
