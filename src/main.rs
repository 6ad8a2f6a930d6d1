//! wolfies-whatsapp - WhatsApp session bootstrap and message normalizer
//!
//! Pairs (or resumes) a device through the protocol bridge, then logs every
//! incoming message with the sender resolved to a phone identity and a saved name.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial CLI: run, status, contacts, import-contacts

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use wolfies_whatsapp::commands;
use wolfies_whatsapp::config::Config;
use wolfies_whatsapp::output::{self, OutputControls};

/// WhatsApp session bootstrap and message normalizer.
#[derive(Parser, Debug)]
#[command(name = "wolfies-whatsapp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the session store (default: ~/.wolfies-whatsapp/store.db)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Path to the bridge socket (default: ~/.wolfies-whatsapp/bridge.sock)
    #[arg(long, global = true)]
    socket: Option<String>,

    /// Output as JSON (messages become NDJSON on stdout)
    #[arg(long, global = true)]
    json: bool,

    /// Compact JSON output (no whitespace)
    #[arg(long, global = true)]
    compact: bool,

    /// Comma-separated field allowlist
    #[arg(long, global = true)]
    fields: Option<String>,

    /// Truncate text fields to this length
    #[arg(long, global = true)]
    max_text_chars: Option<u32>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pair or resume, then log incoming messages until Ctrl+C (default)
    Run,

    /// Show whether a device is paired
    Status,

    /// List stored contacts
    Contacts,

    /// Import contacts from a JSON file
    ImportContacts {
        /// Contacts file ({"contacts": [...]} or a flat array)
        path: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::resolve(cli.db.as_deref(), cli.socket.as_deref());
    let output_controls = OutputControls {
        json: cli.json,
        compact: cli.compact,
        fields: cli.fields.clone(),
        max_text_chars: cli.max_text_chars,
    };

    let result = match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config, &output_controls),
        Command::Status => commands::status::status(&config, &output_controls),
        Command::Contacts => commands::contacts::list(&config, &output_controls),
        Command::ImportContacts { path } => {
            commands::contacts::import(&config, &path, &output_controls)
        }
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            if cli.json {
                eprintln!("{}", output::format_error(&format!("{:#}", e)));
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::from(1)
        }
    }
}

fn run(config: &Config, output: &OutputControls) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::run::run(config, output))
}
