use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pact::cli;
use pact::config::{ConfigStore, FlagOverrides, LoadOptions, PathResolver};
use pact::crypto::SealedEnvelopeEngine;
use pact::error::{ExitStatus, PactError};

#[derive(Parser)]
#[command(
    name = "pact",
    version,
    about = "Encrypt messages for named groups of public keys",
    long_about = "pact encrypts a message so that every member of a named group \
                  (a pact) can read it, and decrypts messages addressed to you. \
                  Keys and pacts live in a .pact config file found in the current \
                  directory, one of its parents, or ~/.config/pact."
)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "PACT_CONFIG", value_name = "PATH")]
    config: Option<String>,

    /// Path to the public key file
    #[arg(long, global = true, value_name = "PATH")]
    public_key: Option<String>,

    /// Path to the private key file
    #[arg(long, global = true, value_name = "PATH")]
    private_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a config file with a `self` pact
    Config {
        /// Directory to write the .pact file into
        dir: Option<String>,
    },

    /// Generate a new keypair
    KeyGen,

    /// Print your public key
    KeyExport,

    /// Encrypt a message for every member of a pact
    Create {
        /// Pact to encrypt for
        pact: String,
        /// Message to encrypt (read from stdin if omitted)
        message: Option<String>,
    },

    /// Decrypt a message addressed to you
    Read {
        /// Base64 ciphertext (read from stdin if omitted)
        ciphertext: Option<String>,
    },

    /// Create a new, empty pact
    New {
        /// Pact name
        pact: String,
    },

    /// List pacts and their keys
    List,

    /// Add a public key to a pact, creating the pact if needed
    AddKey {
        /// Pact name
        pact: String,
        /// Public key (read from stdin if omitted)
        key: Option<String>,
    },

    /// Remove a single key from a pact
    RmKey {
        /// Pact name
        pact: String,
        /// Index of the key to remove; prompts when omitted
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Remove a pact and all of its keys
    Rm {
        /// Pact name
        pact: String,
    },

    /// Show current configuration and paths
    Info,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let args = Cli::parse();

    match run(args) {
        Ok(()) => ExitCode::from(ExitStatus::Ok.code()),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let status = err
                .downcast_ref::<PactError>()
                .map(PactError::exit_status)
                .unwrap_or(ExitStatus::InternalError);
            ExitCode::from(status.code())
        }
    }
}

fn run(args: Cli) -> Result<()> {
    let working_dir = env::current_dir().context("Failed to read the working directory")?;
    let resolver = PathResolver::from_env();

    let options = LoadOptions {
        explicit_path: args.config,
        flags: FlagOverrides {
            public_key: args.public_key,
            private_key: args.private_key,
        },
        working_dir,
    };
    let mut store = ConfigStore::open(&options, &resolver)?;
    let engine = SealedEnvelopeEngine;

    match args.command {
        Commands::Config { dir } => {
            cli::handle_config(
                &mut store,
                &engine,
                &resolver,
                &options.working_dir,
                dir.as_deref(),
            )?;
        }
        Commands::KeyGen => cli::handle_key_gen(&mut store, &engine)?,
        Commands::KeyExport => cli::handle_key_export(&store, &engine)?,
        Commands::Create { pact, message } => {
            cli::handle_create(&store, &engine, &pact, message)?;
        }
        Commands::Read { ciphertext } => cli::handle_read(&store, &engine, ciphertext)?,
        Commands::New { pact } => cli::handle_new(&mut store, &pact)?,
        Commands::List => cli::handle_list(&store)?,
        Commands::AddKey { pact, key } => cli::handle_add_key(&mut store, &pact, key)?,
        Commands::RmKey { pact, index } => cli::handle_rm_key(&mut store, &pact, index)?,
        Commands::Rm { pact } => cli::handle_rm(&mut store, &pact)?,
        Commands::Info => cli::handle_info(&store, &engine)?,
    }

    Ok(())
}
