//! pdfseal command line
//!
//! Signs documents and verifies seals with RSA PEM keys.

mod commands;

use clap::{Parser, Subcommand};
use pdfseal_core::{Engine, EngineConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pdfseal")]
#[command(version, about = "Sign documents and verify embedded signatures")]
struct Cli {
    /// TOML file with embedding and timestamp settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an RSA key pair as private.pem / public.pem
    Keygen {
        #[arg(long, default_value_t = 2048)]
        bits: usize,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Sign a document and embed the signature block
    Sign {
        #[arg(short, long)]
        input: PathBuf,

        /// PKCS#8 private key; falls back to PDFSEAL_PRIVATE_KEY
        #[arg(short, long)]
        key: Option<PathBuf>,

        /// Where to write the signed copy (default: signed_<input name>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only print the signature; do not write a signed copy
        #[arg(long)]
        detached: bool,
    },

    /// Verify a signature against the document's recomputed hash
    Verify {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        public_key: PathBuf,

        /// Base64 signature, or @path to read it from a file
        #[arg(short, long)]
        signature: String,

        /// Hash the caller expects; checked, never trusted
        #[arg(long)]
        hash: Option<String>,
    },

    /// Verify a signature against the hash embedded in a signed copy
    VerifyEmbedded {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        public_key: PathBuf,

        /// Base64 signature, or @path to read it from a file
        #[arg(short, long)]
        signature: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    // Results go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config);

    match cli.command {
        Command::Keygen { bits, out_dir } => commands::keygen(bits, &out_dir, cli.json),
        Command::Sign {
            input,
            key,
            output,
            detached,
        } => commands::sign(&engine, &input, key.as_deref(), output, detached, cli.json).await,
        Command::Verify {
            input,
            public_key,
            signature,
            hash,
        } => commands::verify(&engine, &input, &public_key, &signature, hash, cli.json).await,
        Command::VerifyEmbedded {
            input,
            public_key,
            signature,
        } => commands::verify_embedded(&engine, &input, &public_key, &signature, cli.json).await,
    }
}
