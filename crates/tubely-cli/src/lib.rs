//! Operator tooling for a Tubely deployment.
//!
//! Reads the same environment (and `.env`) as the API server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "tubely", about = "Tubely operator CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Mint a bearer token for a user
    Token {
        /// User UUID written into the token subject
        #[arg(long)]
        user: Uuid,
        /// Token lifetime in hours (defaults to JWT_EXPIRY_HOURS)
        #[arg(long)]
        hours: Option<i64>,
    },
    /// Turn a stored "bucket,key" reference into a signed URL
    SignUrl {
        /// Compound reference as stored on the video record
        reference: String,
        /// URL lifetime in seconds (defaults to SIGNED_URL_TTL_SECS)
        #[arg(long)]
        ttl_secs: Option<u64>,
    },
    /// Report the dimensions and aspect class ffprobe sees in a local file
    Probe {
        /// Path to the video file
        file: PathBuf,
    },
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
