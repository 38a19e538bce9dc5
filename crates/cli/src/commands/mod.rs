use clap::{Parser, Subcommand};
use crawlgate_config::Workload;
use serde_json::Value;
use std::path::PathBuf;

pub mod credentials;
pub mod invoke;
pub mod login;
pub mod query;

#[derive(Parser, Debug)]
#[command(name = "crawlgate")]
#[command(about = "Run worker processes and serve their results", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Call a worker once and print its decoded JSON response
    Invoke {
        /// Worker profile (query, search or login)
        profile: Workload,

        /// Action name sent to the worker
        action: String,

        /// Request parameters as a JSON document
        #[arg(long, value_parser = parse_json)]
        params: Option<Value>,

        /// Discard the first line of the worker's stdout before decoding
        #[arg(long)]
        skip_banner: bool,
    },

    /// Run a bulk query, cache the rows and print them page by page
    #[command(visible_alias = "q")]
    Query {
        /// Worker profile (query or search)
        #[arg(long, default_value = "query")]
        profile: Workload,

        /// Action name sent to the worker
        action: String,

        /// Request parameters as a JSON document
        #[arg(long, value_parser = parse_json)]
        params: Option<Value>,

        /// Rows per page
        #[arg(long, default_value_t = 20)]
        page_size: usize,

        /// Print every page instead of only the first
        #[arg(long)]
        all: bool,
    },

    /// Start a QR-code login and wait for it to complete
    Login {
        /// Seconds between status checks
        #[arg(long, default_value_t = 3)]
        interval: u64,

        /// Seconds to wait before cancelling the login
        #[arg(long, default_value_t = 180)]
        give_up: u64,

        /// Where to write the QR code image
        #[arg(long, value_name = "FILE", default_value = "login_qr.png")]
        qr_out: PathBuf,
    },

    /// Print the cookies saved by the last successful login
    Credentials,
}

fn parse_json(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw)
}
