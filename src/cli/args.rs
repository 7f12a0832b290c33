//! CLI argument definitions using clap
//!
//! Commands:
//! - schoolgate serve [--config <path>] [--port <port>]
//! - schoolgate seed --output <path>
//! - schoolgate hash-passwords --input <path> [--output <path>]
//! - schoolgate check-user --email <email> --role <role>
//! - schoolgate query --template <sql> [--value <v>]...
//! - schoolgate login --email <email> --password <pw> --role <role>
//! - schoolgate whoami [--role <role>]
//! - schoolgate logout

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Directory holding the persisted client session by default
pub const DEFAULT_SESSION_DIR: &str = "./.schoolgate";

/// schoolgate - role-based login service for a school LMS
#[derive(Parser, Debug)]
#[command(name = "schoolgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to a .json or .toml configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to bind to (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Write the demo data set as a JSON store file
    Seed {
        /// Output file
        #[arg(long)]
        output: PathBuf,
    },

    /// Replace plaintext passwords in a JSON store with argon2 hashes
    HashPasswords {
        /// Store file to read
        #[arg(long)]
        input: PathBuf,

        /// File to write (defaults to rewriting the input)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Look a user up through the query shim
    CheckUser {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        email: String,

        #[arg(long)]
        role: String,
    },

    /// Run a SQL-like template through the query shim
    ///
    /// Each `{}` in the template is a value slot, filled in order from
    /// `--value`. Values are read as JSON when they parse, otherwise as text.
    Query {
        #[arg(long)]
        config: Option<PathBuf>,

        /// e.g. "SELECT * FROM {} WHERE email = {}"
        #[arg(long)]
        template: String,

        #[arg(long = "value")]
        values: Vec<String>,
    },

    /// Log in and persist the client session
    Login {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        role: String,

        #[arg(long, default_value = DEFAULT_SESSION_DIR)]
        session_dir: PathBuf,
    },

    /// Check the persisted session against a role
    Whoami {
        /// Role the route requires
        #[arg(long)]
        role: Option<String>,

        #[arg(long, default_value = DEFAULT_SESSION_DIR)]
        session_dir: PathBuf,
    },

    /// Clear the persisted session
    Logout {
        #[arg(long, default_value = DEFAULT_SESSION_DIR)]
        session_dir: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
