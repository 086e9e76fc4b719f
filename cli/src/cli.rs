use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use erate_client::v1::EntityKind;

#[derive(Parser)]
#[command(name = "erate")]
#[command(about = "CLI for E-Rate Intelligence", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// API base URL (overrides ERATE_API_URL and the build default)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long, short = 'e')]
        email: Option<String>,

        /// Prompted for when omitted
        #[arg(long, short = 'p')]
        password: Option<String>,
    },
    /// Create an account
    Register(RegisterArgs),
    /// Forget the local session
    Logout,
    /// Show who is signed in
    Status,
    /// Look up a BEN, CRN or SPIN
    Validate {
        /// ben, crn or spin
        kind: EntityKind,

        number: String,
    },
    /// Upload a CSV file to an import endpoint
    Upload {
        /// Endpoint path, e.g. /consultant/schools/upload
        endpoint: String,

        file: PathBuf,
    },
    /// Manage push notification subscriptions
    Push {
        #[command(subcommand)]
        action: PushAction,
    },
    /// Fetch a list endpoint and show it as a table
    Table(TableArgs),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Prompted for when omitted
    #[arg(long, short = 'p')]
    pub password: Option<String>,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub company_name: Option<String>,

    /// consultant, vendor or applicant
    #[arg(long)]
    pub role: Option<String>,
}

#[derive(Subcommand)]
pub enum PushAction {
    /// Print the server's VAPID public key
    Key,
    /// Register a push subscription
    Subscribe(PushArgs),
    /// Remove a push subscription
    Unsubscribe(PushArgs),
}

#[derive(Args)]
pub struct PushArgs {
    #[arg(long)]
    pub endpoint: String,

    #[arg(long)]
    pub p256dh: String,

    #[arg(long)]
    pub auth: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// List endpoint path, e.g. /vendor/predicted-leads
    pub path: String,

    /// Keep rows containing this text in any field
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Column to sort by
    #[arg(long, short = 's')]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page to show (1-indexed)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page; remembered for next time
    #[arg(long)]
    pub rows: Option<usize>,

    /// Columns to show, comma separated
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Identity field names, comma separated
    #[arg(long, value_delimiter = ',', default_value = "ben,billed_entity_number")]
    pub identity: Vec<String>,

    /// Select rows by identity
    #[arg(long, num_args = 1..)]
    pub select: Vec<String>,

    /// Select every row on the shown page
    #[arg(long)]
    pub select_all: bool,

    /// POST each selected row to this endpoint
    #[arg(long)]
    pub add_to: Option<String>,

    /// Identities already added; shown as such and never re-added
    #[arg(long, num_args = 1..)]
    pub added: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_table_args() {
        let cli = Cli::try_parse_from([
            "erate",
            "table",
            "/vendor/predicted-leads",
            "--filter",
            "springfield",
            "--sort",
            "amount",
            "--desc",
            "--columns",
            "ben,entity_name,amount",
            "--select",
            "1",
            "2",
            "--add-to",
            "/vendor/leads",
        ])
        .expect("parse");

        let Commands::Table(args) = cli.command else {
            panic!("expected table command");
        };
        assert_eq!(args.path, "/vendor/predicted-leads");
        assert_eq!(args.filter.as_deref(), Some("springfield"));
        assert!(args.desc);
        assert_eq!(args.page, 1);
        assert_eq!(args.columns, vec!["ben", "entity_name", "amount"]);
        assert_eq!(args.identity, vec!["ben", "billed_entity_number"]);
        assert_eq!(args.select, vec!["1", "2"]);
        assert_eq!(args.add_to.as_deref(), Some("/vendor/leads"));
    }

    #[test]
    fn test_parse_validate_kind() {
        let cli = Cli::try_parse_from(["erate", "validate", "SPIN", "143000001"]).expect("parse");
        let Commands::Validate { kind, number } = cli.command else {
            panic!("expected validate command");
        };
        assert_eq!(kind, EntityKind::Spin);
        assert_eq!(number, "143000001");

        assert!(Cli::try_parse_from(["erate", "validate", "frn", "1"]).is_err());
    }

    #[test]
    fn test_desc_requires_sort() {
        assert!(Cli::try_parse_from(["erate", "table", "/x", "--desc"]).is_err());
    }
}
