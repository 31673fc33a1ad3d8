use clap::{ArgAction, Parser, ValueEnum, error::ErrorKind};
use engine_config::settings::options::TailOptions;
use model::execution::poll::OutputMode;
use std::path::PathBuf;

pub const TRY_HELP: &str = "Try pg-tail --help for more information.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Aligned columns with a header line
    Text,
    /// One JSON object per row
    Json,
}

impl From<Format> for OutputMode {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputMode::AlignedText,
            Format::Json => OutputMode::StructuredPerRow,
        }
    }
}

/// `-h` is the host, as in `psql`, so help is `-?` or `--help`.
#[derive(Parser, Debug)]
#[command(
    name = "pg-tail",
    version = concat!("v", env!("CARGO_PKG_VERSION")),
    about = "Print the last rows of a Postgres table, then keep printing new ones as they arrive",
    disable_help_flag = true,
    disable_version_flag = true,
    arg_required_else_help = true
)]
pub struct TailArgs {
    #[arg(short = 'd', long, help = "Database to connect to")]
    pub dbname: Option<String>,

    #[arg(short = 'h', long, help = "Database server host")]
    pub host: Option<String>,

    #[arg(short = 'p', long, help = "Database server port")]
    pub port: Option<u16>,

    #[arg(short = 'U', long, help = "Database user name")]
    pub username: Option<String>,

    #[arg(short = 'W', long, help = "Prompt for a password before connecting")]
    pub password: bool,

    #[arg(long, help = "TLS mode: disable, prefer or require")]
    pub sslmode: Option<String>,

    #[arg(short = 't', long, help = "Table to tail, optionally schema-qualified")]
    pub table: Option<String>,

    #[arg(
        short = 'c',
        long,
        value_delimiter = ',',
        help = "Columns to print, comma-separated; the first one is the key"
    )]
    pub columns: Vec<String>,

    #[arg(short = 'i', long, help = "Seconds to wait between polls [default: 10]")]
    pub interval: Option<u64>,

    #[arg(
        short = 's',
        long,
        allow_hyphen_values = true,
        help = "Column separator; disables alignment [default: \" | \"]"
    )]
    pub separator: Option<String>,

    #[arg(
        short = 'n',
        long,
        allow_negative_numbers = true,
        help = "Number of rows in the initial snapshot [default: 5]"
    )]
    pub lines: Option<i64>,

    #[arg(short = 'f', long, value_enum, help = "Output format [default: text]")]
    pub format: Option<Format>,

    #[arg(long, help = "Read PG* variables from this file as well")]
    pub env_file: Option<PathBuf>,

    #[arg(long, help = "Log progress to stderr")]
    pub verbose: bool,

    #[arg(short = '?', long, action = ArgAction::Help, help = "Print help")]
    help: Option<bool>,

    #[arg(short = 'v', long, action = ArgAction::Version, help = "Print version")]
    version: Option<bool>,
}

impl TailArgs {
    pub fn to_options(&self) -> TailOptions {
        TailOptions {
            dbname: self.dbname.clone(),
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            sslmode: self.sslmode.clone(),
            table: self.table.clone(),
            columns: self.columns.clone(),
            interval: self.interval,
            separator: self.separator.clone(),
            lines: self.lines,
            format: self.format.map(OutputMode::from),
        }
    }
}

/// Whether clap stopped because the user asked for help or the version,
/// rather than because of a bad invocation.
pub fn is_informational(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<TailArgs, clap::Error> {
        TailArgs::try_parse_from(std::iter::once("pg-tail").chain(args.iter().copied()))
    }

    #[test]
    fn test_short_flags_match_psql() {
        let args = parse(&[
            "-d", "app", "-h", "db.internal", "-p", "6432", "-U", "tailer", "-t", "events",
            "-c", "id,msg", "-i", "2", "-n", "20",
        ])
        .unwrap();

        assert_eq!(args.dbname.as_deref(), Some("app"));
        assert_eq!(args.host.as_deref(), Some("db.internal"));
        assert_eq!(args.port, Some(6432));
        assert_eq!(args.username.as_deref(), Some("tailer"));
        assert_eq!(args.columns, vec!["id", "msg"]);
        assert_eq!(args.interval, Some(2));
        assert_eq!(args.lines, Some(20));
    }

    #[test]
    fn test_options_carry_only_what_was_given() {
        let args = parse(&["-t", "events", "-c", "id", "-s", "\t", "-f", "json"]).unwrap();
        let opts = args.to_options();

        assert_eq!(opts.table.as_deref(), Some("events"));
        assert_eq!(opts.separator.as_deref(), Some("\t"));
        assert_eq!(opts.format, Some(OutputMode::StructuredPerRow));
        assert_eq!(opts.host, None);
        assert_eq!(opts.interval, None);
    }

    #[test]
    fn test_separator_and_lines_accept_leading_dash() {
        let args = parse(&["-t", "events", "-c", "id", "-s", "-", "-n", "-3"]).unwrap();
        assert_eq!(args.separator.as_deref(), Some("-"));
        assert_eq!(args.lines, Some(-3));
    }

    #[test]
    fn test_help_and_version_are_informational() {
        let help = parse(&["--help"]).unwrap_err();
        assert!(is_informational(help.kind()));

        let short_help = parse(&["-?"]).unwrap_err();
        assert_eq!(short_help.kind(), ErrorKind::DisplayHelp);

        let version = parse(&["-v"]).unwrap_err();
        assert_eq!(version.kind(), ErrorKind::DisplayVersion);
        assert!(version.to_string().contains("pg-tail v"));

        let bare = parse(&[]).unwrap_err();
        assert!(is_informational(bare.kind()));
    }

    #[test]
    fn test_unknown_option_is_an_invocation_error() {
        let err = parse(&["-t", "events", "-x"]).unwrap_err();
        assert!(!is_informational(err.kind()));
    }
}
