//! `kvc`: build a client instance from a connection string and inspect or
//! tweak its settings.
//!
//! Connection options mirror the classic tool flags, so `-h` is the host
//! and help is `--help` only.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};

use crate::Result;
use crate::cntl::Instance;
use crate::config::ConnDefaults;
use crate::telemetry::LogForwarder;

mod commands;
mod connection;
mod render;

pub use connection::{Resolved, build_dsn};

// =============================================================================
// Entry + global options
// =============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "kvc",
    version,
    about = "Inspect and apply KV client settings",
    infer_subcommands = true,
    infer_long_args = true,
    arg_required_else_help = true,
    disable_help_flag = true
)]
pub struct Cli {
    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Machine-readable JSON output.
    #[arg(
        long,
        global = true,
        default_value_t = false,
        num_args = 0..=1,
        value_parser = BoolishValueParser::new()
    )]
    pub json: bool,

    /// Verbose output (repeat for more). Also raises the client console log level.
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub conn: ConnArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options that end up in the connection string.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnArgs {
    /// Hosts to bootstrap from, separated by `;` or `,` (default: localhost).
    #[arg(short = 'h', long, value_name = "HOSTS")]
    pub host: Option<String>,

    /// Bucket to connect to (default: default).
    #[arg(short = 'b', long)]
    pub bucket: Option<String>,

    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Bucket (or administrator) password.
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Force this SASL mechanism.
    #[arg(short = 'S', long)]
    pub saslmech: Option<String>,

    /// Operation timeout in seconds.
    #[arg(short = 't', long, value_name = "SECONDS")]
    pub timeout: Option<u32>,

    #[arg(short = 'C', long, value_enum)]
    pub bootstrap_protocol: Option<BootstrapProtocol>,

    /// Path of the cluster config cache file.
    #[arg(short = 'Z', long, value_name = "PATH")]
    pub config_cache: Option<String>,

    #[arg(short = 's', long, value_parser = ["on", "off", "no_verify"])]
    pub ssl: Option<String>,

    /// CA certificate used to verify the server.
    #[arg(long, value_name = "PATH")]
    pub certpath: Option<String>,

    /// Full connection string; takes precedence over --host and --bucket.
    #[arg(short = 'U', long, value_name = "CONNSTR")]
    pub spec: Option<String>,

    /// Connect as a cluster administrator instead of to a bucket.
    #[arg(long)]
    pub admin: bool,

    /// Extra `key=value` setting applied by string key (repeatable).
    #[arg(short = 'D', long = "cntl", value_name = "KEY=VALUE", value_parser = parse_cntl_pair)]
    pub cntl: Vec<(String, String)>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapProtocol {
    Http,
    Cccp,
    Both,
}

impl BootstrapProtocol {
    pub fn as_str(self) -> &'static str {
        match self {
            BootstrapProtocol::Http => "http",
            BootstrapProtocol::Cccp => "cccp",
            BootstrapProtocol::Both => "both",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an instance and print its settings.
    Apply,

    /// Print the assembled connection string.
    Dsn,

    /// List every string key and the opcode it maps to.
    Keys,

    /// Read one setting by string key.
    Get(GetArgs),

    /// Save the passed connection options to the rc file.
    WriteConfig(WriteConfigArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// String key, as listed by `kvc keys`.
    pub key: String,
}

#[derive(Args, Debug)]
pub struct WriteConfigArgs {
    /// Destination (default: $KVC_RC or ~/.kvcrc).
    pub path: Option<PathBuf>,
}

// =============================================================================
// Public API
// =============================================================================

/// Parse CLI from raw args, tolerating `--snake_case` and mixed-case flags.
pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let raw: Vec<OsString> = args.into_iter().map(|t| t.into()).collect();
    Cli::parse_from(normalize_args(raw))
}

/// Run the CLI (used by bin).
///
/// `forwarder` is the subscriber's forwarding slot; the logger of the
/// instance a command builds is installed into it.
pub fn run(cli: Cli, forwarder: LogForwarder) -> Result<()> {
    let config = crate::config::load_or_default();
    let ctx = Ctx {
        json: cli.json,
        verbose: cli.verbose,
        args: cli.conn,
        defaults: config.connection,
        forwarder,
    };

    match cli.command {
        Commands::Apply => commands::apply::handle(&ctx),
        Commands::Dsn => commands::dsn::handle(&ctx),
        Commands::Keys => commands::keys::handle(&ctx),
        Commands::Get(args) => commands::get::handle(&ctx, &args.key),
        Commands::WriteConfig(args) => commands::write_config::handle(&ctx, args.path),
    }
}

// =============================================================================
// Context + helpers
// =============================================================================

struct Ctx {
    json: bool,
    verbose: u8,
    args: ConnArgs,
    defaults: ConnDefaults,
    forwarder: LogForwarder,
}

impl Ctx {
    fn resolved(&self) -> Resolved {
        Resolved::new(&self.args, &self.defaults)
    }

    /// Build the instance and route log events to the logger it installed.
    fn instance(&self) -> Result<Instance> {
        let instance = connection::build_instance(&self.resolved(), self.verbose)?;
        self.forwarder.install(instance.settings().logger.clone());
        Ok(instance)
    }
}

/// Print `human` or, with `--json`, `json`.
fn print_out(ctx: &Ctx, human: &str, json: &serde_json::Value) -> Result<()> {
    use std::io::Write;

    let s = if ctx.json {
        format!("{json:#}")
    } else {
        human.to_string()
    };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{s}")
        && e.kind() != std::io::ErrorKind::BrokenPipe
    {
        return Err(e.into());
    }
    Ok(())
}

fn parse_cntl_pair(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

fn normalize_args(mut raw: Vec<OsString>) -> Vec<OsString> {
    if raw.is_empty() {
        return raw;
    }

    let mut out = Vec::with_capacity(raw.len());
    out.push(raw.remove(0)); // program name

    for arg in raw {
        let s = arg.to_string_lossy();
        if s.starts_with("--") {
            let (flag, val) = match s.split_once('=') {
                Some((flag, val)) => (flag, Some(val)),
                None => (s.as_ref(), None),
            };
            let canon = canonical_flag(&flag.to_lowercase().replace('_', "-")).to_string();
            match val {
                Some(v) => out.push(OsString::from(format!("{canon}={v}"))),
                None => out.push(OsString::from(canon)),
            }
        } else {
            out.push(arg);
        }
    }
    out
}

fn canonical_flag(flag: &str) -> &str {
    match flag {
        "--user" => "--username",
        "--capath" => "--certpath",
        "--connstr" | "--dsn" => "--spec",
        "--bootstrap-on" => "--bootstrap-protocol",
        other => other,
    }
}
