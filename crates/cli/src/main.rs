// COREP CLI - headless Own Funds report assistant
// One invocation = one event against a persisted report session.

mod assist;
mod exit_codes;
mod export;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use corep_config::Settings;
use corep_engine::{ReconcileError, ReportSession};
use corep_io::IoError;

use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "corep")]
#[command(about = "Populate and compare the COREP Own Funds report (headless)")]
#[command(version)]
struct Cli {
    /// Session file (defaults to the settings value, then ~/.config/corep/session.json)
    #[arg(long, global = true, env = "COREP_SESSION")]
    session: Option<PathBuf>,

    /// Settings file (defaults to ~/.config/corep/settings.toml)
    #[arg(long, global = true, env = "COREP_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity on stderr (-v debug, -vv trace). RUST_LOG wins if set.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List report fields in template order
    Fields,

    /// Show the report table, deltas and the audit record
    Show {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Describe a scenario in plain language and apply the inferred update
    #[command(after_help = "\
Examples:
  corep ask 'We invested 10m in UK Gilts'
  corep ask 'Retail mortgage book of 75m'")]
    Ask {
        /// Message sent to the assistant
        query: String,
    },

    /// Upload a document and apply the extracted update
    Upload {
        /// Document to send (PDF, text)
        file: PathBuf,
    },

    /// Apply a collaborator result given as JSON (field update or full response)
    #[command(after_help = "\
Examples:
  corep apply '{\"field_id\":\"row_retail_exposure\",\"value\":75,\"rule_ref\":\"CRR Art.123\",\"reasoning\":\"Retail mortgage book\"}'
  cat response.json | corep apply - --source upload")]
    Apply {
        /// JSON payload, or '-' to read stdin
        payload: String,

        /// Which collaborator produced the payload
        #[arg(long, value_enum, default_value = "chat")]
        source: SourceArg,
    },

    /// Edit a field directly (recorded as a manual override)
    #[command(after_help = "\
Examples:
  corep set row_sovereign_exposure 12.5
  corep set row_retail_exposure unset")]
    Set {
        /// Field identifier (see `corep fields`)
        field_id: String,

        /// Amount in report units, or 'unset'
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Lock, unlock or toggle the comparison baseline
    Baseline {
        #[arg(value_enum, default_value = "toggle")]
        action: BaselineAction,
    },

    /// Signed change against the baseline (0 when none is locked)
    Diff {
        /// Single field; omit for all fields
        field_id: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Write the report as CSV or JSON
    #[command(after_help = "\
Examples:
  corep export
  corep export -o - | column -t -s,
  corep export --format json -o report.json --fingerprint")]
    Export {
        /// Output path, '-' for stdout (defaults to the configured file name)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[arg(long, short = 'f', value_enum, default_value = "csv")]
        format: FormatArg,

        /// Print the sha256 of the exported bytes
        #[arg(long)]
        fingerprint: bool,
    },

    /// Reset every field, the audit record and the baseline
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Chat,
    Upload,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BaselineAction {
    Toggle,
    Lock,
    Unlock,
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = Context::load(cli.config.as_deref(), cli.session).and_then(|ctx| match cli.command {
        Commands::Fields => report::cmd_fields(),
        Commands::Show { json } => report::cmd_show(&ctx, json),
        Commands::Ask { query } => assist::cmd_ask(&ctx, &query),
        Commands::Upload { file } => assist::cmd_upload(&ctx, &file),
        Commands::Apply { payload, source } => report::cmd_apply(&ctx, &payload, source),
        Commands::Set { field_id, value } => report::cmd_set(&ctx, &field_id, &value),
        Commands::Baseline { action } => report::cmd_baseline(&ctx, action),
        Commands::Diff { field_id, json } => report::cmd_diff(&ctx, field_id.as_deref(), json),
        Commands::Export { output, format, fingerprint } => {
            export::cmd_export(&ctx, output, format, fingerprint)
        }
        Commands::Clear => report::cmd_clear(&ctx),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================================================
// Context: settings + session location
// ============================================================================

pub struct Context {
    pub settings: Settings,
    pub session_path: PathBuf,
}

impl Context {
    fn load(config: Option<&Path>, session: Option<PathBuf>) -> Result<Self, CliError> {
        let settings = Settings::load(config).map_err(CliError::config)?;
        let session_path = session.unwrap_or_else(|| settings.session_path());
        tracing::debug!(session = %session_path.display(), "context loaded");
        Ok(Self { settings, session_path })
    }

    pub fn load_session(&self) -> Result<ReportSession, CliError> {
        corep_io::session::load(&self.session_path).map_err(|e| {
            CliError::io(e).with_hint("remove the session file or pass --session to start fresh")
        })
    }

    fn save_session(&self, session: &ReportSession) -> Result<(), CliError> {
        corep_io::session::save(&self.session_path, session).map_err(CliError::io)
    }

    /// Run one event against the session: lock, load, edit, save. The lock
    /// is held throughout so concurrent invocations apply one after another.
    /// Nothing is saved when `edit` fails.
    pub fn update_session<T>(
        &self,
        edit: impl FnOnce(&mut ReportSession) -> Result<T, CliError>,
    ) -> Result<T, CliError> {
        let _lock = corep_io::session::lock(&self.session_path).map_err(CliError::io)?;
        let mut session = self.load_session()?;
        let out = edit(&mut session)?;
        self.save_session(&session)?;
        Ok(out)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(err: corep_config::ConfigError) -> Self {
        Self { code: EXIT_CONFIG, message: err.to_string(), hint: None }
    }

    pub fn io(err: IoError) -> Self {
        Self { code: EXIT_IO, message: err.to_string(), hint: None }
    }

    pub fn reconcile(err: ReconcileError) -> Self {
        let code = exit_codes::reconcile_exit_code(&err);
        let hint = match &err {
            ReconcileError::UnknownField(_) => Some("run `corep fields` for valid identifiers".to_string()),
            ReconcileError::MalformedInput(_) => {
                Some("an update needs at least \"field_id\" and \"value\"".to_string())
            }
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn assistant(err: corep_assistant::AssistantError) -> Self {
        use corep_assistant::AssistantError;

        let code = exit_codes::assistant_exit_code(&err);
        let hint = match &err {
            AssistantError::Network(_) => {
                Some("is the assistant backend running? set COREP_ASSISTANT_URL or assistant.endpoint".to_string())
            }
            AssistantError::Http(status, _) if *status >= 500 => Some("the backend failed; retry the request".to_string()),
            _ => None,
        };
        Self {
            code,
            message: format!("assistant request failed: {err}"),
            hint,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
