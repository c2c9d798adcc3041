//! privatize CLI binary entry point.
//!
//! ## Usage
//!
//! ```bash
//! # Print the transformed sources
//! privatize transform src/
//!
//! # Rename @internal members too, with a custom prefix, into dist/
//! privatize --include-internal --prefix priv_ transform src/ --out-dir dist/
//!
//! # Show the resolved configuration as JSON
//! privatize --format json config
//!
//! # Structured JSON logs on stderr
//! privatize --log-level debug --log-format json transform src/
//! ```
//!
//! Errors are always emitted as a JSON envelope on stdout, and the process
//! exits with the error's code.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use privatize::cli::{collect_inputs, run_config, run_transform};
use privatize::config::{CliOverrides, ResolvedConfig};
use privatize::error::{OutputErrorCode, PrivatizeError};
use privatize::output::{emit_response, ConfigResponse, ErrorResponse, TransformResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Prefix private TypeScript class members and their accesses.
#[derive(Parser, Debug)]
#[command(name = "privatize", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

/// Global arguments applicable to all commands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output on stderr.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Format of the tracing output on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Configuration file (default: privatize.json in the current directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also rename members tagged `@internal`.
    #[arg(long, global = true)]
    include_internal: bool,

    /// Prefix for renamed members.
    #[arg(long, global = true)]
    prefix: Option<String>,
}

impl GlobalArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            include_internal: self.include_internal.then_some(true),
            prefix: self.prefix.clone(),
            config_path: self.config.clone(),
        }
    }
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Tracing output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// How successful results are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Transformed source, or a short summary.
    #[default]
    Text,
    /// The JSON response envelope.
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rename private members in TypeScript files.
    ///
    /// Directories are searched for `.ts` files (declaration files excluded).
    /// All inputs are checked together, so accesses in one file resolve to
    /// members declared in another.
    Transform {
        /// Files or directories to transform.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write results under this directory instead of printing them.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Show the resolved configuration and where each value came from.
    Config,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().flatten_event(true).init(),
    }
}

fn execute(cli: Cli) -> Result<(), PrivatizeError> {
    let working_dir = std::env::current_dir().map_err(|e| PrivatizeError::io(".", &e))?;
    let overrides = cli.global.overrides();
    let format = cli.global.format;

    match cli.command {
        Command::Transform { paths, out_dir } => {
            let resolved = ResolvedConfig::resolve(&working_dir, &overrides)?;
            execute_transform(&resolved, &paths, out_dir, format)
        }
        Command::Config => execute_config(&working_dir, &overrides, format),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

fn execute_transform(
    resolved: &ResolvedConfig,
    paths: &[PathBuf],
    out_dir: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), PrivatizeError> {
    let inputs = collect_inputs(paths)?;
    let response = run_transform(&inputs, resolved.transformer_config(), out_dir.as_deref())?;

    let mut stdout = io::stdout().lock();
    let written = match format {
        OutputFormat::Json => emit_response(&response, &mut stdout),
        OutputFormat::Text => write_transform_text(&response, &mut stdout),
    };
    written.map_err(|e| PrivatizeError::internal(e.to_string()))
}

fn execute_config(
    working_dir: &Path,
    overrides: &CliOverrides,
    format: OutputFormat,
) -> Result<(), PrivatizeError> {
    let response = run_config(working_dir, overrides)?;

    let mut stdout = io::stdout().lock();
    let written = match format {
        OutputFormat::Json => emit_response(&response, &mut stdout),
        OutputFormat::Text => write_config_text(&response, &mut stdout),
    };
    written.map_err(|e| PrivatizeError::internal(e.to_string()))
}

/// One file's source goes out as-is. Several files are each preceded by a
/// `// <path>` line.
fn write_transform_text(response: &TransformResponse, out: &mut impl Write) -> io::Result<()> {
    let banner = response.files.len() > 1;
    for file in &response.files {
        match (&file.output, &file.written_to) {
            (Some(output), _) => {
                if banner {
                    writeln!(out, "// {}", file.path)?;
                }
                write!(out, "{}", output)?;
            }
            (None, Some(target)) => writeln!(out, "{} -> {}", file.path, target)?,
            (None, None) => {}
        }
    }
    out.flush()
}

fn write_config_text(response: &ConfigResponse, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "includeInternal = {} ({})",
        response.include_internal.value, response.include_internal.source
    )?;
    writeln!(
        out,
        "customPrefix = {:?} ({})",
        response.prefix.value, response.prefix.source
    )?;
    if let Some(path) = &response.config_file {
        writeln!(out, "config file: {}", path)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_parsing {
        use super::*;

        #[test]
        fn transform_defaults() {
            let cli = Cli::try_parse_from(["privatize", "transform", "src"]).unwrap();
            assert!(matches!(cli.global.log_level, LogLevel::Warn));
            assert_eq!(cli.global.log_format, LogFormat::Text);
            assert_eq!(cli.global.format, OutputFormat::Text);
            assert!(!cli.global.include_internal);
            assert!(cli.global.prefix.is_none());
            match cli.command {
                Command::Transform { paths, out_dir } => {
                    assert_eq!(paths, vec![PathBuf::from("src")]);
                    assert!(out_dir.is_none());
                }
                _ => panic!("expected Transform"),
            }
        }

        #[test]
        fn global_flags_after_subcommand() {
            let args = [
                "privatize",
                "transform",
                "a.ts",
                "b.ts",
                "--out-dir",
                "dist",
                "--include-internal",
                "--prefix",
                "p_",
                "--format",
                "json",
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(cli.global.include_internal);
            assert_eq!(cli.global.format, OutputFormat::Json);
            let overrides = cli.global.overrides();
            assert_eq!(overrides.include_internal, Some(true));
            assert_eq!(overrides.prefix.as_deref(), Some("p_"));
            match cli.command {
                Command::Transform { paths, out_dir } => {
                    assert_eq!(paths.len(), 2);
                    assert_eq!(out_dir, Some(PathBuf::from("dist")));
                }
                _ => panic!("expected Transform"),
            }
        }

        #[test]
        fn unset_include_internal_is_not_an_override() {
            let cli = Cli::try_parse_from(["privatize", "config"]).unwrap();
            assert!(cli.global.overrides().include_internal.is_none());
            assert!(matches!(cli.command, Command::Config));
        }

        #[test]
        fn json_log_format() {
            let cli = Cli::try_parse_from([
                "privatize",
                "transform",
                "src",
                "--log-format",
                "json",
            ])
            .unwrap();
            assert_eq!(cli.global.log_format, LogFormat::Json);
            assert!(Cli::try_parse_from(["privatize", "--log-format", "xml", "config"]).is_err());
        }

        #[test]
        fn transform_requires_paths() {
            assert!(Cli::try_parse_from(["privatize", "transform"]).is_err());
        }

        #[test]
        fn config_path_and_log_level() {
            let cli = Cli::try_parse_from([
                "privatize",
                "--config",
                "build/privatize.json",
                "--log-level",
                "debug",
                "config",
            ])
            .unwrap();
            assert!(matches!(cli.global.log_level, LogLevel::Debug));
            assert_eq!(
                cli.global.overrides().config_path,
                Some(PathBuf::from("build/privatize.json"))
            );
        }
    }

    mod text_output {
        use super::*;
        use privatize::output::FileResult;

        #[test]
        fn single_file_prints_source_only() {
            let response = TransformResponse::new(
                false,
                "_",
                vec![FileResult {
                    path: "a.ts".to_string(),
                    written_to: None,
                    output: Some("let a = 1;\n".to_string()),
                }],
            );
            let mut buf = Vec::new();
            write_transform_text(&response, &mut buf).unwrap();
            assert_eq!(String::from_utf8(buf).unwrap(), "let a = 1;\n");
        }

        #[test]
        fn several_files_get_banners_and_written_files_a_summary() {
            let response = TransformResponse::new(
                false,
                "_",
                vec![
                    FileResult {
                        path: "a.ts".to_string(),
                        written_to: None,
                        output: Some("let a = 1;\n".to_string()),
                    },
                    FileResult {
                        path: "b.ts".to_string(),
                        written_to: Some("out/b.ts".to_string()),
                        output: None,
                    },
                ],
            );
            let mut buf = Vec::new();
            write_transform_text(&response, &mut buf).unwrap();
            assert_eq!(
                String::from_utf8(buf).unwrap(),
                "// a.ts\nlet a = 1;\nb.ts -> out/b.ts\n"
            );
        }
    }
}
