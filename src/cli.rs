//! CLI front door.
//!
//! Library-side implementation of the `privatize` commands:
//! - `transform` - Parse every input as one program, privatize each file,
//!   then print the results or write them under an output directory
//! - `config` - Report the resolved configuration and the source of each value
//!
//! ## Error Handling
//!
//! All functions return `Result<T, PrivatizeError>`, which carries the stable
//! error code the binary exits with.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use privatize_ast::print_source_file;
use privatize_core::config::{CliOverrides, ResolvedConfig, TransformerConfig};
use privatize_core::error::PrivatizeError;
use privatize_core::output::{ConfigResponse, FileResult, TransformResponse};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::checker::Checker;
use crate::program::Program;
use crate::transform::{privatize_transformer, TransformationContext};

const SOURCE_EXTENSION: &str = "ts";
const DECLARATION_SUFFIX: &str = ".d.ts";

/// Directory names never descended into.
const EXCLUDED_DIRS: &[&str] = &["node_modules", "target", "dist"];

// ============================================================================
// Input collection
// ============================================================================

/// A source file to transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    /// Location relative to the argument it was found under. Output written to
    /// `--out-dir` keeps this layout.
    pub relative: PathBuf,
}

/// A `.ts` file that is not a `.d.ts` declaration file.
pub fn is_source_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) && !name.ends_with(DECLARATION_SUFFIX)
}

fn is_excluded(relative: &Path) -> bool {
    relative.components().any(|c| {
        let name = c.as_os_str().to_string_lossy();
        name.starts_with('.') || EXCLUDED_DIRS.contains(&name.as_ref())
    })
}

/// Expand the given paths into source files.
///
/// Files are taken as given. Directories are walked in file-name order for
/// source files, skipping hidden and vendored directories. A path listed twice
/// is kept once.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>, PrivatizeError> {
    if paths.is_empty() {
        return Err(PrivatizeError::invalid_args("no input paths given"));
    }

    let mut inputs = Vec::new();
    let mut seen = HashSet::new();
    for root in paths {
        if root.is_file() {
            if seen.insert(root.clone()) {
                let relative = root
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| root.clone());
                inputs.push(InputFile {
                    path: root.clone(),
                    relative,
                });
            }
        } else if root.is_dir() {
            let before = inputs.len();
            for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    let path = e.path().unwrap_or(root).display().to_string();
                    PrivatizeError::io(path, &io::Error::from(e))
                })?;
                let path = entry.path();
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                if !entry.file_type().is_file() || is_excluded(relative) || !is_source_file(path) {
                    continue;
                }
                if seen.insert(path.to_path_buf()) {
                    inputs.push(InputFile {
                        path: path.to_path_buf(),
                        relative: relative.to_path_buf(),
                    });
                }
            }
            debug!(
                root = %root.display(),
                files = inputs.len() - before,
                "collected directory inputs"
            );
        } else {
            return Err(PrivatizeError::file_not_found(root.display().to_string()));
        }
    }
    Ok(inputs)
}

// ============================================================================
// Commands
// ============================================================================

fn read_source(path: &Path) -> Result<String, PrivatizeError> {
    fs::read_to_string(path).map_err(|e| {
        let display = path.display().to_string();
        if e.kind() == io::ErrorKind::NotFound {
            PrivatizeError::file_not_found(display)
        } else {
            PrivatizeError::io(display, &e)
        }
    })
}

fn write_output(target: &Path, text: &str) -> Result<(), PrivatizeError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| PrivatizeError::io(parent.display().to_string(), &e))?;
    }
    fs::write(target, text).map_err(|e| PrivatizeError::io(target.display().to_string(), &e))
}

/// Where each input is written under `out_dir`.
///
/// Two inputs mapping to the same target (`a/x.ts` and `b/x.ts` given as
/// separate file arguments, say) are rejected before anything is written.
pub fn output_targets(inputs: &[InputFile], out_dir: &Path) -> Result<Vec<PathBuf>, PrivatizeError> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut targets = Vec::with_capacity(inputs.len());
    for input in inputs {
        let target = out_dir.join(&input.relative);
        if let Some(first) = claimed.insert(target.clone(), &input.path) {
            return Err(PrivatizeError::invalid_args(format!(
                "{} and {} would both be written to {}",
                first.display(),
                input.path.display(),
                target.display()
            )));
        }
        targets.push(target);
    }
    Ok(targets)
}

/// Privatize `inputs` as one program.
///
/// With `out_dir`, each result is written to `out_dir/<relative path>`;
/// otherwise the transformed text is returned in the response.
pub fn run_transform(
    inputs: &[InputFile],
    config: TransformerConfig,
    out_dir: Option<&Path>,
) -> Result<TransformResponse, PrivatizeError> {
    let targets = match out_dir {
        Some(dir) => Some(output_targets(inputs, dir)?),
        None => None,
    };

    let mut program = Program::new();
    for input in inputs {
        let text = read_source(&input.path)?;
        program.add_file(input.path.display().to_string(), text)?;
    }

    let checker = Checker::new(&program);
    let include_internal = config.include_internal();
    let prefix = config.prefix().to_string();
    let before = privatize_transformer(&checker, config);
    let transform = before(&TransformationContext::new());

    let mut files = Vec::with_capacity(inputs.len());
    for (i, (input, file)) in inputs.iter().zip(program.files()).enumerate() {
        let path = input.path.display().to_string();
        let output = print_source_file(&transform(file.clone()))
            .map_err(|e| PrivatizeError::internal(format!("failed to print {}: {}", path, e)))?;
        let result = match targets.as_ref().and_then(|t| t.get(i)) {
            Some(target) => {
                write_output(target, &output)?;
                debug!(from = %path, to = %target.display(), "wrote output");
                FileResult {
                    path,
                    written_to: Some(target.display().to_string()),
                    output: None,
                }
            }
            None => FileResult {
                path,
                written_to: None,
                output: Some(output),
            },
        };
        files.push(result);
    }

    info!(files = files.len(), prefix = %prefix, include_internal, "transform complete");
    Ok(TransformResponse::new(include_internal, prefix, files))
}

/// Resolve configuration for `working_dir` and report it.
pub fn run_config(working_dir: &Path, cli: &CliOverrides) -> Result<ConfigResponse, PrivatizeError> {
    let resolved = ResolvedConfig::resolve(working_dir, cli)?;
    Ok(ConfigResponse::from_resolved(&resolved))
}
