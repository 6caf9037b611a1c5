//! Minimal CLI: schema document → (check | normalize)
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use json_codec::{Codec, CodecError, SchemaDocument, Value, lower_document};

use crate::jq_exec::JqFilter;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// decode JSON/NDJSON documents against a schema document, reporting or re-encoding them
#[derive(Parser, Debug)]
#[command(name = "json-codec", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// decode every document and report which ones conform
    Check(CheckOut),
    /// decode then re-encode every document as one compact line
    Normalize(NormalizeOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is decoded on its own
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// schema document (JSON) describing the expected shape
    #[arg(long, short)]
    schema: PathBuf,

    /// always keep exact numerals, even when no codec needs them
    #[arg(long, default_value_t = false)]
    force_safe: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct NormalizeOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// output file, one document per line (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// One JSON text and where it came from (`path`, `path:line`, `path#n` for jq outputs).
struct Document {
    origin: String,
    text: String,
}

enum Outcome {
    Decoded { origin: String, normalized: String },
    Failed { origin: String, reason: String },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaSettings {
    fn load_codec(&self) -> Result<Codec<Value>> {
        let bytes = std::fs::read(&self.schema)
            .with_context(|| format!("failed to read schema document {}", self.schema.display()))?;
        let document = SchemaDocument::from_json_slice(&bytes)
            .with_context(|| format!("failed to parse schema document {}", self.schema.display()))?;
        let codec = lower_document(&document)
            .with_context(|| format!("invalid schema document {}", self.schema.display()))?;
        Ok(codec)
    }

    fn process(&self, codec: &Codec<Value>, document: Document) -> Outcome {
        let decoded = codec
            .parse_with(&document.text, self.force_safe)
            .and_then(|value| codec.stringify(&value));
        match decoded {
            Ok(normalized) => Outcome::Decoded { origin: document.origin, normalized },
            Err(error) => Outcome::Failed { origin: document.origin, reason: error.to_string() },
        }
    }
}

impl InputSettings {
    fn source_paths(&self) -> Result<Vec<PathBuf>> {
        resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")
    }

    /// Split one file into documents and apply the pointer and jq stages. Per-document
    /// problems become failed outcomes; only an unreadable file is an error.
    fn load_file(
        &self,
        source_path: &Path,
        jq: Option<&JqFilter>,
    ) -> Result<Vec<std::result::Result<Document, Outcome>>> {
        let source_path_str = source_path.to_string_lossy().to_string();
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read source file {source_path_str}"))?;

        let documents = if self.ndjson {
            source
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| Document { origin: format!("{source_path_str}:{}", i + 1), text: line.to_string() })
                .collect::<Vec<_>>()
        } else {
            vec![Document { origin: source_path_str, text: source }]
        };

        let mut out = Vec::with_capacity(documents.len());
        for document in documents {
            let selected = match self.json_pointer.as_deref() {
                None => Ok(document),
                Some(pointer) => select_pointer(document, pointer),
            };
            match (selected, jq) {
                (Err(failed), _) => out.push(Err(failed)),
                (Ok(document), None) => out.push(Ok(document)),
                (Ok(document), Some(jq)) => match jq.run(&document.text) {
                    Ok(results) => {
                        for (n, text) in results.into_iter().enumerate() {
                            out.push(Ok(Document { origin: format!("{}#{n}", document.origin), text }));
                        }
                    }
                    Err(error) => out.push(Err(Outcome::Failed {
                        origin: document.origin,
                        reason: format!("jq expression failed: {error:#}"),
                    })),
                },
            }
        }
        Ok(out)
    }

    fn run_all(&self, schema_settings: &SchemaSettings, codec: &Codec<Value>) -> Result<Vec<Outcome>> {
        let source_paths = self.source_paths()?;
        let jq = self.jq_expr.as_deref().map(JqFilter::compile).transpose()?;
        tracing::debug!(files = source_paths.len(), jq = jq.is_some(), "processing inputs");
        let per_file = source_paths
            .par_iter()
            .map(|source_path| -> Result<Vec<Outcome>> {
                let documents = self.load_file(source_path, jq.as_ref())?;
                Ok(documents
                    .into_iter()
                    .map(|document| match document {
                        Ok(document) => schema_settings.process(codec, document),
                        Err(failed) => failed,
                    })
                    .collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(per_file.into_iter().flatten().collect())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }
                let codec = target.schema_settings.load_codec()?;
                let outcomes = target.input_settings.run_all(&target.schema_settings, &codec)?;

                let mut failed = 0usize;
                for outcome in &outcomes {
                    match outcome {
                        Outcome::Decoded { origin, .. } => println!("✅ {}", origin.as_str().green()),
                        Outcome::Failed { origin, reason } => {
                            failed += 1;
                            println!("❌ {}: {}", origin.as_str().red(), reason);
                        }
                    }
                }
                eprintln!("{} passed, {} failed", outcomes.len() - failed, failed);
                Ok(exit_status(failed))
            }
            Command::Normalize(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }
                let codec = target.schema_settings.load_codec()?;
                let outcomes = target.input_settings.run_all(&target.schema_settings, &codec)?;

                let mut failed = 0usize;
                let mut lines = String::new();
                for outcome in outcomes {
                    match outcome {
                        Outcome::Decoded { normalized, .. } => {
                            lines.push_str(&normalized);
                            lines.push('\n');
                        }
                        Outcome::Failed { origin, reason } => {
                            failed += 1;
                            eprintln!("❌ {}: {}", origin.as_str().red(), reason);
                        }
                    }
                }

                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("failed to create {}", parent.display()))?;
                    }
                    std::fs::write(out, &lines).with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    print!("{lines}");
                }
                Ok(exit_status(failed))
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn exit_status(failed: usize) -> ExitCode {
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::from(1) }
}

fn select_pointer(document: Document, pointer: &str) -> std::result::Result<Document, Outcome> {
    let fail = |origin: String, reason: String| Outcome::Failed { origin, reason };
    let value = match serde_json::from_str::<serde_json::Value>(&document.text) {
        Ok(value) => value,
        Err(error) => return Err(fail(document.origin, CodecError::from(error).to_string())),
    };
    match value.pointer(pointer) {
        Some(node) => match serde_json::to_string(node) {
            Ok(text) => Ok(Document { origin: document.origin, text }),
            Err(error) => Err(fail(document.origin, error.to_string())),
        },
        None => Err(fail(document.origin, format!("JSON pointer {pointer} selects nothing"))),
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
