use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use treebank_parser::parse_document;
use treebank_protocol::{AnnotationRow, Deprel, Upos};
use treebank_store::{ExportFormat, Session, SessionConfig};
use treebank_validator::check_tree;

#[derive(Parser)]
#[command(author, version, about = "Builds and checks CoNLL-U dependency treebank files")]
struct Cli {
    /// JSON session config ({ "annotator", "extra_isolating", "strict_tree" })
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tokens of a sentence with their IDs
    Tokenize {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Tag a sentence from a JSON array of rows and write the CoNLL-U output
    Annotate {
        #[arg(short, long)]
        text: String,
        #[arg(short, long, value_name = "FILE")]
        rows: PathBuf,
        #[arg(short, long)]
        annotator: Option<String>,
        /// Existing .conllu/.txt files to extend
        #[arg(long, value_name = "FILE")]
        seed: Vec<PathBuf>,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Refuse sentences whose dependency tree is malformed
        #[arg(long)]
        strict: bool,
    },
    /// Check that files parse and that every sentence is a well-formed tree
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Join files into one canonical CoNLL-U document
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// List the UPOS and DEPREL tags with their descriptions
    Tags,
}

#[derive(Serialize)]
struct TokenLine<'a> {
    id: u32,
    form: &'a str,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let data = fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
    let config = serde_json::from_str(&data).with_context(|| format!("parsing config {:?}", path))?;
    debug!(?config, "loaded config");
    Ok(config)
}

fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<(String, String)>> {
    paths
        .iter()
        .map(|path| {
            let content = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            Ok((path.display().to_string(), content))
        })
        .collect()
}

/// Imports `paths` into the session, printing the files that failed.
/// Returns the number of failures.
fn import_files(session: &mut Session, paths: &[PathBuf]) -> anyhow::Result<usize> {
    let files = read_files(paths)?;
    let report = session.import_batch(files.iter().map(|(name, content)| (name.as_str(), content.as_str())));
    for file in &report.imported {
        info!(file = %file.name, sentences = file.sentences, "imported");
    }
    for failed in &report.failed {
        eprintln!("✗ couldn't parse {}: {}", failed.name, failed.error);
    }
    Ok(report.failed.len())
}

fn write_output(output: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("writing {:?}", path))?;
            println!("✅ Written to {:?}", path);
        }
        None => print!("{}", contents),
    }
    Ok(())
}

fn export_format(path: &Path) -> ExportFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
        .unwrap_or(ExportFormat::Conllu)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Tokenize { text, json } => {
            let tokens = config.tokenizer().surface_tokens(&text);
            if json {
                let lines: Vec<TokenLine> = tokens
                    .iter()
                    .map(|t| TokenLine { id: t.id.get(), form: &t.form })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                for token in &tokens {
                    println!("{}\t{}", token.id, token.form);
                }
            }
        }

        Command::Annotate { text, rows, annotator, seed, output, strict } => {
            if annotator.is_some() {
                config.annotator = annotator;
            }
            config.strict_tree |= strict;

            let mut session = Session::new(config);
            if import_files(&mut session, &seed)? > 0 {
                bail!("some seed files could not be parsed");
            }

            session.begin_sentence(&text)?;

            let data = fs::read_to_string(&rows).with_context(|| format!("reading rows {:?}", rows))?;
            let rows: Vec<AnnotationRow> =
                serde_json::from_str(&data).with_context(|| format!("parsing rows {:?}", rows))?;
            for row in rows {
                let id = row.id;
                session.add_row(row).with_context(|| format!("row {}", id))?;
            }

            if !session.can_serialize() {
                if let Some(coverage) = session.coverage() {
                    eprintln!("✗ untagged tokens: {:?}", coverage.missing);
                }
            }
            session.serialize()?;

            let export = session.export(output.as_deref().map_or(ExportFormat::Conllu, export_format));
            info!(file = %export.file_name, "export ready");
            write_output(output.as_deref(), &export.contents)?;
        }

        Command::Check { files } => {
            let mut failures = 0;
            for (name, content) in read_files(&files)? {
                let doc = match parse_document(&content) {
                    Ok(doc) => doc,
                    Err(err) => {
                        eprintln!("✗ {}: {}", name, err);
                        failures += 1;
                        continue;
                    }
                };

                let mut clean = true;
                for (n, sentence) in doc.sentences.iter().enumerate() {
                    let rows: Vec<AnnotationRow> = sentence.rows().cloned().collect();
                    for issue in check_tree(&rows) {
                        eprintln!("✗ {} sentence {}: {}", name, n + 1, issue);
                        clean = false;
                    }
                }
                if clean {
                    println!("✅ {}: {} sentences, {} tokens", name, doc.sentences.len(), doc.token_count());
                } else {
                    failures += 1;
                }
            }
            if failures > 0 {
                bail!("{} of {} files have problems", failures, files.len());
            }
        }

        Command::Merge { files, output } => {
            let mut session = Session::new(config);
            let failed = import_files(&mut session, &files)?;
            println!(
                "📖 Merged {} sentences from {} files ({} skipped)",
                session.output().sentence_count(),
                files.len() - failed,
                failed
            );
            write_output(Some(&output), &session.export(export_format(&output)).contents)?;
        }

        Command::Tags => {
            println!("UPOS");
            for tag in Upos::ALL {
                println!("  {:<8}{}", tag, tag.description());
            }
            println!("DEPREL");
            for tag in Deprel::ALL {
                println!("  {:<16}{}", tag, tag.description());
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
