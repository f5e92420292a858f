//! jsdocr: generate API documentation from JSDoc-annotated JavaScript.
//!
//! Reads `/** ... */` comments from the given sources (or stdin), resolves
//! every symbol's longname, overloads, borrows, mixins, implementations and
//! inheritance, and writes the result as JSON or Markdown:
//!
//! - `jsdocr < soup.js`
//! - `jsdocr -f markdown -o docs/api.md lib/ src/*.mjs`

mod extract;
mod render;
mod toc;

use anyhow::{Context, Result};
use clap::Parser;
use doclet_core::{Config, Dictionary, Session, UnknownTags};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jsdocr",
    about = "Generate API documentation from JSDoc comments in JavaScript sources"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads from stdin.
    files: Vec<String>,

    /// Output file (defaults to stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: json, markdown. Defaults to the output file's
    /// extension, then json.
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// JSON configuration file (`{"tags": {...}}`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tag dictionary to load (jsdoc, closure). Can be given multiple times
    /// and replaces the configured list.
    #[arg(long = "dictionary")]
    dictionaries: Vec<String>,

    /// Reject tags that no loaded dictionary defines
    #[arg(long)]
    no_unknown_tags: bool,

    /// Log debug output
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = load_config(&cli)?;
    let session = Session::new(Dictionary::from_config(&config.tags));

    let docset = if cli.files.is_empty() {
        stdin_mode(session)?
    } else {
        file_mode(session, &cli.files)?
    };

    let format = cli
        .format
        .as_deref()
        .or_else(|| cli.output.as_deref().and_then(render::format_for_path))
        .unwrap_or("json");
    let renderer = render::create_renderer(format)?;
    let doclets: Vec<_> = docset.documented().collect();
    let output = renderer.render(&doclets)?;

    match &cli.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
            }
            fs::write(path, &output).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), doclets = doclets.len(), "wrote documentation");
        }
        None => print!("{}", output),
    }
    Ok(())
}

/// Logs go to stderr. `JSDOCR_LOG` takes precedence over `-v`/`-q`.
fn init_tracing(cli: &Cli) {
    let fallback = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("JSDOCR_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// The `--config` file, if any, with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            Config::from_json(&text).with_context(|| format!("invalid config: {}", path.display()))?
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli.dictionaries, cli.no_unknown_tags);
    Ok(config)
}

fn apply_overrides(config: &mut Config, dictionaries: &[String], no_unknown_tags: bool) {
    if !dictionaries.is_empty() {
        config.tags.dictionaries = dictionaries.to_vec();
    }
    if no_unknown_tags {
        config.tags.allow_unknown_tags = UnknownTags::All(false);
    }
}

/// stdin mode: one anonymous source.
fn stdin_mode(mut session: Session) -> Result<doclet_core::Docset> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let name = "<stdin>".to_string();
    session.begin(std::slice::from_ref(&name));
    add_source(&mut session, Path::new(&name), &input);
    session.finish().context("failed to resolve doclets")
}

/// file mode: every matched source, in sorted order.
fn file_mode(mut session: Session, patterns: &[String]) -> Result<doclet_core::Docset> {
    let input_files = expand_globs(patterns)?;
    if input_files.is_empty() {
        anyhow::bail!("no input files found");
    }

    let names: Vec<String> = input_files.iter().map(|p| p.display().to_string()).collect();
    session.begin(&names);
    for path in &input_files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        add_source(&mut session, path, &content);
    }
    session.finish().context("failed to resolve doclets")
}

fn add_source(session: &mut Session, path: &Path, content: &str) {
    let filename = path.display().to_string();
    session.file_begin(&filename);
    let comments = extract::scan(content, path);
    debug!(file = %filename, comments = comments.len(), "scanned");
    for raw in &comments {
        session.add_comment(raw);
    }
    session.file_complete();
}

/// File extensions recognized as source files.
const SUPPORTED_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // Directories are scanned non-recursively
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && has_supported_extension(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!(pattern = %pattern, "no files matched");
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}
