//! CLI binary for recipebox.
//!
//! A thin shim over the library crate: maps flags and environment variables
//! to `ImportConfig`, opens a store and either serves the HTTP API or runs a
//! single command.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use recipebox::pipeline::encode::load_pdf;
use recipebox::render::{render_listing, render_recipe};
use recipebox::server::{self, AppState};
use recipebox::{
    render_notes, ImportConfig, ImportConfigBuilder, ImportProgressCallback, ImportSource,
    ImportStage, Importer, MemoryStore, PgRecipeStore, ProgressCallback, RecipeId, RecipeStore,
};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that shows the current import stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Importing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ImportProgressCallback for CliProgressCallback {
    fn on_import_start(&self, kind: &str) {
        self.bar.set_message(format!("{kind} input"));
    }

    fn on_stage(&self, stage: ImportStage) {
        self.bar.set_message(stage.label());
    }

    fn on_import_complete(&self, _id: RecipeId) {
        self.bar.finish_and_clear();
    }

    fn on_import_error(&self, _error: &str) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the JSON API backed by Postgres
  DATABASE_URL=postgres://localhost/recipes recipebox serve

  # Serve without a database (recipes are lost on exit)
  recipebox --in-memory serve --port 8080

  # Import from a URL, pasted text or a PDF
  recipebox import https://example.com/best-pancakes
  pbpaste | recipebox import -
  recipebox import --pdf grandmas-stew.pdf

  # Show what the model extracts without storing it
  recipebox --in-memory import --dry-run https://example.com/best-pancakes

  # Browse the catalog
  recipebox list
  recipebox show 6f1c2a8e-3b7d-4c1e-9a52-0d4f7e8b9c10

  # Render a notes string
  recipebox notes notes.txt

ENVIRONMENT VARIABLES:
  DATABASE_URL                Postgres connection string
  ANTHROPIC_API_KEY           Hosted Messages API key
  RECIPEBOX_MODEL             Model ID (default: claude-sonnet-4-6)
  RECIPEBOX_PROVIDER          edgequake-llm provider name (openai, gemini, ollama, ...)
  RECIPEBOX_MAX_TOKENS        Output-token budget for the extraction call
  RECIPEBOX_MAX_INPUT_CHARS   Characters of page or pasted text sent to the model
  RECIPEBOX_HOST              Bind address for `serve`
  RECIPEBOX_PORT              Port for `serve`
  RECIPEBOX_MAX_REQUEST_BYTES Import body limit for `serve` (default 32 MiB)
  RUST_LOG                    Overrides --verbose / --quiet log filtering
"#;

/// Import recipes from text, URLs and PDFs into a personal catalog.
#[derive(Parser, Debug)]
#[command(
    name = "recipebox",
    version,
    about = "Import recipes from text, URLs and PDFs into a personal catalog",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    model: ModelArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "RECIPEBOX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "RECIPEBOX_QUIET")]
    quiet: bool,
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Postgres connection string.
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Keep recipes in process memory instead of Postgres.
    #[arg(long, global = true)]
    in_memory: bool,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Model ID.
    #[arg(long, global = true, env = "RECIPEBOX_MODEL")]
    model: Option<String>,

    /// edgequake-llm provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, global = true, env = "RECIPEBOX_PROVIDER")]
    provider: Option<String>,

    /// Hosted Messages API key.
    #[arg(long, global = true, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Output-token budget for the extraction call.
    #[arg(long, global = true, env = "RECIPEBOX_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Characters of page or pasted text sent to the model.
    #[arg(long, global = true, env = "RECIPEBOX_MAX_INPUT_CHARS")]
    max_input_chars: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API.
    Serve {
        /// Bind address.
        #[arg(long, env = "RECIPEBOX_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port.
        #[arg(long, env = "RECIPEBOX_PORT", default_value_t = 3000)]
        port: u16,

        /// Largest accepted import request body, in bytes (base64 PDFs included).
        #[arg(long, env = "RECIPEBOX_MAX_REQUEST_BYTES")]
        max_request_bytes: Option<usize>,
    },

    /// Import one recipe from a URL or pasted text (`-` reads stdin).
    Import {
        /// Recipe page URL, recipe text, or `-` for stdin.
        #[arg(required_unless_present = "pdf")]
        input: Option<String>,

        /// Import from a PDF file instead.
        #[arg(long, conflicts_with = "input")]
        pdf: Option<PathBuf>,

        /// Print the extracted JSON without storing it.
        #[arg(long)]
        dry_run: bool,

        /// Disable the progress spinner.
        #[arg(long)]
        no_progress: bool,
    },

    /// List stored recipes, newest first.
    List {
        /// Print JSON instead of one line per recipe.
        #[arg(long)]
        json: bool,
    },

    /// Show one stored recipe.
    Show {
        /// Recipe id.
        id: RecipeId,

        /// Print JSON instead of Markdown.
        #[arg(long)]
        json: bool,
    },

    /// Render a notes string from a file, or stdin when no file is given.
    Notes {
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The import spinner covers what INFO logs would say; `serve` keeps INFO.
    let serving = matches!(cli.command, Command::Serve { .. });
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || !serving {
        "error"
    } else {
        "info,tower_http=debug"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            ref host,
            port,
            max_request_bytes,
        } => {
            let store = open_store(&cli.store).await?;
            let mut builder = config_builder(&cli.model);
            if let Some(n) = max_request_bytes {
                builder = builder.max_request_bytes(n);
            }
            let config = builder.build().context("Invalid configuration")?;
            let importer =
                Importer::from_config(config, store).context("Failed to configure model backend")?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            server::serve(listener, AppState::new(importer))
                .await
                .context("Server error")?;
        }

        Command::Import {
            ref input,
            ref pdf,
            dry_run,
            no_progress,
        } => {
            let source = read_source(input.as_deref(), pdf.as_ref()).await?;

            let progress: Option<ProgressCallback> = if cli.quiet || no_progress {
                None
            } else {
                Some(CliProgressCallback::new() as Arc<dyn ImportProgressCallback>)
            };
            let mut builder = config_builder(&cli.model);
            if let Some(cb) = progress {
                builder = builder.progress_callback(cb);
            }
            let config = builder.build().context("Invalid configuration")?;

            let store: Arc<dyn RecipeStore> = if dry_run {
                Arc::new(MemoryStore::new())
            } else {
                open_store(&cli.store).await?
            };
            let importer =
                Importer::from_config(config, store).context("Failed to configure model backend")?;

            if dry_run {
                let extraction = match importer.extract(&source).await {
                    Ok(extraction) => extraction,
                    Err(e) if e.is_extraction_failure() => anyhow::bail!("{}", e.user_message()),
                    Err(e) => return Err(e).context("Extraction failed"),
                };
                let json = serde_json::to_string_pretty(&extraction.recipe)
                    .context("Failed to serialise recipe")?;
                println!("{json}");
                return Ok(());
            }

            let id = match importer.import(&source).await {
                Ok(id) => id,
                Err(e) if e.is_extraction_failure() => anyhow::bail!("{}", e.user_message()),
                Err(e) => return Err(e).context("Import failed"),
            };
            if !cli.quiet {
                eprintln!("{} imported {}", green("✔"), dim(&id.to_string()));
            }
            println!("{id}");
        }

        Command::List { json } => {
            let store = open_store(&cli.store).await?;
            let recipes = store.list().await.context("Failed to list recipes")?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&recipes).context("Failed to serialise listing")?
                );
            } else if recipes.is_empty() {
                if !cli.quiet {
                    eprintln!("{}", dim("no recipes yet"));
                }
            } else {
                println!("{}", render_listing(&recipes));
            }
        }

        Command::Show { id, json } => {
            let store = open_store(&cli.store).await?;
            let Some(recipe) = store.get(id).await.context("Failed to load recipe")? else {
                anyhow::bail!("{} recipe {} not found", red("✘"), id);
            };
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&recipe).context("Failed to serialise recipe")?
                );
            } else {
                write_stdout(&render_recipe(&recipe))?;
            }
        }

        Command::Notes { ref file } => {
            let notes = match file {
                Some(path) => tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read notes from {:?}", path))?,
                None => read_stdin()?,
            };
            write_stdout(&render_notes(&notes))?;
        }
    }

    Ok(())
}

/// Map the shared model flags onto an `ImportConfig` builder.
fn config_builder(args: &ModelArgs) -> ImportConfigBuilder {
    let mut builder = ImportConfig::builder();

    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref key) = args.api_key {
        builder = builder.api_key(key);
    }
    if let Some(n) = args.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(n) = args.max_input_chars {
        builder = builder.max_input_chars(n);
    }
    builder
}

async fn open_store(args: &StoreArgs) -> Result<Arc<dyn RecipeStore>> {
    if args.in_memory {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let url = args
        .database_url
        .as_deref()
        .context("DATABASE_URL is not set (or pass --in-memory)")?;
    let store = PgRecipeStore::connect(url)
        .await
        .context("Failed to connect to Postgres")?;
    store
        .run_migrations()
        .await
        .context("Failed to apply schema")?;
    Ok(Arc::new(store))
}

async fn read_source(input: Option<&str>, pdf: Option<&PathBuf>) -> Result<ImportSource> {
    if let Some(path) = pdf {
        let document = load_pdf(path)
            .await
            .with_context(|| format!("Failed to load PDF {:?}", path))?;
        return Ok(ImportSource::Pdf(document));
    }

    let text = match input {
        Some("-") => read_stdin()?,
        Some(text) => text.to_string(),
        None => String::new(),
    };
    if text.trim().is_empty() {
        anyhow::bail!("No input provided");
    }
    Ok(ImportSource::from_input(&text))
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    write_text(&mut stdout.lock(), text)
}

/// Write `text`, ending it with a newline if it lacks one.
fn write_text(out: &mut impl Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        out.write_all(b"\n").context("Failed to write to stdout")?;
    }
    Ok(())
}
