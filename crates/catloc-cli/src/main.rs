use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use i18n_embed::fluent::{fluent_language_loader, FluentLanguageLoader};
use i18n_embed::{DesktopLanguageRequester, LanguageLoader};
use once_cell::sync::OnceCell;
use rust_embed::RustEmbed;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod commands;
mod ui;

include!(concat!(env!("OUT_DIR"), "/supported_locales.rs"));

/// Version stamped into every JSON payload the CLI prints itself; report
/// DTOs carry their own `schema_version` field.
pub const OUTPUT_SCHEMA_VERSION: u32 = catloc_domain::SCHEMA_VERSION;

#[derive(RustEmbed)]
#[folder = "i18n"]
struct Localizations;

pub static LANG_LOADER: OnceCell<FluentLanguageLoader> = OnceCell::new();

#[derive(Parser)]
#[command(name = "catloc", version, about = crate::tr!("help-about"))]
struct Cli {
    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// UI language for messages (one of the bundled locales, e.g. "en", "es")
    #[arg(long)]
    ui_lang: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bulk-import catalog rows from a delimited file
    Import {
        /// Path to the delimited file
        #[arg(short, long)]
        file: PathBuf,

        /// Field delimiter (defaults to [import].delimiter or ',')
        #[arg(long)]
        delimiter: Option<char>,

        /// Validate and report without writing anything
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Write a ready-to-fill example file for the bulk importer
    Template {
        /// Output path (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Field delimiter (defaults to [import].delimiter or ',')
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Synthesize missing locales for one item via machine translation
    Sync {
        /// Entity kind: category, card, daily_tip or deep_talk
        #[arg(long)]
        kind: String,

        /// Store id of the item
        #[arg(long)]
        id: String,

        /// Source locale (defaults to source_locale or the registry default)
        #[arg(long)]
        source: Option<String>,

        /// Comma-separated target locales (defaults to the missing ones)
        #[arg(long)]
        targets: Option<String>,

        /// One provider call per item instead of one per field
        #[arg(long, default_value_t = false)]
        batch: bool,

        /// Translate but do not persist
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete an item together with its translations and dependent children
    Delete {
        /// Entity kind: category, card, daily_tip or deep_talk
        #[arg(long)]
        kind: String,

        /// Store id of the item
        #[arg(long)]
        id: String,

        /// Skip the confirmation gate
        #[arg(long, default_value_t = false)]
        yes: bool,
    },

    /// Dump JSON Schemas for the report DTOs
    Schema {
        /// Output directory
        #[arg(long, default_value = "")]
        out_dir: PathBuf,
    },
}

trait Runnable {
    fn run(self, use_color: bool) -> Result<()>;
}

impl Runnable for Commands {
    fn run(self, use_color: bool) -> Result<()> {
        match self {
            Commands::Import {
                file,
                delimiter,
                dry_run,
                format,
            } => commands::import::run_import(file, delimiter, dry_run, format, use_color),
            Commands::Template { out, delimiter } => commands::template::run_template(out, delimiter),
            Commands::Sync {
                kind,
                id,
                source,
                targets,
                batch,
                dry_run,
                format,
            } => commands::sync::run_sync(kind, id, source, targets, batch, dry_run, format, use_color),
            Commands::Delete { kind, id, yes } => commands::delete::run_delete(kind, id, yes),
            Commands::Schema { out_dir } => commands::schema::run_schema(out_dir),
        }
    }
}

fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = rolling::daily("logs", "catloc.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stdout)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

/// `--ui-lang` has to be known before clap renders any text, so it is read
/// from the raw args ahead of parsing. Clap still owns the flag itself.
fn requested_ui_lang() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--ui-lang" {
            return args.next();
        }
        if let Some(value) = arg.strip_prefix("--ui-lang=") {
            return Some(value.to_string());
        }
    }
    None
}

fn init_i18n(requested: Option<&str>) {
    let loader = fluent_language_loader!();
    let languages: Vec<unic_langid::LanguageIdentifier> = match requested {
        Some(code) => {
            if !SUPPORTED_LOCALES.contains(&code) {
                tracing::warn!(event = "ui_lang_unbundled", lang = code);
            }
            code.parse().ok().into_iter().collect()
        }
        None => DesktopLanguageRequester::requested_languages(),
    };
    if i18n_embed::select(&loader, &Localizations, &languages).is_err() {
        let fallback = loader.fallback_language().clone();
        let _ = i18n_embed::select(&loader, &Localizations, &[fallback]);
    }
    let _ = LANG_LOADER.set(loader);
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = init_tracing();
    init_i18n(requested_ui_lang().as_deref());

    let cli = Cli::parse();
    if let Some(lang) = cli.ui_lang.as_deref() {
        tracing::debug!(event = "ui_lang_selected", lang = lang);
    }

    let use_color = !cli.no_color
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();

    cli.cmd.run(use_color)
}
