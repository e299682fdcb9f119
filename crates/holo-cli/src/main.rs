//! Holo CLI - Build hologram packs from structure files

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, generate, languages, translate};
use holo_pack::{HoloSettings, LogBuffer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "holo")]
#[command(about = "Turn saved structures into hologram resource packs", long_about = None)]
#[command(version)]
struct Cli {
    /// Interface language (e.g. pt_BR); negotiated from the system locale when omitted
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a pack from structure files, a world or a previous pack
    Generate {
        /// Input files (.mcstructure, .mcpack, .mcworld)
        #[arg(required = true)]
        files: Vec<String>,

        /// TOML file with form values (scale, packName, author, ...)
        #[arg(long)]
        form: Option<String>,

        /// Local resource packs layered over the default stack
        #[arg(long = "resource-pack")]
        resource_packs: Vec<String>,

        /// Output directory for the generated pack
        #[arg(long, default_value = ".")]
        output: String,

        /// Generation engine to use
        #[arg(long, default_value = "mock")]
        engine: String,
    },

    /// List available interface languages
    Languages {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Resolve and render one translation key
    Translate {
        /// Translation key (e.g. metadata.pack_name)
        key: String,

        /// Count used for pluralization
        #[arg(long)]
        count: Option<i64>,

        /// Extra substitution as name=value
        #[arg(long = "sub", value_parser = parse_substitution)]
        substitutions: Vec<(String, String)>,
    },

    /// Print the generation config synthesized from a form file
    Config {
        /// TOML file with form values
        #[arg(long)]
        form: Option<String>,
    },
}

fn parse_substitution(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{}'", s)),
    }
}

fn init_tracing(settings: &HoloSettings) -> LogBuffer {
    let logs = LogBuffer::new();
    let filter = EnvFilter::try_new(settings.log_level()).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(logs.clone())
        .init();
    logs
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = HoloSettings::load().unwrap_or_else(|e| {
        eprintln!("Warning: Could not load settings: {}", e);
        HoloSettings::default()
    });
    let logs = init_tracing(&settings);
    let lang = cli.lang.as_deref();

    match cli.command {
        Commands::Generate {
            files,
            form,
            resource_packs,
            output,
            engine,
        } => generate::run(
            generate::GenerateArgs {
                files,
                form,
                resource_packs,
                output,
                engine,
            },
            lang,
            &settings,
            logs,
        ),
        Commands::Languages { format } => languages::run(&format, lang, &settings),
        Commands::Translate {
            key,
            count,
            substitutions,
        } => translate::run(&key, count, substitutions, lang, &settings),
        Commands::Config { form } => config::run(form.as_deref()),
    }
}
