use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use playtone::playback::{spawn_player, Finish, TracingTone};
use playtone::{parse_tune_file, PlayError, PlayerConfig, Timeline, TuneFile, TuneMetadata};

#[derive(Parser)]
#[command(name = "playtone")]
#[command(about = "Play GW-BASIC PLAY tunes on a tone generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Perform a tune in real time
    Play {
        #[command(flatten)]
        source: Source,

        /// YAML player configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop a repeating tune after this many passes
        #[arg(short, long)]
        passes: Option<u32>,
    },

    /// Print the timing of one pass
    Timeline {
        #[command(flatten)]
        source: Source,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Report the first error in a tune, if any
    Check {
        #[command(flatten)]
        source: Source,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Tune file, optionally with YAML front matter
    file: Option<PathBuf>,

    /// Tune text given inline
    #[arg(long)]
    tune: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Serialize)]
struct Rendered<'a> {
    #[serde(flatten)]
    metadata: &'a TuneMetadata,
    #[serde(flatten)]
    timeline: &'a Timeline,
}

impl Source {
    fn read(&self) -> Result<TuneFile, PlayError> {
        match (&self.tune, &self.file) {
            (Some(tune), _) => parse_tune_file(tune),
            (None, Some(path)) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    PlayError::Io(std::io::Error::new(
                        e.kind(),
                        format!("reading '{}': {}", path.display(), e),
                    ))
                })?;
                parse_tune_file(&content)
            }
            (None, None) => Err(PlayError::ConfigError("no tune given".to_string())),
        }
    }
}

fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn play(source: Source, config: Option<PathBuf>, passes: Option<u32>) -> Result<(), PlayError> {
    let config = match config {
        Some(path) => PlayerConfig::load(&path)?,
        None => PlayerConfig::default(),
    };
    init_logging(config.log_filter.as_deref().unwrap_or("info"));

    let file = source.read()?;
    if let Some(title) = &file.metadata.title {
        info!(title, composer = file.metadata.composer.as_deref(), "playing");
    }

    let mut options = config.player_options();
    if passes.is_some() {
        options.max_passes = passes;
    }

    let mut handle = spawn_player(TracingTone::new(config.channel), options);
    handle.start(file.tune)?;

    let finished = tokio::select! {
        status = handle.wait_for_stop() => Some(status?),
        _ = tokio::signal::ctrl_c() => None,
    };
    if finished.is_none() {
        info!("interrupted, stopping");
        handle.stop()?;
    }

    let status = handle.shutdown().await?;
    match status.last_finish {
        Some(Finish::Failed(err)) => Err(err.into()),
        finish => {
            info!(passes = status.passes, ?finish, "done");
            Ok(())
        }
    }
}

fn timeline(source: Source, format: Format) -> Result<(), PlayError> {
    init_logging("warn");

    let file = source.read()?;
    let timeline = playtone::render_timeline(&file.tune)?;
    let rendered = Rendered {
        metadata: &file.metadata,
        timeline: &timeline,
    };

    let output = match format {
        Format::Json => serde_json::to_string_pretty(&rendered).map_err(|e| PlayError::Serialization(e.to_string()))?,
        Format::Yaml => serde_yaml::to_string(&rendered).map_err(|e| PlayError::Serialization(e.to_string()))?,
    };
    println!("{}", output);
    Ok(())
}

fn check(source: Source) -> Result<(), PlayError> {
    init_logging("warn");

    let file = source.read()?;
    let events = playtone::check(&file.tune)?;
    if events == 0 {
        warn!("tune has no notes or rests");
    }
    eprintln!("OK: {} events", events);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            source,
            config,
            passes,
        } => play(source, config, passes).await,
        Commands::Timeline { source, format } => timeline(source, format),
        Commands::Check { source } => check(source),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
