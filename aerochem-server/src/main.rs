mod autopilot;
mod enrichment;
mod reports;
mod server;

use aerochem_game::{
    AirportCatalog, BuiltinData, DataLoader, EventTable, GameConfig, GameService, build_sessions,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

use autopilot::{Autopilot, DEFAULT_MAX_TURNS, Strategy};
use enrichment::{ChemicalLookup, DelayedLookup, SourceLookup};
use reports::RunReport;
use server::GameServer;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "aerochem-server", version = "0.1.0")]
#[command(about = "AeroChem game server and autopilot runner")]
struct Args {
    /// JSON file overriding the default game rules
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve line-delimited JSON requests over TCP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:7878")]
        addr: String,

        /// Seed for session ids and content placement (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Artificial latency added to chemical lookups, in milliseconds
        #[arg(long, default_value_t = 0)]
        enrichment_delay_ms: u64,
    },
    /// Play automated games and report the results
    Play {
        /// Seeds to run (comma-separated)
        #[arg(long, default_value = "1337")]
        seeds: String,

        /// Pilot strategy
        #[arg(long, value_enum, default_value_t = Strategy::Greedy)]
        strategy: Strategy,

        /// Turn cap per game
        #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
        max_turns: u32,

        /// Output report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        report: ReportFormat,

        /// Optional path to write the report output instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the bundled airports
    Airports {
        /// Optional path to write the listing instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Serve {
            addr,
            seed,
            enrichment_delay_ms,
        } => serve(config, &addr, seed, enrichment_delay_ms).await,
        Command::Play {
            seeds,
            strategy,
            max_turns,
            report,
            output,
        } => play(config, &seeds, strategy, max_turns, report, output),
        Command::Airports { output } => list_airports(output),
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

async fn serve(config: GameConfig, addr: &str, seed: Option<u64>, delay_ms: u64) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    let timeout = Duration::from_millis(config.enrichment_timeout_ms);
    let sessions = build_sessions(&BuiltinData::with_config(config), seed)
        .context("failed to load game data")?;

    let builtin: Arc<dyn ChemicalLookup> = Arc::new(SourceLookup::builtin());
    let lookup: Arc<dyn ChemicalLookup> = if delay_ms > 0 {
        Arc::new(DelayedLookup::new(builtin, Duration::from_millis(delay_ms)))
    } else {
        builtin
    };

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;
    println!("{} {local}", "✈️  AeroChem server listening on".bright_cyan().bold());
    stdout().flush()?;
    log::info!("serving on {local} with seed {seed}");

    GameServer::new(GameService::new(sessions), lookup, timeout)
        .serve(listener)
        .await
}

fn play(
    config: GameConfig,
    seeds: &str,
    strategy: Strategy,
    max_turns: u32,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let seeds = parse_seeds(seeds)?;
    let loader = BuiltinData::with_config(config);
    let autopilot = Autopilot::new(
        loader.load_catalog()?,
        loader.load_config()?,
        loader.load_events()?,
    )
    .with_max_turns(max_turns);

    let start_time = Instant::now();
    let records = autopilot
        .play_all(&seeds, strategy)
        .context("autopilot made an illegal move")?;
    let report = RunReport::new(records);

    let mut output_target = OutputTarget::new(output)?;
    match format {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, &report)?,
        ReportFormat::Markdown => reports::generate_markdown_report(&mut output_target, &report)?,
        ReportFormat::Console => {
            announce_banner(&mut output_target)?;
            reports::generate_console_report(&mut output_target, &report, start_time.elapsed())?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

fn list_airports(output: Option<PathBuf>) -> Result<()> {
    let catalog = AirportCatalog::builtin().context("bundled airport data is corrupt")?;
    let events = EventTable::builtin().context("bundled event data is corrupt")?;
    let mut output_target = OutputTarget::new(output)?;
    writeln!(output_target.writer(), "Available airports:")?;
    for airport in catalog.iter() {
        writeln!(
            output_target.writer(),
            "  {:6} {:2}  {}",
            airport.ident.as_str(),
            airport.country,
            airport.name
        )?;
    }
    writeln!(
        output_target.writer(),
        "{} airports, {} monetary events",
        catalog.len(),
        events.events.len()
    )?;
    output_target.flush_inner()?;
    Ok(())
}

fn announce_banner(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", "✈️  AeroChem Autopilot".bright_cyan().bold())?;
    writeln!(out, "{}", "=====================".cyan())?;
    Ok(())
}

fn parse_seeds(raw: &str) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Ok(value) = token.parse::<u64>() {
            seeds.push(value);
        } else if let Ok(value) = token.parse::<i64>() {
            seeds.push(value.unsigned_abs());
        } else {
            bail!("invalid seed '{token}'");
        }
    }
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    Ok(seeds)
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_parse_with_negatives_and_spaces() {
        assert_eq!(parse_seeds("1, 2,-3").unwrap(), vec![1, 2, 3]);
        assert!(parse_seeds("abc").is_err());
        assert!(parse_seeds(" , ").is_err());
    }

    #[test]
    fn missing_config_uses_defaults() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg, GameConfig::default());
        assert!(load_config(Some(Path::new("/definitely/not/here.json"))).is_err());
    }

    #[test]
    fn args_parse_play_subcommand() {
        let args = Args::try_parse_from([
            "aerochem-server",
            "play",
            "--seeds",
            "4,5",
            "--strategy",
            "random",
            "--report",
            "markdown",
        ])
        .unwrap();
        match args.command {
            Command::Play {
                seeds,
                strategy,
                report,
                ..
            } => {
                assert_eq!(seeds, "4,5");
                assert_eq!(strategy, Strategy::Random);
                assert!(matches!(report, ReportFormat::Markdown));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn output_target_writes_files() {
        let path = std::env::temp_dir().join(format!("aerochem-out-{}", std::process::id()));
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        writeln!(target, "hello").unwrap();
        target.flush_inner().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
        let _ = std::fs::remove_file(path);
    }
}
