//! Super Fruit headless runner
//!
//! Usage:
//!   super-fruit --seed 42 --spins 100 --bet APPLE=2 --bet BAR
//!   super-fruit --config machine.yaml --turbo --auto-coin --trace trace.json
//!   super-fruit --spins 1000 --json

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use sf_machine::{Machine, MachineConfig, MachineError, SessionStats, SymbolKind};
use sf_stage::{LogSink, SharedRecorder, StageTrace, TraceSummary};

#[derive(Parser)]
#[command(name = "super-fruit", about = "Play a headless Super Fruit session")]
struct Cli {
    /// Machine config (.json, .yaml or .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Spins to play
    #[arg(short = 'n', long, default_value_t = 10)]
    spins: u32,

    /// Stake as SYMBOL or SYMBOL=N, repeatable (default APPLE=1)
    #[arg(short, long = "bet", value_parser = parse_bet)]
    bets: Vec<(SymbolKind, u32)>,

    /// Use turbo reel timing
    #[arg(long)]
    turbo: bool,

    /// Insert coins whenever the stake can't be covered
    #[arg(long)]
    auto_coin: bool,

    /// Write the recorded cue trace as JSON
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_bet(s: &str) -> Result<(SymbolKind, u32), String> {
    let (name, count) = match s.split_once('=') {
        Some((name, count)) => {
            let count = count
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("bad stake '{}': {}", count, e))?;
            (name, count)
        }
        None => (s, 1),
    };
    let symbol = name.parse::<SymbolKind>().map_err(|e| e.to_string())?;
    if !symbol.is_bettable() {
        return Err(format!("{} cannot carry a stake", symbol));
    }
    Ok((symbol, count))
}

/// End-of-session report
#[derive(Debug, Serialize)]
struct Report {
    seed: Option<u64>,
    spins_requested: u32,
    spins_played: u64,
    credits: u64,
    message: String,
    rtp: f64,
    hit_rate: f64,
    stats: SessionStats,
    logical_ms: f64,
    trace: TraceSummary,
}

/// Config file (or defaults) with the command-line overrides applied
fn machine_config(cli: &Cli) -> Result<MachineConfig> {
    let mut config = match &cli.config {
        Some(path) => MachineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MachineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    // Turbo halves the configured delays rather than replacing them
    if cli.turbo {
        config.timing = config.timing.accelerated();
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = machine_config(&cli)?;
    let seed = config.seed;

    let recorder = SharedRecorder::new();
    let mut machine = Machine::from_config(config)
        .context("Invalid machine config")?
        .with_cue_sink(LogSink)
        .with_cue_sink(recorder.clone());

    let bets = if cli.bets.is_empty() {
        vec![(SymbolKind::Apple, 1)]
    } else {
        cli.bets.clone()
    };
    place_bets(&mut machine, &bets, cli.auto_coin)?;

    log::info!(
        "Playing {} spins with {} staked",
        cli.spins,
        machine.session().total_bet()
    );

    let mut played = 0;
    while played < cli.spins {
        match machine.request_spin() {
            Ok(_) => {
                machine.run_until_idle().context("Reel fault")?;
                played += 1;
            }
            Err(MachineError::InsufficientCredits { .. }) if cli.auto_coin => {
                machine.insert_coin();
            }
            Err(MachineError::InsufficientCredits { needed, available }) => {
                log::warn!(
                    "Out of credits after {} spins ({} needed, {} left)",
                    played,
                    needed,
                    available
                );
                break;
            }
            Err(err) => return Err(err).context("Spin refused"),
        }
    }
    // Let any last deferred award land
    machine.run_until_idle().context("Reel fault")?;

    let trace = StageTrace::from_events(
        format!("super-fruit-{}", Utc::now().format("%Y%m%d-%H%M%S")),
        "super_fruit",
        recorder.drain(),
    )
    .with_metadata("seed", serde_json::json!(seed))
    .with_metadata("spins", serde_json::json!(played));

    if let Some(path) = &cli.trace {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &trace)
            .context("Failed to write trace")?;
        log::info!("Wrote {} cues to {}", trace.events.len(), path.display());
    }

    let snapshot = machine.snapshot();
    let report = Report {
        seed,
        spins_requested: cli.spins,
        spins_played: snapshot.stats.total_spins,
        credits: snapshot.credits,
        message: snapshot.message.clone(),
        rtp: snapshot.stats.rtp(),
        hit_rate: snapshot.stats.hit_rate(),
        stats: snapshot.stats.clone(),
        logical_ms: machine.now(),
        trace: trace.summary(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn place_bets(machine: &mut Machine, bets: &[(SymbolKind, u32)], auto_coin: bool) -> Result<()> {
    for &(symbol, count) in bets {
        let mut placed = 0;
        while placed < count {
            match machine.place_bet(symbol) {
                Ok(_) => placed += 1,
                Err(MachineError::InsufficientHeadroom) if auto_coin => {
                    machine.insert_coin();
                }
                Err(err) => {
                    bail!("Could not stake {}×{}: {}", symbol, count, err);
                }
            }
        }
    }
    Ok(())
}

fn print_report(report: &Report) {
    let stats = &report.stats;
    println!("SUPER FRUIT: {}", report.message);
    println!();
    println!("  Spins:        {} ({} free)", report.spins_played, stats.free_spins_played);
    println!("  Credits:      {}", report.credits);
    println!("  Wagered:      {}", stats.total_wagered);
    println!("  Won:          {}", stats.total_won);
    println!("  Biggest win:  {}", stats.max_win);
    println!("  RTP:          {:.2}%", report.rtp);
    println!("  Hit rate:     {:.2}%", report.hit_rate);
    println!(
        "  Bonuses:      {} LUCK, {} collection, {} rage, {} jackpot",
        stats.luck_hits, stats.collection_bonuses, stats.free_spin_bonuses, stats.jackpots
    );
    println!("  Coins in:     {}", stats.coins_inserted);
    println!(
        "  Clock:        {:.1}s logical, {} cues",
        report.logical_ms / 1000.0,
        report.trace.event_count
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bet() {
        assert_eq!(parse_bet("APPLE=3"), Ok((SymbolKind::Apple, 3)));
        assert_eq!(parse_bet("bar"), Ok((SymbolKind::Bar, 1)));
        assert_eq!(parse_bet("77=2"), Ok((SymbolKind::Seven, 2)));
        assert!(parse_bet("LUCK=1").is_err());
        assert!(parse_bet("APPLE=x").is_err());
        assert!(parse_bet("CHERRY").is_err());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "super-fruit",
            "--seed",
            "42",
            "--spins",
            "5",
            "--bet",
            "APPLE=2",
            "--bet",
            "BELL",
            "--turbo",
            "--json",
        ]);
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.spins, 5);
        assert_eq!(cli.bets, vec![(SymbolKind::Apple, 2), (SymbolKind::Bell, 1)]);
        assert!(cli.turbo && cli.json && !cli.auto_coin);
    }

    #[test]
    fn test_turbo_scales_loaded_timing() {
        let path = std::env::temp_dir().join(format!("super-fruit-{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "timing:\n  decel_window: 12\n  collection_bonus_delay_ms: 3000.0\n",
        )
        .unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let cli = Cli::parse_from(["super-fruit", "--config", &path_arg, "--turbo", "-s", "3"]);
        let config = machine_config(&cli).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.seed, Some(3));
        assert_eq!(config.timing.decel_window, 12);
        assert_eq!(config.timing.collection_bonus_delay_ms, 1500.0);
        assert_eq!(config.timing.start_delay_ms, 15.0);
    }

    #[test]
    fn test_turbo_without_config_matches_preset() {
        let cli = Cli::parse_from(["super-fruit", "--turbo"]);
        let config = machine_config(&cli).unwrap();
        assert_eq!(config.timing, sf_machine::ReelTiming::turbo());
    }
}
