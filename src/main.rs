use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use dialoguer::Select;
use treecpu::config::{Config, OutputFormat, load_config, load_config_from_path};
use treecpu::format::describe;
use treecpu::logging;
use treecpu::report;
use treecpu::sampler::Sampler;
use treecpu::system::collector::Collector;
use treecpu::system::lookup::{CommandLine, match_candidates};
use treecpu::system::{SnapshotDiffer, platform};

#[derive(Parser)]
#[command(
    name = "treecpu",
    about = "Sample the total CPU time of a process and everything it spawns"
)]
struct Cli {
    /// Pid to monitor, or text to look for in process names and command lines
    target: String,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sample interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Number of sample intervals; 0 runs forever
    #[arg(short, long)]
    count: Option<u64>,

    /// Clock ticks per second used to convert CPU counters
    #[arg(long)]
    tick_rate: Option<u64>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Also report every continuing process
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Log level for stderr: error, warn, info, debug, trace, off
    #[arg(long)]
    log_level: Option<String>,

    /// Also write debug logs and span timings to this file as JSON lines
    #[arg(long)]
    log_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    let level = logging::parse_level(&config.logging.level)?;
    logging::init(level, config.logging.json_file.as_deref())?;

    let collector = Collector::new();
    let pid = resolve_target(&cli.target, &collector)?;

    let sampling = &config.sampling;
    let table = platform::host_table(sampling.clock_ticks_per_sec);
    let sampler = Sampler::new(
        table,
        pid,
        Duration::from_secs(sampling.interval_secs),
        SnapshotDiffer::new(sampling.clock_ticks_per_sec),
    )
    .wrap_err_with(|| format!("could not monitor pid {pid}"))?;

    let output = &config.output;
    if output.format == OutputFormat::Text {
        println!("{}", report::header(pid, collector.command_line(pid).as_ref()));
    }

    sampler.run(sampling.count, |sample| -> Result<()> {
        match output.format {
            OutputFormat::Text => println!("{}", report::render_text(&sample, output.verbose)),
            OutputFormat::Json => println!("{}", report::render_json(&sample, output.verbose)?),
        }
        Ok(())
    })?;

    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(interval) = cli.interval {
        config.sampling.interval_secs = interval;
    }
    if let Some(count) = cli.count {
        config.sampling.count = count;
    }
    if let Some(rate) = cli.tick_rate {
        config.sampling.clock_ticks_per_sec = rate;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if cli.verbose {
        config.output.verbose = true;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref path) = cli.log_json {
        config.logging.json_file = Some(path.clone());
    }

    config
}

/// A numeric target is a pid; anything else is a search key, with an
/// interactive pick when several processes match.
fn resolve_target(target: &str, collector: &Collector) -> Result<u32> {
    if let Ok(pid) = target.parse::<u32>() {
        return Ok(pid);
    }

    let candidates = match_candidates(&collector.command_lines(), target, std::process::id());
    match candidates.as_slice() {
        [] => bail!("No processes match \"{target}\""),
        [only] => Ok(only.pid),
        many => {
            let items = selection_items(many, target);
            let selection = Select::new()
                .with_prompt("Select process to monitor")
                .items(&items)
                .default(0)
                .interact_opt()
                .wrap_err("failed to open selection prompt")?;
            match selection {
                Some(idx) => Ok(many[idx].pid),
                None => bail!("no process selected"),
            }
        }
    }
}

/// One prompt line per candidate: index, pid, then the command line
/// excerpt around `key`.
fn selection_items(candidates: &[CommandLine], key: &str) -> Vec<String> {
    candidates
        .iter()
        .enumerate()
        .map(|(idx, c)| format!("[{idx:>2}] {:>8} {}", c.pid, describe(c, key)))
        .collect()
}
