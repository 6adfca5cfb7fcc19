//! Render a preset rack as raw PCM on stdout.
//!
//! ```text
//! cvrack --db 0 --rate 48000 | paplay --rate=48000 --channels=1 --format=s16le --raw /dev/stdin
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use cvrack::prelude::*;
use std::io::{self, BufWriter};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "cvrack",
    about = "Modular synthesizer rack simulator: 16-bit little-endian mono PCM on stdout"
)]
struct Cli {
    /// Output gain in dB.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    db: f64,

    /// Samples per second.
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE, allow_negative_numbers = true)]
    rate: f64,

    /// Log every device step and every rack tick to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Number of samples to render.
    #[arg(short = 'n', long, default_value_t = 1_000_000_000)]
    ticks: u64,

    /// Rack to play.
    #[arg(long, default_value = DEFAULT_PRESET)]
    preset: String,

    /// List the available presets and exit.
    #[arg(long)]
    list: bool,
}

impl Cli {
    /// Validate the numeric settings before anything is built
    fn settings(&self) -> Result<(SimConfig, OutputGain)> {
        let config = SimConfig::new(self.rate)
            .context("invalid --rate")?
            .with_verbose(self.verbose);
        let gain = OutputGain::from_db(self.db).context("invalid --db")?;
        Ok((config, gain))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose).context("cannot set up logging")?;

    let library = PresetLibrary::new();
    if cli.list {
        for preset in library.list() {
            println!("{:<8} {}", preset.name, preset.description);
        }
        return Ok(());
    }

    let (config, gain) = cli.settings()?;
    let BuiltPatch { mut rack, mixer } = library.build(&cli.preset, config)?;

    info!(
        preset = %cli.preset,
        rate = config.sample_rate(),
        db = cli.db,
        ticks = cli.ticks,
        "rendering"
    );

    let stdout = io::stdout().lock();
    let mut out = PcmWriter::new(BufWriter::with_capacity(1024, stdout));
    let written = render(&mut rack, &mixer, gain, &mut out, cli.ticks)
        .with_context(|| format!("output stopped after {} samples", out.samples()))?;

    info!(samples = written, "done");
    Ok(())
}
