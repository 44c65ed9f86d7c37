use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::*;
use spectrum_lights_core::config::{FOUR_BAND, THREE_BAND, THREE_BAND_TINY};
use spectrum_lights_core::{SpectrumAnalyzer, Variant};
use spectrum_terminal::{DutyMeter, Source, TickRateTracker, render_bars};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantName {
    FourBand,
    ThreeBand,
    ThreeBandTiny,
}

/// Run a PDM bitstream through the band analyzer and draw how bright each band's LED would be.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, value_enum, default_value_t = VariantName::FourBand)]
    variant: VariantName,

    /// raw PDM bytes, LSB first
    #[arg(long, conflicts_with_all = ["tone", "sine"])]
    input: Option<PathBuf>,

    /// square tone. fast clock cycles spent high before going low
    #[arg(long, conflicts_with = "sine")]
    tone: Option<u32>,

    /// sine tone. period in fast clock cycles
    #[arg(long)]
    sine: Option<u32>,

    /// sine amplitude from 0 to 1
    #[arg(long, default_value_t = 0.9)]
    amplitude: f32,

    /// fast clock cycles to simulate
    #[arg(long, default_value_t = 1_000_000)]
    ticks: usize,

    /// fast clock cycles per line of output. 0 means 32 pwm periods
    #[arg(long, default_value_t = 0)]
    report_every: u32,

    /// characters per bar
    #[arg(long, default_value_t = 24)]
    width: usize,
}

fn run<const N: usize>(variant: Variant<N>, args: &Args, source: Source) -> anyhow::Result<()> {
    let mut analyzer = SpectrumAnalyzer::new(variant)
        .with_context(|| format!("{} is not a usable variant", variant.name))?;

    let report_every = if args.report_every == 0 {
        variant.pwm_period() * 32
    } else {
        args.report_every
    };

    let mut meter = DutyMeter::<N>::new(report_every);
    let mut rate = TickRateTracker::new(variant.name);

    source.run(&mut analyzer, args.ticks, |out| {
        rate.tick();

        if let Some(duty) = meter.record(&out) {
            info!("{}", render_bars(&duty, args.width));
        }
    });

    info!(
        "{} sample ticks. final band energy: {}",
        analyzer.sample_ticks(),
        analyzer.band_energy()
    );

    let overflows = analyzer.overflows();
    if overflows.any() {
        warn!("{:?}", overflows);
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    // SAFETY: nothing else is running yet
    unsafe {
        env::set_var(
            "RUST_LOG",
            env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        );
    }

    env_logger::builder()
        .format_timestamp_nanos()
        .parse_default_env()
        .init();

    let args = Args::parse();

    debug!("{:?}", args);

    let source = Source::open(args.input.as_deref(), args.tone, args.sine, args.amplitude)?;

    match args.variant {
        VariantName::FourBand => run(FOUR_BAND, &args, source),
        VariantName::ThreeBand => run(THREE_BAND, &args, source),
        VariantName::ThreeBandTiny => run(THREE_BAND_TINY, &args, source),
    }
}
