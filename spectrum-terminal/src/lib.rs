use std::fs;
use std::iter;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use spectrum_lights_core::SpectrumAnalyzer;
use spectrum_lights_core::audio::{SineDelta, SquareTone};
use spectrum_lights_core::lights::PwmBands;
use spectrum_lights_core::logging::{info, trace};

/// Where the PDM bits come from.
/// TODO: a live source. cpal only hands us pcm, so this needs a PDM microphone on a serial port or similar
pub enum Source {
    /// raw bytes from a PDM microphone, LSB first
    Bytes(Vec<u8>),
    Tone(SquareTone),
    Sine(SineDelta),
}

impl Source {
    /// a low tone that holds each level for 8 windows of the four band variant
    pub const DEFAULT_HALF_PERIOD: u32 = 512;

    /// pick at most one of a file, a square tone, or a sine. nothing picked means a default tone
    pub fn open(
        input: Option<&Path>,
        tone: Option<u32>,
        sine: Option<u32>,
        amplitude: f32,
    ) -> anyhow::Result<Self> {
        match (input, tone, sine) {
            (Some(path), None, None) => {
                let bytes =
                    fs::read(path).with_context(|| format!("reading {}", path.display()))?;

                info!("read {} bytes of pdm from {}", bytes.len(), path.display());

                Ok(Self::Bytes(bytes))
            }
            (None, Some(half_period), None) => Ok(Self::Tone(SquareTone::new(half_period))),
            (None, None, Some(period)) => Ok(Self::Sine(SineDelta::new(period, amplitude))),
            (None, None, None) => Ok(Self::Tone(SquareTone::new(Self::DEFAULT_HALF_PERIOD))),
            _ => bail!("pick one of --input, --tone, or --sine"),
        }
    }

    /// Feed at most `ticks` clock cycles into `analyzer`. Files are fed in whole bytes.
    pub fn run<const N: usize, F>(self, analyzer: &mut SpectrumAnalyzer<N>, ticks: usize, mut output: F)
    where
        F: FnMut(PwmBands<N>),
    {
        match self {
            Self::Bytes(bytes) => {
                let len = bytes.len().min(ticks.div_ceil(8));

                analyzer.process_pdm_bytes(&bytes[..len], output);
            }
            Self::Tone(bits) => feed(analyzer, bits.take(ticks), &mut output),
            Self::Sine(bits) => feed(analyzer, bits.take(ticks), &mut output),
        }
    }
}

fn feed<const N: usize>(
    analyzer: &mut SpectrumAnalyzer<N>,
    bits: impl Iterator<Item = bool>,
    output: &mut impl FnMut(PwmBands<N>),
) {
    for bit in bits {
        output(analyzer.step(bit, false));
    }
}

/// Watch the pwm outputs the way an LED would and report how much of the time each band was on.
pub struct DutyMeter<const N: usize> {
    highs: [u32; N],
    cycles: u32,
    every: u32,
}

impl<const N: usize> DutyMeter<N> {
    /// report once every `every` clock cycles. a multiple of the pwm period gives exact numbers
    pub fn new(every: u32) -> Self {
        Self {
            highs: [0; N],
            cycles: 0,
            every: every.max(1),
        }
    }

    /// returns the duty cycle of every band at the end of each interval
    pub fn record(&mut self, out: &PwmBands<N>) -> Option<[f32; N]> {
        for (high, &x) in self.highs.iter_mut().zip(out.0.iter()) {
            *high += u32::from(x);
        }
        self.cycles += 1;

        if self.cycles < self.every {
            return None;
        }

        let cycles = self.cycles as f32;
        let duty = self.highs.map(|x| x as f32 / cycles);

        trace!("{:?} highs over {} cycles", self.highs, self.cycles);

        self.highs = [0; N];
        self.cycles = 0;

        Some(duty)
    }
}

/// one bar per band, lowest band first
pub fn render_bars<const N: usize>(duty: &[f32; N], width: usize) -> String {
    let mut out = String::with_capacity(N * (width + 3));

    for (i, &x) in duty.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }

        let filled = ((x.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);

        out.push('|');
        out.extend(iter::repeat('#').take(filled));
        out.extend(iter::repeat(' ').take(width - filled));
        out.push('|');
    }

    out
}

/// How fast the simulation runs, in fast clock cycles per second of wall time.
pub struct TickRateTracker {
    name: &'static str,
    last: Instant,
    count: u64,
}

impl TickRateTracker {
    /// only look at the clock this often. `Instant::now` every cycle would be most of the work
    const CHECK_EVERY: u64 = 4_096;

    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            last: Instant::now(),
            count: 0,
        }
    }

    pub fn tick(&mut self) {
        self.count += 1;

        if self.count % Self::CHECK_EVERY != 0 {
            return;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last);

        if elapsed >= Duration::from_secs(1) {
            let rate = u128::from(self.count) * 1_000 / elapsed.as_millis();

            self.count = 0;
            self.last = now;

            info!("{}: {} ticks/s", self.name, rate);
        }
    }
}
