//! The whole pipeline, advanced one fast clock cycle at a time.
//!
//! Each step reads a snapshot of every register, computes the next value of all of them from that snapshot,
//! and then swaps the new set in. No stage ever sees another stage's value from the same cycle, which is
//! how the registers behave on a real clock edge.
use crate::audio::{BandEnergy, EnergyIntegrator, FilterBank, PcmSample, PdmDemodulator, SampleRateDivider};
use crate::config::Variant;
use crate::errors::SpectrumResult;
use crate::fixed::Overflows;
use crate::lights::{PwmBands, PwmMapper};
use crate::logging::{debug, info, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Registers<const N: usize> {
    divider: SampleRateDivider,
    demodulator: PdmDemodulator,
    filters: FilterBank<N>,
    energy: EnergyIntegrator<N>,
    pwm: PwmMapper,
}

impl<const N: usize> Registers<N> {
    /// everything zero. this is also what reset forces
    const fn new() -> Self {
        Self {
            divider: SampleRateDivider::new(),
            demodulator: PdmDemodulator::new(),
            filters: FilterBank::new(),
            energy: EnergyIntegrator::new(),
            pwm: PwmMapper::new(),
        }
    }

    fn next(&self, variant: &Variant<N>, pdm_bit: bool, overflows: &mut Overflows) -> Self {
        let sample_tick = self.divider.sample_tick(variant.divisor);

        Self {
            divider: self.divider.next(variant.divisor),
            demodulator: self
                .demodulator
                .next(&variant.demodulator, sample_tick, pdm_bit, overflows),
            filters: self.filters.next(
                &variant.filter,
                sample_tick,
                self.demodulator.sample(),
                overflows,
            ),
            energy: self.energy.next(
                &variant.energy,
                sample_tick,
                self.filters.outputs(),
                overflows,
            ),
            pwm: self.pwm.next(variant.energy.energy_bits),
        }
    }
}

/// N = number of bands. 3 or 4
pub struct SpectrumAnalyzer<const N: usize> {
    variant: Variant<N>,
    registers: Registers<N>,
    overflows: Overflows,
    sample_ticks: u64,
    in_reset: bool,
}

impl<const N: usize> SpectrumAnalyzer<N> {
    pub fn new(variant: Variant<N>) -> SpectrumResult<Self> {
        variant.validate()?;

        info!(
            "{}: {} bands. divisor {}. demodulation window {}. integration window {}. {} bit pwm",
            variant.name,
            N,
            variant.divisor,
            variant.demodulator.window,
            variant.energy.window,
            variant.energy.energy_bits
        );

        Ok(Self {
            variant,
            registers: Registers::new(),
            overflows: Overflows::new(),
            sample_ticks: 0,
            in_reset: false,
        })
    }

    /// Advance one fast clock cycle.
    ///
    /// The outputs come from the registers as they were *before* this cycle's update. While `reset` is held,
    /// every output is low and every register is cleared. Counting starts again on the first cycle without it.
    pub fn step(&mut self, pdm_bit: bool, reset: bool) -> PwmBands<N> {
        if reset {
            if !self.in_reset {
                debug!("{}: reset", self.variant.name);
                self.in_reset = true;
            }

            self.registers = Registers::new();
            self.sample_ticks = 0;

            return PwmBands::new();
        }

        if self.in_reset {
            debug!("{}: out of reset", self.variant.name);
            self.in_reset = false;
        }

        let current = self.registers;

        let outputs = current.pwm.outputs(current.energy.energy());

        let sample_tick = current.divider.sample_tick(self.variant.divisor);
        let window_closing = current.energy.window_closing(&self.variant.energy, sample_tick);

        let before = self.overflows;
        let next = current.next(&self.variant, pdm_bit, &mut self.overflows);
        self.overflows.warn_new(&before);

        // commit
        self.registers = next;

        if sample_tick {
            self.sample_ticks += 1;
        }

        if window_closing {
            trace!("band energy: {:?}", self.registers.energy.energy().0);
        }

        outputs
    }

    /// Unpack bytes LSB first, one bit per clock cycle, and hand every cycle's outputs to `output`.
    ///
    /// This is the bit order PDM microphone DMA buffers use.
    pub fn process_pdm_bytes<F>(&mut self, pdm: &[u8], mut output: F)
    where
        F: FnMut(PwmBands<N>),
    {
        for &byte in pdm {
            for bit in 0..8 {
                output(self.step(byte & (1 << bit) != 0, false));
            }
        }
    }

    pub const fn variant(&self) -> &Variant<N> {
        &self.variant
    }

    pub const fn pcm_sample(&self) -> PcmSample {
        self.registers.demodulator.sample()
    }

    pub const fn filter_outputs(&self) -> &[i32; N] {
        self.registers.filters.outputs()
    }

    pub const fn band_energy(&self) -> &BandEnergy<N> {
        self.registers.energy.energy()
    }

    pub const fn pwm_counter(&self) -> u32 {
        self.registers.pwm.counter()
    }

    /// sample ticks since construction or the last reset
    pub const fn sample_ticks(&self) -> u64 {
        self.sample_ticks
    }

    pub const fn overflows(&self) -> &Overflows {
        &self.overflows
    }

    pub const fn in_reset(&self) -> bool {
        self.in_reset
    }
}
