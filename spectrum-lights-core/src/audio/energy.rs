//! Rectify each band, add it up over a window, then fold the window into a slowly decaying level.
use core::fmt;

use crate::config::EnergyConfig;
use crate::fixed::{Overflows, wrap_unsigned, wrap_unsigned_counted};

/// one level per band. lowest band first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct BandEnergy<const N: usize>(pub [u32; N]);

impl<const N: usize> Default for BandEnergy<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BandEnergy<N> {
    pub const fn new() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> fmt::Display for BandEnergy<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:>3}", x)?;
        }
        Ok(())
    }
}

/// halve and add. both inputs fit in the register, so the sum does too
#[inline]
pub const fn fold(energy: u32, accumulated: u32) -> u32 {
    (energy >> 1) + (accumulated >> 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnergyIntegrator<const N: usize> {
    accumulated: [u32; N],
    energy: BandEnergy<N>,
    /// position inside the integration window
    window: u32,
}

impl<const N: usize> Default for EnergyIntegrator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EnergyIntegrator<N> {
    pub const fn new() -> Self {
        Self {
            accumulated: [0; N],
            energy: BandEnergy::new(),
            window: 0,
        }
    }

    pub const fn energy(&self) -> &BandEnergy<N> {
        &self.energy
    }

    pub const fn accumulated(&self) -> &[u32; N] {
        &self.accumulated
    }

    /// true if the next sample tick closes the window and updates [Self::energy]
    #[inline]
    pub const fn window_closing(&self, config: &EnergyConfig, sample_tick: bool) -> bool {
        sample_tick && self.window == config.window - 1
    }

    pub fn next(
        &self,
        config: &EnergyConfig,
        sample_tick: bool,
        outputs: &[i32; N],
        overflows: &mut Overflows,
    ) -> Self {
        if !sample_tick {
            return *self;
        }

        let closing = self.window_closing(config, true);
        let rectify_bits = config.rectify_bits();

        let mut next = *self;

        for (((next_accumulated, next_energy), &accumulated), (&energy, &output)) in next
            .accumulated
            .iter_mut()
            .zip(next.energy.0.iter_mut())
            .zip(self.accumulated.iter())
            .zip(self.energy.0.iter().zip(outputs.iter()))
        {
            // keep only the magnitude bits that matter at this resolution
            let magnitude = u64::from(output.unsigned_abs()) >> config.rectify_shift;
            let rectified = wrap_unsigned_counted(magnitude, rectify_bits, &mut overflows.rectifier);

            let total = wrap_unsigned_counted(
                u64::from(accumulated) + u64::from(rectified),
                config.energy_bits,
                &mut overflows.energy,
            );

            if closing {
                *next_energy = wrap_unsigned(fold(energy, total).into(), config.energy_bits);
                *next_accumulated = 0;
            } else {
                *next_accumulated = total;
            }
        }

        next.window = if closing { 0 } else { self.window + 1 };

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FOUR_BAND;

    /// feed the same filter outputs for whole windows and collect the energy after each one
    fn windows<const N: usize, const W: usize>(
        integrator: &mut EnergyIntegrator<N>,
        config: &EnergyConfig,
        outputs: [i32; N],
        overflows: &mut Overflows,
    ) -> [BandEnergy<N>; W] {
        let mut out = [BandEnergy::new(); W];

        for x in out.iter_mut() {
            for _ in 0..config.window {
                *integrator = integrator.next(config, true, &outputs, overflows);
            }
            *x = *integrator.energy();
        }

        out
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold(0, 0), 0);
        assert_eq!(fold(0, 160), 80);
        assert_eq!(fold(80, 160), 120);
        assert_eq!(fold(255, 255), 254);
    }

    #[test]
    fn test_energy_only_changes_at_the_end_of_a_window() {
        let config = FOUR_BAND.energy;
        let mut overflows = Overflows::new();
        let mut integrator = EnergyIntegrator::<3>::new();

        for _ in 0..config.window - 1 {
            assert!(!integrator.window_closing(&config, true));
            integrator = integrator.next(&config, true, &[80, -80, 0], &mut overflows);
            assert_eq!(integrator.energy(), &BandEnergy([0, 0, 0]));
        }

        assert_eq!(integrator.accumulated(), &[150, 150, 0]);
        assert!(integrator.window_closing(&config, true));
        assert!(!integrator.window_closing(&config, false));

        integrator = integrator.next(&config, true, &[80, -80, 0], &mut overflows);

        // 16 ticks of 80 >> 3 = 160, halved
        assert_eq!(integrator.energy(), &BandEnergy([80, 80, 0]));
        assert_eq!(integrator.accumulated(), &[0, 0, 0]);
        assert!(!overflows.any());
    }

    #[test]
    fn test_monotone_after_a_step_up() {
        let config = FOUR_BAND.energy;
        let mut overflows = Overflows::new();
        let mut integrator = EnergyIntegrator::<4>::new();

        let quiet: [BandEnergy<4>; 12] =
            windows(&mut integrator, &config, [80, -80, 80, -80], &mut overflows);
        assert_eq!(quiet[11], BandEnergy([159; 4]));

        let loud: [BandEnergy<4>; 10] =
            windows(&mut integrator, &config, [120, -120, 120, -120], &mut overflows);

        let mut last = quiet[11];
        for x in loud.iter() {
            for (&before, &after) in last.0.iter().zip(x.0.iter()) {
                assert!(after >= before, "{:?} -> {:?}", last, x);
            }
            last = *x;
        }

        assert_eq!(loud[0], BandEnergy([199; 4]));
        assert_eq!(loud[1], BandEnergy([219; 4]));
        assert_eq!(loud[2], BandEnergy([229; 4]));
        assert_eq!(loud[9], BandEnergy([239; 4]));

        assert!(!overflows.any());
    }

    #[test]
    fn test_decays_to_zero() {
        let config = FOUR_BAND.energy;
        let mut overflows = Overflows::new();
        let mut integrator = EnergyIntegrator::<3>::new();

        let _: [BandEnergy<3>; 10] = windows(&mut integrator, &config, [120; 3], &mut overflows);

        let quiet: [BandEnergy<3>; 10] = windows(&mut integrator, &config, [0; 3], &mut overflows);

        // halves every window
        assert_eq!(quiet[0], BandEnergy([119; 3]));
        assert_eq!(quiet[1], BandEnergy([59; 3]));
        assert_eq!(quiet[9], BandEnergy([0; 3]));
    }

    #[test]
    fn test_full_scale_never_overflows() {
        let config = FOUR_BAND.energy;
        let mut overflows = Overflows::new();
        let mut integrator = EnergyIntegrator::<3>::new();

        // largest magnitude that still fits in the rectifier: 127 >> 3 = 15
        let out: [BandEnergy<3>; 20] =
            windows(&mut integrator, &config, [127, -127, 127], &mut overflows);

        for x in out.iter() {
            assert!(x.0.iter().all(|&e| e < 1 << config.energy_bits));
        }

        assert_eq!(out[19], BandEnergy([239; 3]));
        assert!(!overflows.any());
    }

    #[test]
    fn test_rectifier_truncates() {
        let config = FOUR_BAND.energy;
        let mut overflows = Overflows::new();

        // 130 >> 3 = 16 doesn't fit in 4 bits and wraps to 0
        let integrator =
            EnergyIntegrator::<3>::new().next(&config, true, &[130, 8, 0], &mut overflows);

        assert_eq!(integrator.accumulated(), &[0, 1, 0]);
        assert_eq!(overflows.rectifier, 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", BandEnergy([0, 12, 255])), "  0  12 255");
    }
}
