/// Counts fast clock cycles and fires a sample tick once every `divisor` of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleRateDivider {
    /// always in `[0, divisor)`
    count: u32,
}

impl SampleRateDivider {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    pub const fn count(&self) -> u32 {
        self.count
    }

    /// true on the last cycle of each period. `divisor` must be at least 1
    #[inline]
    pub const fn sample_tick(&self, divisor: u32) -> bool {
        self.count == divisor - 1
    }

    #[inline]
    pub const fn next(&self, divisor: u32) -> Self {
        if self.sample_tick(divisor) {
            Self::new()
        } else {
            Self {
                count: self.count + 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SampleRateDivider;

    fn ticks(divisor: u32, cycles: usize) -> [bool; 16] {
        let mut out = [false; 16];
        let mut divider = SampleRateDivider::new();

        for x in out.iter_mut().take(cycles) {
            *x = divider.sample_tick(divisor);
            divider = divider.next(divisor);
        }

        out
    }

    #[test]
    fn test_divide_by_four() {
        let out = ticks(4, 16);

        for (cycle, &tick) in out.iter().enumerate() {
            assert_eq!(tick, cycle % 4 == 3, "cycle {}", cycle);
        }
    }

    #[test]
    fn test_divide_by_one() {
        assert_eq!(ticks(1, 16), [true; 16]);
    }

    #[test]
    fn test_one_tick_per_period() {
        for divisor in 1..=16 {
            let mut divider = SampleRateDivider::new();
            let mut count = 0;

            for _ in 0..divisor * 10 {
                if divider.sample_tick(divisor) {
                    count += 1;
                }
                divider = divider.next(divisor);

                assert!(divider.count() < divisor);
            }

            assert_eq!(count, 10, "divisor {}", divisor);
        }
    }
}
