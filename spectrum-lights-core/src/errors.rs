use thiserror::Error;

/// Everything that can go wrong is a variant that was sized wrong. Once an analyzer is built, stepping it never fails.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumError {
    #[error("{0} bands requested. variants have 3 or 4 bands")]
    BandCount(usize),
    #[error("sample-rate divisor must be at least 1")]
    ZeroDivisor,
    #[error("{stage} window of {window} ticks must be a power of two and at least 2")]
    InvalidWindow { stage: &'static str, window: u32 },
    #[error("{register} is {bits} bits wide. registers must be 1 to 31 bits")]
    InvalidWidth { register: &'static str, bits: u32 },
    #[error("{stage} shift of {shift} is too large")]
    InvalidShift { stage: &'static str, shift: u32 },
    #[error("a {bits} bit accumulator overflows within a {window} tick window")]
    AccumulatorTooNarrow { window: u32, bits: u32 },
    #[error("a {bits} bit pcm sample cannot hold a bias of {bias}")]
    PcmTooNarrow { bias: u32, bits: u32 },
    #[error("band {band} coefficient {value} must be less than 2^{shift}")]
    CoefficientOutOfRange { band: usize, value: u32, shift: u32 },
    #[error("a {bits} bit energy register leaves no rectifier bits for a {window} tick window")]
    EnergyTooNarrow { window: u32, bits: u32 },
}

pub type SpectrumResult<T> = Result<T, SpectrumError>;
