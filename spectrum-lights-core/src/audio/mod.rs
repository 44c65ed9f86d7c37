//! Audio processing
//!
//! PDM bits -> SampleRateDivider -> PdmDemodulator -> FilterBank -> EnergyIntegrator -> (lights::PwmMapper)
//!             (sample ticks)       (PcmSample)       (per band)    (BandEnergy)
pub mod divider;
pub mod energy;
pub mod filter_bank;
pub mod pdm;
pub mod synth;

pub use divider::SampleRateDivider;
pub use energy::{BandEnergy, EnergyIntegrator};
pub use filter_bank::FilterBank;
pub use pdm::{PcmSample, PdmDemodulator};
pub use synth::{SineDelta, SquareTone};
