#![cfg_attr(not(feature = "std"), no_std)]

pub mod analyzer;
pub mod audio;
pub mod config;
pub mod errors;
pub mod fixed;
pub mod lights;
pub mod logging;

pub use analyzer::SpectrumAnalyzer;
pub use config::Variant;
pub use errors::{SpectrumError, SpectrumResult};
