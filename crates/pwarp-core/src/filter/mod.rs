//! Whole-signal filters driven by per-trial warps.

pub mod resample;

pub use resample::DenseResampler;
