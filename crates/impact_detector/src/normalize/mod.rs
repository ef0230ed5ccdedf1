//! Path normalization helpers shared by the analysis and report layers.

pub mod path;
