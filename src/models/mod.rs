//! Option pricing models

pub mod bs;
