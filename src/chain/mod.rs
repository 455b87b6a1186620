pub mod config;
#[cfg(feature = "serde")]
pub mod io;
pub mod types;
