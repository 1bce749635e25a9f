// facade_sim/src/lib.rs

// This prelude is for convenience for other files WITHIN the facade_sim crate.
pub mod prelude;

pub mod cli;
pub mod config;
pub mod mission;
pub mod prng;
pub mod vehicle;
