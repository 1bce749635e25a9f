// facade_core/src/lib.rs

//! Facade photogrammetry scanning: camera geometry, the serpentine sweep
//! planner and the flight state machine that drives a vehicle through it.
//! Nothing in here knows which simulator or autopilot sits behind
//! [`vehicle::VehicleClient`].

pub mod cancel;
pub mod capture;
pub mod cursor;
pub mod error;
pub mod executor;
pub mod frames;
pub mod geometry;
pub mod params;
pub mod policy;
pub mod prelude;
pub mod telemetry;
pub mod vehicle;

#[cfg(test)]
pub(crate) mod testing;
