//! The simulated bodies
//!
//! - [`params`] - tunable parameter records and their slider ranges
//! - [`orbit`] - closed-form orbit positions
//! - [`starfield`] - random background star placement
//! - [`system`] - the [`SolarSystem`] simulation tying them to the scene

pub mod orbit;
pub mod params;
pub mod starfield;
pub mod system;

pub use params::SystemParams;
pub use system::SolarSystem;
