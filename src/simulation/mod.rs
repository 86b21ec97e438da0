// src/simulation/mod.rs
//! Simulation system
//!
//! The frame loop hands elapsed time to a [`Simulation`] through the
//! [`SimulationManager`], which applies pause and time scale.

pub mod manager;
pub mod traits;

pub use manager::SimulationManager;
pub use traits::Simulation;
