//! Gunner Rotation - combat rotation decision engine for the machinist job

pub mod actions;
pub mod core;
pub mod engine;
pub mod gauge;
pub mod sim;
