//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the prop: actuator state,
//! intensity persistence, ramps, and command interpretation.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod ramp;
pub mod service;
pub mod state;
