//! Provender Core -- the conversion engine for material-dispensing devices
//! in building simulations.
//!
//! A dispenser continuously pulls raw material from receptacles on adjacent
//! cells, converts it at a fixed ratio into an internal processed reserve,
//! and hands out whole output items drawn from that reserve, tracking which
//! raw kinds contributed to each batch.
//!
//! # Rare-Tick Loop
//!
//! An external scheduler calls [`dispenser::Dispenser::tick_rare`] at a
//! fixed cadence. Each call:
//!
//! 1. **Accumulate** -- grow the pull-power allowance (when the power gate
//!    permits), saturating at the configured cap.
//! 2. **Select** -- scan the cardinal neighborhood for an eligible stack:
//!    smallest stack first, receptacle required on the same cell, rejected
//!    wholesale if one unit exceeds the available pull power.
//! 3. **Convert** -- consume whole units from the winning stack, pay pull
//!    power, grow the reserve (saturating at capacity), record provenance.
//!
//! Output leaves through [`dispenser::Dispenser::try_dispense`], which
//! discretizes the continuous reserve into whole units.
//!
//! # Key Types
//!
//! - [`dispenser::Dispenser`] -- the engine: configuration, state, tick and
//!   dispense operations.
//! - [`hopper::HopperGrid`] -- stack storage with per-cell membership; the
//!   neighborhood provider and stack mutation primitive.
//! - [`registry::MaterialRegistry`] -- immutable material definitions and
//!   the stat lookup (frozen at startup).
//! - [`selector`] -- the raw-material selection policy.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`event::Event`] -- typed device events in a bounded log.
//! - [`serialize`] -- versioned snapshots via bitcode, plus state hashing.
//! - [`status::SupplySource`] -- capability check for "can this building
//!   hand out items".

pub mod dispenser;
pub mod event;
pub mod fixed;
pub mod hopper;
pub mod id;
pub mod registry;
pub mod selector;
pub mod serialize;
pub mod status;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
