//! Read-only status data and the supply-source capability surface.
//!
//! The presentation layer formats its own strings; the core only hands
//! out numbers. Hosts that need to know "can this building hand out
//! items" check the [`SupplySource`] capability instead of matching on
//! concrete device types.

use crate::dispenser::Dispenser;
use crate::fixed::Fixed64;
use crate::id::MaterialKindId;

/// Point-in-time numbers for a status readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub processed_reserve: Fixed64,
    pub reserve_capacity: Fixed64,
    pub available_units: u32,
    pub pull_power: Fixed64,
    /// Nominal raw-stat intake per day while processing.
    pub intake_per_day: Fixed64,
    /// Output units gained per day at the nominal intake rate.
    pub projected_units_per_day: Fixed64,
    /// Whether the device can currently make processing progress.
    pub processing: bool,
}

/// Capability of handing out whole items on demand.
pub trait SupplySource {
    /// The kind of item this source produces.
    fn supply_kind(&self) -> MaterialKindId;

    /// Whole units available right now.
    fn units_available(&self) -> u32;

    /// Whether a request would succeed right now. Dispensing draws on the
    /// accumulated reserve, so power is deliberately not consulted.
    fn can_supply_now(&self) -> bool {
        self.units_available() >= 1
    }
}

impl SupplySource for Dispenser {
    fn supply_kind(&self) -> MaterialKindId {
        self.config().output_kind
    }

    fn units_available(&self) -> u32 {
        self.available_units()
    }
}

impl Dispenser {
    /// Snapshot the numbers a status readout needs.
    pub fn status(&self, powered: bool) -> StatusReport {
        StatusReport {
            processed_reserve: self.processed_reserve(),
            reserve_capacity: self.config().reserve_capacity,
            available_units: self.available_units(),
            pull_power: self.pull_power(),
            intake_per_day: self.config().pull_rate_per_day,
            projected_units_per_day: self.config().pull_rate_per_day / self.raw_unit_cost(),
            processing: self.is_processing(powered),
        }
    }
}
