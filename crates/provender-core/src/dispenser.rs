//! The conversion engine: rate-limited ingestion of raw material,
//! capacity-capped accumulation of processed reserve, and discretization
//! of that reserve into whole output units.

use crate::event::{Event, EventLog};
use crate::fixed::{add_capped, sub_floored, units_to_cover, whole_units, Fixed64, Ticks};
use crate::hopper::{CellPos, HopperGrid};
use crate::id::{MaterialKindId, StatId};
use crate::registry::MaterialRegistry;
use crate::selector::{select_ingredient, FeedstockFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Buffered events per device before the oldest are dropped.
const EVENT_LOG_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Whether pull-power accumulation requires the device to be powered.
/// Device variants differ here; it is configuration, not a subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerGating {
    /// Pull power only grows on ticks where the device is powered.
    Gated,
    /// Pull power grows every tick regardless of power.
    Ungated,
}

/// Immutable per-device-type configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenserConfig {
    /// The item kind this device produces.
    pub output_kind: MaterialKindId,
    /// The stat used as common currency between raw input and output.
    pub base_stat: StatId,
    /// Output stat units produced per input stat unit consumed.
    pub conversion_ratio: Fixed64,
    /// Maximum processed reserve.
    pub reserve_capacity: Fixed64,
    /// Nominal pull-power gain per day, split across rare ticks.
    pub pull_rate_per_day: Fixed64,
    /// Cap on accumulated pull power.
    pub max_pull_power: Fixed64,
    pub power_gating: PowerGating,
    pub feedstock: FeedstockFilter,
}

/// Configuration problems surface when a device is built, never mid-tick.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("output kind {0:?} is not registered")]
    UnknownOutputKind(MaterialKindId),
    #[error("output kind {kind:?} has no positive {stat:?} value")]
    ZeroOutputCost { kind: MaterialKindId, stat: StatId },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

fn check_positive(field: &'static str, value: Fixed64) -> Result<(), ConfigError> {
    if value <= Fixed64::from_num(0) {
        return Err(ConfigError::NonPositive {
            field,
            value: value.to_num::<f64>(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The persistent portion of a device. Fields absent in older saves load
/// as their zero defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenserState {
    /// Converted material ready to be discretized into output units.
    #[serde(default)]
    pub processed_reserve: Fixed64,
    /// Accumulated permission to ingest raw material.
    #[serde(default)]
    pub pull_power: Fixed64,
    /// Distinct raw kinds consumed since the last reset.
    #[serde(default)]
    pub contained_kinds: BTreeSet<MaterialKindId>,
    /// Rare ticks seen over the device's lifetime.
    #[serde(default)]
    pub tick: Ticks,
}

/// An output item descriptor: what was produced and which raw kinds fed
/// the batch it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispensedItem {
    pub kind: MaterialKindId,
    pub provenance: BTreeSet<MaterialKindId>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A dispenser device: the conversion engine plus its persistent state.
///
/// Driven by an external scheduler through [`Dispenser::tick_rare`];
/// output is drawn on demand through [`Dispenser::try_dispense`]. Each
/// device owns its state exclusively; collaborators (grid, registry) are
/// borrowed per call.
#[derive(Debug, Clone)]
pub struct Dispenser {
    config: DispenserConfig,
    position: CellPos,
    /// Base-stat cost of one output unit. Positive, fixed at build time.
    output_unit_cost: Fixed64,
    state: DispenserState,
    events: EventLog,
}

impl Dispenser {
    /// Validate `config` against the registry and build a zeroed device.
    pub fn new(
        config: DispenserConfig,
        position: CellPos,
        registry: &MaterialRegistry,
    ) -> Result<Self, ConfigError> {
        if registry.get(config.output_kind).is_none() {
            return Err(ConfigError::UnknownOutputKind(config.output_kind));
        }
        let output_unit_cost = registry.stat_value(config.output_kind, config.base_stat);
        if output_unit_cost <= Fixed64::from_num(0) {
            return Err(ConfigError::ZeroOutputCost {
                kind: config.output_kind,
                stat: config.base_stat,
            });
        }
        check_positive("conversion_ratio", config.conversion_ratio)?;
        check_positive("reserve_capacity", config.reserve_capacity)?;
        check_positive("pull_rate_per_day", config.pull_rate_per_day)?;
        check_positive("max_pull_power", config.max_pull_power)?;

        Ok(Self {
            config,
            position,
            output_unit_cost,
            state: DispenserState::default(),
            events: EventLog::new(EVENT_LOG_CAPACITY),
        })
    }

    /// Advance the device by one rare tick: grow pull power when permitted,
    /// then attempt one ingestion pass. Safe to call every period; every
    /// way the tick can decline to make progress is a normal no-op.
    pub fn tick_rare(
        &mut self,
        grid: &mut HopperGrid,
        registry: &MaterialRegistry,
        powered: bool,
        periods_per_day: Fixed64,
    ) {
        if (powered || self.config.power_gating == PowerGating::Ungated)
            && periods_per_day > Fixed64::from_num(0)
        {
            let per_period = self.config.pull_rate_per_day / periods_per_day;
            self.state.pull_power =
                add_capped(self.state.pull_power, per_period, self.config.max_pull_power);
        }

        self.try_process_ingredients(grid, registry);
        self.state.tick += 1;
    }

    /// One ingestion pass. Returns whether any conversion occurred.
    ///
    /// Declines (no room, no eligible stock, one unit already beyond the
    /// available pull power) are ordinary outcomes; the scheduler cadence
    /// is the retry mechanism.
    pub fn try_process_ingredients(
        &mut self,
        grid: &mut HopperGrid,
        registry: &MaterialRegistry,
    ) -> bool {
        if self.state.processed_reserve >= self.config.reserve_capacity {
            return false;
        }

        let Some(stack_id) = select_ingredient(
            grid,
            registry,
            &self.config.feedstock,
            self.position,
            self.config.base_stat,
            self.state.pull_power,
        ) else {
            return false;
        };
        let Some(stack) = grid.get(stack_id) else {
            return false;
        };
        let kind = stack.kind;
        let stack_count = stack.count;
        let stat_per_unit = registry.stat_value(kind, self.config.base_stat);

        // Whole units the pull power affords, bounded by the stack itself.
        let mut units = whole_units(self.state.pull_power, stat_per_unit).min(stack_count);

        // Ceiling here lets the final unit overshoot the remaining capacity
        // slightly; the saturating add below absorbs the excess.
        let remaining = self.config.reserve_capacity - self.state.processed_reserve;
        units = units.min(units_to_cover(remaining, stat_per_unit));
        if units == 0 {
            return false;
        }

        // The unit count above never exceeds the stack, so this cannot fail.
        if grid.take_from(stack_id, units).is_err() {
            return false;
        }

        self.state.contained_kinds.insert(kind);
        let pulled = Fixed64::from_num(units) * stat_per_unit;
        self.state.processed_reserve = add_capped(
            self.state.processed_reserve,
            pulled * self.config.conversion_ratio,
            self.config.reserve_capacity,
        );
        self.state.pull_power = sub_floored(self.state.pull_power, pulled);

        let tick = self.state.tick;
        self.events.push(Event::MaterialPulled {
            kind,
            units,
            stat_per_unit,
            tick,
        });
        true
    }

    /// Draw one whole output unit from the reserve.
    ///
    /// Returns `None` when no whole unit is available. Callers are
    /// expected to have checked [`Dispenser::available_units`] first;
    /// reaching the empty branch is recorded as an event. Provenance is
    /// not cleared here; batches span dispenses until a manual reset.
    pub fn try_dispense(&mut self) -> Option<DispensedItem> {
        let tick = self.state.tick;
        if self.available_units() < 1 {
            self.events.push(Event::DispenseUnavailable { tick });
            return None;
        }

        self.state.processed_reserve =
            sub_floored(self.state.processed_reserve, self.output_unit_cost);

        let item = DispensedItem {
            kind: self.config.output_kind,
            provenance: self.state.contained_kinds.clone(),
        };
        self.events.push(Event::ItemDispensed {
            kind: self.config.output_kind,
            remaining_units: self.available_units(),
            tick,
        });
        Some(item)
    }

    /// Zero the reserve and pull power and clear provenance.
    pub fn reset(&mut self) {
        self.state.processed_reserve = Fixed64::from_num(0);
        self.state.pull_power = Fixed64::from_num(0);
        self.state.contained_kinds.clear();
        let tick = self.state.tick;
        self.events.push(Event::DeviceReset { tick });
    }

    /// Fill the reserve to capacity. Sandbox and debug affordance.
    pub fn fill(&mut self) {
        self.state.processed_reserve = self.config.reserve_capacity;
    }

    // -- accessors ----------------------------------------------------------

    /// Whole output units the current reserve covers.
    pub fn available_units(&self) -> u32 {
        whole_units(self.state.processed_reserve, self.output_unit_cost)
    }

    pub fn processed_reserve(&self) -> Fixed64 {
        self.state.processed_reserve
    }

    pub fn pull_power(&self) -> Fixed64 {
        self.state.pull_power
    }

    pub fn contained_kinds(&self) -> &BTreeSet<MaterialKindId> {
        &self.state.contained_kinds
    }

    /// Base-stat cost of one output unit.
    pub fn output_unit_cost(&self) -> Fixed64 {
        self.output_unit_cost
    }

    /// Raw-side stat cost of one output unit, before conversion.
    pub fn raw_unit_cost(&self) -> Fixed64 {
        self.output_unit_cost / self.config.conversion_ratio
    }

    /// Whether the device can currently make processing progress.
    pub fn is_processing(&self, powered: bool) -> bool {
        (powered || self.config.power_gating == PowerGating::Ungated)
            && self.state.processed_reserve < self.config.reserve_capacity
    }

    pub fn config(&self) -> &DispenserConfig {
        &self.config
    }

    pub fn position(&self) -> CellPos {
        self.position
    }

    /// The persistent state, for the save hook.
    pub fn state(&self) -> &DispenserState {
        &self.state
    }

    /// Replace the persistent state, for the load hook.
    pub fn restore(&mut self, state: DispenserState) {
        self.state = state;
    }

    /// Take all buffered events, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}
