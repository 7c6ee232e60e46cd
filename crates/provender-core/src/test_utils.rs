//! Shared fixture builders for tests and benches.

use crate::dispenser::{Dispenser, DispenserConfig, PowerGating};
use crate::fixed::{f64_to_fixed64, Fixed64};
use crate::hopper::{CellPos, HopperGrid, MaterialStack};
use crate::id::{MaterialKindId, StackId, StatId};
use crate::registry::{MaterialDef, MaterialRegistry, MaterialRegistryBuilder};
use crate::selector::FeedstockFilter;

/// The stat every test fixture uses as its common currency.
pub const NUTRITION: StatId = StatId(0);

/// Rare ticks per day in the reference scheduler.
pub const PERIODS_PER_DAY: f64 = 240.0;

/// A registry, kind handles, and a default device config shared by tests:
/// paste output at 2.0 nutrition per unit, ratio 3.0, capacity 10,
/// 240 intake per day, pull power capped at 5.
pub struct TestWorld {
    pub registry: MaterialRegistry,
    pub paste: MaterialKindId,
    pub berries: MaterialKindId,
    pub grain: MaterialKindId,
    pub meat: MaterialKindId,
    pub chaff: MaterialKindId,
    pub hopper: MaterialKindId,
}

impl TestWorld {
    pub fn new() -> Self {
        let mut b = MaterialRegistryBuilder::new();

        let mut paste = MaterialDef::named("paste");
        paste.stats.insert(NUTRITION, f64_to_fixed64(2.0));
        paste.ingestible = true;
        let paste = b.register(paste);

        let mut berries = MaterialDef::named("berries");
        berries.stats.insert(NUTRITION, f64_to_fixed64(1.0));
        berries.ingestible = true;
        let berries = b.register(berries);

        let mut grain = MaterialDef::named("grain");
        grain.stats.insert(NUTRITION, f64_to_fixed64(1.0));
        grain.ingestible = true;
        let grain = b.register(grain);

        let mut meat = MaterialDef::named("meat");
        meat.stats.insert(NUTRITION, f64_to_fixed64(3.0));
        meat.ingestible = true;
        let meat = b.register(meat);

        let chaff = b.register(MaterialDef::named("chaff"));

        let mut hopper = MaterialDef::named("hopper");
        hopper.hopper = true;
        let hopper = b.register(hopper);

        Self {
            registry: b.build(),
            paste,
            berries,
            grain,
            meat,
            chaff,
            hopper,
        }
    }

    pub fn config(&self) -> DispenserConfig {
        DispenserConfig {
            output_kind: self.paste,
            base_stat: NUTRITION,
            conversion_ratio: f64_to_fixed64(3.0),
            reserve_capacity: f64_to_fixed64(10.0),
            pull_rate_per_day: f64_to_fixed64(240.0),
            max_pull_power: f64_to_fixed64(5.0),
            power_gating: PowerGating::Gated,
            feedstock: FeedstockFilter::Ingestible,
        }
    }

    /// A device at the origin with the default config.
    pub fn dispenser(&self) -> Dispenser {
        Dispenser::new(self.config(), CellPos::new(0, 0), &self.registry)
            .expect("test config is valid")
    }

    /// Place a receptacle and a feedstock stack on the same cell.
    /// Returns the feedstock stack's handle.
    pub fn stock_cell(
        &self,
        grid: &mut HopperGrid,
        pos: CellPos,
        kind: MaterialKindId,
        count: u32,
    ) -> StackId {
        grid.place(pos, MaterialStack::new(self.hopper, 1));
        grid.place(pos, MaterialStack::new(kind, count))
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for [`f64_to_fixed64`].
pub fn fixed(v: f64) -> Fixed64 {
    f64_to_fixed64(v)
}
