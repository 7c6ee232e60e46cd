//! Raw-material selection: which adjacent stack, if any, the conversion
//! engine should pull from this tick.
//!
//! A cell only contributes stock while a receptacle-flagged stack shares
//! it; loose material on a bare floor cell is invisible to the device.

use crate::fixed::Fixed64;
use crate::hopper::{CellPos, HopperGrid};
use crate::id::{MaterialKindId, StackId, StatId};
use crate::registry::MaterialRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which raw-material kinds a device accepts as feedstock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedstockFilter {
    /// Kind is classified ingestible and carries a positive base-stat value.
    Ingestible,
    /// Explicit whitelist of kinds.
    Kinds(BTreeSet<MaterialKindId>),
    /// Any kind with a positive base-stat value.
    Any,
}

impl Default for FeedstockFilter {
    fn default() -> Self {
        FeedstockFilter::Ingestible
    }
}

impl FeedstockFilter {
    pub fn accepts(
        &self,
        registry: &MaterialRegistry,
        kind: MaterialKindId,
        base_stat: StatId,
    ) -> bool {
        match self {
            FeedstockFilter::Ingestible => {
                registry.is_ingestible(kind)
                    && registry.stat_value(kind, base_stat) > Fixed64::from_num(0)
            }
            FeedstockFilter::Kinds(kinds) => kinds.contains(&kind),
            FeedstockFilter::Any => registry.stat_value(kind, base_stat) > Fixed64::from_num(0),
        }
    }
}

/// Lazily yield one candidate stack per qualifying neighbor cell.
///
/// A cell qualifies when it simultaneously holds a receptacle-flagged
/// stack and a filter-passing stack; the first passing stack in placement
/// order is the cell's candidate. One full scan per call, no caching.
pub fn eligible_stacks<'a>(
    grid: &'a HopperGrid,
    registry: &'a MaterialRegistry,
    filter: &'a FeedstockFilter,
    origin: CellPos,
    base_stat: StatId,
) -> impl Iterator<Item = StackId> + 'a {
    origin
        .cardinal_neighbors()
        .into_iter()
        .filter_map(move |cell| {
            let mut feed = None;
            let mut receptacle = false;
            for (id, stack) in grid.stacks_at(cell) {
                if registry.is_hopper(stack.kind) {
                    receptacle = true;
                } else if feed.is_none() && filter.accepts(registry, stack.kind, base_stat) {
                    feed = Some(id);
                }
            }
            if receptacle { feed } else { None }
        })
}

/// Pick the stack the engine should pull from, or `None` when nothing
/// qualifies.
///
/// Candidates are ranked ascending by stack size so that near-empty
/// receptacles drain first; ties keep neighborhood enumeration order.
/// The winner is rejected wholesale if a single unit already costs more
/// than the available pull power; stacks are never evaluated at sub-unit
/// granularity.
pub fn select_ingredient(
    grid: &HopperGrid,
    registry: &MaterialRegistry,
    filter: &FeedstockFilter,
    origin: CellPos,
    base_stat: StatId,
    pull_power: Fixed64,
) -> Option<StackId> {
    let mut candidates: Vec<StackId> =
        eligible_stacks(grid, registry, filter, origin, base_stat).collect();
    candidates.sort_by_key(|id| grid.get(*id).map(|s| s.count).unwrap_or(u32::MAX));

    let best = *candidates.first()?;
    let stack = grid.get(best)?;
    if registry.stat_value(stack.kind, base_stat) > pull_power {
        return None;
    }
    Some(best)
}
