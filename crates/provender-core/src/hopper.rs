use crate::id::{MaterialKindId, StackId};
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::BTreeMap;

/// A quantity of a single material kind grouped together at one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialStack {
    pub kind: MaterialKindId,
    pub count: u32,
}

impl MaterialStack {
    pub fn new(kind: MaterialKindId, count: u32) -> Self {
        Self { kind, count }
    }
}

/// A grid cell position. Devices and hoppers occupy whole cells.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four cardinal neighbors, in fixed N/E/S/W order. This order is
    /// the tie-breaker for stack selection, so it must stay stable.
    pub fn cardinal_neighbors(self) -> [CellPos; 4] {
        [
            CellPos::new(self.x, self.y + 1),
            CellPos::new(self.x + 1, self.y),
            CellPos::new(self.x, self.y - 1),
            CellPos::new(self.x - 1, self.y),
        ]
    }
}

/// Errors from the stack mutation primitive.
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("stack {0:?} does not exist")]
    NoSuchStack(StackId),
    /// Asking for more units than the stack holds is a caller bug, not a
    /// runtime condition; the engine's own count math never reaches this.
    #[error("cannot take {requested} units from a stack of {available}")]
    InsufficientCount { requested: u32, available: u32 },
}

/// Storage for every stack resting on the floor, with per-cell membership.
/// Doubles as the neighborhood provider and the stack mutation primitive
/// the conversion engine is handed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HopperGrid {
    stacks: SlotMap<StackId, MaterialStack>,
    cells: BTreeMap<CellPos, Vec<StackId>>,
    positions: SecondaryMap<StackId, CellPos>,
}

impl HopperGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a stack at a cell. Returns its handle.
    pub fn place(&mut self, pos: CellPos, stack: MaterialStack) -> StackId {
        let id = self.stacks.insert(stack);
        self.cells.entry(pos).or_default().push(id);
        self.positions.insert(id, pos);
        id
    }

    pub fn get(&self, id: StackId) -> Option<&MaterialStack> {
        self.stacks.get(id)
    }

    pub fn position_of(&self, id: StackId) -> Option<CellPos> {
        self.positions.get(id).copied()
    }

    /// All stacks resting at a cell, in placement order.
    pub fn stacks_at(&self, pos: CellPos) -> impl Iterator<Item = (StackId, &MaterialStack)> + '_ {
        self.cells
            .get(&pos)
            .into_iter()
            .flatten()
            .filter_map(|id| self.stacks.get(*id).map(|stack| (*id, stack)))
    }

    /// Remove `count` units from a stack. Stacks emptied this way are
    /// removed from the grid entirely. Rejects counts beyond the stack's
    /// holdings without consuming anything.
    pub fn take_from(&mut self, id: StackId, count: u32) -> Result<(), StackError> {
        let stack = self.stacks.get_mut(id).ok_or(StackError::NoSuchStack(id))?;
        if count > stack.count {
            return Err(StackError::InsufficientCount {
                requested: count,
                available: stack.count,
            });
        }
        stack.count -= count;
        if stack.count == 0 {
            let _ = self.remove(id);
        }
        Ok(())
    }

    /// Remove a stack from the grid, returning it.
    pub fn remove(&mut self, id: StackId) -> Option<MaterialStack> {
        let stack = self.stacks.remove(id)?;
        if let Some(pos) = self.positions.remove(id) {
            if let Some(ids) = self.cells.get_mut(&pos) {
                ids.retain(|s| *s != id);
                if ids.is_empty() {
                    self.cells.remove(&pos);
                }
            }
        }
        Some(stack)
    }

    pub fn stack_count(&self) -> usize {
        self.stacks.len()
    }

    /// Total units of a kind anywhere on the grid.
    pub fn total_of(&self, kind: MaterialKindId) -> u32 {
        self.stacks
            .values()
            .filter(|s| s.kind == kind)
            .map(|s| s.count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berries() -> MaterialKindId {
        MaterialKindId(0)
    }

    #[test]
    fn place_and_get() {
        let mut grid = HopperGrid::new();
        let id = grid.place(CellPos::new(0, 0), MaterialStack::new(berries(), 10));
        assert_eq!(grid.get(id).unwrap().count, 10);
        assert_eq!(grid.position_of(id), Some(CellPos::new(0, 0)));
    }

    #[test]
    fn stacks_at_cell_in_placement_order() {
        let mut grid = HopperGrid::new();
        let pos = CellPos::new(1, 1);
        let a = grid.place(pos, MaterialStack::new(berries(), 3));
        let b = grid.place(pos, MaterialStack::new(MaterialKindId(1), 1));
        let seen: Vec<StackId> = grid.stacks_at(pos).map(|(id, _)| id).collect();
        assert_eq!(seen, vec![a, b]);
        assert_eq!(grid.stacks_at(CellPos::new(9, 9)).count(), 0);
    }

    #[test]
    fn take_from_reduces_count() {
        let mut grid = HopperGrid::new();
        let id = grid.place(CellPos::new(0, 0), MaterialStack::new(berries(), 10));
        grid.take_from(id, 4).unwrap();
        assert_eq!(grid.get(id).unwrap().count, 6);
    }

    #[test]
    fn take_from_empties_and_removes() {
        let mut grid = HopperGrid::new();
        let pos = CellPos::new(0, 0);
        let id = grid.place(pos, MaterialStack::new(berries(), 4));
        grid.take_from(id, 4).unwrap();
        assert!(grid.get(id).is_none());
        assert_eq!(grid.stacks_at(pos).count(), 0);
        assert_eq!(grid.stack_count(), 0);
    }

    #[test]
    fn take_from_rejects_overconsumption() {
        let mut grid = HopperGrid::new();
        let id = grid.place(CellPos::new(0, 0), MaterialStack::new(berries(), 3));
        let err = grid.take_from(id, 5).unwrap_err();
        assert!(matches!(
            err,
            StackError::InsufficientCount {
                requested: 5,
                available: 3
            }
        ));
        // Nothing consumed on rejection.
        assert_eq!(grid.get(id).unwrap().count, 3);
    }

    #[test]
    fn take_from_missing_stack() {
        let mut grid = HopperGrid::new();
        let id = grid.place(CellPos::new(0, 0), MaterialStack::new(berries(), 1));
        let _ = grid.remove(id);
        assert!(matches!(
            grid.take_from(id, 1),
            Err(StackError::NoSuchStack(_))
        ));
    }

    #[test]
    fn cardinal_neighbors_fixed_order() {
        let n = CellPos::new(0, 0).cardinal_neighbors();
        assert_eq!(
            n,
            [
                CellPos::new(0, 1),
                CellPos::new(1, 0),
                CellPos::new(0, -1),
                CellPos::new(-1, 0),
            ]
        );
    }

    #[test]
    fn total_of_sums_across_cells() {
        let mut grid = HopperGrid::new();
        grid.place(CellPos::new(0, 0), MaterialStack::new(berries(), 3));
        grid.place(CellPos::new(2, 0), MaterialStack::new(berries(), 7));
        grid.place(CellPos::new(2, 0), MaterialStack::new(MaterialKindId(1), 5));
        assert_eq!(grid.total_of(berries()), 10);
    }
}
