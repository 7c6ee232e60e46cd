use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a stack resting somewhere on the hopper grid.
    pub struct StackId;
}

/// Identifies a material kind in the registry. Cheap to copy and compare.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MaterialKindId(pub u32);

/// Identifies a material stat (nutrition, mass, ...) used as the common
/// currency between raw input and output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StatId(pub u16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_kind_id_equality() {
        assert_eq!(MaterialKindId(0), MaterialKindId(0));
        assert_ne!(MaterialKindId(0), MaterialKindId(1));
    }

    #[test]
    fn ids_are_usable_as_map_keys() {
        use std::collections::BTreeMap;
        let mut map = BTreeMap::new();
        map.insert(StatId(0), "nutrition");
        map.insert(StatId(1), "mass");
        assert_eq!(map[&StatId(0)], "nutrition");
    }
}
