use crate::fixed::Fixed64;
use crate::id::{MaterialKindId, StatId};
use std::collections::{BTreeMap, HashMap};

/// A material kind definition: its stat table and classification flags.
#[derive(Debug, Clone)]
pub struct MaterialDef {
    pub name: String,
    /// Stat values for this kind. Stats not present read as zero.
    pub stats: BTreeMap<StatId, Fixed64>,
    /// Marks collection receptacles. A cell's stock is only eligible for
    /// ingestion while a receptacle-flagged stack shares the cell.
    pub hopper: bool,
    /// Backs the default feedstock predicate.
    pub ingestible: bool,
}

impl MaterialDef {
    /// A plain material with no stats and no flags set.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stats: BTreeMap::new(),
            hopper: false,
            ingestible: false,
        }
    }
}

/// Builder for constructing an immutable [`MaterialRegistry`].
#[derive(Debug, Default)]
pub struct MaterialRegistryBuilder {
    defs: Vec<MaterialDef>,
    name_to_id: HashMap<String, MaterialKindId>,
}

impl MaterialRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material kind. Returns its ID. Re-registering a name
    /// points the name at the newest definition.
    pub fn register(&mut self, def: MaterialDef) -> MaterialKindId {
        let id = MaterialKindId(self.defs.len() as u32);
        self.name_to_id.insert(def.name.clone(), id);
        self.defs.push(def);
        id
    }

    /// Lookup a registered kind by name.
    pub fn material_id(&self, name: &str) -> Option<MaterialKindId> {
        self.name_to_id.get(name).copied()
    }

    /// Finalize and build the immutable registry.
    pub fn build(self) -> MaterialRegistry {
        MaterialRegistry {
            defs: self.defs,
            name_to_id: self.name_to_id,
        }
    }
}

/// Immutable material registry. Frozen after build; the stat-lookup
/// collaborator for the conversion engine.
#[derive(Debug)]
pub struct MaterialRegistry {
    defs: Vec<MaterialDef>,
    name_to_id: HashMap<String, MaterialKindId>,
}

impl MaterialRegistry {
    pub fn get(&self, id: MaterialKindId) -> Option<&MaterialDef> {
        self.defs.get(id.0 as usize)
    }

    pub fn material_id(&self, name: &str) -> Option<MaterialKindId> {
        self.name_to_id.get(name).copied()
    }

    /// The numeric value of a stat on a kind. Unknown kinds and absent
    /// stats read as zero.
    pub fn stat_value(&self, kind: MaterialKindId, stat: StatId) -> Fixed64 {
        self.get(kind)
            .and_then(|def| def.stats.get(&stat).copied())
            .unwrap_or(Fixed64::from_num(0))
    }

    pub fn is_hopper(&self, kind: MaterialKindId) -> bool {
        self.get(kind).map(|def| def.hopper).unwrap_or(false)
    }

    pub fn is_ingestible(&self, kind: MaterialKindId) -> bool {
        self.get(kind).map(|def| def.ingestible).unwrap_or(false)
    }

    pub fn material_count(&self) -> usize {
        self.defs.len()
    }
}
