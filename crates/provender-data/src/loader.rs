//! Resolution pipeline: reads definition files, resolves name references,
//! and produces a frozen registry plus device configurations.
//!
//! Files may be RON, JSON, or TOML; the format is detected from the
//! extension. TOML files put their lists under a top-level table key.

use crate::schema::{DeviceData, FeedstockData, MaterialData};
use provender_core::dispenser::{DispenserConfig, PowerGating};
use provender_core::fixed::f64_to_fixed64;
use provender_core::id::{MaterialKindId, StatId};
use provender_core::registry::{MaterialDef, MaterialRegistry, MaterialRegistryBuilder};
use provender_core::selector::FeedstockFilter;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {0}")]
    UnsupportedFormat(PathBuf),

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {origin}: {detail}")]
    Parse { origin: String, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}'")]
    UnresolvedRef {
        name: String,
        expected_kind: &'static str,
    },

    /// The same name was declared twice.
    #[error("duplicate name '{0}'")]
    DuplicateName(String),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection and file discovery
// ===========================================================================

/// Supported definition file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Json,
    Toml,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        _ => Err(DataLoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Scan a directory for a definition file with the given base name.
///
/// Returns `Ok(None)` if no file is found, or `ConflictingFormats` if the
/// same base name exists in more than one format.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in ["ron", "json", "toml"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }
    Ok(found)
}

/// Like [`find_data_file`], but the file must exist.
pub fn require_data_file(
    dir: &Path,
    base_name: &'static str,
) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Parse a list of definitions from a string in the given format. For
/// TOML, the list is taken from the `toml_key` entry of a top-level table.
pub fn parse_list_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    toml_key: &str,
    origin: &str,
) -> Result<Vec<T>, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        origin: origin.to_string(),
        detail,
    };

    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => {
            let table: toml::Value =
                toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            let list = table
                .get(toml_key)
                .ok_or_else(|| parse_err(format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            list.try_into()
                .map_err(|e: toml::de::Error| parse_err(e.to_string()))
        }
    }
}

/// Read a definition file and parse the list it holds.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_list_str(&content, format, toml_key, &path.display().to_string())
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Everything a host needs to run devices: the frozen registry, the stat
/// name table, and per-type device configurations.
#[derive(Debug)]
pub struct GameData {
    pub registry: MaterialRegistry,
    /// Stat identifiers by declared name.
    pub stat_ids: HashMap<String, StatId>,
    /// Device configurations by type name.
    pub devices: HashMap<String, DispenserConfig>,
}

/// Resolve parsed definitions into a [`GameData`].
pub fn build_game_data(
    materials: Vec<MaterialData>,
    devices: Vec<DeviceData>,
) -> Result<GameData, DataLoadError> {
    // Stats get identifiers in first-seen order across the material list.
    let mut stat_ids: HashMap<String, StatId> = HashMap::new();
    for material in &materials {
        for stat_name in material.stats.keys() {
            let next = StatId(stat_ids.len() as u16);
            stat_ids.entry(stat_name.clone()).or_insert(next);
        }
    }

    let mut builder = MaterialRegistryBuilder::new();
    let mut seen = HashSet::new();
    for material in &materials {
        if !seen.insert(material.name.clone()) {
            return Err(DataLoadError::DuplicateName(material.name.clone()));
        }
        let stats: BTreeMap<StatId, _> = material
            .stats
            .iter()
            .map(|(name, value)| (stat_ids[name], f64_to_fixed64(*value)))
            .collect();
        builder.register(MaterialDef {
            name: material.name.clone(),
            stats,
            hopper: material.hopper,
            ingestible: material.ingestible,
        });
    }
    let registry = builder.build();

    let resolve_material = |name: &str| -> Result<MaterialKindId, DataLoadError> {
        registry
            .material_id(name)
            .ok_or_else(|| DataLoadError::UnresolvedRef {
                name: name.to_string(),
                expected_kind: "material",
            })
    };

    let mut configs = HashMap::new();
    for device in &devices {
        if configs.contains_key(&device.name) {
            return Err(DataLoadError::DuplicateName(device.name.clone()));
        }
        let base_stat =
            stat_ids
                .get(&device.base_stat)
                .copied()
                .ok_or_else(|| DataLoadError::UnresolvedRef {
                    name: device.base_stat.clone(),
                    expected_kind: "stat",
                })?;
        let feedstock = match &device.feedstock {
            FeedstockData::Ingestible => FeedstockFilter::Ingestible,
            FeedstockData::Any => FeedstockFilter::Any,
            FeedstockData::Kinds(names) => {
                let kinds: BTreeSet<MaterialKindId> = names
                    .iter()
                    .map(|name| resolve_material(name))
                    .collect::<Result<_, _>>()?;
                FeedstockFilter::Kinds(kinds)
            }
        };
        configs.insert(
            device.name.clone(),
            DispenserConfig {
                output_kind: resolve_material(&device.output)?,
                base_stat,
                conversion_ratio: f64_to_fixed64(device.conversion_ratio),
                reserve_capacity: f64_to_fixed64(device.reserve_capacity),
                pull_rate_per_day: f64_to_fixed64(device.pull_rate_per_day),
                max_pull_power: f64_to_fixed64(device.max_pull_power),
                power_gating: if device.powered_intake {
                    PowerGating::Gated
                } else {
                    PowerGating::Ungated
                },
                feedstock,
            },
        );
    }

    Ok(GameData {
        registry,
        stat_ids,
        devices: configs,
    })
}

/// Load definitions from a directory: a required `materials` file and an
/// optional `devices` file, each in any supported format.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let materials_path = require_data_file(dir, "materials")?;
    let materials: Vec<MaterialData> = deserialize_list(&materials_path, "materials")?;

    let devices: Vec<DeviceData> = match find_data_file(dir, "devices")? {
        Some(path) => deserialize_list(&path, "devices")?,
        None => Vec::new(),
    };

    build_game_data(materials, devices)
}

// ===========================================================================
// Tests
// ===========================================================================
