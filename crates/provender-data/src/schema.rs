//! Serde schemas for material and device definition files.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A material kind as declared in data.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialData {
    pub name: String,
    /// Stat values keyed by stat name.
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    /// Collection receptacle flag.
    #[serde(default)]
    pub hopper: bool,
    #[serde(default)]
    pub ingestible: bool,
}

/// Feedstock eligibility as declared in data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedstockData {
    #[default]
    Ingestible,
    Any,
    /// Explicit whitelist, referencing materials by name.
    Kinds(Vec<String>),
}

fn default_true() -> bool {
    true
}

/// A dispenser device type as declared in data.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceData {
    pub name: String,
    /// Output material, referenced by name.
    pub output: String,
    /// Common-currency stat, referenced by name.
    pub base_stat: String,
    pub conversion_ratio: f64,
    pub reserve_capacity: f64,
    pub pull_rate_per_day: f64,
    pub max_pull_power: f64,
    /// Whether intake requires power. On unless declared otherwise.
    #[serde(default = "default_true")]
    pub powered_intake: bool,
    #[serde(default)]
    pub feedstock: FeedstockData,
}
