//! Data-driven definitions for provender devices.
//!
//! Materials and device types are declared in RON, JSON, or TOML files and
//! resolved by name into a frozen [`provender_core::registry::MaterialRegistry`]
//! plus ready-to-use device configurations.

pub mod loader;
pub mod schema;

pub use loader::{build_game_data, load_game_data, DataLoadError, Format, GameData};
