//! Persistence for device state.
//!
//! Binary snapshots via `bitcode` behind a versioned header, plus an
//! FNV-1a state hash for save verification. The grid and registry are
//! host-owned and persisted elsewhere; only the device's own persistent
//! fields travel through here.

use crate::dispenser::DispenserState;
use crate::fixed::{Fixed64, Ticks};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a device-state snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xD15_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while saving.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur while loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every snapshot. Enables format detection and
/// version checking before trusting the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Device tick at the time the snapshot was taken.
    pub tick: Ticks,
}

impl SnapshotHeader {
    pub fn new(tick: Ticks) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(LoadError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(LoadError::FutureVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateSnapshot {
    header: SnapshotHeader,
    state: DispenserState,
}

/// Serialize a device's persistent state.
pub fn save_state(state: &DispenserState) -> Result<Vec<u8>, SaveError> {
    let snapshot = StateSnapshot {
        header: SnapshotHeader::new(state.tick),
        state: state.clone(),
    };
    bitcode::serialize(&snapshot).map_err(|e| SaveError::Encode(e.to_string()))
}

/// Deserialize a device's persistent state, validating the header.
pub fn load_state(data: &[u8]) -> Result<DispenserState, LoadError> {
    let snapshot: StateSnapshot =
        bitcode::deserialize(data).map_err(|e| LoadError::Decode(e.to_string()))?;
    snapshot.header.validate()?;
    Ok(snapshot.state)
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash over state, for save verification and
/// desync checks. FNV-1a (64-bit); not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash the persistent fields of a device state.
pub fn state_hash(state: &DispenserState) -> u64 {
    let mut h = StateHash::new();
    h.write_fixed64(state.processed_reserve);
    h.write_fixed64(state.pull_power);
    h.write_u64(state.tick);
    for kind in &state.contained_kinds {
        h.write_u32(kind.0);
    }
    h.finish()
}
