use fixed::types::{I16F16, I32F32};

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Q16.16 fixed-point for compact storage.
pub type Fixed32 = I16F16;

/// Rare ticks are the atomic unit of device time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Add `add` to `base`, saturating at `cap`. Excess beyond the cap is
/// silently discarded, not carried over.
#[inline]
pub fn add_capped(base: Fixed64, add: Fixed64, cap: Fixed64) -> Fixed64 {
    (base + add).min(cap)
}

/// Subtract `sub` from `base`, flooring at zero.
#[inline]
pub fn sub_floored(base: Fixed64, sub: Fixed64) -> Fixed64 {
    (base - sub).max(Fixed64::from_num(0))
}

/// How many whole units of `unit_cost` fit in `value` (floor of the ratio).
/// Zero or negative unit cost yields zero.
#[inline]
pub fn whole_units(value: Fixed64, unit_cost: Fixed64) -> u32 {
    if unit_cost <= Fixed64::from_num(0) {
        return 0;
    }
    (value / unit_cost).to_num::<i64>().max(0) as u32
}

/// How many whole units of `unit_cost` are needed to cover `value`
/// (ceiling of the ratio). Zero or negative unit cost yields zero.
#[inline]
pub fn units_to_cover(value: Fixed64, unit_cost: Fixed64) -> u32 {
    if unit_cost <= Fixed64::from_num(0) {
        return 0;
    }
    let q = value / unit_cost;
    let raw: i64 = q.to_num();
    if q.frac() > Fixed64::from_num(0) {
        (raw + 1).max(0) as u32
    } else {
        raw.max(0) as u32
    }
}
