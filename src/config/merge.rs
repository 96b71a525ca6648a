//! Field-by-field merging of configuration tiers.
//!
//! Each tier is parsed into a `serde_json::Value` and layered over the ones
//! below it. Mappings merge key by key; any other value in a higher tier
//! replaces the lower one outright. A null in a higher tier leaves the lower
//! value alone, so an empty YAML key does not erase a default.

use serde_json::Value;

/// Layer `overlay` onto `base` in place.
fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Merge tiers in order, lowest priority first.
pub(super) fn merge_tiers(tiers: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = Value::Null;
    for tier in tiers {
        merge_into(&mut merged, tier);
    }
    merged
}
