//! Structural merge utilities.
//!
//! Two layers:
//! - `deep_merge` works on untyped JSON and is what persistence reloads and client patches go
//!   through. Objects merge key-wise, arrays replace wholesale, scalars from the source win.
//! - `Confirmable` / `prefer_confirmed` / `union_dedup` are the typed per-field policies the step
//!   mergers apply explicitly, field by field.

use serde_json::{Map, Value};

use crate::template::models::{Sentinel, Template, INSUFFICIENT_INFO};

/// Merges `source` onto `target`. Keys absent from `source` never erase `target` values.
pub fn deep_merge(target: &Value, source: &Value) -> Value {
    match (target, source) {
        (Value::Object(t), Value::Object(s)) => {
            let mut merged: Map<String, Value> = t.clone();
            for (key, source_value) in s {
                let next = match t.get(key) {
                    Some(target_value) => deep_merge(target_value, source_value),
                    None => source_value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        // Arrays, scalars and explicit nulls: the source value wins.
        (_, source) => source.clone(),
    }
}

/// Removes object members that are explicitly `null`, recursively, so that serde defaults
/// fill them back in as the empty/unknown value on decode.
pub fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_nulls).collect()),
        other => other,
    }
}

impl Template {
    /// Decodes a JSON value laid over the empty template's shape. Fields missing from `value`
    /// keep their defaults; `None` if any present field has an incompatible shape.
    pub fn from_default_shape(value: &Value) -> Option<Template> {
        let mut merged = deep_merge(&Template::empty().to_value(), value);
        // History payloads are free-form JSON where null is data, so they skip pruning.
        let history = merged
            .pointer_mut("/metadata/analysisHistory")
            .map(Value::take)
            .filter(|h| !h.is_null());
        let mut pruned = prune_nulls(merged);
        if let (Some(history), Some(metadata)) = (
            history,
            pruned.get_mut("metadata").and_then(Value::as_object_mut),
        ) {
            metadata.insert("analysisHistory".to_string(), history);
        }
        serde_json::from_value(pruned).ok()
    }

    /// Applies a partial JSON update. An explicit `null` clears the field to its empty value.
    pub fn apply_patch(&self, patch: &Value) -> Option<Template> {
        let merged = deep_merge(&self.to_value(), patch);
        Template::from_default_shape(&merged)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Typed field policies
// ────────────────────────────────────────────────────────────────────────────

/// A value counts as confirmed once it carries real content: a non-empty string that is not the
/// insufficient-information phrase, a known enum variant, a present option, a non-zero number.
pub trait Confirmable {
    fn is_confirmed(&self) -> bool;
}

impl Confirmable for String {
    fn is_confirmed(&self) -> bool {
        let trimmed = self.trim();
        !trimmed.is_empty() && !trimmed.contains(INSUFFICIENT_INFO)
    }
}

impl<T: Confirmable> Confirmable for Option<T> {
    fn is_confirmed(&self) -> bool {
        self.as_ref().map(Confirmable::is_confirmed).unwrap_or(false)
    }
}

impl Confirmable for i32 {
    fn is_confirmed(&self) -> bool {
        *self != 0
    }
}

impl Confirmable for u32 {
    fn is_confirmed(&self) -> bool {
        *self != 0
    }
}

impl Confirmable for u64 {
    fn is_confirmed(&self) -> bool {
        *self != 0
    }
}

impl Confirmable for bool {
    fn is_confirmed(&self) -> bool {
        // A present bool (inside Option) is always a decision; bare bools are flags.
        true
    }
}

impl<T> Confirmable for Vec<T> {
    fn is_confirmed(&self) -> bool {
        !self.is_empty()
    }
}

/// Wraps an enumeration so it can use the shared policy without a blanket impl.
pub fn enum_confirmed<E: Sentinel>(value: &E) -> bool {
    !value.is_unknown()
}

/// Previous confirmed value wins, then a confirmed extraction, then the previous value.
pub fn prefer_confirmed<T: Confirmable>(previous: T, extracted: T) -> T {
    if previous.is_confirmed() {
        previous
    } else if extracted.is_confirmed() {
        extracted
    } else {
        previous
    }
}

/// Enumeration flavour of [`prefer_confirmed`].
pub fn prefer_known<E: Sentinel>(previous: E, extracted: E) -> E {
    if enum_confirmed(&previous) {
        previous
    } else if enum_confirmed(&extracted) {
        extracted
    } else {
        previous
    }
}

/// Ordered union: previous entries first, then unseen extracted entries. Duplicates are
/// judged on value, and blank strings never enter the list.
pub fn union_dedup(previous: Vec<String>, extracted: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(previous.len() + extracted.len());
    for item in previous.into_iter().chain(extracted) {
        let item = item.trim().to_string();
        if item.is_empty() || merged.contains(&item) {
            continue;
        }
        merged.push(item);
    }
    merged
}

/// De-duplicates by value, keeping first occurrences.
pub fn dedup_by_value<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Record lists (team rows, phases) are confirmed as a whole once non-empty.
pub fn keep_confirmed_list<T: PartialEq>(previous: Vec<T>, extracted: Vec<T>) -> Vec<T> {
    if previous.is_empty() {
        dedup_by_value(extracted)
    } else {
        dedup_by_value(previous)
    }
}
