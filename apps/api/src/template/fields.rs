//! Per-field update functions used by the presentation layer.
//!
//! Invalid values are clamped where a nearest valid value exists (negative numbers become 0);
//! only structurally impossible requests (unknown field, wrong shape) are rejected.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::template::merge::dedup_by_value;
use crate::template::models::{Template, SECTIONS};

/// Append-only fields that no setter may touch.
const READ_ONLY_FIELDS: &[(&str, &str)] = &[("metadata", "analysisHistory")];

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("Unknown section '{0}'")]
    UnknownSection(String),

    #[error("Unknown field '{section}.{field}'")]
    UnknownField { section: String, field: String },

    #[error("Field '{0}' is read-only")]
    ReadOnly(String),

    #[error("Field '{0}' is not a list")]
    NotAList(String),

    #[error("Value does not fit field '{0}'")]
    InvalidValue(String),
}

fn clamp_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) if n.as_i64().map(|i| i < 0).unwrap_or(false) => Value::from(0),
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().unwrap_or(0.0);
            if f.is_finite() && f > 0.0 {
                Value::from(f.round() as u64)
            } else {
                Value::from(0)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(clamp_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, clamp_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}

fn check_writable(section: &str, field: &str) -> Result<(), FieldError> {
    if !SECTIONS.contains(&section) {
        return Err(FieldError::UnknownSection(section.to_string()));
    }
    let head = field.split('.').next().unwrap_or(field);
    if READ_ONLY_FIELDS.contains(&(section, head)) {
        return Err(FieldError::ReadOnly(format!("{section}.{field}")));
    }
    Ok(())
}

/// Mutable slot for `section.field`, following dotted paths. Only existing keys resolve.
fn slot<'a>(root: &'a mut Value, section: &str, field: &str) -> Result<&'a mut Value, FieldError> {
    let unknown = || FieldError::UnknownField {
        section: section.to_string(),
        field: field.to_string(),
    };
    let mut node = root
        .get_mut(section)
        .ok_or_else(|| FieldError::UnknownSection(section.to_string()))?;
    for key in field.split('.') {
        node = node
            .as_object_mut()
            .and_then(|obj: &mut Map<String, Value>| obj.get_mut(key))
            .ok_or_else(unknown)?;
    }
    Ok(node)
}

fn decode(root: &Value, section: &str, field: &str) -> Result<Template, FieldError> {
    Template::from_default_shape(root)
        .ok_or_else(|| FieldError::InvalidValue(format!("{section}.{field}")))
}

fn is_completion_flag(section: &str, field: &str) -> bool {
    section == "metadata" && field.starts_with("step") && field.ends_with("Completed")
}

/// Replaces one field. Lists are de-duplicated; completion flags never go back to false.
pub fn set_field(
    template: &Template,
    section: &str,
    field: &str,
    value: Value,
) -> Result<Template, FieldError> {
    check_writable(section, field)?;
    let mut root = template.to_value();
    let target = slot(&mut root, section, field)?;

    if is_completion_flag(section, field) && *target == Value::Bool(true) {
        return Ok(template.clone());
    }

    *target = match clamp_numbers(value) {
        Value::Array(items) => Value::Array(dedup_by_value(items)),
        other => other,
    };
    decode(&root, section, field)
}

fn list_slot<'a>(
    root: &'a mut Value,
    section: &str,
    field: &str,
) -> Result<&'a mut Vec<Value>, FieldError> {
    slot(root, section, field)?
        .as_array_mut()
        .ok_or_else(|| FieldError::NotAList(format!("{section}.{field}")))
}

/// Appends an item unless an equal one is already present.
pub fn add_array_item(
    template: &Template,
    section: &str,
    field: &str,
    value: Value,
) -> Result<Template, FieldError> {
    check_writable(section, field)?;
    let mut root = template.to_value();
    let items = list_slot(&mut root, section, field)?;
    let value = clamp_numbers(value);
    if items.contains(&value) {
        return Ok(template.clone());
    }
    items.push(value);
    decode(&root, section, field)
}

/// Replaces the item at `index`. Out-of-range indexes leave the template unchanged.
pub fn set_array_item(
    template: &Template,
    section: &str,
    field: &str,
    index: usize,
    value: Value,
) -> Result<Template, FieldError> {
    check_writable(section, field)?;
    let mut root = template.to_value();
    let items = list_slot(&mut root, section, field)?;
    match items.get_mut(index) {
        Some(item) => *item = clamp_numbers(value),
        None => return Ok(template.clone()),
    }
    let deduped = dedup_by_value(std::mem::take(items));
    *items = deduped;
    decode(&root, section, field)
}

/// Removes the item at `index`. Out-of-range indexes leave the template unchanged.
pub fn remove_array_item(
    template: &Template,
    section: &str,
    field: &str,
    index: usize,
) -> Result<Template, FieldError> {
    check_writable(section, field)?;
    let mut root = template.to_value();
    let items = list_slot(&mut root, section, field)?;
    if index >= items.len() {
        return Ok(template.clone());
    }
    items.remove(index);
    decode(&root, section, field)
}

/// Applies a partial JSON update under the setters' rules. Numbers clamp, completion flags
/// never go back to false, and the analysis history survives even a `"metadata": null` patch.
pub fn patch_template(template: &Template, patch: &Value) -> Result<Template, FieldError> {
    let sections = patch
        .as_object()
        .ok_or_else(|| FieldError::InvalidValue("template".to_string()))?;
    if let Some(unknown) = sections.keys().find(|k| !SECTIONS.contains(&k.as_str())) {
        return Err(FieldError::UnknownSection(unknown.clone()));
    }
    if patch.pointer("/metadata/analysisHistory").is_some() {
        return Err(FieldError::ReadOnly("metadata.analysisHistory".to_string()));
    }

    let mut next = template
        .apply_patch(&clamp_numbers(patch.clone()))
        .ok_or_else(|| FieldError::InvalidValue("template".to_string()))?;
    next.metadata.analysis_history = template.metadata.analysis_history.clone();
    for step in 1..=4 {
        if template.metadata.step_completed(step) {
            next.metadata.mark_step_completed(step);
        }
    }
    Ok(next)
}
