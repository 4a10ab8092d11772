//! Merge a local parameter document into a fetched template.
//!
//! The merge is shallow and key-wise: local entries overwrite or extend the
//! server's parameter map, server-only entries are left byte-identical, and
//! nothing here touches the network or the concurrency token.

use crate::document::LocalDocument;
use crate::types::{Parameter, ParameterValue, RemoteTemplate, TemplateVersion, ValueType};
use serde_json::Value as JsonValue;
use std::collections::btree_map::Entry;

/// Version description stamped on every published revision.
pub const VERSION_DESCRIPTION: &str = "Parameter sync via uplink";

/// What a merge produced.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged template, ready to publish.
    pub template: RemoteTemplate,
    /// Keys that did not exist on the server before, sorted.
    pub added_keys: Vec<String>,
    /// Count of local keys that overwrote an existing server entry.
    pub updated: usize,
}

impl MergeOutcome {
    pub fn added(&self) -> usize {
        self.added_keys.len()
    }

    /// Total parameters in the merged template.
    pub fn total(&self) -> usize {
        self.template.parameters.len()
    }
}

/// Merge `local` into `remote` by key.
///
/// Entries without a publishable default value are skipped entirely: absent
/// or null defaults, `false`, `0`, and empty arrays/objects never publish,
/// while every string does — including `"0"` and `""`, which are deliberate
/// sentinels for intentionally-zero and intentionally-empty defaults. A
/// malformed entry (e.g. `defaultValue` not an object) reads as absent and
/// is skipped rather than failing the merge.
pub fn merge(remote: &RemoteTemplate, local: &LocalDocument) -> MergeOutcome {
    let mut template = remote.clone();
    let mut added_keys = Vec::new();
    let mut updated = 0;

    for (key, entry) in &local.parameters {
        let default = entry.get("defaultValue").and_then(|dv| dv.get("value"));
        let Some(default) = publishable(default) else {
            continue;
        };

        let value_type = ValueType::from_tag(entry.get("valueType").and_then(JsonValue::as_str));
        let description = entry
            .get("description")
            .and_then(JsonValue::as_str)
            .filter(|text| !text.is_empty());

        match template.parameters.entry(key.clone()) {
            Entry::Occupied(mut slot) => {
                let parameter = slot.get_mut();
                parameter.default_value = Some(ParameterValue::new(stringify(default)));
                parameter.value_type = Some(value_type);
                // An empty local description never erases an existing one.
                if let Some(text) = description {
                    parameter.description = Some(text.to_string());
                }
                updated += 1;
            }
            Entry::Vacant(slot) => {
                slot.insert(Parameter {
                    default_value: Some(ParameterValue::new(stringify(default))),
                    value_type: Some(value_type),
                    description: description.map(str::to_string),
                    extra_fields: Default::default(),
                });
                added_keys.push(key.clone());
            }
        }
    }

    added_keys.sort();

    template
        .version
        .get_or_insert_with(TemplateVersion::default)
        .description = Some(VERSION_DESCRIPTION.to_string());

    MergeOutcome {
        template,
        added_keys,
        updated,
    }
}

// Skip rule: nulls and falsy non-strings drop out; any string passes.
fn publishable(value: Option<&JsonValue>) -> Option<&JsonValue> {
    let value = value?;
    let keep = match value {
        JsonValue::Null => false,
        JsonValue::String(_) => true,
        JsonValue::Bool(flag) => *flag,
        JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(fields) => !fields.is_empty(),
    };
    keep.then_some(value)
}

// Strings pass through verbatim; everything else becomes its compact JSON
// text, so numbers and booleans land as "2.5" and "true".
fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}
