//! Schema-driven planning.
//!
//! A plan compares prior state with the proposed configuration over the
//! attributes and blocks a schema declares. Defaults are filled in, computed
//! attributes keep their prior value, and a change to a force-new attribute
//! turns the update into a replacement.
//!
//! The API answers with `""` or `[]` for optional fields it was never given,
//! so for optional attributes and list blocks an empty value compares equal
//! to an unset one.

use serde_json::{Map, Value};

use crate::schema::Schema;
use crate::types::{AttributeChange, PlanResult};

/// Plan the transition from `prior` to `proposed`.
///
/// `prior` is `None` for a create; a null `proposed` plans a delete.
pub fn plan(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    let prior = prior.and_then(Value::as_object);

    let proposed = match proposed {
        Value::Object(map) => map,
        _ => return plan_delete(schema, prior),
    };

    let planned = fill_planned(schema, prior, proposed);

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for name in field_names(schema) {
        let before = prior.and_then(|p| comparable(schema, p, name));
        let after = comparable(schema, &planned, name);

        let change = match (before, after) {
            (None, Some(after)) => AttributeChange::added(name, after.clone()),
            (Some(before), None) => AttributeChange::removed(name, before.clone()),
            (Some(before), Some(after)) if before != after => {
                AttributeChange::modified(name, before.clone(), after.clone())
            },
            _ => continue,
        };

        if prior.is_some() && is_force_new(schema, name) {
            requires_replace = true;
        }
        changes.push(change);
    }

    if changes.is_empty() {
        PlanResult::no_change(Value::Object(planned))
    } else {
        PlanResult::with_changes(Value::Object(planned), changes, requires_replace)
    }
}

fn plan_delete(schema: &Schema, prior: Option<&Map<String, Value>>) -> PlanResult {
    let changes = match prior {
        Some(prior) => field_names(schema)
            .filter_map(|name| present(prior, name).map(|v| AttributeChange::removed(name, v.clone())))
            .collect(),
        None => Vec::new(),
    };
    PlanResult::with_changes(Value::Null, changes, false)
}

fn fill_planned(
    schema: &Schema,
    prior: Option<&Map<String, Value>>,
    proposed: &Map<String, Value>,
) -> Map<String, Value> {
    let mut planned = proposed.clone();

    for (name, attr) in &schema.block.attributes {
        if present(&planned, name).is_some() {
            continue;
        }

        let carried = if attr.flags.computed {
            prior.and_then(|p| present(p, name)).cloned()
        } else {
            None
        };

        if let Some(value) = carried.or_else(|| attr.default.clone()) {
            planned.insert(name.clone(), value);
        }
    }

    planned
}

fn field_names(schema: &Schema) -> impl Iterator<Item = &str> {
    schema
        .block
        .attributes
        .keys()
        .chain(schema.block.blocks.keys())
        .map(String::as_str)
}

fn present<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    map.get(name).filter(|v| !v.is_null())
}

fn comparable<'a>(schema: &Schema, map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    present(map, name).filter(|value| !(empty_means_unset(schema, name) && is_empty(value)))
}

fn empty_means_unset(schema: &Schema, name: &str) -> bool {
    match schema.block.attributes.get(name) {
        Some(attr) => attr.flags.optional && !attr.flags.computed,
        None => schema.block.blocks.contains_key(name),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn is_force_new(schema: &Schema, name: &str) -> bool {
    schema
        .block
        .attributes
        .get(name)
        .is_some_and(|attr| attr.force_new)
}
