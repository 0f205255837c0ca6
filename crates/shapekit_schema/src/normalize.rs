//! Argument checking and shorthand coercion.
//!
//! A nested field accepts either an already-built [`Descriptor`] or a plain
//! [`RawFieldMap`]. The mapping is turned into a descriptor by running the
//! nested schema's own constructor over its entries, recursively.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use crate::descriptor::Descriptor;
use crate::error::{ShapeError, ShapeResult};
use crate::schema::{FieldType, Schema};
use crate::value::{RawFieldMap, Value};

/// Input accepted where a nested descriptor is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedArg {
    Built(Descriptor),
    Raw(RawFieldMap),
}

impl From<Descriptor> for NestedArg {
    fn from(d: Descriptor) -> Self {
        NestedArg::Built(d)
    }
}

impl From<RawFieldMap> for NestedArg {
    fn from(map: RawFieldMap) -> Self {
        NestedArg::Raw(map)
    }
}

/// Resolve a nested argument to a descriptor of `schema`.
pub fn normalize(arg: NestedArg, schema: &Arc<Schema>) -> ShapeResult<Descriptor> {
    match arg {
        NestedArg::Built(d) if d.type_name() == schema.name() => Ok(d),
        NestedArg::Built(d) => Err(ShapeError::mismatch(
            format!("{} or mapping", schema.name()),
            d.type_name(),
        )),
        NestedArg::Raw(map) => construct(schema, map.into_iter().collect()),
    }
}

/// Build a descriptor from named arguments.
///
/// Unknown names are rejected first, then missing required fields, then each
/// supplied value is checked in schema order. Nothing is returned unless
/// every check passes.
pub(crate) fn construct(schema: &Arc<Schema>, args: Vec<(String, Value)>) -> ShapeResult<Descriptor> {
    let mut supplied: BTreeMap<String, Value> = BTreeMap::new();

    for (name, value) in args {
        if schema.get_field(&name).is_none() {
            let expected = schema
                .fields()
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ShapeError::mismatch(
                format!("one of [{}]", expected),
                "unexpected argument",
            )
            .at(&name)
            .in_descriptor(schema.name()));
        }

        if value.is_null() {
            supplied.remove(&name);
        } else {
            supplied.insert(name, value);
        }
    }

    if let Some(missing) = schema.required_fields().find(|f| !supplied.contains_key(&f.name)) {
        return Err(ShapeError::MissingRequired {
            descriptor: schema.name().to_string(),
            property: missing.name.clone(),
        });
    }

    let mut values = BTreeMap::new();
    for field in schema.fields() {
        if let Some(value) = supplied.remove(&field.name) {
            let value = check_value(&field.field_type, value)
                .map_err(|e| e.at(&field.name).in_descriptor(schema.name()))?;
            values.insert(field.name.clone(), value);
        }
    }

    trace!(descriptor = schema.name(), fields = values.len(), "Constructed descriptor");
    Ok(Descriptor::from_parts(Arc::clone(schema), values))
}

/// Check `value` against `field_type`, coercing raw mappings in nested positions.
pub fn check_value(field_type: &FieldType, value: Value) -> ShapeResult<Value> {
    match (field_type, value) {
        (_, Value::Null) => Err(ShapeError::mismatch(field_type.to_string(), "null")),

        (FieldType::Any, value) => Ok(value),

        (FieldType::Resolvable(_), Value::Token(token)) => Ok(Value::Token(token)),
        (FieldType::Resolvable(inner), value) => {
            check_value(inner, value).map_err(|e| match e {
                // Report the full union when the value itself was wrong.
                ShapeError::ArgumentMismatch {
                    descriptor,
                    argument,
                    actual,
                    ..
                } if descriptor.is_empty() && argument.is_empty() => ShapeError::ArgumentMismatch {
                    descriptor,
                    argument,
                    expected: field_type.to_string(),
                    actual,
                },
                other => other,
            })
        }

        (FieldType::String, value @ (Value::String(_) | Value::Token(_))) => Ok(value),
        (FieldType::Number, value @ Value::Number(_)) => Ok(value),
        (FieldType::Boolean, value @ Value::Bool(_)) => Ok(value),

        (FieldType::Enum(allowed), Value::String(s)) if allowed.contains(&s) => Ok(Value::String(s)),
        (FieldType::Enum(_), value @ Value::Token(_)) => Ok(value),

        (FieldType::List(inner), Value::List(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| check_value(inner, item).map_err(|e| e.at(&format!("[{}]", i))))
            .collect::<ShapeResult<Vec<_>>>()
            .map(Value::List),

        (FieldType::Map(inner), Value::Map(map)) => {
            let mut checked = RawFieldMap::new();
            for (key, item) in map {
                let item = check_value(inner, item).map_err(|e| e.at(&key))?;
                checked.insert(key, item);
            }
            Ok(Value::Map(checked))
        }

        (FieldType::Nested(schema), Value::Descriptor(d)) => {
            normalize(NestedArg::Built(d), schema).map(Value::Descriptor)
        }
        (FieldType::Nested(schema), Value::Map(map)) => {
            normalize(NestedArg::Raw(map), schema).map(Value::Descriptor)
        }

        (field_type, value) => Err(ShapeError::mismatch(field_type.to_string(), value.describe())),
    }
}
