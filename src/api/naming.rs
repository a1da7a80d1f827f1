// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! camelCase ↔ snake_case translation for JSON field names.
//!
//! Both functions are total. They are mutual inverses on canonical
//! identifiers: camelCase names that start lowercase and never contain two
//! adjacent uppercase letters, and snake_case names that are lowercase with
//! single, interior underscores. Every field name used on the wire is
//! canonical.

use serde_json::{Map, Value};

/// Which way object keys are translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToSnake,
    ToCamel,
}

/// `gasLimit` → `gas_limit`
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `gas_limit` → `gasLimit`
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Translate every object key in `value`, recursively.
pub fn rename_keys(value: Value, direction: Direction) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let key = match direction {
                        Direction::ToSnake => camel_to_snake(&key),
                        Direction::ToCamel => snake_to_camel(&key),
                    };
                    (key, rename_keys(value, direction))
                })
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| rename_keys(item, direction))
                .collect(),
        ),
        other => other,
    }
}
