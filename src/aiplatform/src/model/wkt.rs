// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON encoding for the protobuf well-known types used in the messages.
//!
//! The messages derive both [prost::Message] and the serde traits. The
//! [prost_types] well-known types do not implement the serde traits, these
//! modules provide their canonical JSON representation.

use base64::Engine as _;
use prost_types::value::Kind;
use prost_types::{Any, ListValue, Struct, Value};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

/// Converts a protobuf `Value` to its JSON representation.
pub(crate) fn to_json(value: &Value) -> serde_json::Value {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(*b),
        // NaN and infinities have no JSON number representation.
        Some(Kind::NumberValue(n)) => Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s.clone()),
        Some(Kind::ListValue(l)) => {
            serde_json::Value::Array(l.values.iter().map(to_json).collect())
        }
        Some(Kind::StructValue(s)) => serde_json::Value::Object(
            s.fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

/// Converts a JSON value to a protobuf `Value`.
pub(crate) fn from_json(value: serde_json::Value) -> Value {
    let kind = match value {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(b) => Kind::BoolValue(b),
        serde_json::Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        serde_json::Value::String(s) => Kind::StringValue(s),
        serde_json::Value::Array(a) => Kind::ListValue(ListValue {
            values: a.into_iter().map(from_json).collect(),
        }),
        serde_json::Value::Object(o) => Kind::StructValue(Struct {
            fields: o.into_iter().map(|(k, v)| (k, from_json(v))).collect(),
        }),
    };
    Value { kind: Some(kind) }
}

/// `#[serde(with)]` support for `Option<prost_types::Value>`.
pub(crate) mod optional_value {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Value>, s: S) -> Result<S::Ok, S::Error> {
        value.as_ref().map(to_json).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
        let v = Option::<serde_json::Value>::deserialize(d)?;
        Ok(v.map(from_json))
    }
}

/// `#[serde(with)]` support for `Vec<prost_types::Value>`.
pub(crate) mod value_list {
    use super::*;

    pub fn serialize<S: Serializer>(value: &[Value], s: S) -> Result<S::Ok, S::Error> {
        value.iter().map(to_json).collect::<Vec<_>>().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Value>, D::Error> {
        let v = Vec::<serde_json::Value>::deserialize(d)?;
        Ok(v.into_iter().map(from_json).collect())
    }
}

/// `#[serde(with)]` support for `Vec<prost_types::Any>`.
///
/// The payload of each message is opaque to this crate, it is sent as a
/// base64 encoded `value` next to the `@type` field.
pub(crate) mod any_list {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Json {
        #[serde(rename = "@type")]
        type_url: String,
        #[serde(default)]
        value: String,
    }

    pub fn serialize<S: Serializer>(value: &[Any], s: S) -> Result<S::Ok, S::Error> {
        value
            .iter()
            .map(|a| Json {
                type_url: a.type_url.clone(),
                value: base64::engine::general_purpose::STANDARD.encode(&a.value),
            })
            .collect::<Vec<_>>()
            .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Any>, D::Error> {
        Vec::<Json>::deserialize(d)?
            .into_iter()
            .map(|j| {
                let value = base64::engine::general_purpose::STANDARD
                    .decode(j.value.as_bytes())
                    .map_err(D::Error::custom)?;
                Ok(Any {
                    type_url: j.type_url,
                    value,
                })
            })
            .collect()
    }
}
