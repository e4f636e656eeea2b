// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cell::RefCell;
use std::collections::HashSet;

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;

use crate::Error;
use crate::color::ColorFn;
use crate::layout::Layout;
use crate::layout::LayoutOptions;
use crate::layout::iso8601;
use crate::record::Event;
use crate::value::Value;

const CIRCULAR: &str = "[Circular]";

/// A JSON layout for formatting log events.
///
/// Output format:
///
/// ```json
/// {"timestamp":1723416297172,"level":"ERROR","component":"db","source":"pool","msg":["connection lost",{"retries":3}]}
/// {"timestamp":"2024-08-11T22:44:57.172Z","level":"INFO","component":"db","source":null,"msg":["ready"]}
/// ```
///
/// The timestamp is epoch milliseconds, or an ISO-8601 string when full timestamps are
/// enabled. A node reached a second time within one record is written as `"[Circular]"`,
/// an undefined value as `"undefined"`, and an error as an object of its fields.
#[derive(Default, Debug, Clone)]
pub struct JsonLayout;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Stamp {
    Millis(i64),
    Iso(String),
}

#[derive(Serialize)]
struct RecordLine<'a> {
    timestamp: Stamp,
    level: &'static str,
    component: &'a str,
    source: Option<&'a str>,
    msg: Messages<'a>,
}

struct Messages<'a> {
    values: &'a [Value],
    seen: RefCell<HashSet<usize>>,
}

impl Serialize for Messages<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.values.len()))?;
        for value in self.values {
            seq.serialize_element(&Safe {
                value,
                seen: &self.seen,
            })?;
        }
        seq.end()
    }
}

/// Serializes a value, tracking node identities across the whole record.
struct Safe<'a> {
    value: &'a Value,
    seen: &'a RefCell<HashSet<usize>>,
}

impl<'a> Safe<'a> {
    fn child<'b>(&'b self, value: &'b Value) -> Safe<'b> {
        Safe {
            value,
            seen: self.seen,
        }
    }
}

impl Serialize for Safe<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Undefined => serializer.serialize_str("undefined"),
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_unit(),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, &self.child(v))?;
                }
                map.end()
            }
            Value::Error(err) => {
                let shadowed = |key: &str| err.fields().iter().any(|(k, _)| k == key);
                let builtin = [
                    ("name", Some(err.name())),
                    ("message", Some(err.message())),
                    ("stack", err.stack()),
                ];

                let mut map = serializer.serialize_map(None)?;
                for (key, value) in builtin {
                    if let Some(value) = value.filter(|_| !shadowed(key)) {
                        map.serialize_entry(key, value)?;
                    }
                }
                for (k, v) in err.fields() {
                    map.serialize_entry(k, &self.child(v))?;
                }
                map.end()
            }
            Value::Ref(node) => {
                let first = self.seen.borrow_mut().insert(node.id());
                if !first {
                    return serializer.serialize_str(CIRCULAR);
                }
                let inner = node.read();
                self.child(&inner).serialize(serializer)
            }
        }
    }
}

impl Layout for JsonLayout {
    fn format(&self, event: &Event, _: &ColorFn, options: &LayoutOptions) -> Result<String, Error> {
        let timestamp = if options.full_timestamps {
            Stamp::Iso(iso8601(event.time()))
        } else {
            Stamp::Millis(event.time().as_millisecond())
        };

        let record_line = RecordLine {
            timestamp,
            level: event.level().as_str(),
            component: event.component(),
            source: event.source(),
            msg: Messages {
                values: event.messages(),
                seen: RefCell::new(HashSet::new()),
            },
        };

        serde_json::to_string(&record_line)
            .map_err(|err| Error::new("failed to serialize record as json").with_source(err))
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::Level;
    use crate::value::ErrorValue;
    use crate::value::Node;
    use crate::values;

    fn render(messages: &[Value], source: Option<&str>, full_timestamps: bool) -> String {
        let time = Timestamp::from_millisecond(1_723_416_297_172).unwrap();
        let event = Event::new(Level::Warn, time, "db", source, messages);
        let options = LayoutOptions {
            full_timestamps,
            ..Default::default()
        };
        JsonLayout
            .format(&event, &ColorFn::IDENTITY, &options)
            .unwrap()
    }

    #[test]
    fn test_record_fields_in_order() {
        let line = render(&values!["ready", 1, 2.5, true], Some("pool"), false);
        assert_eq!(
            line,
            r#"{"timestamp":1723416297172,"level":"WARN","component":"db","source":"pool","msg":["ready",1,2.5,true]}"#
        );
    }

    #[test]
    fn test_full_timestamp_and_null_source() {
        let line = render(&values!["x"], None, true);
        assert_eq!(
            line,
            r#"{"timestamp":"2024-08-11T22:44:57.172Z","level":"WARN","component":"db","source":null,"msg":["x"]}"#
        );
    }

    #[test]
    fn test_undefined_keeps_position() {
        let messages = vec![
            Value::Undefined,
            Value::Array(vec![Value::Int(1), Value::Undefined, Value::Float(f64::NAN)]),
        ];
        let line = render(&messages, None, false);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            parsed["msg"],
            serde_json::json!(["undefined", [1, "undefined", null]])
        );
    }

    #[test]
    fn test_self_reference_terminates() {
        // a.b[0] = a
        let a = Node::new(Value::Object(vec![]));
        a.update(|v| v.insert("b", Value::Array(vec![a.clone().into()])));

        let line = render(&[a.clone().into()], None, false);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["msg"], serde_json::json!([{"b": ["[Circular]"]}]));

        // break the cycle so the nodes are released
        a.set(Value::Null);
    }

    #[test]
    fn test_error_expands_to_fields() {
        let err = ErrorValue::new("TimeoutError", "took too long")
            .with_stack("TimeoutError: took too long")
            .with_field("ms", 500);
        let line = render(&[err.into()], None, false);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            parsed["msg"][0],
            serde_json::json!({
                "name": "TimeoutError",
                "message": "took too long",
                "stack": "TimeoutError: took too long",
                "ms": 500,
            })
        );
    }

    #[test]
    fn test_error_field_replaces_builtin_key() {
        let err = ErrorValue::new("E", "m")
            .with_field("message", "other")
            .with_field("code", 1)
            .with_field("code", 2);
        let line = render(&[err.into()], None, false);
        assert!(line.contains(r#""msg":[{"name":"E","message":"other","code":2}]"#), "{line}");
    }

    #[test]
    fn test_object_keeps_insertion_order() {
        let obj = Value::Object(vec![
            ("z".to_string(), Value::Int(1)),
            ("a".to_string(), Value::Int(2)),
        ]);
        let line = render(&[obj], None, false);
        assert!(line.ends_with(r#""msg":[{"z":1,"a":2}]}"#), "{line}");
    }
}
