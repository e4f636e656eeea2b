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

use colored::Color;

use crate::color::paint;
use crate::value::Value;

/// Render a value for humans, e.g. `{ id: 7, tags: [ 'a', 'b' ] }`.
///
/// Nodes that are their own ancestor are written as `[Circular]`. With `color` set,
/// scalars are colored by type.
///
/// ```
/// use logfan::layout::inspect;
/// use logfan::value::Value;
///
/// let v = Value::Object(vec![("tags".into(), Value::from(vec!["a", "b"]))]);
/// assert_eq!(inspect(&v, false), "{ tags: [ 'a', 'b' ] }");
/// ```
pub fn inspect(value: &Value, color: bool) -> String {
    let mut inspector = Inspector {
        out: String::new(),
        color,
        ancestors: vec![],
    };
    inspector.write(value);
    inspector.out
}

struct Inspector {
    out: String,
    color: bool,
    ancestors: Vec<usize>,
}

impl Inspector {
    fn styled(&mut self, color: Color, text: &str) {
        if self.color {
            self.out.push_str(&paint(color, text));
        } else {
            self.out.push_str(text);
        }
    }

    fn write(&mut self, value: &Value) {
        match value {
            Value::Undefined => self.styled(Color::BrightBlack, "undefined"),
            Value::Null => self.styled(Color::BrightWhite, "null"),
            Value::Bool(b) => self.styled(Color::Yellow, &b.to_string()),
            Value::Int(i) => self.styled(Color::Yellow, &i.to_string()),
            Value::UInt(u) => self.styled(Color::Yellow, &u.to_string()),
            Value::Float(f) => self.styled(Color::Yellow, &float(*f)),
            Value::Str(s) => self.styled(Color::Green, &quote(s)),
            Value::Array(items) => {
                if items.is_empty() {
                    self.out.push_str("[]");
                    return;
                }
                self.out.push_str("[ ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.write(item);
                }
                self.out.push_str(" ]");
            }
            Value::Object(fields) => self.write_fields(fields),
            Value::Error(err) => {
                match err.stack() {
                    Some(stack) => self.out.push_str(stack),
                    None => {
                        self.out.push_str(err.name());
                        self.out.push_str(": ");
                        self.out.push_str(err.message());
                    }
                }
                if !err.fields().is_empty() {
                    self.out.push(' ');
                    self.write_fields(err.fields());
                }
            }
            Value::Ref(node) => {
                let id = node.id();
                if self.ancestors.contains(&id) {
                    self.styled(Color::Cyan, "[Circular]");
                    return;
                }
                self.ancestors.push(id);
                let inner = node.read();
                self.write(&inner);
                drop(inner);
                self.ancestors.pop();
            }
        }
    }

    fn write_fields(&mut self, fields: &[(String, Value)]) {
        if fields.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{ ");
        for (i, (k, v)) in fields.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            if is_identifier(k) {
                self.out.push_str(k);
            } else {
                self.out.push_str(&quote(k));
            }
            self.out.push_str(": ");
            self.write(v);
        }
        self.out.push_str(" }");
    }
}

fn float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else {
        f.to_string()
    }
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        match c {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
