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

//! Message values passed to log calls.
//!
//! A log call carries an ordered list of [`Value`]s. Most values are plain trees, but a
//! [`Node`] is a shared cell whose contents can be updated after creation, so values may
//! form cycles:
//!
//! ```
//! use logfan::value::Node;
//! use logfan::value::Value;
//!
//! // a.b[0] = a
//! let a = Node::new(Value::Object(vec![]));
//! a.update(|v| v.insert("b", Value::Array(vec![a.clone().into()])));
//! ```
//!
//! Layouts break such cycles deterministically. A cycle keeps its nodes alive until one of
//! them is overwritten.

use std::fmt;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;

/// A message value.
#[derive(Clone, Debug)]
pub enum Value {
    /// An absent value. Rendered as `undefined` rather than dropped.
    Undefined,
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A float.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered sequence.
    Array(Vec<Value>),
    /// An insertion-ordered map.
    Object(Vec<(String, Value)>),
    /// An error, expanded to its fields when rendered.
    Error(ErrorValue),
    /// A shared reference, possibly part of a cycle.
    Ref(Node),
}

impl Value {
    /// Insert or replace `key` if this is an object. Other variants are left untouched.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if let Value::Object(fields) = self {
            let key = key.into();
            let value = value.into();
            match fields.iter_mut().find(|(k, _)| *k == key) {
                Some((_, slot)) => *slot = value,
                None => fields.push((key, value)),
            }
        }
    }

    /// Append `value` if this is an array. Other variants are left untouched.
    pub fn push(&mut self, value: impl Into<Value>) {
        if let Value::Array(items) = self {
            items.push(value.into());
        }
    }

    /// Build an error value from anything implementing [`std::error::Error`].
    pub fn error<E: std::error::Error + ?Sized>(err: &E) -> Value {
        Value::Error(ErrorValue::from_error(err))
    }

    /// The string slice if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// An error value: a name, a message, an optional stack and any extra fields.
#[derive(Clone, Debug)]
pub struct ErrorValue {
    name: String,
    message: String,
    stack: Option<String>,
    fields: Vec<(String, Value)>,
}

impl ErrorValue {
    /// Create an error value with the given name and message.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            fields: vec![],
        }
    }

    /// Build an error value from a [`std::error::Error`].
    ///
    /// The stack lists the error followed by its source chain.
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let name = short_type_name(std::any::type_name::<E>());
        let message = err.to_string();

        let mut stack = format!("{name}: {message}");
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }

        Self::new(name, message).with_stack(stack)
    }

    /// Set the stack text.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Add or replace an extra field. A field named `name`, `message` or `stack` takes the
    /// place of the built-in one when the error is written as a record.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// The error name, for example `Error` or `DeliveryError`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The stack text, if any.
    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    /// Extra fields beyond name, message and stack.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

fn short_type_name(name: &str) -> String {
    let name = name.split('<').next().unwrap_or(name);
    let name = name.rsplit("::").next().unwrap_or(name);
    match name {
        "" => "Error".to_string(),
        name => name.to_string(),
    }
}

/// A shared, updatable cell holding a [`Value`].
///
/// Cloning a node clones the reference, not the contents; two clones are the same node.
#[derive(Clone)]
pub struct Node(Arc<RwLock<Value>>);

impl Node {
    /// Create a new node holding `value`.
    pub fn new(value: impl Into<Value>) -> Node {
        Node(Arc::new(RwLock::new(value.into())))
    }

    /// Replace the node's contents.
    pub fn set(&self, value: impl Into<Value>) {
        let value = value.into();
        let mut slot = self.0.write().unwrap_or_else(|e| e.into_inner());
        *slot = value;
    }

    /// Mutate the node's contents in place.
    ///
    /// The closure must not read this node through another clone.
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut slot = self.0.write().unwrap_or_else(|e| e.into_inner());
        f(&mut slot)
    }

    /// Whether both handles point to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.0.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // contents may be cyclic
        write!(f, "Node({:#x})", self.id())
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Ref(node)
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        Value::Ref(node.clone())
    }
}

impl From<ErrorValue> for Value {
    fn from(err: ErrorValue) -> Self {
        Value::Error(err)
    }
}

impl From<&crate::Error> for Value {
    fn from(err: &crate::Error) -> Self {
        let name = format!("{}Error", err.kind());
        let mut stack = format!("{name}: {err}");
        for source in err.sources() {
            stack.push_str("\n    caused by: ");
            stack.push_str(&source.to_string());
        }

        let value = ErrorValue::new(name, err.message())
            .with_stack(stack)
            .with_field("kind", err.kind().as_str());
        Value::Error(value)
    }
}

impl From<crate::Error> for Value {
    fn from(err: crate::Error) -> Self {
        Value::from(&err)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Int(i as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::UInt(i as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Undefined,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```
/// use logfan::values;
///
/// let messages = values!["retrying", 3, true];
/// assert_eq!(messages.len(), 3);
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::value::Value::from($value)),*]
    };
}
