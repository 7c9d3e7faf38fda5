//! A JSON-backed subject record.
//!
//! `JsonSubject` lets callers put any serializable entity through approval
//! without implementing `SubjectRecord` by hand: attributes come from a JSON
//! object, relations and accessors are registered by name.

use serde_json::{Map, Value};

use signoff_contracts::ids::SubjectRef;

use crate::traits::{Requestable, SubjectRecord};

#[derive(Debug, Clone)]
pub struct JsonSubject {
    subject: SubjectRef,
    attributes: Map<String, Value>,
    relations: Map<String, Value>,
    accessors: Map<String, Value>,
}

impl JsonSubject {
    /// Build a subject from an attribute object. A non-object `attributes`
    /// value yields a subject with no attributes.
    pub fn new(subject: SubjectRef, attributes: Value) -> Self {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            subject,
            attributes,
            relations: Map::new(),
            accessors: Map::new(),
        }
    }

    /// Register a loaded relation under its camelCase name.
    pub fn with_relation(mut self, name: impl Into<String>, value: Value) -> Self {
        self.relations.insert(name.into(), value);
        self
    }

    /// Register a computed accessor under its camelCase name.
    pub fn with_accessor(mut self, name: impl Into<String>, value: Value) -> Self {
        self.accessors.insert(name.into(), value);
        self
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl SubjectRecord for JsonSubject {
    fn attribute(&self, field: &str) -> Option<Value> {
        // An attribute holding null reads as unset.
        self.attributes.get(field).filter(|v| !v.is_null()).cloned()
    }

    fn relation(&self, name: &str) -> Option<Value> {
        self.relations.get(name).cloned()
    }

    fn accessor(&self, name: &str) -> Option<Value> {
        self.accessors.get(name).cloned()
    }
}

impl Requestable for JsonSubject {
    fn subject_ref(&self) -> SubjectRef {
        self.subject.clone()
    }
}
