use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name under which a record's identifier appears in its flat JSON form.
pub const ID_FIELD: &str = "id";

/// Field name that holds a raw value which was not a JSON object.
pub const VALUE_FIELD: &str = "value";

/// The field map of a record.
pub type Fields = Map<String, Value>;

/// A single record of a mirrored collection.
///
/// Serializes as one flat JSON object: `{"id": ..., <fields>}`. The identifier
/// is never duplicated inside `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Creates a record, dropping any `id` member from `fields`.
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        fields.remove(ID_FIELD);
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Creates a record with no fields.
    pub fn empty(id: impl Into<String>) -> Self {
        Self::new(id, Fields::new())
    }

    /// Merges an identifier into a raw value read from the remote store.
    ///
    /// Object members become fields. Any other value is kept under
    /// [`VALUE_FIELD`] so that nothing read from the store is lost.
    pub fn from_raw(id: impl Into<String>, raw: Value) -> Self {
        match raw {
            Value::Object(fields) => Self::new(id, fields),
            Value::Null => Self::empty(id),
            other => {
                let mut fields = Fields::new();
                fields.insert(VALUE_FIELD.to_string(), other);
                Self::new(id, fields)
            }
        }
    }

    /// Returns a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        let field = field.into();
        if field == ID_FIELD {
            return None;
        }
        self.fields.insert(field, value)
    }

    /// Overlays top-level fields onto this record.
    pub fn merge(&mut self, fields: &Fields) {
        for (key, value) in fields {
            if key != ID_FIELD {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// Returns the flat JSON form of the record.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}
