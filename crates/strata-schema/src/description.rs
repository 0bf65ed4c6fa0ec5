use crate::types::EnvId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Key under which the deployable topology lives inside a description.
pub const OBJECTS_KEY: &str = "Objects";

/// Plaintext topology description of an environment or a session draft.
///
/// The description is an arbitrary JSON document. Only the `Objects` member
/// carries meaning here: when it is absent, `null`, or an empty object the
/// description requests decommissioning rather than deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Description(Value);

impl Description {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Initial description of a freshly created environment.
    pub fn seed(env_id: &EnvId, name: &str) -> Self {
        Self(json!({
            OBJECTS_KEY: {
                "?": { "id": env_id.as_str() },
                "name": name,
            },
            "Attributes": [],
        }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The `Objects` subtree, or `Value::Null` when absent.
    pub fn objects(&self) -> Value {
        self.0.get(OBJECTS_KEY).cloned().unwrap_or(Value::Null)
    }

    /// Replace the `Objects` subtree. A non-object description is reset to an
    /// object first.
    pub fn set_objects(&mut self, objects: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.0 {
            map.insert(OBJECTS_KEY.to_owned(), objects);
        }
    }

    /// Whether deploying this description means tearing the environment down.
    pub fn is_deletion(&self) -> bool {
        match self.0.get(OBJECTS_KEY) {
            None | Some(Value::Null) => true,
            Some(Value::Object(map)) => map.is_empty(),
            Some(_) => false,
        }
    }
}

impl Default for Description {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for Description {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
