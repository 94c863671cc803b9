/// A registered payload shape: a name, a version, and the concrete Rust
/// type (by name, since the registry holds many schemas of different
/// payload types side by side) it deserializes into.
///
/// Equality is by `(name, version)` only — `payload_class` is metadata
/// used to detect accidental re-registration with an incompatible type,
/// not part of identity.
#[derive(Debug, Clone)]
pub struct SchemaVersion {
    name: String,
    version: u32,
    payload_class: String,
}

impl SchemaVersion {
    pub fn new(name: impl Into<String>, version: u32, payload_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version,
            payload_class: payload_class.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn payload_class(&self) -> &str {
        &self.payload_class
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for SchemaVersion {}
