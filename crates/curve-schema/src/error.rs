use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema {name}:v{version} is already registered with payload class {existing}, cannot re-register as {requested}")]
    PayloadClassMismatch {
        name: String,
        version: u32,
        existing: String,
        requested: String,
    },

    #[error("schema {name}:v{version} is not registered")]
    NotRegistered { name: String, version: u32 },

    #[error("no migration path from {name}:v{from} to {name}:v{to}")]
    NoMigrationPath { name: String, from: u32, to: u32 },

    #[error("migration {name} v{from}->v{to} failed: {message}")]
    MigrationFailed {
        name: String,
        from: u32,
        to: u32,
        message: String,
    },
}
