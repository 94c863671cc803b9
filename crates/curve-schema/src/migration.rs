use crate::error::SchemaError;
use serde_json::Value;

/// A transform from one registered schema version to another.
///
/// Migrations operate on the JSON representation of a payload rather
/// than a statically-typed Rust pair, since the registry holds
/// migrations between arbitrarily many payload types side by side and
/// chains them at runtime via [`crate::registry::SchemaRegistry::find_migration_path`].
pub trait SchemaMigration: Send + Sync {
    fn from_version(&self) -> u32;
    fn to_version(&self) -> u32;

    /// Defaults to exact equality on both endpoints.
    fn is_applicable(&self, from: u32, to: u32) -> bool {
        from == self.from_version() && to == self.to_version()
    }

    fn migrate(&self, source: Value) -> Result<Value, SchemaError>;
}

/// A `SchemaMigration` built from a plain closure, for the common case
/// where a migration is a pure, fallible `Value -> Value` transform.
pub struct FnMigration<F> {
    from: u32,
    to: u32,
    transform: F,
}

impl<F> FnMigration<F>
where
    F: Fn(Value) -> Result<Value, SchemaError> + Send + Sync,
{
    pub fn new(from: u32, to: u32, transform: F) -> Self {
        Self { from, to, transform }
    }
}

impl<F> SchemaMigration for FnMigration<F>
where
    F: Fn(Value) -> Result<Value, SchemaError> + Send + Sync,
{
    fn from_version(&self) -> u32 {
        self.from
    }

    fn to_version(&self) -> u32 {
        self.to
    }

    fn migrate(&self, source: Value) -> Result<Value, SchemaError> {
        (self.transform)(source)
    }
}
