//! Schema registry and shortest-path migration engine.
//!
//! Payload types are registered under a `(name, version)` key; migrations
//! connect versions of the same name. [`SchemaRegistry::find_migration_path`]
//! answers "how do I get a value from version A to version B" with the
//! shortest chain of registered transforms.

pub mod error;
pub mod migration;
pub mod registry;
pub mod version;

pub use error::SchemaError;
pub use migration::{FnMigration, SchemaMigration};
pub use registry::SchemaRegistry;
pub use version::SchemaVersion;
