use crate::error::SchemaError;
use crate::migration::SchemaMigration;
use crate::version::SchemaVersion;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Versioned payload types plus the migrations between them.
///
/// Internally guarded by a single [`parking_lot::RwLock`] — registration
/// is rare (typically at startup) and lookups are cheap, so a single
/// lock is simpler than per-name sharding and has never shown up as a
/// bottleneck.
#[derive(Default)]
pub struct SchemaRegistry {
    inner: RwLock<Registry>,
}

#[derive(Default)]
struct Registry {
    versions: HashMap<String, Vec<SchemaVersion>>,
    migrations: HashMap<String, Vec<Arc<dyn SchemaMigration>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent when `version.payload_class()` matches an existing
    /// registration for the same `(name, version)`; rejected otherwise.
    pub fn register(&self, version: SchemaVersion) -> Result<(), SchemaError> {
        let mut inner = self.inner.write();
        let entries = inner.versions.entry(version.name().to_string()).or_default();

        if let Some(existing) = entries.iter().find(|v| v.version() == version.version()) {
            if existing.payload_class() == version.payload_class() {
                return Ok(());
            }
            return Err(SchemaError::PayloadClassMismatch {
                name: version.name().to_string(),
                version: version.version(),
                existing: existing.payload_class().to_string(),
                requested: version.payload_class().to_string(),
            });
        }

        entries.push(version);
        Ok(())
    }

    /// Requires both `migration.from_version()` and `migration.to_version()`
    /// to already be registered under `name`.
    pub fn register_migration(
        &self,
        name: impl Into<String>,
        migration: Arc<dyn SchemaMigration>,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        let mut inner = self.inner.write();

        let registered = |v: u32, inner: &Registry| {
            inner
                .versions
                .get(&name)
                .map(|vs| vs.iter().any(|sv| sv.version() == v))
                .unwrap_or(false)
        };
        if !registered(migration.from_version(), &inner) {
            return Err(SchemaError::NotRegistered {
                name: name.clone(),
                version: migration.from_version(),
            });
        }
        if !registered(migration.to_version(), &inner) {
            return Err(SchemaError::NotRegistered {
                name: name.clone(),
                version: migration.to_version(),
            });
        }

        inner.migrations.entry(name).or_default().push(migration);
        Ok(())
    }

    pub fn get_version(&self, name: &str, version: u32) -> Option<SchemaVersion> {
        self.inner
            .read()
            .versions
            .get(name)
            .and_then(|vs| vs.iter().find(|v| v.version() == version).cloned())
    }

    pub fn get_latest_version(&self, name: &str) -> Option<SchemaVersion> {
        self.inner
            .read()
            .versions
            .get(name)
            .and_then(|vs| vs.iter().max_by_key(|v| v.version()).cloned())
    }

    /// Ascending by version.
    pub fn get_all_versions(&self, name: &str) -> Vec<SchemaVersion> {
        let mut vs = self
            .inner
            .read()
            .versions
            .get(name)
            .cloned()
            .unwrap_or_default();
        vs.sort_by_key(|v| v.version());
        vs
    }

    pub fn is_version_registered(&self, name: &str, version: u32) -> bool {
        self.inner
            .read()
            .versions
            .get(name)
            .map(|vs| vs.iter().any(|v| v.version() == version))
            .unwrap_or(false)
    }

    pub fn get_all_schema_names(&self) -> Vec<String> {
        self.inner.read().versions.keys().cloned().collect()
    }

    pub fn is_compatible(&self, name: &str, from: u32, to: u32) -> bool {
        if !self.is_version_registered(name, from) || !self.is_version_registered(name, to) {
            return false;
        }
        from == to || self.find_migration_path(name, from, to).is_some()
    }

    /// Breadth-first search over registered migrations, expanding only
    /// forward (to a strictly greater version) and only within `to`'s
    /// bound. Returns the shortest path; ties between equal-length paths
    /// are broken by the order migrations were registered in.
    pub fn find_migration_path(
        &self,
        name: &str,
        from: u32,
        to: u32,
    ) -> Option<Vec<Arc<dyn SchemaMigration>>> {
        if from == to {
            return Some(Vec::new());
        }

        let inner = self.inner.read();
        let migrations = inner.migrations.get(name)?;

        let mut visited = std::collections::HashSet::new();
        visited.insert(from);
        let mut queue: VecDeque<(u32, Vec<Arc<dyn SchemaMigration>>)> = VecDeque::new();
        queue.push_back((from, Vec::new()));

        while let Some((current, path)) = queue.pop_front() {
            for migration in migrations {
                if migration.from_version() != current {
                    continue;
                }
                let next = migration.to_version();
                if next <= current || next > to || visited.contains(&next) {
                    continue;
                }
                let mut next_path = path.clone();
                next_path.push(migration.clone());
                if next == to {
                    return Some(next_path);
                }
                visited.insert(next);
                queue.push_back((next, next_path));
            }
        }

        None
    }
}
