// Metadata store: per-subject, per-key associations

use crate::Subject;
use crate::logging::{trace, warn};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Symbolic name a metadata value is stored under
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    /// Controller base path
    BasePath,
    /// Environment name of a config object
    ConfigEnvironment,
    /// Plugin key
    PluginKey,
    /// Middleware resolve capability
    MiddlewareResolver,
    /// Middleware execution order
    MiddlewareOrder,
    /// Fields marked for automatic wiring
    Injections,
    /// Route table of a controller
    Routes,
    /// Application-defined key
    Custom(&'static str),
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataKey::BasePath => f.write_str("base_path"),
            MetadataKey::ConfigEnvironment => f.write_str("config_environment"),
            MetadataKey::PluginKey => f.write_str("plugin_key"),
            MetadataKey::MiddlewareResolver => f.write_str("middleware_resolver"),
            MetadataKey::MiddlewareOrder => f.write_str("middleware_order"),
            MetadataKey::Injections => f.write_str("injections"),
            MetadataKey::Routes => f.write_str("routes"),
            MetadataKey::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

type Record = HashMap<MetadataKey, Box<dyn Any + Send + Sync>>;

/// Process-wide association from a [`Subject`] to keyed metadata values.
///
/// Records are created lazily on first write and never removed. Reads of
/// a missing key, or of a key holding a value of another type, return
/// `None`.
///
/// All operations take the internal lock for their whole duration, so
/// [`get_or_create`](Self::get_or_create) and [`update`](Self::update)
/// are atomic with respect to other callers.
#[derive(Default)]
pub struct MetadataStore {
    records: RwLock<HashMap<Subject, Record>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value
    pub fn get<T>(&self, subject: &Subject, key: &MetadataKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let records = self.records.read();
        let value = records.get(subject)?.get(key)?;
        let typed = value.downcast_ref::<T>().cloned();
        if typed.is_none() {
            trace!(subject = %subject, key = %key, "Metadata present with a different type");
        }
        typed
    }

    /// Write a value, replacing any previous one
    pub fn set<T>(&self, subject: Subject, key: MetadataKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        trace!(subject = %subject, key = %key, "Setting metadata");
        let mut records = self.records.write();
        records.entry(subject).or_default().insert(key, Box::new(value));
    }

    /// Return the existing value, or store and return the factory's result
    pub fn get_or_create<T, F>(&self, subject: Subject, key: MetadataKey, factory: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.update(subject, key, factory, |value: &mut T| value.clone())
    }

    /// Atomically mutate a value in place, creating it first if absent.
    ///
    /// A value of another type under the same key is replaced by the
    /// factory's result.
    pub fn update<T, F, U, R>(&self, subject: Subject, key: MetadataKey, factory: F, f: U) -> R
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
        U: FnOnce(&mut T) -> R,
    {
        let mut records = self.records.write();
        let record = records.entry(subject).or_default();

        match record.get_mut(&key).map(|value| value.downcast_mut::<T>()) {
            Some(Some(value)) => return f(value),
            Some(None) => {
                warn!(subject = %subject, key = %key, "Replacing metadata of a different type");
            }
            None => trace!(subject = %subject, key = %key, "Creating metadata"),
        }

        let mut value = factory();
        let result = f(&mut value);
        record.insert(key, Box::new(value));
        result
    }

    /// Whether a value is stored under the key, whatever its type
    pub fn contains(&self, subject: &Subject, key: &MetadataKey) -> bool {
        self.records
            .read()
            .get(subject)
            .is_some_and(|record| record.contains_key(key))
    }

    /// Keys present on a subject
    pub fn keys(&self, subject: &Subject) -> Vec<MetadataKey> {
        self.records
            .read()
            .get(subject)
            .map(|record| record.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of subjects carrying metadata
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataStore")
            .field("subjects", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Users;
    struct Orders;

    #[test]
    fn test_get_absent() {
        let store = MetadataStore::new();
        assert_eq!(store.get::<String>(&Subject::of::<Users>(), &MetadataKey::BasePath), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let store = MetadataStore::new();
        store.set(Subject::of::<Users>(), MetadataKey::BasePath, "/users".to_string());

        assert_eq!(
            store.get::<String>(&Subject::of::<Users>(), &MetadataKey::BasePath),
            Some("/users".to_string())
        );
        assert_eq!(store.get::<String>(&Subject::of::<Orders>(), &MetadataKey::BasePath), None);
    }

    #[test]
    fn test_type_mismatch_reads_absent() {
        let store = MetadataStore::new();
        store.set(Subject::of::<Users>(), MetadataKey::MiddlewareOrder, 3_i32);

        assert_eq!(store.get::<String>(&Subject::of::<Users>(), &MetadataKey::MiddlewareOrder), None);
        assert!(store.contains(&Subject::of::<Users>(), &MetadataKey::MiddlewareOrder));
    }

    #[test]
    fn test_get_or_create_keeps_existing() {
        let store = MetadataStore::new();
        let subject = Subject::of::<Users>();

        let first = store.get_or_create(subject, MetadataKey::Custom("n"), || 1_u32);
        let second = store.get_or_create(subject, MetadataKey::Custom("n"), || 2_u32);

        assert_eq!(first, 1);
        assert_eq!(second, 1);
    }

    #[test]
    fn test_update_mutates_in_place() {
        let store = MetadataStore::new();
        let subject = Subject::of::<Users>();

        store.update(subject, MetadataKey::Custom("list"), Vec::new, |v: &mut Vec<u8>| v.push(1));
        store.update(subject, MetadataKey::Custom("list"), Vec::new, |v: &mut Vec<u8>| v.push(2));

        assert_eq!(
            store.get::<Vec<u8>>(&subject, &MetadataKey::Custom("list")),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn test_update_replaces_mismatched_type() {
        let store = MetadataStore::new();
        let subject = Subject::of::<Users>();
        store.set(subject, MetadataKey::Custom("v"), "text");

        let len = store.update(subject, MetadataKey::Custom("v"), Vec::new, |v: &mut Vec<u8>| {
            v.push(7);
            v.len()
        });

        assert_eq!(len, 1);
    }

    #[test]
    fn test_keys() {
        let store = MetadataStore::new();
        let subject = Subject::of::<Orders>();
        store.set(subject, MetadataKey::BasePath, "/".to_string());
        store.set(subject, MetadataKey::PluginKey, "orders".to_string());

        let mut keys: Vec<String> = store.keys(&subject).iter().map(|k| k.to_string()).collect();
        keys.sort();
        assert_eq!(keys, vec!["base_path", "plugin_key"]);
        assert_eq!(store.len(), 1);
    }
}
