//! Subjects: the identities metadata is attached to.
//!
//! A subject is either a type (a controller, service, config object,
//! middleware or plugin) or a method of a type. Identity is the Rust
//! [`TypeId`], never the type name, so two types that happen to share a
//! name never collide.

use serde::{Serialize, Serializer};
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a registered type.
///
/// Equality and hashing use the [`TypeId`] only; the name is carried for
/// diagnostics and plugin key defaults.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `app::users::UserController`
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without module path or generic arguments, e.g. `UserController`
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for TypeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// Identity of a method on a type.
///
/// Rust has no overloading, so the owning type plus the method name is
/// unique.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MethodKey {
    pub owner: TypeKey,
    pub name: &'static str,
}

impl MethodKey {
    pub fn new(owner: TypeKey, name: &'static str) -> Self {
        Self { owner, name }
    }

    /// Key for method `name` on type `T`
    pub fn of<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new(TypeKey::of::<T>(), name)
    }
}

impl fmt::Debug for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodKey({}::{})", self.owner.short_name(), self.name)
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner.short_name(), self.name)
    }
}

/// Anything metadata can be attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subject {
    /// A type
    Type(TypeKey),
    /// A method of a type
    Member(MethodKey),
}

impl Subject {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Subject::Type(TypeKey::of::<T>())
    }

    /// The type this subject belongs to
    pub fn owner(&self) -> TypeKey {
        match self {
            Subject::Type(key) => *key,
            Subject::Member(method) => method.owner,
        }
    }
}

impl From<TypeKey> for Subject {
    fn from(key: TypeKey) -> Self {
        Subject::Type(key)
    }
}

impl From<MethodKey> for Subject {
    fn from(key: MethodKey) -> Self {
        Subject::Member(key)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Type(key) => write!(f, "{}", key),
            Subject::Member(method) => write!(f, "{}", method),
        }
    }
}
