// Registration sets: which types have been registered under which role

use crate::TypeKey;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Role a type can be registered under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Controller,
    Service,
    Config,
    Middleware,
    Plugin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Controller,
        Role::Service,
        Role::Config,
        Role::Middleware,
        Role::Plugin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Controller => "controller",
            Role::Service => "service",
            Role::Config => "config",
            Role::Middleware => "middleware",
            Role::Plugin => "plugin",
        }
    }

    /// Whether re-registering a member skips the injection scan
    pub fn guards_rescan(&self) -> bool {
        !matches!(self, Role::Plugin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity set of the types registered under one role, in registration order
#[derive(Clone, Debug)]
pub struct RegistrationSet {
    role: Role,
    order: Vec<TypeKey>,
    members: HashSet<TypeKey>,
}

impl RegistrationSet {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            order: Vec::new(),
            members: HashSet::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Add a member; returns `false` if it was already present
    pub fn insert(&mut self, subject: TypeKey) -> bool {
        if !self.members.insert(subject) {
            return false;
        }
        self.order.push(subject);
        true
    }

    pub fn contains(&self, subject: &TypeKey) -> bool {
        self.members.contains(subject)
    }

    /// Members in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TypeKey> {
        self.order.iter()
    }

    /// Position of a member in registration order
    pub fn position(&self, subject: &TypeKey) -> Option<usize> {
        self.order.iter().position(|member| member == subject)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The five role sets side by side
#[derive(Clone, Debug)]
pub struct RoleSets {
    controllers: RegistrationSet,
    services: RegistrationSet,
    configs: RegistrationSet,
    middleware: RegistrationSet,
    plugins: RegistrationSet,
}

impl RoleSets {
    pub fn new() -> Self {
        Self {
            controllers: RegistrationSet::new(Role::Controller),
            services: RegistrationSet::new(Role::Service),
            configs: RegistrationSet::new(Role::Config),
            middleware: RegistrationSet::new(Role::Middleware),
            plugins: RegistrationSet::new(Role::Plugin),
        }
    }

    pub fn get(&self, role: Role) -> &RegistrationSet {
        match role {
            Role::Controller => &self.controllers,
            Role::Service => &self.services,
            Role::Config => &self.configs,
            Role::Middleware => &self.middleware,
            Role::Plugin => &self.plugins,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut RegistrationSet {
        match role {
            Role::Controller => &mut self.controllers,
            Role::Service => &mut self.services,
            Role::Config => &mut self.configs,
            Role::Middleware => &mut self.middleware,
            Role::Plugin => &mut self.plugins,
        }
    }

    /// Roles a type is registered under
    pub fn roles_of(&self, subject: &TypeKey) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.get(*role).contains(subject))
            .collect()
    }

    /// Whether any role has registered the type
    pub fn is_known(&self, subject: &TypeKey) -> bool {
        Role::ALL.iter().any(|role| self.get(*role).contains(subject))
    }
}

impl Default for RoleSets {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = RegistrationSet::new(Role::Service);
        assert!(set.insert(TypeKey::of::<A>()));
        assert!(!set.insert(TypeKey::of::<A>()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_registration_order() {
        let mut set = RegistrationSet::new(Role::Plugin);
        set.insert(TypeKey::of::<B>());
        set.insert(TypeKey::of::<A>());

        let order: Vec<_> = set.iter().map(|key| key.short_name()).collect();
        assert_eq!(order, vec!["B", "A"]);
        assert_eq!(set.position(&TypeKey::of::<A>()), Some(1));
    }

    #[test]
    fn test_roles_are_independent() {
        let mut sets = RoleSets::new();
        sets.get_mut(Role::Controller).insert(TypeKey::of::<A>());
        sets.get_mut(Role::Plugin).insert(TypeKey::of::<A>());

        assert_eq!(
            sets.roles_of(&TypeKey::of::<A>()),
            vec![Role::Controller, Role::Plugin]
        );
        assert!(!sets.is_known(&TypeKey::of::<B>()));
    }

    #[test]
    fn test_only_plugin_rescans() {
        assert!(!Role::Plugin.guards_rescan());
        assert!(Role::Controller.guards_rescan());
        assert!(Role::Middleware.guards_rescan());
    }
}
