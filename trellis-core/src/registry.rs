//! The registry: explicit entry point for all registration.
//!
//! A [`Registry`] owns the metadata store, the five role sets and the
//! dependency graph built by injection scans. Bootstrap code creates one
//! (or uses [`Registry::global`]), marks injectable fields, registers
//! routes and components, and then hands the resolved views to the HTTP
//! transport and the DI container.
//!
//! ```
//! use trellis_core::{HttpMethod, MethodRef, Registry, TypeKey};
//!
//! struct UserRepository;
//! struct UserController;
//!
//! let registry = Registry::new();
//! registry.autowire::<UserController, UserRepository>("repo");
//! registry.register_route(
//!     TypeKey::of::<UserController>(),
//!     &MethodRef::with_signature::<UserController>("list", "fn list(req, res)"),
//!     HttpMethod::GET,
//!     Some("/"),
//! );
//! registry.register_service(TypeKey::of::<UserRepository>());
//! registry.register_controller(TypeKey::of::<UserController>(), Some("/users"));
//!
//! let table = registry.routing_table();
//! assert_eq!(table.routes()[0].path, "/users");
//! assert!(registry.unresolved_dependencies().is_empty());
//! ```

use crate::injection::{self, DependencyGraph, InjectionEdge, InjectionEdges};
use crate::logging::{debug, info, trace};
use crate::params::MethodRef;
use crate::registration::{Role, RoleSets};
use crate::routing::{self, DEFAULT_PATH, RouteTable, RoutingTable};
use crate::{
    Error, HttpMethod, MetadataKey, MetadataStore, Middleware, Resolver, Result, Subject, TypeKey,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Order given to middleware registered without one
pub const DEFAULT_MIDDLEWARE_ORDER: i32 = 1;

static GLOBAL_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// A registered middleware with its resolve capability and order
#[derive(Clone, Debug)]
pub struct MiddlewareDescriptor {
    pub middleware: TypeKey,
    pub resolver: Resolver,
    /// Lower runs earlier
    pub order: i32,
}

/// A config object and the environment it belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigDescriptor {
    pub config: TypeKey,
    pub environment: String,
}

struct RegistryState {
    sets: RoleSets,
    graph: DependencyGraph,
}

/// Metadata registry and descriptor builder
pub struct Registry {
    metadata: MetadataStore,
    state: Mutex<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        debug!("Creating new registry");
        Self {
            metadata: MetadataStore::new(),
            state: Mutex::new(RegistryState {
                sets: RoleSets::new(),
                graph: DependencyGraph::new(),
            }),
        }
    }

    /// Process-wide registry, created on first use and never torn down
    pub fn global() -> &'static Registry {
        GLOBAL_REGISTRY.get_or_init(Registry::new)
    }

    /// The underlying metadata store
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    // ========== Injection marker ==========

    /// Mark `field` of `owner` for wiring with a `declared` value
    pub fn mark_field(&self, owner: TypeKey, field: &str, declared: TypeKey) {
        injection::mark_field(&self.metadata, owner, field, declared);
    }

    /// Typed shorthand for [`mark_field`](Self::mark_field)
    pub fn autowire<Owner: 'static, Dep: 'static>(&self, field: &str) {
        self.mark_field(TypeKey::of::<Owner>(), field, TypeKey::of::<Dep>());
    }

    /// Fields marked on `owner` so far
    pub fn scan_injections(&self, owner: TypeKey) -> InjectionEdges {
        injection::scan_injections(&self.metadata, owner)
    }

    /// Declared edges of a type, for the DI container
    pub fn get_injection_edges(&self, subject: TypeKey) -> InjectionEdges {
        self.scan_injections(subject)
    }

    // ========== Route table builder ==========

    /// Record a route; returns whether it was committed
    pub fn register_route(
        &self,
        controller: TypeKey,
        method: &MethodRef,
        verb: HttpMethod,
        path: Option<&str>,
    ) -> bool {
        routing::register_route(&self.metadata, controller, method, verb, path)
    }

    /// Route table of a controller, keyed by method identity
    pub fn get_routes(&self, controller: TypeKey) -> RouteTable {
        routing::get_routes(&self.metadata, controller)
    }

    // ========== Role registration ==========

    /// Register a controller under `path` (default `/`).
    ///
    /// Returns `false` if the controller was already registered; the base
    /// path is still updated in that case, the injection scan is not rerun.
    pub fn register_controller(&self, subject: TypeKey, path: Option<&str>) -> bool {
        let base_path = routing::path_or_default(path);
        self.metadata
            .set(Subject::Type(subject), MetadataKey::BasePath, base_path);
        self.enroll(Role::Controller, subject)
    }

    /// Register a service
    pub fn register_service(&self, subject: TypeKey) -> bool {
        self.enroll(Role::Service, subject)
    }

    /// Register a config object for a named environment.
    ///
    /// Fails with [`Error::Configuration`] if the name is empty; nothing
    /// is recorded in that case.
    pub fn register_config(&self, subject: TypeKey, environment: &str) -> Result<bool> {
        if environment.trim().is_empty() {
            return Err(Error::configuration(
                subject.name(),
                "config must declare a non-empty environment name",
            ));
        }

        self.metadata.set(
            Subject::Type(subject),
            MetadataKey::ConfigEnvironment,
            environment.to_string(),
        );
        Ok(self.enroll(Role::Config, subject))
    }

    /// Instantiate `M` with `Default` and register it as middleware
    pub fn register_middleware<M: Middleware + Default>(&self, order: Option<i32>) -> Result<bool> {
        self.register_middleware_instance(&M::default(), order)
    }

    /// Register middleware from an existing instance.
    ///
    /// Fails with [`Error::ContractViolation`] naming `M` if the instance
    /// exposes no resolve capability.
    pub fn register_middleware_instance<M: Middleware>(
        &self,
        instance: &M,
        order: Option<i32>,
    ) -> Result<bool> {
        let subject = TypeKey::of::<M>();
        let resolver = instance.resolve().ok_or_else(|| {
            Error::contract_violation(
                subject.name(),
                "middleware must expose a `resolve` capability",
            )
        })?;

        let key = Subject::Type(subject);
        self.metadata
            .set(key, MetadataKey::MiddlewareResolver, resolver);
        self.metadata.set(
            key,
            MetadataKey::MiddlewareOrder,
            order.unwrap_or(DEFAULT_MIDDLEWARE_ORDER),
        );
        Ok(self.enroll(Role::Middleware, subject))
    }

    /// Register a plugin under `key` (default: the type's short name).
    ///
    /// Unlike the other roles, every call reruns the injection scan.
    pub fn register_plugin(&self, subject: TypeKey, key: Option<&str>) -> bool {
        let plugin_key = match key {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => subject.short_name().to_string(),
        };
        self.metadata
            .set(Subject::Type(subject), MetadataKey::PluginKey, plugin_key);
        self.enroll(Role::Plugin, subject)
    }

    /// Add `subject` to the role set and scan its injections.
    ///
    /// Membership check, scan and insert happen under one lock so a
    /// guarded role scans each subject at most once.
    fn enroll(&self, role: Role, subject: TypeKey) -> bool {
        let mut state = self.state.lock();

        let present = state.sets.get(role).contains(&subject);
        if present && role.guards_rescan() {
            trace!(role = %role, component = %subject, "Already registered, skipping");
            return false;
        }

        let edges = injection::scan_injections(&self.metadata, subject);
        trace!(role = %role, component = %subject, edges = edges.len(), "Injection scan");
        state.graph.record_scan(subject, edges);

        let added = state.sets.get_mut(role).insert(subject);
        if added {
            debug!(role = %role, component = %subject, "Component registered");
        }
        added
    }

    // ========== Views for external collaborators ==========

    /// Whether `subject` is registered under `role`
    pub fn is_registered(&self, role: Role, subject: TypeKey) -> bool {
        self.state.lock().sets.get(role).contains(&subject)
    }

    /// Members of a role, in registration order
    pub fn members(&self, role: Role) -> Vec<TypeKey> {
        self.state.lock().sets.get(role).iter().copied().collect()
    }

    /// Roles `subject` is registered under
    pub fn roles_of(&self, subject: TypeKey) -> Vec<Role> {
        self.state.lock().sets.roles_of(&subject)
    }

    pub fn get_base_path(&self, controller: TypeKey) -> Option<String> {
        self.metadata
            .get(&Subject::Type(controller), &MetadataKey::BasePath)
    }

    pub fn get_config_environment(&self, subject: TypeKey) -> Option<String> {
        self.metadata
            .get(&Subject::Type(subject), &MetadataKey::ConfigEnvironment)
    }

    /// Middleware sorted by order, ties kept in registration order
    pub fn get_middleware_descriptors(&self) -> Vec<MiddlewareDescriptor> {
        let members = self.members(Role::Middleware);

        let mut descriptors: Vec<MiddlewareDescriptor> = members
            .into_iter()
            .filter_map(|middleware| {
                let key = Subject::Type(middleware);
                let resolver = self
                    .metadata
                    .get::<Resolver>(&key, &MetadataKey::MiddlewareResolver)?;
                let order = self
                    .metadata
                    .get::<i32>(&key, &MetadataKey::MiddlewareOrder)
                    .unwrap_or(DEFAULT_MIDDLEWARE_ORDER);
                Some(MiddlewareDescriptor {
                    middleware,
                    resolver,
                    order,
                })
            })
            .collect();

        // sort_by_key is stable
        descriptors.sort_by_key(|descriptor| descriptor.order);
        descriptors
    }

    /// Config object registered for `environment`, first registered wins
    pub fn get_config_for(&self, environment: &str) -> Option<ConfigDescriptor> {
        self.members(Role::Config).into_iter().find_map(|config| {
            let registered = self.get_config_environment(config)?;
            (registered == environment).then_some(ConfigDescriptor {
                config,
                environment: registered,
            })
        })
    }

    /// Environments that have a config object, in registration order
    pub fn config_environments(&self) -> Vec<String> {
        let mut environments = Vec::new();
        for config in self.members(Role::Config) {
            if let Some(environment) = self.get_config_environment(config)
                && !environments.contains(&environment)
            {
                environments.push(environment);
            }
        }
        environments
    }

    pub fn get_plugin_key(&self, plugin: TypeKey) -> Option<String> {
        self.metadata
            .get(&Subject::Type(plugin), &MetadataKey::PluginKey)
    }

    /// Plugins in registration order
    pub fn list_plugins(&self) -> Vec<TypeKey> {
        self.members(Role::Plugin)
    }

    /// Dispatch table over every registered controller
    pub fn routing_table(&self) -> RoutingTable {
        let mut table = RoutingTable::new();
        for controller in self.members(Role::Controller) {
            let base_path = self
                .get_base_path(controller)
                .unwrap_or_else(|| DEFAULT_PATH.to_string());
            table.add_controller(controller, &base_path, &self.get_routes(controller));
        }
        info!(routes = table.len(), "Routing table built");
        table
    }

    /// Snapshot of every scanned component and its declared edges
    pub fn dependency_graph(&self) -> DependencyGraph {
        self.state.lock().graph.clone()
    }

    /// How many times registration scanned `subject`
    pub fn injection_scans(&self, subject: TypeKey) -> usize {
        self.state.lock().graph.scans(subject)
    }

    /// Declared edges whose type no role has registered
    pub fn unresolved_dependencies(&self) -> Vec<InjectionEdge> {
        let state = self.state.lock();
        state
            .graph
            .edges()
            .into_iter()
            .filter(|edge| !state.sets.is_known(&edge.declared))
            .collect()
    }

    /// Fail on the first declared edge no role has registered
    pub fn verify_dependencies(&self) -> Result<()> {
        match self.unresolved_dependencies().into_iter().next() {
            Some(edge) => Err(Error::UnresolvedDependency {
                owner: edge.owner.name().to_string(),
                field: edge.field,
                declared: edge.declared.name().to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let mut debug = f.debug_struct("Registry");
        for role in Role::ALL {
            debug.field(role.as_str(), &state.sets.get(role).len());
        }
        debug.field("metadata", &self.metadata).finish()
    }
}
