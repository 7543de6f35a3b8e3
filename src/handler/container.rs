//! Service container used to resolve deferred chain entries.
//!
//! # Responsibilities
//! - Map string identifiers to middleware, handlers or plain values
//! - Build a fresh instance per resolve (`bind`) or share one (`instance`)
//!
//! # Design Decisions
//! - The chain only needs `resolve`; any container implementing
//!   [`Container`] can stand in for [`ServiceContainer`]
//! - Factories run outside the map guard so they may resolve other services

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::handler::entry::{Handler, Middleware};

#[derive(Debug, Clone, Error)]
pub enum ContainerError {
    #[error("no service bound for '{0}'")]
    NotFound(String),
}

/// A resolved service.
#[derive(Clone)]
pub enum Service {
    Middleware(Arc<dyn Middleware>),
    Handler(Arc<dyn Handler>),
    /// Any other dependency (pools, clients, settings).
    Value(Arc<dyn Any + Send + Sync>),
}

impl Service {
    pub fn middleware(middleware: impl Middleware + 'static) -> Self {
        Service::Middleware(Arc::new(middleware))
    }

    pub fn handler(handler: impl Handler + 'static) -> Self {
        Service::Handler(Arc::new(handler))
    }

    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Service::Value(Arc::new(value))
    }

    /// Downcast a `Value` service.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Service::Value(value) => value.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Service::Middleware(_) => "middleware",
            Service::Handler(_) => "handler",
            Service::Value(_) => "value",
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service::{}", self.kind())
    }
}

/// Resolves identifiers to services.
pub trait Container: Send + Sync {
    fn resolve(&self, id: &str) -> Result<Service, ContainerError>;

    fn has(&self, id: &str) -> bool;
}

type Factory = Arc<dyn Fn() -> Service + Send + Sync>;

#[derive(Clone)]
enum Binding {
    Factory(Factory),
    Shared(Service),
}

/// In-memory container backed by a concurrent map.
#[derive(Default)]
pub struct ServiceContainer {
    bindings: DashMap<String, Binding>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a factory; every resolve builds a new service.
    pub fn bind<F>(&self, id: impl Into<String>, factory: F) -> &Self
    where
        F: Fn() -> Service + Send + Sync + 'static,
    {
        self.bindings.insert(id.into(), Binding::Factory(Arc::new(factory)));
        self
    }

    /// Bind a shared service returned as-is on every resolve.
    pub fn instance(&self, id: impl Into<String>, service: Service) -> &Self {
        self.bindings.insert(id.into(), Binding::Shared(service));
        self
    }

    pub fn forget(&self, id: &str) -> bool {
        self.bindings.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Container for ServiceContainer {
    fn resolve(&self, id: &str) -> Result<Service, ContainerError> {
        let binding = self
            .bindings
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;

        Ok(match binding {
            Binding::Factory(factory) => factory(),
            Binding::Shared(service) => service,
        })
    }

    fn has(&self, id: &str) -> bool {
        self.bindings.contains_key(id)
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<String> = self.bindings.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        f.debug_struct("ServiceContainer").field("bindings", &ids).finish()
    }
}
