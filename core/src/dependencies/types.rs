use crate::dependencies::resolver::Resolution;
use crate::errors::CometError;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Type-erased service instance shared between callers.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Construction operation stored for transient and scoped services.
pub type ConstructFn =
    Arc<dyn Fn(&mut Resolution<'_>) -> Result<Instance, CometError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    Transient,
    Singleton,
    Scoped,
}

impl Lifetime {
    /// Order in which lifetime buckets are consulted for a resolve.
    pub const RESOLUTION_ORDER: [Lifetime; 3] =
        [Lifetime::Singleton, Lifetime::Transient, Lifetime::Scoped];
}

/// Discriminator allowing several implementations of one type to coexist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ServiceKey {
    #[default]
    Unkeyed,
    Named(String),
}

impl From<&str> for ServiceKey {
    fn from(key: &str) -> Self {
        Self::Named(key.to_string())
    }
}

impl From<String> for ServiceKey {
    fn from(key: String) -> Self {
        Self::Named(key)
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unkeyed => f.write_str("<unkeyed>"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    pub id: TypeId,
    pub name: &'static str,
}

impl TypeInfo {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
}

/// Lookup identity of a descriptor: the service type plus its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub ty: TypeInfo,
    pub key: ServiceKey,
}

impl ServiceId {
    pub fn of<T: 'static>(key: ServiceKey) -> Self {
        Self {
            ty: TypeInfo::of::<T>(),
            key,
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            ServiceKey::Unkeyed => f.write_str(self.ty.name),
            ServiceKey::Named(name) => write!(f, "{}[{}]", self.ty.name, name),
        }
    }
}

#[derive(Clone)]
pub enum Provider {
    /// Ready-made value handed out as is.
    Value(Instance),
    /// Constructor whose declared parameters are resolved before each call.
    Constructor {
        parameters: Vec<TypeInfo>,
        construct: ConstructFn,
    },
}

impl Provider {
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self, Self::Constructor { .. })
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Provider::Value"),
            Self::Constructor { parameters, .. } => f
                .debug_struct("Provider::Constructor")
                .field(
                    "parameters",
                    &parameters.iter().map(|p| p.name).collect::<Vec<_>>(),
                )
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub id: ServiceId,
    pub lifetime: Lifetime,
    pub provider: Provider,
}

impl ServiceDescriptor {
    pub fn new(id: ServiceId, lifetime: Lifetime, provider: Provider) -> Self {
        Self {
            id,
            lifetime,
            provider,
        }
    }
}
