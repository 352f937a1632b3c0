pub mod constructor;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod types;

pub use constructor::Constructor;
pub use registry::ServiceRegistry;
pub use resolver::Resolution;
pub use scope::ScopeContext;
pub use types::{Instance, Lifetime, Provider, ServiceDescriptor, ServiceId, ServiceKey, TypeInfo};
