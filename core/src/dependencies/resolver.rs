use crate::dependencies::registry::ServiceRegistry;
use crate::dependencies::scope::ScopeContext;
use crate::dependencies::types::{Instance, Lifetime, Provider, ServiceId, ServiceKey};
use crate::errors::CometError;
use std::sync::Arc;

/// One resolve call stack.
///
/// Tracks the services currently under construction so a constructor
/// that (transitively) asks for itself fails with `CircularDependency`
/// instead of recursing forever.
pub struct Resolution<'a> {
    registry: &'a ServiceRegistry,
    scope: &'a mut ScopeContext,
    in_progress: Vec<ServiceId>,
}

impl<'a> Resolution<'a> {
    pub(crate) fn new(registry: &'a ServiceRegistry, scope: &'a mut ScopeContext) -> Self {
        Self {
            registry,
            scope,
            in_progress: Vec::new(),
        }
    }

    pub fn resolve<T>(&mut self) -> Result<Arc<T>, CometError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_keyed::<T>(ServiceKey::Unkeyed)
    }

    pub fn resolve_keyed<T>(&mut self, key: impl Into<ServiceKey>) -> Result<Arc<T>, CometError>
    where
        T: Send + Sync + 'static,
    {
        let instance = self.resolve_instance(&ServiceId::of::<T>(key.into()))?;
        instance.downcast::<T>().map_err(|_| CometError::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })
    }

    pub fn scope_id(&self) -> u64 {
        self.scope.id()
    }

    fn resolve_instance(&mut self, id: &ServiceId) -> Result<Instance, CometError> {
        let (lifetime, provider) =
            self.registry
                .lookup(id)
                .ok_or_else(|| CometError::DependencyNotFound {
                    type_name: id.ty.name,
                    key: id.key.clone(),
                })?;

        match lifetime {
            Lifetime::Singleton | Lifetime::Transient => self.provide(id, &provider),
            Lifetime::Scoped => {
                if let Some(instance) = self.scope.get(id) {
                    return Ok(instance);
                }
                let instance = self.provide(id, &provider)?;
                self.scope.insert(id.clone(), Arc::clone(&instance));
                Ok(instance)
            }
        }
    }

    fn provide(&mut self, id: &ServiceId, provider: &Provider) -> Result<Instance, CometError> {
        match provider {
            Provider::Value(instance) => Ok(Arc::clone(instance)),
            Provider::Constructor { construct, .. } => {
                if self.in_progress.contains(id) {
                    let mut chain: Vec<String> =
                        self.in_progress.iter().map(ToString::to_string).collect();
                    chain.push(id.to_string());
                    return Err(CometError::CircularDependency {
                        chain: chain.join(" -> "),
                    });
                }

                self.in_progress.push(id.clone());
                let result = construct(self);
                self.in_progress.pop();
                result
            }
        }
    }
}

impl ServiceRegistry {
    /// Resolves the unkeyed `T` against `scope`.
    pub fn resolve<T>(&self, scope: &mut ScopeContext) -> Result<Arc<T>, CometError>
    where
        T: Send + Sync + 'static,
    {
        Resolution::new(self, scope).resolve::<T>()
    }

    pub fn resolve_keyed<T>(
        &self,
        key: impl Into<ServiceKey>,
        scope: &mut ScopeContext,
    ) -> Result<Arc<T>, CometError>
    where
        T: Send + Sync + 'static,
    {
        Resolution::new(self, scope).resolve_keyed::<T>(key)
    }
}
