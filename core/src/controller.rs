//! Controllers: components whose operations become routes by name.

use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::security::PolicyConfig;
use std::fmt;

/// Signature every routable operation has.
pub type OperationFn<C> = fn(&C, &mut HttpRequest) -> HttpResponse;

/// A named operation of controller `C`.
///
/// The name drives route derivation: `GetById` becomes `GET <base>/:id`,
/// `List` becomes `GET <base>`.
pub struct Operation<C> {
    pub name: &'static str,
    pub handler: OperationFn<C>,
}

impl<C> Operation<C> {
    pub const fn new(name: &'static str, handler: OperationFn<C>) -> Self {
        Self { name, handler }
    }
}

impl<C> Clone for Operation<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Operation<C> {}

impl<C> fmt::Debug for Operation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("name", &self.name).finish()
    }
}

pub trait Controller: Send + Sync + Sized + 'static {
    /// Explicit base path. `None` (or an empty path) derives it from the
    /// type name.
    fn route(&self) -> Option<&str> {
        None
    }

    /// Policies keyed by operation name, `*` for every operation.
    fn policies(&self) -> PolicyConfig {
        PolicyConfig::new()
    }

    fn operations() -> Vec<Operation<Self>>;
}

/// Short type name of `C`, used both as its registry key and as the
/// source of its derived base path.
pub fn controller_name<C: 'static>() -> &'static str {
    let full = std::any::type_name::<C>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TaskController;

    impl Controller for TaskController {
        fn operations() -> Vec<Operation<Self>> {
            vec![Operation::new("Get", |_, _| HttpResponse::ok("task"))]
        }
    }

    struct Wrapper<T>(T);

    #[test]
    fn test_controller_name_is_short_type_name() {
        assert_eq!(controller_name::<TaskController>(), "TaskController");
        assert_eq!(controller_name::<Wrapper<u8>>(), "Wrapper");
    }

    #[test]
    fn test_default_route_and_policies() {
        let controller = TaskController;
        assert!(controller.route().is_none());
        assert!(controller.policies().is_empty());
        assert_eq!(TaskController::operations()[0].name, "Get");
    }
}
