//! Constructor providers with declared parameter types.
//!
//! Any function or closure taking up to six `Arc<_>` arguments is a
//! constructor: every argument type is resolved (unkeyed, same scope)
//! before the call.

use crate::dependencies::resolver::Resolution;
use crate::dependencies::types::{ConstructFn, Instance, Provider, TypeInfo};
use crate::errors::CometError;
use std::sync::Arc;

pub trait Constructor<Args, T>: Send + Sync + 'static {
    /// Parameter types resolved before each invocation, in call order.
    fn parameters() -> Vec<TypeInfo>;

    fn construct(&self, resolution: &mut Resolution<'_>) -> Result<T, CometError>;
}

macro_rules! impl_constructor {
    ($($arg:ident),*) => {
        impl<F, T, $($arg,)*> Constructor<($($arg,)*), T> for F
        where
            F: Fn($(Arc<$arg>),*) -> T + Send + Sync + 'static,
            $($arg: Send + Sync + 'static,)*
        {
            fn parameters() -> Vec<TypeInfo> {
                vec![$(TypeInfo::of::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn construct(&self, resolution: &mut Resolution<'_>) -> Result<T, CometError> {
                $(let $arg = resolution.resolve::<$arg>()?;)*
                Ok((self)($($arg),*))
            }
        }
    };
}

impl_constructor!();
impl_constructor!(A1);
impl_constructor!(A1, A2);
impl_constructor!(A1, A2, A3);
impl_constructor!(A1, A2, A3, A4);
impl_constructor!(A1, A2, A3, A4, A5);
impl_constructor!(A1, A2, A3, A4, A5, A6);

pub(crate) fn constructor_provider<T, Args, C>(constructor: C) -> Provider
where
    T: Send + Sync + 'static,
    C: Constructor<Args, T>,
{
    let construct: ConstructFn = Arc::new(move |resolution: &mut Resolution<'_>| {
        constructor
            .construct(resolution)
            .map(|value| Arc::new(value) as Instance)
    });

    Provider::Constructor {
        parameters: C::parameters(),
        construct,
    }
}

pub(crate) fn factory_provider<T, F>(factory: F) -> Provider
where
    T: Send + Sync + 'static,
    F: Fn(&mut Resolution<'_>) -> Result<T, CometError> + Send + Sync + 'static,
{
    let construct: ConstructFn = Arc::new(move |resolution: &mut Resolution<'_>| {
        factory(resolution).map(|value| Arc::new(value) as Instance)
    });

    Provider::Constructor {
        parameters: Vec::new(),
        construct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Config;
    struct Pool;

    fn build(_config: Arc<Config>, _pool: Arc<Pool>) -> u32 {
        7
    }

    fn declared<Args, T, C: Constructor<Args, T>>(_constructor: &C) -> Vec<TypeInfo> {
        C::parameters()
    }

    #[test]
    fn test_parameters_follow_declaration_order() {
        let params = declared(&build);
        assert_eq!(params, vec![TypeInfo::of::<Config>(), TypeInfo::of::<Pool>()]);
    }

    #[test]
    fn test_nullary_constructor_has_no_parameters() {
        let params = declared(&|| String::from("fresh"));
        assert!(params.is_empty());
    }
}
