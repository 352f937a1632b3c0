//! Application root: the open registration phase and the sealed,
//! request-serving phase.

use crate::controller::{controller_name, Controller};
use crate::dependencies::{Constructor, ScopeContext, ServiceRegistry};
use crate::dispatch::{chain, dispatch};
use crate::errors::CometError;
use crate::group::RouteGroup;
use crate::identity::{UserConfig, UserStore};
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::routing::{
    derive_routes, handler, join_paths, parse_route_pattern, Handler, HttpMethod, Middleware,
    RouteDescriptor, RouteTable,
};
use crate::security::{self, JwtConfig, JwtProvider};
use std::sync::Arc;

/// Collects services, routes and middlewares until [`build`](Self::build).
pub struct ApplicationBuilder {
    services: Arc<ServiceRegistry>,
    routes: RouteTable,
    middlewares: Vec<Middleware>,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            services: Arc::new(ServiceRegistry::new()),
            routes: RouteTable::new(),
            middlewares: Vec::new(),
        }
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Registers `C` as a scoped service keyed by its type name and maps
    /// the routes derived from its operations.
    ///
    /// The controller is constructed once here to read its base path and
    /// policies, so its dependencies must already be registered.
    pub fn map_controller<C, Args>(
        &mut self,
        constructor: impl Constructor<Args, C>,
    ) -> Result<&mut Self, CometError>
    where
        C: Controller,
    {
        let name = controller_name::<C>();
        self.services.register_keyed_scoped(name, constructor)?;

        let mut probe = ScopeContext::new();
        let controller = self.services.resolve_keyed::<C>(name, &mut probe)?;

        for route in derive_routes(controller.as_ref())? {
            self.routes.insert(route)?;
        }
        log::debug!("Mapped controller {}", name);
        Ok(self)
    }

    pub fn map_group(&mut self, group: RouteGroup) -> Result<&mut Self, CometError> {
        let base_path = group.base_path().to_string();
        for route in group.into_routes()? {
            self.routes.insert(route)?;
        }
        log::debug!("Mapped group {}", base_path);
        Ok(self)
    }

    /// Maps one explicit route, its handler inside `middlewares`.
    pub fn map_route<F>(
        &mut self,
        method: HttpMethod,
        path: &str,
        f: F,
        middlewares: Vec<Middleware>,
    ) -> Result<&mut Self, CometError>
    where
        F: Fn(&mut HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        let template = parse_route_pattern(&join_paths("", path))?;
        let wrapped = chain(handler(f), &middlewares);
        self.routes
            .insert(RouteDescriptor::new(method, template, wrapped))?;
        Ok(self)
    }

    /// Adds a middleware around the whole router, unmatched requests included.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn add_jwt_authentication(
        &mut self,
        provider: impl JwtProvider + 'static,
        config: JwtConfig,
        user_config: UserConfig,
        store: impl UserStore + 'static,
    ) -> Result<&mut Self, CometError> {
        security::add_jwt_authentication(&self.services, provider, config, user_config, store)?;
        Ok(self)
    }

    /// Seals the registry and freezes the route table.
    pub fn build(self) -> Application {
        self.services.seal();

        let routes = Arc::new(self.routes);
        let router = {
            let routes = Arc::clone(&routes);
            handler(move |req| dispatch(&routes, req))
        };
        let entry = chain(router, &self.middlewares);

        log::debug!(
            "Application built: {} routes, {} services, {} middlewares",
            routes.len(),
            self.services.len(),
            self.middlewares.len()
        );

        Application {
            services: self.services,
            routes,
            entry,
        }
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built application. Safe to share across request workers.
pub struct Application {
    services: Arc<ServiceRegistry>,
    routes: Arc<RouteTable>,
    entry: Handler,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Dispatches one request inside a fresh scope. The scope, and every
    /// scoped instance in it, ends with the request.
    pub fn handle(&self, mut req: HttpRequest) -> HttpResponse {
        req.enter_scope(Arc::clone(&self.services));
        let response = (self.entry)(&mut req);
        if let Some(scope) = req.scope() {
            log::trace!(
                "{} {} -> {} (scope {}, {} scoped instances)",
                req.method,
                req.path,
                response.status_code,
                scope.id(),
                scope.len()
            );
        }
        response
    }

    /// Every mapped route as (method, pattern).
    pub fn routes(&self) -> Vec<(HttpMethod, String)> {
        self.routes.routes()
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }
}
