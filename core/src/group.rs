use crate::dispatch::chain;
use crate::errors::CometError;
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::routing::{handler, join_paths, parse_route_pattern, Handler, HttpMethod, Middleware, RouteDescriptor};

struct GroupRoute {
    method: HttpMethod,
    path: String,
    handler: Handler,
    middlewares: Vec<Middleware>,
}

/// Explicit routes sharing a base path and a middleware stack.
pub struct RouteGroup {
    base_path: String,
    middlewares: Vec<Middleware>,
    routes: Vec<GroupRoute>,
}

impl RouteGroup {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            middlewares: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Adds a middleware around every route of the group.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn map_get<F>(&mut self, path: &str, f: F, middlewares: Vec<Middleware>) -> &mut Self
    where
        F: Fn(&mut HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.map(HttpMethod::GET, path, handler(f), middlewares)
    }

    pub fn map_post<F>(&mut self, path: &str, f: F, middlewares: Vec<Middleware>) -> &mut Self
    where
        F: Fn(&mut HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.map(HttpMethod::POST, path, handler(f), middlewares)
    }

    pub fn map_put<F>(&mut self, path: &str, f: F, middlewares: Vec<Middleware>) -> &mut Self
    where
        F: Fn(&mut HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.map(HttpMethod::PUT, path, handler(f), middlewares)
    }

    pub fn map_patch<F>(&mut self, path: &str, f: F, middlewares: Vec<Middleware>) -> &mut Self
    where
        F: Fn(&mut HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.map(HttpMethod::PATCH, path, handler(f), middlewares)
    }

    pub fn map_delete<F>(&mut self, path: &str, f: F, middlewares: Vec<Middleware>) -> &mut Self
    where
        F: Fn(&mut HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.map(HttpMethod::DELETE, path, handler(f), middlewares)
    }

    pub fn map(
        &mut self,
        method: HttpMethod,
        path: &str,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        self.routes.push(GroupRoute {
            method,
            path: path.to_string(),
            handler,
            middlewares,
        });
        self
    }

    /// Route descriptors with full paths. Each handler sits inside its own
    /// middlewares, which sit inside the group's.
    pub fn into_routes(self) -> Result<Vec<RouteDescriptor>, CometError> {
        let RouteGroup {
            base_path,
            middlewares: group_middlewares,
            routes,
        } = self;

        routes
            .into_iter()
            .map(|route| {
                let template = parse_route_pattern(&join_paths(&base_path, &route.path))?;
                let wrapped = chain(chain(route.handler, &route.middlewares), &group_middlewares);
                Ok(RouteDescriptor::new(route.method, template, wrapped))
            })
            .collect()
    }
}
