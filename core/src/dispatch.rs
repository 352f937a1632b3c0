use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::routing::{Handler, Middleware, RouteTable};
use crate::security::Policy;

/// Wraps `handler` so the first middleware is the outermost and runs first.
pub fn chain(mut handler: Handler, middlewares: &[Middleware]) -> Handler {
    for middleware in middlewares.iter().rev() {
        handler = middleware(handler);
    }
    handler
}

/// Wraps `handler` with every policy, first listed outermost.
pub fn authorize(mut handler: Handler, policies: &[Policy]) -> Handler {
    for policy in policies.iter().rev() {
        handler = policy.apply(handler);
    }
    handler
}

/// Matches the request, binds its path parameters and runs the route's
/// handler behind its policies. Unmatched requests answer 404.
pub fn dispatch(table: &RouteTable, req: &mut HttpRequest) -> HttpResponse {
    let matched = match table.lookup(req.method, &req.path) {
        Ok(matched) => matched,
        Err(err) => {
            log::debug!("{}", err);
            return HttpResponse::from(err);
        }
    };

    req.path_params = matched.path_params;
    let handler = authorize(matched.route.handler.clone(), &matched.route.policies);
    handler(req)
}
