use crate::errors::{error_codes, CometError};
use crate::routing::types::{static_key, HttpMethod, RouteDescriptor, RouteMatch, RouteTemplate, Segment};
use std::collections::HashMap;

/// Matches `path` against `template` segment by segment.
///
/// Segment counts must agree; parameter segments bind the literal request
/// segment, every other segment must be equal.
pub fn match_path(template: &RouteTemplate, path: &str) -> Option<HashMap<String, String>> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() != template.segments.len() {
        return None;
    }

    let mut params = HashMap::with_capacity(template.param_names.len());
    for (segment, part) in template.segments.iter().zip(parts) {
        match segment {
            Segment::Param(name) => {
                params.insert(name.clone(), part.to_string());
            }
            Segment::Literal(literal) if literal == part => {}
            Segment::Literal(_) => return None,
        }
    }

    Some(params)
}

/// Static routes keyed by `VERB:PATH`, dynamic routes in registration order.
#[derive(Debug, Default)]
pub struct RouteTable {
    static_routes: HashMap<String, RouteDescriptor>,
    dynamic_routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route: RouteDescriptor) -> Result<(), CometError> {
        if route.is_dynamic() {
            let duplicate = self.dynamic_routes.iter().any(|existing| {
                existing.method == route.method && existing.template.pattern == route.template.pattern
            });
            if duplicate {
                return Err(duplicate_route(&route));
            }
            log::debug!("Mapped dynamic route {} {}", route.method, route.template.pattern);
            self.dynamic_routes.push(route);
            return Ok(());
        }

        let key = route.static_key();
        if self.static_routes.contains_key(&key) {
            return Err(duplicate_route(&route));
        }
        log::debug!("Mapped static route {}", key);
        self.static_routes.insert(key, route);
        Ok(())
    }

    /// Exact static lookup first, then the first structural dynamic match.
    pub fn lookup(&self, method: HttpMethod, path: &str) -> Result<RouteMatch<'_>, CometError> {
        if let Some(route) = self.static_routes.get(&static_key(method, path)) {
            return Ok(RouteMatch {
                route,
                path_params: HashMap::new(),
            });
        }

        self.dynamic_routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                match_path(&route.template, path).map(|path_params| RouteMatch { route, path_params })
            })
            .ok_or_else(|| CometError::RouteNotFound {
                method,
                path: path.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.static_routes.len() + self.dynamic_routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every mapped route as (method, pattern), statics sorted, dynamics in order.
    pub fn routes(&self) -> Vec<(HttpMethod, String)> {
        let mut statics: Vec<(HttpMethod, String)> = self
            .static_routes
            .values()
            .map(|route| (route.method, route.template.pattern.clone()))
            .collect();
        statics.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

        statics.extend(
            self.dynamic_routes
                .iter()
                .map(|route| (route.method, route.template.pattern.clone())),
        );
        statics
    }
}

fn duplicate_route(route: &RouteDescriptor) -> CometError {
    CometError::registration(
        error_codes::DUPLICATE_ROUTE,
        format!("Route {} {} is already mapped", route.method, route.template.pattern),
    )
}
