//! Convention-based route derivation.
//!
//! An operation name is matched against the verb prefixes in
//! [`Convention::ORDERED`], the prefix is stripped and the rest is split
//! into lower-case segments at upper-case boundaries. A connector word
//! (`by`, `for`, `of`, `with`) turns the segment after it into a path
//! parameter.

use crate::controller::{controller_name, Controller, OperationFn};
use crate::errors::CometError;
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::routing::parser::{join_paths, parse_route_pattern};
use crate::routing::types::{handler, Convention, Handler, RouteDescriptor, PARAM_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;

static CONNECTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|/)(by|for|of|with)/([^/]+)").expect("connector pattern is valid")
});

const CONTROLLER_SUFFIX: &str = "Controller";

/// Lower-cases `name`, inserting `separator` before every upper-case
/// letter that does not follow another upper-case letter.
pub fn split_words(name: &str, separator: char) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;

    for ch in name.chars() {
        if ch.is_uppercase() {
            if matches!(previous, Some(prev) if !prev.is_uppercase()) {
                result.push(separator);
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
        previous = Some(ch);
    }

    result
}

/// `/task-item` for `TaskItemController`.
pub fn derive_base_path(type_name: &str) -> String {
    let name = type_name.strip_suffix(CONTROLLER_SUFFIX).unwrap_or(type_name);
    format!("/{}", split_words(name, '-'))
}

/// Full route path of operation `name` under `base_path`.
///
/// Returns `None` when the name follows no verb convention.
pub fn derive_operation_path(base_path: &str, name: &str) -> Option<String> {
    let convention = Convention::detect(name)?;
    let remainder = name.get(convention.prefix().len()..).unwrap_or_default();

    let words = split_words(remainder, '/');
    let parameterized = CONNECTOR.replace_all(&words, |caps: &regex::Captures<'_>| {
        let leading = if caps[0].starts_with('/') { "/" } else { "" };
        format!("{}{}{}", leading, PARAM_MARKER, &caps[2])
    });

    let suffix = strip_base_name(base_path, &parameterized);
    Some(join_paths(base_path, &suffix))
}

/// Removes the first run of literal segments that repeats the base
/// path's own name, so `GetPersonById` under `/person` is `/person/:id`.
fn strip_base_name(base_path: &str, suffix: &str) -> String {
    let base_name = base_path.rsplit('/').find(|s| !s.is_empty()).unwrap_or_default();
    let mut segments: Vec<&str> = suffix.split('/').filter(|s| !s.is_empty()).collect();

    if !base_name.is_empty() {
        let words: Vec<&str> = base_name.split('-').collect();
        if let Some(start) = segments
            .windows(words.len())
            .position(|window| window == words.as_slice())
        {
            segments.drain(start..start + words.len());
        }
    }

    segments.join("/")
}

/// Base path of a controller instance: its explicit route, or the one
/// derived from its type name.
pub fn controller_base_path<C: Controller>(controller: &C) -> String {
    match controller.route() {
        Some(route) if !route.is_empty() => route.to_string(),
        _ => derive_base_path(controller_name::<C>()),
    }
}

/// One descriptor per conventional operation of `C`, policies resolved.
pub fn derive_routes<C: Controller>(controller: &C) -> Result<Vec<RouteDescriptor>, CometError> {
    let base_path = controller_base_path(controller);
    let policies = controller.policies();
    let name = controller_name::<C>();

    let mut routes = Vec::new();
    for operation in C::operations() {
        let (Some(convention), Some(path)) = (
            Convention::detect(operation.name),
            derive_operation_path(&base_path, operation.name),
        ) else {
            log::debug!("Skipping {}::{}: no verb convention", name, operation.name);
            continue;
        };

        let template = parse_route_pattern(&path)?;
        let mut descriptor = RouteDescriptor::new(
            convention.method(),
            template,
            controller_handler::<C>(operation.handler),
        );
        descriptor.operation = Some(operation.name.to_string());
        descriptor.policies = policies.resolve(operation.name);

        log::debug!(
            "Derived {} {} from {}::{}",
            descriptor.method,
            path,
            name,
            operation.name
        );
        routes.push(descriptor);
    }

    Ok(routes)
}

/// Handler that resolves the controller from the request scope, then runs
/// `operation` on it.
fn controller_handler<C: Controller>(operation: OperationFn<C>) -> Handler {
    handler(move |req: &mut HttpRequest| {
        match req.resolve_keyed::<C>(controller_name::<C>()) {
            Ok(controller) => operation(&controller, req),
            Err(err) => {
                log::error!("Failed to resolve controller {}: {}", controller_name::<C>(), err);
                HttpResponse::error("error getting controller")
            }
        }
    })
}
