use crate::errors::CometError;
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::security::Policy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Marker that turns a template segment into a path parameter.
pub const PARAM_MARKER: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
    TRACE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::DELETE => "DELETE",
            Self::PATCH => "PATCH",
            Self::HEAD => "HEAD",
            Self::OPTIONS => "OPTIONS",
            Self::TRACE => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = CometError;

    fn from_str(method: &str) -> Result<Self, Self::Err> {
        crate::routing::parser::parse_http_method(method)
    }
}

pub type Handler = Arc<dyn Fn(&mut HttpRequest) -> HttpResponse + Send + Sync>;

/// Wraps a handler into a new handler, independent of authorization.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut HttpRequest) -> HttpResponse + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Operation-name prefixes, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    List,
}

impl Convention {
    pub const ORDERED: [Convention; 6] = [
        Convention::Get,
        Convention::Post,
        Convention::Put,
        Convention::Patch,
        Convention::Delete,
        Convention::List,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::List => "LIST",
        }
    }

    /// HTTP verb served by the convention; LIST is a GET.
    pub fn method(&self) -> HttpMethod {
        match self {
            Self::Get | Self::List => HttpMethod::GET,
            Self::Post => HttpMethod::POST,
            Self::Put => HttpMethod::PUT,
            Self::Patch => HttpMethod::PATCH,
            Self::Delete => HttpMethod::DELETE,
        }
    }

    /// First convention whose prefix starts `name`, ignoring case.
    pub fn detect(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        Self::ORDERED
            .into_iter()
            .find(|convention| upper.starts_with(convention.prefix()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    pub(crate) pattern: String,
    pub(crate) segments: Vec<Segment>,
    pub(crate) param_names: Vec<String>,
}

impl RouteTemplate {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_dynamic(&self) -> bool {
        !self.param_names.is_empty()
    }
}

pub struct RouteDescriptor {
    pub method: HttpMethod,
    pub template: RouteTemplate,
    pub handler: Handler,
    /// Controller operation behind the route, if any.
    pub operation: Option<String>,
    /// Resolved policy set: wildcard policies first, then the operation's own.
    pub policies: Vec<Policy>,
}

impl RouteDescriptor {
    pub fn new(method: HttpMethod, template: RouteTemplate, handler: Handler) -> Self {
        Self {
            method,
            template,
            handler,
            operation: None,
            policies: Vec::new(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.template.is_dynamic()
    }

    pub fn static_key(&self) -> String {
        static_key(self.method, &self.template.pattern)
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("method", &self.method)
            .field("pattern", &self.template.pattern)
            .field("operation", &self.operation)
            .field("policies", &self.policies.len())
            .finish()
    }
}

pub fn static_key(method: HttpMethod, path: &str) -> String {
    format!("{}:{}", method, path)
}

#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDescriptor,
    pub path_params: HashMap<String, String>,
}
