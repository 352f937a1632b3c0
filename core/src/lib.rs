//! # COMET CORE LIBRARY
//!
//! **CONVENTION-BASED ROUTING WITH LIFETIME-SCOPED DEPENDENCY INJECTION**
//!
//! **ARCHITECTURE**: a sealed [`ServiceRegistry`](dependencies::ServiceRegistry)
//! resolves transient, singleton and scoped services; controllers turn their
//! operation names into routes; every request is dispatched inside its own
//! [`ScopeContext`](dependencies::ScopeContext).
//!
//! ```
//! use comet::api::*;
//! use std::sync::Arc;
//!
//! struct Greeting(&'static str);
//!
//! struct PersonController {
//!     greeting: Arc<Greeting>,
//! }
//!
//! impl Controller for PersonController {
//!     fn operations() -> Vec<Operation<Self>> {
//!         vec![
//!             Operation::new("List", |ctrl, _| HttpResponse::ok(ctrl.greeting.0)),
//!             Operation::new("GetById", |_, req| {
//!                 HttpResponse::ok(req.param("id").unwrap_or_default().to_string())
//!             }),
//!         ]
//!     }
//! }
//!
//! let mut builder = Application::builder();
//! builder.services().register_singleton(Greeting("hello")).unwrap();
//! builder
//!     .map_controller(|greeting: Arc<Greeting>| PersonController { greeting })
//!     .unwrap();
//! let app = builder.build();
//!
//! let response = app.handle(HttpRequest::new(HttpMethod::GET, "/person/42"));
//! assert_eq!(response.status_code, 200);
//! ```

pub mod api;
pub mod app;
pub mod controller;
pub mod dependencies;
pub mod dispatch;
pub mod errors;
pub mod group;
pub mod identity;
pub mod request;
pub mod response;
pub mod routing;
pub mod security;

pub use app::{Application, ApplicationBuilder};
pub use errors::CometError;
