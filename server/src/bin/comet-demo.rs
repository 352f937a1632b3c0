//! Small demo application: one controller, one route group.
//!
//! Set `COMET_CONFIG` to a TOML file to override the defaults and
//! `COMET_JWT_SECRET` to sign tokens with something other than the demo key.

use comet::api::*;
use comet::identity::{InMemoryUserStore, UserConfig};
use comet::security::{Hs256JwtProvider, JwtConfig};
use comet_server::{logging, CometServer, ServerConfig};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

struct Greeter {
    greeting: String,
}

struct TaskController {
    greeter: Arc<Greeter>,
}

impl Controller for TaskController {
    fn policies(&self) -> PolicyConfig {
        PolicyConfig::new().operation("Post", require_role("writer"))
    }

    fn operations() -> Vec<Operation<Self>> {
        vec![
            Operation::new("Get", |ctrl, _| {
                HttpResponse::ok(format!("{} task", ctrl.greeter.greeting))
            }),
            Operation::new("Post", |_, req| match req.json::<serde_json::Value>() {
                Ok(task) => HttpResponse::created(task),
                Err(err) => HttpResponse::from(err),
            }),
        ]
    }
}

fn request_logger() -> Middleware {
    middleware(|next| {
        handler(move |req| {
            let started = Instant::now();
            let response = next(req);
            log::info!(
                "{} {} {} {:?}",
                req.method,
                req.path,
                response.status_code,
                started.elapsed()
            );
            response
        })
    })
}

fn require_header(name: &'static str) -> Middleware {
    middleware(move |next| {
        handler(move |req| match req.header(name) {
            Some(_) => next(req),
            None => HttpResponse::bad_request(format!("missing header {}", name)),
        })
    })
}

fn build_app() -> Result<Application, CometError> {
    let mut builder = Application::builder();
    builder.services().register_singleton(Greeter {
        greeting: "Hello".to_string(),
    })?;
    builder.add_jwt_authentication(
        Hs256JwtProvider::new(),
        JwtConfig {
            issuer: "comet-demo".to_string(),
            secret_key: std::env::var("COMET_JWT_SECRET")
                .unwrap_or_else(|_| "comet-demo-secret".to_string()),
            ..JwtConfig::default()
        },
        UserConfig::default(),
        InMemoryUserStore::new(),
    )?;
    builder.map_controller(|greeter: Arc<Greeter>| TaskController { greeter })?;

    let mut people = RouteGroup::new("/person");
    people
        .map_get("", |_| HttpResponse::ok(json!(["ada", "grace"])), vec![])
        .map_get(
            "/:id",
            |req| HttpResponse::ok(json!({ "id": req.param("id") })),
            vec![require_header("accept")],
        );
    builder.map_group(people)?;
    builder.use_middleware(request_logger());

    Ok(builder.build())
}

#[tokio::main]
async fn main() -> ExitCode {
    let path = std::env::var_os("COMET_CONFIG").map(PathBuf::from);
    let config = match ServerConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.log_level);

    let app = match build_app() {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to build application: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match CometServer::new(app, config).serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
