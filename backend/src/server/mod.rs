//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use color_eyre::eyre::{Result, WrapErr};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use classdesk::Trace;
#[cfg(debug_assertions)]
use classdesk::doc::ApiDoc;
use classdesk::inbound::http::configure;
use classdesk::inbound::http::health::{HealthState, live, ready};
use classdesk::inbound::http::state::HttpState;
use state_builders::build_http_state;

/// Shared data handed to every worker's `App`.
#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Build the adapters and bind the listener.
///
/// The returned [`Server`] must be awaited to serve requests. Readiness is
/// flagged once the socket is bound.
///
/// # Errors
///
/// Fails when an adapter cannot be constructed or the address cannot be
/// bound.
pub fn create_server(health_state: web::Data<HealthState>, config: ServerConfig) -> Result<Server> {
    let http_state = web::Data::new(build_http_state(&config)?);
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr())
        .wrap_err_with(|| format!("bind {}", config.bind_addr()))?
        .run();

    health_state.mark_ready();
    Ok(server)
}
