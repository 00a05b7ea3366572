//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{PersistentServices, build_persistent_services};

use actix_cors::Cors;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, HttpServer, web};
use tracing::info;

#[cfg(debug_assertions)]
use rental_backend::ApiDoc;
use rental_backend::Trace;
use rental_backend::domain::TRACE_ID_HEADER;
use rental_backend::inbound::http::error::json_error_handler;
use rental_backend::inbound::http::health::{HealthState, live, ready};
use rental_backend::inbound::http::residencies::{
    create_residency, get_residency, list_residencies, list_residencies_legacy,
};
use rental_backend::inbound::http::state::HttpState;
use rental_backend::inbound::http::users::{
    all_bookings, all_fav, book_visit, get_profile, register, remove_booking, to_fav,
    update_profile,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const CORS_MAX_AGE_SECS: usize = 3600;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    client_origin: String,
    json_limit: usize,
}

fn build_cors(client_origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(client_origin)
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .expose_headers([TRACE_ID_HEADER])
        .supports_credentials()
        .max_age(CORS_MAX_AGE_SECS)
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        client_origin,
        json_limit,
    } = deps;

    let json_config = web::JsonConfig::default()
        .limit(json_limit)
        .error_handler(json_error_handler);

    // `allresd` must be registered ahead of `{id}`.
    let api = web::scope("/api")
        .wrap(build_cors(&client_origin))
        .service(list_residencies)
        .service(list_residencies_legacy)
        .service(create_residency)
        .service(get_residency)
        .service(register)
        .service(book_visit)
        .service(all_bookings)
        .service(remove_booking)
        .service(to_fav)
        .service(all_fav)
        .service(get_profile)
        .service(update_profile);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server serving `http_state`.
///
/// The readiness probe is flipped once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        client_origin,
        json_limit,
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(http_state),
        client_origin,
        json_limit,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    info!(%bind_addr, "http server listening");
    Ok(server)
}
