use actix_web::http::Method;
use actix_web::{dev::Server, web, App, HttpServer};
use tera::Tera;
use tracing_actix_web::TracingLogger;

use crate::configuration::RelaySettings;

pub mod client;
pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;

pub fn run(
    listener: std::net::TcpListener,
    relay_settings: RelaySettings,
    templates: Tera,
) -> Result<Server, std::io::Error> {
    let relay_settings = web::Data::new(relay_settings);
    let templates = web::Data::new(templates);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(routes::json_error_handler))
            .route("/healthz", web::get().to(routes::ping))
            .service(
                web::resource("/api/send-email")
                    .wrap(routes::cors_headers())
                    .route(web::post().to(routes::send_email))
                    .route(web::method(Method::OPTIONS).to(routes::preflight))
                    .default_service(web::to(routes::method_not_allowed)),
            )
            .app_data(relay_settings.clone())
            .app_data(templates.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
