use actix_web::HttpResponse;

/// Liveness check for the platform hosting the relay.
pub async fn ping() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
