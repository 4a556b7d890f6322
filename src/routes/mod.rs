use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};

use crate::stream::game_state_events;

/// HTTP handler for the index page
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Chess Arena: live games at /api/chess-game-state")
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/chess-game-state").route(web::get().to(game_state_events)))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/").route(web::get().to(index)));
}

/// CORS policy for the configured origins. `*` opens the API to any origin,
/// without credentials.
pub fn cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET"])
        .allowed_headers(vec![header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT]);

    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    origins
        .iter()
        .fold(cors.supports_credentials(), |cors, origin| cors.allowed_origin(origin))
}
