mod handlers;
mod intake;
mod models;
mod relay;
#[cfg(test)]
mod testutil;

use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use relay::{RelayClient, DEFAULT_TIMEOUT};

/// Deployed prediction service; overridable via PREDICTOR_BASE_URL.
/// No trailing slash.
const DEFAULT_PREDICTOR_URL: &str =
    "https://flask-models-planet-detector-841768974079.europe-west1.run.app";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let base_url = std::env::var("PREDICTOR_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_PREDICTOR_URL.to_string());
    let timeout = std::env::var("RELAY_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    let relay_client = RelayClient::new(base_url, timeout)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    log::info!("relaying predictions to {}", relay_client.base_url());
    let relay_data = web::Data::new(relay_client);

    log::info!("Server running at http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(relay_data.clone())
            .service(web::resource("/predict").route(web::post().to(handlers::predict)))
            .service(web::resource("/health").route(web::get().to(handlers::health)))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
