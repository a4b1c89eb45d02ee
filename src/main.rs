use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use tripflow_api::routes;
use tripflow_api::services::itinerary_generation::{ItineraryPlanner, PlannerConfig};
use tripflow_api::services::text_generation::GeminiTextGenerator;
use tripflow_api::services::venue_source::GooglePlacesSource;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let venue_source =
        Arc::new(GooglePlacesSource::new().expect("GOOGLE_MAPS_API_KEY must be set"));

    let mut planner =
        ItineraryPlanner::new(venue_source).with_config(PlannerConfig::from_env());
    match GeminiTextGenerator::new() {
        Ok(generator) => planner = planner.with_text_generator(Arc::new(generator)),
        Err(e) => log::warn!("text generation disabled: {}", e),
    }
    let planner = web::Data::new(planner);

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(planner.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api").service(
                    web::scope("/itineraries")
                        .route("/plan", web::post().to(routes::itinerary::plan))
                        .route("/sample", web::get().to(routes::itinerary::sample)),
                ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
