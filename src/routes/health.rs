use std::collections::HashMap;
use std::env;

use actix_web::{HttpResponse, Responder};
use serde::Serialize;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check() -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let places = check_api_key("GOOGLE_MAPS_API_KEY", "Places search");
    health.services.insert("places".to_string(), places.clone());

    // Text generation is optional; a missing key degrades to fallback slots.
    let gemini = check_api_key("GEMINI_API_KEY", "Text generation");
    health.services.insert("text_generation".to_string(), gemini);

    if places.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

fn check_api_key(var: &str, label: &str) -> ServiceStatus {
    match env::var(var) {
        Ok(key) => {
            let masked = if key.len() > 8 {
                format!("{}***{}", &key[0..4], &key[key.len() - 4..])
            } else {
                "***".to_string()
            };
            ServiceStatus {
                status: "ok".to_string(),
                details: Some(format!("{} key configured ({})", label, masked)),
            }
        }
        Err(_) => ServiceStatus {
            status: "error".to_string(),
            details: Some(format!("{} not configured", var)),
        },
    }
}
