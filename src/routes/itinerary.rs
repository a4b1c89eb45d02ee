use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::error::PlanError;
use crate::models::plan::{DataQuality, DayPlan, ItineraryPlan, PlanRequest, PlannedActivity};
use crate::models::venue::Coordinates;
use crate::services::categorizer::ActivityCategory;
use crate::services::itinerary_generation::ItineraryPlanner;

/*
    POST /api/itineraries/plan
*/
pub async fn plan(
    request: web::Json<PlanRequest>,
    planner: web::Data<ItineraryPlanner>,
) -> impl Responder {
    match planner.generate_plan(&request).await {
        Ok(plan) => HttpResponse::Ok().json(plan),
        Err(err @ PlanError::InvalidRequest(_)) => {
            HttpResponse::BadRequest().json(json!({ "error": err.to_string() }))
        }
        Err(
            err @ (PlanError::InfeasibleDestination { .. }
            | PlanError::InsufficientCandidates { .. }),
        ) => {
            log::info!("plan request rejected: {}", err);
            HttpResponse::UnprocessableEntity().json(json!({ "error": err.to_string() }))
        }
    }
}

/*
    GET /api/itineraries/sample

    A canned plan so clients can integrate without live API keys.
*/
pub async fn sample() -> impl Responder {
    fn activity(
        id: &str,
        name: &str,
        category: ActivityCategory,
        time: &str,
        lat: f64,
        lng: f64,
    ) -> PlannedActivity {
        PlannedActivity {
            place_id: id.to_string(),
            name: name.to_string(),
            category,
            time: time.to_string(),
            location: Some("Las Vegas, NV".to_string()),
            coordinates: Some(Coordinates { lat, lng }),
            rating: Some(4.6),
            distance_to_next_km: None,
        }
    }

    let plan = ItineraryPlan {
        destination: "Las Vegas, NV".to_string(),
        total_days: 2,
        dates: Some("March 15, 2026 - March 16, 2026".to_string()),
        data_quality: DataQuality::Full,
        days: vec![
            DayPlan {
                day: 1,
                min_activities: 2,
                max_activities: 3,
                activities: vec![
                    activity(
                        "sample-neon",
                        "The Neon Museum",
                        ActivityCategory::Culture,
                        "2:00 PM",
                        36.1770,
                        -115.1356,
                    ),
                    activity(
                        "sample-fountains",
                        "Fountains of Bellagio",
                        ActivityCategory::Entertainment,
                        "7:00 PM",
                        36.1126,
                        -115.1767,
                    ),
                ],
            },
            DayPlan {
                day: 2,
                min_activities: 2,
                max_activities: 3,
                activities: vec![activity(
                    "sample-bacchanal",
                    "Brunch at Bacchanal",
                    ActivityCategory::Dining,
                    "10:00 AM",
                    36.1162,
                    -115.1745,
                )],
            },
        ],
        notes: vec![
            "Bring ID - required everywhere in Vegas".to_string(),
            "Set gambling budget beforehand".to_string(),
            "Stay hydrated - desert climate".to_string(),
        ],
    };

    HttpResponse::Ok().json(plan)
}
