pub mod health;
pub mod itinerary;
