#[macro_use]
extern crate rocket;

pub mod adapters;
pub mod api;
pub mod bootstrap;
pub mod common;
pub mod config;
pub mod models;
pub mod orchestrators;
pub mod processing;
pub mod state;

use rocket::{Build, Rocket};

use crate::api::fairings::cors::Cors;
use crate::api::handlers::{
    generate_listing_routes, generate_operation_routes, generate_orchestrator_routes,
};
use crate::state::AppState;

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(state)
        .mount("/", generate_orchestrator_routes())
        .mount("/", generate_operation_routes())
        .mount("/", generate_listing_routes())
}
