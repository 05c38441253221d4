pub mod delete;
pub mod listing;
pub mod operations;
pub mod process;

use rocket::Route;

pub fn generate_orchestrator_routes() -> Vec<Route> {
    routes![
        delete::delete_photo,
        delete::delete_photo_preflight,
        process::process_photo,
        process::process_photo_preflight,
    ]
}

pub fn generate_operation_routes() -> Vec<Route> {
    routes![
        operations::upload_object,
        operations::delete_object,
        operations::resize_image,
        operations::delete_record,
        operations::operations_preflight,
    ]
}

pub fn generate_listing_routes() -> Vec<Route> {
    routes![listing::list_photos, listing::list_photos_preflight]
}
