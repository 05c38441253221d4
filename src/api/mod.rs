pub mod fairings;
pub mod handlers;

use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use serde_json::json;

/// Terminal error responder. Every exit path answers with a structured
/// `{"error": ...}` body; internal error chains stay in the logs and are
/// never echoed to clients.
#[derive(Debug)]
pub struct AppError {
    pub status: Status,
    pub error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(error: impl Into<anyhow::Error>) -> Self {
        AppError {
            status: Status::BadRequest,
            error: error.into(),
        }
    }

    pub fn internal(error: anyhow::Error) -> Self {
        AppError {
            status: Status::InternalServerError,
            error,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for AppError {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'o> {
        log::error!("Request failed ({}): {:?}", self.status, self.error);

        let body = json!({ "error": self.error.to_string() }).to_string();
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl<E> From<E> for AppError
where
    anyhow::Error: From<E>,
{
    fn from(err: E) -> Self {
        AppError {
            status: Status::InternalServerError,
            error: anyhow::Error::from(err),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
