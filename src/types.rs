use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use std::fmt::Debug;

use crate::utils::try_respond;

pub const BAD_REQUEST: &str = "bad request";
pub const NOT_FOUND: &str = "not found";
pub const INTERNAL_SERVER_ERROR: &str = "internal server error";

#[derive(Debug)]
pub enum ApiError {
    /// Malformed identifier or payload, rejected before reaching the store.
    BadRequest,
    /// A lookup or mutation matched zero rows.
    NotFound,
    Diesel(DieselError),
    Pool(r2d2::Error),
    Internal,
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> ApiError {
        ApiError::Pool(err)
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Maps a typed path segment that failed to parse onto a 400.
pub fn parse_id(raw: Result<i32, &str>) -> Result<i32, ApiError> {
    raw.map_err(|segment| {
        log::warn!("rejecting malformed identifier {:?}", segment);
        ApiError::BadRequest
    })
}

/// A request body that could not be read as the expected JSON shape.
pub fn reject_payload<E: Debug>(err: E) -> ApiError {
    log::warn!("rejecting request body: {:?}", err);
    ApiError::BadRequest
}

/// One step of the error normalization chain.
pub struct Stage {
    pub name: &'static str,
    pub matches: fn(&ApiError) -> bool,
    pub status: Status,
    pub msg: &'static str,
}

/// Evaluated in order; the first stage whose predicate holds produces the
/// response. Anything left over is a 500.
pub static STAGES: &[Stage] = &[
    Stage {
        name: "explicit bad request",
        matches: is_explicit_bad_request,
        status: Status::BadRequest,
        msg: BAD_REQUEST,
    },
    Stage {
        name: "explicit not found",
        matches: is_explicit_not_found,
        status: Status::NotFound,
        msg: NOT_FOUND,
    },
    Stage {
        name: "zero rows",
        matches: is_zero_rows,
        status: Status::NotFound,
        msg: NOT_FOUND,
    },
    Stage {
        name: "foreign key violation",
        matches: is_foreign_key_violation,
        status: Status::NotFound,
        msg: NOT_FOUND,
    },
    Stage {
        name: "rejected input",
        matches: is_rejected_input,
        status: Status::BadRequest,
        msg: BAD_REQUEST,
    },
];

fn is_explicit_bad_request(err: &ApiError) -> bool {
    matches!(err, ApiError::BadRequest)
}

fn is_explicit_not_found(err: &ApiError) -> bool {
    matches!(err, ApiError::NotFound)
}

fn is_zero_rows(err: &ApiError) -> bool {
    matches!(err, ApiError::Diesel(DieselError::NotFound))
}

fn is_foreign_key_violation(err: &ApiError) -> bool {
    matches!(
        err,
        ApiError::Diesel(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _))
    )
}

fn is_rejected_input(err: &ApiError) -> bool {
    match err {
        ApiError::Diesel(DieselError::DatabaseError(kind, info)) => match kind {
            DatabaseErrorKind::NotNullViolation | DatabaseErrorKind::CheckViolation => true,
            _ => info.message().starts_with("invalid input syntax"),
        },
        _ => false,
    }
}

/// Runs `err` through the chain and returns the status and message to send.
pub fn normalize(err: &ApiError) -> (Status, &'static str) {
    match STAGES.iter().find(|stage| (stage.matches)(err)) {
        Some(stage) => {
            if let ApiError::Diesel(cause) = err {
                log::warn!("{}: {}", stage.name, cause);
            }
            (stage.status, stage.msg)
        }
        None => {
            log::error!("unhandled error: {:?}", err);
            (Status::InternalServerError, INTERNAL_SERVER_ERROR)
        }
    }
}

/// Message for a status produced outside the handlers, e.g. by a catcher.
pub fn message_for(status: Status) -> &'static str {
    match status.code {
        404 => NOT_FOUND,
        400..=499 => BAD_REQUEST,
        _ => INTERNAL_SERVER_ERROR,
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let (status, msg) = normalize(&self);
        try_respond(req, &json!({ "msg": msg }), status)
    }
}
