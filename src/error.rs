use log::{error, warn};
use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

use crate::model::common::{CategoryId, CollaboratorId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An underlying database operation failed; any partially-applied local
    /// state must be assumed invalid and re-read from the store.
    #[error(transparent)]
    Db(#[from] DbError),
    /// A condition best described directly by an HTTP status.
    #[error("{1}")]
    Status(Status, String),
    /// The collaborator is restricted to other categories.
    #[error("Collaborator {collaborator_id} is not eligible in category {category_id}")]
    NotEligible {
        category_id: CategoryId,
        collaborator_id: CollaboratorId,
    },
    /// The lottery was asked to draw from an empty roster.
    #[error("Cannot draw from an empty roster")]
    EmptyRoster,
}

impl Error {
    pub fn not_found(what: String) -> Self {
        Self::Status(Status::NotFound, format!("{what} not found"))
    }

    pub fn bad_request(why: String) -> Self {
        Self::Status(Status::BadRequest, why)
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        Err(match self {
            Self::Db(ref err) => {
                error!("Database error: {err}");
                Status::InternalServerError
            }
            Self::Status(status, ref msg) => {
                warn!("{status}: {msg}");
                status
            }
            Self::NotEligible { .. } => {
                warn!("{self}");
                Status::UnprocessableEntity
            }
            Self::EmptyRoster => {
                warn!("{self}");
                Status::Conflict
            }
        })
    }
}
