use mongodb::bson::doc;
use rocket::{serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::LoginRequest,
    db::{normalise_code, Voter},
    mongodb::Coll,
};

pub fn routes() -> Vec<Route> {
    routes![login]
}

/// Identify a voter by their employee code. Possession of the code is the
/// whole identity proof; there is no password and no session.
#[post("/login", data = "<request>", format = "json")]
async fn login(request: Json<LoginRequest>, voters: Coll<Voter>) -> Result<Json<Voter>> {
    let code = normalise_code(&request.employee_code);
    let voter = voters
        .find_one(doc! { "employee_code": &code }, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter with employee code '{code}'")))?;
    Ok(Json(voter))
}
