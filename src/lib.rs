#[macro_use]
extern crate rocket;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

use rocket::{Build, Rocket};

use crate::api::lottery::LotteryState;
use crate::config::{ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;

/// Build the production server. The fairings load the config, connect to the
/// database and set up the collections; see [`config`].
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .manage(LotteryState::default())
}

/// Connect to the test MongoDB instance.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = std::env::var("ROCKET_DB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .expect("Failed to connect to the test database")
}

/// Get a random database name, so concurrent tests cannot collide.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}

/// Build a server against the given database, skipping the config and
/// database fairings so tests control both.
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    crate::config::prepare_database(&db).await.unwrap();

    rocket::build()
        .mount("/", api::routes())
        .manage(crate::config::Config::example())
        .manage(client)
        .manage(db)
        .manage(LotteryState::default())
}
