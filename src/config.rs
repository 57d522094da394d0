use log::{error, info};
use mongodb::{error::Error as DbError, Client as MongoClient, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::model::mongodb::{ensure_id_counters_exist, ensure_indexes_exist, Coll};

/// The database the server stores everything in. Tests use throwaway
/// databases instead; see the test harness.
const DATABASE_NAME: &str = "itawards";

/// Application configuration, drawn from `Rocket.toml` and `ROCKET_*`
/// environment variables and kept in managed state.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_podium_size")]
    podium_size: usize,
}

fn default_podium_size() -> usize {
    3
}

impl Config {
    /// How many places the results podium shows (1st, 2nd, 3rd, ...).
    pub fn podium_size(&self) -> usize {
        self.podium_size
    }
}

#[cfg(test)]
impl Config {
    pub fn example() -> Self {
        Self {
            podium_size: default_podium_size(),
        }
    }
}

/// Database connection settings, loaded separately from [`Config`] so the
/// connection string never ends up in an endpoint-visible struct.
#[derive(Deserialize)]
struct DbConfig {
    db_uri: String,
}

/// Extract a config section from the figment, logging any failure in full.
fn load_section<T: DeserializeOwned>(rocket: &Rocket<Build>, what: &str) -> Option<T> {
    match rocket.figment().extract::<T>() {
        Ok(section) => Some(section),
        Err(e) => {
            error!("Failed to load {what}");
            rocket::config::pretty_print_error(e);
            None
        }
    }
}

/// Ignite-time fairing that loads [`Config`] into managed state, aborting
/// launch if it is invalid.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(config) = load_section::<Config>(&rocket, "application config") else {
            return Err(rocket);
        };
        Ok(rocket.manage(config))
    }
}

/// Ignite-time fairing that connects to MongoDB, prepares the database, and
/// manages the resulting `Client` and `Database` handles.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(db_config) = load_section::<DbConfig>(&rocket, "database config") else {
            return Err(rocket);
        };

        info!("Connecting to MongoDB...");
        let client = match MongoClient::with_uri_str(&db_config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };

        let db = client.database(DATABASE_NAME);
        if let Err(e) = prepare_database(&db).await {
            error!("Failed to prepare database: {e}");
            return Err(rocket);
        }
        info!("Database ready");

        Ok(rocket.manage(client).manage(db))
    }
}

/// Bring the database up to the state the endpoints assume. The unique
/// composite index on nominations is what makes the one-vote-per-category
/// upsert safe.
pub(crate) async fn prepare_database(db: &Database) -> Result<(), DbError> {
    ensure_indexes_exist(db).await?;
    ensure_id_counters_exist(&Coll::from_db(db)).await
}
