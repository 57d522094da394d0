use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
};
use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::{Coll, MongoCollection};

/// Counter id for category ids.
pub const CATEGORY_IDS: &str = "category_ids";
/// Counter id for collaborator ids.
pub const COLLABORATOR_IDS: &str = "collaborator_ids";
/// Counter id for voter ids.
pub const VOTER_IDS: &str = "voter_ids";

/// A counter object used to implement auto-increment ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u64,
}

impl MongoCollection for Counter {
    const NAME: &'static str = "counters";
}

impl Counter {
    /// Atomically retrieve the next value of the counter with the given ID.
    pub async fn next(counters: &Coll<Counter>, id: &str) -> Result<u32> {
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options: FindOneAndUpdateOptions = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| {
                Error::Status(
                    Status::InternalServerError,
                    format!("Failed to find counter with ID {id}"),
                )
            })?;
        Ok(counter.next as u32)
    }
}

/// Ensure the per-entity id counters exist, starting at 1.
///
/// This operation is idempotent: existing counters are left untouched.
pub async fn ensure_id_counters_exist(counters: &Coll<Counter>) -> std::result::Result<(), DbError> {
    for id in [CATEGORY_IDS, COLLABORATOR_IDS, VOTER_IDS] {
        let update = doc! {
            "$setOnInsert": { "next": 1_i64 }
        };
        counters
            .update_one(
                doc! { "_id": id },
                update,
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use backend_test::backend_test;
    use mongodb::Database;

    #[backend_test]
    async fn counters_allocate_sequential_ids(_db: Database, counters: Coll<Counter>) {
        let first = Counter::next(&counters, CATEGORY_IDS).await.unwrap();
        let second = Counter::next(&counters, CATEGORY_IDS).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        // Counters are independent.
        let voter = Counter::next(&counters, VOTER_IDS).await.unwrap();
        assert_eq!(voter, 1);
    }

    #[backend_test]
    async fn seeding_is_idempotent(db: Database, counters: Coll<Counter>) {
        Counter::next(&counters, COLLABORATOR_IDS).await.unwrap();

        // Re-running the seeding must not reset a live counter.
        ensure_id_counters_exist(&Coll::from_db(&db)).await.unwrap();
        let next = Counter::next(&counters, COLLABORATOR_IDS).await.unwrap();
        assert_eq!(next, 2);
    }
}
