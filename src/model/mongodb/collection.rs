use std::ops::Deref;

use log::debug;
use mongodb::{
    bson::{doc, Document},
    error::Error as DbError,
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{CategoryCollaborator, Nomination, Voter};

/// A type with a well-known collection name in the database.
pub trait MongoCollection {
    const NAME: &'static str;
}

/// A typed handle on the collection where `T` lives.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// Manual impl: a handle is cloneable whether or not `T` is.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Resolve the managed [`Database`] and narrow it to this collection.
    ///
    /// Panics iff no [`Database`] is managed, which would be a startup bug.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

fn unique_index(keys: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

/// Create the unique indexes the endpoints rely on. Idempotent; runs at
/// every launch.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Creating collection indexes");

    // Codes are stored upper-cased, which makes this index case-insensitive
    // in effect.
    Coll::<Voter>::from_db(db)
        .create_index(unique_index(doc! {"employee_code": 1}), None)
        .await?;

    // Eligibility links: one document per (category, collaborator) pair.
    Coll::<CategoryCollaborator>::from_db(db)
        .create_index(
            unique_index(doc! {"category_id": 1, "collaborator_id": 1}),
            None,
        )
        .await?;

    // Nominations: the one-pick-per-voter-per-category invariant. The
    // nomination upsert relies on this index to collapse races.
    Coll::<Nomination>::from_db(db)
        .create_index(unique_index(doc! {"voter_id": 1, "category_id": 1}), None)
        .await?;

    Ok(())
}
