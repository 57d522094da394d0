mod bson;
mod collection;
mod counter;

pub use bson::id_filter;
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{
    ensure_id_counters_exist, Counter, CATEGORY_IDS, COLLABORATOR_IDS, VOTER_IDS,
};
