use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    common::CategoryId,
    db::{Category, Nomination},
    mongodb::{id_filter, Coll},
    tally::{tally, top_n, PodiumEntry, TallyEntry},
};

pub fn routes() -> Vec<Route> {
    routes![category_results, all_results]
}

/// The ranking for one category, with the podium (top places) broken out
/// for the presentation screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResults {
    pub category_id: CategoryId,
    pub ranking: Vec<TallyEntry>,
    pub podium: Vec<PodiumEntry>,
}

#[get("/categories/<category_id>/results")]
async fn category_results(
    category_id: CategoryId,
    config: &State<Config>,
    categories: Coll<Category>,
    nominations: Coll<Nomination>,
) -> Result<Json<CategoryResults>> {
    categories
        .find_one(id_filter(category_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Category {category_id}")))?;

    let rows: Vec<Nomination> = nominations
        .find(doc! { "category_id": category_id }, None)
        .await?
        .try_collect()
        .await?;

    // A category nobody has voted in yet has an empty ranking.
    let ranking = tally(&rows).remove(&category_id).unwrap_or_default();
    let podium = top_n(&ranking, config.podium_size());

    Ok(Json(CategoryResults {
        category_id,
        ranking,
        podium,
    }))
}

/// Rankings for every category with at least one vote.
#[get("/results")]
async fn all_results(
    config: &State<Config>,
    nominations: Coll<Nomination>,
) -> Result<Json<Vec<CategoryResults>>> {
    let rows: Vec<Nomination> = nominations.find(None, None).await?.try_collect().await?;

    let mut results: Vec<CategoryResults> = tally(&rows)
        .into_iter()
        .map(|(category_id, ranking)| {
            let podium = top_n(&ranking, config.podium_size());
            CategoryResults {
                category_id,
                ranking,
                podium,
            }
        })
        .collect();
    results.sort_unstable_by_key(|results| results.category_id);

    Ok(Json(results))
}
