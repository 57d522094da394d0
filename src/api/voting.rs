use std::collections::HashSet;

use mongodb::{bson::doc, options::ReplaceOptions};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::NominationSpec,
    common::{CategoryId, CollaboratorId, VoterId},
    db::{Category, CategoryCollaborator, Collaborator, Nomination, Voter},
    mongodb::{id_filter, Coll},
};

pub fn routes() -> Vec<Route> {
    routes![get_nominations, nominate, clear_nomination, get_candidates]
}

/// The voter's current picks, one per category at most.
#[get("/voters/<voter_id>/nominations")]
async fn get_nominations(
    voter_id: VoterId,
    voters: Coll<Voter>,
    nominations: Coll<Nomination>,
) -> Result<Json<Vec<Nomination>>> {
    // Unknown voters get a 404 rather than an empty list.
    voters
        .find_one(id_filter(voter_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter {voter_id}")))?;

    let picks = nominations
        .find(doc! { "voter_id": voter_id }, None)
        .await?
        .try_collect()
        .await?;
    Ok(Json(picks))
}

/// Record or replace the voter's pick for the given category.
///
/// This is an upsert keyed on `(voter_id, category_id)`: the unique index on
/// that pair plus the single `replace_one` statement means two racing votes
/// by the same voter in the same category collapse to one document. A failed
/// write leaves any previous pick intact.
#[put("/voters/<voter_id>/nominations/<category_id>", data = "<spec>", format = "json")]
async fn nominate(
    voter_id: VoterId,
    category_id: CategoryId,
    spec: Json<NominationSpec>,
    voters: Coll<Voter>,
    categories: Coll<Category>,
    collaborators: Coll<Collaborator>,
    links: Coll<CategoryCollaborator>,
    nominations: Coll<Nomination>,
) -> Result<Json<Nomination>> {
    let collaborator_id = spec.collaborator_id;

    // Check the whole triple resolves.
    voters
        .find_one(id_filter(voter_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter {voter_id}")))?;
    categories
        .find_one(id_filter(category_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Category {category_id}")))?;
    collaborators
        .find_one(id_filter(collaborator_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Collaborator {collaborator_id}")))?;

    if !eligible_collaborator(&links, category_id, collaborator_id).await? {
        return Err(Error::NotEligible {
            category_id,
            collaborator_id,
        });
    }

    let nomination = Nomination::new(voter_id, category_id, collaborator_id);
    let filter = doc! {
        "voter_id": voter_id,
        "category_id": category_id,
    };
    nominations
        .replace_one(
            filter,
            &nomination,
            ReplaceOptions::builder().upsert(true).build(),
        )
        .await?;

    Ok(Json(nomination))
}

/// Withdraw the voter's pick for the given category. Withdrawing a pick that
/// does not exist is a no-op, not an error.
#[delete("/voters/<voter_id>/nominations/<category_id>")]
async fn clear_nomination(
    voter_id: VoterId,
    category_id: CategoryId,
    nominations: Coll<Nomination>,
) -> Result<()> {
    let filter = doc! {
        "voter_id": voter_id,
        "category_id": category_id,
    };
    nominations.delete_one(filter, None).await?;
    Ok(())
}

/// The collaborators that may be nominated in the given category, under the
/// same two-mode rule as [`eligible_collaborator`].
#[get("/categories/<category_id>/candidates")]
async fn get_candidates(
    category_id: CategoryId,
    categories: Coll<Category>,
    collaborators: Coll<Collaborator>,
    links: Coll<CategoryCollaborator>,
) -> Result<Json<Vec<Collaborator>>> {
    categories
        .find_one(id_filter(category_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Category {category_id}")))?;

    let roster: Vec<Collaborator> = collaborators.find(None, None).await?.try_collect().await?;
    let all_links: Vec<CategoryCollaborator> = links.find(None, None).await?.try_collect().await?;

    let restricted: HashSet<CollaboratorId> =
        all_links.iter().map(|link| link.collaborator_id).collect();
    let linked_here: HashSet<CollaboratorId> = all_links
        .iter()
        .filter(|link| link.category_id == category_id)
        .map(|link| link.collaborator_id)
        .collect();

    let mut candidates: Vec<Collaborator> = roster
        .into_iter()
        .filter(|collaborator| {
            !restricted.contains(&collaborator.id) || linked_here.contains(&collaborator.id)
        })
        .collect();
    candidates.sort_unstable_by_key(|collaborator| collaborator.id);

    Ok(Json(candidates))
}

/// Two-mode membership: a collaborator with no eligibility links at all may
/// be nominated everywhere; one with links only in the linked categories.
async fn eligible_collaborator(
    links: &Coll<CategoryCollaborator>,
    category_id: CategoryId,
    collaborator_id: CollaboratorId,
) -> Result<bool> {
    let linked_here = links
        .find_one(
            doc! {
                "category_id": category_id,
                "collaborator_id": collaborator_id,
            },
            None,
        )
        .await?;
    if linked_here.is_some() {
        return Ok(true);
    }

    let any_link = links
        .find_one(doc! { "collaborator_id": collaborator_id }, None)
        .await?;
    Ok(any_link.is_none())
}

#[cfg(test)]
mod tests {
    use backend_test::backend_test;
    use mongodb::bson::doc;
    use rocket::{http::Status, local::asynchronous::Client, serde::json::json};

    use crate::model::db::{
        Category, CategoryCollaborator, CategoryCore, Collaborator, CollaboratorCore, Nomination,
        Voter, VoterCore,
    };
    use crate::model::mongodb::Coll;

    /// Insert a voter, two categories and two collaborators to vote for.
    async fn seed(
        voters: &Coll<Voter>,
        categories: &Coll<Category>,
        collaborators: &Coll<Collaborator>,
    ) {
        voters
            .insert_one(
                &Voter {
                    id: 1,
                    voter: VoterCore::example(),
                },
                None,
            )
            .await
            .unwrap();
        categories
            .insert_many(
                [
                    Category {
                        id: 1,
                        category: CategoryCore::example1(),
                    },
                    Category {
                        id: 2,
                        category: CategoryCore::example2(),
                    },
                ],
                None,
            )
            .await
            .unwrap();
        collaborators
            .insert_many(
                [
                    Collaborator {
                        id: 10,
                        collaborator: CollaboratorCore::example("Ada"),
                    },
                    Collaborator {
                        id: 11,
                        collaborator: CollaboratorCore::example("Brian"),
                    },
                ],
                None,
            )
            .await
            .unwrap();
    }

    #[backend_test]
    async fn nominate_then_change_leaves_one_row(
        client: Client,
        voters: Coll<Voter>,
        categories: Coll<Category>,
        collaborators: Coll<Collaborator>,
        nominations: Coll<Nomination>,
    ) {
        seed(&voters, &categories, &collaborators).await;

        let response = client
            .put("/voters/1/nominations/1")
            .json(&json!({ "collaborator_id": 10 }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .put("/voters/1/nominations/1")
            .json(&json!({ "collaborator_id": 11 }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        // Exactly one document for (voter 1, category 1), holding the
        // latest pick.
        let rows: Vec<Nomination> = {
            use rocket::futures::TryStreamExt;
            nominations
                .find(doc! { "voter_id": 1, "category_id": 1 }, None)
                .await
                .unwrap()
                .try_collect()
                .await
                .unwrap()
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].collaborator_id, 11);
    }

    #[backend_test]
    async fn votes_in_different_categories_are_independent(
        client: Client,
        voters: Coll<Voter>,
        categories: Coll<Category>,
        collaborators: Coll<Collaborator>,
        nominations: Coll<Nomination>,
    ) {
        seed(&voters, &categories, &collaborators).await;

        for category_id in [1, 2] {
            let response = client
                .put(format!("/voters/1/nominations/{category_id}"))
                .json(&json!({ "collaborator_id": 10 }))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
        }

        let count = nominations
            .count_documents(doc! { "voter_id": 1 }, None)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[backend_test]
    async fn withdrawal_is_idempotent(
        client: Client,
        voters: Coll<Voter>,
        categories: Coll<Category>,
        collaborators: Coll<Collaborator>,
        nominations: Coll<Nomination>,
    ) {
        seed(&voters, &categories, &collaborators).await;

        client
            .put("/voters/1/nominations/1")
            .json(&json!({ "collaborator_id": 10 }))
            .dispatch()
            .await;

        for _ in 0..2 {
            let response = client.delete("/voters/1/nominations/1").dispatch().await;
            assert_eq!(response.status(), Status::Ok);
        }

        let count = nominations.count_documents(None, None).await.unwrap();
        assert_eq!(count, 0);
    }

    #[backend_test]
    async fn restricted_collaborator_is_rejected_elsewhere(
        client: Client,
        voters: Coll<Voter>,
        categories: Coll<Category>,
        collaborators: Coll<Collaborator>,
        links: Coll<CategoryCollaborator>,
        nominations: Coll<Nomination>,
    ) {
        seed(&voters, &categories, &collaborators).await;
        // Ada (10) is restricted to category 2.
        links
            .insert_one(
                &CategoryCollaborator {
                    category_id: 2,
                    collaborator_id: 10,
                },
                None,
            )
            .await
            .unwrap();

        let response = client
            .put("/voters/1/nominations/1")
            .json(&json!({ "collaborator_id": 10 }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);
        assert_eq!(nominations.count_documents(None, None).await.unwrap(), 0);

        // But fine in the linked category.
        let response = client
            .put("/voters/1/nominations/2")
            .json(&json!({ "collaborator_id": 10 }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[backend_test]
    async fn candidates_follow_the_two_mode_rule(
        client: Client,
        voters: Coll<Voter>,
        categories: Coll<Category>,
        collaborators: Coll<Collaborator>,
        links: Coll<CategoryCollaborator>,
    ) {
        seed(&voters, &categories, &collaborators).await;
        // Brian (11) is restricted to category 1; Ada (10) is unrestricted.
        links
            .insert_one(
                &CategoryCollaborator {
                    category_id: 1,
                    collaborator_id: 11,
                },
                None,
            )
            .await
            .unwrap();

        let in_category_1 = client
            .get("/categories/1/candidates")
            .dispatch()
            .await
            .into_json::<Vec<Collaborator>>()
            .await
            .unwrap();
        let ids: Vec<u32> = in_category_1.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10, 11]);

        let in_category_2 = client
            .get("/categories/2/candidates")
            .dispatch()
            .await
            .into_json::<Vec<Collaborator>>()
            .await
            .unwrap();
        let ids: Vec<u32> = in_category_2.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10]);
    }

    #[backend_test]
    async fn nominating_for_unknown_voter_is_not_found(client: Client) {
        let response = client
            .put("/voters/99/nominations/1")
            .json(&json!({ "collaborator_id": 10 }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
