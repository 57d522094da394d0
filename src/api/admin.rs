use std::collections::BTreeSet;

use mongodb::{bson::doc, Client};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{CategorySpec, CollaboratorSpec, VoterSpec},
    common::{CategoryId, CollaboratorId, VoterId},
    db::{Category, CategoryCollaborator, Collaborator, Nomination, Voter, VoterCore},
    mongodb::{
        id_filter, Coll, Counter, CATEGORY_IDS, COLLABORATOR_IDS, VOTER_IDS,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        get_categories,
        create_category,
        update_category,
        delete_category,
        get_collaborators,
        create_collaborator,
        update_collaborator,
        get_collaborator_categories,
        set_collaborator_categories,
        delete_collaborator,
        get_voters,
        create_voter,
        update_voter,
        delete_voter,
    ]
}

#[get("/categories")]
async fn get_categories(categories: Coll<Category>) -> Result<Json<Vec<Category>>> {
    let mut all: Vec<Category> = categories.find(None, None).await?.try_collect().await?;
    all.sort_unstable_by_key(|category| category.id);
    Ok(Json(all))
}

#[post("/categories", data = "<spec>", format = "json")]
async fn create_category(
    spec: Json<CategorySpec>,
    categories: Coll<Category>,
    counters: Coll<Counter>,
) -> Result<Json<Category>> {
    if spec.name.trim().is_empty() {
        return Err(Error::bad_request(
            "Category name must not be empty".to_string(),
        ));
    }

    let id = Counter::next(&counters, CATEGORY_IDS).await?;
    let category = Category {
        id,
        category: spec.0.into(),
    };
    categories.insert_one(&category, None).await?;
    Ok(Json(category))
}

#[put("/categories/<category_id>", data = "<spec>", format = "json")]
async fn update_category(
    category_id: CategoryId,
    spec: Json<CategorySpec>,
    categories: Coll<Category>,
) -> Result<Json<Category>> {
    if spec.name.trim().is_empty() {
        return Err(Error::bad_request(
            "Category name must not be empty".to_string(),
        ));
    }

    let category = Category {
        id: category_id,
        category: spec.0.into(),
    };
    let result = categories
        .replace_one(id_filter(category_id), &category, None)
        .await?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Category {category_id}")));
    }
    Ok(Json(category))
}

/// Delete a category. Its nominations and eligibility links go with it,
/// atomically.
#[delete("/categories/<category_id>")]
async fn delete_category(
    category_id: CategoryId,
    categories: Coll<Category>,
    links: Coll<CategoryCollaborator>,
    nominations: Coll<Nomination>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let result = categories
        .delete_one_with_session(id_filter(category_id), None, &mut session)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Category {category_id}")));
    }

    let filter = doc! { "category_id": category_id };
    nominations
        .delete_many_with_session(filter.clone(), None, &mut session)
        .await?;
    links
        .delete_many_with_session(filter, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(())
}

#[get("/collaborators")]
async fn get_collaborators(collaborators: Coll<Collaborator>) -> Result<Json<Vec<Collaborator>>> {
    let mut all: Vec<Collaborator> = collaborators.find(None, None).await?.try_collect().await?;
    all.sort_unstable_by_key(|collaborator| collaborator.id);
    Ok(Json(all))
}

#[post("/collaborators", data = "<spec>", format = "json")]
async fn create_collaborator(
    spec: Json<CollaboratorSpec>,
    collaborators: Coll<Collaborator>,
    counters: Coll<Counter>,
) -> Result<Json<Collaborator>> {
    validate_collaborator(&spec)?;

    let id = Counter::next(&counters, COLLABORATOR_IDS).await?;
    let collaborator = Collaborator {
        id,
        collaborator: spec.0.into(),
    };
    collaborators.insert_one(&collaborator, None).await?;
    Ok(Json(collaborator))
}

#[put("/collaborators/<collaborator_id>", data = "<spec>", format = "json")]
async fn update_collaborator(
    collaborator_id: CollaboratorId,
    spec: Json<CollaboratorSpec>,
    collaborators: Coll<Collaborator>,
) -> Result<Json<Collaborator>> {
    validate_collaborator(&spec)?;

    let collaborator = Collaborator {
        id: collaborator_id,
        collaborator: spec.0.into(),
    };
    let result = collaborators
        .replace_one(id_filter(collaborator_id), &collaborator, None)
        .await?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Collaborator {collaborator_id}")));
    }
    Ok(Json(collaborator))
}

#[get("/collaborators/<collaborator_id>/categories")]
async fn get_collaborator_categories(
    collaborator_id: CollaboratorId,
    collaborators: Coll<Collaborator>,
    links: Coll<CategoryCollaborator>,
) -> Result<Json<Vec<CategoryId>>> {
    collaborators
        .find_one(id_filter(collaborator_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Collaborator {collaborator_id}")))?;

    let own_links: Vec<CategoryCollaborator> = links
        .find(doc! { "collaborator_id": collaborator_id }, None)
        .await?
        .try_collect()
        .await?;
    let mut category_ids: Vec<CategoryId> =
        own_links.into_iter().map(|link| link.category_id).collect();
    category_ids.sort_unstable();
    Ok(Json(category_ids))
}

/// Replace the collaborator's eligibility links. An empty list removes all
/// links, i.e. makes the collaborator eligible everywhere again.
#[put("/collaborators/<collaborator_id>/categories", data = "<category_ids>", format = "json")]
async fn set_collaborator_categories(
    collaborator_id: CollaboratorId,
    category_ids: Json<Vec<CategoryId>>,
    collaborators: Coll<Collaborator>,
    categories: Coll<Category>,
    links: Coll<CategoryCollaborator>,
    db_client: &State<Client>,
) -> Result<()> {
    collaborators
        .find_one(id_filter(collaborator_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Collaborator {collaborator_id}")))?;

    // Deduplicate so the unique link index cannot reject the insert.
    let category_ids: BTreeSet<CategoryId> = category_ids.0.into_iter().collect();

    // Every referenced category must exist.
    let ids: Vec<CategoryId> = category_ids.iter().copied().collect();
    let expected = ids.len();
    let known = categories
        .count_documents(doc! { "_id": { "$in": ids } }, None)
        .await?;
    if known as usize != expected {
        return Err(Error::not_found(
            "One or more of the given categories".to_string(),
        ));
    }

    let new_links: Vec<CategoryCollaborator> = category_ids
        .into_iter()
        .map(|category_id| CategoryCollaborator {
            category_id,
            collaborator_id,
        })
        .collect();

    // Swap the link set atomically.
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;
    links
        .delete_many_with_session(
            doc! { "collaborator_id": collaborator_id },
            None,
            &mut session,
        )
        .await?;
    if !new_links.is_empty() {
        links
            .insert_many_with_session(&new_links, None, &mut session)
            .await?;
    }
    session.commit_transaction().await?;

    Ok(())
}

/// Delete a collaborator, along with any nominations naming them and their
/// eligibility links.
#[delete("/collaborators/<collaborator_id>")]
async fn delete_collaborator(
    collaborator_id: CollaboratorId,
    collaborators: Coll<Collaborator>,
    links: Coll<CategoryCollaborator>,
    nominations: Coll<Nomination>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let result = collaborators
        .delete_one_with_session(id_filter(collaborator_id), None, &mut session)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Collaborator {collaborator_id}")));
    }

    let filter = doc! { "collaborator_id": collaborator_id };
    nominations
        .delete_many_with_session(filter.clone(), None, &mut session)
        .await?;
    links
        .delete_many_with_session(filter, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(())
}

#[get("/voters")]
async fn get_voters(voters: Coll<Voter>) -> Result<Json<Vec<Voter>>> {
    let mut all: Vec<Voter> = voters.find(None, None).await?.try_collect().await?;
    all.sort_unstable_by_key(|voter| voter.id);
    Ok(Json(all))
}

#[post("/voters", data = "<spec>", format = "json")]
async fn create_voter(
    spec: Json<VoterSpec>,
    voters: Coll<Voter>,
    counters: Coll<Counter>,
) -> Result<Json<Voter>> {
    if spec.employee_code.trim().is_empty() {
        return Err(Error::bad_request(
            "Employee code must not be empty".to_string(),
        ));
    }

    let core: VoterCore = spec.0.into();

    // Check code uniqueness up front for a friendly error; the unique index
    // still backstops races.
    let existing = voters
        .find_one(doc! { "employee_code": &core.employee_code }, None)
        .await?;
    if existing.is_some() {
        return Err(Error::bad_request(format!(
            "Employee code already in use: {}",
            core.employee_code
        )));
    }

    let id = Counter::next(&counters, VOTER_IDS).await?;
    let voter = Voter { id, voter: core };
    voters.insert_one(&voter, None).await?;
    Ok(Json(voter))
}

#[put("/voters/<voter_id>", data = "<spec>", format = "json")]
async fn update_voter(
    voter_id: VoterId,
    spec: Json<VoterSpec>,
    voters: Coll<Voter>,
) -> Result<Json<Voter>> {
    if spec.employee_code.trim().is_empty() {
        return Err(Error::bad_request(
            "Employee code must not be empty".to_string(),
        ));
    }

    let core: VoterCore = spec.0.into();

    // The new code must not belong to anyone else.
    let clash = voters
        .find_one(
            doc! {
                "employee_code": &core.employee_code,
                "_id": { "$ne": voter_id },
            },
            None,
        )
        .await?;
    if clash.is_some() {
        return Err(Error::bad_request(format!(
            "Employee code already in use: {}",
            core.employee_code
        )));
    }

    let voter = Voter {
        id: voter_id,
        voter: core,
    };
    let result = voters
        .replace_one(id_filter(voter_id), &voter, None)
        .await?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Voter {voter_id}")));
    }
    Ok(Json(voter))
}

/// Delete a voter along with their nominations.
#[delete("/voters/<voter_id>")]
async fn delete_voter(
    voter_id: VoterId,
    voters: Coll<Voter>,
    nominations: Coll<Nomination>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let result = voters
        .delete_one_with_session(id_filter(voter_id), None, &mut session)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Voter {voter_id}")));
    }

    nominations
        .delete_many_with_session(doc! { "voter_id": voter_id }, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(())
}

fn validate_collaborator(spec: &CollaboratorSpec) -> Result<()> {
    if spec.full_name.trim().is_empty() {
        return Err(Error::bad_request(
            "Collaborator name must not be empty".to_string(),
        ));
    }
    if spec.avatar_url.trim().is_empty() {
        return Err(Error::bad_request(
            "Collaborator avatar URL must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use backend_test::backend_test;
    use rocket::{http::Status, local::asynchronous::Client, serde::json::json};

    use crate::model::api::{CategorySpec, CollaboratorSpec, VoterSpec};
    use crate::model::db::{Category, CategoryCollaborator, Collaborator, Nomination, Voter};
    use crate::model::mongodb::Coll;

    #[backend_test]
    async fn categories_get_sequential_ids(client: Client) {
        for expected_id in 1..=2 {
            let response = client
                .post("/categories")
                .json(&CategorySpec::example1())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
            let category = response.into_json::<Category>().await.unwrap();
            assert_eq!(category.id, expected_id);
        }
    }

    #[backend_test]
    async fn blank_category_name_is_rejected(client: Client, categories: Coll<Category>) {
        let response = client
            .post("/categories")
            .json(&json!({ "name": "   " }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(categories.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test]
    async fn duplicate_employee_code_is_rejected(client: Client, voters: Coll<Voter>) {
        let response = client
            .post("/voters")
            .json(&VoterSpec::example())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        // Same code in a different case is still a duplicate.
        let response = client
            .post("/voters")
            .json(&json!({ "employee_code": "EMP042", "full_name": "Someone Else" }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(voters.count_documents(None, None).await.unwrap(), 1);
    }

    #[backend_test]
    async fn deleting_a_category_cascades(
        client: Client,
        nominations: Coll<Nomination>,
        links: Coll<CategoryCollaborator>,
    ) {
        let category = client
            .post("/categories")
            .json(&CategorySpec::example1())
            .dispatch()
            .await
            .into_json::<Category>()
            .await
            .unwrap();
        let collaborator = client
            .post("/collaborators")
            .json(&CollaboratorSpec::example("Ada"))
            .dispatch()
            .await
            .into_json::<Collaborator>()
            .await
            .unwrap();
        let voter = client
            .post("/voters")
            .json(&VoterSpec::example())
            .dispatch()
            .await
            .into_json::<Voter>()
            .await
            .unwrap();

        client
            .put(format!("/collaborators/{}/categories", collaborator.id))
            .json(&json!([category.id]))
            .dispatch()
            .await;
        client
            .put(format!("/voters/{}/nominations/{}", voter.id, category.id))
            .json(&json!({ "collaborator_id": collaborator.id }))
            .dispatch()
            .await;
        assert_eq!(nominations.count_documents(None, None).await.unwrap(), 1);
        assert_eq!(links.count_documents(None, None).await.unwrap(), 1);

        let response = client
            .delete(format!("/categories/{}", category.id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        assert_eq!(nominations.count_documents(None, None).await.unwrap(), 0);
        assert_eq!(links.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test]
    async fn deleting_a_collaborator_cascades(client: Client, nominations: Coll<Nomination>) {
        let category = client
            .post("/categories")
            .json(&CategorySpec::example1())
            .dispatch()
            .await
            .into_json::<Category>()
            .await
            .unwrap();
        let collaborator = client
            .post("/collaborators")
            .json(&CollaboratorSpec::example("Ada"))
            .dispatch()
            .await
            .into_json::<Collaborator>()
            .await
            .unwrap();
        let voter = client
            .post("/voters")
            .json(&VoterSpec::example())
            .dispatch()
            .await
            .into_json::<Voter>()
            .await
            .unwrap();

        client
            .put(format!("/voters/{}/nominations/{}", voter.id, category.id))
            .json(&json!({ "collaborator_id": collaborator.id }))
            .dispatch()
            .await;

        let response = client
            .delete(format!("/collaborators/{}", collaborator.id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(nominations.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test]
    async fn linking_to_an_unknown_category_is_not_found(client: Client) {
        let collaborator = client
            .post("/collaborators")
            .json(&CollaboratorSpec::example("Ada"))
            .dispatch()
            .await
            .into_json::<Collaborator>()
            .await
            .unwrap();

        let response = client
            .put(format!("/collaborators/{}/categories", collaborator.id))
            .json(&json!([42]))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[backend_test]
    async fn replacing_links_swaps_the_set(client: Client, links: Coll<CategoryCollaborator>) {
        let first = client
            .post("/categories")
            .json(&CategorySpec::example1())
            .dispatch()
            .await
            .into_json::<Category>()
            .await
            .unwrap();
        let second = client
            .post("/categories")
            .json(&CategorySpec::example1())
            .dispatch()
            .await
            .into_json::<Category>()
            .await
            .unwrap();
        let collaborator = client
            .post("/collaborators")
            .json(&CollaboratorSpec::example("Ada"))
            .dispatch()
            .await
            .into_json::<Collaborator>()
            .await
            .unwrap();

        client
            .put(format!("/collaborators/{}/categories", collaborator.id))
            .json(&json!([first.id]))
            .dispatch()
            .await;
        client
            .put(format!("/collaborators/{}/categories", collaborator.id))
            .json(&json!([second.id]))
            .dispatch()
            .await;

        let remaining: Vec<CategoryCollaborator> = {
            use rocket::futures::TryStreamExt;
            links.find(None, None).await.unwrap().try_collect().await.unwrap()
        };
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].category_id, second.id);
    }
}
