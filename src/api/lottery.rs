use rocket::{futures::TryStreamExt, serde::json::Json, tokio::sync::Mutex, Route, State};

use crate::error::Result;
use crate::model::{
    common::CollaboratorId,
    db::Collaborator,
    draw::DrawEngine,
    mongodb::Coll,
};

/// The lottery screen's drawn-set, shared across requests. One presentation
/// screen drives this; the mutex is just to make the state `Sync`.
#[derive(Default)]
pub struct LotteryState(Mutex<DrawEngine>);

pub fn routes() -> Vec<Route> {
    routes![draw, reset]
}

/// Reveal the next collaborator of the current lap.
#[post("/lottery/draw")]
async fn draw(
    state: &State<LotteryState>,
    collaborators: Coll<Collaborator>,
) -> Result<Json<Collaborator>> {
    let roster: Vec<Collaborator> = collaborators.find(None, None).await?.try_collect().await?;
    let roster_ids: Vec<CollaboratorId> = roster.iter().map(|c| c.id).collect();

    let mut engine = state.0.lock().await;
    let chosen = {
        let mut rng = rand::thread_rng();
        engine.draw(&roster_ids, &mut rng)?
    };

    let collaborator = roster
        .into_iter()
        .find(|c| c.id == chosen)
        .unwrap(); // Valid because `draw` only returns ids from the roster.
    Ok(Json(collaborator))
}

/// Forget the current lap.
#[post("/lottery/reset")]
async fn reset(state: &State<LotteryState>) {
    state.0.lock().await.reset();
}
