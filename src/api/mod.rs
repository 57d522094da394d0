use rocket::Route;

mod admin;
mod login;
pub mod lottery;
mod results;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(login::routes());
    routes.extend(voting::routes());
    routes.extend(results::routes());
    routes.extend(lottery::routes());
    routes
}
