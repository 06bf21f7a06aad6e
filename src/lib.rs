#[macro_use]
extern crate rocket;

#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate diesel;

extern crate chrono;
extern crate dotenv;
extern crate r2d2;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

pub mod article;
pub mod comment;
pub mod db;
pub mod endpoints;
pub mod topic;
pub mod types;
pub mod users;
mod utils;

use rocket::fairing::AdHoc;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::status;
use rocket::serde::json::{Json, Value};
use rocket::{Build, Rocket};

use db::Pool;
use endpoints::Endpoints;
use types::{message_for, NOT_FOUND};

#[catch(404)]
fn not_found(_req: &Request) -> Json<Value> {
    Json(json!({ "msg": NOT_FOUND }))
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> status::Custom<Json<Value>> {
    let status = match status.code {
        400..=499 => status,
        _ => {
            log::error!("{} {} failed with {}", req.method(), req.uri(), status);
            Status::InternalServerError
        }
    };
    status::Custom(status, Json(json!({ "msg": message_for(status) })))
}

/// Assembles the application around an already-built pool.
pub fn build(pool: Pool, endpoints: Endpoints) -> Rocket<Build> {
    rocket::build()
        .manage(pool)
        .manage(endpoints)
        .mount("/api", routes![endpoints::describe, topic::list, users::list, users::get])
        .mount(
            "/api",
            routes![article::list, article::get, article::update_votes],
        )
        .mount("/api", routes![comment::list, comment::add, comment::delete])
        .register("/", catchers![not_found, default_catcher])
        .attach(AdHoc::on_liftoff("Database pool", |rocket| {
            Box::pin(async move {
                if let Some(pool) = rocket.state::<Pool>() {
                    let state = pool.state();
                    log::info!(
                        "database pool ready: {} connections, {} idle",
                        state.connections,
                        state.idle_connections
                    );
                }
            })
        }))
}
