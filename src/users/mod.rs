use rocket::serde::json::{Json, Value};
use rocket::State;

use crate::db::{self, Pool};
use crate::types::ApiResult;

pub mod models;

use self::models::User;

#[get("/users")]
pub async fn list(pool: &State<Pool>) -> ApiResult<Value> {
    let users = db::run(pool, User::load_all).await?;
    Ok(Json(json!({ "users": users })))
}

#[get("/users/<username>")]
pub async fn get(pool: &State<Pool>, username: String) -> ApiResult<Value> {
    let user = db::run(pool, move |conn| User::load_by_name(conn, &username)).await?;
    Ok(Json(json!({ "user": user })))
}
