use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::State;

use crate::db::schema::topics;
use crate::db::{self, Pool};
use crate::types::{ApiError, ApiResult};

#[derive(Debug, Queryable, Selectable, Serialize, PartialEq)]
#[diesel(table_name = topics)]
pub struct Topic {
    pub slug: String,
    pub description: Option<String>,
}

impl Topic {
    pub fn load_all(connection: &mut PgConnection) -> Result<Vec<Topic>, ApiError> {
        topics::table
            .select(Topic::as_select())
            .order(topics::slug.asc())
            .load(connection)
            .map_err(|e| e.into())
    }
}

#[derive(Debug, Serialize)]
pub struct TopicsContainer<T> {
    topics: T,
}

#[get("/topics")]
pub async fn list(pool: &State<Pool>) -> ApiResult<TopicsContainer<Vec<Topic>>> {
    let topics = db::run(pool, Topic::load_all).await?;
    Ok(Json(TopicsContainer { topics }))
}
