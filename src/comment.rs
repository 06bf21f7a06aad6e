use chrono::NaiveDateTime;
use diesel::delete as diesel_delete;
use diesel::insert_into;
use diesel::prelude::*;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{Error as JsonError, Json};
use rocket::State;

use crate::article::Article;
use crate::db::schema::comments;
use crate::db::{self, Pool, TryLoadById};
use crate::types::{parse_id, reject_payload, ApiError, ApiResult};
use crate::utils::serialize_date;

#[derive(Debug, Queryable, Selectable, Serialize, PartialEq)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
}

/// Missing fields are inserted as `DEFAULT`, leaving the not-null
/// constraints on `comments` to reject them.
#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub article_id: i32,
    pub author: Option<String>,
    pub body: Option<String>,
}

/// Request body of `POST /api/articles/<article_id>/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    username: Option<String>,
    body: Option<String>,
}

impl Comment {
    pub fn load_for_article(
        connection: &mut PgConnection,
        article_id: i32,
    ) -> Result<Vec<Comment>, ApiError> {
        Article::try_load_by_id(connection, article_id)?;
        comments::table
            .filter(comments::article_id.eq(article_id))
            .order((comments::created_at.desc(), comments::comment_id.desc()))
            .select(Comment::as_select())
            .load(connection)
            .map_err(|e| e.into())
    }

    /// The parent article is checked first: a foreign-key violation on
    /// insert cannot tell an unknown article from an unknown author.
    pub fn insert(connection: &mut PgConnection, new_comment: NewComment) -> Result<Comment, ApiError> {
        Article::try_load_by_id(connection, new_comment.article_id)?;
        insert_into(comments::table)
            .values(&new_comment)
            .returning(Comment::as_returning())
            .get_result(connection)
            .map_err(|e| e.into())
    }

    pub fn delete(connection: &mut PgConnection, comment_id: i32) -> Result<(), ApiError> {
        let deleted = diesel_delete(comments::table.find(comment_id)).execute(connection)?;
        if deleted == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CommentContainer<T> {
    comment: T,
}

#[derive(Debug, Serialize)]
pub struct CommentsContainer<T> {
    comments: T,
}

#[get("/articles/<article_id>/comments")]
pub async fn list(
    pool: &State<Pool>,
    article_id: Result<i32, &str>,
) -> ApiResult<CommentsContainer<Vec<Comment>>> {
    let article_id = parse_id(article_id)?;
    let comments = db::run(pool, move |conn| {
        Comment::load_for_article(conn, article_id)
    })
    .await?;
    Ok(Json(CommentsContainer { comments }))
}

#[post("/articles/<article_id>/comments", data = "<details>")]
pub async fn add(
    pool: &State<Pool>,
    article_id: Result<i32, &str>,
    details: Result<Json<CommentPayload>, JsonError<'_>>,
) -> Result<status::Custom<Json<CommentContainer<Comment>>>, ApiError> {
    let article_id = parse_id(article_id)?;
    let details = details.map_err(reject_payload)?.into_inner();
    let new_comment = NewComment {
        article_id,
        author: details.username,
        body: details.body,
    };
    let comment = db::run(pool, move |conn| Comment::insert(conn, new_comment)).await?;
    Ok(status::Custom(
        Status::Created,
        Json(CommentContainer { comment }),
    ))
}

#[delete("/comments/<comment_id>")]
pub async fn delete(pool: &State<Pool>, comment_id: Result<i32, &str>) -> Result<Status, ApiError> {
    let comment_id = parse_id(comment_id)?;
    db::run(pool, move |conn| Comment::delete(conn, comment_id)).await?;
    Ok(Status::NoContent)
}
