use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Nullable, Text, Timestamp};
use rocket::serde::json::{Error as JsonError, Json};
use rocket::State;
use std::str::FromStr;

use crate::db::schema::articles;
use crate::db::{self, Pool, TryLoadById};
use crate::types::{parse_id, reject_payload, ApiError, ApiResult};
use crate::utils::serialize_date;

static SELECT_ARTICLE: &str = "select articles.article_id, articles.title, articles.topic,
       articles.author, articles.body, articles.created_at, articles.votes,
       articles.article_img_url,
       count(comments.comment_id) as comment_count
  from articles
  left join comments on comments.article_id = articles.article_id
 where articles.article_id = $1
 group by articles.article_id";

static SELECT_ARTICLE_SUMMARIES: &str = "select articles.article_id, articles.title, articles.topic,
       articles.author, articles.created_at, articles.votes, articles.article_img_url,
       count(comments.comment_id) as comment_count
  from articles
  left join comments on comments.article_id = articles.article_id
 where ($1::text is null or articles.topic = $1)
 group by articles.article_id";

/// An article row as stored, returned after a vote change.
#[derive(Debug, Queryable, Selectable, Serialize, PartialEq)]
#[diesel(table_name = articles)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    pub votes: i32,
    pub article_img_url: Option<String>,
}

impl TryLoadById for Article {
    fn try_load_by_id(connection: &mut PgConnection, id: i32) -> Result<Article, ApiError> {
        articles::table
            .find(id)
            .select(Article::as_select())
            .first(connection)
            .map_err(|e| e.into())
    }
}

impl Article {
    /// Applies `inc_votes` to the stored count, flooring the result at zero.
    ///
    /// The read and the write are separate statements, so concurrent changes
    /// to the same article can lose an increment.
    pub fn update_votes(
        connection: &mut PgConnection,
        id: i32,
        inc_votes: i32,
    ) -> Result<Article, ApiError> {
        let current = Article::try_load_by_id(connection, id)?;
        let votes = clamp_votes(current.votes, inc_votes);
        diesel::update(articles::table.find(id))
            .set(articles::votes.eq(votes))
            .returning(Article::as_returning())
            .get_result(connection)
            .map_err(|e| e.into())
    }
}

pub fn clamp_votes(current: i32, inc_votes: i32) -> i32 {
    current.saturating_add(inc_votes).max(0)
}

/// A single article with its body and comment count.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleDetail {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Text)]
    pub body: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Nullable<Text>)]
    pub article_img_url: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub comment_count: i64,
}

impl TryLoadById for ArticleDetail {
    fn try_load_by_id(connection: &mut PgConnection, id: i32) -> Result<ArticleDetail, ApiError> {
        sql_query(SELECT_ARTICLE)
            .bind::<Integer, _>(id)
            .get_result::<ArticleDetail>(connection)
            .map_err(|e| e.into())
    }
}

/// A list entry: everything but the body.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleSummary {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Nullable<Text>)]
    pub article_img_url: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub comment_count: i64,
}

impl ArticleSummary {
    pub fn load_all(
        connection: &mut PgConnection,
        topic: Option<String>,
        sort_by: SortBy,
        order: Order,
    ) -> Result<Vec<ArticleSummary>, ApiError> {
        let query = format!(
            "{} order by {} {}, articles.article_id {}",
            SELECT_ARTICLE_SUMMARIES,
            sort_by.column(),
            order.keyword(),
            order.keyword()
        );
        sql_query(query)
            .bind::<Nullable<Text>, _>(topic)
            .load::<ArticleSummary>(connection)
            .map_err(|e| e.into())
    }
}

/// Columns `GET /api/articles` may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    ArticleId,
    Title,
    Topic,
    Author,
    #[default]
    CreatedAt,
    Votes,
    ArticleImgUrl,
    CommentCount,
}

impl SortBy {
    fn column(self) -> &'static str {
        match self {
            SortBy::ArticleId => "articles.article_id",
            SortBy::Title => "articles.title",
            SortBy::Topic => "articles.topic",
            SortBy::Author => "articles.author",
            SortBy::CreatedAt => "articles.created_at",
            SortBy::Votes => "articles.votes",
            SortBy::ArticleImgUrl => "articles.article_img_url",
            SortBy::CommentCount => "comment_count",
        }
    }
}

impl FromStr for SortBy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<SortBy, ApiError> {
        match s {
            "article_id" => Ok(SortBy::ArticleId),
            "title" => Ok(SortBy::Title),
            "topic" => Ok(SortBy::Topic),
            "author" => Ok(SortBy::Author),
            "created_at" => Ok(SortBy::CreatedAt),
            "votes" => Ok(SortBy::Votes),
            "article_img_url" => Ok(SortBy::ArticleImgUrl),
            "comment_count" => Ok(SortBy::CommentCount),
            _ => Err(ApiError::BadRequest),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

impl FromStr for Order {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Order, ApiError> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            _ => Err(ApiError::BadRequest),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleContainer<T> {
    article: T,
}

#[derive(Debug, Serialize)]
pub struct ArticlesContainer<T> {
    articles: T,
}

#[derive(Debug, Deserialize)]
pub struct VoteChange {
    inc_votes: i32,
}

#[get("/articles?<topic>&<sort_by>&<order>")]
pub async fn list(
    pool: &State<Pool>,
    topic: Option<String>,
    sort_by: Option<&str>,
    order: Option<&str>,
) -> ApiResult<ArticlesContainer<Vec<ArticleSummary>>> {
    let sort_by = sort_by.map(SortBy::from_str).transpose()?.unwrap_or_default();
    let order = order.map(Order::from_str).transpose()?.unwrap_or_default();
    let articles = db::run(pool, move |conn| {
        ArticleSummary::load_all(conn, topic, sort_by, order)
    })
    .await?;
    Ok(Json(ArticlesContainer { articles }))
}

#[get("/articles/<article_id>")]
pub async fn get(
    pool: &State<Pool>,
    article_id: Result<i32, &str>,
) -> ApiResult<ArticleContainer<ArticleDetail>> {
    let article_id = parse_id(article_id)?;
    let article = db::run(pool, move |conn| {
        ArticleDetail::try_load_by_id(conn, article_id)
    })
    .await?;
    Ok(Json(ArticleContainer { article }))
}

#[patch("/articles/<article_id>", data = "<change>")]
pub async fn update_votes(
    pool: &State<Pool>,
    article_id: Result<i32, &str>,
    change: Result<Json<VoteChange>, JsonError<'_>>,
) -> ApiResult<ArticleContainer<Article>> {
    let article_id = parse_id(article_id)?;
    let change = change.map_err(reject_payload)?.into_inner();
    let article = db::run(pool, move |conn| {
        Article::update_votes(conn, article_id, change.inc_votes)
    })
    .await?;
    Ok(Json(ArticleContainer { article }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn votes_never_drop_below_zero() {
        assert_eq!(clamp_votes(100, -120), 0);
        assert_eq!(clamp_votes(0, -1), 0);
        assert_eq!(clamp_votes(100, 1), 101);
        assert_eq!(clamp_votes(100, -100), 0);
        assert_eq!(clamp_votes(i32::MAX, 1), i32::MAX);
    }

    #[test]
    fn opposite_changes_cancel_unless_clamped() {
        assert_eq!(clamp_votes(clamp_votes(100, 10), -10), 100);
        assert_eq!(clamp_votes(clamp_votes(5, -10), 10), 10);
        assert_eq!(clamp_votes(clamp_votes(0, -3), 3), 3);
        assert_eq!(clamp_votes(clamp_votes(7, 20), -20), 7);
    }

    #[test]
    fn default_listing_is_newest_first() {
        assert_eq!(SortBy::default(), SortBy::CreatedAt);
        assert_eq!(Order::default(), Order::Desc);
    }

    #[test]
    fn sort_parameters_parse_from_query_values() {
        assert_eq!("votes".parse::<SortBy>().unwrap(), SortBy::Votes);
        assert_eq!("comment_count".parse::<SortBy>().unwrap().column(), "comment_count");
        assert_eq!("ASC".parse::<Order>().unwrap(), Order::Asc);
        assert!(matches!("body".parse::<SortBy>(), Err(ApiError::BadRequest)));
        assert!(matches!("sideways".parse::<Order>(), Err(ApiError::BadRequest)));
        assert!(matches!("votes; drop table articles".parse::<SortBy>(), Err(ApiError::BadRequest)));
    }
}
