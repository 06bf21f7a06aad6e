use diesel::prelude::*;

use crate::db::schema::users;
use crate::types::ApiError;

#[derive(Debug, Queryable, Selectable, Serialize, PartialEq)]
#[diesel(table_name = users)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn load_all(connection: &mut PgConnection) -> Result<Vec<User>, ApiError> {
        users::table
            .select(User::as_select())
            .order(users::username.asc())
            .load(connection)
            .map_err(|e| e.into())
    }

    pub fn load_by_name(connection: &mut PgConnection, name: &str) -> Result<User, ApiError> {
        users::table
            .find(name)
            .select(User::as_select())
            .first(connection)
            .map_err(|e| e.into())
    }
}
