use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use rocket::tokio::task;

use crate::types::ApiError;

pub mod config;
pub mod schema;

pub use self::config::Settings;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

error_chain! {
    foreign_links {
        Var(::std::env::VarError);
        ParseInt(::std::num::ParseIntError);
        R2D2(r2d2::Error);
        Json(::serde_json::Error);
    }

    errors {
        MissingVar(name: &'static str) {
            description("missing environment variable")
            display("environment variable {} is not set", name)
        }
    }
}

/// Builds the process-wide pool and checks that the store is reachable.
pub fn init_pool(settings: &Settings) -> Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(settings.database_url.as_str());
    let pool = r2d2::Pool::builder()
        .max_size(settings.pool_size)
        .connection_timeout(settings.connection_timeout)
        .build(manager)
        .chain_err(|| "could not connect to the database")?;
    Ok(pool)
}

/// Runs a blocking data-access call on a connection checked out for the
/// duration of the call only.
pub async fn run<F, T>(pool: &Pool, query: F) -> ::std::result::Result<T, ApiError>
where
    F: FnOnce(&mut PgConnection) -> ::std::result::Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    task::spawn_blocking(move || {
        let mut connection = pool.get()?;
        query(&mut *connection)
    })
    .await
    .map_err(|e| {
        log::error!("database task did not complete: {}", e);
        ApiError::Internal
    })?
}

pub trait TryLoadById
where
    Self: Sized,
{
    fn try_load_by_id(connection: &mut PgConnection, id: i32) -> ::std::result::Result<Self, ApiError>;
}
