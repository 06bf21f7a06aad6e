extern crate news_api;

use news_api::db::{self, Settings};
use news_api::endpoints::Endpoints;

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    let pool = db::init_pool(&settings)?;
    let endpoints = Endpoints::load()?;
    if let Err(e) = news_api::build(pool, endpoints).launch().await {
        log::error!("server stopped: {}", e);
        return Err(e.into());
    }
    Ok(())
}
