use rocket::serde::json::Json;
use rocket::State;
use serde_json::Value;

use crate::db::Result;

pub static ENDPOINTS_JSON: &str = include_str!("../endpoints.json");

/// The endpoint descriptor served by `GET /api`, parsed once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints(pub Value);

impl Endpoints {
    pub fn load() -> Result<Endpoints> {
        Endpoints::parse(ENDPOINTS_JSON)
    }

    pub fn parse(document: &str) -> Result<Endpoints> {
        let value: Value = serde_json::from_str(document)?;
        if !value.is_object() {
            return Err("endpoint descriptor must be a JSON object".into());
        }
        Ok(Endpoints(value))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointsContainer<'a> {
    all_endpoints: &'a Value,
}

#[get("/")]
pub fn describe(endpoints: &State<Endpoints>) -> Json<EndpointsContainer<'_>> {
    Json(EndpointsContainer {
        all_endpoints: &endpoints.0,
    })
}
