use crate::models::{ConfigureRequest, HostRequest, ItemStatusQuery};
use axum::{Json, Router, routing::get};
use schemars::schema_for;
use serde_json::{Value, json};

pub fn schema_routes() -> Router {
    Router::new().route("/api/schema", get(get_schema))
}

/// JSON schemas of the request documents the gateway accepts.
async fn get_schema() -> Json<Value> {
    Json(json!({
        "requests": {
            "POST /api/configure": schema_for!(ConfigureRequest),
            "POST /api/hosts": schema_for!(HostRequest),
            "POST /api/items/{id}/status": schema_for!(ItemStatusQuery),
        }
    }))
}
