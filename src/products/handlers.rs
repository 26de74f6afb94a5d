use axum::{extract::State, routing::get, Json, Router};
use mongodb::bson::Document;
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/products", get(list_products))
}

/// GET /products: every catalog document, storage order, passed through
/// verbatim.
#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let products = state
        .store
        .list_products()
        .await
        .map_err(|e| ApiError::internal("Error fetching products", e))?;

    if products.is_empty() {
        return Err(ApiError::NotFound("No products found".into()));
    }
    Ok(Json(products))
}
