use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{error::ApiError, state::AppState, store::CartEntry};

use super::dto::{
    AddToCartRequest, CartAddedResponse, CartEntryResponse, InsertOutcome, MessageResponse,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", post(add_to_cart))
        .route("/cart/:email", get(get_cart))
}

/// POST /cart: idempotent add. Re-adding the same (email, product `_id`)
/// pair is a no-op answered with 200, not a second insert. The
/// check-then-insert pair is not atomic across concurrent writers.
#[instrument(skip(state, payload))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Response, ApiError> {
    let email = match payload.email.as_deref() {
        Some(e) if !e.is_empty() => e.to_owned(),
        _ => {
            warn!("cart add without email");
            return Err(ApiError::BadRequest(
                "Email and product data are required".into(),
            ));
        }
    };
    let Some(product) = payload.product else {
        warn!(email = %email, "cart add without product");
        return Err(ApiError::BadRequest(
            "Email and product data are required".into(),
        ));
    };

    let product_id = CartEntry::product_id(&product);
    let existing = state
        .store
        .find_cart_entry(&email, &product_id)
        .await
        .map_err(|e| ApiError::internal("Error adding product to cart", e))?;

    if existing.is_some() {
        info!(email = %email, product_id = %product_id, "product already in cart");
        return Ok((
            StatusCode::OK,
            Json(MessageResponse {
                message: "You already added this product to the cart".into(),
            }),
        )
            .into_response());
    }

    let inserted_id = state
        .store
        .insert_cart_entry(CartEntry::new(&email, product))
        .await
        .map_err(|e| ApiError::internal("Error adding product to cart", e))?;

    info!(email = %email, product_id = %product_id, inserted_id = %inserted_id, "product added to cart");
    Ok((
        StatusCode::CREATED,
        Json(CartAddedResponse {
            message: "Product added to cart".into(),
            result: InsertOutcome {
                acknowledged: true,
                inserted_id: inserted_id.to_hex(),
            },
        }),
    )
        .into_response())
}

/// GET /cart/:email: every entry for that user, storage order.
#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<CartEntryResponse>>, ApiError> {
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email parameter is required".into()));
    }

    let entries = state
        .store
        .list_cart_entries(&email)
        .await
        .map_err(|e| ApiError::internal("Error fetching cart data", e))?;

    if entries.is_empty() {
        return Err(ApiError::NotFound(
            "No items found in cart for this user".into(),
        ));
    }

    Ok(Json(
        entries.into_iter().map(CartEntryResponse::from).collect(),
    ))
}
