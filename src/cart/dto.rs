use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use crate::store::CartEntry;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub product: Option<Document>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Serialize)]
pub struct CartAddedResponse {
    pub message: String,
    pub result: InsertOutcome,
}

/// Wire shape of one stored cart entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntryResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub product: Document,
    pub user_email: String,
    pub quantity: i32,
    pub added_at: String,
}

impl From<CartEntry> for CartEntryResponse {
    fn from(entry: CartEntry) -> Self {
        Self {
            id: entry.id.map(|id| id.to_hex()).unwrap_or_default(),
            product: entry.product,
            user_email: entry.user_email,
            quantity: entry.quantity,
            added_at: entry.added_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}
