use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, DateTime, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// One product placed in a user's cart. The catalog document is embedded
/// verbatim, including its `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub product: Document,
    pub user_email: String,
    pub quantity: i32,
    pub added_at: DateTime,
}

impl CartEntry {
    pub fn new(email: &str, product: Document) -> Self {
        Self {
            id: None,
            product,
            user_email: email.to_owned(),
            quantity: 1,
            added_at: DateTime::now(),
        }
    }

    /// `_id` of an embedded product document, `Bson::Null` when absent.
    pub fn product_id(product: &Document) -> Bson {
        product.get("_id").cloned().unwrap_or(Bson::Null)
    }
}

#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;
    async fn list_products(&self) -> anyhow::Result<Vec<Document>>;
    async fn find_cart_entry(
        &self,
        email: &str,
        product_id: &Bson,
    ) -> anyhow::Result<Option<CartEntry>>;
    async fn insert_cart_entry(&self, entry: CartEntry) -> anyhow::Result<ObjectId>;
    async fn list_cart_entries(&self, email: &str) -> anyhow::Result<Vec<CartEntry>>;
}

/// MongoDB-backed store. One client for the process lifetime; the driver
/// pools connections internally.
#[derive(Clone)]
pub struct Store {
    client: Client,
    products: Collection<Document>,
    carts: Collection<CartEntry>,
}

impl Store {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let mut options = ClientOptions::parse(config.mongo_uri())
            .await
            .context("parse mongodb connection string")?;
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(options).context("build mongodb client")?;
        let db = client.database(&config.db_name);
        Ok(Self {
            products: db.collection("productsData"),
            carts: db.collection("cartData"),
            client,
        })
    }
}

#[async_trait]
impl StoreClient for Store {
    async fn ping(&self) -> anyhow::Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .context("ping mongodb")?;
        Ok(())
    }

    async fn list_products(&self) -> anyhow::Result<Vec<Document>> {
        let cursor = self
            .products
            .find(None, None)
            .await
            .context("find products")?;
        let products: Vec<Document> = cursor.try_collect().await.context("collect products")?;
        Ok(products)
    }

    async fn find_cart_entry(
        &self,
        email: &str,
        product_id: &Bson,
    ) -> anyhow::Result<Option<CartEntry>> {
        let entry = self
            .carts
            .find_one(
                doc! { "userEmail": email, "product._id": product_id.clone() },
                None,
            )
            .await
            .context("find cart entry")?;
        Ok(entry)
    }

    async fn insert_cart_entry(&self, entry: CartEntry) -> anyhow::Result<ObjectId> {
        let result = self
            .carts
            .insert_one(&entry, None)
            .await
            .context("insert cart entry")?;
        result
            .inserted_id
            .as_object_id()
            .context("inserted id is not an object id")
    }

    async fn list_cart_entries(&self, email: &str) -> anyhow::Result<Vec<CartEntry>> {
        let cursor = self
            .carts
            .find(doc! { "userEmail": email }, None)
            .await
            .context("find cart entries")?;
        let entries: Vec<CartEntry> = cursor.try_collect().await.context("collect cart entries")?;
        Ok(entries)
    }
}

/// In-memory store backing `AppState::fake()` and the integration tests.
/// Same lookup semantics as the MongoDB store, vectors in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    products: Mutex<Vec<Document>>,
    carts: Mutex<Vec<CartEntry>>,
}

impl MemoryStore {
    pub fn with_products(products: Vec<Document>) -> Self {
        Self {
            products: Mutex::new(products),
            carts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn list_products(&self) -> anyhow::Result<Vec<Document>> {
        Ok(self.products.lock().expect("products lock").clone())
    }

    async fn find_cart_entry(
        &self,
        email: &str,
        product_id: &Bson,
    ) -> anyhow::Result<Option<CartEntry>> {
        let carts = self.carts.lock().expect("carts lock");
        Ok(carts
            .iter()
            .find(|e| e.user_email == email && CartEntry::product_id(&e.product) == *product_id)
            .cloned())
    }

    async fn insert_cart_entry(&self, entry: CartEntry) -> anyhow::Result<ObjectId> {
        let id = ObjectId::new();
        let mut carts = self.carts.lock().expect("carts lock");
        carts.push(CartEntry {
            id: Some(id),
            ..entry
        });
        Ok(id)
    }

    async fn list_cart_entries(&self, email: &str) -> anyhow::Result<Vec<CartEntry>> {
        let carts = self.carts.lock().expect("carts lock");
        Ok(carts
            .iter()
            .filter(|e| e.user_email == email)
            .cloned()
            .collect())
    }
}
