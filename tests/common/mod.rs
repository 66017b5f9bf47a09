#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use storefront_rs::config::CacheConfig;
use storefront_rs::models::{
    BrowseItem, Product, ProductId, RepositoryError, RepositoryResult, Row,
};
use storefront_rs::repositories::{BrowseRepository, CartRepository, ProductRepository};
use storefront_rs::services::{BrowseService, CartService};

/// Counts calls per repository operation
#[derive(Default)]
pub struct CallLog {
    counts: Mutex<HashMap<&'static str, usize>>,
    fetched_ids: Mutex<Vec<ProductId>>,
}

impl CallLog {
    fn record(&self, operation: &'static str) {
        *self.counts.lock().unwrap().entry(operation).or_insert(0) += 1;
    }

    fn record_fetch(&self, operation: &'static str, id: ProductId) {
        self.record(operation);
        self.fetched_ids.lock().unwrap().push(id);
    }

    pub fn count(&self, operation: &str) -> usize {
        self.counts
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Ids passed to single-item fetches, sorted
    pub fn fetched_ids(&self) -> Vec<ProductId> {
        let mut ids = self.fetched_ids.lock().unwrap().clone();
        ids.sort();
        ids
    }

    pub fn reset(&self) {
        self.counts.lock().unwrap().clear();
        self.fetched_ids.lock().unwrap().clear();
    }
}

/// Tracks how many single-item fetches overlap
#[derive(Default)]
pub struct Concurrency {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Concurrency {
    async fn track<T>(&self, delay: Duration, value: T) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        value
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub fn to_row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected a JSON object, got {other}"),
    }
}

pub fn item(id: ProductId, name: &str, category: &str, price: Decimal) -> BrowseItem {
    BrowseItem {
        id,
        name: name.to_string(),
        category: category.to_string(),
        price,
        description: format!("{} for testing", name),
    }
}

pub fn sample_catalog() -> Vec<BrowseItem> {
    vec![
        item(1, "Wool Beanie", "hats", dec!(18.00)),
        item(2, "Sun Hat", "hats", dec!(24.50)),
        item(5, "Trail Runner", "shoes", dec!(89.99)),
        item(7, "Rain Boot", "shoes", dec!(54.00)),
        item(9, "Leather Glove", "gloves", dec!(32.25)),
    ]
}

/// In-memory catalog serving both browse rows and products
pub struct InMemoryCatalog {
    items: Mutex<Vec<BrowseItem>>,
    featured: Vec<ProductId>,
    failing: AtomicBool,
    fetch_delay: Duration,
    pub calls: CallLog,
    pub concurrency: Concurrency,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<BrowseItem>) -> Self {
        let featured = items.iter().map(|item| item.id).collect();

        Self {
            items: Mutex::new(items),
            featured,
            failing: AtomicBool::new(false),
            fetch_delay: Duration::from_millis(5),
            calls: CallLog::default(),
            concurrency: Concurrency::default(),
        }
    }

    pub fn with_sample_catalog() -> Self {
        Self::new(sample_catalog())
    }

    /// Make every subsequent call fail with `ConnectionFailed`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Change the catalog behind the service's back
    pub fn insert(&self, item: BrowseItem) {
        self.items.lock().unwrap().push(item);
    }

    pub fn remove(&self, id: ProductId) {
        self.items.lock().unwrap().retain(|item| item.id != id);
    }

    fn check_available(&self) -> RepositoryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepositoryError::ConnectionFailed)
        } else {
            Ok(())
        }
    }

    fn find(&self, id: ProductId) -> Option<BrowseItem> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    fn rows<'a>(items: impl Iterator<Item = &'a BrowseItem>) -> RepositoryResult<Vec<Row>> {
        items
            .map(|item| serde_json::to_value(item).map(to_row))
            .collect::<Result<_, _>>()
            .map_err(RepositoryError::from)
    }
}

#[async_trait]
impl BrowseRepository for InMemoryCatalog {
    async fn get_browse_items(&self, category: Option<String>) -> RepositoryResult<Vec<Row>> {
        self.calls.record("get_browse_items");
        self.check_available()?;

        let items = self.items.lock().unwrap().clone();
        Self::rows(
            items
                .iter()
                .filter(|item| category.as_deref().map_or(true, |c| item.in_category(c))),
        )
    }

    async fn get_categories(&self) -> RepositoryResult<Vec<String>> {
        self.calls.record("get_categories");
        self.check_available()?;

        let mut categories: Vec<String> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .map(|item| item.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn get_featured_items(&self, limit: u32) -> RepositoryResult<Vec<Row>> {
        self.calls.record("get_featured_items");
        self.check_available()?;

        let items = self.items.lock().unwrap().clone();
        Self::rows(
            items
                .iter()
                .filter(|item| self.featured.contains(&item.id))
                .take(limit as usize),
        )
    }

    async fn search_items(&self, query: &str, limit: u32) -> RepositoryResult<Vec<Row>> {
        self.calls.record("search_items");
        self.check_available()?;

        let query = query.to_lowercase();
        let items = self.items.lock().unwrap().clone();
        Self::rows(
            items
                .iter()
                .filter(|item| item.name.to_lowercase().contains(&query))
                .take(limit as usize),
        )
    }

    async fn get_item(&self, id: ProductId) -> RepositoryResult<Option<Row>> {
        self.calls.record_fetch("get_item", id);
        self.check_available()?;

        let found = self.find(id);
        let found = self.concurrency.track(self.fetch_delay, found).await;

        found
            .map(|item| serde_json::to_value(item).map(to_row))
            .transpose()
            .map_err(RepositoryError::from)
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn get_product(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        self.calls.record_fetch("get_product", id);
        self.check_available()?;

        let found = self.find(id).map(|item| Product {
            id: item.id,
            name: item.name,
            price: item.price,
            description: Some(item.description),
            category: Some(item.category),
        });

        Ok(self.concurrency.track(self.fetch_delay, found).await)
    }
}

struct StoredCart {
    id: i64,
    username: String,
    contents: String,
    cost: Decimal,
}

/// In-memory cart rows with JSON-encoded contents
#[derive(Default)]
pub struct InMemoryCarts {
    rows: Mutex<Vec<StoredCart>>,
    next_id: AtomicUsize,
    failing: AtomicBool,
    pub calls: CallLog,
}

impl InMemoryCarts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row verbatim; `contents` is not checked
    pub fn insert_raw_row(&self, username: &str, contents: &str, cost: Decimal) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.rows.lock().unwrap().push(StoredCart {
            id,
            username: username.to_string(),
            contents: contents.to_string(),
            cost,
        });
        id
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> RepositoryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepositoryError::ConnectionFailed)
        } else {
            Ok(())
        }
    }

    fn update_contents(
        &self,
        username: &str,
        update: impl Fn(&mut Vec<Value>),
    ) -> RepositoryResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let mut touched = false;

        for row in rows.iter_mut().filter(|row| row.username == username) {
            let mut entries: Vec<Value> = serde_json::from_str(&row.contents)?;
            update(&mut entries);
            row.contents = serde_json::to_string(&entries)?;
            touched = true;
        }

        Ok(touched)
    }
}

#[async_trait]
impl CartRepository for InMemoryCarts {
    async fn get_cart(&self, username: &str) -> RepositoryResult<Vec<Row>> {
        self.calls.record("get_cart");
        self.check_available()?;

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.username == username)
            .map(|row| {
                to_row(json!({
                    "id": row.id,
                    "username": row.username,
                    "contents": row.contents,
                    "cost": row.cost.to_string(),
                }))
            })
            .collect())
    }

    async fn add_to_cart(&self, username: &str, product_id: ProductId) -> RepositoryResult<()> {
        self.calls.record("add_to_cart");
        self.check_available()?;

        let touched =
            self.update_contents(username, |entries| entries.push(json!(product_id)))?;
        if !touched {
            let contents = serde_json::to_string(&[product_id])?;
            self.insert_raw_row(username, &contents, Decimal::ZERO);
        }

        Ok(())
    }

    async fn remove_from_cart(
        &self,
        username: &str,
        product_id: ProductId,
    ) -> RepositoryResult<()> {
        self.calls.record("remove_from_cart");
        self.check_available()?;

        let target = json!(product_id);
        self.update_contents(username, |entries| {
            entries.retain(|entry| *entry != target && entry["id"] != target)
        })?;
        Ok(())
    }

    async fn delete_cart(&self, username: &str) -> RepositoryResult<()> {
        self.calls.record("delete_cart");
        self.check_available()?;

        self.rows
            .lock()
            .unwrap()
            .retain(|row| row.username != username);
        Ok(())
    }
}

pub fn browse_service(catalog: &Arc<InMemoryCatalog>) -> BrowseService {
    BrowseService::new(catalog.clone(), &CacheConfig::default())
}

pub fn cart_service(carts: &Arc<InMemoryCarts>, catalog: &Arc<InMemoryCatalog>) -> CartService {
    CartService::new(carts.clone(), catalog.clone(), &CacheConfig::default())
}
