//! Persistence seam.
//!
//! Route handlers only see `dyn Store`. `PgStore` is the production backend;
//! `MemoryStore` keeps the same contract in process and backs the service when
//! no `DATABASE_URL` is configured.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{
    AboutContent, Category, GalleryImage, HeroSlide, HeroSlideInput, Link, LinkInput,
    SiteConfigEntry,
};
use crate::ordering::OrderingError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{entity} named '{name}' already exists")]
    DuplicateName { entity: &'static str, name: String },

    #[error("category {0} does not exist")]
    MissingCategory(i32),

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Partial update of a gallery image. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct GalleryPatch {
    pub url: Option<String>,
    pub title: Option<String>,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Trivial round trip used by the health probes.
    async fn ping(&self) -> StoreResult<Duration>;

    // Categories

    /// All categories by `sort_order`, each with its links by `sort_order`.
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn create_category(&self, name: &str) -> StoreResult<Category>;
    async fn rename_category(&self, id: i32, name: &str) -> StoreResult<Category>;
    /// Delete a category and its links. Returns the number of links removed.
    async fn delete_category(&self, id: i32) -> StoreResult<u64>;
    async fn reorder_categories(&self, ordered_ids: &[i32]) -> StoreResult<Vec<Category>>;

    // Links

    /// Links of one category by `sort_order`, or every link by
    /// `(category_id, sort_order)` when no category is given.
    async fn list_links(&self, category_id: Option<i32>) -> StoreResult<Vec<Link>>;
    async fn create_link(&self, input: &LinkInput) -> StoreResult<Link>;
    async fn update_link(&self, id: i32, input: &LinkInput) -> StoreResult<Link>;
    async fn delete_link(&self, id: i32) -> StoreResult<()>;
    async fn reorder_links(&self, category_id: i32, ordered_ids: &[i32])
        -> StoreResult<Vec<Link>>;
    /// Atomically add one click. Returns `false` when the link does not exist.
    async fn increment_clicks(&self, id: i32) -> StoreResult<bool>;

    // Gallery

    /// Newest first.
    async fn list_gallery(&self) -> StoreResult<Vec<GalleryImage>>;
    async fn create_gallery_image(&self, url: &str, title: Option<&str>)
        -> StoreResult<GalleryImage>;
    async fn update_gallery_image(&self, id: i32, patch: &GalleryPatch)
        -> StoreResult<GalleryImage>;
    async fn delete_gallery_image(&self, id: i32) -> StoreResult<()>;

    // About

    /// The current about record: the one with the lowest id.
    async fn current_about(&self) -> StoreResult<Option<AboutContent>>;
    async fn create_about(&self, title: &str, description: &str) -> StoreResult<AboutContent>;
    /// Overwrite the current record, creating it when the table is empty.
    async fn upsert_current_about(&self, title: &str, description: &str)
        -> StoreResult<AboutContent>;

    // Site config

    async fn list_config(&self) -> StoreResult<Vec<SiteConfigEntry>>;
    async fn upsert_config(&self, key: &str, value: &str) -> StoreResult<SiteConfigEntry>;

    // Hero slides

    /// Slides by `sort_order`; inactive ones only when `include_inactive`.
    async fn list_hero_slides(&self, include_inactive: bool) -> StoreResult<Vec<HeroSlide>>;
    async fn create_hero_slide(&self, input: &HeroSlideInput) -> StoreResult<HeroSlide>;
    async fn update_hero_slide(&self, id: i32, input: &HeroSlideInput) -> StoreResult<HeroSlide>;
    async fn delete_hero_slide(&self, id: i32) -> StoreResult<()>;
    async fn reorder_hero_slides(&self, ordered_ids: &[i32]) -> StoreResult<Vec<HeroSlide>>;
}
