//! In-process store.
//!
//! Used when the service starts without `DATABASE_URL` and by the test suite.
//! Every operation runs under one write lock, which gives the same atomicity
//! the Postgres backend gets from transactions.

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{GalleryPatch, Store, StoreError, StoreResult};
use crate::db::models::{
    AboutContent, Category, GalleryImage, HeroSlide, HeroSlideInput, Link, LinkInput,
    SiteConfigEntry,
};
use crate::ordering::{next_sort_order, plan_reorder, Placement, SiblingGroup};

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<i32, Category>,
    links: BTreeMap<i32, Link>,
    gallery: BTreeMap<i32, GalleryImage>,
    about: BTreeMap<i32, AboutContent>,
    config: BTreeMap<String, String>,
    hero_slides: BTreeMap<i32, HeroSlide>,
    last_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn sorted_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories.values().cloned().collect();
        categories.sort_by_key(|c| (c.sort_order, c.id));
        categories
    }

    fn sorted_links(&self, category_id: Option<i32>) -> Vec<Link> {
        let mut links: Vec<Link> = self
            .links
            .values()
            .filter(|l| category_id.map_or(true, |id| l.category_id == id))
            .cloned()
            .collect();
        links.sort_by_key(|l| (l.category_id, l.sort_order, l.id));
        links
    }

    fn sorted_slides(&self, include_inactive: bool) -> Vec<HeroSlide> {
        let mut slides: Vec<HeroSlide> = self
            .hero_slides
            .values()
            .filter(|s| include_inactive || s.is_active)
            .cloned()
            .collect();
        slides.sort_by_key(|s| (s.sort_order, s.id));
        slides
    }

    fn category_name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }
}

/// Failures injected by tests to exercise rollback paths.
#[derive(Debug, Default)]
struct Faults {
    /// Fail a reorder while writing the row at this zero-based position.
    reorder_write: Option<usize>,
    config_keys: HashSet<String>,
    unreachable: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    faults: RwLock<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next reorders fail when writing the `position`-th row.
    #[cfg(test)]
    pub async fn fail_reorder_write_at(&self, position: usize) {
        self.faults.write().await.reorder_write = Some(position);
    }

    /// Make every upsert of `key` fail.
    #[cfg(test)]
    pub async fn fail_config_key(&self, key: &str) {
        self.faults.write().await.config_keys.insert(key.to_string());
    }

    /// Make `ping` report the store as unreachable.
    #[cfg(test)]
    pub async fn fail_ping(&self) {
        self.faults.write().await.unreachable = true;
    }

    /// Apply a reorder plan row by row to a staged copy of the sort orders and
    /// only hand the copy back when every row was written.
    async fn stage_placements(
        &self,
        plan: &[Placement],
        current: BTreeMap<i32, i32>,
    ) -> StoreResult<BTreeMap<i32, i32>> {
        let fail_at = self.faults.read().await.reorder_write;
        let mut staged = current;

        for (position, placement) in plan.iter().enumerate() {
            if fail_at == Some(position) {
                return Err(StoreError::Backend(format!(
                    "write of row {} failed",
                    placement.id
                )));
            }
            staged.insert(placement.id, placement.sort_order);
        }

        Ok(staged)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<Duration> {
        if self.faults.read().await.unreachable {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        let start = Instant::now();
        let _tables = self.tables.read().await;
        Ok(start.elapsed())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let tables = self.tables.read().await;
        let mut categories = tables.sorted_categories();
        for category in categories.iter_mut() {
            category.links = tables.sorted_links(Some(category.id));
        }
        Ok(categories)
    }

    async fn create_category(&self, name: &str) -> StoreResult<Category> {
        let mut tables = self.tables.write().await;
        if tables.category_name_taken(name, None) {
            return Err(StoreError::DuplicateName {
                entity: "category",
                name: name.to_string(),
            });
        }

        let category = Category {
            id: tables.next_id(),
            name: name.to_string(),
            sort_order: next_sort_order(tables.categories.values().map(|c| c.sort_order)),
            links: Vec::new(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn rename_category(&self, id: i32, name: &str) -> StoreResult<Category> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&id) {
            return Err(StoreError::NotFound {
                entity: "category",
                id,
            });
        }
        if tables.category_name_taken(name, Some(id)) {
            return Err(StoreError::DuplicateName {
                entity: "category",
                name: name.to_string(),
            });
        }

        let links = tables.sorted_links(Some(id));
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                entity: "category",
                id,
            })?;
        category.name = name.to_string();
        let mut renamed = category.clone();
        renamed.links = links;
        Ok(renamed)
    }

    async fn delete_category(&self, id: i32) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        if tables.categories.remove(&id).is_none() {
            return Err(StoreError::NotFound {
                entity: "category",
                id,
            });
        }

        let before = tables.links.len();
        tables.links.retain(|_, link| link.category_id != id);
        Ok((before - tables.links.len()) as u64)
    }

    async fn reorder_categories(&self, ordered_ids: &[i32]) -> StoreResult<Vec<Category>> {
        let mut tables = self.tables.write().await;
        let current: BTreeMap<i32, i32> = tables
            .categories
            .values()
            .map(|c| (c.id, c.sort_order))
            .collect();
        let ids: Vec<i32> = current.keys().copied().collect();
        let plan = plan_reorder(SiblingGroup::Categories, &ids, ordered_ids)?;

        let staged = self.stage_placements(&plan, current).await?;
        for (id, sort_order) in staged {
            if let Some(category) = tables.categories.get_mut(&id) {
                category.sort_order = sort_order;
            }
        }

        let mut categories = tables.sorted_categories();
        for category in categories.iter_mut() {
            category.links = tables.sorted_links(Some(category.id));
        }
        Ok(categories)
    }

    async fn list_links(&self, category_id: Option<i32>) -> StoreResult<Vec<Link>> {
        Ok(self.tables.read().await.sorted_links(category_id))
    }

    async fn create_link(&self, input: &LinkInput) -> StoreResult<Link> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&input.category_id) {
            return Err(StoreError::MissingCategory(input.category_id));
        }

        let sort_order = next_sort_order(
            tables
                .links
                .values()
                .filter(|l| l.category_id == input.category_id)
                .map(|l| l.sort_order),
        );
        let link = Link {
            id: tables.next_id(),
            title: input.title.clone(),
            url: input.url.clone(),
            icon: input.icon.clone(),
            snapshot_url: input.snapshot_url.clone(),
            description: input.description.clone(),
            clicks: 0,
            category_id: input.category_id,
            sort_order,
        };
        tables.links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn update_link(&self, id: i32, input: &LinkInput) -> StoreResult<Link> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&input.category_id) {
            return Err(StoreError::MissingCategory(input.category_id));
        }
        let previous_category = tables
            .links
            .get(&id)
            .map(|l| l.category_id)
            .ok_or(StoreError::NotFound { entity: "link", id })?;

        let moved_sort_order = (previous_category != input.category_id).then(|| {
            next_sort_order(
                tables
                    .links
                    .values()
                    .filter(|l| l.category_id == input.category_id)
                    .map(|l| l.sort_order),
            )
        });

        let link = tables
            .links
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "link", id })?;
        link.title = input.title.clone();
        link.url = input.url.clone();
        link.icon = input.icon.clone();
        link.snapshot_url = input.snapshot_url.clone();
        link.description = input.description.clone();
        link.category_id = input.category_id;
        if let Some(sort_order) = moved_sort_order {
            link.sort_order = sort_order;
        }
        Ok(link.clone())
    }

    async fn delete_link(&self, id: i32) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .links
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { entity: "link", id })
    }

    async fn reorder_links(
        &self,
        category_id: i32,
        ordered_ids: &[i32],
    ) -> StoreResult<Vec<Link>> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&category_id) {
            return Err(StoreError::NotFound {
                entity: "category",
                id: category_id,
            });
        }

        let current: BTreeMap<i32, i32> = tables
            .links
            .values()
            .filter(|l| l.category_id == category_id)
            .map(|l| (l.id, l.sort_order))
            .collect();
        let ids: Vec<i32> = current.keys().copied().collect();
        let plan = plan_reorder(SiblingGroup::Links { category_id }, &ids, ordered_ids)?;

        let staged = self.stage_placements(&plan, current).await?;
        for (id, sort_order) in staged {
            if let Some(link) = tables.links.get_mut(&id) {
                link.sort_order = sort_order;
            }
        }

        Ok(tables.sorted_links(Some(category_id)))
    }

    async fn increment_clicks(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.links.get_mut(&id) {
            Some(link) => {
                link.clicks += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_gallery(&self) -> StoreResult<Vec<GalleryImage>> {
        let tables = self.tables.read().await;
        let mut images: Vec<GalleryImage> = tables.gallery.values().cloned().collect();
        images.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(images)
    }

    async fn create_gallery_image(
        &self,
        url: &str,
        title: Option<&str>,
    ) -> StoreResult<GalleryImage> {
        let mut tables = self.tables.write().await;
        let image = GalleryImage {
            id: tables.next_id(),
            url: url.to_string(),
            title: title.map(str::to_string),
            created_at: Utc::now(),
        };
        tables.gallery.insert(image.id, image.clone());
        Ok(image)
    }

    async fn update_gallery_image(
        &self,
        id: i32,
        patch: &GalleryPatch,
    ) -> StoreResult<GalleryImage> {
        let mut tables = self.tables.write().await;
        let image = tables.gallery.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "gallery image",
            id,
        })?;
        if let Some(url) = &patch.url {
            image.url = url.clone();
        }
        if let Some(title) = &patch.title {
            image.title = Some(title.clone());
        }
        Ok(image.clone())
    }

    async fn delete_gallery_image(&self, id: i32) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .gallery
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                entity: "gallery image",
                id,
            })
    }

    async fn current_about(&self) -> StoreResult<Option<AboutContent>> {
        let tables = self.tables.read().await;
        Ok(tables.about.values().next().cloned())
    }

    async fn create_about(&self, title: &str, description: &str) -> StoreResult<AboutContent> {
        let mut tables = self.tables.write().await;
        let about = AboutContent {
            id: tables.next_id(),
            title: title.to_string(),
            description: description.to_string(),
        };
        tables.about.insert(about.id, about.clone());
        Ok(about)
    }

    async fn upsert_current_about(
        &self,
        title: &str,
        description: &str,
    ) -> StoreResult<AboutContent> {
        let mut tables = self.tables.write().await;
        if let Some(current) = tables.about.values_mut().next() {
            current.title = title.to_string();
            current.description = description.to_string();
            return Ok(current.clone());
        }

        let about = AboutContent {
            id: tables.next_id(),
            title: title.to_string(),
            description: description.to_string(),
        };
        tables.about.insert(about.id, about.clone());
        Ok(about)
    }

    async fn list_config(&self) -> StoreResult<Vec<SiteConfigEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .config
            .iter()
            .map(|(key, value)| SiteConfigEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    async fn upsert_config(&self, key: &str, value: &str) -> StoreResult<SiteConfigEntry> {
        if self.faults.read().await.config_keys.contains(key) {
            return Err(StoreError::Backend(format!("write of config key {} failed", key)));
        }

        let mut tables = self.tables.write().await;
        tables.config.insert(key.to_string(), value.to_string());
        Ok(SiteConfigEntry {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    async fn list_hero_slides(&self, include_inactive: bool) -> StoreResult<Vec<HeroSlide>> {
        Ok(self.tables.read().await.sorted_slides(include_inactive))
    }

    async fn create_hero_slide(&self, input: &HeroSlideInput) -> StoreResult<HeroSlide> {
        let mut tables = self.tables.write().await;
        let slide = HeroSlide {
            id: tables.next_id(),
            title: input.title.clone(),
            subtitle: input.subtitle.clone(),
            description: input.description.clone(),
            code_snippet: input.code_snippet.clone(),
            is_active: input.is_active.unwrap_or(true),
            sort_order: next_sort_order(tables.hero_slides.values().map(|s| s.sort_order)),
        };
        tables.hero_slides.insert(slide.id, slide.clone());
        Ok(slide)
    }

    async fn update_hero_slide(&self, id: i32, input: &HeroSlideInput) -> StoreResult<HeroSlide> {
        let mut tables = self.tables.write().await;
        let slide = tables.hero_slides.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "hero slide",
            id,
        })?;
        slide.title = input.title.clone();
        slide.subtitle = input.subtitle.clone();
        slide.description = input.description.clone();
        slide.code_snippet = input.code_snippet.clone();
        if let Some(is_active) = input.is_active {
            slide.is_active = is_active;
        }
        Ok(slide.clone())
    }

    async fn delete_hero_slide(&self, id: i32) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .hero_slides
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                entity: "hero slide",
                id,
            })
    }

    async fn reorder_hero_slides(&self, ordered_ids: &[i32]) -> StoreResult<Vec<HeroSlide>> {
        let mut tables = self.tables.write().await;
        let current: BTreeMap<i32, i32> = tables
            .hero_slides
            .values()
            .map(|s| (s.id, s.sort_order))
            .collect();
        let ids: Vec<i32> = current.keys().copied().collect();
        let plan = plan_reorder(SiblingGroup::HeroSlides, &ids, ordered_ids)?;

        let staged = self.stage_placements(&plan, current).await?;
        for (id, sort_order) in staged {
            if let Some(slide) = tables.hero_slides.get_mut(&id) {
                slide.sort_order = sort_order;
            }
        }

        Ok(tables.sorted_slides(true))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ordering::OrderingError;

    fn link_input(category_id: i32, title: &str) -> LinkInput {
        LinkInput {
            title: title.to_string(),
            url: format!("https://example.com/{}", title),
            icon: None,
            snapshot_url: None,
            description: None,
            category_id,
        }
    }

    fn slide_input(title: &str, is_active: bool) -> HeroSlideInput {
        HeroSlideInput {
            title: title.to_string(),
            subtitle: "sub".to_string(),
            description: None,
            code_snippet: None,
            is_active: Some(is_active),
        }
    }

    fn sort_orders(categories: &[Category]) -> Vec<(i32, i32)> {
        categories.iter().map(|c| (c.id, c.sort_order)).collect()
    }

    #[tokio::test]
    async fn test_create_category_appends() {
        let store = MemoryStore::new();
        let a = store.create_category("Design").await.unwrap();
        let b = store.create_category("Fonts").await.unwrap();
        assert_eq!(a.sort_order, 0);
        assert_eq!(b.sort_order, 1);
    }

    #[tokio::test]
    async fn test_duplicate_category_name_rejected() {
        let store = MemoryStore::new();
        store.create_category("Design").await.unwrap();
        let err = store.create_category("Design").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName { .. }));
    }

    #[tokio::test]
    async fn test_rename_to_own_name_is_allowed() {
        let store = MemoryStore::new();
        let a = store.create_category("Design").await.unwrap();
        store.create_category("Fonts").await.unwrap();
        assert_eq!(store.rename_category(a.id, "Design").await.unwrap().name, "Design");
        assert!(matches!(
            store.rename_category(a.id, "Fonts").await.unwrap_err(),
            StoreError::DuplicateName { .. }
        ));
    }

    #[tokio::test]
    async fn test_ordering_dense_after_mixed_operations() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d", "e"] {
            ids.push(store.create_category(name).await.unwrap().id);
        }
        store.delete_category(ids[1]).await.unwrap();
        store.delete_category(ids[3]).await.unwrap();
        let f = store.create_category("f").await.unwrap();
        assert_eq!(f.sort_order, 5);

        let reordered = store
            .reorder_categories(&[f.id, ids[4], ids[0], ids[2]])
            .await
            .unwrap();
        let orders: Vec<i32> = reordered.iter().map(|c| c.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        let names: Vec<&str> = reordered.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["f", "e", "a", "c"]);
    }

    #[tokio::test]
    async fn test_reorder_failure_leaves_rows_unchanged() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d"] {
            ids.push(store.create_category(name).await.unwrap().id);
        }
        let before = sort_orders(&store.list_categories().await.unwrap());

        store.fail_reorder_write_at(2).await;
        let reversed: Vec<i32> = ids.iter().rev().copied().collect();
        let err = store.reorder_categories(&reversed).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));

        let after = sort_orders(&store.list_categories().await.unwrap());
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_reorder_stale_list_rejected() {
        let store = MemoryStore::new();
        let a = store.create_category("a").await.unwrap();
        store.create_category("b").await.unwrap();
        let err = store.reorder_categories(&[a.id]).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Ordering(OrderingError::CardinalityMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_cascade_delete_removes_links() {
        let store = MemoryStore::new();
        let design = store.create_category("Design").await.unwrap();
        let other = store.create_category("Other").await.unwrap();
        for i in 0..4 {
            store
                .create_link(&link_input(design.id, &format!("d{}", i)))
                .await
                .unwrap();
        }
        store.create_link(&link_input(other.id, "keep")).await.unwrap();

        let removed = store.delete_category(design.id).await.unwrap();
        assert_eq!(removed, 4);
        assert!(store.list_links(Some(design.id)).await.unwrap().is_empty());
        assert_eq!(store.list_links(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_category_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.delete_category(42).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_link_requires_existing_category() {
        let store = MemoryStore::new();
        let err = store.create_link(&link_input(9, "x")).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingCategory(9)));
        assert!(store.list_links(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_moving_link_appends_to_destination() {
        let store = MemoryStore::new();
        let a = store.create_category("a").await.unwrap();
        let b = store.create_category("b").await.unwrap();
        store.create_link(&link_input(b.id, "b0")).await.unwrap();
        let moving = store.create_link(&link_input(a.id, "a0")).await.unwrap();

        let moved = store
            .update_link(moving.id, &link_input(b.id, "a0"))
            .await
            .unwrap();
        assert_eq!(moved.category_id, b.id);
        assert_eq!(moved.sort_order, 1);
    }

    #[tokio::test]
    async fn test_update_link_keeps_clicks() {
        let store = MemoryStore::new();
        let a = store.create_category("a").await.unwrap();
        let link = store.create_link(&link_input(a.id, "x")).await.unwrap();
        store.increment_clicks(link.id).await.unwrap();
        let updated = store
            .update_link(link.id, &link_input(a.id, "renamed"))
            .await
            .unwrap();
        assert_eq!(updated.clicks, 1);
        assert_eq!(updated.title, "renamed");
    }

    #[tokio::test]
    async fn test_reorder_links_within_category() {
        let store = MemoryStore::new();
        let a = store.create_category("a").await.unwrap();
        let x = store.create_link(&link_input(a.id, "x")).await.unwrap();
        let y = store.create_link(&link_input(a.id, "y")).await.unwrap();
        let z = store.create_link(&link_input(a.id, "z")).await.unwrap();
        store.delete_link(y.id).await.unwrap();

        let links = store.reorder_links(a.id, &[z.id, x.id]).await.unwrap();
        let order: Vec<(i32, i32)> = links.iter().map(|l| (l.id, l.sort_order)).collect();
        assert_eq!(order, vec![(z.id, 0), (x.id, 1)]);
    }

    #[tokio::test]
    async fn test_concurrent_clicks_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let a = store.create_category("a").await.unwrap();
        let link_id = store.create_link(&link_input(a.id, "x")).await.unwrap().id;

        let mut handles = Vec::new();
        for _ in 0..100 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment_clicks(link_id).await.unwrap()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        let links = store.list_links(Some(a.id)).await.unwrap();
        assert_eq!(links[0].clicks, 100);
    }

    #[tokio::test]
    async fn test_click_on_unknown_link_is_noop() {
        let store = MemoryStore::new();
        assert!(!store.increment_clicks(5).await.unwrap());
    }

    #[tokio::test]
    async fn test_gallery_newest_first() {
        let store = MemoryStore::new();
        let first = store.create_gallery_image("/a.png", None).await.unwrap();
        let second = store.create_gallery_image("/b.png", Some("B")).await.unwrap();
        let images = store.list_gallery().await.unwrap();
        assert_eq!(images[0].id, second.id);
        assert_eq!(images[1].id, first.id);
    }

    #[tokio::test]
    async fn test_about_reads_lowest_id() {
        let store = MemoryStore::new();
        assert!(store.current_about().await.unwrap().is_none());
        let first = store.upsert_current_about("Hi", "one").await.unwrap();
        store.create_about("Second", "two").await.unwrap();
        let updated = store.upsert_current_about("Hello", "uno").await.unwrap();

        assert_eq!(updated.id, first.id);
        let current = store.current_about().await.unwrap().unwrap();
        assert_eq!(current.title, "Hello");
    }

    #[tokio::test]
    async fn test_config_key_failure_is_isolated() {
        let store = MemoryStore::new();
        store.fail_config_key("b").await;
        assert!(store.upsert_config("a", "1").await.is_ok());
        assert!(store.upsert_config("b", "2").await.is_err());
        let entries = store.list_config().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "a");
    }

    #[tokio::test]
    async fn test_hero_slides_active_filter_and_reorder() {
        let store = MemoryStore::new();
        let one = store.create_hero_slide(&slide_input("one", true)).await.unwrap();
        let two = store.create_hero_slide(&slide_input("two", false)).await.unwrap();
        let three = store.create_hero_slide(&slide_input("three", true)).await.unwrap();

        store
            .reorder_hero_slides(&[three.id, two.id, one.id])
            .await
            .unwrap();
        let public: Vec<i32> = store
            .list_hero_slides(false)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(public, vec![three.id, one.id]);
        assert_eq!(store.list_hero_slides(true).await.unwrap().len(), 3);
    }
}
