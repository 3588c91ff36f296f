//! PostgreSQL store backed by a sqlx `PgPool`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{GalleryPatch, Store, StoreError, StoreResult};
use crate::db::models::{
    AboutContent, Category, GalleryImage, HeroSlide, HeroSlideInput, Link, LinkInput,
    SiteConfigEntry,
};
use crate::ordering::{next_sort_order, plan_reorder, SiblingGroup};

const LINK_COLUMNS: &str =
    "id, title, url, icon, snapshot_url, description, clicks, category_id, sort_order";
const SLIDE_COLUMNS: &str =
    "id, title, subtitle, description, code_snippet, is_active, sort_order";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn category_exists(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    async fn next_link_sort_order(
        tx: &mut Transaction<'_, Postgres>,
        category_id: i32,
    ) -> Result<i32, sqlx::Error> {
        let orders: Vec<i32> =
            sqlx::query_scalar("SELECT sort_order FROM links WHERE category_id = $1")
                .bind(category_id)
                .fetch_all(&mut **tx)
                .await?;
        Ok(next_sort_order(orders))
    }

    /// Rewrite a whole sibling group in one transaction. Member rows are locked
    /// first so the permutation check and the update see the same group.
    async fn reorder_group(&self, group: SiblingGroup, ordered_ids: &[i32]) -> StoreResult<()> {
        let (select_sql, update_sql) = match group {
            SiblingGroup::Categories => (
                "SELECT id FROM categories ORDER BY id FOR UPDATE",
                r#"
                UPDATE categories AS t SET sort_order = p.sort_order
                FROM UNNEST($1::int4[], $2::int4[]) AS p(id, sort_order)
                WHERE t.id = p.id
                "#,
            ),
            SiblingGroup::Links { .. } => (
                "SELECT id FROM links WHERE category_id = $1 ORDER BY id FOR UPDATE",
                r#"
                UPDATE links AS t SET sort_order = p.sort_order
                FROM UNNEST($1::int4[], $2::int4[]) AS p(id, sort_order)
                WHERE t.id = p.id
                "#,
            ),
            SiblingGroup::HeroSlides => (
                "SELECT id FROM hero_slides ORDER BY id FOR UPDATE",
                r#"
                UPDATE hero_slides AS t SET sort_order = p.sort_order
                FROM UNNEST($1::int4[], $2::int4[]) AS p(id, sort_order)
                WHERE t.id = p.id
                "#,
            ),
        };

        let mut tx = self.pool.begin().await?;

        let mut select = sqlx::query_scalar::<_, i32>(select_sql);
        if let SiblingGroup::Links { category_id } = group {
            select = select.bind(category_id);
        }
        let current = select.fetch_all(&mut *tx).await?;

        let plan = plan_reorder(group, &current, ordered_ids)?;
        let ids: Vec<i32> = plan.iter().map(|p| p.id).collect();
        let orders: Vec<i32> = plan.iter().map(|p| p.sort_order).collect();

        sqlx::query(update_sql)
            .bind(&ids)
            .bind(&orders)
            .execute(&mut *tx)
            .await?;

        // Dropping `tx` on any earlier `?` rolls the whole group back.
        tx.commit().await?;

        tracing::info!(group = %group, rows = ids.len(), "sibling group reordered");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<Duration> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(self.pool.as_ref()).await?;
        Ok(start.elapsed())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, sort_order FROM categories ORDER BY sort_order, id",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        let links = self.list_links(None).await?;
        for category in categories.iter_mut() {
            category.links = links
                .iter()
                .filter(|l| l.category_id == category.id)
                .cloned()
                .collect();
        }

        Ok(categories)
    }

    async fn create_category(&self, name: &str) -> StoreResult<Category> {
        let mut tx = self.pool.begin().await?;

        let orders: Vec<i32> = sqlx::query_scalar("SELECT sort_order FROM categories")
            .fetch_all(&mut *tx)
            .await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, sort_order)
            VALUES ($1, $2)
            RETURNING id, name, sort_order
            "#,
        )
        .bind(name)
        .bind(next_sort_order(orders))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateName {
                    entity: "category",
                    name: name.to_string(),
                }
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        Ok(category)
    }

    async fn rename_category(&self, id: i32, name: &str) -> StoreResult<Category> {
        let mut category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name, sort_order",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateName {
                    entity: "category",
                    name: name.to_string(),
                }
            } else {
                e.into()
            }
        })?
        .ok_or(StoreError::NotFound {
            entity: "category",
            id,
        })?;

        category.links = self.list_links(Some(id)).await?;
        Ok(category)
    }

    async fn delete_category(&self, id: i32) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        // The foreign key cascades too; deleting explicitly reports the count.
        let links = sqlx::query("DELETE FROM links WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::NotFound {
                entity: "category",
                id,
            });
        }

        tx.commit().await?;
        Ok(links)
    }

    async fn reorder_categories(&self, ordered_ids: &[i32]) -> StoreResult<Vec<Category>> {
        self.reorder_group(SiblingGroup::Categories, ordered_ids)
            .await?;
        self.list_categories().await
    }

    async fn list_links(&self, category_id: Option<i32>) -> StoreResult<Vec<Link>> {
        let links = match category_id {
            Some(category_id) => {
                sqlx::query_as::<_, Link>(&format!(
                    "SELECT {} FROM links WHERE category_id = $1 ORDER BY sort_order, id",
                    LINK_COLUMNS
                ))
                .bind(category_id)
                .fetch_all(self.pool.as_ref())
                .await?
            }
            None => {
                sqlx::query_as::<_, Link>(&format!(
                    "SELECT {} FROM links ORDER BY category_id, sort_order, id",
                    LINK_COLUMNS
                ))
                .fetch_all(self.pool.as_ref())
                .await?
            }
        };
        Ok(links)
    }

    async fn create_link(&self, input: &LinkInput) -> StoreResult<Link> {
        let mut tx = self.pool.begin().await?;

        if !Self::category_exists(&mut tx, input.category_id).await? {
            return Err(StoreError::MissingCategory(input.category_id));
        }
        let sort_order = Self::next_link_sort_order(&mut tx, input.category_id).await?;

        let link = sqlx::query_as::<_, Link>(&format!(
            r#"
            INSERT INTO links (title, url, icon, snapshot_url, description, category_id, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            LINK_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.url)
        .bind(&input.icon)
        .bind(&input.snapshot_url)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(sort_order)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::MissingCategory(input.category_id)
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        Ok(link)
    }

    async fn update_link(&self, id: i32, input: &LinkInput) -> StoreResult<Link> {
        let mut tx = self.pool.begin().await?;

        if !Self::category_exists(&mut tx, input.category_id).await? {
            return Err(StoreError::MissingCategory(input.category_id));
        }

        let previous_category: i32 =
            sqlx::query_scalar("SELECT category_id FROM links WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound { entity: "link", id })?;

        let moved_sort_order = if previous_category != input.category_id {
            Some(Self::next_link_sort_order(&mut tx, input.category_id).await?)
        } else {
            None
        };

        let link = sqlx::query_as::<_, Link>(&format!(
            r#"
            UPDATE links
            SET title = $1, url = $2, icon = $3, snapshot_url = $4, description = $5,
                category_id = $6, sort_order = COALESCE($7, sort_order)
            WHERE id = $8
            RETURNING {}
            "#,
            LINK_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.url)
        .bind(&input.icon)
        .bind(&input.snapshot_url)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(moved_sort_order)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(link)
    }

    async fn delete_link(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "link", id });
        }
        Ok(())
    }

    async fn reorder_links(
        &self,
        category_id: i32,
        ordered_ids: &[i32],
    ) -> StoreResult<Vec<Link>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(self.pool.as_ref())
                .await?;
        if !exists {
            return Err(StoreError::NotFound {
                entity: "category",
                id: category_id,
            });
        }

        self.reorder_group(SiblingGroup::Links { category_id }, ordered_ids)
            .await?;
        self.list_links(Some(category_id)).await
    }

    async fn increment_clicks(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE links SET clicks = clicks + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_gallery(&self) -> StoreResult<Vec<GalleryImage>> {
        Ok(sqlx::query_as::<_, GalleryImage>(
            r#"
            SELECT id, url, title, created_at FROM gallery_images
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?)
    }

    async fn create_gallery_image(
        &self,
        url: &str,
        title: Option<&str>,
    ) -> StoreResult<GalleryImage> {
        Ok(sqlx::query_as::<_, GalleryImage>(
            r#"
            INSERT INTO gallery_images (url, title, created_at)
            VALUES ($1, $2, now())
            RETURNING id, url, title, created_at
            "#,
        )
        .bind(url)
        .bind(title)
        .fetch_one(self.pool.as_ref())
        .await?)
    }

    async fn update_gallery_image(
        &self,
        id: i32,
        patch: &GalleryPatch,
    ) -> StoreResult<GalleryImage> {
        sqlx::query_as::<_, GalleryImage>(
            r#"
            UPDATE gallery_images
            SET url = COALESCE($1, url), title = COALESCE($2, title)
            WHERE id = $3
            RETURNING id, url, title, created_at
            "#,
        )
        .bind(&patch.url)
        .bind(&patch.title)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(StoreError::NotFound {
            entity: "gallery image",
            id,
        })
    }

    async fn delete_gallery_image(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "gallery image",
                id,
            });
        }
        Ok(())
    }

    async fn current_about(&self) -> StoreResult<Option<AboutContent>> {
        Ok(sqlx::query_as::<_, AboutContent>(
            "SELECT id, title, description FROM about_content ORDER BY id LIMIT 1",
        )
        .fetch_optional(self.pool.as_ref())
        .await?)
    }

    async fn create_about(&self, title: &str, description: &str) -> StoreResult<AboutContent> {
        Ok(sqlx::query_as::<_, AboutContent>(
            r#"
            INSERT INTO about_content (title, description) VALUES ($1, $2)
            RETURNING id, title, description
            "#,
        )
        .bind(title)
        .bind(description)
        .fetch_one(self.pool.as_ref())
        .await?)
    }

    async fn upsert_current_about(
        &self,
        title: &str,
        description: &str,
    ) -> StoreResult<AboutContent> {
        let mut tx = self.pool.begin().await?;

        let current: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM about_content ORDER BY id LIMIT 1 FOR UPDATE",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let about = match current {
            Some(id) => {
                sqlx::query_as::<_, AboutContent>(
                    r#"
                    UPDATE about_content SET title = $1, description = $2
                    WHERE id = $3
                    RETURNING id, title, description
                    "#,
                )
                .bind(title)
                .bind(description)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, AboutContent>(
                    r#"
                    INSERT INTO about_content (title, description) VALUES ($1, $2)
                    RETURNING id, title, description
                    "#,
                )
                .bind(title)
                .bind(description)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(about)
    }

    async fn list_config(&self) -> StoreResult<Vec<SiteConfigEntry>> {
        Ok(sqlx::query_as::<_, SiteConfigEntry>(
            "SELECT key, value FROM site_config ORDER BY key",
        )
        .fetch_all(self.pool.as_ref())
        .await?)
    }

    async fn upsert_config(&self, key: &str, value: &str) -> StoreResult<SiteConfigEntry> {
        Ok(sqlx::query_as::<_, SiteConfigEntry>(
            r#"
            INSERT INTO site_config (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            RETURNING key, value
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(self.pool.as_ref())
        .await?)
    }

    async fn list_hero_slides(&self, include_inactive: bool) -> StoreResult<Vec<HeroSlide>> {
        Ok(sqlx::query_as::<_, HeroSlide>(&format!(
            "SELECT {} FROM hero_slides WHERE is_active OR $1 ORDER BY sort_order, id",
            SLIDE_COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(self.pool.as_ref())
        .await?)
    }

    async fn create_hero_slide(&self, input: &HeroSlideInput) -> StoreResult<HeroSlide> {
        let mut tx = self.pool.begin().await?;

        let orders: Vec<i32> = sqlx::query_scalar("SELECT sort_order FROM hero_slides")
            .fetch_all(&mut *tx)
            .await?;

        let slide = sqlx::query_as::<_, HeroSlide>(&format!(
            r#"
            INSERT INTO hero_slides
                (title, subtitle, description, code_snippet, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SLIDE_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.subtitle)
        .bind(&input.description)
        .bind(&input.code_snippet)
        .bind(input.is_active.unwrap_or(true))
        .bind(next_sort_order(orders))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(slide)
    }

    async fn update_hero_slide(&self, id: i32, input: &HeroSlideInput) -> StoreResult<HeroSlide> {
        sqlx::query_as::<_, HeroSlide>(&format!(
            r#"
            UPDATE hero_slides
            SET title = $1, subtitle = $2, description = $3, code_snippet = $4,
                is_active = COALESCE($5, is_active)
            WHERE id = $6
            RETURNING {}
            "#,
            SLIDE_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.subtitle)
        .bind(&input.description)
        .bind(&input.code_snippet)
        .bind(input.is_active)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(StoreError::NotFound {
            entity: "hero slide",
            id,
        })
    }

    async fn delete_hero_slide(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM hero_slides WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "hero slide",
                id,
            });
        }
        Ok(())
    }

    async fn reorder_hero_slides(&self, ordered_ids: &[i32]) -> StoreResult<Vec<HeroSlide>> {
        self.reorder_group(SiblingGroup::HeroSlides, ordered_ids)
            .await?;
        self.list_hero_slides(true).await
    }
}
