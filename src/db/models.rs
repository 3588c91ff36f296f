//! Database Models - structs representing database tables (used by sqlx/serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Category row. `links` is filled by the store when listing the directory.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub sort_order: i32,
    #[sqlx(skip)]
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Link row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: i32,
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub snapshot_url: Option<String>,
    pub description: Option<String>,
    pub clicks: i64,
    pub category_id: i32,
    pub sort_order: i32,
}

impl Link {
    /// True when the link carries a usable preview image.
    pub fn has_snapshot(&self) -> bool {
        self.snapshot_url
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// Link fields written by the admin console. `clicks` is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInput {
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub snapshot_url: Option<String>,
    pub description: Option<String>,
    pub category_id: i32,
}

/// Gallery image row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: i32,
    pub url: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// About content row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
    pub id: i32,
    pub title: String,
    pub description: String,
}

/// Site configuration entry
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SiteConfigEntry {
    pub key: String,
    pub value: String,
}

/// Hero slide row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlide {
    pub id: i32,
    pub title: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub code_snippet: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

/// Hero slide fields written by the admin console
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlideInput {
    pub title: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub code_snippet: Option<String>,
    /// Active when absent on create; unchanged when absent on update
    pub is_active: Option<bool>,
}
