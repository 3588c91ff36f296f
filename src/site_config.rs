/**
 * Site Configuration
 * Typed view over the flat key/value `site_config` table
 */
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::db::models::{Link, SiteConfigEntry};

/// Number of showcase links the home page wants.
pub const FEATURED_LINK_TARGET: usize = 3;

pub const ADMIN_PASSWORD_KEY: &str = "admin_password";
pub const FEATURED_LINKS_KEY: &str = "featured_links";
pub const LINK_TAGS_KEY: &str = "link_tags";

const ADMIN_TITLE_PREFIX: &str = "admin_title_";

/// Shape and fallback of a recognised key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigDefault {
    /// Plain string; blank or absent values fall back to the default.
    Text(&'static str),
    /// JSON array of integer link ids; anything unparsable reads as empty.
    Ids,
    /// JSON array of strings; anything unparsable reads as the default list.
    Strings(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfigKeyDef {
    pub key: &'static str,
    pub default: ConfigDefault,
}

const DEFAULT_LINK_TAGS: &[&str] = &[
    "Design",
    "Illustration",
    "Photography",
    "3D",
    "Typography",
    "Color",
    "Inspiration",
    "Tools",
];

static DEFAULT_ADMIN_TITLE: ConfigKeyDef = ConfigKeyDef {
    key: "admin_title_*",
    default: ConfigDefault::Text("Artistic Nav Admin"),
};

/// Every key the site understands. Readers go through `lookup` so they all
/// agree on parsing and fallbacks.
pub const REGISTRY: &[ConfigKeyDef] = &[
    ConfigKeyDef {
        key: "hero_title",
        default: ConfigDefault::Text("Artistic Nav"),
    },
    ConfigKeyDef {
        key: "hero_subtitle",
        default: ConfigDefault::Text("A curated collection of creative tools and inspiration"),
    },
    ConfigKeyDef {
        key: "site_name",
        default: ConfigDefault::Text("Artistic Nav"),
    },
    ConfigKeyDef {
        key: "site_slogan",
        default: ConfigDefault::Text("Discover. Create. Inspire."),
    },
    ConfigKeyDef {
        key: "footer_copyright",
        default: ConfigDefault::Text("© Artistic Nav. All rights reserved."),
    },
    ConfigKeyDef {
        key: "contact_email",
        default: ConfigDefault::Text("hello@artistic-nav.local"),
    },
    ConfigKeyDef {
        key: "admin_title_dashboard",
        default: ConfigDefault::Text("Dashboard"),
    },
    ConfigKeyDef {
        key: "admin_title_categories",
        default: ConfigDefault::Text("Categories"),
    },
    ConfigKeyDef {
        key: "admin_title_links",
        default: ConfigDefault::Text("Links"),
    },
    ConfigKeyDef {
        key: "admin_title_gallery",
        default: ConfigDefault::Text("Gallery"),
    },
    ConfigKeyDef {
        key: "admin_title_hero",
        default: ConfigDefault::Text("Hero Slides"),
    },
    ConfigKeyDef {
        key: "admin_title_about",
        default: ConfigDefault::Text("About"),
    },
    ConfigKeyDef {
        key: "admin_title_config",
        default: ConfigDefault::Text("Site Settings"),
    },
    ConfigKeyDef {
        key: FEATURED_LINKS_KEY,
        default: ConfigDefault::Ids,
    },
    ConfigKeyDef {
        key: LINK_TAGS_KEY,
        default: ConfigDefault::Strings(DEFAULT_LINK_TAGS),
    },
    ConfigKeyDef {
        key: ADMIN_PASSWORD_KEY,
        default: ConfigDefault::Text("admin123"),
    },
];

/// Find the definition of `key`. Unlisted `admin_title_*` keys share one generic
/// default; any other unlisted key is unknown.
pub fn lookup(key: &str) -> Option<&'static ConfigKeyDef> {
    REGISTRY
        .iter()
        .find(|def| def.key == key)
        .or_else(|| key.starts_with(ADMIN_TITLE_PREFIX).then_some(&DEFAULT_ADMIN_TITLE))
}

/// A resolved configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Text(String),
    Ids(Vec<i32>),
    Strings(Vec<String>),
}

/// Snapshot of the `site_config` table with typed readers.
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    values: HashMap<String, String>,
}

impl SiteConfig {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = SiteConfigEntry>,
    {
        Self {
            values: entries.into_iter().map(|e| (e.key, e.value)).collect(),
        }
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Resolve a recognised key to its typed value, applying the fallback.
    /// Returns `None` for keys outside the registry.
    pub fn resolve(&self, key: &str) -> Option<ConfigValue> {
        let def = lookup(key)?;
        let raw = self.raw(key);

        let value = match def.default {
            ConfigDefault::Text(default) => ConfigValue::Text(
                raw.filter(|v| !v.trim().is_empty())
                    .unwrap_or(default)
                    .to_string(),
            ),
            ConfigDefault::Ids => ConfigValue::Ids(
                raw.and_then(|v| serde_json::from_str::<Vec<i32>>(v).ok())
                    .unwrap_or_default(),
            ),
            ConfigDefault::Strings(default) => ConfigValue::Strings(
                raw.and_then(|v| serde_json::from_str::<Vec<String>>(v).ok())
                    .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect()),
            ),
        };

        Some(value)
    }

    /// Text reader. Keys outside the registry read as their raw value or "".
    pub fn text(&self, key: &str) -> String {
        match self.resolve(key) {
            Some(ConfigValue::Text(value)) => value,
            _ => self.raw(key).unwrap_or_default().to_string(),
        }
    }

    pub fn featured_link_ids(&self) -> Vec<i32> {
        match self.resolve(FEATURED_LINKS_KEY) {
            Some(ConfigValue::Ids(ids)) => ids,
            _ => Vec::new(),
        }
    }

    pub fn link_tags(&self) -> Vec<String> {
        match self.resolve(LINK_TAGS_KEY) {
            Some(ConfigValue::Strings(tags)) => tags,
            _ => Vec::new(),
        }
    }

    /// Effective admin password: the stored value, or the built-in fallback.
    pub fn admin_password(&self) -> String {
        self.text(ADMIN_PASSWORD_KEY)
    }

    /// Public, typed settings for the front end. Never includes the password.
    pub fn settings(&self) -> SiteSettings {
        let mut admin_titles: BTreeMap<String, String> = REGISTRY
            .iter()
            .filter_map(|def| def.key.strip_prefix(ADMIN_TITLE_PREFIX))
            .map(|section| (section.to_string(), String::new()))
            .collect();
        for key in self.values.keys() {
            if let Some(section) = key.strip_prefix(ADMIN_TITLE_PREFIX) {
                admin_titles.insert(section.to_string(), String::new());
            }
        }
        for (section, title) in admin_titles.iter_mut() {
            *title = self.text(&format!("{}{}", ADMIN_TITLE_PREFIX, section));
        }

        SiteSettings {
            hero_title: self.text("hero_title"),
            hero_subtitle: self.text("hero_subtitle"),
            site_name: self.text("site_name"),
            site_slogan: self.text("site_slogan"),
            footer_copyright: self.text("footer_copyright"),
            contact_email: self.text("contact_email"),
            featured_link_ids: self.featured_link_ids(),
            link_tags: self.link_tags(),
            admin_titles,
        }
    }
}

/// Resolved settings served by `GET /api/site`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub site_name: String,
    pub site_slogan: String,
    pub footer_copyright: String,
    pub contact_email: String,
    pub featured_link_ids: Vec<i32>,
    pub link_tags: Vec<String>,
    pub admin_titles: BTreeMap<String, String>,
}

/// Pick the home page showcase links.
///
/// Configured ids come first in their configured order (unknown ids are
/// skipped). The list is then topped up to `FEATURED_LINK_TARGET` with the
/// most clicked links that have a snapshot, then with the most clicked links
/// of any kind. Equal click counts keep ascending id order.
pub fn resolve_featured_links(configured: &[i32], links: &[Link]) -> Vec<Link> {
    let by_id: HashMap<i32, &Link> = links.iter().map(|l| (l.id, l)).collect();
    let mut selected: Vec<Link> = Vec::new();
    let mut taken: HashSet<i32> = HashSet::new();

    for id in configured {
        if let Some(link) = by_id.get(id) {
            if taken.insert(link.id) {
                selected.push((*link).clone());
            }
        }
    }

    let mut popular: Vec<&Link> = links.iter().collect();
    popular.sort_by(|a, b| b.clicks.cmp(&a.clicks).then(a.id.cmp(&b.id)));

    for with_snapshot_only in [true, false] {
        for link in &popular {
            if selected.len() >= FEATURED_LINK_TARGET {
                return selected;
            }
            if with_snapshot_only && !link.has_snapshot() {
                continue;
            }
            if taken.insert(link.id) {
                selected.push((*link).clone());
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: &str) -> SiteConfigEntry {
        SiteConfigEntry {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn link(id: i32, clicks: i64, snapshot: Option<&str>) -> Link {
        Link {
            id,
            title: format!("Link {}", id),
            url: format!("https://example.com/{}", id),
            icon: None,
            snapshot_url: snapshot.map(str::to_string),
            description: None,
            clicks,
            category_id: 1,
            sort_order: id,
        }
    }

    fn ids(links: &[Link]) -> Vec<i32> {
        links.iter().map(|l| l.id).collect()
    }

    /// Ten links; 1-5 have snapshots with clicks [10, 5, 20, 1, 0], 6-10 have
    /// none but higher click counts.
    fn pool() -> Vec<Link> {
        let mut links = vec![
            link(1, 10, Some("/snap/1.png")),
            link(2, 5, Some("/snap/2.png")),
            link(3, 20, Some("/snap/3.png")),
            link(4, 1, Some("/snap/4.png")),
            link(5, 0, Some("/snap/5.png")),
        ];
        for id in 6..=10 {
            links.push(link(id, 100 + id as i64, None));
        }
        links
    }

    #[test]
    fn test_text_defaults_when_absent_or_blank() {
        let config = SiteConfig::from_entries(vec![entry("site_name", "   ")]);
        assert_eq!(config.text("site_name"), "Artistic Nav");
        assert_eq!(config.text("hero_title"), "Artistic Nav");
    }

    #[test]
    fn test_text_uses_stored_value() {
        let config = SiteConfig::from_entries(vec![entry("site_slogan", "Make things")]);
        assert_eq!(config.text("site_slogan"), "Make things");
    }

    #[test]
    fn test_unlisted_admin_title_uses_generic_default() {
        let config = SiteConfig::default();
        assert_eq!(config.text("admin_title_stats"), "Artistic Nav Admin");
        assert_eq!(config.text("admin_title_links"), "Links");
    }

    #[test]
    fn test_unknown_key_is_not_resolved() {
        let config = SiteConfig::from_entries(vec![entry("theme", "dark")]);
        assert_eq!(config.resolve("theme"), None);
        assert_eq!(config.text("theme"), "dark");
    }

    #[test]
    fn test_featured_ids_parse_failure_reads_empty() {
        let config = SiteConfig::from_entries(vec![entry("featured_links", "[1, \"two\"")]);
        assert!(config.featured_link_ids().is_empty());

        let config = SiteConfig::from_entries(vec![entry("featured_links", "[4, 2]")]);
        assert_eq!(config.featured_link_ids(), vec![4, 2]);
    }

    #[test]
    fn test_link_tags_fallback_on_invalid_json() {
        let config = SiteConfig::from_entries(vec![entry("link_tags", "not json")]);
        assert_eq!(config.link_tags().len(), DEFAULT_LINK_TAGS.len());

        let config = SiteConfig::from_entries(vec![entry("link_tags", "[\"Fonts\"]")]);
        assert_eq!(config.link_tags(), vec!["Fonts".to_string()]);
    }

    #[test]
    fn test_admin_password_fallback() {
        assert_eq!(SiteConfig::default().admin_password(), "admin123");
        let config = SiteConfig::from_entries(vec![entry("admin_password", "s3cret")]);
        assert_eq!(config.admin_password(), "s3cret");
    }

    #[test]
    fn test_settings_collect_stored_admin_titles() {
        let config = SiteConfig::from_entries(vec![entry("admin_title_stats", "Numbers")]);
        let settings = config.settings();
        assert_eq!(settings.admin_titles.get("stats").unwrap(), "Numbers");
        assert_eq!(settings.admin_titles.get("gallery").unwrap(), "Gallery");
    }

    #[test]
    fn test_featured_fill_prefers_snapshot_links_by_clicks() {
        let featured = resolve_featured_links(&[], &pool());
        assert_eq!(ids(&featured), vec![3, 1, 2]);
    }

    #[test]
    fn test_featured_partial_configuration_backfills() {
        let mut links = pool();
        links.push(link(7_000, 0, None));
        let config = SiteConfig::from_entries(vec![entry("featured_links", "[7, 999]")]);

        let featured = resolve_featured_links(&config.featured_link_ids(), &links);
        assert_eq!(ids(&featured), vec![7, 3, 1]);
    }

    #[test]
    fn test_featured_falls_back_to_any_popular_link() {
        let links = vec![
            link(1, 3, Some("/snap/1.png")),
            link(2, 50, None),
            link(3, 40, Some("")),
            link(4, 60, None),
        ];
        let featured = resolve_featured_links(&[], &links);
        assert_eq!(ids(&featured), vec![1, 4, 2]);
    }

    #[test]
    fn test_featured_keeps_all_curated_ids_and_skips_duplicates() {
        let featured = resolve_featured_links(&[5, 4, 5, 2, 1], &pool());
        assert_eq!(ids(&featured), vec![5, 4, 2, 1]);
    }

    #[test]
    fn test_featured_with_small_pool() {
        let links = vec![link(1, 0, None)];
        assert_eq!(ids(&resolve_featured_links(&[], &links)), vec![1]);
        assert!(resolve_featured_links(&[1], &[]).is_empty());
    }
}
