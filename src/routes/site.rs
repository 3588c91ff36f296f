/**
 * Site Routes
 * Read-only aggregates for the public front end
 */
use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::models::{Category, HeroSlide, Link};
use crate::error::ApiResult;
use crate::site_config::{resolve_featured_links, SiteConfig, SiteSettings};
use crate::AppState;

/// Everything the home page renders, in one round trip
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub settings: SiteSettings,
    pub featured_links: Vec<Link>,
    pub hero_slides: Vec<HeroSlide>,
    pub categories: Vec<Category>,
}

async fn load_config(state: &AppState) -> ApiResult<SiteConfig> {
    Ok(SiteConfig::from_entries(state.store.list_config().await?))
}

/// GET /api/site
pub async fn get_site(State(state): State<AppState>) -> ApiResult<Json<SiteSettings>> {
    Ok(Json(load_config(&state).await?.settings()))
}

/// GET /api/home
pub async fn get_home(State(state): State<AppState>) -> ApiResult<Json<HomeResponse>> {
    let config = load_config(&state).await?;
    let links = state.store.list_links(None).await?;
    let featured_links = resolve_featured_links(&config.featured_link_ids(), &links);

    Ok(Json(HomeResponse {
        settings: config.settings(),
        featured_links,
        hero_slides: state.store.list_hero_slides(false).await?,
        categories: state.store.list_categories().await?,
    }))
}
