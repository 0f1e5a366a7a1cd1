//! HTTP handlers for the campaign dashboard API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pulse_core::{Campaign, CampaignId, HealthStatus, ReadinessStatus};
use serde::{Deserialize, Serialize};

use crate::views::{CampaignFilter, DashboardOverview, LiveView, StatusFilter};
use crate::{AppState, Error, Result};

/// `GET /api/v1/campaigns` query string
#[derive(Debug, Default, Deserialize)]
pub struct CampaignQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

impl CampaignQuery {
    fn filter(&self) -> Result<CampaignFilter> {
        let status = match self.status.as_deref() {
            Some(value) => StatusFilter::parse(value)
                .ok_or_else(|| Error::InvalidRequest(format!("unknown status filter: {}", value)))?,
            None => StatusFilter::All,
        };
        Ok(CampaignFilter::new(
            self.search.as_deref().unwrap_or_default(),
            status,
        ))
    }
}

/// `GET /api/v1/campaigns/{id}/live` query string
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    /// Total reported by the directory, before filtering
    pub total: u64,
    pub matched: usize,
    pub campaigns: Vec<Campaign>,
}

// ============================================
// Health
// ============================================

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.health())
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessStatus>) {
    let readiness = state.readiness().await;
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}

// ============================================
// Directory
// ============================================

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardOverview>> {
    let listing = state.directory.list_campaigns().await?;
    Ok(Json(DashboardOverview::from_listing(&listing)))
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<CampaignQuery>,
) -> Result<Json<CampaignListResponse>> {
    let filter = query.filter()?;
    let listing = state.directory.list_campaigns().await?;
    let campaigns = filter.apply(&listing.campaigns);

    Ok(Json(CampaignListResponse {
        total: listing.total,
        matched: campaigns.len(),
        campaigns,
    }))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Campaign>> {
    let id = CampaignId::new(id);
    match state.directory.get_campaign(&id).await {
        Ok(campaign) => Ok(Json(campaign)),
        Err(e) if e.is_not_found() => Err(Error::CampaignNotFound(id.to_string())),
        Err(e) => Err(e.into()),
    }
}

// ============================================
// Live views
// ============================================

pub async fn open_live(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<LiveView>)> {
    let id = CampaignId::new(id);
    let opened = state.live.open(&id)?;
    let status = if opened.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    let view = state
        .live
        .view(&id, None, chrono::Utc::now())
        .ok_or_else(|| Error::LiveViewNotFound(id.to_string()))?;
    Ok((status, Json(view)))
}

pub async fn get_live(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<LiveView>> {
    let id = CampaignId::new(id);
    state
        .live
        .view(&id, query.range.as_deref(), chrono::Utc::now())
        .map(Json)
        .ok_or_else(|| Error::LiveViewNotFound(id.to_string()))
}

pub async fn close_live(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.live.close(&CampaignId::new(id));
    StatusCode::NO_CONTENT
}
