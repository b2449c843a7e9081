use crate::error::AppError;
use crate::models::leaderboard::*;
use crate::services::leaderboard as service;
use crate::state::LeaderboardStore;
use crate::validation;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn get_leaderboard(
    store: web::types::State<Arc<LeaderboardStore>>,
    path: web::types::Path<String>,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let competition_id = path.into_inner();
    validation::validate_competition_id(&competition_id)?;
    let limit = validation::validate_limit(query.limit)?;

    let snapshot = store.snapshot();
    let entries = snapshot.entries().map_err(AppError::Unavailable)?;
    let mut ranked = service::leaderboard_for(entries, &competition_id);
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    Ok(HttpResponse::Ok().json(&CompetitionLeaderboard {
        label: service::competition_label(&competition_id),
        competition_id,
        published: !ranked.is_empty(),
        top_performers_count: store.settings.top_performers_count,
        entries: ranked,
    }))
}

pub async fn get_competitions(
    store: web::types::State<Arc<LeaderboardStore>>,
) -> Result<HttpResponse, AppError> {
    let snapshot = store.snapshot();
    let entries = snapshot.entries().map_err(AppError::Unavailable)?;
    Ok(HttpResponse::Ok().json(&service::available_competitions(entries)))
}

pub async fn get_grouped_leaderboards(
    store: web::types::State<Arc<LeaderboardStore>>,
    query: web::types::Query<GroupedQuery>,
) -> Result<HttpResponse, AppError> {
    let snapshot = store.snapshot();
    let entries = snapshot.entries().map_err(AppError::Unavailable)?;
    let include_unpublished = query
        .include_unpublished
        .unwrap_or(store.settings.show_unpublished);

    let groups = if include_unpublished {
        service::group_by_competition(entries)
    } else {
        service::group_by_competition(&service::filter_published(entries))
    };
    Ok(HttpResponse::Ok().json(&groups))
}

pub async fn refresh(
    store: web::types::State<Arc<LeaderboardStore>>,
) -> Result<HttpResponse, AppError> {
    let snapshot = store.refresh().await?;
    let entries = snapshot.entries().map_err(AppError::Unavailable)?;
    Ok(HttpResponse::Ok().json(&RefreshResult {
        entries: entries.len(),
        competitions: service::available_competition_ids(entries).len(),
        fetched_at: snapshot.fetched_at.unwrap_or_else(chrono::Utc::now),
    }))
}
