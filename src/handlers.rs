use crate::errors::AppError;
use crate::models::{
    AddItemRequest, AddItemResponse, AddThemeRequest, AddThemeResponse, DatesResponse,
    DeactivateRequest, DeactivateResponse, ItemId, SectionsResponse, StateResponse,
    ToggleCheckRequest, ToggleCheckResponse, TotalsResponse, WindowQuery,
};
use crate::state::AppState;
use crate::stats::{date_key, date_window, date_window_at, parse_date_key, MAX_WINDOW_DAYS};
use crate::storage::{persist_store, MemoryStore};
use crate::store::HabitStore;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use chrono::Local;
use tracing::{error, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.default_days))
}

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let habits = state.habits.lock().await;
    Json(StateResponse {
        items: habits.items().to_vec(),
        checks: habits.checks().clone(),
        themes: habits.themes().to_vec(),
    })
}

pub async fn get_dates(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Json<DatesResponse> {
    Json(DatesResponse {
        dates: window_for(&state, &query),
    })
}

pub async fn get_sections(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Json<SectionsResponse> {
    let dates = window_for(&state, &query);
    let habits = state.habits.lock().await;
    let sections = habits.sections(&dates);
    Json(SectionsResponse { dates, sections })
}

pub async fn get_totals(State(state): State<AppState>) -> Json<TotalsResponse> {
    let habits = state.habits.lock().await;
    Json(TotalsResponse {
        totals: habits.item_totals(),
    })
}

pub async fn add_item(
    State(state): State<AppState>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<AddItemResponse>, AppError> {
    let is_global = payload.is_global.unwrap_or(payload.theme_id.is_none());
    let added = commit(&state, |habits| {
        let added = habits.add_item(&payload.name, is_global, payload.theme_id);
        (added, added)
    })
    .await?;
    Ok(Json(AddItemResponse { added }))
}

/// The caller must have confirmed the removal; the request is rejected
/// otherwise.
pub async fn deactivate_item(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    Json(payload): Json<DeactivateRequest>,
) -> Result<Json<DeactivateResponse>, AppError> {
    if !payload.confirmed {
        return Err(AppError::confirmation_required());
    }

    let deactivated = commit(&state, |habits| {
        let deactivated = habits.deactivate_item(item_id);
        (deactivated, deactivated)
    })
    .await?;
    if !deactivated {
        return Err(AppError::not_found(format!("no habit with id {item_id}")));
    }
    Ok(Json(DeactivateResponse { deactivated }))
}

pub async fn toggle_check(
    State(state): State<AppState>,
    Json(payload): Json<ToggleCheckRequest>,
) -> Result<Json<ToggleCheckResponse>, AppError> {
    let date = parse_date_key(payload.date.trim()).ok_or_else(|| AppError::invalid_date(&payload.date))?;

    let checked = commit(&state, |habits| (habits.toggle_check(date, payload.item_id), true)).await?;

    Ok(Json(ToggleCheckResponse {
        date: date_key(date),
        item_id: payload.item_id,
        checked,
    }))
}

pub async fn add_theme(
    State(state): State<AppState>,
    Json(payload): Json<AddThemeRequest>,
) -> Result<Json<AddThemeResponse>, AppError> {
    let id = commit(&state, |habits| {
        let id = habits.add_theme(&payload.name);
        (id, id.is_some())
    })
    .await?;
    if let Some(id) = id {
        info!(id, "theme saved");
    }
    Ok(Json(AddThemeResponse {
        added: id.is_some(),
        id,
    }))
}

/// Runs `mutate` under the lock and flushes the store file when it reports a
/// change. A failed flush rolls the in-memory state back to the last snapshot
/// on disk, so what clients read always matches what was saved.
async fn commit<T>(
    state: &AppState,
    mutate: impl FnOnce(&mut HabitStore<MemoryStore>) -> (T, bool),
) -> Result<T, AppError> {
    let mut habits = state.habits.lock().await;
    let snapshot = habits.store().clone();
    let (result, changed) = mutate(&mut *habits);
    if changed {
        if let Err(err) = persist_store(&state.data_path, habits.store()).await {
            error!(
                "failed to save {}: {}, discarding change",
                state.data_path.display(),
                err.message
            );
            habits.restore(snapshot);
            return Err(err);
        }
    }
    Ok(result)
}

fn window_for(state: &AppState, query: &WindowQuery) -> Vec<String> {
    match query.days.as_deref() {
        Some(raw) => date_window(raw),
        None => date_window_at(
            Local::now().date_naive(),
            state.default_days.min(MAX_WINDOW_DAYS),
        ),
    }
}
