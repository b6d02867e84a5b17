//! Request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Html;
use grid_model::{FarmId, RowIndex, SubtableId, SurveyKey, TableDescription, Year};
use grid_schema::{resolve_row, try_assemble};
use serde_json::Value;
use tracing::info;

use crate::error::{Result, SaveReply, ServerError};
use crate::markup::{render_page, render_row_fragment};
use crate::state::AppState;

/// Path of a grid page; also the target of its saves.
pub fn grid_endpoint(year: Year, farm: &str, table: &str, subtable: &str) -> String {
    format!("/app/{year}/bdgr/lista-ankiet/{farm}/{table}/{subtable}/")
}

fn parse_year(raw: &str) -> Result<Year> {
    raw.parse::<Year>()
        .map_err(|_| ServerError::NotFound(format!("year {raw}")))
}

fn parse_subtable(raw: &str) -> Result<SubtableId> {
    SubtableId::new(raw).map_err(|err| ServerError::NotFound(err.to_string()))
}

fn parse_farm(raw: &str) -> Result<FarmId> {
    FarmId::new(raw).map_err(|err| ServerError::BadRequest(err.to_string()))
}

fn survey_key(year: &str, farm: &str, subtable: &str) -> Result<SurveyKey> {
    Ok(SurveyKey::new(
        parse_year(year)?,
        parse_farm(farm)?,
        parse_subtable(subtable)?,
    ))
}

/// Run catalog and store access on the blocking pool.
async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await?
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn grid_page(
    State(state): State<AppState>,
    Path((year, farm, table, subtable)): Path<(String, String, String, String)>,
) -> Result<Html<String>> {
    let key = survey_key(&year, &farm, &subtable)?;
    let endpoint = grid_endpoint(key.year, &farm, &table, &subtable);
    let page = blocking(move || {
        let description = try_assemble(
            state.metadata.as_ref(),
            state.store.as_ref(),
            &key,
            &endpoint,
        )?;
        Ok(render_page(&description)?)
    })
    .await?;
    Ok(Html(page))
}

pub async fn row_fragment(
    State(state): State<AppState>,
    Path((year, farm, _table, subtable, code, index)): Path<(
        String,
        String,
        String,
        String,
        String,
        String,
    )>,
) -> Result<Html<String>> {
    let key = survey_key(&year, &farm, &subtable)?;
    let index = index
        .parse::<RowIndex>()
        .map_err(|err| ServerError::BadRequest(err.to_string()))?;
    let fragment = blocking(move || {
        let metadata = state.metadata.as_ref();
        let variant = metadata.subtable(key.year, &key.subtable)?.variant()?;
        if !variant.is_dynamic() {
            return Err(ServerError::NotFound(format!(
                "subtable {} has no dynamic rows",
                key.subtable
            )));
        }
        if !metadata
            .codes(key.year, &key.subtable)?
            .iter()
            .any(|entry| entry.code == code)
        {
            return Err(ServerError::NotFound(format!("code {code}")));
        }
        let row = resolve_row(metadata, key.year, &key.subtable, &code, index)?;
        let columns = metadata.columns(key.year, &key.subtable)?;
        Ok(render_row_fragment(&columns, variant, &row)?)
    })
    .await?;
    Ok(Html(fragment))
}

/// Replace the saved answers of one survey with the posted JSON.
pub async fn save_grid(
    State(state): State<AppState>,
    Path((year, farm, _table, subtable)): Path<(String, String, String, String)>,
    body: String,
) -> Result<Json<SaveReply>> {
    let key = survey_key(&year, &farm, &subtable)?;
    let payload: Value = serde_json::from_str(&body)
        .map_err(|err| ServerError::BadRequest(format!("invalid JSON: {err}")))?;
    let (key, stored) = blocking(move || {
        state.metadata.subtable(key.year, &key.subtable)?;
        let stored = state.store.replace(&key, &payload.to_string())?;
        Ok((key, stored))
    })
    .await?;
    info!(%key, modified = %stored.modified, bytes = stored.payload.len(), "survey saved");
    Ok(Json(SaveReply::ok()))
}

pub async fn description(
    State(state): State<AppState>,
    Path((year, farm, subtable)): Path<(String, String, String)>,
) -> Result<Json<TableDescription>> {
    let key = survey_key(&year, &farm, &subtable)?;
    let description = blocking(move || {
        let record = state.metadata.subtable(key.year, &key.subtable)?;
        let endpoint = grid_endpoint(
            key.year,
            key.farm.as_str(),
            &record.table,
            key.subtable.as_str(),
        );
        Ok(try_assemble(
            state.metadata.as_ref(),
            state.store.as_ref(),
            &key,
            &endpoint,
        )?)
    })
    .await?;
    Ok(Json(description))
}
