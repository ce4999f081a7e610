use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ItemId = i64;
pub type ThemeId = i64;

/// Per-day completion marks: date (`YYYY-MM-DD`) -> item id -> checked.
///
/// Both levels are sparse; a missing entry reads as unchecked.
pub type CheckLedger = BTreeMap<String, BTreeMap<ItemId, bool>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitItem {
    pub id: ItemId,
    pub name: String,
    pub is_global: bool,
    pub active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
    #[serde(default)]
    pub item_ids: Vec<ItemId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub items: Vec<HabitItem>,
    pub checks: CheckLedger,
    pub themes: Vec<Theme>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    pub is_global: Option<bool>,
    pub theme_id: Option<ThemeId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub added: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeactivateRequest {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeactivateResponse {
    pub deactivated: bool,
}

#[derive(Debug, Deserialize)]
pub struct ToggleCheckRequest {
    pub date: String,
    pub item_id: ItemId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleCheckResponse {
    pub date: String,
    pub item_id: ItemId,
    pub checked: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddThemeRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddThemeResponse {
    pub added: bool,
    pub id: Option<ThemeId>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub days: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub short_date: String,
    pub score: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatesResponse {
    pub dates: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: ItemId,
    pub name: String,
    /// Checked state for each of the section's `recent_dates`.
    pub recent: Vec<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SectionView {
    pub title: String,
    pub theme_id: Option<ThemeId>,
    pub series: Vec<ChartPoint>,
    pub average: u32,
    pub on_target: bool,
    pub recent_dates: Vec<String>,
    pub items: Vec<ItemRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SectionsResponse {
    pub dates: Vec<String>,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemTotal {
    pub id: ItemId,
    pub name: String,
    pub created_at: String,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalsResponse {
    pub totals: Vec<ItemTotal>,
}
