//! Habit state container.
//!
//! `HabitStore` owns the items, the check ledger and the themes, and writes
//! all three through its [`KeyValueStore`] after every mutation. Loading is
//! forgiving: each key that is absent or does not parse falls back to its
//! default on its own.

use crate::models::{
    CheckLedger, HabitItem, ItemId, ItemRow, ItemTotal, SectionView, Theme, ThemeId,
};
use crate::stats::{
    average_score, chart_series, date_key, is_checked, total_completions, GOAL_SCORE, RECENT_DAYS,
};
use crate::storage::KeyValueStore;
use chrono::{DateTime, Local, NaiveDate};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, warn};

pub const ITEMS_KEY: &str = "habit_items_v3";
pub const CHECKS_KEY: &str = "habit_checks";
pub const THEMES_KEY: &str = "habit_themes";

pub const OVERALL_TITLE: &str = "Overall";

fn seed_items() -> Vec<HabitItem> {
    vec![HabitItem {
        id: 1,
        name: "물 마시기".to_string(),
        is_global: true,
        active: true,
        created_at: "2025-01-01".to_string(),
    }]
}

pub struct HabitStore<S> {
    store: S,
    items: Vec<HabitItem>,
    checks: CheckLedger,
    themes: Vec<Theme>,
    last_id: i64,
}

impl<S: KeyValueStore> HabitStore<S> {
    pub fn load(store: S) -> Self {
        let items = read_key(&store, ITEMS_KEY, seed_items);
        let checks = read_key(&store, CHECKS_KEY, CheckLedger::new);
        let themes: Vec<Theme> = read_key(&store, THEMES_KEY, Vec::new);

        let last_id = items
            .iter()
            .map(|item| item.id)
            .chain(themes.iter().map(|theme| theme.id))
            .max()
            .unwrap_or(0);

        info!(
            items = items.len(),
            days = checks.len(),
            themes = themes.len(),
            "loaded habit state"
        );

        Self {
            store,
            items,
            checks,
            themes,
            last_id,
        }
    }

    pub fn items(&self) -> &[HabitItem] {
        &self.items
    }

    pub fn checks(&self) -> &CheckLedger {
        &self.checks
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn add_item(&mut self, name: &str, is_global: bool, theme_id: Option<ThemeId>) -> bool {
        self.add_item_at(name, is_global, theme_id, Local::now())
    }

    /// Appends a habit created at `now`. A blank name is a no-op and returns
    /// `false`. The habit joins `theme_id` only when that theme exists.
    pub fn add_item_at(
        &mut self,
        name: &str,
        is_global: bool,
        theme_id: Option<ThemeId>,
        now: DateTime<Local>,
    ) -> bool {
        let name = name.trim();
        if name.is_empty() {
            debug!("ignoring habit with blank name");
            return false;
        }
        let Some(id) = self.next_id(now.timestamp_millis()) else {
            return false;
        };
        self.items.push(HabitItem {
            id,
            name: name.to_string(),
            is_global,
            active: true,
            created_at: date_key(now.date_naive()),
        });
        if let Some(theme_id) = theme_id {
            match self.themes.iter_mut().find(|theme| theme.id == theme_id) {
                Some(theme) => theme.item_ids.push(id),
                None => warn!(theme_id, "habit added without a theme, theme not found"),
            }
        }

        info!(id, name, is_global, ?theme_id, "added habit");
        self.persist();
        true
    }

    /// Flips the mark for `item_id` on `date` and returns the new value.
    pub fn toggle_check(&mut self, date: NaiveDate, item_id: ItemId) -> bool {
        let key = date_key(date);
        let slot = self
            .checks
            .entry(key.clone())
            .or_default()
            .entry(item_id)
            .or_insert(false);
        *slot = !*slot;
        let checked = *slot;

        debug!(date = %key, item_id, checked, "toggled check");
        self.persist();
        checked
    }

    /// Soft-deletes a habit. Its check history stays in the ledger.
    pub fn deactivate_item(&mut self, item_id: ItemId) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == item_id) else {
            debug!(item_id, "no habit to deactivate");
            return false;
        };
        item.active = false;

        info!(item_id, "deactivated habit");
        self.persist();
        true
    }

    pub fn add_theme(&mut self, name: &str) -> Option<ThemeId> {
        self.add_theme_at(name, Local::now())
    }

    pub fn add_theme_at(&mut self, name: &str, now: DateTime<Local>) -> Option<ThemeId> {
        let name = name.trim();
        if name.is_empty() {
            debug!("ignoring theme with blank name");
            return None;
        }

        let id = self.next_id(now.timestamp_millis())?;
        self.themes.push(Theme {
            id,
            name: name.to_string(),
            item_ids: Vec::new(),
        });

        info!(id, name, "added theme");
        self.persist();
        Some(id)
    }

    pub fn total_completions(&self, item_id: ItemId) -> usize {
        total_completions(&self.checks, item_id)
    }

    /// Active global habits, in creation order.
    pub fn overall_items(&self) -> Vec<&HabitItem> {
        self.items
            .iter()
            .filter(|item| item.is_global && item.active)
            .collect()
    }

    /// Active habits listed by `theme`, in the theme's order.
    pub fn theme_items(&self, theme: &Theme) -> Vec<&HabitItem> {
        theme
            .item_ids
            .iter()
            .filter_map(|id| self.items.iter().find(|item| item.id == *id))
            .filter(|item| item.active)
            .collect()
    }

    /// The Overall section followed by one section per theme, all computed
    /// over `dates`.
    pub fn sections(&self, dates: &[String]) -> Vec<SectionView> {
        let mut sections = Vec::with_capacity(self.themes.len() + 1);
        sections.push(self.section(OVERALL_TITLE, None, &self.overall_items(), dates));
        for theme in &self.themes {
            sections.push(self.section(&theme.name, Some(theme.id), &self.theme_items(theme), dates));
        }
        sections
    }

    pub fn item_totals(&self) -> Vec<ItemTotal> {
        self.items
            .iter()
            .filter(|item| item.active)
            .map(|item| ItemTotal {
                id: item.id,
                name: item.name.clone(),
                created_at: item.created_at.clone(),
                total: self.total_completions(item.id),
            })
            .collect()
    }

    fn section(
        &self,
        title: &str,
        theme_id: Option<ThemeId>,
        habits: &[&HabitItem],
        dates: &[String],
    ) -> SectionView {
        let series = chart_series(&self.checks, habits, dates);
        let average = average_score(&series);
        let recent_dates = dates[dates.len().saturating_sub(RECENT_DAYS)..].to_vec();
        let items = habits
            .iter()
            .map(|item| ItemRow {
                id: item.id,
                name: item.name.clone(),
                recent: recent_dates
                    .iter()
                    .map(|date| is_checked(&self.checks, date, item.id))
                    .collect(),
            })
            .collect();

        SectionView {
            title: title.to_string(),
            theme_id,
            series,
            average,
            on_target: average >= GOAL_SCORE,
            recent_dates,
            items,
        }
    }

    /// Next id, never below `now_millis` and always above every id handed out
    /// or loaded. `None` once the id space is exhausted.
    fn next_id(&mut self, now_millis: i64) -> Option<i64> {
        let Some(floor) = self.last_id.checked_add(1) else {
            warn!(last_id = self.last_id, "habit id space exhausted");
            return None;
        };
        let id = now_millis.max(floor);
        self.last_id = id;
        Some(id)
    }

    /// Replaces the in-memory state with what `store` holds. Ids keep
    /// increasing across the swap.
    pub fn restore(&mut self, store: S) {
        let last_id = self.last_id;
        *self = Self::load(store);
        self.last_id = self.last_id.max(last_id);
    }

    fn persist(&mut self) {
        write_key(&mut self.store, ITEMS_KEY, &self.items);
        write_key(&mut self.store, CHECKS_KEY, &self.checks);
        write_key(&mut self.store, THEMES_KEY, &self.themes);
    }
}

fn read_key<S, T>(store: &S, key: &str, fallback: impl FnOnce() -> T) -> T
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    match store.get(key) {
        Some(raw) if !raw.is_empty() => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, "stored value is malformed, using default: {err}");
                fallback()
            }
        },
        _ => fallback(),
    }
}

fn write_key<S, T>(store: &mut S, key: &str, value: &T)
where
    S: KeyValueStore,
    T: Serialize + ?Sized,
{
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, raw),
        Err(err) => error!(key, "failed to serialize habit state: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn at(year: i32, month: u32, day: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap()
    }

    fn empty_store() -> HabitStore<MemoryStore> {
        let mut raw = MemoryStore::new();
        raw.set(ITEMS_KEY, "[]".to_string());
        HabitStore::load(raw)
    }

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn first_load_seeds_one_global_item() {
        let habits = HabitStore::load(MemoryStore::new());
        assert_eq!(habits.items().len(), 1);
        let seed = &habits.items()[0];
        assert_eq!(seed.name, "물 마시기");
        assert!(seed.is_global && seed.active);
        assert!(habits.checks().is_empty());
        assert!(habits.themes().is_empty());
    }

    #[test]
    fn malformed_keys_fall_back_independently() {
        let mut raw = MemoryStore::new();
        raw.set(ITEMS_KEY, "{not json".to_string());
        raw.set(CHECKS_KEY, r#"{"2026-01-01":{"5":true}}"#.to_string());
        raw.set(THEMES_KEY, "42".to_string());

        let habits = HabitStore::load(raw);
        assert_eq!(habits.items(), seed_items().as_slice());
        assert_eq!(habits.total_completions(5), 1);
        assert!(habits.themes().is_empty());
    }

    #[test]
    fn theme_without_item_ids_loads_empty() {
        let mut raw = MemoryStore::new();
        raw.set(THEMES_KEY, r#"[{"id":3,"name":"Morning"}]"#.to_string());

        let habits = HabitStore::load(raw);
        assert_eq!(habits.themes()[0].item_ids, Vec::<ItemId>::new());
    }

    #[test]
    fn blank_names_are_ignored() {
        let mut habits = empty_store();
        assert!(!habits.add_item("", true, None));
        assert!(!habits.add_item("   ", true, None));
        assert!(habits.items().is_empty());
        assert_eq!(habits.add_theme("  "), None);
        assert!(habits.themes().is_empty());
    }

    #[test]
    fn add_item_records_creation_date() {
        let mut habits = empty_store();
        let now = at(2026, 4, 12);
        assert!(habits.add_item_at("  Read ", false, None, now));

        assert_eq!(habits.items().len(), 1);
        let item = &habits.items()[0];
        assert_eq!(item.name, "Read");
        assert!(item.active);
        assert!(!item.is_global);
        assert_eq!(item.created_at, "2026-04-12");
        assert_eq!(item.id, now.timestamp_millis());
    }

    #[test]
    fn add_item_today_uses_local_date() {
        let mut habits = empty_store();
        assert!(habits.add_item("Read", true, None));
        assert_eq!(habits.items()[0].created_at, date_key(Local::now().date_naive()));
    }

    #[test]
    fn ids_increase_within_the_same_instant() {
        let mut habits = empty_store();
        let now = at(2026, 4, 12);
        habits.add_item_at("a", true, None, now);
        habits.add_item_at("b", true, None, now);
        let theme = habits.add_theme_at("t", now).unwrap();

        let ids: Vec<ItemId> = habits.items().iter().map(|item| item.id).collect();
        assert!(ids[0] < ids[1]);
        assert!(ids[1] < theme);
    }

    #[test]
    fn ids_stay_above_loaded_ones() {
        let mut raw = MemoryStore::new();
        let future = at(2030, 1, 1).timestamp_millis();
        raw.set(
            ITEMS_KEY,
            format!(r#"[{{"id":{future},"name":"x","isGlobal":true,"active":true,"createdAt":"2030-01-01"}}]"#),
        );
        let mut habits = HabitStore::load(raw);
        habits.add_item_at("y", true, None, at(2026, 1, 1));
        assert_eq!(habits.items()[1].id, future + 1);
    }

    #[test]
    fn themed_item_joins_its_theme() {
        let mut habits = empty_store();
        let now = at(2026, 2, 1);
        let theme = habits.add_theme_at("Morning", now).unwrap();
        assert!(habits.add_item_at("Stretch", false, Some(theme), now));

        let item_id = habits.items()[0].id;
        assert_eq!(habits.themes()[0].item_ids, vec![item_id]);
        assert!(habits.overall_items().is_empty());
        assert_eq!(habits.theme_items(&habits.themes()[0]).len(), 1);
    }

    #[test]
    fn unknown_theme_still_adds_the_habit() {
        let mut habits = empty_store();
        let now = at(2026, 2, 1);
        let theme = habits.add_theme_at("Morning", now).unwrap();

        assert!(habits.add_item_at("Stretch", false, Some(404), now));
        assert_eq!(habits.items().len(), 1);
        assert_eq!(habits.items()[0].name, "Stretch");
        assert!(!habits.items()[0].is_global);
        assert_eq!(habits.themes().len(), 1);
        assert_eq!(habits.themes()[0].id, theme);
        assert!(habits.themes()[0].item_ids.is_empty());
    }

    #[test]
    fn exhausted_id_space_is_a_no_op() {
        let mut raw = MemoryStore::new();
        raw.set(
            ITEMS_KEY,
            format!(r#"[{{"id":{},"name":"x","isGlobal":true,"active":true,"createdAt":"2030-01-01"}}]"#, i64::MAX),
        );
        let mut habits = HabitStore::load(raw);

        assert!(!habits.add_item("y", true, None));
        assert_eq!(habits.add_theme("t"), None);
        assert_eq!(habits.items().len(), 1);
        assert!(habits.themes().is_empty());
    }

    #[test]
    fn restore_discards_unsaved_changes() {
        let mut habits = empty_store();
        let now = at(2026, 6, 1);
        habits.add_item_at("Walk", true, None, now);
        let walk = habits.items()[0].id;
        let snapshot = habits.store().clone();

        habits.toggle_check(date("2026-06-01"), walk);
        habits.add_theme_at("Later", now);
        habits.restore(snapshot);

        assert!(habits.checks().is_empty());
        assert!(habits.themes().is_empty());
        assert_eq!(habits.items().len(), 1);

        let theme = habits.add_theme_at("Again", now).unwrap();
        assert!(theme > walk + 1);
    }

    #[test]
    fn toggle_twice_restores_original() {
        let mut habits = empty_store();
        let day = date("2026-01-03");
        assert!(habits.toggle_check(day, 9));
        assert!(!habits.toggle_check(day, 9));
        assert_eq!(habits.checks()["2026-01-03"].get(&9), Some(&false));
        assert!(habits.toggle_check(day, 9));
    }

    #[test]
    fn deactivate_keeps_history() {
        let mut habits = empty_store();
        habits.add_item_at("Run", true, None, at(2026, 1, 1));
        let id = habits.items()[0].id;
        habits.toggle_check(date("2025-06-01"), id);
        habits.toggle_check(date("2026-01-01"), id);
        let before = habits.checks().clone();

        assert!(habits.deactivate_item(id));
        assert!(!habits.items()[0].active);
        assert_eq!(habits.checks(), &before);
        assert_eq!(habits.total_completions(id), 2);
        assert!(habits.overall_items().is_empty());
        assert!(habits.item_totals().is_empty());
        assert!(!habits.deactivate_item(id + 1000));
    }

    #[test]
    fn deactivated_theme_members_are_hidden() {
        let mut habits = empty_store();
        let now = at(2026, 2, 1);
        let theme = habits.add_theme_at("Evening", now).unwrap();
        habits.add_item_at("Read", false, Some(theme), now);
        habits.add_item_at("Floss", false, Some(theme), now);
        let read = habits.items()[0].id;
        habits.deactivate_item(read);

        let listed = habits.theme_items(&habits.themes()[0]);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Floss");
        assert_eq!(habits.themes()[0].item_ids.len(), 2);
    }

    #[test]
    fn sections_cover_overall_and_each_theme() {
        let mut habits = empty_store();
        let now = at(2026, 3, 10);
        habits.add_item_at("Water", true, None, now);
        let theme = habits.add_theme_at("Fitness", now).unwrap();
        habits.add_item_at("Run", false, Some(theme), now);
        habits.add_item_at("Lift", false, Some(theme), now);
        let run = habits.items()[1].id;
        let lift = habits.items()[2].id;
        habits.toggle_check(date("2026-03-10"), run);
        habits.toggle_check(date("2026-03-10"), lift);
        habits.toggle_check(date("2026-03-09"), run);

        let today = date("2026-03-10");
        let dates: Vec<String> = (0..7)
            .rev()
            .map(|offset| date_key(today - Duration::days(offset)))
            .collect();
        let sections = habits.sections(&dates);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, OVERALL_TITLE);
        assert_eq!(sections[0].average, 0);
        assert!(!sections[0].on_target);

        let fitness = &sections[1];
        assert_eq!(fitness.theme_id, Some(theme));
        assert_eq!(fitness.series.len(), 7);
        assert_eq!(fitness.series[6].score, 100);
        assert_eq!(fitness.series[5].score, 50);
        assert_eq!(fitness.average, 21);
        assert_eq!(fitness.recent_dates.len(), RECENT_DAYS);
        assert_eq!(fitness.items[0].recent, vec![false, false, false, true, true]);
        assert_eq!(fitness.items[1].recent, vec![false, false, false, false, true]);
    }

    #[test]
    fn short_window_limits_recent_dates() {
        let habits = HabitStore::load(MemoryStore::new());
        let dates = vec!["2026-01-01".to_string(), "2026-01-02".to_string()];
        let sections = habits.sections(&dates);
        assert_eq!(sections[0].recent_dates, dates);
        assert_eq!(sections[0].items[0].recent, vec![false, false]);
    }

    #[test]
    fn every_mutation_writes_all_keys() {
        let mut habits = empty_store();
        habits.add_theme_at("Focus", at(2026, 5, 5));
        let raw = habits.store();
        assert!(raw.get(ITEMS_KEY).is_some());
        assert!(raw.get(CHECKS_KEY).is_some());
        assert!(raw.get(THEMES_KEY).unwrap().contains("Focus"));
    }

    #[test]
    fn reload_restores_identical_state() {
        let mut habits = empty_store();
        let now = at(2026, 5, 5);
        let theme = habits.add_theme_at("Focus", now).unwrap();
        habits.add_item_at("Write", false, Some(theme), now);
        habits.add_item_at("Walk", true, None, now);
        let walk = habits.items()[1].id;
        habits.toggle_check(date("2026-05-05"), walk);
        habits.deactivate_item(walk);

        let reloaded = HabitStore::load(habits.store().clone());
        assert_eq!(reloaded.items(), habits.items());
        assert_eq!(reloaded.checks(), habits.checks());
        assert_eq!(reloaded.themes(), habits.themes());
    }
}
