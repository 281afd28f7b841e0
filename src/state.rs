use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::data::cache::DatasetCache;
use crate::data::charts::ChartData;
use crate::data::filter::{filter, Dimension, FilterSelection};
use crate::data::model::{Dataset, View};
use crate::data::summary::{summarize, Summary};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Load-once cache of the current source (None until a source is chosen).
    pub cache: Option<DatasetCache>,

    /// Accepted values per filter column.
    pub selection: FilterSelection,

    /// Rows passing the current selection (cached).
    pub view: Option<View>,

    /// KPIs over `view`.
    pub summary: Option<Summary>,

    /// Chart aggregates over `view`.
    pub charts: ChartData,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn with_cache(cache: DatasetCache) -> Self {
        let mut state = AppState::default();
        state.set_cache(cache);
        state
    }

    /// Switch to a new source, reset the filters and load it.
    ///
    /// If the new source fails to load, a dataset that is already shown stays
    /// in place. Otherwise the failing source is kept so [`reload`](Self::reload)
    /// can retry it.
    pub fn set_cache(&mut self, cache: DatasetCache) {
        match cache.get() {
            Ok(dataset) => {
                log::info!(
                    "Dashboard ready: {} passengers from {}",
                    dataset.len(),
                    cache.describe()
                );
                self.status_message = None;
                self.selection = FilterSelection::all();
                self.cache = Some(cache);
                self.refilter();
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", cache.describe());
                self.status_message = Some(format!("Error: {e}"));
                if self.dataset().is_none() {
                    self.cache = Some(cache);
                }
            }
        }
    }

    /// Retry a source whose first load failed.
    pub fn reload(&mut self) {
        let Some(cache) = &self.cache else {
            return;
        };
        let source = cache.describe();
        match cache.get() {
            Ok(_) => {
                log::info!("Reloaded {source}");
                self.status_message = None;
                self.refilter();
            }
            Err(e) => {
                log::error!("Failed to load {source}: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Whether a source is set but has not loaded yet.
    pub fn can_reload(&self) -> bool {
        self.cache.is_some() && self.dataset().is_none()
    }

    /// Load a different file.
    pub fn open(&mut self, path: &Path) {
        self.set_cache(DatasetCache::from_path(path));
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.cache.as_ref().and_then(DatasetCache::peek)
    }

    /// Recompute the view, summary and chart data after a selection change.
    pub fn refilter(&mut self) {
        let Some(dataset) = self.dataset() else {
            return;
        };
        let view = filter(dataset, &self.selection);
        self.summary = Some(summarize(&view));
        self.charts = ChartData::from_view(&view);
        self.view = Some(view);
    }

    /// Accept every value in a column.
    pub fn select_all(&mut self, dimension: Dimension) {
        self.selection.select_all(dimension);
        self.refilter();
    }

    /// Accept nothing in a column.
    pub fn select_none(&mut self, dimension: Dimension) {
        self.selection.select_none(dimension);
        self.refilter();
    }

    /// Write the current summary as pretty JSON.
    pub fn export_summary(&self, path: &Path) -> Result<()> {
        let summary = self
            .summary
            .as_ref()
            .context("no dataset loaded, nothing to export")?;
        let json = serde_json::to_string_pretty(summary).context("serializing summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing summary to {}", path.display()))?;
        log::info!("Exported summary to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Pclass, Survival};

    const CSV: &str = "\
Survived,Pclass,Name,Sex,Age,SibSp,Parch,Fare,Embarked
0,1,\"Allison, Mr. Hudson Joshua Creighton\",male,30,1,2,151.55,S
1,3,\"Sandstrom, Miss. Marguerite Rut\",female,4,1,1,16.7,C
1,2,\"Hewlett, Mrs. (Mary D Kingcome) \",female,55,0,0,16,Q
";

    fn loaded_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titanic.csv");
        std::fs::write(&path, CSV).unwrap();
        let state = AppState::with_cache(DatasetCache::from_path(&path));
        (dir, state)
    }

    #[test]
    fn loads_and_summarizes_everything_initially() {
        let (_dir, state) = loaded_state();
        assert!(state.status_message.is_none());
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.total_survived, 2);
        assert_eq!(state.charts.passengers_by_port.len(), 3);
    }

    #[test]
    fn refilter_updates_view_and_summary() {
        let (_dir, mut state) = loaded_state();
        state.selection.toggle(Pclass::First);
        state.selection.toggle(Survival::DidNotSurvive);
        state.refilter();
        assert_eq!(state.view.as_ref().unwrap().rows(), &[1, 2]);
        assert_eq!(state.summary.as_ref().unwrap().survival_rate, Some(100.0));

        state.select_none(Dimension::Sex);
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.survival_rate, None);

        state.select_all(Dimension::Sex);
        assert_eq!(state.view.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn refilter_reuses_the_cached_dataset() {
        let (_dir, mut state) = loaded_state();
        let before = Arc::clone(state.dataset().unwrap());
        state.select_none(Dimension::Embarked);
        state.select_all(Dimension::Embarked);
        assert!(Arc::ptr_eq(&before, state.dataset().unwrap()));
    }

    #[test]
    fn missing_file_sets_status_message() {
        let mut state = AppState::default();
        state.open(Path::new("/no/such/file/Titanic.csv"));
        assert!(state.status_message.as_deref().unwrap().contains("not found"));
        assert!(state.summary.is_none());
        assert!(state.export_summary(Path::new("unused.json")).is_err());
    }

    #[test]
    fn failed_open_keeps_the_loaded_dataset() {
        let (_dir, mut state) = loaded_state();
        let before = Arc::clone(state.dataset().unwrap());
        state.select_none(Dimension::Sex);

        state.open(Path::new("/no/such/file/other.csv"));
        assert!(state.status_message.as_deref().unwrap().contains("not found"));
        assert!(Arc::ptr_eq(&before, state.dataset().unwrap()));
        assert!(state.selection.sex.is_empty());
        assert_eq!(state.summary.as_ref().unwrap().total_count, 0);
        assert!(!state.can_reload());
    }

    #[test]
    fn reload_retries_a_source_that_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let mut state = AppState::with_cache(DatasetCache::from_path(&path));
        assert!(state.status_message.is_some());
        assert!(state.can_reload());

        state.reload();
        assert!(state.summary.is_none());

        std::fs::write(&path, CSV).unwrap();
        state.reload();
        assert!(state.status_message.is_none());
        assert!(!state.can_reload());
        assert_eq!(state.summary.as_ref().unwrap().total_count, 3);
    }

    #[test]
    fn exports_summary_json() {
        let (dir, state) = loaded_state();
        let out = dir.path().join("summary.json");
        state.export_summary(&out).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["total_count"], 3);
        assert_eq!(json["total_survived"], 2);
    }
}
