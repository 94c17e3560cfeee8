//! Application state and the event handlers that keep every view consistent.

use std::fmt;

use chrono::Duration;

use crate::chart::{chart_title, ChartPresenter, ChartSurface};
use crate::config::Config;
use crate::core::services::{ExpenseRepository, ListView, MonthlyTotals, ViewProjector, YearIndex};
use crate::core::{CancellableTimer, Clock, IdGenerator};
use crate::errors::Result;
use crate::form::{FormController, FormIntent};
use crate::storage::{ExpenseStore, FileStore};

pub const CONFIRM_DELETE: &str = "Delete this expense?";
pub const CONFIRM_CLEAR_FIRST: &str =
    "Are you sure you want to delete ALL expenses? This cannot be undone.";
pub const CONFIRM_CLEAR_SECOND: &str =
    "This will permanently delete all data from storage. Continue?";

/// Yes/no confirmation capability used before destructive actions.
pub trait Confirmer {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Blocking user-facing notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    DeleteFailed,
    Cleared,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Notice::DeleteFailed => "Could not find expense to delete.",
            Notice::Cleared => "All data has been cleared!",
        };
        f.write_str(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    NotFound,
}

impl DeleteOutcome {
    pub fn notice(self) -> Option<Notice> {
        match self {
            DeleteOutcome::NotFound => Some(Notice::DeleteFailed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cancelled,
    Cleared,
}

impl ClearOutcome {
    pub fn notice(self) -> Option<Notice> {
        match self {
            ClearOutcome::Cleared => Some(Notice::Cleared),
            ClearOutcome::Cancelled => None,
        }
    }
}

/// Everything the screen shows after a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub year_options: Vec<i32>,
    pub selected_year: i32,
    pub list: ListView,
    pub monthly_totals: MonthlyTotals,
    pub year_total_label: String,
    pub chart_title: String,
    pub form_open: bool,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
}

/// Owns the repository, form, chart, and year selection, and reconciles them
/// after every user action.
pub struct ExpenseTracker {
    repo: ExpenseRepository,
    form: FormController,
    chart: ChartPresenter,
    selector: Option<i32>,
    resize_timer: CancellableTimer<()>,
    quiet_window: Duration,
    clock: Box<dyn Clock>,
}

impl ExpenseTracker {
    pub fn new(repo: ExpenseRepository, chart: ChartPresenter, clock: Box<dyn Clock>) -> Self {
        Self {
            repo,
            form: FormController::new(),
            chart,
            selector: None,
            resize_timer: CancellableTimer::new(),
            quiet_window: Config::default().quiet_window(),
            clock,
        }
    }

    /// Builds a tracker persisting to a [`FileStore`] in `data_dir`, tuned by `config`.
    pub fn from_config(
        config: &Config,
        data_dir: std::path::PathBuf,
        surface: Box<dyn ChartSurface>,
        viewport_width: u32,
        ids: Box<dyn IdGenerator>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let backend = FileStore::new(data_dir)?;
        let store = ExpenseStore::with_key(Box::new(backend), config.storage_key.clone());
        let repo = ExpenseRepository::new(store, ids);
        let chart = ChartPresenter::new(surface, viewport_width)
            .with_breakpoint(config.narrow_breakpoint_px);
        Ok(Self::new(repo, chart, clock).with_quiet_window(config.quiet_window()))
    }

    pub fn with_quiet_window(mut self, quiet_window: Duration) -> Self {
        self.quiet_window = quiet_window;
        self
    }

    pub fn repository(&self) -> &ExpenseRepository {
        &self.repo
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    pub fn chart(&self) -> &ChartPresenter {
        &self.chart
    }

    pub fn current_year(&self) -> i32 {
        self.clock.current_year()
    }

    /// Value of the year selector, falling back to the current year.
    pub fn selected_year(&self) -> i32 {
        self.selector.unwrap_or_else(|| self.current_year())
    }

    /// Restores the persisted collection (unreadable data counts as empty) and
    /// renders everything.
    pub fn start(&mut self) -> Dashboard {
        self.repo.reload();
        self.form.cancel();
        tracing::info!(count = self.repo.len(), "expense tracker started");
        self.refresh()
    }

    /// Rebuilds the year options, re-resolves the selection, and re-renders the
    /// list, chart, and year total.
    pub fn refresh(&mut self) -> Dashboard {
        let current_year = self.current_year();
        let year_options = YearIndex::years(self.repo.all(), current_year);
        let selected_year =
            YearIndex::resolve_selection(self.selector.unwrap_or(current_year), &year_options);
        self.selector = Some(selected_year);

        let expenses = self.repo.all();
        let list = ViewProjector::list_view(expenses, selected_year);
        let monthly_totals = ViewProjector::monthly_totals(expenses, selected_year);
        let year_total_label = ViewProjector::year_total_label(expenses, selected_year);
        self.chart.render(selected_year, &monthly_totals);
        tracing::debug!(selected_year, rows = list.rows().len(), "view refreshed");

        Dashboard {
            year_options,
            selected_year,
            list,
            monthly_totals,
            year_total_label,
            chart_title: chart_title(selected_year),
            form_open: self.form.is_open(),
            submit_label: self.form.submit_label(),
            submit_enabled: self.form.can_submit(),
        }
    }

    /// Year selector change.
    pub fn select_year(&mut self, year: i32) -> Dashboard {
        self.selector = Some(year);
        self.refresh()
    }

    pub fn open_add_form(&mut self) {
        self.form.open_add();
    }

    /// Opens the form pre-populated for `id`. Unknown ids are ignored.
    pub fn edit(&mut self, id: &str) -> bool {
        match self.repo.get(id) {
            Some(expense) => {
                self.form.open_edit(expense);
                true
            }
            None => false,
        }
    }

    pub fn cancel_form(&mut self) {
        self.form.cancel();
    }

    /// Validates the form and applies it to the repository. Validation failures
    /// come back as [`crate::TrackerError::Validation`] with nothing changed.
    pub fn submit_form(&mut self) -> Result<Dashboard> {
        let intent = self.form.submit()?;
        match &intent {
            FormIntent::Add(input) => {
                self.repo.add(&input.title, input.amount, input.date)?;
            }
            FormIntent::Update { id, input } => {
                self.repo.update(id, &input.title, input.amount, input.date)?;
            }
        }
        self.form.complete(&intent);
        self.selector = Some(intent.year());
        Ok(self.refresh())
    }

    pub fn delete(&mut self, id: &str, confirmer: &mut dyn Confirmer) -> Result<DeleteOutcome> {
        if !confirmer.confirm(CONFIRM_DELETE) {
            return Ok(DeleteOutcome::Cancelled);
        }
        if !self.repo.remove(id)? {
            return Ok(DeleteOutcome::NotFound);
        }
        self.refresh();
        Ok(DeleteOutcome::Deleted)
    }

    /// Discards every expense after two separate confirmations.
    pub fn clear_all(&mut self, confirmer: &mut dyn Confirmer) -> Result<ClearOutcome> {
        if !confirmer.confirm(CONFIRM_CLEAR_FIRST) || !confirmer.confirm(CONFIRM_CLEAR_SECOND) {
            return Ok(ClearOutcome::Cancelled);
        }
        self.repo.clear()?;
        self.form.cancel();
        self.refresh();
        Ok(ClearOutcome::Cleared)
    }

    /// Viewport resize event. The width applies to the next render; a chart
    /// rebuild is (re)scheduled for after the quiet window.
    pub fn resize(&mut self, width_px: u32) {
        self.chart.set_viewport_width(width_px);
        let now = self.clock.now();
        self.resize_timer.schedule(now, self.quiet_window, ());
    }

    pub fn rebuild_pending(&self) -> bool {
        self.resize_timer.is_pending()
    }

    /// Fires a due resize rebuild. Returns whether the chart was rebuilt.
    pub fn tick(&mut self) -> bool {
        if self.resize_timer.fire_due(self.clock.now()).is_none() {
            return false;
        }
        let year = self.selected_year();
        let totals = ViewProjector::monthly_totals(self.repo.all(), year);
        let rebuilt = self.chart.destroy_and_rebuild(year, &totals);
        if rebuilt {
            let width = self.chart.viewport_width();
            tracing::debug!(year, width, "chart rebuilt after resize");
        }
        rebuilt
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::chart::{BarChart, ChartSpec};
    use crate::core::{ManualClock, SequentialIds};
    use crate::errors::TrackerError;
    use crate::form::FieldError;
    use crate::storage::MemoryStore;

    struct NullSurface;
    struct NullChart;

    impl ChartSurface for NullSurface {
        fn create_bar_chart(&mut self, _spec: &ChartSpec) -> Box<dyn BarChart> {
            Box::new(NullChart)
        }
    }

    impl BarChart for NullChart {
        fn update(&mut self, _spec: &ChartSpec) {}
        fn destroy(self: Box<Self>) {}
    }

    fn tracker() -> (ExpenseTracker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_date(
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        ));
        let store = ExpenseStore::new(Box::new(MemoryStore::new()));
        let repo = ExpenseRepository::new(store, Box::new(SequentialIds::new("e")));
        let chart = ChartPresenter::new(Box::new(NullSurface), 1024);
        (
            ExpenseTracker::new(repo, chart, Box::new(clock.clone())),
            clock,
        )
    }

    fn submit(tracker: &mut ExpenseTracker, title: &str, amount: &str, date: &str) -> Dashboard {
        tracker.open_add_form();
        let form = tracker.form_mut();
        form.set_title(title);
        form.set_amount(amount);
        form.set_date(date);
        tracker.submit_form().expect("valid submission")
    }

    #[test]
    fn add_jumps_selector_to_the_new_year() {
        let (mut tracker, _) = tracker();
        let start = tracker.start();
        assert_eq!(start.year_options, vec![2024]);
        assert!(start.list.is_empty());

        let view = submit(&mut tracker, "Books", "10", "2023-05-01");
        assert_eq!(view.year_options, vec![2024, 2023]);
        assert_eq!(view.selected_year, 2023);
        assert_eq!(view.monthly_totals[4].to_string(), "10.00");
        assert_eq!(view.year_total_label, "MYR 10.00");
        assert_eq!(view.chart_title, "Monthly Total (MYR) - 2023");
        assert!(view.form_open);
        assert!(!view.submit_enabled);
    }

    #[test]
    fn invalid_submit_reports_and_changes_nothing() {
        let (mut tracker, _) = tracker();
        tracker.start();
        tracker.open_add_form();
        tracker.form_mut().set_title("Lunch");

        let err = tracker.submit_form().expect_err("missing amount and date");
        match err {
            TrackerError::Validation(errors) => {
                assert_eq!(
                    errors.fields(),
                    &[FieldError::AmountNotPositive, FieldError::DateRequired]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(tracker.repository().is_empty());
        assert_eq!(tracker.form().fields().title, "Lunch");
    }

    #[test]
    fn deleting_last_expense_of_a_year_falls_back_to_latest_year() {
        let (mut tracker, _) = tracker();
        tracker.start();
        submit(&mut tracker, "Old", "4", "2021-02-02");
        let id = tracker.repository().all()[0].id.clone();

        let outcome = tracker.delete(&id, &mut |_: &str| true).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        let view = tracker.refresh();
        assert_eq!(view.year_options, vec![2024]);
        assert_eq!(view.selected_year, 2024);
    }

    #[test]
    fn delete_unknown_id_reports_failure() {
        let (mut tracker, _) = tracker();
        tracker.start();
        submit(&mut tracker, "Gym", "5", "2024-01-10");

        let outcome = tracker.delete("z", &mut |_: &str| true).unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert_eq!(outcome.notice(), Some(Notice::DeleteFailed));
        assert_eq!(tracker.repository().len(), 1);
    }

    #[test]
    fn declined_delete_keeps_the_expense() {
        let (mut tracker, _) = tracker();
        tracker.start();
        submit(&mut tracker, "Gym", "5", "2024-01-10");
        let id = tracker.repository().all()[0].id.clone();

        let mut asked = Vec::new();
        let outcome = tracker
            .delete(&id, &mut |message: &str| {
                asked.push(message.to_string());
                false
            })
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(asked, vec![CONFIRM_DELETE.to_string()]);
        assert_eq!(tracker.repository().len(), 1);
    }

    #[test]
    fn clear_all_needs_both_confirmations() {
        let (mut tracker, _) = tracker();
        tracker.start();
        submit(&mut tracker, "Gym", "5", "2024-01-10");

        let mut answers = vec![true, false].into_iter();
        let outcome = tracker
            .clear_all(&mut |_: &str| answers.next().unwrap_or(false))
            .unwrap();
        assert_eq!(outcome, ClearOutcome::Cancelled);
        assert_eq!(tracker.repository().len(), 1);

        let outcome = tracker.clear_all(&mut |_: &str| true).unwrap();
        assert_eq!(outcome.notice(), Some(Notice::Cleared));
        assert!(tracker.repository().is_empty());
        assert!(!tracker.form().is_open());
    }

    #[test]
    fn edit_updates_record_and_closes_form() {
        let (mut tracker, _) = tracker();
        tracker.start();
        submit(&mut tracker, "Taxi", "12", "2024-03-03");
        let id = tracker.repository().all()[0].id.clone();

        assert!(tracker.edit(&id));
        tracker.form_mut().set_amount("15.5");
        let view = tracker.submit_form().unwrap();

        assert_eq!(tracker.repository().len(), 1);
        assert_eq!(tracker.repository().all()[0].amount.to_string(), "15.50");
        assert!(!view.form_open);
        assert_eq!(view.submit_label, "Add Expense");
        assert!(!tracker.edit("missing"));
    }

    #[test]
    fn resize_rebuild_waits_for_quiet_window() {
        let (mut tracker, clock) = tracker();
        tracker.start();

        tracker.resize(500);
        clock.advance(Duration::milliseconds(200));
        tracker.resize(480);
        clock.advance(Duration::milliseconds(200));
        assert!(!tracker.tick());
        assert!(tracker.rebuild_pending());

        clock.advance(Duration::milliseconds(60));
        assert!(tracker.tick());
        assert!(!tracker.rebuild_pending());
        assert_eq!(tracker.chart().viewport_width(), 480);
    }
}
