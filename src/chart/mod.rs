//! Monthly bar chart lifecycle: one live chart, updated in place, rebuilt on demand.

use rust_decimal::prelude::ToPrimitive;

use crate::core::services::MonthlyTotals;
use crate::currency::CURRENCY_CODE;
use crate::domain::MONTH_LABELS;

pub const ACTIVE_BAR_COLOR: &str = "rgba(109,42,165,0.95)";
pub const MUTED_BAR_COLOR: &str = "rgba(217,195,245,0.6)";
pub const TITLE_COLOR: &str = "#3a2a5a";
pub const X_TICK_COLOR: &str = "#6b4b8a";
pub const BAR_BORDER_RADIUS: u32 = 12;

/// Viewports narrower than this use the compact style.
pub const NARROW_BREAKPOINT_PX: u32 = 576;

/// Size-dependent styling picked from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportStyle {
    pub bar_thickness: u32,
    pub tick_font_size: u32,
    pub label_rotation_deg: u32,
    pub title_font_size: u32,
}

impl ViewportStyle {
    pub const NARROW: ViewportStyle = ViewportStyle {
        bar_thickness: 14,
        tick_font_size: 10,
        label_rotation_deg: 45,
        title_font_size: 12,
    };

    pub const WIDE: ViewportStyle = ViewportStyle {
        bar_thickness: 22,
        tick_font_size: 12,
        label_rotation_deg: 0,
        title_font_size: 14,
    };
}

pub fn adapt_to_viewport(width_px: u32) -> ViewportStyle {
    adapt_with_breakpoint(width_px, NARROW_BREAKPOINT_PX)
}

pub fn adapt_with_breakpoint(width_px: u32, breakpoint_px: u32) -> ViewportStyle {
    if width_px < breakpoint_px {
        ViewportStyle::NARROW
    } else {
        ViewportStyle::WIDE
    }
}

pub fn chart_title(year: i32) -> String {
    format!("Monthly Total ({}) - {}", CURRENCY_CODE, year)
}

/// Colour per bucket: populated months stand out, empty ones are muted.
pub fn bar_colors(totals: &MonthlyTotals) -> [&'static str; 12] {
    totals.map(|value| {
        if value.is_sign_positive() && !value.is_zero() {
            ACTIVE_BAR_COLOR
        } else {
            MUTED_BAR_COLOR
        }
    })
}

/// Everything the drawing capability needs to draw or redraw the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub dataset_label: &'static str,
    pub labels: [&'static str; 12],
    pub values: [f64; 12],
    pub colors: [&'static str; 12],
    pub style: ViewportStyle,
    pub title_color: &'static str,
    pub x_tick_color: &'static str,
    pub border_radius: u32,
    pub show_legend: bool,
    pub y_begins_at_zero: bool,
}

impl ChartSpec {
    pub fn build(year: i32, totals: &MonthlyTotals, style: ViewportStyle) -> Self {
        Self {
            title: chart_title(year),
            dataset_label: CURRENCY_CODE,
            labels: MONTH_LABELS,
            values: totals.map(|value| value.to_f64().unwrap_or(0.0)),
            colors: bar_colors(totals),
            style,
            title_color: TITLE_COLOR,
            x_tick_color: X_TICK_COLOR,
            border_radius: BAR_BORDER_RADIUS,
            show_legend: false,
            y_begins_at_zero: true,
        }
    }
}

/// A live chart bound to a drawing surface.
pub trait BarChart {
    /// Mutates data, colours, title, and styling of the existing chart.
    fn update(&mut self, spec: &ChartSpec);
    /// Releases the chart and its surface resources.
    fn destroy(self: Box<Self>);
}

/// Drawing capability able to construct bar charts.
pub trait ChartSurface {
    fn create_bar_chart(&mut self, spec: &ChartSpec) -> Box<dyn BarChart>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    Absent,
    Live,
}

/// Owns the single chart instance and its lifecycle.
pub struct ChartPresenter {
    surface: Box<dyn ChartSurface>,
    chart: Option<Box<dyn BarChart>>,
    viewport_width: u32,
    breakpoint_px: u32,
}

impl ChartPresenter {
    pub fn new(surface: Box<dyn ChartSurface>, viewport_width: u32) -> Self {
        Self {
            surface,
            chart: None,
            viewport_width,
            breakpoint_px: NARROW_BREAKPOINT_PX,
        }
    }

    pub fn with_breakpoint(mut self, breakpoint_px: u32) -> Self {
        self.breakpoint_px = breakpoint_px;
        self
    }

    pub fn state(&self) -> ChartState {
        if self.chart.is_some() {
            ChartState::Live
        } else {
            ChartState::Absent
        }
    }

    pub fn is_live(&self) -> bool {
        self.chart.is_some()
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// Records the new width; it takes effect on the next render.
    pub fn set_viewport_width(&mut self, width_px: u32) {
        self.viewport_width = width_px;
    }

    pub fn style(&self) -> ViewportStyle {
        adapt_with_breakpoint(self.viewport_width, self.breakpoint_px)
    }

    /// Creates the chart when absent, otherwise updates it in place.
    pub fn render(&mut self, year: i32, totals: &MonthlyTotals) {
        let spec = ChartSpec::build(year, totals, self.style());
        match self.chart.as_mut() {
            Some(chart) => {
                chart.update(&spec);
                tracing::debug!(year, "chart updated in place");
            }
            None => {
                self.chart = Some(self.surface.create_bar_chart(&spec));
                tracing::debug!(year, "chart created");
            }
        }
    }

    /// Tears the live chart down and renders a fresh one. Does nothing while
    /// no chart exists; returns whether a rebuild happened.
    pub fn destroy_and_rebuild(&mut self, year: i32, totals: &MonthlyTotals) -> bool {
        let Some(chart) = self.chart.take() else {
            return false;
        };
        chart.destroy();
        self.render(year, totals);
        true
    }

    /// Drops the live chart, if any.
    pub fn destroy(&mut self) {
        if let Some(chart) = self.chart.take() {
            chart.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use rust_decimal::Decimal;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Created(ChartSpec),
        Updated(ChartSpec),
        Destroyed,
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct RecordingSurface(Log);
    struct RecordingChart(Log);

    impl ChartSurface for RecordingSurface {
        fn create_bar_chart(&mut self, spec: &ChartSpec) -> Box<dyn BarChart> {
            self.0.borrow_mut().push(Event::Created(spec.clone()));
            Box::new(RecordingChart(self.0.clone()))
        }
    }

    impl BarChart for RecordingChart {
        fn update(&mut self, spec: &ChartSpec) {
            self.0.borrow_mut().push(Event::Updated(spec.clone()));
        }

        fn destroy(self: Box<Self>) {
            self.0.borrow_mut().push(Event::Destroyed);
        }
    }

    fn presenter(width: u32) -> (ChartPresenter, Log) {
        let log: Log = Rc::default();
        let presenter = ChartPresenter::new(Box::new(RecordingSurface(log.clone())), width);
        (presenter, log)
    }

    fn totals_with_may(amount: i64) -> MonthlyTotals {
        let mut totals = [Decimal::ZERO; 12];
        totals[4] = Decimal::new(amount, 0);
        totals
    }

    #[test]
    fn first_render_creates_then_updates_in_place() {
        let (mut presenter, log) = presenter(1024);
        assert_eq!(presenter.state(), ChartState::Absent);

        presenter.render(2024, &totals_with_may(10));
        presenter.render(2023, &totals_with_may(20));

        let events = log.borrow();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            Event::Created(spec) if spec.title == "Monthly Total (MYR) - 2024"
        ));
        match &events[1] {
            Event::Updated(spec) => {
                assert_eq!(spec.title, "Monthly Total (MYR) - 2023");
                assert_eq!(spec.values[4], 20.0);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(presenter.state(), ChartState::Live);
    }

    #[test]
    fn colors_follow_bucket_values() {
        let spec = ChartSpec::build(2024, &totals_with_may(3), ViewportStyle::WIDE);
        assert_eq!(spec.colors[4], ACTIVE_BAR_COLOR);
        assert!(spec
            .colors
            .iter()
            .enumerate()
            .all(|(i, c)| i == 4 || *c == MUTED_BAR_COLOR));
        assert_eq!(spec.labels[0], "Jan");
        assert_eq!(spec.dataset_label, "MYR");
    }

    #[test]
    fn viewport_breakpoint_switches_style() {
        assert_eq!(adapt_to_viewport(575), ViewportStyle::NARROW);
        assert_eq!(adapt_to_viewport(576), ViewportStyle::WIDE);
        assert_eq!(ViewportStyle::NARROW.label_rotation_deg, 45);
        assert_eq!(ViewportStyle::WIDE.bar_thickness, 22);
    }

    #[test]
    fn rebuild_destroys_and_recreates_with_new_width() {
        let (mut presenter, log) = presenter(1024);
        presenter.render(2024, &totals_with_may(1));
        presenter.set_viewport_width(400);

        assert!(presenter.destroy_and_rebuild(2024, &totals_with_may(1)));

        let events = log.borrow();
        assert_eq!(events[1], Event::Destroyed);
        match &events[2] {
            Event::Created(spec) => assert_eq!(spec.style, ViewportStyle::NARROW),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn rebuild_without_chart_is_a_no_op() {
        let (mut presenter, log) = presenter(800);
        assert!(!presenter.destroy_and_rebuild(2024, &totals_with_may(1)));
        assert!(log.borrow().is_empty());
        assert_eq!(presenter.state(), ChartState::Absent);
    }
}
