//! Text rendering of the monthly bar chart.

use std::{cell::RefCell, rc::Rc};

use colored::Colorize;

use crate::chart::{BarChart, ChartSpec, ChartSurface, ACTIVE_BAR_COLOR};

const MAX_BAR_WIDTH: f64 = 40.0;

/// Latest spec drawn by the live terminal chart, shared with the shell.
pub type ChartSlot = Rc<RefCell<Option<ChartSpec>>>;

/// Surface whose charts keep their last spec in a shared slot for printing.
pub struct TerminalSurface {
    slot: ChartSlot,
}

impl TerminalSurface {
    pub fn new(slot: ChartSlot) -> Self {
        Self { slot }
    }
}

impl ChartSurface for TerminalSurface {
    fn create_bar_chart(&mut self, spec: &ChartSpec) -> Box<dyn BarChart> {
        *self.slot.borrow_mut() = Some(spec.clone());
        Box::new(TerminalChart {
            slot: self.slot.clone(),
        })
    }
}

struct TerminalChart {
    slot: ChartSlot,
}

impl BarChart for TerminalChart {
    fn update(&mut self, spec: &ChartSpec) {
        *self.slot.borrow_mut() = Some(spec.clone());
    }

    fn destroy(self: Box<Self>) {
        *self.slot.borrow_mut() = None;
    }
}

/// Renders `spec` as horizontal bars, one line per month.
pub fn render_lines(spec: &ChartSpec) -> Vec<String> {
    let max = spec.values.iter().copied().fold(0.0_f64, f64::max);
    // Wide viewports get the full bar width, narrow ones a compact one.
    let width = MAX_BAR_WIDTH * f64::from(spec.style.bar_thickness) / 22.0;

    let mut lines = vec![spec.title.clone()];
    for ((label, value), color) in spec.labels.iter().zip(spec.values).zip(spec.colors) {
        let cells = if max > 0.0 {
            ((value / max) * width).round() as usize
        } else {
            0
        };
        let bar = "#".repeat(cells);
        let bar = if color == ACTIVE_BAR_COLOR {
            bar.magenta().to_string()
        } else {
            bar
        };
        lines.push(format!("{label} | {bar} {value:.2}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::chart::{ChartPresenter, ViewportStyle};

    #[test]
    fn presenter_lifecycle_fills_and_clears_slot() {
        let slot: ChartSlot = Rc::default();
        let mut presenter = ChartPresenter::new(Box::new(TerminalSurface::new(slot.clone())), 900);
        let mut totals = [Decimal::ZERO; 12];
        totals[1] = Decimal::new(25, 0);

        presenter.render(2024, &totals);
        assert_eq!(
            slot.borrow().as_ref().map(|spec| spec.title.clone()),
            Some("Monthly Total (MYR) - 2024".to_string())
        );

        presenter.destroy();
        assert!(slot.borrow().is_none());
    }

    #[test]
    fn largest_bucket_gets_the_widest_bar() {
        colored::control::set_override(false);
        let mut totals = [Decimal::ZERO; 12];
        totals[0] = Decimal::new(10, 0);
        totals[2] = Decimal::new(5, 0);
        let spec = ChartSpec::build(2024, &totals, ViewportStyle::WIDE);

        let lines = render_lines(&spec);
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[1], format!("Jan | {} 10.00", "#".repeat(40)));
        assert_eq!(lines[3], format!("Mar | {} 5.00", "#".repeat(20)));
        assert_eq!(lines[2], "Feb |  0.00");
    }
}
