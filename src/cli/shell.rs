use std::io::{self, BufRead};

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::{error::ReadlineError, DefaultEditor};
use shell_words::split;
use strsim::levenshtein;

use crate::app::{Confirmer, Dashboard, DeleteOutcome, ExpenseTracker};
use crate::cli::output;
use crate::cli::terminal_chart::{render_lines, ChartSlot, TerminalSurface};
use crate::cli::{CliError, CliMode};
use crate::config::ConfigManager;
use crate::core::services::ListView;
use crate::core::{SystemClock, TimeRandomIds};
use crate::domain::{Displayable, Expense};
use crate::errors::TrackerError;

const PROMPT: &str = "expense> ";
const DEFAULT_VIEWPORT_WIDTH: u32 = 1024;
/// Approximate pixel width of one terminal column.
const CELL_WIDTH_PX: u32 = 8;
const MAX_SUGGESTION_DISTANCE: usize = 3;

const HELP: &[(&str, &str)] = &[
    ("add <title> <amount> <date>", "Add an expense (date as YYYY-MM-DD)"),
    ("edit <id> <title> <amount> <date>", "Replace an expense's fields"),
    ("delete <id>", "Delete an expense"),
    ("list", "Show expenses for the selected year"),
    ("year <yyyy>", "Select the year to show"),
    ("chart", "Draw the monthly totals chart"),
    ("clear", "Delete every expense"),
    ("resize <px>", "Simulate a viewport width change"),
    ("help", "Show this overview"),
    ("exit", "Leave the shell"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Exit,
}

pub fn run_cli() -> Result<(), CliError> {
    let mode = CliMode::from_env();
    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = DefaultEditor::new()?;
    output::info("Type `help` for available commands.");

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => output::error(err),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => output::error(err),
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    let tokens = match split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((command, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    if context.tracker.tick() {
        output::info("Chart rebuilt for the new viewport width.");
    }
    context.dispatch(&command.to_lowercase(), &args)
}

/// Confirmation through a dialoguer prompt, or auto-accepted in script mode.
struct PromptConfirmer<'a> {
    mode: CliMode,
    theme: &'a ColorfulTheme,
}

impl Confirmer for PromptConfirmer<'_> {
    fn confirm(&mut self, message: &str) -> bool {
        match self.mode {
            CliMode::Script => {
                output::info(format!("{message} [yes]"));
                true
            }
            CliMode::Interactive => Confirm::with_theme(self.theme)
                .with_prompt(message)
                .default(false)
                .interact()
                .unwrap_or(false),
        }
    }
}

struct ShellContext {
    tracker: ExpenseTracker,
    chart: ChartSlot,
    mode: CliMode,
    theme: ColorfulTheme,
}

impl ShellContext {
    fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        if !manager.path().exists() {
            manager.save(&config)?;
        }
        let data_dir = manager.data_dir(&config);
        let chart = ChartSlot::default();
        let mut tracker = ExpenseTracker::from_config(
            &config,
            data_dir,
            Box::new(TerminalSurface::new(chart.clone())),
            initial_viewport_width(mode),
            Box::new(TimeRandomIds),
            Box::new(SystemClock),
        )?;
        tracker.start();
        Ok(Self {
            tracker,
            chart,
            mode,
            theme: ColorfulTheme::default(),
        })
    }

    fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<LoopControl, CliError> {
        match command {
            "help" => print_help(),
            "add" => {
                let [title, amount, date] = args else {
                    return usage("add <title> <amount> <date>");
                };
                self.tracker.open_add_form();
                self.fill_form(title, amount, date);
                self.submit("Expense added.")?;
            }
            "edit" => {
                let [id, title, amount, date] = args else {
                    return usage("edit <id> <title> <amount> <date>");
                };
                let Some(label) = self.tracker.repository().get(id).map(Expense::display_label)
                else {
                    output::warning(format!("No expense with id `{id}`."));
                    return Ok(LoopControl::Continue);
                };
                self.tracker.edit(id);
                output::info(format!("Editing {label}"));
                self.fill_form(title, amount, date);
                self.submit("Expense updated.")?;
            }
            "delete" => {
                let [id] = args else {
                    return usage("delete <id>");
                };
                let mut confirmer = PromptConfirmer {
                    mode: self.mode,
                    theme: &self.theme,
                };
                let outcome = self.tracker.delete(id, &mut confirmer)?;
                match outcome {
                    DeleteOutcome::Deleted => output::success("Expense deleted."),
                    DeleteOutcome::Cancelled => output::info("Nothing deleted."),
                    DeleteOutcome::NotFound => {}
                }
                if let Some(notice) = outcome.notice() {
                    output::error(notice);
                }
            }
            "list" => {
                let view = self.tracker.refresh();
                print_dashboard(&view);
            }
            "year" => {
                let Some(year) = args.first().and_then(|raw| raw.parse::<i32>().ok()) else {
                    return usage("year <yyyy>");
                };
                let view = self.tracker.select_year(year);
                print_dashboard(&view);
            }
            "chart" => match self.chart.borrow().as_ref() {
                Some(spec) => render_lines(spec).into_iter().for_each(output::line),
                None => output::info("No chart is drawn."),
            },
            "clear" => {
                let mut confirmer = PromptConfirmer {
                    mode: self.mode,
                    theme: &self.theme,
                };
                let outcome = self.tracker.clear_all(&mut confirmer)?;
                match outcome.notice() {
                    Some(notice) => output::success(notice),
                    None => output::info("Nothing cleared."),
                }
            }
            "resize" => {
                let Some(width) = args.first().and_then(|raw| raw.parse::<u32>().ok()) else {
                    return usage("resize <px>");
                };
                self.tracker.resize(width);
                output::info(format!("Viewport set to {width}px."));
            }
            "exit" | "quit" => return Ok(LoopControl::Exit),
            other => report_unknown(other),
        }
        Ok(LoopControl::Continue)
    }

    fn fill_form(&mut self, title: &str, amount: &str, date: &str) {
        let form = self.tracker.form_mut();
        form.set_title(title);
        form.set_amount(amount);
        form.set_date(date);
    }

    fn submit(&mut self, message: &str) -> Result<(), CliError> {
        match self.tracker.submit_form() {
            Ok(view) => {
                output::success(message);
                print_dashboard(&view);
                Ok(())
            }
            Err(TrackerError::Validation(errors)) => {
                output::warning(errors.to_string().trim_end());
                self.tracker.cancel_form();
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn initial_viewport_width(mode: CliMode) -> u32 {
    match mode {
        CliMode::Script => DEFAULT_VIEWPORT_WIDTH,
        CliMode::Interactive => crossterm::terminal::size()
            .map(|(columns, _)| u32::from(columns) * CELL_WIDTH_PX)
            .unwrap_or(DEFAULT_VIEWPORT_WIDTH),
    }
}

fn report_unknown(input: &str) {
    output::warning(format!("Unknown command `{input}`. Type `help`."));
    let best = HELP
        .iter()
        .filter_map(|(usage, _)| usage.split_whitespace().next())
        .map(|name| (levenshtein(name, input), name))
        .min_by_key(|(distance, _)| *distance);
    if let Some((distance, name)) = best {
        if distance <= MAX_SUGGESTION_DISTANCE {
            output::info(format!("Suggestion: `{name}`?"));
        }
    }
}

fn usage(text: &str) -> Result<LoopControl, CliError> {
    output::warning(format!("Usage: {text}"));
    Ok(LoopControl::Continue)
}

fn print_help() {
    output::section("Available commands");
    for (command, description) in HELP {
        output::line(format!("  {command:<36} {description}"));
    }
}

fn print_dashboard(view: &Dashboard) {
    output::section(format!("Expenses {}", view.selected_year));
    let years: Vec<String> = view.year_options.iter().map(i32::to_string).collect();
    output::line(format!("Years: {}", years.join(", ")));
    match &view.list {
        ListView::Empty => output::info("No expenses recorded for this year."),
        ListView::Items(rows) => {
            for row in rows {
                output::line(format!(
                    "{:<16} {}  {:<28} {}",
                    row.id, row.date_label, row.title, row.amount_label
                ));
            }
        }
    }
    output::line(format!("Total: {}", view.year_total_label));
}
