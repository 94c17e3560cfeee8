//! Add/edit form state and input validation.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::currency::{amount_in_range, max_amount, normalize_amount, parse_amount};
use crate::errors::{Result as TrackerResult, TrackerError};
use crate::domain::{parse_iso_date, Expense};

pub const ADD_LABEL: &str = "Add Expense";
pub const UPDATE_LABEL: &str = "Update Expense";
const NOTICE_HEADER: &str = "Please Follow the requirement";

/// One reason a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    TitleRequired,
    AmountNotPositive,
    AmountTooLarge,
    DateRequired,
    DateInvalid,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            FieldError::TitleRequired => "Title is required.",
            FieldError::AmountNotPositive => "Amount must be greater than 0.",
            FieldError::AmountTooLarge => "Amount must not exceed 1000000000000.00.",
            FieldError::DateRequired => "Date is required.",
            FieldError::DateInvalid => "Date must be a valid calendar date.",
        };
        f.write_str(message)
    }
}

/// Every failing field of a rejected submission, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn contains(&self, field: FieldError) -> bool {
        self.0.contains(&field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n", NOTICE_HEADER)?;
        for field in &self.0 {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInput {
    pub title: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// Checks raw field text, collecting one error per failing field.
pub fn validate(title: &str, amount: &str, date: &str) -> Result<ValidInput, ValidationErrors> {
    let mut errors = Vec::new();

    let title = title.trim();
    if title.is_empty() {
        errors.push(FieldError::TitleRequired);
    }

    let amount = parse_amount(amount).map(normalize_amount);
    match amount {
        Some(value) if value > max_amount() => errors.push(FieldError::AmountTooLarge),
        Some(value) if value > Decimal::ZERO => {}
        _ => errors.push(FieldError::AmountNotPositive),
    }
    let amount = amount.filter(|value| amount_in_range(*value));

    let parsed_date = if date.trim().is_empty() {
        errors.push(FieldError::DateRequired);
        None
    } else {
        let parsed = parse_iso_date(date);
        if parsed.is_none() {
            errors.push(FieldError::DateInvalid);
        }
        parsed
    };

    match (amount, parsed_date) {
        (Some(amount), Some(date)) if errors.is_empty() => Ok(ValidInput {
            title: title.to_string(),
            amount,
            date,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

/// Which expense, if any, the form is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Closed,
    Add,
    Edit(String),
}

/// Mutation requested by a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent {
    Add(ValidInput),
    Update { id: String, input: ValidInput },
}

impl FormIntent {
    pub fn input(&self) -> &ValidInput {
        match self {
            FormIntent::Add(input) | FormIntent::Update { input, .. } => input,
        }
    }

    /// Year the selector should jump to once the intent is applied.
    pub fn year(&self) -> i32 {
        self.input().date.year()
    }
}

/// Raw field text as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub title: String,
    pub amount: String,
    pub date: String,
}

#[derive(Debug, Clone)]
pub struct FormController {
    mode: FormMode,
    fields: FormFields,
}

impl Default for FormController {
    fn default() -> Self {
        Self {
            mode: FormMode::Closed,
            fields: FormFields::default(),
        }
    }
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.mode, FormMode::Closed)
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Edit(_) => UPDATE_LABEL,
            _ => ADD_LABEL,
        }
    }

    /// Opens the panel for a new expense. Fields already typed are kept.
    pub fn open_add(&mut self) {
        if matches!(self.mode, FormMode::Closed) {
            self.mode = FormMode::Add;
        }
    }

    /// Opens the panel pre-populated with `expense`.
    pub fn open_edit(&mut self, expense: &Expense) {
        self.fields = FormFields {
            title: expense.title.clone(),
            amount: expense.amount.to_string(),
            date: expense.date.format(crate::domain::ISO_DATE_FORMAT).to_string(),
        };
        self.mode = FormMode::Edit(expense.id.clone());
    }

    /// Closes the panel, discarding input.
    pub fn cancel(&mut self) {
        self.mode = FormMode::Closed;
        self.fields = FormFields::default();
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.fields.title = value.into();
    }

    pub fn set_amount(&mut self, value: impl Into<String>) {
        self.fields.amount = value.into();
    }

    pub fn set_date(&mut self, value: impl Into<String>) {
        self.fields.date = value.into();
    }

    /// Live enable/disable state of the submit control.
    pub fn can_submit(&self) -> bool {
        self.is_open() && self.current_validation().is_ok()
    }

    /// Re-validates and turns the fields into an intent. Nothing changes on
    /// failure; a closed form cannot be submitted.
    pub fn submit(&self) -> TrackerResult<FormIntent> {
        if !self.is_open() {
            return Err(TrackerError::InvalidInput("form is not open".into()));
        }
        let input = self.current_validation()?;
        Ok(match &self.mode {
            FormMode::Edit(id) => FormIntent::Update {
                id: id.clone(),
                input,
            },
            FormMode::Add | FormMode::Closed => FormIntent::Add(input),
        })
    }

    /// Transition after the intent was applied: an add keeps the panel open with
    /// cleared fields, an edit closes it.
    pub fn complete(&mut self, intent: &FormIntent) {
        self.fields = FormFields::default();
        self.mode = match intent {
            FormIntent::Add(_) => FormMode::Add,
            FormIntent::Update { .. } => FormMode::Closed,
        };
    }

    fn current_validation(&self) -> Result<ValidInput, ValidationErrors> {
        validate(&self.fields.title, &self.fields.amount, &self.fields.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(form: &mut FormController, title: &str, amount: &str, date: &str) {
        form.set_title(title);
        form.set_amount(amount);
        form.set_date(date);
    }

    #[test]
    fn validate_aggregates_every_failing_field() {
        let errors = validate("  ", "0", "").expect_err("all fields invalid");
        assert_eq!(
            errors.fields(),
            &[
                FieldError::TitleRequired,
                FieldError::AmountNotPositive,
                FieldError::DateRequired
            ]
        );
        assert_eq!(
            errors.to_string(),
            "Please Follow the requirement\n\nTitle is required.\nAmount must be greater than 0.\nDate is required.\n"
        );
    }

    #[test]
    fn validate_rejects_negative_and_missing_amounts() {
        assert!(validate("Tea", "-2", "2024-01-01")
            .unwrap_err()
            .contains(FieldError::AmountNotPositive));
        assert!(validate("Tea", "", "2024-01-01")
            .unwrap_err()
            .contains(FieldError::AmountNotPositive));
        assert!(validate("Tea", "2", "2024-13-01")
            .unwrap_err()
            .contains(FieldError::DateInvalid));
    }

    #[test]
    fn validate_bounds_amount_magnitude() {
        let errors = validate("Yacht", "50000000000000000000000000000", "2024-01-01").unwrap_err();
        assert_eq!(errors.fields(), &[FieldError::AmountTooLarge]);
        assert!(validate("Dust", "0.001", "2024-01-01")
            .unwrap_err()
            .contains(FieldError::AmountNotPositive));

        let input = validate("House", "1000000000000", "2024-01-01").unwrap();
        assert_eq!(input.amount.to_string(), "1000000000000.00");
    }

    #[test]
    fn closed_form_cannot_be_submitted() {
        let mut form = FormController::new();
        filled(&mut form, "Tea", "3", "2024-06-01");

        let err = form.submit().unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));
        assert!(!form.is_open());
    }

    #[test]
    fn validate_trims_title() {
        let input = validate("  Tea ", "2.5", "2024-01-01").unwrap();
        assert_eq!(input.title, "Tea");
        assert_eq!(input.amount, Decimal::new(25, 1));
    }

    #[test]
    fn can_submit_tracks_field_state() {
        let mut form = FormController::new();
        form.open_add();
        assert!(!form.can_submit());
        filled(&mut form, "Tea", "3", "2024-06-01");
        assert!(form.can_submit());
        form.set_amount("0");
        assert!(!form.can_submit());
    }

    #[test]
    fn add_submit_keeps_panel_open_with_cleared_fields() {
        let mut form = FormController::new();
        form.open_add();
        filled(&mut form, "Tea", "3", "2024-06-01");

        let intent = form.submit().unwrap();
        assert!(matches!(intent, FormIntent::Add(_)));
        assert_eq!(intent.year(), 2024);

        form.complete(&intent);
        assert_eq!(form.mode(), &FormMode::Add);
        assert_eq!(form.fields(), &FormFields::default());
    }

    #[test]
    fn edit_flow_prepopulates_and_closes_after_submit() {
        let expense = Expense::new(
            "e1",
            "Rent",
            Decimal::new(800, 0),
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
        );
        let mut form = FormController::new();
        form.open_edit(&expense);

        assert_eq!(form.submit_label(), UPDATE_LABEL);
        assert_eq!(form.fields().amount, "800.00");
        assert_eq!(form.fields().date, "2023-03-01");

        form.set_title("Rent (March)");
        let intent = form.submit().unwrap();
        match &intent {
            FormIntent::Update { id, input } => {
                assert_eq!(id, "e1");
                assert_eq!(input.title, "Rent (March)");
            }
            other => panic!("unexpected intent: {other:?}"),
        }

        form.complete(&intent);
        assert!(!form.is_open());
        assert_eq!(form.submit_label(), ADD_LABEL);
    }

    #[test]
    fn cancel_discards_input_and_resets_label() {
        let mut form = FormController::new();
        form.open_add();
        filled(&mut form, "Tea", "3", "2024-06-01");
        form.cancel();

        assert_eq!(form.mode(), &FormMode::Closed);
        assert_eq!(form.fields(), &FormFields::default());
        assert_eq!(form.submit_label(), ADD_LABEL);
    }
}
