//! Loan model and lifecycle rules

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Loan record from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub is_returned: bool,
}

impl Loan {
    /// Default due date for a loan issued on `loan_date`
    pub fn default_due_date(loan_date: NaiveDate, duration_days: i64) -> AppResult<NaiveDate> {
        let days = u64::try_from(duration_days)
            .map_err(|_| AppError::Internal("Negative loan duration".to_string()))?;
        loan_date
            .checked_add_days(Days::new(days))
            .ok_or_else(|| AppError::Internal("Loan duration out of range".to_string()))
    }

    pub fn is_active(&self) -> bool {
        !self.is_returned
    }

    /// Mark the loan as returned on `today`
    pub fn mark_returned(&mut self, today: NaiveDate) -> AppResult<()> {
        if !self.is_active() {
            return Err(AppError::ActiveLoanNotFound);
        }
        self.is_returned = true;
        self.return_date = Some(today);
        Ok(())
    }

    /// Push the due date back by the requested number of days.
    ///
    /// The due date is checked before the request itself, so a late loan
    /// reports `DueDateAlreadyPassed` whatever the body holds. Returned loans
    /// are not rejected.
    pub fn extend(&mut self, request: &ExtendDueDate, today: NaiveDate) -> AppResult<()> {
        if self.due_date < today {
            return Err(AppError::DueDateAlreadyPassed);
        }
        request.validate()?;
        let days = request
            .additional_days
            .ok_or_else(|| AppError::Validation("additional_days is required".to_string()))?;

        self.due_date = self
            .due_date
            .checked_add_days(Days::new(days as u64))
            .ok_or_else(|| AppError::Validation("additional_days out of range".to_string()))?;
        Ok(())
    }
}

/// Body of the loan and return actions
#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberRef {
    pub member_id: Option<i32>,
}

/// Due date extension request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExtendDueDate {
    /// Days to add to the current due date
    #[validate(
        required(message = "additional_days is required"),
        range(min = 1, max = 365, message = "additional_days must be between 1 and 365")
    )]
    pub additional_days: Option<i64>,
}

/// Loan list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    pub member_id: Option<i32>,
    pub book_id: Option<i32>,
    /// Only loans not yet returned when true, only returned ones when false
    pub active: Option<bool>,
}

/// Confirmation returned by the loan and return actions
#[derive(Debug, Serialize, ToSchema)]
pub struct LoanConfirmation {
    pub status: String,
    pub loan: Loan,
}
