//! Book model and copy accounting

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book record
///
/// `available_copies` always stays within `0..=total_copies`; it only moves
/// through [`Book::checkout`], [`Book::checkin`] and [`Book::resize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub isbn: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl Book {
    /// Take one copy off the shelf
    pub fn checkout(&mut self) -> AppResult<()> {
        if self.available_copies < 1 {
            return Err(AppError::InsufficientCopies);
        }
        self.available_copies -= 1;
        Ok(())
    }

    /// Put one copy back on the shelf
    pub fn checkin(&mut self) -> AppResult<()> {
        if self.available_copies >= self.total_copies {
            return Err(AppError::Internal(format!(
                "Book {} already has all {} copies available",
                self.id, self.total_copies
            )));
        }
        self.available_copies += 1;
        Ok(())
    }

    /// Change the number of owned copies, keeping loaned copies on loan
    pub fn resize(&mut self, total_copies: i32) -> AppResult<()> {
        let on_loan = self.total_copies - self.available_copies;
        if total_copies < on_loan {
            return Err(AppError::Validation(format!(
                "total_copies cannot be lower than the {} copies on loan",
                on_loan
            )));
        }
        self.available_copies = total_copies - on_loan;
        self.total_copies = total_copies;
        Ok(())
    }
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    pub author_id: Option<i32>,
    pub title: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    pub author_id: i32,
    #[validate(length(max = 17))]
    pub isbn: Option<String>,
    #[validate(range(min = 0, message = "total_copies must not be negative"))]
    pub total_copies: i32,
    /// Defaults to `total_copies`
    #[validate(range(min = 0, message = "available_copies must not be negative"))]
    pub available_copies: Option<i32>,
}

impl CreateBook {
    /// Resolve the initial copy counts
    pub fn copies(&self) -> AppResult<(i32, i32)> {
        let available = self.available_copies.unwrap_or(self.total_copies);
        if available > self.total_copies {
            return Err(AppError::Validation(
                "available_copies cannot exceed total_copies".to_string(),
            ));
        }
        Ok((self.total_copies, available))
    }
}

/// Update book request; `isbn: null` clears the ISBN
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    pub author_id: Option<i32>,
    #[validate(length(max = 17))]
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub isbn: Option<Option<String>>,
    #[validate(range(min = 0, message = "total_copies must not be negative"))]
    pub total_copies: Option<i32>,
}
