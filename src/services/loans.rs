//! Loan lifecycle service
//!
//! Every operation that moves copies or mutates a loan runs in a single
//! transaction holding row locks on the book (then the loan), so concurrent
//! requests on the same book serialize and `available_copies` stays within
//! `0..=total_copies`.

use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{ExtendDueDate, Loan, LoanQuery},
        member::TopActiveMember,
    },
    repository::Repository,
    services::notifications::{LoanNotification, NotificationDispatcher},
};

/// Size of the most active members ranking
pub const TOP_ACTIVE_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    notifier: NotificationDispatcher,
    loan_duration_days: i64,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl LoansService {
    pub fn new(repository: Repository, notifier: NotificationDispatcher, loan_duration_days: i64) -> Self {
        Self {
            repository,
            notifier,
            loan_duration_days,
        }
    }

    /// Loan a copy of a book to a member
    pub async fn loan_book(&self, book_id: i32, member_id: Option<i32>) -> AppResult<Loan> {
        let today = today();
        let mut tx = self.repository.begin().await?;

        let mut book = self.repository.books.lock_by_id(&mut tx, book_id).await?;
        book.checkout()?;

        let member_id = member_id.ok_or(AppError::MemberNotFound)?;
        if !self.repository.members.exists(&mut tx, member_id).await? {
            return Err(AppError::MemberNotFound);
        }

        let due_date = Loan::default_due_date(today, self.loan_duration_days)?;
        let loan = self
            .repository
            .loans
            .create(&mut tx, book.id, member_id, today, due_date)
            .await?;
        self.repository.books.save_available_copies(&mut tx, &book).await?;

        tx.commit().await?;

        tracing::info!(
            loan_id = loan.id,
            book_id = book.id,
            member_id,
            available_copies = book.available_copies,
            "Book loaned"
        );

        self.notifier.dispatch(LoanNotification::from(&loan));
        Ok(loan)
    }

    /// Return the member's earliest unreturned loan of a book
    pub async fn return_book(&self, book_id: i32, member_id: Option<i32>) -> AppResult<Loan> {
        let today = today();
        let mut tx = self.repository.begin().await?;

        let mut book = self.repository.books.lock_by_id(&mut tx, book_id).await?;

        let member_id = member_id.ok_or(AppError::ActiveLoanNotFound)?;
        let mut loan = self
            .repository
            .loans
            .lock_active(&mut tx, book.id, member_id)
            .await?
            .ok_or(AppError::ActiveLoanNotFound)?;

        loan.mark_returned(today)?;
        book.checkin()?;

        let loan = self.repository.loans.save(&mut tx, &loan).await?;
        self.repository.books.save_available_copies(&mut tx, &book).await?;

        tx.commit().await?;

        tracing::info!(
            loan_id = loan.id,
            book_id = book.id,
            member_id,
            available_copies = book.available_copies,
            "Book returned"
        );

        Ok(loan)
    }

    /// Push back the due date of a loan
    pub async fn extend_due_date(&self, loan_id: i32, request: &ExtendDueDate) -> AppResult<Loan> {
        let mut tx = self.repository.begin().await?;

        let mut loan = self.repository.loans.lock_by_id(&mut tx, loan_id).await?;
        let previous = loan.due_date;
        loan.extend(request, today())?;

        let loan = self.repository.loans.save(&mut tx, &loan).await?;
        tx.commit().await?;

        tracing::info!(loan_id, %previous, due_date = %loan.due_date, "Loan due date extended");
        Ok(loan)
    }

    /// Members with the most unreturned loans
    pub async fn top_active_members(&self) -> AppResult<Vec<TopActiveMember>> {
        self.repository.members.top_active(TOP_ACTIVE_LIMIT).await
    }

    pub async fn list(&self, query: &LoanQuery) -> AppResult<Vec<Loan>> {
        self.repository.loans.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        self.repository.loans.get_by_id(id).await
    }

    /// Get every loan of a member
    pub async fn get_member_loans(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;
        let query = LoanQuery {
            member_id: Some(member_id),
            ..Default::default()
        };
        self.repository.loans.list(&query).await
    }
}
