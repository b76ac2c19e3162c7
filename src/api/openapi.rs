//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, health, loans, members};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bibliotheca API",
        version = "0.1.0",
        description = "Library lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::loan_book,
        books::return_book,
        // Members
        members::list_members,
        members::get_member,
        members::create_member,
        members::update_member,
        members::delete_member,
        members::top_active_members,
        members::get_member_loans,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::extend_due_date,
    ),
    components(
        schemas(
            // Authors
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::BookPage,
            // Members
            crate::models::member::Member,
            crate::models::member::CreateMember,
            crate::models::member::UpdateMember,
            crate::models::member::TopActiveMember,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::MemberRef,
            crate::models::loan::ExtendDueDate,
            crate::models::loan::LoanConfirmation,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book catalog management"),
        (name = "members", description = "Member management"),
        (name = "loans", description = "Loan lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
