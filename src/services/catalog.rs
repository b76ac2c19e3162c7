//! Catalog management service (authors and books)

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, BookQuery, CreateBook, UpdateBook},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.create(data).await
    }

    pub async fn update_author(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.update(id, data).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    /// Search books, returning one page and the total match count
    pub async fn search_books(&self, query: &BookQuery, limit: i64, offset: i64) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query, limit, offset).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        data.validate()?;
        let (total_copies, available_copies) = data.copies()?;
        // Verify author exists
        self.repository.authors.get_by_id(data.author_id).await?;
        self.repository
            .books
            .create(
                &data.title,
                data.author_id,
                data.isbn.as_deref(),
                total_copies,
                available_copies,
            )
            .await
    }

    /// Update a book; copies already on loan stay on loan when `total_copies` changes
    pub async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        data.validate()?;
        let mut tx = self.repository.begin().await?;

        let mut book = self.repository.books.lock_by_id(&mut tx, id).await?;
        if let Some(ref title) = data.title {
            book.title = title.clone();
        }
        if let Some(author_id) = data.author_id {
            // Verify author exists
            self.repository.authors.get_by_id(author_id).await?;
            book.author_id = author_id;
        }
        if let Some(ref isbn) = data.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(total_copies) = data.total_copies {
            book.resize(total_copies)?;
        }

        let book = self.repository.books.save(&mut tx, &book).await?;
        tx.commit().await?;
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
