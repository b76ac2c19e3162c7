//! Data models for Bibliotheca

pub mod author;
pub mod book;
pub mod loan;
pub mod member;

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable field so that an explicit `null` becomes
/// `Some(None)` while a missing field stays `None` (with `#[serde(default)]`)
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use loan::Loan;
pub use member::{Member, TopActiveMember};
