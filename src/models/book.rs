//! Book and author models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
}

/// Bibliographic record; physical copies are `BookStock` rows
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    pub author_id: Uuid,
    /// Paperback, hardback, ebook...
    pub format: Option<String>,
    pub isbn: Option<String>,
}

/// Book as shown in catalogue listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: Uuid,
    pub name: String,
    pub author_name: String,
}
