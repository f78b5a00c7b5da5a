use thiserror::Error;

/// Validation and lookup failures surfaced by the catalog store.
///
/// Every variant is a local, non-retryable failure; the presentation layer
/// maps each kind to a user-facing message. Infrastructure faults pass
/// through as `Db`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("category with id {0} not found")]
    CategoryNotFound(i64),

    #[error("product with id {0} not found")]
    ProductNotFound(i64),

    #[error("category with name '{0}' already exists")]
    DuplicateName(String),

    #[error("product with code '{0}' already exists")]
    DuplicateCode(String),

    #[error("cannot delete category '{name}': {product_count} product(s) still reference it; delete those products first")]
    CategoryInUse { name: String, product_count: i64 },

    #[error("product must reference a saved category")]
    CategoryMissing,

    #[error("{0} must not be blank")]
    MissingField(&'static str),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// True when `err` is a UNIQUE constraint failure on the given column
/// (e.g. "categories.name"). The unique indexes are the source of truth for
/// uniqueness; a writer losing a check-then-insert race lands here.
pub(crate) fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains("UNIQUE constraint failed")
                && msg.contains(column)
        }
        _ => false,
    }
}
