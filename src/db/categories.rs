use rusqlite::{params, Connection};

use crate::db::error::{is_unique_violation, CatalogError, CatalogResult};
use crate::db::page::{self, Page, PageRequest};
use crate::db::Database;
use crate::models::Category;

/// Sort keys accepted for category listings. Unrecognized input from the
/// boundary falls back to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySortField {
    #[default]
    Name,
    Id,
    Created,
}

impl CategorySortField {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "id" => Self::Id,
            "created" | "created_at" | "createdat" => Self::Created,
            _ => Self::Name,
        }
    }

    fn order_expr(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
            Self::Created => "created_at",
        }
    }
}

impl Database {
    pub(crate) fn list_categories(
        &self,
        req: &PageRequest<CategorySortField>,
    ) -> CatalogResult<Page<Category>> {
        self.search_categories(None, req)
    }

    /// Windowed category listing, optionally filtered to names containing
    /// `term` (case-insensitive). A blank term behaves exactly as `list`.
    pub(crate) fn search_categories(
        &self,
        term: Option<&str>,
        req: &PageRequest<CategorySortField>,
    ) -> CatalogResult<Page<Category>> {
        let mut filter = String::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(t) = page::normalize_term(term) {
            filter.push_str(" WHERE name LIKE ?1 ESCAPE '\\'");
            param_values.push(Box::new(page::like_pattern(t)));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        // Filter applies before windowing, so totals reflect the filtered set.
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM categories{filter}"),
            params_ref.as_slice(),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT id, name, created_at FROM categories{filter}
             ORDER BY {} {}, id ASC LIMIT {} OFFSET {}",
            req.sort_by.order_expr(),
            req.dir.as_sql(),
            req.limit(),
            req.offset(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(items, req.page, req.size, total as u64))
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> CatalogResult<Option<Category>> {
        Self::category_row(&self.conn, id)
    }

    /// Create (id unset) or update (id set) a category, enforcing the
    /// case-insensitive name uniqueness invariant. Returns the canonical
    /// saved entity.
    pub(crate) fn save_category(&mut self, category: &Category) -> CatalogResult<Category> {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(CatalogError::MissingField("category name"));
        }

        let tx = self.conn.transaction()?;

        if Self::category_name_taken(&tx, name, category.id)? {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }

        let saved_id = match category.id {
            Some(id) => {
                let updated = tx
                    .execute(
                        "UPDATE categories SET name = ?1 WHERE id = ?2",
                        params![name, id],
                    )
                    .map_err(|e| Self::map_duplicate_name(e, name))?;
                if updated == 0 {
                    return Err(CatalogError::CategoryNotFound(id));
                }
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO categories (name, created_at) VALUES (?1, ?2)",
                    params![name, category.created_at],
                )
                .map_err(|e| Self::map_duplicate_name(e, name))?;
                tx.last_insert_rowid()
            }
        };

        let saved =
            Self::category_row(&tx, saved_id)?.ok_or(CatalogError::CategoryNotFound(saved_id))?;
        tx.commit()?;
        tracing::debug!(id = saved_id, name, "saved category");
        Ok(saved)
    }

    /// Permanently remove a category. Fails while any product still
    /// references it; the guard and the delete run in one transaction.
    pub(crate) fn delete_category(&mut self, id: i64) -> CatalogResult<()> {
        let tx = self.conn.transaction()?;

        let Some(category) = Self::category_row(&tx, id)? else {
            return Err(CatalogError::CategoryNotFound(id));
        };
        let product_count = Self::count_products_in(&tx, id)?;
        if product_count > 0 {
            return Err(CatalogError::CategoryInUse {
                name: category.name,
                product_count,
            });
        }

        tx.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        tx.commit()?;
        tracing::debug!(id, "deleted category");
        Ok(())
    }

    /// Number of products referencing this category.
    pub(crate) fn category_product_count(&self, id: i64) -> CatalogResult<i64> {
        Self::count_products_in(&self.conn, id)
    }

    // ── Shared row helpers ────────────────────────────────────

    pub(super) fn category_row(conn: &Connection, id: i64) -> CatalogResult<Option<Category>> {
        let result = conn.query_row(
            "SELECT id, name, created_at FROM categories WHERE id = ?1",
            params![id],
            |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(super) fn count_products_in(conn: &Connection, category_id: i64) -> CatalogResult<i64> {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM products WHERE category_id = ?1",
            params![category_id],
            |row| row.get(0),
        )?)
    }

    // The name column carries COLLATE NOCASE, so equality here is
    // case-insensitive. `exclude_id` makes updates ignore the row itself.
    fn category_name_taken(
        conn: &Connection,
        name: &str,
        exclude_id: Option<i64>,
    ) -> CatalogResult<bool> {
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?1 AND id != ?2)",
            params![name, exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )?)
    }

    fn map_duplicate_name(err: rusqlite::Error, name: &str) -> CatalogError {
        if is_unique_violation(&err, "categories.name") {
            CatalogError::DuplicateName(name.to_string())
        } else {
            err.into()
        }
    }
}
