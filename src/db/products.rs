use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::error::{is_unique_violation, CatalogError, CatalogResult};
use crate::db::page::{self, Page, PageRequest};
use crate::db::Database;
use crate::models::{Category, Product};

/// Sort keys accepted for product listings. Unrecognized input from the
/// boundary falls back to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSortField {
    #[default]
    Name,
    Code,
    Price,
    Id,
    Created,
}

impl ProductSortField {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "code" => Self::Code,
            "price" => Self::Price,
            "id" => Self::Id,
            "created" | "created_at" | "createdat" => Self::Created,
            _ => Self::Name,
        }
    }

    fn order_expr(self) -> &'static str {
        match self {
            Self::Name => "p.name",
            Self::Code => "p.code",
            // Price is stored as TEXT; order numerically.
            Self::Price => "CAST(p.price AS REAL)",
            Self::Id => "p.id",
            Self::Created => "p.created_at",
        }
    }
}

impl Database {
    pub(crate) fn list_products(
        &self,
        req: &PageRequest<ProductSortField>,
    ) -> CatalogResult<Page<Product>> {
        self.query_products(None, None, false, req)
    }

    /// Windowed product listing filtered to rows whose name *or* code
    /// contains `term` (case-insensitive). A blank term behaves as `list`.
    pub(crate) fn search_products(
        &self,
        term: Option<&str>,
        req: &PageRequest<ProductSortField>,
    ) -> CatalogResult<Page<Product>> {
        self.query_products(None, term, true, req)
    }

    pub(crate) fn products_by_category(
        &self,
        category_id: i64,
        req: &PageRequest<ProductSortField>,
    ) -> CatalogResult<Page<Product>> {
        self.query_products(Some(category_id), None, false, req)
    }

    /// Category filter combined with a name-only substring match. A blank
    /// term drops the name filter.
    pub(crate) fn search_products_in_category(
        &self,
        category_id: i64,
        term: Option<&str>,
        req: &PageRequest<ProductSortField>,
    ) -> CatalogResult<Page<Product>> {
        self.query_products(Some(category_id), term, false, req)
    }

    fn query_products(
        &self,
        category_id: Option<i64>,
        term: Option<&str>,
        match_code: bool,
        req: &PageRequest<ProductSortField>,
    ) -> CatalogResult<Page<Product>> {
        let mut filter = String::from(" WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(cid) = category_id {
            filter.push_str(&format!(" AND p.category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cid));
        }
        if let Some(t) = page::normalize_term(term) {
            let n = param_values.len() + 1;
            if match_code {
                filter.push_str(&format!(
                    " AND (p.name LIKE ?{n} ESCAPE '\\' OR p.code LIKE ?{n} ESCAPE '\\')"
                ));
            } else {
                filter.push_str(&format!(" AND p.name LIKE ?{n} ESCAPE '\\'"));
            }
            param_values.push(Box::new(page::like_pattern(t)));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM products p{filter}"),
            params_ref.as_slice(),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT p.id, p.code, p.name, p.price, p.created_at, c.id, c.name, c.created_at
             FROM products p JOIN categories c ON p.category_id = c.id{filter}
             ORDER BY {} {}, p.id ASC LIMIT {} OFFSET {}",
            req.sort_by.order_expr(),
            req.dir.as_sql(),
            req.limit(),
            req.offset(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), Self::product_from_row)?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(items, req.page, req.size, total as u64))
    }

    pub(crate) fn get_product_by_id(&self, id: i64) -> CatalogResult<Option<Product>> {
        Self::product_row(&self.conn, id)
    }

    /// Create (id unset) or update (id set) a product. Enforces the
    /// case-insensitive code uniqueness invariant and resolves the category
    /// reference inside the same transaction, so the returned entity always
    /// carries the canonical category row.
    pub(crate) fn save_product(&mut self, product: &Product) -> CatalogResult<Product> {
        let code = product.code.trim();
        if code.is_empty() {
            return Err(CatalogError::MissingField("product code"));
        }
        let category_id = product.category.id.ok_or(CatalogError::CategoryMissing)?;

        let tx = self.conn.transaction()?;

        if Self::category_row(&tx, category_id)?.is_none() {
            return Err(CatalogError::CategoryNotFound(category_id));
        }
        if Self::product_code_taken(&tx, code, product.id)? {
            return Err(CatalogError::DuplicateCode(code.to_string()));
        }

        let saved_id = match product.id {
            Some(id) => {
                let updated = tx
                    .execute(
                        "UPDATE products SET code = ?1, name = ?2, price = ?3, category_id = ?4
                         WHERE id = ?5",
                        params![
                            code,
                            product.name,
                            product.price.to_string(),
                            category_id,
                            id
                        ],
                    )
                    .map_err(|e| Self::map_duplicate_code(e, code))?;
                if updated == 0 {
                    return Err(CatalogError::ProductNotFound(id));
                }
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO products (code, name, price, category_id, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        code,
                        product.name,
                        product.price.to_string(),
                        category_id,
                        product.created_at
                    ],
                )
                .map_err(|e| Self::map_duplicate_code(e, code))?;
                tx.last_insert_rowid()
            }
        };

        let saved =
            Self::product_row(&tx, saved_id)?.ok_or(CatalogError::ProductNotFound(saved_id))?;
        tx.commit()?;
        tracing::debug!(id = saved_id, code, "saved product");
        Ok(saved)
    }

    /// Permanently remove a product. Nothing references products, so the
    /// only failure is an unknown id.
    pub(crate) fn delete_product(&mut self, id: i64) -> CatalogResult<()> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM products WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CatalogError::ProductNotFound(id));
        }
        tx.commit()?;
        tracing::debug!(id, "deleted product");
        Ok(())
    }

    // ── Row helpers ───────────────────────────────────────────

    fn product_row(conn: &Connection, id: i64) -> CatalogResult<Option<Product>> {
        let result = conn.query_row(
            "SELECT p.id, p.code, p.name, p.price, p.created_at, c.id, c.name, c.created_at
             FROM products p JOIN categories c ON p.category_id = c.id WHERE p.id = ?1",
            params![id],
            Self::product_from_row,
        );
        match result {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn product_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
        let price_str: String = row.get(3)?;
        Ok(Product {
            id: Some(row.get(0)?),
            code: row.get(1)?,
            name: row.get(2)?,
            price: Decimal::from_str(&price_str).unwrap_or_default(),
            created_at: row.get(4)?,
            category: Category {
                id: Some(row.get(5)?),
                name: row.get(6)?,
                created_at: row.get(7)?,
            },
        })
    }

    // The code column carries COLLATE NOCASE, so equality here is
    // case-insensitive. `exclude_id` makes updates ignore the row itself.
    fn product_code_taken(
        conn: &Connection,
        code: &str,
        exclude_id: Option<i64>,
    ) -> CatalogResult<bool> {
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM products WHERE code = ?1 AND id != ?2)",
            params![code, exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )?)
    }

    fn map_duplicate_code(err: rusqlite::Error, code: &str) -> CatalogError {
        if is_unique_violation(&err, "products.code") {
            CatalogError::DuplicateCode(code.to_string())
        } else {
            err.into()
        }
    }
}
