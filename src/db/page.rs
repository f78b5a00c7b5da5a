/// Sort direction for paginated queries. Anything other than "desc"
/// (case-insensitive) parses as ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A window over an ordered result set: zero-based page index, page size,
/// sort key and direction. `S` is the per-entity sort field enum.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<S> {
    pub page: u32,
    pub size: u32,
    pub sort_by: S,
    pub dir: SortDir,
}

impl<S> PageRequest<S> {
    pub fn new(page: u32, size: u32, sort_by: S, dir: SortDir) -> Self {
        Self {
            page,
            size,
            sort_by,
            dir,
        }
    }

    // A zero size would make every window empty and page math divide by
    // zero; clamp to one row per page.
    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.size.max(1))
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page) * self.limit()
    }
}

/// One window of an ordered, filtered result set plus totals. Totals always
/// reflect the filtered set, not the whole table.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, page: u32, size: u32, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(u64::from(size.max(1))) as u32;
        Self {
            items,
            page,
            total_items,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Treat blank or whitespace-only search input as absent.
pub(crate) fn normalize_term(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

/// Build a `%term%` LIKE pattern with wildcards escaped, so the term matches
/// as a literal substring. Queries using it must add `ESCAPE '\'`.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
