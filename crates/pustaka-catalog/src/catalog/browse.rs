//! Category browsing: static query tables, pagination, fallback broadening

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::{CatalogService, SessionCounter};
use crate::domain::{CatalogEntry, Category};
use crate::sources::{Provider, SearchOptions, SortOrder};

/// The mandatory unfiltered entry present in every category table.
pub const ALL_FILTER: &str = "All";

/// Last-resort query should a category table ever be absent.
const GENERIC_ALL_QUERY: &str = "buku";

/// Disambiguating term appended to every internship-report query to bias
/// matches toward genuine reports rather than unrelated book matches.
const REPORT_SUFFIX: &str = "internship report";

lazy_static! {
    /// Immutable category -> (filter label -> provider query) tables,
    /// built once at startup.
    static ref CATEGORY_QUERIES: HashMap<Category, HashMap<&'static str, &'static str>> = {
        let mut tables = HashMap::new();

        let mut books = HashMap::new();
        books.insert(ALL_FILTER, "buku");
        books.insert("Fiksi", "subject:fiction");
        books.insert("Pendidikan", "subject:education");
        books.insert("Sains", "subject:science");
        books.insert("Teknologi", "subject:technology");
        books.insert("Sejarah", "subject:history");
        books.insert("Agama", "subject:religion");
        tables.insert(Category::DigitalBook, books);

        let mut journals = HashMap::new();
        journals.insert(ALL_FILTER, "jurnal ilmiah");
        journals.insert("Penelitian", "jurnal penelitian");
        journals.insert("Ilmiah", "jurnal ilmiah nasional");
        journals.insert("Kesehatan", "jurnal kesehatan");
        journals.insert("Ekonomi", "jurnal ekonomi");
        journals.insert("Sosial", "jurnal sosial humaniora");
        tables.insert(Category::Journal, journals);

        let mut modules = HashMap::new();
        modules.insert(ALL_FILTER, "modul pembelajaran");
        modules.insert("Matematika", "modul pembelajaran matematika");
        modules.insert("Fisika", "modul pembelajaran fisika");
        modules.insert("Kimia", "modul pembelajaran kimia");
        modules.insert("Biologi", "modul pembelajaran biologi");
        modules.insert("Informatika", "modul pembelajaran informatika");
        tables.insert(Category::TeachingModule, modules);

        let mut reports = HashMap::new();
        reports.insert(ALL_FILTER, "laporan magang");
        reports.insert("Industri", "laporan praktik kerja industri");
        reports.insert("Laboratorium", "laporan kerja laboratorium");
        reports.insert("Instansi", "laporan magang instansi");
        tables.insert(Category::InternshipReport, reports);

        tables
    };
}

/// Resolve a (category, filter label) pair to a provider query string.
/// Unknown labels fall back to the category's "All" entry.
pub(crate) fn resolve_category_query(category: Category, filter_label: &str) -> String {
    let base = CATEGORY_QUERIES
        .get(&category)
        .and_then(|table| table.get(filter_label).or_else(|| table.get(ALL_FILTER)))
        .copied()
        .unwrap_or(GENERIC_ALL_QUERY);

    if category == Category::InternshipReport {
        format!("{} {}", base, REPORT_SUFFIX)
    } else {
        base.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct BrowseOptions {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub filter_label: String,
    pub sort_order: SortOrder,
}

impl Default for BrowseOptions {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            filter_label: ALL_FILTER.to_string(),
            sort_order: SortOrder::Relevance,
        }
    }
}

#[derive(Debug)]
pub struct BrowsePage {
    pub entries: Vec<CatalogEntry>,
    /// Authoritative provider-reported total for the resolved query. Can be
    /// very large or imprecise for broad queries; callers are expected to
    /// cap the number of navigable pages for display. That cap is a caller
    /// policy, not enforced here.
    pub provider_total: u32,
}

impl<A: Provider, B: Provider, S: SessionCounter> CatalogService<A, B, S> {
    /// Browse one category page by filter label.
    ///
    /// Category browsing always uses Google Books. When a narrow filter
    /// yields nothing at the requested offset, the query is broadened once
    /// to the category's "All" entry at the same offset, so narrow filters
    /// never produce dead-end empty pages while broader matches exist.
    /// There is no further retry or backoff beyond that single broadening.
    pub async fn browse(&self, category: Category, options: &BrowseOptions) -> BrowsePage {
        let query = resolve_category_query(category, &options.filter_label);
        let provider_options = SearchOptions {
            limit: options.limit,
            start_index: options.page.saturating_sub(1) * options.limit,
            order_by: options.sort_order,
            language: None,
            category,
        };

        let mut outcome = self.google_books.search(&query, &provider_options).await;

        if outcome.entries.is_empty() && options.filter_label != ALL_FILTER {
            let broadened = resolve_category_query(category, ALL_FILTER);
            tracing::debug!(
                category = category.as_str(),
                filter = %options.filter_label,
                "narrow filter empty, broadening to the unfiltered query"
            );
            outcome = self.google_books.search(&broadened, &provider_options).await;
        }

        BrowsePage {
            entries: outcome.entries,
            provider_total: outcome.provider_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::ScriptedProvider;
    use crate::catalog::NoSessionCounter;
    use test_case::test_case;

    fn service(
        google: ScriptedProvider,
    ) -> CatalogService<ScriptedProvider, ScriptedProvider, NoSessionCounter> {
        CatalogService::with_parts(ScriptedProvider::default(), google, NoSessionCounter)
    }

    #[test_case(Category::DigitalBook, "Fiksi", "subject:fiction"; "book label")]
    #[test_case(Category::DigitalBook, "All", "buku"; "book all")]
    #[test_case(Category::DigitalBook, "Tak Dikenal", "buku"; "unknown label falls back to all")]
    #[test_case(Category::Journal, "Kesehatan", "jurnal kesehatan"; "journal label")]
    #[test_case(Category::TeachingModule, "Kimia", "modul pembelajaran kimia"; "module label")]
    #[test_case(
        Category::InternshipReport,
        "All",
        "laporan magang internship report";
        "report all gets the suffix"
    )]
    #[test_case(
        Category::InternshipReport,
        "Industri",
        "laporan praktik kerja industri internship report";
        "report label gets the suffix"
    )]
    fn test_resolve_category_query(category: Category, label: &str, expected: &str) {
        assert_eq!(resolve_category_query(category, label), expected);
    }

    #[test]
    fn test_every_category_table_has_an_all_entry() {
        for table in CATEGORY_QUERIES.values() {
            assert!(table.contains_key(ALL_FILTER));
        }
        assert_eq!(CATEGORY_QUERIES.len(), 4);
    }

    #[tokio::test]
    async fn test_pagination_math() {
        let google = ScriptedProvider::default();
        let service = service(google);

        service
            .browse(
                Category::DigitalBook,
                &BrowseOptions {
                    page: 3,
                    limit: 10,
                    ..Default::default()
                },
            )
            .await;

        let calls = service.google_books.search_calls();
        assert_eq!(calls[0].1.start_index, 20);
        assert_eq!(calls[0].1.limit, 10);
    }

    #[tokio::test]
    async fn test_page_zero_is_clamped() {
        let google = ScriptedProvider::default();
        let service = service(google);

        service
            .browse(
                Category::DigitalBook,
                &BrowseOptions {
                    page: 0,
                    limit: 10,
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(service.google_books.search_calls()[0].1.start_index, 0);
    }

    #[tokio::test]
    async fn test_narrow_filter_broadens_once_at_same_offset() {
        let mut google = ScriptedProvider::default();
        google.add_titles("subject:fiction", &[]);
        google.add_titles("buku", &["Broadened Hit"]);
        let service = service(google);

        let page = service
            .browse(
                Category::DigitalBook,
                &BrowseOptions {
                    page: 2,
                    limit: 5,
                    filter_label: "Fiksi".to_string(),
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].title, "Broadened Hit");

        let calls = service.google_books.search_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "subject:fiction");
        assert_eq!(calls[1].0, "buku");
        // Same offset and limit on the broadened retry
        assert_eq!(calls[1].1.start_index, 5);
        assert_eq!(calls[1].1.limit, 5);
    }

    #[tokio::test]
    async fn test_empty_all_query_is_not_retried() {
        let google = ScriptedProvider::default();
        let service = service(google);

        let page = service
            .browse(Category::Journal, &BrowseOptions::default())
            .await;

        assert!(page.entries.is_empty());
        assert_eq!(service.google_books.search_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_total_is_passed_through() {
        let mut google = ScriptedProvider::default();
        google.add_counted("jurnal ilmiah", 4821);
        let service = service(google);

        let page = service
            .browse(Category::Journal, &BrowseOptions::default())
            .await;

        assert_eq!(page.provider_total, 4821);
    }

    #[tokio::test]
    async fn test_category_reaches_the_provider_call() {
        let google = ScriptedProvider::default();
        let service = service(google);

        service
            .browse(Category::TeachingModule, &BrowseOptions::default())
            .await;

        let calls = service.google_books.search_calls();
        assert_eq!(calls[0].1.category, Category::TeachingModule);
    }
}
