//! Best-effort corpus statistics

use serde::Serialize;
use thiserror::Error;

use super::CatalogService;
use crate::domain::Category;
use crate::sources::{Provider, SearchOptions};

/// Live-activity collaborator contract
///
/// Returns a non-negative count of sessions active within a recent time
/// window, or an error. This layer tolerates the error case.
#[allow(async_fn_in_trait)]
pub trait SessionCounter {
    async fn active_sessions(&self) -> Result<u64, SessionCountError>;
}

#[derive(Error, Debug)]
#[error("session count unavailable: {0}")]
pub struct SessionCountError(pub String);

/// Null implementation for wiring the service without the collaborator.
pub struct NoSessionCounter;

impl SessionCounter for NoSessionCounter {
    async fn active_sessions(&self) -> Result<u64, SessionCountError> {
        Err(SessionCountError(
            "no session counter configured".to_string(),
        ))
    }
}

/// Display-ready corpus statistics
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_books: u64,
    pub total_journals: u64,
    pub total_modules: u64,
    pub active_users: u64,
}

/// Served when the entire aggregation fails; statistics must never be
/// visibly unavailable to a caller.
pub const FALLBACK_STATS: CatalogStats = CatalogStats {
    total_books: 1250,
    total_journals: 340,
    total_modules: 85,
    active_users: 12,
};

// Un-indexed local/physical collection, added on top of each probe count.
const BOOKS_BASELINE: u64 = 450;
const JOURNALS_BASELINE: u64 = 120;
const MODULES_BASELINE: u64 = 85;

pub(crate) const PROBE_BOOKS: &str = "buku";
pub(crate) const PROBE_JOURNALS: &str = "jurnal ilmiah";
pub(crate) const PROBE_MODULES: &str = "modul pembelajaran";

impl<A: Provider, B: Provider, S: SessionCounter> CatalogService<A, B, S> {
    /// Best-effort corpus statistics.
    ///
    /// Issues three minimal count probes to Google Books and the
    /// live-activity count concurrently. Probe totals are estimates topped
    /// up with the fixed local-collection baselines. An erroring or idle
    /// activity collaborator degrades to `1`; all probes coming back empty
    /// is indistinguishable from a total outage and serves
    /// [`FALLBACK_STATS`]. Never raises.
    pub async fn catalog_stats(&self) -> CatalogStats {
        let probe = |category: Category| SearchOptions {
            limit: 1,
            category,
            ..SearchOptions::default()
        };

        let books_opts = probe(Category::DigitalBook);
        let journals_opts = probe(Category::Journal);
        let modules_opts = probe(Category::TeachingModule);

        let (books, journals, modules, sessions) = tokio::join!(
            self.google_books.search(PROBE_BOOKS, &books_opts),
            self.google_books.search(PROBE_JOURNALS, &journals_opts),
            self.google_books.search(PROBE_MODULES, &modules_opts),
            self.sessions.active_sessions(),
        );

        if books.provider_total == 0
            && journals.provider_total == 0
            && modules.provider_total == 0
        {
            tracing::warn!("all count probes empty, serving fallback statistics");
            return FALLBACK_STATS;
        }

        let active_users = match sessions {
            Ok(count) if count > 0 => count,
            Ok(_) => 1,
            Err(e) => {
                tracing::warn!(error = %e, "live-activity count degraded");
                1
            }
        };

        CatalogStats {
            total_books: u64::from(books.provider_total) + BOOKS_BASELINE,
            total_journals: u64::from(journals.provider_total) + JOURNALS_BASELINE,
            total_modules: u64::from(modules.provider_total) + MODULES_BASELINE,
            active_users,
        }
    }
}
