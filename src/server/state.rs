use axum::extract::FromRef;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::fetcher::{CatalogSearch, MediaFetcher};
use crate::ledger::LedgerStore;

use super::ServerConfig;

pub type GuardedLedger = Arc<Mutex<LedgerStore>>;
pub type OptionalMediaFetcher = Option<Arc<dyn MediaFetcher>>;
pub type OptionalCatalogSearch = Option<Arc<dyn CatalogSearch>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub ledger: GuardedLedger,
    pub media_fetcher: OptionalMediaFetcher,
    pub catalog_search: OptionalCatalogSearch,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedLedger {
    fn from_ref(input: &ServerState) -> Self {
        input.ledger.clone()
    }
}

impl FromRef<ServerState> for OptionalMediaFetcher {
    fn from_ref(input: &ServerState) -> Self {
        input.media_fetcher.clone()
    }
}

impl FromRef<ServerState> for OptionalCatalogSearch {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_search.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
