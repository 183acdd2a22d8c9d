use std::sync::Arc;

use common::storage::ObjectStore;
use listing::{InFlightSubmissions, ProductStore};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub products: Arc<dyn ProductStore>,
    pub objects: Arc<dyn ObjectStore>,
    /// Users whose product submission is being persisted.
    pub submissions: Arc<InFlightSubmissions>,
}
