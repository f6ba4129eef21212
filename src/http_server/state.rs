use std::sync::Arc;

use crate::database::Database;
use crate::ports::clock::Clock;

pub struct AppState {
    pub db: Arc<Database>,
    pub clock: Arc<dyn Clock>,
    /// How many venues and artists the home page lists.
    pub recent_listings: u64,
}
