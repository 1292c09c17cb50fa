use std::sync::Arc;

use crate::models::tokens::TokenRegistry;
use crate::services::router::SwapRouter;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SwapRouter>,
    pub registry: Arc<TokenRegistry>,
    pub chain_id: u64,
}
