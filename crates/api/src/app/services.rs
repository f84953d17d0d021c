use armetix_infra::Engine;

use crate::config::ApiConfig;

/// Shared state handed to every handler through an `Extension`.
#[derive(Debug)]
pub struct AppServices {
    pub engine: Engine,
}

pub fn build_services(config: &ApiConfig) -> AppServices {
    AppServices {
        engine: Engine::with_low_stock_threshold(config.low_stock_threshold),
    }
}
