pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "server")]
pub use config::CliConfig;

pub use app::build_dispatcher;
pub use config::GatewayConfig;
pub use crate::core::classifier::Classifier;
pub use crate::core::dispatch::{Dispatcher, GatewayResponse, Route, CORS_HEADERS};
pub use crate::core::lexicon::Lexicon;
pub use utils::error::{GatewayError, Result};
