// Adapters layer: concrete implementations for external systems (upstream API, audit sinks, HTTP).

pub mod audit;
#[cfg(feature = "server")]
pub mod http;
pub mod upstream;
