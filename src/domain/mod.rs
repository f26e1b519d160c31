// Domain layer: core models and ports (interfaces). No transport or HTTP client types here.

pub mod model;
pub mod ports;
