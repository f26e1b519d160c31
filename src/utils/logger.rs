use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directives when `RUST_LOG` is unset. Audit events live under
/// `garden_gate::audit`, so every default keeps them at `info`.
pub const SERVER_DIRECTIVES: &str = "garden_gate=info,info";
pub const SERVER_VERBOSE_DIRECTIVES: &str = "garden_gate=debug,tower_http=debug,info";
pub const LAMBDA_DIRECTIVES: &str = "garden_gate=info";

pub fn server_filter(verbose: bool) -> EnvFilter {
    let directives = if verbose {
        SERVER_VERBOSE_DIRECTIVES
    } else {
        SERVER_DIRECTIVES
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

pub fn lambda_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LAMBDA_DIRECTIVES))
}

pub fn init_server_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(server_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_lambda_logger() {
    tracing_subscriber::registry()
        .with(lambda_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .without_time()
                .json(), // CloudWatch 解析 JSON 格式
        )
        .init();
}
