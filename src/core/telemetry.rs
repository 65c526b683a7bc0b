use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// sqlx logs every statement at info; keep it quiet unless asked for explicitly.
const DEFAULT_DIRECTIVES: &[&str] = &["sqlx=warn", "tower_http=info"];

pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(settings));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let result = if settings.telemetry().json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|err| anyhow::anyhow!(err.to_string()))
}

fn default_filter(settings: &Settings) -> EnvFilter {
    DEFAULT_DIRECTIVES.iter().fold(
        EnvFilter::new(settings.telemetry().log_level.clone()),
        |filter, directive| match directive.parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        },
    )
}
