use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "QUIZDRILL_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Logs go to stderr so they never interleave with prompts
/// on stdout.
pub fn init_tracing(flag: Option<&str>) {
    let from_env = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(flag, from_env.as_deref());
    let env_filter =
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn filter_directive<'a>(flag: Option<&'a str>, from_env: Option<&'a str>) -> &'a str {
    flag.or(from_env)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env_and_default_is_warn() {
        assert_eq!(filter_directive(Some("debug"), Some("info")), "debug");
        assert_eq!(filter_directive(None, Some("services=info")), "services=info");
        assert_eq!(filter_directive(None, Some("  ")), "warn");
        assert_eq!(filter_directive(None, None), "warn");
    }
}
