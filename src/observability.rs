use tracing::{subscriber::set_global_default, Subscriber};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Build the subscriber: `RUST_LOG` filter (falling back to `env_filter`) and a
/// fmt layer, emitting JSON lines when `json` is set.
pub fn get_subscriber(env_filter: &str, json: bool) -> impl Subscriber + Sync + Send {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    let fmt = if json {
        tracing_subscriber::fmt::Layer::new()
            .json()
            .with_current_span(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::Layer::new().boxed()
    };

    Registry::default().with(env_filter).with(fmt)
}

pub fn init_subscriber(subscriber: impl Subscriber + Sync + Send) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}
