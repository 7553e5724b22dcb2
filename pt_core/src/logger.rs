/*!
 * Logging for plutonian-shores utils.
 * Messages go to stderr through tracing so stdout only carries results.
 * Default level is warn, --verbose raises it to info, RUST_LOG overrides both.
 */
use tracing_subscriber::EnvFilter;

pub fn init_logger(verbose: bool) {
    // try_init: a second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level(verbose).into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn default_level(verbose: bool) -> &'static str {
    return if verbose { "info" } else { "warn" };
}

#[macro_export]
macro_rules! printinfo {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}
#[macro_export]
macro_rules! printwarn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}
#[macro_export]
macro_rules! printerror {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}
