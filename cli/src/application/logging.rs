use tracing_subscriber::EnvFilter;

use crate::args::LogArgs;

/// Logs go to stderr so they never interleave with console output on
/// stdout. `RUST_LOG` wins over `--log-level` when set.
pub fn init_logger(args: &LogArgs) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if args.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
