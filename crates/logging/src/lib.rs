//! helpers for logging.
//!
//! Libraries in this workspace only ever talk to the [log] facade.  Binaries, demos, and tests call one of the
//! functions here to actually get output.

/// Filter used when `RUST_LOG` isn't set.
pub const DEFAULT_FILTER: &str = "info";

static ONCE: std::sync::Once = std::sync::Once::new();

fn build(default_filter: &str, is_test: bool) -> env_logger::Builder {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    builder.is_test(is_test).format(|buf, record| {
        use std::io::Write;

        let now = time::OffsetDateTime::now_utc();

        writeln!(
            buf,
            "{} {} time={} target={}",
            record.level(),
            record.args(),
            now,
            record.target()
        )
    });

    builder
}

/// Log to stderr, using `RUST_LOG` if set and [DEFAULT_FILTER] otherwise.
///
/// If called multiple times in the same process, only applies once.
pub fn log_to_stderr() {
    log_to_stderr_with_default(DEFAULT_FILTER);
}

/// Like [log_to_stderr], but with a caller-chosen filter for when `RUST_LOG` is unset.
pub fn log_to_stderr_with_default(default_filter: &str) {
    ONCE.call_once(|| {
        // Someone else may have installed a logger first; theirs wins.
        let _ = build(default_filter, false).try_init();
    });
}

/// Route logging through the test harness's captured output.
///
/// Safe to call from every test.
pub fn log_for_tests() {
    ONCE.call_once(|| {
        let _ = build("debug", true).try_init();
    });
}
