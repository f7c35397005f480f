use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. Explicit directives win over the
/// verbosity flags; a second call is a no-op.
pub fn init(verbose: u8, quiet: bool, directives: Option<&str>) {
    let filter = directives
        .and_then(|d| match EnvFilter::try_new(d) {
            Ok(filter) => Some(filter),
            Err(e) => {
                eprintln!("ignoring invalid log directives {:?}: {}", d, e);
                None
            }
        })
        .unwrap_or_else(|| EnvFilter::new(default_directives(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_directives(verbose: u8, quiet: bool) -> String {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    format!("warn,heartscan_lib={}", level)
}
