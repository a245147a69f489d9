use kvcntl::{cli, config, telemetry};

fn main() {
    let cli = cli::parse_from(std::env::args_os());

    let forwarder = telemetry::LogForwarder::new();
    let _telemetry_guard = init_tracing(cli.verbose, forwarder.clone());

    if let Err(e) = cli::run(cli, forwarder) {
        tracing::error!(code = e.code(), "error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8, forwarder: telemetry::LogForwarder) -> telemetry::TelemetryGuard {
    // A broken layer only costs its own settings; `run` warns about it once
    // the subscriber is up.
    let cfg = config::load_or_default();
    let telemetry_cfg =
        telemetry::TelemetryConfig::new(verbose, cfg.logging).with_forwarder(forwarder);
    telemetry::init(telemetry_cfg)
}
