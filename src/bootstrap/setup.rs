use env_logger::Builder;
use log::LevelFilter;

/// Only show INFO+ globally, WARN+ for Rocket. `RUST_LOG` overrides both.
pub fn init_logger() {
    Builder::new()
        .filter(None, LevelFilter::Info)
        .filter(Some("rocket"), LevelFilter::Warn)
        .parse_default_env()
        .init();
}
