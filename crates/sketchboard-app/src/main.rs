//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Sketchboard");

    let config = sketchboard_app::AppConfig::from_env();
    pollster::block_on(sketchboard_app::App::run(config));
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
