use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the test environment with warn-level logging
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().filter_level(log::LevelFilter::Warn).try_init();
    });
}
