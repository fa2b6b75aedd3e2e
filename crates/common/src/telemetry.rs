use std::sync::Once;

static INIT: Once = Once::new();

/// 初始化日志：默认 info，可通过 RUST_LOG 覆盖。多次调用只生效一次。
pub fn init_logging() {
    INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp_secs()
            .try_init();
        log::debug!("logging initialised");
    });
}
