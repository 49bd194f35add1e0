//! Routes the `log` facade to stderr through `env_logger`.

use std::sync::Once;

use env_logger::Env;

pub const ENV_LOG: &str = "METALBINDING_LOG";

static INIT: Once = Once::new();

/// Installs the logger the first time a context is created. A host that
/// already installed its own `log` backend keeps it.
pub fn init() {
    INIT.call_once(|| {
        let env = Env::new().filter_or(ENV_LOG, "warn");
        if env_logger::Builder::from_env(env)
            .format_target(true)
            .try_init()
            .is_ok()
        {
            log::debug!("logging initialised from {ENV_LOG}");
        }
    });
}
