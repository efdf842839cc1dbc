//! Browser console logging.

use crate::error::{Error, Result};

/// Route `log` records to the browser console and install the panic hook.
///
/// # Errors
///
/// Returns [`Error::Logger`] if a global logger is already installed.
pub fn init(level: log::Level) -> Result<()> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(level).map_err(|err| Error::Logger(err.to_string()))?;
    log::info!("console logging at {level}");
    Ok(())
}
