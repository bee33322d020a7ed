//! Process-wide shared facade
//!
//! The instance is built on first use, from [`init_shared`] if the
//! application called it first, otherwise from [`StoreConfig::from_env`].
//! It starts disconnected; whoever needs it first calls `connect`.
//!
//! The facade itself does no synchronization, so it lives behind a
//! `tokio::sync::Mutex`. Callers hold the guard for the duration of one
//! operation, which serializes all store traffic through a single handle.

use crate::config::StoreConfig;
use crate::facade::StoreFacade;
use once_cell::sync::OnceCell;
use tokio::sync::Mutex;
use tracing::debug;

static SHARED: OnceCell<Mutex<StoreFacade>> = OnceCell::new();

/// Build the shared facade from `config`.
///
/// Returns `false` when the instance already exists, in which case `config`
/// is ignored.
pub fn init_shared(config: StoreConfig) -> bool {
    let mut built = false;
    SHARED.get_or_init(|| {
        built = true;
        build(&config)
    });
    built
}

/// The shared facade, built from the environment if not yet initialized.
pub fn shared() -> &'static Mutex<StoreFacade> {
    SHARED.get_or_init(|| build(&StoreConfig::from_env()))
}

fn build(config: &StoreConfig) -> Mutex<StoreFacade> {
    debug!("Creating shared store facade for {}", config.url);
    Mutex::new(StoreFacade::new(config))
}
