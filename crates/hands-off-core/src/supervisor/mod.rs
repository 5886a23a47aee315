pub(crate) mod launcher;
mod state;
#[allow(clippy::module_inception)]
mod supervisor;

pub use {
    launcher::BackendConfig,
    state::{BackendState, RETRY_BUDGET_CEILING},
    supervisor::BackendSupervisor,
};
