pub(crate) mod checker;
pub(crate) mod version;

pub use {
    checker::{UPDATE_CHECK_INTERVAL, UpdateChecker},
    version::{VersionTriple, update_available},
};
