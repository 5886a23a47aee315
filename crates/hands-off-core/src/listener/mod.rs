mod debounce;
#[allow(clippy::module_inception)]
mod listener;
mod protocol;

pub(crate) use debounce::DebounceGate;

pub use {listener::EventListener, protocol::TouchEvent};
