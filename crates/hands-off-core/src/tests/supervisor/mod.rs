#[allow(clippy::module_inception)]
mod supervisor;
