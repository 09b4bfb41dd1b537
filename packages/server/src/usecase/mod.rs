//! UseCase layer: the server registry and its command dispatcher.

mod dispatch;
mod messaging;
mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use registry::{ChatRegistry, DEFAULT_ROOMS, LastMessage};
