mod builder;
#[allow(clippy::module_inception)]
mod debouncer;
mod deferred;
mod receiver;
pub use builder::*;
pub use debouncer::*;
pub use deferred::*;
pub use receiver::*;

#[cfg(test)]
mod receiver_test;
