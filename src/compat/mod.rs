//! Compatibility resolution — which models and runtimes can run on this host.
//!
//! Both resolvers are pure functions of (catalog, hardware profile): no I/O,
//! no hidden state, one verdict per catalog entry in catalog order. They
//! never fail; anything they cannot classify is `Unsupported`.

pub(crate) mod model;
pub(crate) mod runtime;

pub use model::{resolve_models, ModelCompatibility, ModelStatus};
pub use runtime::{resolve_runtimes, RuntimeCompatibility, RuntimeStatus};
