//! Value representations: constructed (internal) and flattened (external) forms,
//! plus the per-template value store.

mod external;
mod internal;
mod store;

pub use external::ExternalValue;
pub use internal::{InternalPart, InternalValue};
pub(crate) use store::ValueStore;
