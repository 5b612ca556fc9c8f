//! Device properties and their synchronization with the remote endpoint

mod store;
mod sync;

pub use store::{Property, PropertyDef, PropertyStore, PropertyValue, RemoteUpdate, StoreError};
pub use sync::{PatchError, PropertySync};
