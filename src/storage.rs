pub mod directory;
mod requests;

pub use directory::{Directory, LoadError};
pub use requests::{JsonRequestStore, MemoryRequestStore, RequestStore, StoreError};
