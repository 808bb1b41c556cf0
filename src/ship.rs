//! Per-ship physics state: double-buffered transforms, subspace attachment
//! records, and the registry that answers “which ship owns this point”.

mod pose;
pub use pose::*;
mod registry;
pub use registry::*;
mod subspace;
pub use subspace::*;
