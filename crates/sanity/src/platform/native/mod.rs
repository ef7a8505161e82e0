//! Native platform implementations using the filesystem and threads.

mod storage;
mod worker;

pub use storage::NativeStorage;
pub use worker::ThreadExecutor;
