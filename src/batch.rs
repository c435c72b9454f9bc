//! Parameter-ceiling aware batching of non-queries.

mod packer;
mod runner;

pub use packer::{BatchPacker, PackedBatch};
pub use runner::BatchRunReport;
pub(crate) use runner::{
    execute_in_transaction, execute_in_transaction_async, run_batches, run_batches_async,
};
