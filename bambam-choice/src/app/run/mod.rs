mod run_ops;

pub use run_ops::{run, run_with_cancellation, validate};
