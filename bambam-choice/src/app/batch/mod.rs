mod batch_ops;
mod batch_report;
mod decision_maker_record;

pub use batch_ops::{run_batch, BatchOptions};
pub use batch_report::{BatchReport, DecisionMakerFailure};
pub use decision_maker_record::DecisionMakerRecord;
