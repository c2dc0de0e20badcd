//! CSV loaders and writers for the batch runner. these are a thin harness
//! around the engine; the engine itself only sees the provider traits.
mod matrix_reader;
mod population_reader;
mod result_writer;
mod zone_reader;

pub use matrix_reader::{read_matrices, read_matrix_file};
pub use population_reader::{read_population, read_population_file};
pub use result_writer::{write_failures, write_failures_file, write_results, write_results_file};
pub use zone_reader::{read_zone_file, read_zones};
