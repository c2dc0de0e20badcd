pub mod choice;
pub mod context;
pub mod evaluation;
pub mod expression;
pub mod probability;
pub mod schema;
pub mod simulation;
pub mod spec;

/// user-assigned identifier of an alternative within a choice model.
pub type AlternativeId = u32;

/// identifier of a decision-maker (household, person or tour) in the population.
pub type DecisionMakerId = u64;

/// travel analysis zone identifier, used to index zonal data and skim matrices.
pub type ZoneId = u32;

/// skim time period index.
pub type TimePeriod = u32;
