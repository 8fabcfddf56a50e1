pub mod assembler;
pub mod pipeline;
pub mod validator;

pub use assembler::{aligned_to_dataframe, AssemblyOutcome, FlightTable, TableAssembler};
pub use pipeline::{BatchSummary, FlightOutcome, FlightPipeline};
pub use validator::{FlightValidator, SkipReason};
