#![deny(missing_docs)]
#![doc = "Core traits and data types shared by the opver differential verification engine."]

pub mod errors;
pub mod evaluator;
pub mod provenance;
pub mod rng;
mod side;

pub use errors::{ErrorInfo, OpverError};
pub use evaluator::{pure, Evaluator, EvaluatorError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use side::Side;
