pub mod harness;

pub use harness::{EvalReport, EvalRequest, EvaluationHarness};
