mod context_assembler;
mod model_relay;
mod prompt_composer;
mod token_estimator;

pub use context_assembler::{
    Candidates, ContextAssembler, ContextRequest, TRUNCATION_MARKER, fit_to_budget,
};
pub use model_relay::{ModelRelay, RelayOutcome};
pub use prompt_composer::{FORMATTING_INSTRUCTION, compose};
pub use token_estimator::{estimate_input_cost_usd, estimate_tokens};
