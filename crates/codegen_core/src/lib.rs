//! Domain logic for the code generation assistant: language table, prompt
//! construction, response cleanup, error classification and the interaction
//! reducer. Nothing in this crate performs I/O.

pub mod classify;
pub mod controller;
pub mod languages;
pub mod normalize;
pub mod prompt;
pub mod request;

pub use classify::{classify, classify_message, ClassifiedError, ErrorCategory, GenerationError};
pub use controller::{reduce, Effect, Event, InteractionState, Phase, SubmissionId, Transition};
pub use languages::{default_language, find_language, LanguageOption, SUPPORTED_LANGUAGES};
pub use normalize::normalize_response;
pub use prompt::{build_instruction, SamplingConfig, SAMPLING};
pub use request::{GenerationOutcome, GenerationRequest, RequestError};
