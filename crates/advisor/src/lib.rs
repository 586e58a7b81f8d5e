//! AI-response orchestration
//!
//! The generators in this crate own the prompt pipeline and defend the rest
//! of the system against malformed, partial, or adversarial model output:
//!
//! - [`GroundingRetriever`]: best-effort market/location context ahead of
//!   generation; absorbs its own failures
//! - [`AdvisoryGenerator`]: schema-constrained crop advisory
//! - [`WeatherGenerator`]: schema-constrained forecast with the closed
//!   icon contract
//! - [`SpeechGenerator`]: narration audio, no schema involved
//!
//! Each invocation is a single attempt: no caching, no retries. The
//! advisory flow sequences grounding before generation deliberately;
//! advisory and weather calls from the same caller are independent and may
//! run concurrently.

pub mod advisory;
pub mod grounding;
pub mod json;
pub mod prompt;
pub mod speech;
pub mod weather;

pub use advisory::{AdvisoryGenerator, AdvisoryOutcome};
pub use grounding::{GroundingRetriever, NEUTRAL_CONTEXT};
pub use json::{parse_structured, strip_code_fences};
pub use prompt::AdvisoryPromptBuilder;
pub use speech::SpeechGenerator;
pub use weather::WeatherGenerator;
