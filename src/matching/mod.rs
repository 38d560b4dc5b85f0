//! Best-match capability used to price modification pairs.
//!
//! Catalog descriptions for modification reagents are written inconsistently
//! from one monthly document to the next (spacing, punctuation, truncated dye
//! names, tier suffixes such as `(0.2)`), so the engine delegates the choice of
//! row to an external matcher. Two seams are exposed:
//!
//! - [`BestMatch`] is what the engine calls: candidates plus a query in, an
//!   index out. Tests inject deterministic stubs here.
//! - [`CompletionBackend`] is the raw text capability (prompt in, reply text
//!   out). [`PromptMatcher`] adapts any backend into a [`BestMatch`] by building
//!   the instruction prompt and validating the reply.
//!
//! [`OpenAiBackend`] is the production backend.

mod openai;
mod prompt;

pub use openai::{MatcherCredentials, OpenAiBackend};
pub use prompt::{DEFAULT_INSTRUCTION, PromptMatcher, build_prompt, parse_index_reply};

use crate::error::EngineResult;

/// Chooses the candidate that best matches a query.
///
/// Implementations always pick something; there is no "no match" answer.
pub trait BestMatch {
    /// Returns an index into `candidates`.
    fn best_match_index(&self, candidates: &[&str], query: &str) -> EngineResult<usize>;
}

/// A text-completion service: one prompt in, one reply out.
pub trait CompletionBackend {
    /// Sends `prompt` and returns the raw reply text.
    fn complete(&self, prompt: &str) -> EngineResult<String>;
}

impl<T: BestMatch + ?Sized> BestMatch for &T {
    fn best_match_index(&self, candidates: &[&str], query: &str) -> EngineResult<usize> {
        (**self).best_match_index(candidates, query)
    }
}

impl<T: CompletionBackend + ?Sized> CompletionBackend for &T {
    fn complete(&self, prompt: &str) -> EngineResult<String> {
        (**self).complete(prompt)
    }
}
