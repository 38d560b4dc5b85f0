//! Prompt construction and reply validation for text-completion matchers.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::{BestMatch, CompletionBackend};

/// The instruction block sent ahead of every match request.
pub const DEFAULT_INSTRUCTION: &str = r#"I'm going to provide a list of items. Your task is to identify the item that matches most perfectly to the given string. Even if you're not confident, you must pick an item. Only return the index of the matching string in the list without any explanations. In fact, the returned output must be a single integer. Below are some examples.

Names: ['5`JOE-3`BHQ1', '5`CY5.5-3`BHQ2(0.2)', '5`CY5 -3`BHQ-2']
String: '5`JOE-3`BHQ1'
Return: 0

Names: ['5`JOE-3`BHQ1', '5`CY5.5-3`BHQ2(0.2)', '5`CY5 -3`BHQ-2']
String: '5`CY5-3`BHQ2'
Return: 2

Names: ['5`JOE-3`BHQ1', '5`CY5.5-3`BHQ2(0.2)', '5`CY5 -3`BHQ-2']
String: '5`CY5.5-3`BHQ2'
Return: 1

Names: ['5`FAM-3`BHQ1', '5`CY5 -3`BHQ-2']
String: '5`CY5-3`BHQ2'
Return: 1

Now it's your turn:"#;

/// Builds the full prompt for one match request.
///
/// # Example
///
/// ```
/// use oligo_billing::matching::build_prompt;
///
/// let prompt = build_prompt("Pick one:", &["5`FAM-3`BHQ1", "5`HEX-3`BHQ1"], "5`HEX-3`BHQ1");
/// assert_eq!(
///     prompt,
///     "Pick one:\n\nNames: ['5`FAM-3`BHQ1', '5`HEX-3`BHQ1']\nString: '5`HEX-3`BHQ1'"
/// );
/// ```
pub fn build_prompt(instruction: &str, candidates: &[&str], query: &str) -> String {
    let names: Vec<String> = candidates.iter().map(|c| quote(c)).collect();
    format!(
        "{instruction}\n\nNames: [{}]\nString: {}",
        names.join(", "),
        quote(query)
    )
}

/// Quotes a string the way the few-shot examples do: single quotes, falling
/// back to double quotes when the text itself holds a single quote.
fn quote(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{s}\"")
    } else {
        format!("'{}'", s.replace('\'', "\\'"))
    }
}

/// Validates a matcher reply and turns it into a candidate index.
///
/// The reply, once trimmed, must be a plain integer. A non-integer reply is a
/// `MatchingService` error; an integer outside `0..len` is `IndexOutOfRange`.
pub fn parse_index_reply(reply: &str, len: usize) -> EngineResult<usize> {
    let trimmed = reply.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::matching(format!(
            "expected a single integer index, got {reply:?}"
        )));
    }

    let index: i64 = trimmed.parse().map_err(|_| {
        EngineError::matching(format!("index {trimmed:?} does not fit in an integer"))
    })?;

    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(EngineError::IndexOutOfRange { index, len })
}

/// Adapts a [`CompletionBackend`] into a [`BestMatch`].
pub struct PromptMatcher<B> {
    backend: B,
    instruction: String,
    echo: Option<RefCell<Box<dyn Write>>>,
}

impl<B: fmt::Debug> fmt::Debug for PromptMatcher<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptMatcher")
            .field("backend", &self.backend)
            .field("instruction", &self.instruction)
            .field("echo", &self.echo.is_some())
            .finish()
    }
}

impl<B: CompletionBackend> PromptMatcher<B> {
    /// Creates a matcher using the built-in instruction block.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            echo: None,
        }
    }

    /// Replaces the instruction block.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Echo every prompt and raw reply to stdout before resolving the index.
    pub fn with_debug(self, debug: bool) -> Self {
        if debug {
            self.with_debug_writer(io::stdout())
        } else {
            Self { echo: None, ..self }
        }
    }

    /// Echo every prompt and raw reply to `writer` instead of stdout.
    ///
    /// Each request writes a line of 80 dashes, the prompt, then the reply.
    pub fn with_debug_writer(mut self, writer: impl Write + 'static) -> Self {
        self.echo = Some(RefCell::new(Box::new(writer)));
        self
    }

    /// Returns the wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn write_echo(&self, prompt: &str, reply: &str) -> EngineResult<()> {
        let Some(echo) = &self.echo else {
            return Ok(());
        };
        let mut out = echo.borrow_mut();
        writeln!(out, "{}", "-".repeat(80))
            .and_then(|_| writeln!(out, "{prompt}"))
            .and_then(|_| writeln!(out, "{reply}"))
            .and_then(|_| out.flush())
            .map_err(|e| EngineError::matching(format!("failed to write debug echo: {e}")))
    }
}

impl<B: CompletionBackend> BestMatch for PromptMatcher<B> {
    fn best_match_index(&self, candidates: &[&str], query: &str) -> EngineResult<usize> {
        let prompt = build_prompt(&self.instruction, candidates, query);
        let reply = self.backend.complete(&prompt)?;

        self.write_echo(&prompt, &reply)?;
        debug!(query = %query, candidates = candidates.len(), reply = %reply.trim(), "Matcher reply");

        parse_index_reply(&reply, candidates.len())
    }
}
