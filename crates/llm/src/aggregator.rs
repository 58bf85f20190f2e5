//! Streaming response aggregation.
//!
//! The generation service answers with newline-delimited JSON records, each
//! `{"response": <fragment>, "done": <bool>}`. `ResponseAggregator` turns that
//! byte stream into a single answer:
//!
//! ```text
//!                 record, done = false
//!                 ┌────────────┐
//!                 ▼            │
//!  ──────▶  ACCUMULATING ──────┘
//!              │      │
//!  done = true │      │ unparseable record / stream ends early
//!              ▼      ▼
//!         COMPLETE   FAILED
//! ```
//!
//! Records are re-split on `\n` regardless of how the transport chunked the
//! body, so a record (or a multi-byte character) may straddle chunks. Blank
//! lines are skipped. Nothing after the first `done = true` record is read,
//! and a failed stream never yields partial text.

use crate::types::{AggregatedAnswer, GenerationToken};
use fastrag_core::{AppError, AppResult};
use futures::{Stream, StreamExt};

/// Aggregator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregatorState {
    #[default]
    Accumulating,
    Complete,
    Failed,
}

/// Stateful parser for a streamed generation body.
#[derive(Debug, Default)]
pub struct ResponseAggregator {
    state: AggregatorState,
    pending: Vec<u8>,
    text: String,
    records: usize,
}

impl ResponseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AggregatorState {
        self.state
    }

    /// Number of records parsed so far (blank lines excluded).
    pub fn records_consumed(&self) -> usize {
        self.records
    }

    /// Feed one transport chunk.
    ///
    /// Returns `Ok(Some(answer))` once a `done = true` record is seen; any
    /// bytes after that record are discarded.
    pub fn feed(&mut self, bytes: &[u8]) -> AppResult<Option<AggregatedAnswer>> {
        self.ensure_accumulating()?;
        self.pending.extend_from_slice(bytes);

        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(answer) = self.consume_line(&line[..newline])? {
                return Ok(Some(answer));
            }
        }

        Ok(None)
    }

    /// Signal end of input.
    ///
    /// A trailing record without a final newline is still processed. If no
    /// `done = true` record was seen the stream is incomplete and the
    /// accumulated text is discarded.
    pub fn finish(&mut self) -> AppResult<AggregatedAnswer> {
        self.ensure_accumulating()?;

        let rest = std::mem::take(&mut self.pending);
        if let Some(answer) = self.consume_line(&rest)? {
            return Ok(answer);
        }

        let records = self.records;
        self.fail();
        Err(AppError::IncompleteStream(format!(
            "generation stream ended after {} record(s) without a done marker",
            records
        )))
    }

    fn consume_line(&mut self, line: &[u8]) -> AppResult<Option<AggregatedAnswer>> {
        let line = match std::str::from_utf8(line) {
            Ok(line) => line.trim(),
            Err(e) => {
                let record = self.records + 1;
                self.fail();
                return Err(AppError::Parse(format!(
                    "record {} is not valid UTF-8: {}",
                    record, e
                )));
            }
        };

        if line.is_empty() {
            return Ok(None);
        }

        let token: GenerationToken = match serde_json::from_str(line) {
            Ok(token) => token,
            Err(e) => {
                let record = self.records + 1;
                self.fail();
                return Err(AppError::Parse(format!(
                    "record {} is not a generation record: {}",
                    record, e
                )));
            }
        };

        self.records += 1;
        self.text.push_str(&token.text);

        if token.done {
            self.state = AggregatorState::Complete;
            self.pending.clear();
            tracing::debug!(records = self.records, "Generation stream complete");
            return Ok(Some(AggregatedAnswer {
                text: std::mem::take(&mut self.text),
            }));
        }

        Ok(None)
    }

    fn fail(&mut self) {
        self.state = AggregatorState::Failed;
        self.pending.clear();
        self.text.clear();
    }

    fn ensure_accumulating(&self) -> AppResult<()> {
        match self.state {
            AggregatorState::Accumulating => Ok(()),
            state => Err(AppError::Internal(format!(
                "response aggregator is already {:?}",
                state
            ))),
        }
    }
}

/// Consume a generation stream into its final answer.
///
/// The stream is not polled again after the completing record. A transport
/// error mid-stream propagates as-is and no partial answer is returned.
pub async fn aggregate<S>(mut stream: S) -> AppResult<AggregatedAnswer>
where
    S: Stream<Item = AppResult<Vec<u8>>> + Unpin,
{
    let mut aggregator = ResponseAggregator::new();

    while let Some(chunk) = stream.next().await {
        if let Some(answer) = aggregator.feed(&chunk?)? {
            return Ok(answer);
        }
    }

    aggregator.finish()
}

/// Aggregate a fully buffered body.
pub fn aggregate_body(body: &str) -> AppResult<AggregatedAnswer> {
    let mut aggregator = ResponseAggregator::new();
    match aggregator.feed(body.as_bytes())? {
        Some(answer) => Ok(answer),
        None => aggregator.finish(),
    }
}
