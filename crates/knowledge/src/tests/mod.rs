//! Cross-module tests for indexing, retrieval and answering.

mod indexing;
mod support;
