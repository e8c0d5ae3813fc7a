//! Ingestion, matching and answering

pub mod answer;
pub mod context;
pub mod ingest;
pub mod matcher;

pub use answer::AnswerService;
pub use matcher::QueryMatcher;
