//! CV scoring — a pure pipeline from plain text to a `ScoreCard`.
//!
//! text → sections / industry → quality analyzers → category aggregation
//! → grade + career level → recommendations.
//!
//! Every stage reads from a `ScoringTables` value passed in explicitly; nothing
//! here touches shared state, so a single `ScoringEngine` can serve any number
//! of concurrent callers.

pub mod aggregate;
pub mod engine;
pub mod industry;
pub mod labels;
pub mod quality;
pub mod recommendations;
pub mod sections;
pub mod tables;
pub mod text;

pub use aggregate::CategoryScores;
pub use engine::{ScoreCard, ScoringEngine};
pub use industry::Industry;
pub use labels::{CareerLevel, Grade};
pub use quality::QualityScores;
pub use sections::{Section, SectionPresence};
pub use tables::ScoringTables;
pub use text::ResumeText;
