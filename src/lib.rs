//! Clarolab — local lab-report analysis service.
//!
//! Uploads a lab report (image or PDF) with the patient's age and sex, runs
//! two sequential Gemini calls (structured extraction, then interpretation),
//! and serves the resulting analyte table, summaries, and an illustrative
//! trend chart to a local SPA.

pub mod api;
pub mod config;
pub mod core_state;
pub mod gemini;
pub mod models;
pub mod pipeline;
pub mod presentation;
pub mod trend;
