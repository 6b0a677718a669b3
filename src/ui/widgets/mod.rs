// src/ui/widgets/mod.rs

pub mod footer; // Key hints for the current state.
pub mod form; // The submission form.
pub mod listing; // Scans accepted in this session.
pub mod log_view; // Tail of the log file.
pub mod outcome_view; // Progress and failure details.
pub mod preview; // The request the form would send.
