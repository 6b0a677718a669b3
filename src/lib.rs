// src/lib.rs

//! Client for submitting scans to a scan server over its XML REST interface.
//!
//! The pipeline is linear: a [`core::SubmissionIntent`] is encoded by
//! [`core::build`], sent by a [`core::Transport`], and the reply is read back by
//! [`core::interpret`] into a [`core::SubmissionOutcome`].

pub mod app;
pub mod config;
pub mod core;
pub mod logging;
pub mod ui;
