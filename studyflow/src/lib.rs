//! studyflow - client library for an AI study assistant
//!
//! Parses AI-written quiz reports into structured outlines, models the
//! screens of the study client, and talks to the study backend.

// Quiz report parsing and rendering
pub mod html_exporter;
pub mod markdown_exporter;
pub mod report;

// Backend access and local state
pub mod api;
pub mod config;
pub mod storage;

// Screens and navigation
pub mod navigation;
pub mod router;
pub mod session;

// Page logic
pub mod concept;
pub mod optimistic;
pub mod polling;
pub mod progress;
pub mod quiz;
pub mod schedule;
pub mod validation;
