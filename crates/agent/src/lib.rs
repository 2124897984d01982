//! Chatbot runtime - turns one student message into one response
//!
//! This crate sits between the host (HTTP server, CLI) and the core:
//! - **Validation** - blank messages are rejected before anything else runs
//! - **Dispatch** (`service`) - classify the message, consult the build registry
//! - **Formatting** (`responses`) - fixed reply texts per outcome
//!
//! # Architecture
//!
//! ```text
//! host → ChatbotService → classify() → BuildRegistry → JobProvider (Jenkins)
//!              ↓
//!        ChatbotResponse ← responses::*
//! ```
//!
//! Nothing here keeps state between calls. A service can be shared behind an
//! `Arc` by any number of concurrent requests.

pub mod responses;
pub mod service;

pub use service::ChatbotService;
