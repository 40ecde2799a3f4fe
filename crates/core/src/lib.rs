#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod domain;
pub mod import;
pub mod model;
pub mod time;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSource, Extraction};
pub use time::Clock;
