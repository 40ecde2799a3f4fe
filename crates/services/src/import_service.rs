use std::fs;
use std::path::{Path, PathBuf};

use quiz_core::Diagnostic;
use quiz_core::import::parse;
use storage::{CertPaths, write_questions};
use tracing::{info, warn};

use crate::error::ImportError;

/// Input and output locations for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub questions_path: PathBuf,
    pub solutions_path: PathBuf,
    pub output_path: PathBuf,
}

impl ImportRequest {
    /// Conventional raw inputs and question file for a certification.
    #[must_use]
    pub fn for_cert(paths: &CertPaths) -> Self {
        Self {
            questions_path: paths.raw_questions_default(),
            solutions_path: paths.raw_solutions_default(),
            output_path: paths.questions_file(),
        }
    }
}

/// What an import produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Question blocks extracted from the raw dump.
    pub extracted: usize,
    /// Solution blocks with a usable answer.
    pub solutions: usize,
    /// Records written to the question file.
    pub written: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns raw exam text into a validated question file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportService;

impl ImportService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Read both raw files, merge them and write the question file.
    ///
    /// Parse problems do not fail the run; they are logged and returned in
    /// the report.
    ///
    /// # Errors
    ///
    /// - `ImportError::Read` if either input cannot be read.
    /// - `ImportError::Write` if the question file cannot be written.
    pub fn run(&self, request: &ImportRequest) -> Result<ImportReport, ImportError> {
        let questions_text = read_input(&request.questions_path)?;
        let solutions_text = read_input(&request.solutions_path)?;

        let (result, stats) = parse(&questions_text, &solutions_text);
        for diagnostic in &result.diagnostics {
            warn!(
                source = %diagnostic.source,
                question = diagnostic.question.map(|n| n.value()),
                "{diagnostic}"
            );
        }
        info!(
            extracted = stats.questions_found,
            solutions = stats.solutions_found,
            merged = stats.records,
            warnings = result.diagnostics.len(),
            "parsed raw exam text"
        );

        write_questions(&request.output_path, &result.value)?;
        info!(
            path = %request.output_path.display(),
            written = result.value.len(),
            "wrote question file"
        );

        Ok(ImportReport {
            extracted: stats.questions_found,
            solutions: stats.solutions_found,
            written: result.value.len(),
            diagnostics: result.diagnostics,
        })
    }
}

fn read_input(path: &Path) -> Result<String, ImportError> {
    fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })
}
