use std::path::{Path, PathBuf};

use quiz_core::model::CertId;

/// File layout for one certification inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPaths {
    data_dir: PathBuf,
    cert: CertId,
}

impl CertPaths {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, cert: &CertId) -> Self {
        Self {
            data_dir: data_dir.into(),
            cert: cert.clone(),
        }
    }

    #[must_use]
    pub fn cert(&self) -> &CertId {
        &self.cert
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `{data_dir}/{cert}_questions.json`
    #[must_use]
    pub fn questions_file(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}_questions.json", self.cert.as_str()))
    }

    /// `{data_dir}/.{cert}_progress.json`
    #[must_use]
    pub fn progress_file(&self) -> PathBuf {
        self.data_dir
            .join(format!(".{}_progress.json", self.cert.as_str()))
    }

    /// Conventional name of the raw question dump.
    #[must_use]
    pub fn raw_questions_default(&self) -> PathBuf {
        self.data_dir.join("questions_raw.txt")
    }

    /// Conventional name of the raw solutions document, e.g. `SAA-C03-Solution.txt`.
    #[must_use]
    pub fn raw_solutions_default(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}-Solution.txt", self.cert.display_name()))
    }
}
