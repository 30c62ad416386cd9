//! Error types for pdfinator.
//!
//! Every operation returns [`Result`], and every failure carries enough context
//! to be reported to a user or matched on by a caller.
//!
//! # Error Categories
//!
//! - **Input not found**: missing files or paths that are not files
//! - **Invalid parameter**: bad chunk sizes, page numbers, configuration
//! - **Library failure**: the PDF library could not parse, copy or save
//! - **Decrypt exhausted**: no candidate password unlocked the document
//! - **I/O**: everything the filesystem throws at us

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfinator operations.
pub type Result<T> = std::result::Result<T, PdfinatorError>;

/// Coarse classification of a [`PdfinatorError`].
///
/// Lets callers branch on the cause of a failure without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required input path does not exist or is not a file.
    InputNotFound,
    /// A parameter (chunk size, page number, config value) is out of range.
    InvalidParameter,
    /// The PDF library failed to load, copy, extract or save.
    LibraryFailure,
    /// No password in the candidate list unlocked the document.
    DecryptExhausted,
    /// Filesystem error outside of PDF handling.
    Io,
    /// The user cancelled the operation.
    Cancelled,
    /// Anything else.
    Other,
}

/// Main error type for pdfinator operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfinatorError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Failed to load a PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file is corrupted or has an unusable structure.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", path.display())]
    CorruptedPdf {
        /// Path to the corrupted PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// The document has no pages to work with.
    #[error("PDF has no pages: {}", path.display())]
    EmptyDocument {
        /// Path to the empty PDF.
        path: PathBuf,
    },

    /// The document needs a password before its pages can be read.
    #[error(
        "PDF is password protected: {}\n  Unlock it with the decrypt command first",
        path.display()
    )]
    PasswordRequired {
        /// Path to the locked PDF.
        path: PathBuf,
    },

    /// Chunk size for a split must be at least one page.
    #[error("Invalid pages per split: {value}. Must be a positive number")]
    InvalidChunkSize {
        /// The rejected chunk size.
        value: usize,
    },

    /// A 1-indexed page number is outside the document.
    #[error("Page {page} is out of range. Document has {total_pages} page(s)")]
    PageOutOfRange {
        /// Requested page number.
        page: u32,
        /// Number of pages in the document.
        total_pages: u32,
    },

    /// A parameter was rejected before any PDF work started.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// What is wrong with the parameter.
        message: String,
    },

    /// Too few existing inputs remained for a merge.
    #[error("Merge needs at least 2 existing input files, found {found}")]
    NotEnoughInputs {
        /// Number of inputs that exist.
        found: usize,
    },

    /// A page-level PDF operation failed.
    #[error("PDF operation failed: {reason}")]
    OperationFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Text extraction failed on a page.
    #[error("Text extraction failed on page {page} of {}\n  Reason: {reason}", path.display())]
    TextExtractionFailed {
        /// Path to the PDF file.
        path: PathBuf,
        /// 1-indexed page that failed.
        page: u32,
        /// Reason reported by the PDF library.
        reason: String,
    },

    /// None of the candidate passwords worked.
    #[error("Could not decrypt {} with {tried} candidate password(s)", path.display())]
    DecryptExhausted {
        /// Path to the encrypted PDF.
        path: PathBuf,
        /// How many candidates were tried.
        tried: usize,
    },

    /// The document was unlocked but could not be written out.
    #[error("Decrypted {} but could not save it: {reason}", path.display())]
    DecryptFailed {
        /// Path to the encrypted PDF.
        path: PathBuf,
        /// Why both save paths failed.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Remove --no-clobber to overwrite it",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Processed-file registry could not be read or appended to.
    #[error("Processed-file registry error: {}\n  Reason: {source}", path.display())]
    Registry {
        /// Path to the registry file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfinatorError {
    fn from(err: lopdf::Error) -> Self {
        Self::operation_failed(err.to_string())
    }
}

impl From<serde_json::Error> for PdfinatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl From<glob::PatternError> for PdfinatorError {
    fn from(err: glob::PatternError) -> Self {
        Self::invalid_parameter(format!("Invalid glob pattern: {err}"))
    }
}

impl PdfinatorError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an OperationFailed error.
    pub fn operation_failed(reason: impl Into<String>) -> Self {
        Self::OperationFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. } | Self::NotAFile { .. } => ErrorKind::InputNotFound,
            Self::InvalidChunkSize { .. }
            | Self::PageOutOfRange { .. }
            | Self::InvalidParameter { .. }
            | Self::NotEnoughInputs { .. }
            | Self::OutputExists { .. }
            | Self::InvalidConfig { .. } => ErrorKind::InvalidParameter,
            Self::FailedToLoadPdf { .. }
            | Self::CorruptedPdf { .. }
            | Self::EmptyDocument { .. }
            | Self::PasswordRequired { .. }
            | Self::OperationFailed { .. }
            | Self::TextExtractionFailed { .. }
            | Self::DecryptFailed { .. } => ErrorKind::LibraryFailure,
            Self::DecryptExhausted { .. } => ErrorKind::DecryptExhausted,
            Self::FailedToCreateOutput { .. }
            | Self::FailedToWrite { .. }
            | Self::Registry { .. }
            | Self::Io { .. } => ErrorKind::Io,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Check if this error only concerns the current item.
    ///
    /// The watch loop logs recoverable errors and moves on to the next file.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Registry { .. } | Self::Cancelled)
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InputNotFound => 2,
            ErrorKind::LibraryFailure => 3,
            ErrorKind::DecryptExhausted => 4,
            ErrorKind::Io => 5,
            ErrorKind::InvalidParameter | ErrorKind::Other => 1,
            ErrorKind::Cancelled => 130, // Standard exit code for SIGINT
        }
    }
}
