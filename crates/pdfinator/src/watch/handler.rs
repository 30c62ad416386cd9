//! What the watch loop does with each new file.

use std::fmt;

use crate::config::Config;
use crate::decrypt::Decryptor;
use crate::error::Result;
use crate::extract::TextExtractor;
use crate::layout::OutputLayout;
use crate::split::Splitter;
use crate::watch::scanner::ScannedFile;

/// Result of handling one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The file is done and is recorded in the registry.
    Done,
    /// The file was left alone and stays unrecorded.
    Skipped,
}

/// Handles one new file found by the watch loop.
#[allow(async_fn_in_trait)]
pub trait FileHandler {
    /// Handle `file`.
    ///
    /// Recoverable errors are logged by the loop and only affect this file.
    async fn handle(&mut self, file: &ScannedFile) -> Result<HandleOutcome>;
}

/// Fixed action applied to every new file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    /// Split into chunks of this many pages.
    Split {
        /// Pages per output part.
        pages_per_split: usize,
    },
    /// Extract the text layer.
    ExtractText,
    /// Unlock with the candidate password list.
    Decrypt {
        /// Password tried before the built-in candidates.
        password: Option<String>,
    },
}

impl fmt::Display for WatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Split { pages_per_split } => write!(f, "split every {pages_per_split} page(s)"),
            Self::ExtractText => write!(f, "extract text"),
            Self::Decrypt { .. } => write!(f, "decrypt"),
        }
    }
}

/// Applies one [`WatchAction`] to every file.
///
/// Files found in a sub-directory of the input directory share an output
/// folder named after that sub-directory.
#[derive(Debug, Clone)]
pub struct ActionHandler {
    action: WatchAction,
    layout: OutputLayout,
    splitter: Splitter,
    extractor: TextExtractor,
    decryptor: Decryptor,
}

impl ActionHandler {
    /// Create a handler performing `action` with `config`.
    pub fn new(action: WatchAction, config: &Config) -> Self {
        Self {
            action,
            layout: config.layout(),
            splitter: Splitter::new(config),
            extractor: TextExtractor::new(config),
            decryptor: Decryptor::new(config),
        }
    }

    /// The configured action.
    pub fn action(&self) -> &WatchAction {
        &self.action
    }
}

impl FileHandler for ActionHandler {
    async fn handle(&mut self, file: &ScannedFile) -> Result<HandleOutcome> {
        match &self.action {
            WatchAction::Split { pages_per_split } => {
                let output_dir = match &file.group {
                    Some(group) => self.layout.group_dir(group),
                    None => self.layout.multi_file_dir(&file.path),
                };
                self.splitter
                    .split_into(&file.path, *pages_per_split, &output_dir)
                    .await?;
            }
            WatchAction::ExtractText => {
                let output_path = match &file.group {
                    Some(group) => {
                        let name = self.layout.text(&file.path);
                        self.layout
                            .group_dir(group)
                            .join(name.file_name().unwrap_or_default())
                    }
                    None => self.layout.text(&file.path),
                };
                self.extractor.extract_to(&file.path, &output_path).await?;
            }
            WatchAction::Decrypt { password } => {
                self.decryptor
                    .decrypt_file(&file.path, password.as_deref())
                    .await?;
            }
        }

        Ok(HandleOutcome::Done)
    }
}
