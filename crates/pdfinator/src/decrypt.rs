//! Unlocking password-protected documents.
//!
//! A [`DecryptAttempter`] tries a prioritized list of candidate passwords and
//! stops at the first one that works. The [`Decryptor`] wraps it with the file
//! handling:
//! - Unencrypted inputs are copied through byte for byte
//! - Unlocked documents are saved directly when possible
//! - Otherwise they are rebuilt page by page, skipping pages that fail
//!
//! Passwords are never logged.

use lopdf::{Document, Object, dictionary};
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{PdfinatorError, Result};
use crate::io::reader::strip_encryption;
use crate::io::{PdfReader, PdfWriter};
use crate::layout::OutputLayout;
use crate::pages::inherited_page_dictionary;
use crate::utils::copy_references;

/// Passwords tried after the user-supplied one.
pub const BUILTIN_PASSWORDS: [&str; 7] =
    ["", "password", "123456", "admin", "user", "pdf", "document"];

/// A document that may be password protected.
pub trait Unlockable: Sized {
    /// Whether the document needs a password.
    fn is_encrypted(&self) -> bool;

    /// Try one password, returning the unlocked document on success.
    ///
    /// A failed attempt leaves `self` untouched.
    fn unlock(&self, password: &str) -> Option<Self>;
}

impl Unlockable for Document {
    fn is_encrypted(&self) -> bool {
        Document::is_encrypted(self)
    }

    fn unlock(&self, password: &str) -> Option<Self> {
        if let Err(e) = self.authenticate_password(password) {
            debug!("Candidate rejected: {e}");
            return None;
        }

        let mut candidate = self.clone();
        if self.encryption_state.is_some() {
            // Opened with the empty user password, objects are already plain
            strip_encryption(&mut candidate);
            return Some(candidate);
        }

        match candidate.decrypt(password) {
            Ok(()) => Some(candidate),
            Err(e) => {
                warn!("Password accepted but decryption failed: {e}");
                None
            }
        }
    }
}

/// What a decryption attempt found.
#[derive(Debug, Clone)]
pub enum DecryptOutcome<U> {
    /// The document was not encrypted to begin with.
    NotEncrypted,
    /// A candidate password worked.
    Unlocked {
        /// The unlocked document.
        document: U,
        /// Position of the working password in the candidate list.
        password_index: usize,
    },
}

/// Render a password for the log without revealing it.
pub fn mask_password(password: &str) -> &'static str {
    if password.is_empty() { "(empty)" } else { "***" }
}

/// Tries candidate passwords in priority order.
#[derive(Debug, Clone)]
pub struct DecryptAttempter {
    candidates: Vec<String>,
}

impl DecryptAttempter {
    /// Build the candidate list.
    ///
    /// Order: the user password (if any), the built-in candidates, then
    /// `extra`. Duplicates keep their first position.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfinator::decrypt::DecryptAttempter;
    ///
    /// let attempter = DecryptAttempter::new(Some("admin"), &[]);
    /// assert_eq!(attempter.candidates()[0], "admin");
    /// assert_eq!(attempter.candidates().len(), 7);
    /// ```
    pub fn new(user_password: Option<&str>, extra: &[String]) -> Self {
        let mut candidates: Vec<String> = Vec::new();
        let all = user_password
            .into_iter()
            .chain(BUILTIN_PASSWORDS)
            .chain(extra.iter().map(String::as_str));

        for password in all {
            if !candidates.iter().any(|c| c == password) {
                candidates.push(password.to_string());
            }
        }

        Self { candidates }
    }

    /// Candidate passwords in the order they are tried.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Try every candidate against `doc` until one works.
    ///
    /// `path` only labels logs and errors.
    ///
    /// # Errors
    ///
    /// Returns [`PdfinatorError::DecryptExhausted`] when no candidate works.
    pub fn attempt<U: Unlockable>(&self, doc: &U, path: &Path) -> Result<DecryptOutcome<U>> {
        if !doc.is_encrypted() {
            return Ok(DecryptOutcome::NotEncrypted);
        }

        for (index, password) in self.candidates.iter().enumerate() {
            debug!(
                "Trying candidate {}/{} on {}",
                index + 1,
                self.candidates.len(),
                path.display()
            );
            if let Some(document) = doc.unlock(password) {
                info!(
                    "Decryption of {} successful with password: {}",
                    path.display(),
                    mask_password(password)
                );
                return Ok(DecryptOutcome::Unlocked {
                    document,
                    password_index: index,
                });
            }
        }

        error!("Could not decrypt {} with available passwords", path.display());
        Err(PdfinatorError::DecryptExhausted {
            path: path.to_path_buf(),
            tried: self.candidates.len(),
        })
    }
}

/// How the unlocked output was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMethod {
    /// Input was not encrypted and was copied unchanged.
    PassThrough,
    /// The unlocked document was saved directly.
    Direct,
    /// The document was rebuilt page by page.
    PageByPage {
        /// Pages copied into the output.
        copied: usize,
        /// Pages in the source.
        total: usize,
    },
}

/// Result of unlocking one file.
#[derive(Debug, Clone)]
pub struct DecryptReport {
    /// Source PDF.
    pub source: PathBuf,

    /// Written document.
    pub output_path: PathBuf,

    /// How the output was produced.
    pub method: SaveMethod,

    /// Position of the working password, if one was needed.
    pub password_index: Option<usize>,
}

/// Rebuild `source` into a fresh document, one page at a time.
///
/// Pages that cannot be copied are skipped. Returns the new document and the
/// number of pages copied.
pub fn rebuild_page_by_page(source: &Document) -> (Document, usize) {
    let mut target = Document::with_version(source.version.clone());
    // Copied objects keep their ids, so new ids must start above them
    target.max_id = source.max_id;
    let pages_id = target.new_object_id();

    let mut kids = Vec::new();
    for (number, page_id) in source.get_pages() {
        match copy_page(&mut target, source, page_id, pages_id) {
            Ok(()) => kids.push(Object::Reference(page_id)),
            Err(e) => warn!("Skipping page {number} during rebuild: {e}"),
        }
    }

    let copied = kids.len();
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => copied as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);
    target.prune_objects();

    (target, copied)
}

fn copy_page(
    target: &mut Document,
    source: &Document,
    page_id: lopdf::ObjectId,
    pages_id: lopdf::ObjectId,
) -> Result<()> {
    let mut page = inherited_page_dictionary(source, page_id)?;
    page.remove(b"Parent");
    copy_references(target, source, &Object::Dictionary(page.clone()))?;
    page.set("Parent", Object::Reference(pages_id));
    target.objects.insert(page_id, Object::Dictionary(page));
    Ok(())
}

/// Unlocks PDF files into the output directory.
#[derive(Debug, Clone)]
pub struct Decryptor {
    reader: PdfReader,
    writer: PdfWriter,
    layout: OutputLayout,
    extra_passwords: Vec<String>,
}

impl Decryptor {
    /// Create a decryptor using the configured output directory and extra
    /// candidate passwords.
    pub fn new(config: &Config) -> Self {
        Self {
            reader: PdfReader::for_decryption(),
            writer: PdfWriter::with_overwrite(config.overwrite_mode),
            layout: config.layout(),
            extra_passwords: config.extra_passwords.clone(),
        }
    }

    /// Unlock `path` into `<output>/<stem> (Unlocked).pdf`.
    pub async fn decrypt_file(&self, path: &Path, password: Option<&str>) -> Result<DecryptReport> {
        let output_path = self.layout.unlocked(path);
        self.decrypt_to(path, password, &output_path).await
    }

    /// Unlock `path` into an explicit output file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input cannot be loaded
    /// - No candidate password works (no output is written)
    /// - Neither the direct save nor the page-by-page rebuild produced pages
    pub async fn decrypt_to(
        &self,
        path: &Path,
        password: Option<&str>,
        output_path: &Path,
    ) -> Result<DecryptReport> {
        info!("Starting decryption for {}", path.display());
        let loaded = self.reader.load(path).await?;

        if !loaded.encrypted {
            info!("{} is not encrypted, copying it unchanged", path.display());
            self.writer.copy_file(path, output_path).await?;
            return Ok(DecryptReport {
                source: path.to_path_buf(),
                output_path: output_path.to_path_buf(),
                method: SaveMethod::PassThrough,
                password_index: None,
            });
        }

        let attempter = DecryptAttempter::new(password, &self.extra_passwords);
        let source = path.to_path_buf();
        let outcome = task::spawn_blocking(move || attempter.attempt(&loaded.document, &source))
            .await
            .map_err(|e| PdfinatorError::other(format!("Decrypt task failed: {e}")))??;

        match outcome {
            DecryptOutcome::NotEncrypted => {
                self.writer.copy_file(path, output_path).await?;
                Ok(DecryptReport {
                    source: path.to_path_buf(),
                    output_path: output_path.to_path_buf(),
                    method: SaveMethod::PassThrough,
                    password_index: None,
                })
            }
            DecryptOutcome::Unlocked {
                document,
                password_index,
            } => {
                let method = self.save_unlocked(document, path, output_path).await?;
                Ok(DecryptReport {
                    source: path.to_path_buf(),
                    output_path: output_path.to_path_buf(),
                    method,
                    password_index: Some(password_index),
                })
            }
        }
    }

    /// Save an unlocked document, falling back to a page-by-page rebuild.
    pub async fn save_unlocked(
        &self,
        document: Document,
        path: &Path,
        output_path: &Path,
    ) -> Result<SaveMethod> {
        let total = document.get_pages().len();

        let direct_error = if total == 0 {
            "document has no pages".to_string()
        } else {
            match self.writer.save(&document, output_path).await {
                Ok(stats) => {
                    info!(
                        "Saved unlocked {} to {} ({})",
                        path.display(),
                        output_path.display(),
                        stats.format_file_size()
                    );
                    return Ok(SaveMethod::Direct);
                }
                Err(e) => e.to_string(),
            }
        };

        warn!(
            "Direct save of {} failed ({}), rebuilding page by page",
            path.display(),
            direct_error
        );

        let (rebuilt, copied) = rebuild_page_by_page(&document);
        if copied == 0 {
            return Err(PdfinatorError::DecryptFailed {
                path: path.to_path_buf(),
                reason: format!("{direct_error}; no page could be copied"),
            });
        }

        self.writer.save(&rebuilt, output_path).await?;
        info!(
            "Saved unlocked {} to {} ({}/{} pages copied)",
            path.display(),
            output_path.display(),
            copied,
            total
        );

        Ok(SaveMethod::PageByPage { copied, total })
    }
}
