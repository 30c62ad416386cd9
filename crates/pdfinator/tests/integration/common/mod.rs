//! Integration tests for pdfinator.
//!
//! Fixtures are generated on the fly: page `i` of every generated PDF has a
//! MediaBox width of `100 + i` and shows the text `Page i`, so the page order
//! of any output can be read back with [`page_sequence`].

use lopdf::content::{Content, Operation};
use lopdf::{
    Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, StringFormat,
    dictionary,
};
use pdfinator::config::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary input/output tree with a matching configuration.
pub struct Workspace {
    _temp_dir: TempDir,
    pub config: Config,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        let config = Config {
            input_dir: root.join("pdfs"),
            output_dir: root.join("output"),
            logs_dir: root.join("logs"),
            registry_path: root.join("processed.txt"),
            ..Config::default()
        };
        config
            .ensure_directories()
            .expect("Failed to create directories");

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Generate a PDF with `pages` pages at `<input_dir>/<relative>`.
    pub fn add_pdf(&self, relative: &str, pages: u32) -> PathBuf {
        let path = self.config.input_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        create_pdf(&path, pages);
        path
    }

    /// Generate an encrypted PDF at `<input_dir>/<relative>`.
    pub fn add_encrypted_pdf(
        &self,
        relative: &str,
        pages: u32,
        user_password: &str,
        owner_password: &str,
    ) -> PathBuf {
        let path = self.config.input_dir.join(relative);
        let mut doc = build_pdf(pages);
        let id = Object::String(b"pdfinator-fixture".to_vec(), StringFormat::Literal);
        doc.trailer.set("ID", vec![id.clone(), id]);

        let state = EncryptionState::try_from(EncryptionVersion::V2 {
            document: &doc,
            owner_password,
            user_password,
            key_length: 128,
            permissions: Permissions::all(),
        })
        .expect("Failed to derive encryption key");
        doc.encrypt(&state).expect("Failed to encrypt fixture");
        doc.save(&path).expect("Failed to save fixture");
        path
    }

    pub fn output(&self, relative: &str) -> PathBuf {
        self.config.output_dir.join(relative)
    }

    pub fn registry_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.config.registry_path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Write a PDF with `pages` pages to `path`.
pub fn create_pdf(path: &Path, pages: u32) {
    build_pdf(pages)
        .save(path)
        .expect("Failed to save fixture");
}

fn build_pdf(pages: u32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for i in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {i}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("Failed to encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), (100 + i as i64).into(), 792.into()],
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Original page numbers of the PDF at `path`, in document order.
pub fn page_sequence(path: &Path) -> Vec<u32> {
    let doc = Document::load(path).expect("Failed to load output");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).expect("Page is not a dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(Object::as_array)
                .expect("Page has no MediaBox");
            (media_box[2].as_i64().expect("MediaBox width") - 100) as u32
        })
        .collect()
}

/// Text of page `page` of the PDF at `path`, as lopdf reads it back.
pub fn page_text(path: &Path, page: u32) -> String {
    let doc = Document::load(path).expect("Failed to load output");
    assert!(!doc.is_encrypted(), "{} is still encrypted", path.display());
    doc.extract_text(&[page]).expect("Failed to extract text")
}
