//! Page-level document assembly.
//!
//! Every page-producing operation (split, delete, duplicate) is expressed as
//! "build a new document from this ordered list of source pages". The
//! [`PageAssembler`] performs that copy:
//! - Pages are listed in exactly the requested order
//! - Repeated page numbers become independent page objects
//! - Inherited attributes are copied onto each page before the tree is flattened
//! - Objects no longer reachable from the catalog are pruned

use crate::error::{PdfinatorError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;

/// Page attributes a page may inherit from its ancestors in the page tree.
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Copy of a page dictionary with inherited attributes made explicit.
///
/// Walks the `Parent` chain of `page_id` and fills in every inheritable key
/// the page does not define itself. The nearest ancestor wins.
///
/// # Errors
///
/// Returns an error if the page, or one of its ancestors, is not a dictionary.
pub fn inherited_page_dictionary(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|e| {
            PdfinatorError::operation_failed(format!("Failed to get page {page_id:?}: {e}"))
        })?
        .clone();

    let mut visited = HashSet::from([page_id]);
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(parent_id) = parent {
        // Malformed trees can loop back on themselves
        if !visited.insert(parent_id) {
            break;
        }

        let node = doc.get_dictionary(parent_id).map_err(|e| {
            PdfinatorError::operation_failed(format!("Failed to get page tree node: {e}"))
        })?;

        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}

/// Object id of the root page tree node.
pub fn root_pages_id(doc: &Document) -> Result<ObjectId> {
    let catalog = doc
        .catalog()
        .map_err(|e| PdfinatorError::operation_failed(format!("Failed to get catalog: {e}")))?;

    catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|e| PdfinatorError::operation_failed(format!("Failed to get pages reference: {e}")))
}

/// Builds documents from ordered page selections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageAssembler;

impl PageAssembler {
    /// Create a new page assembler.
    pub fn new() -> Self {
        Self
    }

    /// Build a new document containing `pages` (1-indexed) in the given order.
    ///
    /// The source document is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `pages` is empty
    /// - A page number is outside `1..=page_count`
    /// - The page tree cannot be rewritten
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfinator::pages::PageAssembler;
    /// # use lopdf::Document;
    /// # fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// // Reverse a three page document
    /// let reversed = PageAssembler::new().assemble(&doc, &[3, 2, 1])?;
    /// assert_eq!(reversed.get_pages().len(), 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn assemble(&self, doc: &Document, pages: &[u32]) -> Result<Document> {
        if pages.is_empty() {
            return Err(PdfinatorError::invalid_parameter(
                "Cannot build a document without pages",
            ));
        }

        let all_pages = doc.get_pages();
        let total_pages = all_pages.len() as u32;

        let mut source_ids = Vec::with_capacity(pages.len());
        for &page in pages {
            let page_id = all_pages
                .get(&page)
                .copied()
                .ok_or(PdfinatorError::PageOutOfRange { page, total_pages })?;
            source_ids.push(page_id);
        }

        let mut new_doc = doc.clone();
        let pages_id = root_pages_id(&new_doc)?;

        let mut used = HashSet::new();
        let mut kids = Vec::with_capacity(source_ids.len());
        for page_id in source_ids {
            let mut page = inherited_page_dictionary(doc, page_id)?;
            page.set("Parent", Object::Reference(pages_id));

            // The first occurrence keeps its id, repeats get a fresh object
            let id = if used.insert(page_id) {
                new_doc.objects.insert(page_id, Object::Dictionary(page));
                page_id
            } else {
                new_doc.add_object(page)
            };
            kids.push(Object::Reference(id));
        }

        self.update_page_tree(&mut new_doc, pages_id, kids)?;

        new_doc.prune_objects();
        new_doc.renumber_objects();

        Ok(new_doc)
    }

    /// Replace the root page tree node's children with `kids`.
    fn update_page_tree(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        kids: Vec<Object>,
    ) -> Result<()> {
        let pages_obj = doc.get_object_mut(pages_id).map_err(|e| {
            PdfinatorError::operation_failed(format!("Failed to get pages object: {e}"))
        })?;

        if let Object::Dictionary(dict) = pages_obj {
            dict.set("Count", Object::Integer(kids.len() as i64));
            dict.set("Kids", Object::Array(kids));
            dict.remove(b"Parent");
        } else {
            return Err(PdfinatorError::operation_failed(
                "Pages object is not a dictionary",
            ));
        }

        Ok(())
    }
}
