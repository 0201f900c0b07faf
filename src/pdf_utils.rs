/*!
 * Low-level PDF manipulation used by the splitter and the merger.
 *
 * Both operations reduce to the same primitive: deep-copy an ordered list of
 * pages (and every object they reference) from a source document into a fresh
 * document, then write it out atomically.
 */

use lopdf::{dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::PdfError;

/// Page attributes that may be inherited from an ancestor `Pages` node
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Load a PDF from disk
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document, PdfError> {
    let path = path.as_ref();
    Document::load(path).map_err(|e| PdfError::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Number of pages of a PDF on disk
pub fn page_count<P: AsRef<Path>>(path: P) -> Result<usize, PdfError> {
    Ok(load_document(path)?.get_pages().len())
}

/// Page object ids of a document, in page order
pub fn ordered_page_ids(doc: &Document) -> Vec<ObjectId> {
    // get_pages is keyed by the 1-based page number, so values come out in order
    doc.get_pages().into_values().collect()
}

/// Helper to copy objects from one document into another, remapping ids
struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document, target: &'a mut Document, target_pages_id: ObjectId) -> Self {
        // Every page-tree node of the source collapses onto the target root so a
        // stray reference (a link annotation's /P, a page's /Parent) never drags
        // the whole source tree along.
        let id_map = source
            .objects
            .iter()
            .filter(|(_, object)| is_pages_node(object))
            .map(|(id, _)| (*id, target_pages_id))
            .collect();
        Self { source, target, id_map }
    }

    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, PdfError> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the id before recursing so reference cycles terminate.
        let new_id = self.target.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        // Dangling references are common in the wild; keep them as null.
        let object = self.source.get_object(source_id).cloned().unwrap_or(Object::Null);
        let remapped = self.remap_references(object)?;
        self.target.objects.insert(new_id, remapped);

        Ok(new_id)
    }

    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId, PdfError> {
        if let Some(target_id) = self.id_map.get(&page_id) {
            return Ok(*target_id);
        }

        let mut page = self.source.get_object(page_id)?.as_dict()?.clone();
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(self.source, page_id, key) {
                    page.set(key.to_vec(), value);
                }
            }
        }

        let new_id = self.target.add_object(Object::Null);
        self.id_map.insert(page_id, new_id);
        let remapped = self.remap_references(Object::Dictionary(page))?;
        self.target.objects.insert(new_id, remapped);

        Ok(new_id)
    }

    fn remap_references(&mut self, object: Object) -> Result<Object, PdfError> {
        match object {
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(id)?)),
            Object::Array(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.remap_references(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(items))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap_references(std::mem::replace(value, Object::Null))?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap_references(std::mem::replace(value, Object::Null))?;
                }
                Ok(Object::Stream(stream))
            }
            other => Ok(other),
        }
    }
}

fn is_pages_node(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(|t| t.as_name())
        .map(|name| name == b"Pages")
        .unwrap_or(false)
}

/// Walk up the page tree looking for an inherited attribute
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    // Depth guard against malformed, cyclic trees
    for _ in 0..64 {
        let parent_id = current.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
        let parent = doc.get_object(parent_id).ok()?.as_dict().ok()?;
        if let Ok(value) = parent.get(key) {
            return Some(value.clone());
        }
        current = parent;
    }
    None
}

/// Incrementally assembled output document
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    /// Create an empty document with a catalog and an empty page tree
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Number of pages appended so far
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append the given pages of `source`, in the given order
    pub fn append_pages(&mut self, source: &Document, page_ids: &[ObjectId]) -> Result<usize, PdfError> {
        let mut copier = ObjectCopier::new(source, &mut self.doc, self.pages_id);
        let mut appended = Vec::with_capacity(page_ids.len());
        for page_id in page_ids {
            appended.push(copier.copy_page(*page_id)?);
        }

        for new_id in &appended {
            if let Ok(Object::Dictionary(page)) = self.doc.get_object_mut(*new_id) {
                page.set("Parent", Object::Reference(self.pages_id));
            }
            self.kids.push(Object::Reference(*new_id));
        }

        Ok(appended.len())
    }

    /// Append every page of `source`
    pub fn append_document(&mut self, source: &Document) -> Result<usize, PdfError> {
        let page_ids = ordered_page_ids(source);
        self.append_pages(source, &page_ids)
    }

    /// Finalize the page tree and return the document
    pub fn finish(mut self) -> Result<Document, PdfError> {
        let count = self.kids.len() as i64;
        let pages = self.doc.get_object_mut(self.pages_id)?.as_dict_mut()?;
        pages.set("Kids", Object::Array(self.kids));
        pages.set("Count", count);

        self.doc.prune_objects();
        self.doc.renumber_objects();
        Ok(self.doc)
    }
}

/// Write a document next to its destination and rename it into place
///
/// Either the complete file appears at `path` or nothing changes there.
pub fn save_atomically(doc: &mut Document, path: &Path) -> Result<(), PdfError> {
    let write_error = |message: String| PdfError::Write {
        path: path.to_path_buf(),
        message,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| write_error(e.to_string()))?;

    let mut staging = tempfile::Builder::new()
        .prefix(".pdftrans-")
        .suffix(".pdf.part")
        .tempfile_in(&parent)
        .map_err(|e| write_error(e.to_string()))?;
    doc.save_to(&mut staging).map_err(|e| write_error(e.to_string()))?;
    staging
        .persist(path)
        .map_err(|e| write_error(e.error.to_string()))?;

    Ok(())
}
