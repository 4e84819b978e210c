//! Top-level `Document`/`Page` API tying components A–H together: owns the
//! object arena, the page tree, per-page content streams and structure
//! state, shared-resource local-name registration (§5 "Shared resources"),
//! and the final emit pass that drains the arena through `pdf::file::PdfFile`.

use std::io::Write;

use tracing::debug;

use crate::catalog::Catalog;
use crate::collab::{Font, XObject};
use crate::config::DocumentConfig;
use crate::content::stream::ContentStream;
use crate::error::PdfResult;
use crate::pdf::file::PdfFile;
use crate::pdf::object::{Arena, Dict, Object, ObjectId, PdfString, Stream};
use crate::structure::marked_content::PageStructureState;
use crate::structure::tree::StructTreeRoot;

/// One page: its content stream writer, its structure-element MCID
/// bookkeeping, and the `Resources`/`Annots` it has accumulated so far.
/// The indirect object itself is not built until [`Document::finalize`].
pub struct Page {
    id: ObjectId,
    content: ContentStream,
    structure_state: PageStructureState,
    resources: Dict,
    annotations: Vec<ObjectId>,
    media_box: [f32; 4],
}

impl Page {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn content_mut(&mut self) -> &mut ContentStream {
        &mut self.content
    }

    pub fn structure_state_mut(&mut self) -> &mut PageStructureState {
        &mut self.structure_state
    }
}

/// A whole document: the object arena, the page tree, and the catalog.
/// Single-threaded, synchronous, built up in memory and emitted once via
/// [`Document::finalize`] (§5 "Concurrency & resource model").
pub struct Document {
    arena: Arena,
    config: DocumentConfig,
    catalog: Catalog,
    pages_id: ObjectId,
    pages: Vec<Page>,
    struct_tree_root: Option<StructTreeRoot>,
}

impl Document {
    pub fn new(config: DocumentConfig) -> Self {
        let mut arena = Arena::new();
        let pages_id = arena.alloc();
        let mut pages_dict = Dict::new();
        pages_dict.set("Type", "Pages");
        pages_dict.set("Kids", Object::Array(Vec::new()));
        pages_dict.set("Count", 0i64);
        arena.set(pages_id, pages_dict);
        let catalog = Catalog::new(&mut arena, pages_id);
        Document { arena, config, catalog, pages_id, pages: Vec::new(), struct_tree_root: None }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// `StructTreeRoot` is created on first use and immediately attached to
    /// the catalog — a document either is tagged from its first call or
    /// never is, so there is no separate "attach" step to forget.
    pub fn ensure_struct_tree_root(&mut self) -> ObjectId {
        if self.struct_tree_root.is_none() {
            let root = StructTreeRoot::new(&mut self.arena);
            self.catalog.set_struct_tree_root(&mut self.arena, root.id);
            self.struct_tree_root = Some(root);
        }
        self.struct_tree_root.as_ref().unwrap().id
    }

    pub fn struct_tree_root(&self) -> Option<&StructTreeRoot> {
        self.struct_tree_root.as_ref()
    }

    pub fn add_page(&mut self, media_box: [f32; 4]) -> usize {
        let id = self.arena.alloc();
        let page = Page {
            id,
            content: ContentStream::new(&self.config),
            structure_state: PageStructureState::new(),
            resources: Dict::new(),
            annotations: Vec::new(),
            media_box,
        };
        self.pages.push(page);
        self.pages.len() - 1
    }

    pub fn page_mut(&mut self, index: usize) -> &mut Page {
        &mut self.pages[index]
    }

    pub fn page_id(&self, index: usize) -> ObjectId {
        self.pages[index].id
    }

    fn register_resource(&mut self, page_index: usize, category: &'static str, name: &str, id: ObjectId) {
        let resources = &mut self.pages[page_index].resources;
        if !resources.contains_key(category) {
            resources.set(category, Dict::new());
        }
        if let Some(Object::Dict(sub)) = resources.get_mut(category) {
            if !sub.contains_key(name) {
                sub.set(name, id);
            }
        }
    }

    /// §5 "Shared resources": register `font_ref` under the local name it
    /// reports, idempotently, the first time `page_index` refers to it.
    pub fn use_font(&mut self, page_index: usize, font: &dyn Font, font_ref: ObjectId) -> String {
        let name = font.local_resource_name().to_string();
        self.register_resource(page_index, "Font", &name, font_ref);
        name
    }

    pub fn use_xobject(&mut self, page_index: usize, xobject: &dyn XObject, xobject_ref: ObjectId) -> String {
        let name = xobject.local_resource_name().to_string();
        self.register_resource(page_index, "XObject", &name, xobject_ref);
        name
    }

    pub fn use_ext_gstate(&mut self, page_index: usize, name: &str, ext_gstate_ref: ObjectId) {
        self.register_resource(page_index, "ExtGState", name, ext_gstate_ref);
    }

    /// Attach `widget` to the page's `Annots` array. Attaching it to the
    /// catalog's `AcroForm.Fields` (and, for radio buttons, to the parent
    /// field's `Kids`) is the caller's responsibility via `Catalog` /
    /// `form::field` directly — a page does not know which fields exist.
    pub fn add_widget_annotation(&mut self, page_index: usize, widget: ObjectId) {
        self.pages[page_index].annotations.push(widget);
    }

    /// Materialize every page's content stream and page dictionary, update
    /// the page tree, then drain the arena through `PdfFile` in allocation
    /// order. Allocation order is preserved end to end: `PdfFile` assigns
    /// object numbers by calling `assign_object_id` once per arena slot in
    /// the same order the arena handed them out, so references recorded
    /// while the document was being built still resolve correctly.
    pub fn finalize<W: Write>(mut self, output: W) -> PdfResult<W> {
        let mut kids = Vec::with_capacity(self.pages.len());
        for page in std::mem::take(&mut self.pages) {
            let Page { id, content, structure_state, resources, annotations, media_box } = page;

            let content_id = self.arena.alloc();
            self.arena.set(content_id, Stream::new(Dict::new(), content.into_bytes()));

            let mut page_dict = Dict::new();
            page_dict.set("Type", "Page");
            page_dict.set("Parent", self.pages_id);
            page_dict.set(
                "MediaBox",
                Object::Array(media_box.iter().map(|&v| Object::Real(v)).collect()),
            );
            page_dict.set("Resources", resources);
            page_dict.set("Contents", content_id);
            if !annotations.is_empty() {
                page_dict.set("Annots", Object::Array(annotations.into_iter().map(Object::Reference).collect()));
            }
            if let Some(struct_parents) = structure_state.struct_parents() {
                page_dict.set("StructParents", struct_parents);
            }
            self.arena.set(id, page_dict);
            kids.push(id);
        }

        let page_count = kids.len();
        if let Some(Object::Dict(pages_dict)) = self.arena.get_mut(self.pages_id) {
            pages_dict.set("Count", page_count as i64);
            pages_dict.set("Kids", Object::Array(kids.into_iter().map(Object::Reference).collect()));
        }

        let info_id = self.arena.alloc();
        let mut info_dict = Dict::new();
        info_dict.set("Producer", PdfString::literal(self.config.producer.clone()));
        self.arena.set(info_id, info_dict);

        let mut file = PdfFile::new(output, self.config.pdf_version)?;
        for (id, object) in self.arena.iter() {
            let assigned = file.assign_object_id();
            debug_assert_eq!(assigned.number, id.number, "arena and file object numbering diverged");
            let mut buffer = Vec::new();
            object.emit(&mut buffer);
            file.write_object(assigned, |w| w.write_all(&buffer))?;
        }
        debug!(objects = self.arena.len(), pages = page_count, "finalized document");

        file.finish(self.catalog.id, Some(info_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::state::Color;

    /// Initialize the `tracing` subscriber once so `cargo test -- --nocapture`
    /// shows the `debug!`/`trace!` lifecycle events `finalize` and
    /// `content/stream.rs` emit. Safe to call from multiple tests: a second
    /// `try_init` just returns an error that's discarded.
    fn init_test_logging() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn finalize_round_trips_a_single_blank_page() {
        init_test_logging();
        let config = DocumentConfig::default();
        let mut document = Document::new(config);
        let index = document.add_page([0.0, 0.0, 612.0, 792.0]);
        document.page_mut(index).content_mut().set_fill_color(Color::Gray(0.0)).unwrap();
        let bytes = document.finalize(Vec::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.7\n"));
        assert!(text.contains("/Type /Pages"));
        assert!(text.contains("/Type /Page"));
        assert!(text.contains("/Count 1"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn struct_tree_root_is_attached_to_catalog_once() {
        let config = DocumentConfig::default();
        let mut document = Document::new(config);
        let first = document.ensure_struct_tree_root();
        let second = document.ensure_struct_tree_root();
        assert_eq!(first, second);
        match document.arena().get(document.catalog().id) {
            Some(Object::Dict(dict)) => assert!(dict.contains_key("StructTreeRoot")),
            _ => panic!("expected catalog dict"),
        }
    }

    #[test]
    fn shared_font_keeps_a_single_resources_entry() {
        use crate::collab::{ByteClass, Encoder, FontKind, WritingMode};

        struct StubFont;
        impl Font for StubFont {
            fn bbox(&self) -> (f32, f32) {
                (750.0, -250.0)
            }
            fn descent(&self) -> f32 {
                -250.0
            }
            fn writing_mode(&self) -> WritingMode {
                WritingMode::Horizontal
            }
            fn kind(&self) -> FontKind {
                FontKind::Type1
            }
            fn encoder(&self) -> Option<&dyn Encoder> {
                None
            }
            fn local_resource_name(&self) -> &str {
                "F1"
            }
            fn measure_text(&self, text: &str, _max_width: f32, _wordwrap: bool) -> (usize, f32) {
                (text.len(), text.len() as f32 * 500.0)
            }
        }

        let config = DocumentConfig::default();
        let mut document = Document::new(config);
        let index = document.add_page([0.0, 0.0, 612.0, 792.0]);
        let font_ref = document.arena_mut().alloc();
        document.arena_mut().set(font_ref, Dict::new());
        let name1 = document.use_font(index, &StubFont, font_ref);
        let name2 = document.use_font(index, &StubFont, font_ref);
        assert_eq!(name1, name2);
    }
}
