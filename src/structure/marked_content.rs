//! §4.G MCID lifecycle, artifacts, and the operation that ties a content
//! stream's marked-content sequence to a structure element.
//!
//! Grounded in libharu's `HPDF_Page_BeginReferenceToStructureElement` /
//! `InternalBeginMarkedContentSequence` / `HPDF_Page_EndMarkedContentSequence`
//! / `HPDF_Page_BeginArtifact` (`examples/original_source/src/hpdf_page_operator.c`,
//! lines ~1940-2079).

use crate::content::stream::ContentStream;
use crate::error::PdfResult;
use crate::pdf::object::{Arena, Dict, ObjectId};
use crate::structure::tree::{StructTreeRoot, StructureElement};

/// Per-page bookkeeping for the MCID counter and the page's
/// `StructParents` key. Owned by the page (`document.rs`), one instance
/// per page.
#[derive(Default)]
pub struct PageStructureState {
    next_mcid: usize,
    struct_parents_key: Option<i64>,
}

impl PageStructureState {
    pub fn new() -> Self {
        PageStructureState::default()
    }

    /// The MCID the next successful marked-content reference will use,
    /// without reserving it yet.
    fn peek_mcid(&self) -> usize {
        self.next_mcid
    }

    /// Reserve `mcid` once its BDC has actually been emitted. `mcid` must be
    /// the value most recently returned by [`peek_mcid`](Self::peek_mcid).
    fn commit_mcid(&mut self, mcid: usize) {
        debug_assert_eq!(mcid, self.next_mcid, "committed MCID out of sequence");
        self.next_mcid = mcid + 1;
    }

    fn struct_parents_key(&mut self, root: &StructTreeRoot, arena: &mut Arena) -> i64 {
        if let Some(key) = self.struct_parents_key {
            return key;
        }
        let key = root.alloc_parent_tree_key(arena);
        self.struct_parents_key = Some(key);
        key
    }

    pub fn struct_parents(&self) -> Option<i64> {
        self.struct_parents_key
    }
}

/// `BeginStructureElementReference`: opens a `BDC` bracket carrying a
/// freshly-allocated MCID, registers that MCID with `element`, and ensures
/// the page's parent-tree entry exists and includes `element`.
pub fn begin_structure_element_reference(
    cs: &mut ContentStream,
    arena: &mut Arena,
    root: &StructTreeRoot,
    page_state: &mut PageStructureState,
    page: ObjectId,
    element: &StructureElement,
) -> PdfResult<usize> {
    let tag = match arena.get(element.id) {
        Some(crate::pdf::object::Object::Dict(dict)) => match dict.get("S") {
            Some(crate::pdf::object::Object::Name(name)) => name.as_str().to_string(),
            _ => "Span".to_string(),
        },
        _ => "Span".to_string(),
    };

    // Peek the MCID this call would use without committing it: if the BDC
    // emission below fails (e.g. wrong graphics mode), nothing has been
    // mutated and a caller's retry sees the same value, keeping the page's
    // MCID sequence gapless.
    let mcid = page_state.peek_mcid();
    let mut properties = Dict::new();
    properties.set("MCID", mcid as i64);
    cs.begin_marked_content_with_properties(&tag, &properties)?;
    page_state.commit_mcid(mcid);

    element.add_marked_content_sequence(arena, mcid, page);
    let key = page_state.struct_parents_key(root, arena);
    root.append_structure_reference(arena, key, element.id);

    Ok(mcid)
}

/// `EndMarkedContentSequence`: closes the bracket opened by
/// [`begin_structure_element_reference`] or by a bare `BMC`/`BDC`.
pub fn end_marked_content_sequence(cs: &mut ContentStream) -> PdfResult<()> {
    cs.end_marked_content()
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ArtifactType {
    Pagination,
    Layout,
    Page,
    Background,
}

impl ArtifactType {
    fn as_name(self) -> &'static str {
        match self {
            ArtifactType::Pagination => "Pagination",
            ArtifactType::Layout => "Layout",
            ArtifactType::Page => "Page",
            ArtifactType::Background => "Background",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ArtifactSubtype {
    Header,
    Footer,
    Watermark,
}

impl ArtifactSubtype {
    fn as_name(self) -> &'static str {
        match self {
            ArtifactSubtype::Header => "Header",
            ArtifactSubtype::Footer => "Footer",
            ArtifactSubtype::Watermark => "Watermark",
        }
    }
}

/// `BeginArtifact`: opens a `BDC /Artifact <<...>>` bracket. Artifacts are
/// content excluded from the tagged-reading order (headers, footers,
/// watermarks, pagination) — they never register a structure element or
/// consume an MCID.
pub fn begin_artifact(cs: &mut ContentStream, kind: ArtifactType, subtype: Option<ArtifactSubtype>) -> PdfResult<()> {
    let mut properties = Dict::new();
    properties.set("Type", kind.as_name());
    if let Some(subtype) = subtype {
        properties.set("Subtype", subtype.as_name());
    }
    cs.begin_marked_content_with_properties("Artifact", &properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::structure::tree::StructureType;

    #[test]
    fn mcid_sequence_is_gapless_within_a_page() {
        let mut arena = Arena::new();
        let root = StructTreeRoot::new(&mut arena);
        let config = DocumentConfig::default();
        let mut cs = ContentStream::new(&config);
        let mut page_state = PageStructureState::new();
        let page = ObjectId::new(7);

        let first = StructureElement::new(&mut arena, StructureType::P);
        let second = StructureElement::new(&mut arena, StructureType::P);

        let mcid0 = begin_structure_element_reference(&mut cs, &mut arena, &root, &mut page_state, page, &first).unwrap();
        end_marked_content_sequence(&mut cs).unwrap();
        let mcid1 = begin_structure_element_reference(&mut cs, &mut arena, &root, &mut page_state, page, &second).unwrap();
        end_marked_content_sequence(&mut cs).unwrap();

        assert_eq!(mcid0, 0);
        assert_eq!(mcid1, 1);
        assert_eq!(page_state.struct_parents(), Some(0));
    }

    #[test]
    fn rejected_reference_does_not_burn_an_mcid() {
        let mut arena = Arena::new();
        let root = StructTreeRoot::new(&mut arena);
        let config = DocumentConfig::default();
        let mut cs = ContentStream::new(&config);
        let mut page_state = PageStructureState::new();
        let page = ObjectId::new(7);
        let element = StructureElement::new(&mut arena, StructureType::P);

        // Put the stream in a mode where BDC is illegal.
        cs.move_to(0.0, 0.0).unwrap();

        let failed = begin_structure_element_reference(&mut cs, &mut arena, &root, &mut page_state, page, &element);
        assert!(failed.is_err());
        assert_eq!(page_state.peek_mcid(), 0, "a rejected BDC must not advance the MCID counter");
    }

    #[test]
    fn begin_artifact_emits_bdc_with_subtype() {
        let config = DocumentConfig::default();
        let mut cs = ContentStream::new(&config);
        begin_artifact(&mut cs, ArtifactType::Pagination, Some(ArtifactSubtype::Header)).unwrap();
        end_marked_content_sequence(&mut cs).unwrap();
        let text = String::from_utf8(cs.into_bytes()).unwrap();
        assert!(text.contains("/Artifact"));
        assert!(text.contains("/Subtype /Header"));
        assert!(text.ends_with("EMC\n"));
    }
}
