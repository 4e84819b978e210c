//! §4.G structure tree: `StructTreeRoot`, `StructureElement`, and the
//! parent-tree index that maps `(page, MCID)` back to structure elements.
//!
//! Grounded in libharu's `hpdf_structure_element.c`
//! (`HPDF_StructTreeRoot_New`, `HPDF_StructTreeRoot_AddParentTreeEntry`,
//! `HPDF_StructureElement_New`, `HPDF_StructureElement_AddChild`,
//! `HPDF_StructureElement_AddMarkedContentSequence`): the lazy creation of
//! `ParentTree`/`StructParents` bookkeeping and the strict single-parent
//! rule on `AddChild` are carried over unchanged; the open-coded `obj_class`
//! tag dispatch the C source uses is replaced by distinct Rust types per
//! spec §9's redesign note.

use crate::error::{PdfError, PdfResult};
use crate::pdf::object::{Arena, Dict, Object, ObjectId};

/// Closed set of structure types, drawn from `HPDF_STRUCTURE_TYPE_NAMES`
/// (`examples/original_source/src/hpdf_structure_element.c`).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum StructureType {
    Document,
    Part,
    Art,
    Sect,
    Div,
    BlockQuote,
    Caption,
    Toc,
    Toci,
    Index,
    NonStruct,
    Private,
    H,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    P,
    L,
    Li,
    Lbl,
    LBody,
    Table,
    Tr,
    Th,
    Td,
    THead,
    TBody,
    TFoot,
    Span,
    Quote,
    Note,
    Reference,
    BibEntry,
    Code,
    Link,
    Annot,
    Ruby,
    Warichu,
    Figure,
    Formula,
    Form,
}

impl StructureType {
    pub fn as_name(self) -> &'static str {
        match self {
            StructureType::Document => "Document",
            StructureType::Part => "Part",
            StructureType::Art => "Art",
            StructureType::Sect => "Sect",
            StructureType::Div => "Div",
            StructureType::BlockQuote => "BlockQuote",
            StructureType::Caption => "Caption",
            StructureType::Toc => "TOC",
            StructureType::Toci => "TOCI",
            StructureType::Index => "Index",
            StructureType::NonStruct => "NonStruct",
            StructureType::Private => "Private",
            StructureType::H => "H",
            StructureType::H1 => "H1",
            StructureType::H2 => "H2",
            StructureType::H3 => "H3",
            StructureType::H4 => "H4",
            StructureType::H5 => "H5",
            StructureType::H6 => "H6",
            StructureType::P => "P",
            StructureType::L => "L",
            StructureType::Li => "LI",
            StructureType::Lbl => "Lbl",
            StructureType::LBody => "LBody",
            StructureType::Table => "Table",
            StructureType::Tr => "TR",
            StructureType::Th => "TH",
            StructureType::Td => "TD",
            StructureType::THead => "THead",
            StructureType::TBody => "TBody",
            StructureType::TFoot => "TFoot",
            StructureType::Span => "Span",
            StructureType::Quote => "Quote",
            StructureType::Note => "Note",
            StructureType::Reference => "Reference",
            StructureType::BibEntry => "BibEntry",
            StructureType::Code => "Code",
            StructureType::Link => "Link",
            StructureType::Annot => "Annot",
            StructureType::Ruby => "Ruby",
            StructureType::Warichu => "Warichu",
            StructureType::Figure => "Figure",
            StructureType::Formula => "Formula",
            StructureType::Form => "Form",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Placement {
    Block,
    Inline,
    Before,
    Start,
    End,
}

impl Placement {
    fn as_name(self) -> &'static str {
        match self {
            Placement::Block => "Block",
            Placement::Inline => "Inline",
            Placement::Before => "Before",
            Placement::Start => "Start",
            Placement::End => "End",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TableHeaderCellScope {
    Row,
    Column,
    Both,
}

impl TableHeaderCellScope {
    fn as_name(self) -> &'static str {
        match self {
            TableHeaderCellScope::Row => "Row",
            TableHeaderCellScope::Column => "Column",
            TableHeaderCellScope::Both => "Both",
        }
    }
}

/// The document's single structure-tree root. Created the first time a
/// structure element is created, per `HPDF_StructureElement_New`'s lazy
/// catalog attachment — here the laziness is pushed up to the caller
/// (`document.rs` creates one root on first use and hands out `&mut
/// StructTreeRoot` from then on).
pub struct StructTreeRoot {
    pub id: ObjectId,
}

impl StructTreeRoot {
    pub fn new(arena: &mut Arena) -> Self {
        let id = arena.alloc();
        let mut dict = Dict::new();
        dict.set("Type", "StructTreeRoot");
        dict.set("K", Object::Array(Vec::new()));
        arena.set(id, dict);
        StructTreeRoot { id }
    }

    fn dict_mut<'a>(&self, arena: &'a mut Arena) -> &'a mut Dict {
        match arena.get_mut(self.id) {
            Some(Object::Dict(dict)) => dict,
            _ => unreachable!("StructTreeRoot always stores a Dict"),
        }
    }

    /// Attach `child` at the tree's top level (for elements with no
    /// structural parent other than the root itself).
    pub fn add_top_level_child(&self, arena: &mut Arena, child: ObjectId) {
        if let Object::Array(kids) = self.dict_mut(arena).get_mut("K").expect("K is always present") {
            kids.push(Object::Reference(child));
        }
    }

    fn ensure_parent_tree(&self, arena: &mut Arena) {
        let dict = self.dict_mut(arena);
        if !dict.contains_key("ParentTree") {
            let mut parent_tree = Dict::new();
            parent_tree.set("Nums", Object::Array(Vec::new()));
            dict.set("ParentTree", parent_tree);
        }
        if !dict.contains_key("ParentTreeNextKey") {
            dict.set("ParentTreeNextKey", 0i64);
        }
    }

    /// Allocate the next `StructParents` key and its (initially empty)
    /// per-page array in `ParentTree.Nums`. Callers must allocate this at
    /// most once per page — see `Page::struct_parents` in `document.rs`.
    pub fn alloc_parent_tree_key(&self, arena: &mut Arena) -> i64 {
        self.ensure_parent_tree(arena);
        let dict = self.dict_mut(arena);
        let next_key = match dict.get("ParentTreeNextKey") {
            Some(Object::Integer(n)) => *n,
            _ => 0,
        };
        dict.set("ParentTreeNextKey", next_key + 1);
        if let Some(Object::Dict(parent_tree)) = dict.get_mut("ParentTree") {
            if let Some(Object::Array(nums)) = parent_tree.get_mut("Nums") {
                nums.push(Object::Integer(next_key));
                nums.push(Object::Array(Vec::new()));
            }
        }
        next_key
    }

    /// Append `element` to the per-page array for `key` (the array index
    /// is implicitly the MCID: callers append in MCID order, 0, 1, 2, ...).
    pub fn append_structure_reference(&self, arena: &mut Arena, key: i64, element: ObjectId) {
        let dict = self.dict_mut(arena);
        if let Some(Object::Dict(parent_tree)) = dict.get_mut("ParentTree") {
            if let Some(Object::Array(nums)) = parent_tree.get_mut("Nums") {
                let mut i = 0;
                while i + 1 < nums.len() {
                    if let Object::Integer(k) = nums[i] {
                        if k == key {
                            if let Object::Array(entries) = &mut nums[i + 1] {
                                entries.push(Object::Reference(element));
                            }
                            return;
                        }
                    }
                    i += 2;
                }
            }
        }
    }
}

/// A single node in the structure tree.
pub struct StructureElement {
    pub id: ObjectId,
}

impl StructureElement {
    pub fn new(arena: &mut Arena, structure_type: StructureType) -> Self {
        let id = arena.alloc();
        let mut dict = Dict::new();
        dict.set("Type", "StructElem");
        dict.set("S", structure_type.as_name());
        dict.set("K", Object::Array(Vec::new()));
        arena.set(id, dict);
        StructureElement { id }
    }

    fn dict_mut<'a>(&self, arena: &'a mut Arena) -> &'a mut Dict {
        match arena.get_mut(self.id) {
            Some(Object::Dict(dict)) => dict,
            _ => unreachable!("StructureElement always stores a Dict"),
        }
    }

    fn dict<'a>(&self, arena: &'a Arena) -> &'a Dict {
        match arena.get(self.id) {
            Some(Object::Dict(dict)) => dict,
            _ => unreachable!("StructureElement always stores a Dict"),
        }
    }

    /// `AddChild`: fails if `child` already has a parent (§4.G strict
    /// tree).
    pub fn add_child(&self, arena: &mut Arena, child: &StructureElement) -> PdfResult<()> {
        if child.dict(arena).contains_key("P") {
            return Err(PdfError::InvalidParameter {
                op: "StructureElement::add_child",
                detail: "child already has a parent".to_string(),
            });
        }
        let self_id = self.id;
        child.dict_mut(arena).set("P", self_id);
        if let Object::Array(kids) = self.dict_mut(arena).get_mut("K").expect("K is always present") {
            kids.push(Object::Reference(child.id));
        }
        Ok(())
    }

    /// `AddMarkedContentSequence`: registers one MCID for this element on
    /// `page`. Same-page references append the bare MCID integer; a
    /// reference from a different page appends a marked-content reference
    /// (`MCR`) dictionary instead.
    pub fn add_marked_content_sequence(&self, arena: &mut Arena, mcid: usize, page: ObjectId) {
        let same_page = matches!(self.dict(arena).get("Pg"), Some(Object::Reference(p)) if *p == page);
        let unset = !self.dict(arena).contains_key("Pg");

        if unset {
            self.dict_mut(arena).set("Pg", page);
        }

        let entry = if unset || same_page {
            Object::Integer(mcid as i64)
        } else {
            let mut mcr = Dict::new();
            mcr.set("Type", "MCR");
            mcr.set("Pg", page);
            mcr.set("MCID", mcid as i64);
            Object::Dict(mcr)
        };

        if let Object::Array(kids) = self.dict_mut(arena).get_mut("K").expect("K is always present") {
            kids.push(entry);
        }
    }

    fn attributes_mut<'a>(&self, arena: &'a mut Arena) -> &'a mut Dict {
        if !self.dict(arena).contains_key("A") {
            let mut owner_dict = Dict::new();
            owner_dict.set("Layout", Dict::new());
            self.dict_mut(arena).set("A", owner_dict);
        }
        match self.dict_mut(arena).get_mut("A") {
            Some(Object::Dict(owner_dict)) => match owner_dict.get_mut("Layout") {
                Some(Object::Dict(layout)) => layout,
                _ => unreachable!("Layout attribute dict is always present once initialized"),
            },
            _ => unreachable!("A is always a Dict once initialized"),
        }
    }

    pub fn set_alternate_text(&self, arena: &mut Arena, text: &str) {
        self.dict_mut(arena).set("Alt", crate::pdf::object::PdfString::literal(text));
    }

    pub fn set_actual_text(&self, arena: &mut Arena, text: &str) {
        self.dict_mut(arena).set("ActualText", crate::pdf::object::PdfString::literal(text));
    }

    /// `BBox` layout attribute, swapping top/bottom if given inverted.
    pub fn set_bbox(&self, arena: &mut Arena, left: f32, bottom: f32, right: f32, top: f32) {
        let (bottom, top) = if bottom > top { (top, bottom) } else { (bottom, top) };
        let bbox = Object::Array(vec![left.into(), bottom.into(), right.into(), top.into()]);
        self.attributes_mut(arena).set("BBox", bbox);
    }

    pub fn set_placement(&self, arena: &mut Arena, placement: Placement) {
        self.attributes_mut(arena).set("Placement", placement.as_name());
    }

    pub fn set_table_header_cell_scope(&self, arena: &mut Arena, scope: TableHeaderCellScope) {
        self.attributes_mut(arena).set("Scope", scope.as_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_child_sets_parent_and_appends_kid() {
        let mut arena = Arena::new();
        let parent = StructureElement::new(&mut arena, StructureType::Sect);
        let child = StructureElement::new(&mut arena, StructureType::P);
        parent.add_child(&mut arena, &child).unwrap();
        assert!(matches!(child.dict(&arena).get("P"), Some(Object::Reference(id)) if *id == parent.id));
    }

    #[test]
    fn add_child_rejects_a_child_with_an_existing_parent() {
        let mut arena = Arena::new();
        let parent_a = StructureElement::new(&mut arena, StructureType::Sect);
        let parent_b = StructureElement::new(&mut arena, StructureType::Sect);
        let child = StructureElement::new(&mut arena, StructureType::P);
        parent_a.add_child(&mut arena, &child).unwrap();
        assert!(parent_b.add_child(&mut arena, &child).is_err());
    }

    #[test]
    fn marked_content_sequence_uses_bare_mcid_on_first_page() {
        let mut arena = Arena::new();
        let element = StructureElement::new(&mut arena, StructureType::P);
        let page = ObjectId::new(42);
        element.add_marked_content_sequence(&mut arena, 0, page);
        match element.dict(&arena).get("K") {
            Some(Object::Array(kids)) => assert!(matches!(kids[0], Object::Integer(0))),
            _ => panic!("expected K array"),
        }
    }

    #[test]
    fn marked_content_sequence_from_another_page_uses_mcr_dict() {
        let mut arena = Arena::new();
        let element = StructureElement::new(&mut arena, StructureType::P);
        let page_one = ObjectId::new(1);
        let page_two = ObjectId::new(2);
        element.add_marked_content_sequence(&mut arena, 0, page_one);
        element.add_marked_content_sequence(&mut arena, 3, page_two);
        match element.dict(&arena).get("K") {
            Some(Object::Array(kids)) => {
                assert!(matches!(&kids[1], Object::Dict(d) if d.get("Type").is_some()));
            }
            _ => panic!("expected K array"),
        }
    }

    #[test]
    fn parent_tree_keys_are_allocated_in_order() {
        let mut arena = Arena::new();
        let root = StructTreeRoot::new(&mut arena);
        assert_eq!(root.alloc_parent_tree_key(&mut arena), 0);
        assert_eq!(root.alloc_parent_tree_key(&mut arena), 1);
    }
}
