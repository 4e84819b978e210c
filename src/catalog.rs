//! Document catalog surface used by the structure and form subsystems
//! (§6 "Catalog surface"): `PageLayout`, `PageMode`, `ViewerPreferences`,
//! `MarkInfo`, and the `AcroForm`/`StructTreeRoot` attachment points.
//!
//! Grounded in libharu's `hpdf_catalog.c` (`HPDF_Catalog_SetPageLayout`,
//! `SetPageMode`, `SetViewerPreference`, `HPDF_Catalog_AddInteractiveField`),
//! narrowed to what §4.G/§4.H need to reach. `bitflags`, used here and in
//! `form::field` for the `Ff` field-flags bitmask, is the crate `typst-pdf-writer`
//! (`examples/other_examples/manifests/typst-pdf-writer/Cargo.toml`) reaches
//! for the same kind of PDF bit-field.

use bitflags::bitflags;

use crate::pdf::object::{Arena, Dict, Object, ObjectId};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PageLayout {
    SinglePage,
    OneColumn,
    TwoColumnLeft,
    TwoColumnRight,
    TwoPageLeft,
    TwoPageRight,
}

impl PageLayout {
    fn as_name(self) -> &'static str {
        match self {
            PageLayout::SinglePage => "SinglePage",
            PageLayout::OneColumn => "OneColumn",
            PageLayout::TwoColumnLeft => "TwoColumnLeft",
            PageLayout::TwoColumnRight => "TwoColumnRight",
            PageLayout::TwoPageLeft => "TwoPageLeft",
            PageLayout::TwoPageRight => "TwoPageRight",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PageMode {
    UseNone,
    UseOutlines,
    UseThumbs,
    FullScreen,
    UseOc,
    UseAttachments,
}

impl PageMode {
    fn as_name(self) -> &'static str {
        match self {
            PageMode::UseNone => "UseNone",
            PageMode::UseOutlines => "UseOutlines",
            PageMode::UseThumbs => "UseThumbs",
            PageMode::FullScreen => "FullScreen",
            PageMode::UseOc => "UseOC",
            PageMode::UseAttachments => "UseAttachments",
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Debug)]
    pub struct ViewerPreferences: u32 {
        const HIDE_TOOLBAR         = 1 << 0;
        const HIDE_MENUBAR         = 1 << 1;
        const HIDE_WINDOW_UI       = 1 << 2;
        const FIT_WINDOW           = 1 << 3;
        const CENTER_WINDOW        = 1 << 4;
        const PRINT_SCALING_NONE   = 1 << 5;
        const DISPLAY_DOC_TITLE    = 1 << 6;
        const SIMPLEX              = 1 << 7;
        const DUPLEX_FLIP_SHORT    = 1 << 8;
        const DUPLEX_FLIP_LONG     = 1 << 9;
    }
}

impl ViewerPreferences {
    fn emit(self) -> Dict {
        let mut dict = Dict::new();
        if self.contains(ViewerPreferences::HIDE_TOOLBAR) {
            dict.set("HideToolbar", true);
        }
        if self.contains(ViewerPreferences::HIDE_MENUBAR) {
            dict.set("HideMenubar", true);
        }
        if self.contains(ViewerPreferences::HIDE_WINDOW_UI) {
            dict.set("HideWindowUI", true);
        }
        if self.contains(ViewerPreferences::FIT_WINDOW) {
            dict.set("FitWindow", true);
        }
        if self.contains(ViewerPreferences::CENTER_WINDOW) {
            dict.set("CenterWindow", true);
        }
        if self.contains(ViewerPreferences::PRINT_SCALING_NONE) {
            dict.set("PrintScaling", "None");
        }
        if self.contains(ViewerPreferences::DISPLAY_DOC_TITLE) {
            dict.set("DisplayDocTitle", true);
        }
        if self.contains(ViewerPreferences::SIMPLEX) {
            dict.set("Duplex", "Simplex");
        } else if self.contains(ViewerPreferences::DUPLEX_FLIP_SHORT) {
            dict.set("Duplex", "DuplexFlipShortEdge");
        } else if self.contains(ViewerPreferences::DUPLEX_FLIP_LONG) {
            dict.set("Duplex", "DuplexFlipLongEdge");
        }
        dict
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Debug)]
    pub struct MarkInfo: u32 {
        const MARKED           = 1 << 0;
        const USER_PROPERTIES  = 1 << 1;
        const SUSPECTS         = 1 << 2;
    }
}

impl MarkInfo {
    fn emit(self) -> Dict {
        let mut dict = Dict::new();
        dict.set("Marked", self.contains(MarkInfo::MARKED));
        dict.set("UserProperties", self.contains(MarkInfo::USER_PROPERTIES));
        dict.set("Suspects", self.contains(MarkInfo::SUSPECTS));
        dict
    }
}

/// The document catalog (`/Type /Catalog`). Owns the page tree root
/// (managed by `document.rs`), and the optional `AcroForm`/`StructTreeRoot`
/// attachments used by H and G respectively.
pub struct Catalog {
    pub id: ObjectId,
}

impl Catalog {
    pub fn new(arena: &mut Arena, pages_id: ObjectId) -> Self {
        let id = arena.alloc();
        let mut dict = Dict::new();
        dict.set("Type", "Catalog");
        dict.set("Pages", pages_id);
        arena.set(id, dict);
        Catalog { id }
    }

    fn dict_mut<'a>(&self, arena: &'a mut Arena) -> &'a mut Dict {
        match arena.get_mut(self.id) {
            Some(Object::Dict(dict)) => dict,
            _ => unreachable!("Catalog always stores a Dict"),
        }
    }

    pub fn set_page_layout(&self, arena: &mut Arena, layout: PageLayout) {
        self.dict_mut(arena).set("PageLayout", layout.as_name());
    }

    pub fn set_page_mode(&self, arena: &mut Arena, mode: PageMode) {
        self.dict_mut(arena).set("PageMode", mode.as_name());
    }

    pub fn set_viewer_preferences(&self, arena: &mut Arena, preferences: ViewerPreferences) {
        self.dict_mut(arena).set("ViewerPreferences", preferences.emit());
    }

    pub fn set_mark_info(&self, arena: &mut Arena, mark_info: MarkInfo) {
        self.dict_mut(arena).set("MarkInfo", mark_info.emit());
    }

    pub fn set_struct_tree_root(&self, arena: &mut Arena, struct_tree_root: ObjectId) {
        self.dict_mut(arena).set("StructTreeRoot", struct_tree_root);
    }

    /// `HPDF_Catalog_AddInteractiveField`: append `field` to
    /// `AcroForm.Fields`, creating the `AcroForm` dictionary on first use.
    pub fn add_interactive_field(&self, arena: &mut Arena, field: ObjectId) {
        if !self.dict_mut(arena).contains_key("AcroForm") {
            let mut acro_form = Dict::new();
            acro_form.set("Fields", Object::Array(Vec::new()));
            acro_form.set("NeedAppearances", false);
            self.dict_mut(arena).set("AcroForm", acro_form);
        }
        if let Some(Object::Dict(acro_form)) = self.dict_mut(arena).get_mut("AcroForm") {
            if let Some(Object::Array(fields)) = acro_form.get_mut("Fields") {
                fields.push(Object::Reference(field));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_preferences_emit_only_set_bits() {
        let prefs = ViewerPreferences::FIT_WINDOW | ViewerPreferences::DISPLAY_DOC_TITLE;
        let dict = prefs.emit();
        assert!(dict.get("FitWindow").is_some());
        assert!(dict.get("HideToolbar").is_none());
    }

    #[test]
    fn add_interactive_field_creates_acro_form_lazily() {
        let mut arena = Arena::new();
        let pages = arena.alloc();
        arena.set(pages, Dict::new());
        let catalog = Catalog::new(&mut arena, pages);
        let field = arena.alloc();
        catalog.add_interactive_field(&mut arena, field);
        match arena.get(catalog.id) {
            Some(Object::Dict(dict)) => assert!(dict.contains_key("AcroForm")),
            _ => panic!("expected catalog dict"),
        }
    }
}
