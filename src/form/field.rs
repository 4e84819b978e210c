//! §4.H field dictionary and widget annotation construction.
//!
//! Grounded in libharu's `hpdf_field.c`
//! (`HPDF_RadioButtonField_New`/`AddChild`/`AddOpt`/`SetSelected`): the
//! unconditional `Radio`-on/`PushButton`-off flag normalization and the
//! radios-in-unison dedup-by-value lookup are carried over verbatim.

use bitflags::bitflags;

use crate::error::{PdfError, PdfResult};
use crate::pdf::object::{Arena, Dict, Object, ObjectId, PdfString};

bitflags! {
    /// The field dictionary's `Ff` bitmask. Only the subset used by the
    /// field kinds this module constructs.
    #[derive(Copy, Clone, Eq, PartialEq, Debug)]
    pub struct FieldFlags: u32 {
        const READ_ONLY        = 1 << 0;
        const REQUIRED         = 1 << 1;
        const NO_EXPORT        = 1 << 2;
        const MULTILINE        = 1 << 12;
        const PASSWORD         = 1 << 13;
        const NO_TOGGLE_TO_OFF = 1 << 14;
        const RADIO            = 1 << 15;
        const PUSHBUTTON       = 1 << 16;
        const RADIOS_IN_UNISON = 1 << 25;
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Rect {
    pub fn width(self) -> f32 {
        self.right - self.left
    }
    pub fn height(self) -> f32 {
        self.top - self.bottom
    }
    fn emit(self) -> Object {
        Object::Array(vec![self.left.into(), self.bottom.into(), self.right.into(), self.top.into()])
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Rotation {
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    fn as_degrees(self) -> i64 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

fn new_widget_base(arena: &mut Arena, field_type: &str, name: &str, rect: Rect, printable: bool, rotation: Rotation) -> ObjectId {
    let id = arena.alloc();
    let mut dict = Dict::new();
    dict.set("Type", "Annot");
    dict.set("Subtype", "Widget");
    dict.set("Rect", rect.emit());
    dict.set("F", if printable { 4i64 } else { 0i64 });
    dict.set("FT", field_type);
    dict.set("T", PdfString::literal(name));
    if rotation.as_degrees() != 0 {
        let mut mk = Dict::new();
        mk.set("R", rotation.as_degrees());
        dict.set("MK", mk);
    }
    arena.set(id, dict);
    id
}

/// A text, signature, or check-box field. Each is a single indirect object
/// that is simultaneously the field dictionary and its own widget
/// annotation, the common PDF convention for a field with exactly one
/// widget.
pub struct Field {
    pub id: ObjectId,
}

impl Field {
    fn dict_mut<'a>(&self, arena: &'a mut Arena) -> &'a mut Dict {
        match arena.get_mut(self.id) {
            Some(Object::Dict(dict)) => dict,
            _ => unreachable!("Field always stores a Dict"),
        }
    }

    pub fn new_text(
        arena: &mut Arena,
        name: &str,
        rect: Rect,
        printable: bool,
        rotation: Rotation,
        flags: FieldFlags,
        max_len: Option<u32>,
    ) -> Self {
        let id = new_widget_base(arena, "Tx", name, rect, printable, rotation);
        let field = Field { id };
        field.dict_mut(arena).set("Ff", flags.bits() as i64);
        if let Some(max_len) = max_len {
            field.dict_mut(arena).set("MaxLen", max_len as i64);
        }
        field
    }

    pub fn new_signature(arena: &mut Arena, name: &str, rect: Rect, printable: bool, rotation: Rotation) -> Self {
        let id = new_widget_base(arena, "Sig", name, rect, printable, rotation);
        Field { id }
    }

    pub fn new_check_box(arena: &mut Arena, name: &str, rect: Rect, printable: bool, checked: bool) -> Self {
        let id = new_widget_base(arena, "Btn", name, rect, printable, Rotation::None);
        let field = Field { id };
        field.dict_mut(arena).set("V", if checked { "Yes" } else { "Off" });
        field.dict_mut(arena).set("AS", if checked { "Yes" } else { "Off" });
        field
    }

    pub fn set_default_appearance(&self, arena: &mut Arena, da: &str) {
        self.dict_mut(arena).set("DA", PdfString::literal(da));
    }

    pub fn set_quadding(&self, arena: &mut Arena, quadding: i64) {
        self.dict_mut(arena).set("Q", quadding);
    }

    pub fn set_appearance_streams(&self, arena: &mut Arena, normal: Object) {
        let mut ap = Dict::new();
        ap.set("N", normal);
        self.dict_mut(arena).set("AP", ap);
    }
}

/// A radio-button group: the parent field dictionary (`FT=Btn`,
/// `Ff` forced to `RADIO` and never `PUSHBUTTON`) plus its widget `Kids`.
pub struct RadioButtonField {
    pub id: ObjectId,
    radios_in_unison: bool,
}

impl RadioButtonField {
    /// `HPDF_RadioButtonField_New`: flags are normalized unconditionally —
    /// `RADIO` is forced on and `PUSHBUTTON` forced off regardless of what
    /// the caller asks for.
    pub fn new(arena: &mut Arena, name: &str, mut flags: FieldFlags) -> Self {
        flags.insert(FieldFlags::RADIO);
        flags.remove(FieldFlags::PUSHBUTTON);
        let radios_in_unison = flags.contains(FieldFlags::RADIOS_IN_UNISON);

        let id = arena.alloc();
        let mut dict = Dict::new();
        dict.set("Type", "Annot");
        dict.set("FT", "Btn");
        dict.set("T", PdfString::literal(name));
        dict.set("Ff", flags.bits() as i64);
        dict.set("Kids", Object::Array(Vec::new()));
        dict.set("Opt", Object::Array(Vec::new()));
        arena.set(id, dict);
        RadioButtonField { id, radios_in_unison }
    }

    fn dict_mut<'a>(&self, arena: &'a mut Arena) -> &'a mut Dict {
        match arena.get_mut(self.id) {
            Some(Object::Dict(dict)) => dict,
            _ => unreachable!("RadioButtonField always stores a Dict"),
        }
    }

    /// `AddChild`: attach a widget annotation as a radio-button option,
    /// setting its `Parent` back-reference.
    pub fn add_child(&self, arena: &mut Arena, widget: ObjectId) {
        if let Some(Object::Dict(widget_dict)) = arena.get_mut(widget) {
            widget_dict.set("Parent", self.id);
        }
        if let Object::Array(kids) = self.dict_mut(arena).get_mut("Kids").expect("Kids is always present") {
            kids.push(Object::Reference(widget));
        }
    }

    /// `AddOpt`: append `value` to the `Opt` array. In radios-in-unison
    /// mode, an equal-valued option already present is reused and its
    /// index returned instead of appending a duplicate.
    pub fn add_opt(&self, arena: &mut Arena, value: &str) -> usize {
        if self.radios_in_unison {
            if let Some(Object::Array(opt)) = self.dict_mut(arena).get("Opt").cloned() {
                for (index, existing) in opt.iter().enumerate() {
                    if let Object::String(s) = existing {
                        if s.bytes == value.as_bytes() {
                            return index;
                        }
                    }
                }
            }
        }
        let dict = self.dict_mut(arena);
        let index = match dict.get("Opt") {
            Some(Object::Array(opt)) => opt.len(),
            _ => 0,
        };
        if let Some(Object::Array(opt)) = dict.get_mut("Opt") {
            opt.push(Object::String(PdfString::literal(value)));
        }
        index
    }

    /// `SetSelected`: set `V` to the name of the selected widget's on-state
    /// (conventionally the stringified option index).
    pub fn set_selected(&self, arena: &mut Arena, option_index: usize) -> PdfResult<()> {
        if option_index > 9999 {
            return Err(PdfError::InvalidParameter { op: "RadioButtonField::set_selected", detail: "option index too large".to_string() });
        }
        self.dict_mut(arena).set("V", option_index.to_string().as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radio_button_flags_are_normalized() {
        let mut arena = Arena::new();
        let group = RadioButtonField::new(&mut arena, "choice", FieldFlags::PUSHBUTTON);
        match arena.get(group.id) {
            Some(Object::Dict(dict)) => match dict.get("Ff") {
                Some(Object::Integer(ff)) => {
                    let flags = FieldFlags::from_bits_truncate(*ff as u32);
                    assert!(flags.contains(FieldFlags::RADIO));
                    assert!(!flags.contains(FieldFlags::PUSHBUTTON));
                }
                _ => panic!("expected Ff integer"),
            },
            _ => panic!("expected dict"),
        }
    }

    #[test]
    fn radios_in_unison_dedupes_by_value() {
        let mut arena = Arena::new();
        let group = RadioButtonField::new(&mut arena, "choice", FieldFlags::RADIOS_IN_UNISON);
        assert_eq!(group.add_opt(&mut arena, "Yes"), 0);
        assert_eq!(group.add_opt(&mut arena, "No"), 1);
        assert_eq!(group.add_opt(&mut arena, "Yes"), 0);
    }

    #[test]
    fn plain_radio_group_appends_duplicates() {
        let mut arena = Arena::new();
        let group = RadioButtonField::new(&mut arena, "choice", FieldFlags::empty());
        assert_eq!(group.add_opt(&mut arena, "Yes"), 0);
        assert_eq!(group.add_opt(&mut arena, "Yes"), 1);
    }
}
