//! §4.B Object model: a tagged PDF value with a stable identity and an
//! emit operation.

use super::format::{format_int, format_real_default, write_escaped_name, write_escaped_string};
use crate::error::{PdfError, PdfResult};

/// The (object number, generation) pair that identifies an indirect object.
/// Generation is always 0 for documents produced by this crate (no
/// incremental updates), but is kept explicit since it is part of the
/// on-disk syntax `N G obj` / `N G R`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ObjectId {
    pub number: u32,
    pub generation: u16,
}

impl ObjectId {
    pub fn new(number: u32) -> Self {
        ObjectId { number, generation: 0 }
    }

    pub fn emit(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(format_int(self.number as i64).as_bytes());
        out.push(b' ');
        out.extend_from_slice(format_int(self.generation as i64).as_bytes());
        out.push(b' ');
        out.push(b'R');
    }
}

/// Lifecycle of an indirect object in the arena. Every object that is
/// allocated must end up `Written` (or `Free`) by the time the document
/// is finalized.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ObjectStatus {
    Unwritten,
    Written,
    Free,
}

/// In-memory home for indirect objects built up before the final emit
/// pass. Every subsystem that needs to allocate an object with an identity
/// known ahead of its content (structure elements referencing each other,
/// widgets referencing appearance streams) allocates through this arena
/// rather than writing straight to the file, since PDF's cross-reference
/// table requires every object's byte offset to be known up front (§5
/// "Ordering guarantees").
#[derive(Default)]
pub struct Arena {
    slots: Vec<Option<Object>>,
}

impl Arena {
    pub fn new() -> Self {
        Arena { slots: vec![None] }
    }

    /// Reserve the next object number without content yet.
    pub fn alloc(&mut self) -> ObjectId {
        let number = self.slots.len() as u32;
        self.slots.push(None);
        ObjectId::new(number)
    }

    pub fn set(&mut self, id: ObjectId, object: impl Into<Object>) {
        self.slots[id.number as usize] = Some(object.into());
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.slots.get(id.number as usize).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.slots.get_mut(id.number as usize).and_then(|slot| slot.as_mut())
    }

    /// Object numbers 1.. in allocation order, alongside their content.
    /// Panics if an allocated id was never `set` — the same invariant
    /// `PdfFile::finish` enforces for written objects.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.slots.iter().enumerate().skip(1).map(|(number, slot)| {
            let object = slot.as_ref().expect("an object id was allocated but never populated");
            (ObjectId::new(number as u32), object)
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A PDF name token. Validated at construction per spec §4.B: ASCII, at
/// most 127 bytes, no NUL, no whitespace, no delimiter characters — those
/// are escaped on emit instead of being rejected, so the only rejection
/// reason is length or an embedded NUL.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Name(String);

impl Name {
    pub fn new(value: impl Into<String>) -> PdfResult<Self> {
        let value = value.into();
        if value.len() > 127 || value.as_bytes().contains(&0) {
            return Err(PdfError::InvalidParameter {
                op: "Name::new",
                detail: format!("{value:?} is not a valid PDF name token"),
            });
        }
        Ok(Name(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'a> From<&'a str> for Name {
    /// Infallible conversion for literal names used internally (operator
    /// tags, well-known keys). Panics match the precondition of `Name::new`.
    fn from(value: &'a str) -> Self {
        Name::new(value).expect("internal literal name must be a valid PDF name")
    }
}

/// A PDF string. `text_encoding` records how `bytes` should be widened to
/// Unicode when used as human-facing text (alternate text, field values);
/// the bytes themselves are written verbatim.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PdfString {
    pub bytes: Vec<u8>,
    pub text_encoding: Option<TextEncoding>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TextEncoding {
    PdfDocEncoding,
    Utf16Be,
}

impl PdfString {
    pub fn literal(text: impl Into<String>) -> Self {
        PdfString { bytes: text.into().into_bytes(), text_encoding: Some(TextEncoding::PdfDocEncoding) }
    }

    pub fn binary(bytes: Vec<u8>) -> Self {
        PdfString { bytes, text_encoding: None }
    }
}

/// An ordered, insertion-preserving mapping from [`Name`] to [`Object`].
/// Keys are unique: setting an existing key overwrites its value in place
/// rather than appending a duplicate entry.
#[derive(Clone, Default, Debug)]
pub struct Dict {
    entries: Vec<(Name, Object)>,
}

impl Dict {
    pub fn new() -> Self {
        Dict::default()
    }

    pub fn set(&mut self, key: impl Into<Name>, value: impl Into<Object>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.iter().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.entries.iter_mut().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        if let Some(index) = self.entries.iter().position(|(k, _)| k.as_str() == key) {
            Some(self.entries.remove(index).1)
        } else {
            None
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Name, Object)> {
        self.entries.iter()
    }

    pub fn emit(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<<");
        for (key, value) in &self.entries {
            out.push(b' ');
            write_escaped_name(out, key.as_str());
            out.push(b' ');
            value.emit(out);
        }
        out.extend_from_slice(b" >>");
    }
}

impl<K: Into<Name>, V: Into<Object>> FromIterator<(K, V)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.set(k, v);
        }
        dict
    }
}

/// A stream object: a dictionary plus a byte payload. `/Length` is always
/// computed from the materialized payload at emit time (§4.B), so callers
/// never set it themselves.
#[derive(Clone, Debug)]
pub struct Stream {
    pub dict: Dict,
    pub data: Vec<u8>,
}

impl Stream {
    pub fn new(dict: Dict, data: Vec<u8>) -> Self {
        Stream { dict, data }
    }

    pub fn emit(&self, out: &mut Vec<u8>) {
        let mut dict = self.dict.clone();
        dict.set("Length", self.data.len() as i64);
        dict.emit(out);
        out.extend_from_slice(b"\nstream\n");
        out.extend_from_slice(&self.data);
        out.extend_from_slice(b"\nendstream");
    }
}

/// A tagged PDF value. See spec §3 "Object (B)".
#[derive(Clone, Debug)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f32),
    Name(Name),
    String(PdfString),
    Array(Vec<Object>),
    Dict(Dict),
    Stream(Stream),
    /// An indirect reference to an object written elsewhere in the file.
    Reference(ObjectId),
}

impl Object {
    pub fn emit(&self, out: &mut Vec<u8>) {
        match self {
            Object::Null => out.extend_from_slice(b"null"),
            Object::Boolean(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
            Object::Integer(n) => out.extend_from_slice(format_int(*n).as_bytes()),
            Object::Real(r) => out.extend_from_slice(format_real_default(*r).as_bytes()),
            Object::Name(n) => write_escaped_name(out, n.as_str()),
            Object::String(s) => match s.text_encoding {
                None => super::format::write_hex_string(out, &s.bytes),
                Some(_) => write_escaped_string(out, &s.bytes),
            },
            Object::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }
                    item.emit(out);
                }
                out.push(b']');
            }
            Object::Dict(dict) => dict.emit(out),
            Object::Stream(stream) => stream.emit(out),
            Object::Reference(id) => id.emit(out),
        }
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}
impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}
impl From<i32> for Object {
    fn from(value: i32) -> Self {
        Object::Integer(value as i64)
    }
}
impl From<u32> for Object {
    fn from(value: u32) -> Self {
        Object::Integer(value as i64)
    }
}
impl From<usize> for Object {
    fn from(value: usize) -> Self {
        Object::Integer(value as i64)
    }
}
impl From<f32> for Object {
    fn from(value: f32) -> Self {
        Object::Real(value)
    }
}
impl From<Name> for Object {
    fn from(value: Name) -> Self {
        Object::Name(value)
    }
}
impl<'a> From<&'a str> for Object {
    fn from(value: &'a str) -> Self {
        Object::Name(Name::from(value))
    }
}
impl From<PdfString> for Object {
    fn from(value: PdfString) -> Self {
        Object::String(value)
    }
}
impl From<Dict> for Object {
    fn from(value: Dict) -> Self {
        Object::Dict(value)
    }
}
impl From<Stream> for Object {
    fn from(value: Stream) -> Self {
        Object::Stream(value)
    }
}
impl From<ObjectId> for Object {
    fn from(value: ObjectId) -> Self {
        Object::Reference(value)
    }
}
impl From<Vec<Object>> for Object {
    fn from(value: Vec<Object>) -> Self {
        Object::Array(value)
    }
}

/// Build a [`Dict`] with literal-name keys, in the spirit of the teacher's
/// `dictionary!` macro.
#[macro_export]
macro_rules! dict {
    ( $( $key:expr => $value:expr ),* $(,)? ) => {{
        let mut dict = $crate::pdf::object::Dict::new();
        $( dict.set($key, $value); )*
        dict
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_preserves_insertion_order_and_overwrites() {
        let mut dict = Dict::new();
        dict.set("Type", "Page");
        dict.set("Count", 3i64);
        dict.set("Type", "Pages");
        let keys: Vec<&str> = dict.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["Type", "Count"]);
        assert!(matches!(dict.get("Type"), Some(Object::Name(n)) if n.as_str() == "Pages"));
    }

    #[test]
    fn stream_computes_length_at_emit() {
        let stream = Stream::new(Dict::new(), b"BT ET".to_vec());
        let mut out = Vec::new();
        stream.emit(&mut out);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("/Length 5"));
        assert!(text.ends_with("endstream"));
    }

    #[test]
    fn reference_emits_n_g_r() {
        let mut out = Vec::new();
        ObjectId::new(7).emit(&mut out);
        assert_eq!(out, b"7 0 R");
    }

    #[test]
    fn name_rejects_overlong() {
        assert!(Name::new("x".repeat(128)).is_err());
        assert!(Name::new("Ok").is_ok());
    }
}
