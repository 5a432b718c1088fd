//! Field access façade
//!
//! An [`Accessor`] binds one [`FieldDescriptor`] to the cursor at an absolute
//! offset. From there it either converts into a typed view chosen by generated
//! code (`into_scalar`, `into_enum`, `into_group`, ...) or dispatches on the
//! descriptor's kind into an [`Entry`] for introspection.
//!
//! A [`Block`] is the fixed-size part of a message body, a group element or a
//! composite: a base offset plus a field table.

use crate::bitset::{ChoiceSet, SetField};
use crate::composite::Composite;
use crate::cursor::Cursor;
use crate::data::Data;
use crate::enums::{EnumField, SbeEnum};
use crate::error::{Error, Result};
use crate::group::Group;
use crate::primitive::{Primitive, Scalar};
use crate::schema::{
    find_field, Constant, FieldDescriptor, FieldKind, Presence, TypeDescriptor,
};
use crate::types::{ArrayField, ScalarField, TextField, TypeField};

/// One field bound to a buffer position
#[derive(Debug)]
pub struct Accessor<'a, B> {
    pub(crate) cursor: &'a mut Cursor<B>,
    pub(crate) offset: usize,
    pub(crate) field: &'static FieldDescriptor,
    pub(crate) visible: bool,
}

impl<'a, B> Accessor<'a, B> {
    /// Bind `field` inside a block starting at `base`
    ///
    /// `enclosing_visible` is false when the enclosing composite does not exist
    /// in the acting version.
    pub(crate) fn new(
        cursor: &'a mut Cursor<B>,
        base: usize,
        field: &'static FieldDescriptor,
        enclosing_visible: bool,
    ) -> Self {
        let visible = enclosing_visible && field.in_version(cursor.acting_version());
        Self {
            cursor,
            offset: base + field.offset,
            field,
            visible,
        }
    }

    /// Field name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.field.name
    }

    /// Field schema id
    #[inline]
    pub fn id(&self) -> u16 {
        self.field.id
    }

    /// Field descriptor
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.field
    }

    /// Absolute offset of the field in the buffer
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether the field exists in the acting version
    #[inline]
    pub fn in_acting_version(&self) -> bool {
        self.visible
    }

    pub(crate) fn ensure_in_version(&self) -> Result<()> {
        if self.visible {
            return Ok(());
        }
        tracing::debug!(
            field = self.field.name,
            acting_version = self.cursor.acting_version(),
            "write to field outside acting version"
        );
        Err(Error::FieldNotInVersion {
            field: self.field.name,
            acting_version: self.cursor.acting_version(),
        })
    }

    #[inline]
    pub(crate) fn kind_mismatch(&self) -> Error {
        Error::KindMismatch {
            field: self.field.name,
        }
    }

    /// Schema constant, for constant presence
    pub(crate) fn constant(&self) -> Result<Option<Constant>> {
        match self.field.presence {
            Presence::Constant => self
                .field
                .constant
                .map(Some)
                .ok_or_else(|| self.kind_mismatch()),
            Presence::Required | Presence::Optional => Ok(None),
        }
    }

    pub(crate) fn type_descriptor(&self) -> Result<&'static TypeDescriptor> {
        match self.field.kind {
            FieldKind::Type(ty) => Ok(ty),
            _ => Err(self.kind_mismatch()),
        }
    }

    /// Dynamic view of a primitive-typed field
    #[inline]
    pub fn into_type(self) -> TypeField<'a, B> {
        TypeField::new(self)
    }

    /// Typed view of a scalar field
    #[inline]
    pub fn into_scalar<P: Primitive>(self) -> ScalarField<'a, B, P> {
        ScalarField::new(self)
    }

    /// View of a fixed-length character field
    #[inline]
    pub fn into_text(self) -> TextField<'a, B> {
        TextField::new(self)
    }

    /// Typed view of a fixed-length array field
    #[inline]
    pub fn into_array<P: Primitive>(self) -> ArrayField<'a, B, P> {
        ArrayField::new(self)
    }

    /// View of an enum field decoding to `E`
    #[inline]
    pub fn into_enum<E: SbeEnum>(self) -> EnumField<'a, B, E> {
        EnumField::new(self)
    }

    /// View of a set field decoding to `S`
    #[inline]
    pub fn into_set<S: ChoiceSet>(self) -> SetField<'a, B, S> {
        SetField::new(self)
    }
}

impl<'a, B: AsRef<[u8]>> Accessor<'a, B> {
    /// Whether the field carries a value
    ///
    /// False outside the acting version; for optional fields, false when the
    /// stored value equals the null sentinel.
    pub fn present(&self) -> Result<bool> {
        if !self.visible {
            return Ok(false);
        }
        present_at(&*self.cursor, self.offset, self.field)
    }

    /// View of a composite field
    pub fn into_composite(self) -> Result<Composite<'a, B>> {
        match self.field.kind {
            FieldKind::Composite(desc) => Ok(Composite::new(self, desc)),
            _ => Err(self.kind_mismatch()),
        }
    }

    /// Repeating group starting at the current position
    pub fn into_group(self) -> Result<Group<'a, B>> {
        match self.field.kind {
            FieldKind::Group(desc) => Group::wrap(self.cursor, self.field, desc, self.visible),
            _ => Err(self.kind_mismatch()),
        }
    }

    /// Variable-length data starting at the current position
    pub fn into_data(self) -> Result<Data<'a, B>> {
        match self.field.kind {
            FieldKind::Data(desc) => Ok(Data::new(self.cursor, self.field, desc, self.visible)),
            _ => Err(self.kind_mismatch()),
        }
    }

    /// Dispatch on the field kind
    pub fn entry(self) -> Result<Entry<'a, B>> {
        Ok(match self.field.kind {
            FieldKind::Type(_) => Entry::Type(self.into_type()),
            FieldKind::Enum(_) => Entry::Enum(self.into_enum()),
            FieldKind::Set(_) => Entry::Set(self.into_set()),
            FieldKind::Composite(_) => Entry::Composite(self.into_composite()?),
            FieldKind::Group(_) => Entry::Group(self.into_group()?),
            FieldKind::Data(_) => Entry::Data(self.into_data()?),
        })
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> Accessor<'a, B> {
    /// Mark an optional field absent
    ///
    /// Fails with [`Error::ResetNotAllowed`] for required and constant fields.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_in_version()?;
        reset_at(&mut *self.cursor, self.offset, self.field)
    }
}

pub(crate) fn present_at<B: AsRef<[u8]>>(
    cursor: &Cursor<B>,
    offset: usize,
    field: &'static FieldDescriptor,
) -> Result<bool> {
    if !field.in_version(cursor.acting_version()) {
        return Ok(false);
    }
    if field.presence != Presence::Optional {
        return Ok(true);
    }

    match field.kind {
        FieldKind::Type(ty) => {
            let value = cursor.get_scalar(offset, ty.primitive)?;
            Ok(!ty.primitive.is_null(value, ty.null()))
        }
        FieldKind::Enum(desc) => {
            let raw = cursor.get_scalar(offset, desc.encoding)?.as_u64();
            Ok(raw != desc.null_value)
        }
        FieldKind::Composite(desc) => match desc.fields.first() {
            Some(first) => present_at(cursor, offset + first.offset, first),
            None => Ok(true),
        },
        FieldKind::Set(_) | FieldKind::Group(_) | FieldKind::Data(_) => Ok(true),
    }
}

pub(crate) fn reset_at<B: AsRef<[u8]> + AsMut<[u8]>>(
    cursor: &mut Cursor<B>,
    offset: usize,
    field: &'static FieldDescriptor,
) -> Result<()> {
    if !field.in_version(cursor.acting_version()) {
        return Err(Error::FieldNotInVersion {
            field: field.name,
            acting_version: cursor.acting_version(),
        });
    }
    if field.presence != Presence::Optional {
        tracing::debug!(field = field.name, presence = ?field.presence, "reset rejected");
        return Err(Error::ResetNotAllowed { field: field.name });
    }

    match field.kind {
        FieldKind::Type(ty) => {
            let null = ty.null();
            let dst = cursor.bytes_mut(offset, ty.encoded_length())?;
            for element in dst.chunks_exact_mut(ty.primitive.size()) {
                ty.primitive.write(element, null);
            }
            Ok(())
        }
        FieldKind::Enum(desc) => {
            cursor.put_scalar(offset, desc.encoding, Scalar::UInt(desc.null_value))
        }
        FieldKind::Set(desc) => cursor.put_scalar(offset, desc.encoding, Scalar::UInt(0)),
        FieldKind::Composite(desc) => match desc.fields.first() {
            Some(first) => reset_at(cursor, offset + first.offset, first),
            None => Ok(()),
        },
        FieldKind::Group(_) | FieldKind::Data(_) => {
            Err(Error::ResetNotAllowed { field: field.name })
        }
    }
}

/// Advance past every group and data field in `fields`, recursively
pub(crate) fn skip_variable<B: AsRef<[u8]>>(
    cursor: &mut Cursor<B>,
    fields: &'static [FieldDescriptor],
) -> Result<()> {
    let acting_version = cursor.acting_version();
    for field in fields {
        let visible = field.in_version(acting_version);
        match field.kind {
            FieldKind::Group(desc) => Group::wrap(&mut *cursor, field, desc, visible)?.skip()?,
            FieldKind::Data(desc) => {
                Data::new(&mut *cursor, field, desc, visible).skip()?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Kind-dispatched view of one field
#[derive(Debug)]
pub enum Entry<'a, B> {
    /// Primitive scalar, array or text
    Type(TypeField<'a, B>),
    /// Enumeration, as raw value
    Enum(EnumField<'a, B>),
    /// Bit set
    Set(SetField<'a, B>),
    /// Composite record
    Composite(Composite<'a, B>),
    /// Repeating group
    Group(Group<'a, B>),
    /// Variable-length data
    Data(Data<'a, B>),
}

impl<B> Entry<'_, B> {
    /// Field descriptor
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        match self {
            Entry::Type(f) => f.descriptor(),
            Entry::Enum(f) => f.descriptor(),
            Entry::Set(f) => f.descriptor(),
            Entry::Composite(f) => f.descriptor(),
            Entry::Group(f) => f.descriptor(),
            Entry::Data(f) => f.descriptor(),
        }
    }

    /// Field name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }
}

/// Fixed-size field block: message body, group element or composite
#[derive(Debug)]
pub struct Block<'a, B> {
    pub(crate) cursor: &'a mut Cursor<B>,
    pub(crate) base: usize,
    pub(crate) fields: &'static [FieldDescriptor],
    pub(crate) visible: bool,
}

impl<'a, B> Block<'a, B> {
    pub(crate) fn new(
        cursor: &'a mut Cursor<B>,
        base: usize,
        fields: &'static [FieldDescriptor],
        visible: bool,
    ) -> Self {
        Self {
            cursor,
            base,
            fields,
            visible,
        }
    }

    /// Absolute offset of the block
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    /// Number of fields
    #[inline]
    pub fn fields_count(&self) -> usize {
        self.fields.len()
    }

    /// Field table in wire order
    #[inline]
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    /// Bind `field` to this block
    #[inline]
    pub fn accessor(&mut self, field: &'static FieldDescriptor) -> Accessor<'_, B> {
        Accessor::new(&mut *self.cursor, self.base, field, self.visible)
    }

    /// Bind `field` to this block, consuming the view
    #[inline]
    pub fn into_accessor(self, field: &'static FieldDescriptor) -> Accessor<'a, B> {
        Accessor::new(self.cursor, self.base, field, self.visible)
    }

    fn descriptor_at(&self, index: usize) -> Result<&'static FieldDescriptor> {
        let fields: &'static [FieldDescriptor] = self.fields;
        fields.get(index).ok_or(Error::FieldNotFound)
    }

    fn descriptor_named(&self, name: &str) -> Result<&'static FieldDescriptor> {
        find_field(self.fields, name).ok_or(Error::FieldNotFound)
    }
}

impl<'a, B: AsRef<[u8]>> Block<'a, B> {
    /// Field at position `index`
    pub fn field(&mut self, index: usize) -> Result<Entry<'_, B>> {
        let field = self.descriptor_at(index)?;
        self.accessor(field).entry()
    }

    /// Field called `name`
    pub fn field_by_name(&mut self, name: &str) -> Result<Entry<'_, B>> {
        let field = self.descriptor_named(name)?;
        self.accessor(field).entry()
    }

    /// Field at position `index`, consuming the view
    pub fn into_field(self, index: usize) -> Result<Entry<'a, B>> {
        let field = self.descriptor_at(index)?;
        self.into_accessor(field).entry()
    }

    /// Field called `name`, consuming the view
    pub fn into_field_by_name(self, name: &str) -> Result<Entry<'a, B>> {
        let field = self.descriptor_named(name)?;
        self.into_accessor(field).entry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveType;
    use crate::schema::{CompositeDescriptor, EnumDescriptor, ValidValue};

    const UINT32: TypeDescriptor = TypeDescriptor::new("uint32", PrimitiveType::UInt32, 1);
    const INT8: TypeDescriptor = TypeDescriptor::new("int8", PrimitiveType::Int8, 1);
    const STATE_VALUES: &[ValidValue] = &[ValidValue::new("Open", 1), ValidValue::new("Closed", 2)];
    const STATE: EnumDescriptor = EnumDescriptor::new("State", PrimitiveType::UInt8, STATE_VALUES);

    const RATIO_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("numerator", 0, 0, FieldKind::Type(&INT8)).optional(),
        FieldDescriptor::new("denominator", 0, 1, FieldKind::Type(&INT8)),
    ];
    const RATIO: CompositeDescriptor = CompositeDescriptor::new("Ratio", RATIO_FIELDS);

    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("count", 1, 0, FieldKind::Type(&UINT32)),
        FieldDescriptor::new("limit", 2, 4, FieldKind::Type(&UINT32)).optional(),
        FieldDescriptor::new("state", 3, 8, FieldKind::Enum(&STATE)).optional(),
        FieldDescriptor::new("ratio", 4, 9, FieldKind::Composite(&RATIO)).optional(),
        FieldDescriptor::new("extra", 5, 11, FieldKind::Type(&UINT32))
            .optional()
            .since(3),
    ];

    #[test]
    fn test_presence_and_reset() {
        let mut buf = [0u8; 16];
        let mut cursor = Cursor::new(&mut buf[..], 16, 15, 3).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        // Zeroed buffer: 0 is not the uint32 null
        assert!(block.accessor(&FIELDS[1]).present().unwrap());
        block.accessor(&FIELDS[1]).reset().unwrap();
        assert!(!block.accessor(&FIELDS[1]).present().unwrap());

        block.accessor(&FIELDS[2]).reset().unwrap();
        assert!(!block.accessor(&FIELDS[2]).present().unwrap());

        // Composite presence follows its first member
        assert!(block.accessor(&FIELDS[3]).present().unwrap());
        block.accessor(&FIELDS[3]).reset().unwrap();
        assert!(!block.accessor(&FIELDS[3]).present().unwrap());

        assert_eq!(
            block.accessor(&FIELDS[0]).reset(),
            Err(Error::ResetNotAllowed { field: "count" })
        );
        assert!(block.accessor(&FIELDS[0]).present().unwrap());

        drop(block);
        assert_eq!(&buf[4..10], &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x80]);
    }

    #[test]
    fn test_version_gated_field() {
        let mut buf = [0u8; 16];
        let mut cursor = Cursor::new(&mut buf[..], 16, 11, 2).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        let mut extra = block.accessor(&FIELDS[4]);
        assert!(!extra.in_acting_version());
        assert!(!extra.present().unwrap());
        assert_eq!(
            extra.reset(),
            Err(Error::FieldNotInVersion {
                field: "extra",
                acting_version: 2
            })
        );
    }

    #[test]
    fn test_field_lookup_by_index_and_name() {
        let mut buf = [0u8; 16];
        let mut cursor = Cursor::new(&mut buf[..], 16, 15, 3).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        assert_eq!(block.fields_count(), 5);
        assert_eq!(block.field(2).unwrap().name(), "state");
        assert!(matches!(block.field_by_name("ratio").unwrap(), Entry::Composite(_)));
        assert_eq!(block.field(5).unwrap_err(), Error::FieldNotFound);
        assert_eq!(block.field_by_name("missing").unwrap_err(), Error::FieldNotFound);
    }

    #[test]
    fn test_kind_mismatch() {
        let mut buf = [0u8; 16];
        let mut cursor = Cursor::new(&mut buf[..], 16, 15, 3).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        assert_eq!(
            block.accessor(&FIELDS[0]).into_composite().unwrap_err(),
            Error::KindMismatch { field: "count" }
        );
    }
}
