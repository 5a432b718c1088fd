//! Composite fields
//!
//! A composite is a fixed-size record embedded in its enclosing block. Its
//! presence and reset follow its first member.

use crate::error::{Error, Result};
use crate::field::{present_at, reset_at, Accessor, Block, Entry};
use crate::schema::{CompositeDescriptor, FieldDescriptor};

/// View of a composite field
#[derive(Debug)]
pub struct Composite<'a, B> {
    block: Block<'a, B>,
    field: &'static FieldDescriptor,
    desc: &'static CompositeDescriptor,
}

impl<'a, B> Composite<'a, B> {
    pub(crate) fn new(access: Accessor<'a, B>, desc: &'static CompositeDescriptor) -> Self {
        let Accessor {
            cursor,
            offset,
            field,
            visible,
        } = access;
        Self {
            block: Block::new(cursor, offset, desc.fields, visible),
            field,
            desc,
        }
    }

    /// Field name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.field.name
    }

    /// Field descriptor
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.field
    }

    /// Composite descriptor
    #[inline]
    pub fn composite_descriptor(&self) -> &'static CompositeDescriptor {
        self.desc
    }

    /// Bytes occupied on the wire
    #[inline]
    pub fn encoded_length(&self) -> usize {
        self.desc.encoded_length
    }

    /// Number of member fields
    #[inline]
    pub fn fields_count(&self) -> usize {
        self.block.fields_count()
    }

    /// Bind member `field`
    #[inline]
    pub fn accessor(&mut self, field: &'static FieldDescriptor) -> Accessor<'_, B> {
        self.block.accessor(field)
    }

    /// Member fields as a block
    #[inline]
    pub fn members(&mut self) -> &mut Block<'a, B> {
        &mut self.block
    }
}

impl<'a, B: AsRef<[u8]>> Composite<'a, B> {
    /// Whether the composite carries a value
    pub fn present(&self) -> Result<bool> {
        if !self.block.visible {
            return Ok(false);
        }
        present_at(&*self.block.cursor, self.block.base, self.field)
    }

    /// Member at position `index`
    #[inline]
    pub fn field(&mut self, index: usize) -> Result<Entry<'_, B>> {
        self.block.field(index)
    }

    /// Member called `name`
    #[inline]
    pub fn field_by_name(&mut self, name: &str) -> Result<Entry<'_, B>> {
        self.block.field_by_name(name)
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> Composite<'a, B> {
    /// Mark an optional composite absent by resetting its first member
    pub fn reset(&mut self) -> Result<()> {
        if !self.block.visible {
            return Err(Error::FieldNotInVersion {
                field: self.field.name,
                acting_version: self.block.cursor.acting_version(),
            });
        }
        reset_at(&mut *self.block.cursor, self.block.base, self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Cursor;
    use crate::primitive::{PrimitiveType, Scalar};
    use crate::schema::{Constant, FieldKind, TypeDescriptor};
    use crate::types::Value;

    const MANTISSA: TypeDescriptor = TypeDescriptor::new("mantissa", PrimitiveType::Int64, 1);
    const EXPONENT: TypeDescriptor = TypeDescriptor::new("exponent", PrimitiveType::Int8, 1);
    const PRICE_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("mantissa", 0, 0, FieldKind::Type(&MANTISSA)).optional(),
        FieldDescriptor::new("exponent", 0, 8, FieldKind::Type(&EXPONENT))
            .constant(Constant::Scalar(Scalar::Int(-4))),
    ];
    const PRICE: CompositeDescriptor = CompositeDescriptor::new("PriceOptional", PRICE_FIELDS);
    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("px", 270, 2, FieldKind::Composite(&PRICE)).optional(),
        FieldDescriptor::new("newPx", 271, 10, FieldKind::Composite(&PRICE))
            .optional()
            .since(5),
    ];

    #[test]
    fn test_composite_members() {
        let mut buf = [0u8; 16];
        let mut cursor = Cursor::new(&mut buf[..], 16, 10, 1).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        let mut px = block.accessor(&FIELDS[0]).into_composite().unwrap();
        assert_eq!(px.encoded_length(), 8);
        assert_eq!(px.fields_count(), 2);

        px.accessor(&PRICE_FIELDS[0])
            .into_scalar::<i64>()
            .set_value(123_400)
            .unwrap();
        assert!(px.present().unwrap());
        assert_eq!(
            px.accessor(&PRICE_FIELDS[1]).into_scalar::<i8>().value().unwrap(),
            -4
        );
        match px.field_by_name("mantissa").unwrap() {
            Entry::Type(f) => assert_eq!(f.value().unwrap(), Value::Scalar(Scalar::Int(123_400))),
            _ => panic!("mantissa should be a primitive type"),
        }

        px.reset().unwrap();
        assert!(!px.present().unwrap());
        drop(block);
        assert_eq!(&buf[2..10], &i64::MIN.to_le_bytes());
    }

    #[test]
    fn test_composite_outside_version() {
        let mut buf = [0u8; 16];
        let mut cursor = Cursor::new(&mut buf[..], 16, 10, 1).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        let mut new_px = block.accessor(&FIELDS[1]).into_composite().unwrap();
        assert!(!new_px.present().unwrap());
        assert_eq!(
            new_px
                .accessor(&PRICE_FIELDS[0])
                .into_scalar::<i64>()
                .value()
                .unwrap(),
            i64::MIN
        );
        assert_eq!(
            new_px.reset(),
            Err(Error::FieldNotInVersion {
                field: "newPx",
                acting_version: 1
            })
        );
    }
}
