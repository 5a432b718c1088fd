//! Enumeration fields
//!
//! Generated enums implement [`SbeEnum`] so that decoding never fails: raw
//! values the schema does not declare map to an `Unknown` variant, the null
//! raw value to `NullVal`. The dynamic view uses the raw `u64` itself.

use core::fmt::Debug;
use core::marker::PhantomData;

use crate::error::{Error, Result};
use crate::field::Accessor;
use crate::primitive::Scalar;
use crate::schema::{Constant, EnumDescriptor, FieldDescriptor, FieldKind};

/// Rust representation of a schema enumeration
pub trait SbeEnum: Copy + PartialEq + Debug {
    /// Map a raw encoded value, including undeclared ones
    fn from_raw(raw: u64) -> Self;

    /// Raw encoded value
    fn raw(self) -> u64;
}

impl SbeEnum for u64 {
    #[inline]
    fn from_raw(raw: u64) -> Self {
        raw
    }

    #[inline]
    fn raw(self) -> u64 {
        self
    }
}

/// View of an enum field decoding to `E`
#[derive(Debug)]
pub struct EnumField<'a, B, E = u64> {
    access: Accessor<'a, B>,
    _marker: PhantomData<E>,
}

impl<'a, B, E: SbeEnum> EnumField<'a, B, E> {
    pub(crate) fn new(access: Accessor<'a, B>) -> Self {
        Self {
            access,
            _marker: PhantomData,
        }
    }

    /// Field name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.access.name()
    }

    /// Field descriptor
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.access.descriptor()
    }

    /// Enumeration descriptor
    pub fn enum_descriptor(&self) -> Result<&'static EnumDescriptor> {
        match self.access.field.kind {
            FieldKind::Enum(desc) => Ok(desc),
            _ => Err(self.access.kind_mismatch()),
        }
    }

    fn constant_raw(&self) -> Result<Option<u64>> {
        match self.access.constant()? {
            Some(Constant::Scalar(value)) => Ok(Some(value.as_u64())),
            Some(Constant::Text(text)) => match text.as_bytes() {
                [c] => Ok(Some(*c as u64)),
                _ => Err(self.access.kind_mismatch()),
            },
            None => Ok(None),
        }
    }
}

impl<'a, B: AsRef<[u8]>, E: SbeEnum> EnumField<'a, B, E> {
    /// Whether the field carries a value
    #[inline]
    pub fn present(&self) -> Result<bool> {
        self.access.present()
    }

    /// Raw encoded value; the enum null outside the acting version
    pub fn raw(&self) -> Result<u64> {
        let desc = self.enum_descriptor()?;
        if let Some(raw) = self.constant_raw()? {
            return Ok(raw);
        }
        if !self.access.in_acting_version() {
            return Ok(desc.null_value);
        }
        self.access
            .cursor
            .get_scalar(self.access.offset, desc.encoding)
            .map(Scalar::as_u64)
    }

    /// Decoded value
    #[inline]
    pub fn value(&self) -> Result<E> {
        self.raw().map(E::from_raw)
    }

    /// Symbolic name of the stored value, if declared
    pub fn value_name(&self) -> Result<Option<&'static str>> {
        let desc = self.enum_descriptor()?;
        Ok(desc.name_of(self.raw()?))
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>, E: SbeEnum> EnumField<'a, B, E> {
    /// Write the value
    #[inline]
    pub fn set_value(&mut self, value: E) -> Result<()> {
        self.set_raw(value.raw())
    }

    /// Write a raw encoded value
    pub fn set_raw(&mut self, raw: u64) -> Result<()> {
        let desc = self.enum_descriptor()?;
        if let Some(expected) = self.constant_raw()? {
            if expected == raw {
                return Ok(());
            }
            tracing::debug!(field = self.access.field.name, raw, expected, "constant value mismatch");
            return Err(Error::ConstantMismatch {
                field: self.access.field.name,
            });
        }
        self.access.ensure_in_version()?;
        self.access
            .cursor
            .put_scalar(self.access.offset, desc.encoding, Scalar::UInt(raw))
    }

    /// Write the value declared under `name`
    pub fn set_value_name(&mut self, name: &str) -> Result<()> {
        let desc = self.enum_descriptor()?;
        let raw = desc.value_of(name).ok_or(Error::UnknownEnumName {
            enumeration: desc.name,
        })?;
        self.set_raw(raw)
    }

    /// Store the enum null
    #[inline]
    pub fn reset(&mut self) -> Result<()> {
        self.access.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Cursor;
    use crate::field::Block;
    use crate::primitive::PrimitiveType;
    use crate::schema::ValidValue;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Side {
        Buy,
        Sell,
        NullVal,
        Unknown(u8),
    }

    impl SbeEnum for Side {
        fn from_raw(raw: u64) -> Self {
            match raw as u8 {
                b'1' => Side::Buy,
                b'2' => Side::Sell,
                0 => Side::NullVal,
                other => Side::Unknown(other),
            }
        }

        fn raw(self) -> u64 {
            match self {
                Side::Buy => b'1' as u64,
                Side::Sell => b'2' as u64,
                Side::NullVal => 0,
                Side::Unknown(raw) => raw as u64,
            }
        }
    }

    const SIDE_VALUES: &[ValidValue] = &[
        ValidValue::new("Buy", b'1' as u64),
        ValidValue::new("Sell", b'2' as u64),
    ];
    const SIDE: EnumDescriptor = EnumDescriptor::new("Side", PrimitiveType::Char, SIDE_VALUES);

    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("side", 54, 0, FieldKind::Enum(&SIDE)).optional(),
        FieldDescriptor::new("aggressor", 1057, 1, FieldKind::Enum(&SIDE))
            .constant(Constant::Scalar(Scalar::UInt(b'1' as u64))),
        FieldDescriptor::new("lastSide", 2446, 1, FieldKind::Enum(&SIDE)).since(4),
    ];

    #[test]
    fn test_enum_round_trip() {
        let mut buf = [0u8; 4];
        let mut cursor = Cursor::new(&mut buf[..], 4, 2, 4).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        let mut side = block.accessor(&FIELDS[0]).into_enum::<Side>();
        assert_eq!(side.value().unwrap(), Side::NullVal);
        assert!(!side.present().unwrap());

        side.set_value(Side::Sell).unwrap();
        assert_eq!(side.value().unwrap(), Side::Sell);
        assert_eq!(side.value_name().unwrap(), Some("Sell"));

        side.set_value_name("Buy").unwrap();
        assert_eq!(side.raw().unwrap(), b'1' as u64);
        assert_eq!(
            side.set_value_name("Cross"),
            Err(Error::UnknownEnumName { enumeration: "Side" })
        );

        side.reset().unwrap();
        assert!(!side.present().unwrap());
    }

    #[test]
    fn test_undeclared_raw_value() {
        let mut buf = [b'7', 0, 0, 0];
        let mut cursor = Cursor::new(&mut buf[..], 4, 2, 4).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        let side = block.accessor(&FIELDS[0]).into_enum::<Side>();
        assert_eq!(side.value().unwrap(), Side::Unknown(b'7'));
        assert_eq!(side.value_name().unwrap(), None);
        assert!(side.present().unwrap());
    }

    #[test]
    fn test_constant_enum() {
        let mut buf = [0u8; 4];
        let mut cursor = Cursor::new(&mut buf[..], 4, 2, 4).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        let mut aggressor = block.accessor(&FIELDS[1]).into_enum::<Side>();
        assert_eq!(aggressor.value().unwrap(), Side::Buy);
        assert!(aggressor.set_value(Side::Buy).is_ok());
        assert_eq!(
            aggressor.set_value(Side::Sell),
            Err(Error::ConstantMismatch { field: "aggressor" })
        );
    }

    #[test]
    fn test_enum_outside_version() {
        let mut buf = [0u8; 4];
        let mut cursor = Cursor::new(&mut buf[..], 4, 1, 3).unwrap();
        let mut block = Block::new(&mut cursor, 0, FIELDS, true);

        let mut last = block.accessor(&FIELDS[2]).into_enum::<Side>();
        assert_eq!(last.value().unwrap(), Side::NullVal);
        assert!(!last.present().unwrap());
        assert!(last.set_value(Side::Buy).is_err());
    }
}
