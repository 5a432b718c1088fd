//! Variable-length data fields
//!
//! Data sits at the running position as a length prefix followed by that many
//! elements. Reading or writing the payload moves the position past it.

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::primitive::{Primitive, Scalar};
use crate::schema::{DataDescriptor, FieldDescriptor};
use crate::types::{Array, ArrayView};

/// View of a variable-length data field at the running position
#[derive(Debug)]
pub struct Data<'a, B> {
    cursor: &'a mut Cursor<B>,
    field: &'static FieldDescriptor,
    desc: &'static DataDescriptor,
    visible: bool,
}

impl<'a, B> Data<'a, B> {
    pub(crate) fn new(
        cursor: &'a mut Cursor<B>,
        field: &'static FieldDescriptor,
        desc: &'static DataDescriptor,
        visible: bool,
    ) -> Self {
        Self {
            cursor,
            field,
            desc,
            visible,
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

    /// Data type descriptor
    #[inline]
    pub fn data_descriptor(&self) -> &'static DataDescriptor {
        self.desc
    }

    /// Whether the field exists in the acting version
    #[inline]
    pub fn in_acting_version(&self) -> bool {
        self.visible
    }

    fn check_element<P: Primitive>(&self) -> Result<()> {
        if self.desc.var_data_member.primitive.size() != P::SIZE {
            return Err(Error::KindMismatch {
                field: self.field.name,
            });
        }
        Ok(())
    }
}

impl<'a, B: AsRef<[u8]>> Data<'a, B> {
    /// Payload length in elements, without moving the position
    pub fn length(&self) -> Result<usize> {
        if !self.visible {
            return Ok(0);
        }
        let prefix = self.desc.length_member;
        let position = self.cursor.position();
        self.cursor
            .get_scalar(position + prefix.offset, prefix.primitive)
            .map(|length| length.as_u64() as usize)
    }

    /// Byte range of the payload, checked against the limit
    fn payload(&self) -> Result<(usize, usize)> {
        let length = self.length()?;
        let start = self.cursor.position() + self.desc.header_length();
        let size = length
            .checked_mul(self.desc.var_data_member.primitive.size())
            .ok_or(Error::BufferTooShort {
                required: usize::MAX,
                limit: self.cursor.limit(),
            })?;
        self.cursor.check(start, size)?;
        Ok((start, size))
    }

    /// Borrow the payload bytes and move past them
    pub fn value(self) -> Result<&'a [u8]> {
        if !self.visible {
            return Ok(&[]);
        }
        let (start, size) = self.payload()?;
        let header = self.desc.header_length();
        self.cursor.advance(header + size)?;
        let cursor: &'a Cursor<B> = self.cursor;
        cursor.bytes(start, size)
    }

    /// Borrow the payload as elements of the `varData` type and move past it
    pub fn value_array(self) -> Result<ArrayView<'a>> {
        let primitive = self.desc.var_data_member.primitive;
        self.value().map(|bytes| ArrayView::new(bytes, primitive))
    }

    /// Borrow the payload as `P` elements and move past it
    ///
    /// Fails with [`Error::KindMismatch`] when `P` is not as wide as the
    /// `varData` type.
    pub fn values<P: Primitive>(self) -> Result<Array<'a, P>> {
        self.check_element::<P>()?;
        self.value().map(Array::new)
    }

    /// Borrow the payload as UTF-8 and move past it
    pub fn value_str(self) -> Result<&'a str> {
        let field = self.field.name;
        let bytes = self.value()?;
        core::str::from_utf8(bytes).map_err(|_| Error::InvalidText { field })
    }

    /// Move past the payload, returning its length in elements
    pub fn skip(self) -> Result<usize> {
        if !self.visible {
            return Ok(0);
        }
        let length = self.length()?;
        let (_, size) = self.payload()?;
        self.cursor.advance(self.desc.header_length() + size)?;
        Ok(length)
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> Data<'a, B> {
    /// Write the length prefix for `length` elements spanning `size` bytes,
    /// returning where the payload starts
    fn write_prefix(&mut self, length: usize, size: usize) -> Result<usize> {
        if !self.visible {
            return Err(Error::FieldNotInVersion {
                field: self.field.name,
                acting_version: self.cursor.acting_version(),
            });
        }

        let prefix = self.desc.length_member;
        if length as u64 > prefix.primitive.raw_max() {
            tracing::debug!(field = self.field.name, length, "data length overflow");
            return Err(Error::LengthOverflow {
                field: self.field.name,
                length,
            });
        }

        let position = self.cursor.position();
        let header = self.desc.header_length();
        self.cursor.check(position, header.saturating_add(size))?;
        self.cursor
            .put_scalar(position + prefix.offset, prefix.primitive, Scalar::UInt(length as u64))?;
        Ok(position + header)
    }

    /// Write the length prefix and `payload`, moving past them
    ///
    /// Fails with [`Error::LengthOverflow`] when the payload length does not fit
    /// the prefix. Nothing is written when the payload would cross the limit.
    pub fn set_value(mut self, payload: &[u8]) -> Result<()> {
        let element_size = self.desc.var_data_member.primitive.size();
        if payload.len() % element_size != 0 {
            return Err(Error::LengthMismatch {
                field: self.field.name,
                expected: payload.len() - payload.len() % element_size,
                actual: payload.len(),
            });
        }

        let start = self.write_prefix(payload.len() / element_size, payload.len())?;
        self.cursor
            .bytes_mut(start, payload.len())?
            .copy_from_slice(payload);
        self.cursor.advance(self.desc.header_length() + payload.len())?;
        Ok(())
    }

    /// Write the length prefix and `values` as `varData` elements, moving
    /// past them
    pub fn set_values<P: Primitive>(mut self, values: &[P]) -> Result<()> {
        self.check_element::<P>()?;
        let size = values.len().saturating_mul(P::SIZE);
        let start = self.write_prefix(values.len(), size)?;
        for (i, value) in values.iter().enumerate() {
            self.cursor.put(start + i * P::SIZE, *value)?;
        }
        self.cursor.advance(self.desc.header_length() + size)?;
        Ok(())
    }

    /// Write the payload of a string
    #[inline]
    pub fn set_str(self, text: &str) -> Result<()> {
        self.set_value(text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveType;
    use crate::schema::{CompositeDescriptor, FieldKind, TypeDescriptor};

    const UINT8: TypeDescriptor = TypeDescriptor::new("uint8", PrimitiveType::UInt8, 1);
    const UINT16: TypeDescriptor = TypeDescriptor::new("uint16", PrimitiveType::UInt16, 1);
    const VAR_CHAR: TypeDescriptor = TypeDescriptor::new("varData", PrimitiveType::Char, 0);

    const VAR_STRING8_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("length", 0, 0, FieldKind::Type(&UINT8)),
        FieldDescriptor::new("varData", 0, 1, FieldKind::Type(&VAR_CHAR)),
    ];
    const VAR_STRING8: CompositeDescriptor = CompositeDescriptor::new("varString8", VAR_STRING8_FIELDS);
    const VAR_STRING16_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("length", 0, 0, FieldKind::Type(&UINT16)),
        FieldDescriptor::new("varData", 0, 2, FieldKind::Type(&VAR_CHAR)),
    ];
    const VAR_STRING16: CompositeDescriptor =
        CompositeDescriptor::new("varString16", VAR_STRING16_FIELDS);

    const VAR_UINT16: TypeDescriptor = TypeDescriptor::new("varData", PrimitiveType::UInt16, 0);
    const VAR_WORDS_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("length", 0, 0, FieldKind::Type(&UINT16)),
        FieldDescriptor::new("varData", 0, 2, FieldKind::Type(&VAR_UINT16)),
    ];
    const VAR_WORDS: CompositeDescriptor = CompositeDescriptor::new("varWords", VAR_WORDS_FIELDS);

    const TEXT: DataDescriptor = DataDescriptor::new("Text", &VAR_STRING8);
    const MEMO: DataDescriptor = DataDescriptor::new("Memo", &VAR_STRING16);
    const TEXT_FIELD: FieldDescriptor = FieldDescriptor::new("text", 58, 0, FieldKind::Data(&TEXT));
    const MEMO_FIELD: FieldDescriptor = FieldDescriptor::new("memo", 5149, 0, FieldKind::Data(&MEMO));
    const TICKS: DataDescriptor = DataDescriptor::new("Ticks", &VAR_WORDS);
    const TICKS_FIELD: FieldDescriptor = FieldDescriptor::new("ticks", 901, 0, FieldKind::Data(&TICKS));

    #[test]
    fn test_prefix_width_from_descriptor() {
        assert_eq!(TEXT.header_length(), 1);
        assert_eq!(MEMO.header_length(), 2);
        assert_eq!(VAR_STRING16.encoded_length, 2);
    }

    #[test]
    fn test_data_write_read() {
        let mut buf = [0u8; 32];
        let mut cursor = Cursor::new(&mut buf[..], 32, 0, 0).unwrap();

        Data::new(&mut cursor, &TEXT_FIELD, &TEXT, true).set_str("hello").unwrap();
        Data::new(&mut cursor, &MEMO_FIELD, &MEMO, true).set_value(b"abc").unwrap();
        let end = cursor.position();
        assert_eq!(end, 1 + 5 + 2 + 3);
        assert_eq!(&buf[..end], b"\x05hello\x03\x00abc");

        let mut cursor = Cursor::new(&buf[..], end, 0, 0).unwrap();
        let text = Data::new(&mut cursor, &TEXT_FIELD, &TEXT, true);
        assert_eq!(text.length().unwrap(), 5);
        assert_eq!(text.value_str().unwrap(), "hello");
        assert_eq!(cursor.position(), 6);

        let memo = Data::new(&mut cursor, &MEMO_FIELD, &MEMO, true);
        assert_eq!(memo.skip().unwrap(), 3);
        assert_eq!(cursor.position(), end);
    }

    #[test]
    fn test_data_length_overflow() {
        let mut buf = [0u8; 300];
        let mut cursor = Cursor::new(&mut buf[..], 300, 0, 0).unwrap();
        let payload = [b'x'; 256];

        assert_eq!(
            Data::new(&mut cursor, &TEXT_FIELD, &TEXT, true).set_value(&payload),
            Err(Error::LengthOverflow {
                field: "text",
                length: 256
            })
        );
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_data_crossing_limit() {
        let mut buf = [0u8; 8];
        let mut cursor = Cursor::new(&mut buf[..], 8, 0, 0).unwrap();

        assert!(Data::new(&mut cursor, &TEXT_FIELD, &TEXT, true)
            .set_str("too long")
            .is_err());
        assert_eq!(cursor.position(), 0);
        drop(cursor);
        assert_eq!(buf, [0u8; 8]);

        // Declared length runs past the end
        let buf = [9u8, b'a', b'b'];
        let mut cursor = Cursor::new(&buf[..], 3, 0, 0).unwrap();
        let text = Data::new(&mut cursor, &TEXT_FIELD, &TEXT, true);
        assert_eq!(
            text.value().unwrap_err(),
            Error::BufferTooShort {
                required: 10,
                limit: 3
            }
        );
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_data_outside_version() {
        let buf = [3u8, b'a', b'b', b'c'];
        let mut cursor = Cursor::new(&buf[..], 4, 0, 0).unwrap();

        let text = Data::new(&mut cursor, &TEXT_FIELD, &TEXT, false);
        assert_eq!(text.length().unwrap(), 0);
        assert_eq!(text.value().unwrap(), b"");
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_wide_elements() {
        let mut buf = [0u8; 16];
        let mut cursor = Cursor::new(&mut buf[..], 16, 0, 0).unwrap();
        Data::new(&mut cursor, &TICKS_FIELD, &TICKS, true)
            .set_values::<u16>(&[1, 300, 65535])
            .unwrap();
        assert_eq!(
            Data::new(&mut cursor, &TICKS_FIELD, &TICKS, true).set_values::<u8>(&[1]),
            Err(Error::KindMismatch { field: "ticks" })
        );
        assert_eq!(
            Data::new(&mut cursor, &TICKS_FIELD, &TICKS, true).set_value(b"odd"),
            Err(Error::LengthMismatch {
                field: "ticks",
                expected: 2,
                actual: 3
            })
        );
        let end = cursor.position();
        assert_eq!(end, 2 + 3 * 2);
        assert_eq!(&buf[..end], &[3, 0, 1, 0, 44, 1, 255, 255]);

        let mut cursor = Cursor::new(&buf[..], end, 0, 0).unwrap();
        let ticks = Data::new(&mut cursor, &TICKS_FIELD, &TICKS, true);
        assert_eq!(ticks.length().unwrap(), 3);
        let view = ticks.value_array().unwrap();
        assert_eq!(view.primitive(), PrimitiveType::UInt16);
        assert_eq!(view.len(), 3);
        assert_eq!(view.get(1), Some(Scalar::UInt(300)));
        assert_eq!(cursor.position(), end);

        let mut cursor = Cursor::new(&buf[..], end, 0, 0).unwrap();
        assert_eq!(
            Data::new(&mut cursor, &TICKS_FIELD, &TICKS, true)
                .values::<u8>()
                .unwrap_err(),
            Error::KindMismatch { field: "ticks" }
        );
        let values: std::vec::Vec<u16> = Data::new(&mut cursor, &TICKS_FIELD, &TICKS, true)
            .values::<u16>()
            .unwrap()
            .iter()
            .collect();
        assert_eq!(values, std::vec![1, 300, 65535]);
        assert_eq!(cursor.position(), end);
    }

    #[test]
    fn test_text_as_array_view() {
        let buf = [2u8, b'o', b'k'];
        let mut cursor = Cursor::new(&buf[..], 3, 0, 0).unwrap();
        let view = Data::new(&mut cursor, &TEXT_FIELD, &TEXT, true)
            .value_array()
            .unwrap();
        assert_eq!(view.primitive(), PrimitiveType::Char);
        assert_eq!(view.as_bytes(), b"ok");
    }
}
