//! Repeating groups
//!
//! A group starts at the running position with a dimension header carrying
//! the element block length and the element count, followed by the elements
//! back to back. Each element is a fixed block, then its own nested groups and
//! data in wire order.
//!
//! Wrapping a group reads the header and moves the position past it. Each
//! [`Group::next`] moves the position past one element block, using the block
//! length found in the header so that elements written by a newer schema
//! version are skipped correctly.

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::field::{skip_variable, Accessor, Block, Entry};
use crate::primitive::Scalar;
use crate::schema::{FieldDescriptor, GroupDescriptor};

/// Cursor over the elements of a repeating group
#[derive(Debug)]
pub struct Group<'a, B> {
    cursor: &'a mut Cursor<B>,
    field: &'static FieldDescriptor,
    desc: &'static GroupDescriptor,
    header_offset: usize,
    block_length: usize,
    count: usize,
    index: usize,
    element: Option<usize>,
    visible: bool,
}

impl<'a, B> Group<'a, B> {
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

    /// Group descriptor
    #[inline]
    pub fn group_descriptor(&self) -> &'static GroupDescriptor {
        self.desc
    }

    /// Whether the group exists in the acting version
    #[inline]
    pub fn in_acting_version(&self) -> bool {
        self.visible
    }

    /// Element count from the dimension header
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Element block length from the dimension header
    #[inline]
    pub fn acting_block_length(&self) -> usize {
        self.block_length
    }

    /// Number of elements visited so far
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Elements not yet visited
    #[inline]
    pub fn remaining(&self) -> usize {
        self.count - self.index
    }

    /// Whether another element follows
    #[inline]
    pub fn has_next(&self) -> bool {
        self.index < self.count
    }

    /// Number of element fields
    #[inline]
    pub fn fields_count(&self) -> usize {
        self.desc.fields.len()
    }

    fn current(&self) -> Result<usize> {
        self.element.ok_or(Error::NoCurrentElement {
            group: self.field.name,
        })
    }

    /// Fixed block of the current element
    pub fn element(&mut self) -> Result<Block<'_, B>> {
        let base = self.current()?;
        Ok(Block::new(&mut *self.cursor, base, self.desc.fields, true))
    }

    /// Bind element `field` of the current element
    pub fn accessor(&mut self, field: &'static FieldDescriptor) -> Result<Accessor<'_, B>> {
        let base = self.current()?;
        Ok(Accessor::new(&mut *self.cursor, base, field, true))
    }

    /// Move to the next element
    ///
    /// Fails with [`Error::GroupCountExceeded`] once all `count` elements have
    /// been visited, and with [`Error::BufferTooShort`] when the element block
    /// crosses the buffer limit.
    pub fn next(&mut self) -> Result<&mut Self> {
        if self.index >= self.count {
            tracing::debug!(group = self.field.name, count = self.count, "group count exceeded");
            return Err(Error::GroupCountExceeded {
                group: self.field.name,
                count: self.count,
            });
        }
        let start = self.cursor.advance(self.block_length)?;
        self.element = Some(start);
        self.index += 1;
        Ok(self)
    }
}

impl<'a, B: AsRef<[u8]>> Group<'a, B> {
    /// Read the dimension header at the running position and step past it
    ///
    /// A group outside the acting version reads as empty and consumes nothing.
    pub(crate) fn wrap(
        cursor: &'a mut Cursor<B>,
        field: &'static FieldDescriptor,
        desc: &'static GroupDescriptor,
        visible: bool,
    ) -> Result<Self> {
        let header_offset = cursor.position();
        if !visible {
            return Ok(Self {
                cursor,
                field,
                desc,
                header_offset,
                block_length: desc.block_length,
                count: 0,
                index: 0,
                element: None,
                visible,
            });
        }

        cursor.check(header_offset, desc.dimension.encoded_length)?;
        let block_length = cursor
            .get_scalar(
                header_offset + desc.block_length_member.offset,
                desc.block_length_member.primitive,
            )?
            .as_u64() as usize;
        let count = cursor
            .get_scalar(
                header_offset + desc.num_in_group_member.offset,
                desc.num_in_group_member.primitive,
            )?
            .as_u64() as usize;
        cursor.advance(desc.dimension.encoded_length)?;

        tracing::trace!(group = field.name, block_length, count, "wrapped group");
        Ok(Self {
            cursor,
            field,
            desc,
            header_offset,
            block_length,
            count,
            index: 0,
            element: None,
            visible,
        })
    }

    /// Field of the current element at position `index`
    pub fn field(&mut self, index: usize) -> Result<Entry<'_, B>> {
        self.element()?.into_field(index)
    }

    /// Field of the current element called `name`
    pub fn field_by_name(&mut self, name: &str) -> Result<Entry<'_, B>> {
        self.element()?.into_field_by_name(name)
    }

    /// Step over the remaining elements and everything nested in them
    pub fn skip(&mut self) -> Result<()> {
        while self.has_next() {
            self.next()?;
            skip_variable(&mut *self.cursor, self.desc.fields)?;
        }
        Ok(())
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> Group<'a, B> {
    /// Write the dimension header for `count` elements before encoding them
    ///
    /// The element block length written is the schema's. Fails with
    /// [`Error::CountOverflow`] when `count` does not fit `numInGroup`.
    pub fn reset_count(&mut self, count: usize) -> Result<&mut Self> {
        if !self.visible {
            return Err(Error::FieldNotInVersion {
                field: self.field.name,
                acting_version: self.cursor.acting_version(),
            });
        }
        if self.index > 0 {
            return Err(Error::IterationStarted {
                group: self.field.name,
            });
        }

        let num_in_group = self.desc.num_in_group_member;
        if count as u64 > num_in_group.primitive.raw_max() {
            return Err(Error::CountOverflow {
                group: self.field.name,
                count,
            });
        }
        let block_length = self.desc.block_length_member;
        self.cursor.put_scalar(
            self.header_offset + block_length.offset,
            block_length.primitive,
            Scalar::UInt(self.desc.block_length as u64),
        )?;
        self.cursor.put_scalar(
            self.header_offset + num_in_group.offset,
            num_in_group.primitive,
            Scalar::UInt(count as u64),
        )?;

        self.block_length = self.desc.block_length;
        self.count = count;
        self.element = None;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::primitive::PrimitiveType;
    use crate::schema::{
        CompositeDescriptor, DataDescriptor, FieldKind, MessageDescriptor, SchemaDescriptor,
        TypeDescriptor,
    };
    use std::string::String;
    use std::vec::Vec;

    const UINT8: TypeDescriptor = TypeDescriptor::new("uint8", PrimitiveType::UInt8, 1);
    const UINT16: TypeDescriptor = TypeDescriptor::new("uint16", PrimitiveType::UInt16, 1);
    const UINT32: TypeDescriptor = TypeDescriptor::new("uint32", PrimitiveType::UInt32, 1);

    const DIMENSION_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("blockLength", 0, 0, FieldKind::Type(&UINT16)),
        FieldDescriptor::new("numInGroup", 0, 2, FieldKind::Type(&UINT8)),
    ];
    const DIMENSION: CompositeDescriptor =
        CompositeDescriptor::new("groupSizeEncoding", DIMENSION_FIELDS);

    const ENTRY_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("qty", 1, 0, FieldKind::Type(&UINT32)),
    ];
    const ENTRIES: GroupDescriptor = GroupDescriptor::new("entries", &DIMENSION, 4, ENTRY_FIELDS);
    const ENTRIES_FIELD: FieldDescriptor =
        FieldDescriptor::new("entries", 268, 0, FieldKind::Group(&ENTRIES));
    const LATE_FIELD: FieldDescriptor =
        FieldDescriptor::new("late", 269, 0, FieldKind::Group(&ENTRIES)).since(3);

    fn encode(buf: &mut [u8], values: &[u32]) -> usize {
        let len = buf.len();
        let mut cursor = Cursor::new(buf, len, 0, 0).unwrap();
        let mut group = Group::wrap(&mut cursor, &ENTRIES_FIELD, &ENTRIES, true).unwrap();
        group.reset_count(values.len()).unwrap();
        for &value in values {
            group.next().unwrap();
            group
                .accessor(&ENTRY_FIELDS[0])
                .unwrap()
                .into_scalar::<u32>()
                .set_value(value)
                .unwrap();
        }
        cursor.position()
    }

    #[test]
    fn test_group_encode_decode() {
        let mut buf = [0u8; 32];
        let end = encode(&mut buf, &[10, 20, 30]);
        assert_eq!(end, 3 + 3 * 4);
        assert_eq!(&buf[..3], &[4, 0, 3]);

        let mut cursor = Cursor::new(&buf[..], end, 0, 0).unwrap();
        let mut group = Group::wrap(&mut cursor, &ENTRIES_FIELD, &ENTRIES, true).unwrap();
        assert_eq!(group.count(), 3);
        assert_eq!(group.acting_block_length(), 4);

        let mut values = std::vec::Vec::new();
        while group.has_next() {
            group.next().unwrap();
            let qty = group.accessor(&ENTRY_FIELDS[0]).unwrap().into_scalar::<u32>();
            values.push(qty.value().unwrap());
        }
        assert_eq!(values, std::vec![10, 20, 30]);
        assert_eq!(group.remaining(), 0);

        assert_eq!(
            group.next().unwrap_err(),
            Error::GroupCountExceeded {
                group: "entries",
                count: 3
            }
        );
        assert_eq!(cursor.position(), end);
    }

    #[test]
    fn test_element_access_before_next() {
        let mut buf = [0u8; 32];
        let end = encode(&mut buf, &[1]);

        let mut cursor = Cursor::new(&buf[..], end, 0, 0).unwrap();
        let mut group = Group::wrap(&mut cursor, &ENTRIES_FIELD, &ENTRIES, true).unwrap();
        assert_eq!(
            group.field(0).unwrap_err(),
            Error::NoCurrentElement { group: "entries" }
        );
    }

    #[test]
    fn test_larger_block_length_is_honored() {
        // Header says 6-byte elements: 2 trailing bytes from a newer schema
        let buf = [6, 0, 2, 1, 0, 0, 0, 0xEE, 0xEE, 2, 0, 0, 0, 0xEE, 0xEE];
        let mut cursor = Cursor::new(&buf[..], buf.len(), 0, 0).unwrap();
        let mut group = Group::wrap(&mut cursor, &ENTRIES_FIELD, &ENTRIES, true).unwrap();

        group.next().unwrap();
        group.next().unwrap();
        let qty = group.accessor(&ENTRY_FIELDS[0]).unwrap().into_scalar::<u32>();
        assert_eq!(qty.value().unwrap(), 2);
        assert_eq!(cursor.position(), buf.len());
    }

    #[test]
    fn test_truncated_elements() {
        let buf = [4, 0, 2, 1, 0, 0, 0, 2, 0];
        let mut cursor = Cursor::new(&buf[..], buf.len(), 0, 0).unwrap();
        let mut group = Group::wrap(&mut cursor, &ENTRIES_FIELD, &ENTRIES, true).unwrap();

        assert!(group.next().is_ok());
        assert_eq!(
            group.next().unwrap_err(),
            Error::BufferTooShort {
                required: 11,
                limit: 9
            }
        );
        assert_eq!(group.index(), 1);
    }

    #[test]
    fn test_count_overflow_and_restart() {
        let mut buf = [0u8; 32];
        let mut cursor = Cursor::new(&mut buf[..], 32, 0, 0).unwrap();
        let mut group = Group::wrap(&mut cursor, &ENTRIES_FIELD, &ENTRIES, true).unwrap();

        assert_eq!(
            group.reset_count(256).unwrap_err(),
            Error::CountOverflow {
                group: "entries",
                count: 256
            }
        );
        group.reset_count(1).unwrap();
        group.next().unwrap();
        assert_eq!(
            group.reset_count(2).unwrap_err(),
            Error::IterationStarted { group: "entries" }
        );
    }

    #[test]
    fn test_group_outside_version() {
        let buf = [0u8; 8];
        let mut cursor = Cursor::new(&buf[..], 8, 0, 2).unwrap();
        let visible = LATE_FIELD.in_version(2);
        let mut group = Group::wrap(&mut cursor, &LATE_FIELD, &ENTRIES, visible).unwrap();

        assert!(!group.in_acting_version());
        assert_eq!(group.count(), 0);
        assert!(!group.has_next());
        group.skip().unwrap();
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_skip() {
        let mut buf = [0u8; 32];
        let end = encode(&mut buf, &[5, 6]);

        let mut cursor = Cursor::new(&buf[..], end, 0, 0).unwrap();
        Group::wrap(&mut cursor, &ENTRIES_FIELD, &ENTRIES, true)
            .unwrap()
            .skip()
            .unwrap();
        assert_eq!(cursor.position(), end);
    }

    const VAR_CHAR: TypeDescriptor = TypeDescriptor::new("varData", PrimitiveType::Char, 0);
    const VAR_STRING8_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("length", 0, 0, FieldKind::Type(&UINT8)),
        FieldDescriptor::new("varData", 0, 1, FieldKind::Type(&VAR_CHAR)),
    ];
    const VAR_STRING8: CompositeDescriptor =
        CompositeDescriptor::new("varString8", VAR_STRING8_FIELDS);
    const NOTE: DataDescriptor = DataDescriptor::new("Note", &VAR_STRING8);

    // book { depth, levels [ { level, orders [ { qty } ], note } ], trailer }
    const ORDER_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("qty", 32, 0, FieldKind::Type(&UINT8)),
    ];
    const ORDERS: GroupDescriptor = GroupDescriptor::new("orders", &DIMENSION, 1, ORDER_FIELDS);
    const LEVEL_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("level", 1023, 0, FieldKind::Type(&UINT8)),
        FieldDescriptor::new("orders", 73, 0, FieldKind::Group(&ORDERS)),
        FieldDescriptor::new("note", 58, 0, FieldKind::Data(&NOTE)),
    ];
    const LEVELS: GroupDescriptor = GroupDescriptor::new("levels", &DIMENSION, 1, LEVEL_FIELDS);
    const BOOK_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("depth", 264, 0, FieldKind::Type(&UINT8)),
        FieldDescriptor::new("levels", 268, 0, FieldKind::Group(&LEVELS)),
        FieldDescriptor::new("trailer", 354, 0, FieldKind::Data(&NOTE)),
    ];
    const SCHEMA: SchemaDescriptor = SchemaDescriptor {
        package: "test",
        id: 3,
        version: 0,
    };
    const BOOK: MessageDescriptor = MessageDescriptor {
        name: "Book",
        id: 40,
        block_length: 1,
        fields: BOOK_FIELDS,
        schema: &SCHEMA,
    };

    type Level<'a> = (u8, &'a [u8], &'a str);

    fn encode_book(buf: &mut [u8], levels: &[Level<'_>], trailer: &str) -> usize {
        let len = buf.len();
        let mut msg = Message::wrap_for_encode(buf, 0, len, &BOOK).unwrap();
        msg.accessor(&BOOK_FIELDS[0])
            .into_scalar::<u8>()
            .set_value(levels.len() as u8)
            .unwrap();
        {
            let mut outer = msg.accessor(&BOOK_FIELDS[1]).into_group().unwrap();
            outer.reset_count(levels.len()).unwrap();
            for &(level, orders, note) in levels {
                outer.next().unwrap();
                outer
                    .accessor(&LEVEL_FIELDS[0])
                    .unwrap()
                    .into_scalar::<u8>()
                    .set_value(level)
                    .unwrap();
                let mut inner = outer.accessor(&LEVEL_FIELDS[1]).unwrap().into_group().unwrap();
                inner.reset_count(orders.len()).unwrap();
                for &qty in orders {
                    inner.next().unwrap();
                    inner
                        .accessor(&ORDER_FIELDS[0])
                        .unwrap()
                        .into_scalar::<u8>()
                        .set_value(qty)
                        .unwrap();
                }
                outer
                    .accessor(&LEVEL_FIELDS[2])
                    .unwrap()
                    .into_data()
                    .unwrap()
                    .set_str(note)
                    .unwrap();
            }
        }
        msg.accessor(&BOOK_FIELDS[2])
            .into_data()
            .unwrap()
            .set_str(trailer)
            .unwrap();
        msg.encoded_length()
    }

    #[test]
    fn test_nested_groups_and_data() {
        let mut buf = [0u8; 64];
        let levels: &[Level<'_>] = &[(1, &[10, 11], "a"), (2, &[], ""), (3, &[12], "xyz")];
        let end = encode_book(&mut buf, levels, "end");
        // block + dimension + three elements + trailer
        assert_eq!(end, 1 + 3 + (1 + 3 + 2 + 1 + 1) + (1 + 3 + 1) + (1 + 3 + 1 + 1 + 3) + (1 + 3));
        assert_eq!(&buf[..8], &[3, 1, 0, 3, 1, 1, 0, 2]);

        let mut msg = Message::wrap_for_decode(&buf[..], 0, end, 1, 0, &BOOK).unwrap();
        let mut decoded: Vec<(u8, Vec<u8>, String)> = Vec::new();
        {
            let mut outer = msg.accessor(&BOOK_FIELDS[1]).into_group().unwrap();
            assert_eq!(outer.count(), 3);
            while outer.has_next() {
                outer.next().unwrap();
                let level = outer
                    .accessor(&LEVEL_FIELDS[0])
                    .unwrap()
                    .into_scalar::<u8>()
                    .value()
                    .unwrap();
                let mut orders = Vec::new();
                let mut inner = outer.accessor(&LEVEL_FIELDS[1]).unwrap().into_group().unwrap();
                while inner.has_next() {
                    inner.next().unwrap();
                    let qty = inner.accessor(&ORDER_FIELDS[0]).unwrap().into_scalar::<u8>();
                    orders.push(qty.value().unwrap());
                }
                let note = outer
                    .accessor(&LEVEL_FIELDS[2])
                    .unwrap()
                    .into_data()
                    .unwrap()
                    .value_str()
                    .map(String::from)
                    .unwrap();
                decoded.push((level, orders, note));
            }
        }
        let expected: Vec<(u8, Vec<u8>, String)> = levels
            .iter()
            .map(|&(level, orders, note)| (level, orders.to_vec(), String::from(note)))
            .collect();
        assert_eq!(decoded, expected);

        let trailer = msg.accessor(&BOOK_FIELDS[2]).into_data().unwrap();
        assert_eq!(trailer.value_str().unwrap(), "end");
        assert_eq!(msg.position(), end);

        assert_eq!(msg.skip().unwrap(), end);
    }

    #[test]
    fn test_skip_nested_group_reaches_trailing_data() {
        let mut buf = [0u8; 64];
        let levels: &[Level<'_>] = &[(7, &[1, 2, 3], "deep"), (8, &[4], "")];
        let end = encode_book(&mut buf, levels, "tail");

        let mut msg = Message::wrap_for_decode(&buf[..], 0, end, 1, 0, &BOOK).unwrap();
        msg.accessor(&BOOK_FIELDS[1])
            .into_group()
            .unwrap()
            .skip()
            .unwrap();
        let trailer = msg.accessor(&BOOK_FIELDS[2]).into_data().unwrap();
        assert_eq!(trailer.value_str().unwrap(), "tail");
        assert_eq!(msg.encoded_length(), end);
    }
}
