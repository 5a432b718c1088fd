//! Message wrapping and traversal
//!
//! A [`Message`] owns the cursor for one message in a caller-provided buffer.
//! Wrapping for encode positions the cursor after the schema's fixed block;
//! wrapping for decode positions it after the block length found on the wire,
//! which may differ from the schema's when the sender used another version.
//! Groups and data are then visited in wire order from that position.

use crate::composite::Composite;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::field::{skip_variable, Accessor, Block, Entry};
use crate::header::{MessageHeader, MESSAGE_HEADER_FIELD};
use crate::schema::{FieldDescriptor, MessageDescriptor};

/// One message bound to a buffer
#[derive(Debug)]
pub struct Message<B> {
    cursor: Cursor<B>,
    descriptor: &'static MessageDescriptor,
    offset: usize,
    header_offset: Option<usize>,
    acting_block_length: usize,
}

impl<B> Message<B> {
    /// Message name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Template id
    #[inline]
    pub fn id(&self) -> u16 {
        self.descriptor.id
    }

    /// Message descriptor
    #[inline]
    pub fn descriptor(&self) -> &'static MessageDescriptor {
        self.descriptor
    }

    /// Offset of the body in the buffer
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Fixed block length in effect
    #[inline]
    pub fn acting_block_length(&self) -> usize {
        self.acting_block_length
    }

    /// Schema version the buffer is interpreted with
    #[inline]
    pub fn acting_version(&self) -> u16 {
        self.cursor.acting_version()
    }

    /// Running position (end of the last group element or data read)
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Bytes from the body offset to the running position
    #[inline]
    pub fn encoded_length(&self) -> usize {
        self.cursor.position() - self.offset
    }

    /// Borrow the underlying buffer
    #[inline]
    pub fn buffer(&self) -> &B {
        self.cursor.buffer()
    }

    /// Give the underlying buffer back
    #[inline]
    pub fn into_inner(self) -> B {
        self.cursor.into_inner()
    }

    /// Number of fields, groups and data included
    #[inline]
    pub fn fields_count(&self) -> usize {
        self.descriptor.fields.len()
    }

    /// Fixed block of the message
    #[inline]
    pub fn body(&mut self) -> Block<'_, B> {
        Block::new(&mut self.cursor, self.offset, self.descriptor.fields, true)
    }

    /// Bind `field` to the message body
    #[inline]
    pub fn accessor(&mut self, field: &'static FieldDescriptor) -> Accessor<'_, B> {
        Accessor::new(&mut self.cursor, self.offset, field, true)
    }

    /// Restore the running position to the end of the fixed block
    ///
    /// Acting version and block length are kept, so groups and data can be
    /// read again from the first one.
    pub fn rewind(&mut self) -> &mut Self {
        // offset + acting_block_length was checked against the limit on wrap
        let _ = self.cursor.seek(self.offset + self.acting_block_length);
        tracing::trace!(message = self.descriptor.name, position = self.cursor.position(), "rewound");
        self
    }
}

impl<B: AsRef<[u8]>> Message<B> {
    /// Wrap an encoded message body at `offset`
    ///
    /// `acting_block_length` and `acting_version` come from the message header
    /// that preceded the body.
    pub fn wrap_for_decode(
        buf: B,
        offset: usize,
        length: usize,
        acting_block_length: usize,
        acting_version: u16,
        descriptor: &'static MessageDescriptor,
    ) -> Result<Self> {
        let body_end = offset
            .checked_add(acting_block_length)
            .ok_or(Error::BufferTooShort {
                required: usize::MAX,
                limit: length,
            })?;
        let cursor = Cursor::new(buf, length, body_end, acting_version)?;

        tracing::trace!(
            message = descriptor.name,
            offset,
            acting_block_length,
            acting_version,
            "wrapped for decode"
        );
        Ok(Self {
            cursor,
            descriptor,
            offset,
            header_offset: None,
            acting_block_length,
        })
    }

    /// Read the message header at `offset` and wrap the body that follows
    ///
    /// Fails with [`Error::TemplateMismatch`] or [`Error::SchemaMismatch`] when
    /// the header announces another message.
    pub fn decode_with_header(
        buf: B,
        offset: usize,
        length: usize,
        descriptor: &'static MessageDescriptor,
    ) -> Result<Self> {
        let header = {
            let probe = Cursor::new(buf.as_ref(), length, offset, 0)?;
            MessageHeader::decode(probe.bytes(offset, MessageHeader::SIZE)?)?
        };
        header.validate_for(descriptor)?;

        let mut msg = Self::wrap_for_decode(
            buf,
            offset + MessageHeader::SIZE,
            length,
            header.block_length as usize,
            header.version,
            descriptor,
        )?;
        msg.header_offset = Some(offset);
        Ok(msg)
    }

    /// Message header as a composite, with members reachable by name
    ///
    /// Fails with [`Error::FieldNotFound`] when the body was wrapped without
    /// its header.
    pub fn header(&mut self) -> Result<Composite<'_, B>> {
        let offset = self.header_offset.ok_or(Error::FieldNotFound)?;
        Accessor::new(&mut self.cursor, offset, &MESSAGE_HEADER_FIELD, true).into_composite()
    }

    /// Field at position `index`
    #[inline]
    pub fn field(&mut self, index: usize) -> Result<Entry<'_, B>> {
        self.body().into_field(index)
    }

    /// Field called `name`
    #[inline]
    pub fn field_by_name(&mut self, name: &str) -> Result<Entry<'_, B>> {
        self.body().into_field_by_name(name)
    }

    /// Step over every group and data field from the start, returning the
    /// encoded length
    pub fn skip(&mut self) -> Result<usize> {
        self.rewind();
        skip_variable(&mut self.cursor, self.descriptor.fields)?;
        Ok(self.encoded_length())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Message<B> {
    /// Wrap `buf` to encode a message body at `offset` with the current
    /// schema version
    pub fn wrap_for_encode(
        buf: B,
        offset: usize,
        length: usize,
        descriptor: &'static MessageDescriptor,
    ) -> Result<Self> {
        Self::wrap_for_decode(
            buf,
            offset,
            length,
            descriptor.block_length,
            descriptor.schema.version,
            descriptor,
        )
    }

    /// Write the message header at `offset`, then wrap the body after it
    ///
    /// Nothing is written when the header and fixed block do not both fit.
    pub fn wrap_and_apply_header(
        buf: B,
        offset: usize,
        length: usize,
        descriptor: &'static MessageDescriptor,
    ) -> Result<Self> {
        let mut cursor = Cursor::new(buf, length, offset, descriptor.schema.version)?;
        cursor.check(offset, MessageHeader::SIZE.saturating_add(descriptor.block_length))?;
        MessageHeader::for_message(descriptor).encode(cursor.bytes_mut(offset, MessageHeader::SIZE)?)?;

        let mut msg = Self::wrap_for_encode(
            cursor.into_inner(),
            offset + MessageHeader::SIZE,
            length,
            descriptor,
        )?;
        msg.header_offset = Some(offset);
        Ok(msg)
    }
}
