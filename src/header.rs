//! Message header
//!
//! Every message on the wire is preceded by an 8-byte header (all fields
//! `uint16`, little-endian) telling the decoder which template follows, how
//! long its fixed block is and which schema version encoded it.
//!
//! ```text
//! +----------------+----------------+----------------+----------------+
//! | blockLength u16| templateId u16 | schemaId u16   | version u16    |
//! +----------------+----------------+----------------+----------------+
//! ```
//!
//! The same layout is published as [`MESSAGE_HEADER`] so a header can be
//! walked by member name like any other composite.

use crate::error::{Error, Result};
use crate::primitive::PrimitiveType;
use crate::schema::{
    CompositeDescriptor, FieldDescriptor, FieldKind, MessageDescriptor, TypeDescriptor,
};

const UINT16: TypeDescriptor = TypeDescriptor::new("uint16", PrimitiveType::UInt16, 1);

/// Header members in wire order
pub const MESSAGE_HEADER_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("blockLength", 0, 0, FieldKind::Type(&UINT16)),
    FieldDescriptor::new("templateId", 0, 2, FieldKind::Type(&UINT16)),
    FieldDescriptor::new("schemaId", 0, 4, FieldKind::Type(&UINT16)),
    FieldDescriptor::new("version", 0, 6, FieldKind::Type(&UINT16)),
];

/// Header composite
pub const MESSAGE_HEADER: CompositeDescriptor =
    CompositeDescriptor::new("messageHeader", MESSAGE_HEADER_FIELDS);

/// Field binding [`MESSAGE_HEADER`] at the start of a frame
pub const MESSAGE_HEADER_FIELD: FieldDescriptor =
    FieldDescriptor::new("messageHeader", 0, 0, FieldKind::Composite(&MESSAGE_HEADER));

const _: () = assert!(MESSAGE_HEADER.encoded_length == MessageHeader::SIZE);

/// Message header preceding every message body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    /// Fixed block length of the body
    pub block_length: u16,
    /// Template id of the message
    pub template_id: u16,
    /// Schema id
    pub schema_id: u16,
    /// Schema version used by the encoder
    pub version: u16,
}

impl MessageHeader {
    /// Header size in bytes (fixed)
    pub const SIZE: usize = 8;

    /// Header describing `message` at the current schema version
    #[inline]
    pub const fn for_message(message: &MessageDescriptor) -> Self {
        Self {
            block_length: message.block_length as u16,
            template_id: message.id,
            schema_id: message.schema.id,
            version: message.schema.version,
        }
    }

    /// Check that the header announces `message`
    pub fn validate_for(&self, message: &MessageDescriptor) -> Result<()> {
        if self.template_id != message.id {
            return Err(Error::TemplateMismatch {
                expected: message.id,
                actual: self.template_id,
            });
        }
        if self.schema_id != message.schema.id {
            return Err(Error::SchemaMismatch {
                expected: message.schema.id,
                actual: self.schema_id,
            });
        }
        Ok(())
    }

    /// Encode header to bytes (little-endian)
    #[inline]
    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        if buf.len() < Self::SIZE {
            return Err(Error::BufferTooShort {
                required: Self::SIZE,
                limit: buf.len(),
            });
        }

        buf[0..2].copy_from_slice(&self.block_length.to_le_bytes());
        buf[2..4].copy_from_slice(&self.template_id.to_le_bytes());
        buf[4..6].copy_from_slice(&self.schema_id.to_le_bytes());
        buf[6..8].copy_from_slice(&self.version.to_le_bytes());

        Ok(())
    }

    /// Decode header from bytes (little-endian)
    #[inline]
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            return Err(Error::BufferTooShort {
                required: Self::SIZE,
                limit: buf.len(),
            });
        }

        Ok(Self {
            block_length: u16::from_le_bytes([buf[0], buf[1]]),
            template_id: u16::from_le_bytes([buf[2], buf[3]]),
            schema_id: u16::from_le_bytes([buf[4], buf[5]]),
            version: u16::from_le_bytes([buf[6], buf[7]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDescriptor;

    const SCHEMA: SchemaDescriptor = SchemaDescriptor {
        package: "test",
        id: 2,
        version: 4,
    };
    const MESSAGE: MessageDescriptor = MessageDescriptor {
        name: "Heartbeat",
        id: 12,
        block_length: 10,
        fields: &[],
        schema: &SCHEMA,
    };

    #[test]
    fn test_header_encode_decode() {
        let header = MessageHeader::for_message(&MESSAGE);

        let mut buf = [0u8; MessageHeader::SIZE];
        header.encode(&mut buf).unwrap();
        assert_eq!(buf, [10, 0, 12, 0, 2, 0, 4, 0]);

        let decoded = MessageHeader::decode(&buf).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn test_header_short_buffer() {
        let header = MessageHeader::default();
        let mut buf = [0u8; 7];

        assert_eq!(
            header.encode(&mut buf),
            Err(Error::BufferTooShort {
                required: 8,
                limit: 7
            })
        );
        assert!(MessageHeader::decode(&buf).is_err());
    }

    #[test]
    fn test_header_composite_layout() {
        let header = MessageHeader::for_message(&MESSAGE);
        let mut buf = [0u8; MessageHeader::SIZE];
        header.encode(&mut buf).unwrap();

        let expected = [
            ("blockLength", header.block_length),
            ("templateId", header.template_id),
            ("schemaId", header.schema_id),
            ("version", header.version),
        ];
        assert_eq!(MESSAGE_HEADER.fields.len(), expected.len());
        for (field, (name, value)) in MESSAGE_HEADER.fields.iter().zip(expected) {
            assert_eq!(field.name, name);
            assert_eq!(
                u16::from_le_bytes([buf[field.offset], buf[field.offset + 1]]),
                value
            );
        }
    }

    #[test]
    fn test_header_validation() {
        let mut header = MessageHeader::for_message(&MESSAGE);
        assert!(header.validate_for(&MESSAGE).is_ok());

        header.template_id = 13;
        assert_eq!(
            header.validate_for(&MESSAGE),
            Err(Error::TemplateMismatch {
                expected: 12,
                actual: 13
            })
        );

        header.template_id = 12;
        header.schema_id = 1;
        assert_eq!(
            header.validate_for(&MESSAGE),
            Err(Error::SchemaMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}
