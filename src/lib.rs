//! sbeview: schema-driven, zero-copy views over SBE-style binary messages
//!
//! Messages are laid out as a fixed-size block of scalar fields at known
//! offsets, followed by repeating groups and variable-length data in wire
//! order. This crate reads and writes such messages in place, inside a buffer
//! the caller owns, guided by `const` descriptor tables that a code generator
//! would emit from the schema.
//!
//! # Wire Format
//!
//! ```text
//! +-----------------------------------------------------------------+
//! | MessageHeader: blockLength u16 | templateId u16 | schemaId u16 | version u16 |
//! +-----------------------------------------------------------------+
//! | Fixed block (blockLength bytes, fields at declared offsets)     |
//! +-----------------------------------------------------------------+
//! | Group: dimension (blockLength, numInGroup), then elements       |
//! |   element: fixed block, nested groups, nested data              |
//! +-----------------------------------------------------------------+
//! | Data: length prefix, then payload                               |
//! +-----------------------------------------------------------------+
//! ```
//!
//! All integers are little-endian. Fixed fields are addressed directly;
//! groups and data are reached through a single running position that moves
//! forward as they are visited.
//!
//! # Features
//!
//! - Zero-copy reads: text, arrays and data borrow from the buffer
//! - Allocation-free encoding into caller-provided buffers
//! - Optional and constant presence, with per-type null sentinels
//! - Version tolerance: fields newer than the acting version read as absent,
//!   longer blocks from newer encoders are skipped by their declared length
//! - Introspection by index or name for generic printers and bridges
//! - `no_std` support with `alloc`
//!
//! # Example
//!
//! ```rust
//! use sbeview::messages::{IncrementalRefreshEmptyBook, MatchEventIndicator};
//!
//! let mut buf = [0u8; 64];
//! let len = {
//!     let mut msg = IncrementalRefreshEmptyBook::encode(&mut buf[..], 0, 64)?;
//!     msg.set_security_id(991)?
//!         .set_match_event_indicator(
//!             MatchEventIndicator::new()
//!                 .with_last_trade_msg(true)
//!                 .with_last_quote_msg(true),
//!         )?;
//!     sbeview::MessageHeader::SIZE + msg.encoded_length()
//! };
//!
//! let mut msg = IncrementalRefreshEmptyBook::decode(&buf[..], 0, len)?;
//! assert_eq!(msg.security_id()?, 991);
//! assert!(msg.match_event_indicator()?.last_quote_msg());
//! # Ok::<(), sbeview::Error>(())
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(any(feature = "std", test))]
extern crate std;

extern crate alloc;

pub mod bitset;
pub mod composite;
pub mod cursor;
pub mod data;
pub mod enums;
pub mod error;
pub mod field;
pub mod group;
pub mod header;
pub mod message;
pub mod messages;
pub mod primitive;
pub mod schema;
pub mod types;

// Re-export main types
pub use bitset::{BitSet, ChoiceSet, SetField};
pub use composite::Composite;
pub use cursor::Cursor;
pub use data::Data;
pub use enums::{EnumField, SbeEnum};
pub use error::{Error, Result};
pub use field::{Accessor, Block, Entry};
pub use group::Group;
pub use header::{MessageHeader, MESSAGE_HEADER};
pub use message::Message;
pub use primitive::{Primitive, PrimitiveType, Scalar};
pub use schema::{
    Choice, CompositeDescriptor, Constant, DataDescriptor, EnumDescriptor, FieldDescriptor,
    FieldKind, GroupDescriptor, MessageDescriptor, Presence, SchemaDescriptor, SetDescriptor,
    TypeDescriptor, ValidValue,
};
pub use types::{Array, ArrayField, ArrayView, ScalarField, TextField, TypeField, Value};
