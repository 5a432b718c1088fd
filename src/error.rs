//! Error types for the sbeview codec

/// Errors that can occur while encoding or decoding a message in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A computed position lies past the declared buffer length
    #[error("buffer too short: needed {required} bytes, limit is {limit}")]
    BufferTooShort {
        /// Position the operation needed to reach
        required: usize,
        /// Declared buffer length
        limit: usize,
    },
    /// Write to a constant field with a value other than the declared one
    #[error("constant value mismatch for field `{field}`")]
    ConstantMismatch {
        /// Field name
        field: &'static str,
    },
    /// `reset` on a required or constant field
    #[error("reset not available for field `{field}`")]
    ResetNotAllowed {
        /// Field name
        field: &'static str,
    },
    /// Name lookup did not match any field descriptor
    #[error("field not found")]
    FieldNotFound,
    /// `next` called more times than the group count allows
    #[error("group `{group}` count exceeded ({count} elements)")]
    GroupCountExceeded {
        /// Group name
        group: &'static str,
        /// Declared element count
        count: usize,
    },
    /// Element field accessed before the first `next`
    #[error("group `{group}` has no current element")]
    NoCurrentElement {
        /// Group name
        group: &'static str,
    },
    /// Count reset after element iteration has started
    #[error("group `{group}` count reset after iteration started")]
    IterationStarted {
        /// Group name
        group: &'static str,
    },
    /// Write to a field introduced after the acting version
    #[error("field `{field}` not present in acting version {acting_version}")]
    FieldNotInVersion {
        /// Field name
        field: &'static str,
        /// Acting schema version of the message
        acting_version: u16,
    },
    /// Supplied sequence does not fit the fixed-length slot
    #[error("length mismatch for field `{field}`: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Field name
        field: &'static str,
        /// Capacity of the slot
        expected: usize,
        /// Length supplied by the caller
        actual: usize,
    },
    /// Variable-length payload does not fit the length prefix
    #[error("length {length} does not fit the length prefix of `{field}`")]
    LengthOverflow {
        /// Field name
        field: &'static str,
        /// Payload length
        length: usize,
    },
    /// Group count does not fit the `numInGroup` encoding
    #[error("count {count} does not fit `numInGroup` of `{group}`")]
    CountOverflow {
        /// Group name
        group: &'static str,
        /// Requested count
        count: usize,
    },
    /// Bit index outside the width of the set encoding
    #[error("bit {bit} out of range for a {width}-bit set")]
    BitOutOfRange {
        /// Requested bit
        bit: u32,
        /// Width of the encoding in bits
        width: u32,
    },
    /// Symbolic name not defined by the enumeration
    #[error("unknown name for enum `{enumeration}`")]
    UnknownEnumName {
        /// Enumeration name
        enumeration: &'static str,
    },
    /// Value or accessor kind does not match the field's descriptor
    #[error("kind mismatch for field `{field}`")]
    KindMismatch {
        /// Field name
        field: &'static str,
    },
    /// Character data is not valid UTF-8
    #[error("invalid text in field `{field}`")]
    InvalidText {
        /// Field name
        field: &'static str,
    },
    /// Message header carries another template id
    #[error("template id mismatch: expected {expected}, got {actual}")]
    TemplateMismatch {
        /// Template id of the target message
        expected: u16,
        /// Template id found in the header
        actual: u16,
    },
    /// Message header carries another schema id
    #[error("schema id mismatch: expected {expected}, got {actual}")]
    SchemaMismatch {
        /// Schema id of the target message
        expected: u16,
        /// Schema id found in the header
        actual: u16,
    },
}

/// Result type alias for sbeview operations
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::BufferTooShort {
            required: 24,
            limit: 16,
        };
        assert_eq!(
            err.to_string(),
            "buffer too short: needed 24 bytes, limit is 16"
        );

        let err = Error::ConstantMismatch { field: "side" };
        assert_eq!(err.to_string(), "constant value mismatch for field `side`");
    }
}
