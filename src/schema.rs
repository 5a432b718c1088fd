//! Static schema descriptors
//!
//! A schema is compiled into a graph of `const` descriptor records: each
//! message, group and composite carries a table of [`FieldDescriptor`]s in
//! wire order, and each field points at the descriptor of its kind. The
//! accessor layer walks these tables; nothing here touches a buffer.
//!
//! Descriptors are built with `const fn` constructors so that malformed
//! definitions (a dimension composite without `numInGroup`, a lookup of a
//! field name that does not exist) fail at compile time.
//!
//! ```
//! use sbeview::schema::{FieldDescriptor, FieldKind, TypeDescriptor, field_index};
//! use sbeview::PrimitiveType;
//!
//! const SECURITY_ID: TypeDescriptor = TypeDescriptor::new("SecurityID", PrimitiveType::UInt64, 1);
//! const FIELDS: &[FieldDescriptor] = &[
//!     FieldDescriptor::new("securityID", 48, 0, FieldKind::Type(&SECURITY_ID)),
//! ];
//!
//! assert_eq!(field_index(FIELDS, "securityID"), Some(0));
//! assert_eq!(field_index(FIELDS, "symbol"), None);
//! ```

use crate::primitive::{PrimitiveType, Scalar};

/// How absence of a value is represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// Always present on the wire
    Required,
    /// Absent when the stored value equals the null sentinel
    Optional,
    /// Not stored; reads yield the schema constant
    Constant,
}

/// Value of a constant field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    /// Numeric constant (also used for enum and char constants)
    Scalar(Scalar),
    /// Character array constant
    Text(&'static str),
}

/// Primitive-backed type: scalar, fixed array or fixed-length text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeDescriptor {
    /// Type name
    pub name: &'static str,
    /// Element encoding
    pub primitive: PrimitiveType,
    /// Number of elements (1 for a scalar)
    pub length: usize,
    /// Null sentinel override
    pub null_value: Option<Scalar>,
    /// Minimum valid value override
    pub min_value: Option<Scalar>,
    /// Maximum valid value override
    pub max_value: Option<Scalar>,
}

impl TypeDescriptor {
    /// Type with the primitive's default null, min and max
    pub const fn new(name: &'static str, primitive: PrimitiveType, length: usize) -> Self {
        Self {
            name,
            primitive,
            length,
            null_value: None,
            min_value: None,
            max_value: None,
        }
    }

    /// Override the null sentinel
    pub const fn with_null(mut self, null: Scalar) -> Self {
        self.null_value = Some(null);
        self
    }

    /// Override the valid range
    pub const fn with_range(mut self, min: Scalar, max: Scalar) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    /// Bytes occupied on the wire
    #[inline]
    pub const fn encoded_length(&self) -> usize {
        self.primitive.size() * self.length
    }

    /// Whether the type is fixed-length character data
    #[inline]
    pub const fn is_text(&self) -> bool {
        matches!(self.primitive, PrimitiveType::Char) && self.length > 1
    }

    /// Effective null sentinel
    #[inline]
    pub fn null(&self) -> Scalar {
        self.null_value
            .unwrap_or_else(|| self.primitive.null_value())
    }

    /// Effective minimum valid value
    #[inline]
    pub fn min(&self) -> Scalar {
        self.min_value
            .unwrap_or_else(|| self.primitive.min_value())
    }

    /// Effective maximum valid value
    #[inline]
    pub fn max(&self) -> Scalar {
        self.max_value
            .unwrap_or_else(|| self.primitive.max_value())
    }
}

/// Named value of an enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidValue {
    /// Symbolic name
    pub name: &'static str,
    /// Raw encoded value
    pub value: u64,
    /// Schema version that introduced the value
    pub since_version: u16,
}

impl ValidValue {
    /// Value available since version 0
    pub const fn new(name: &'static str, value: u64) -> Self {
        Self {
            name,
            value,
            since_version: 0,
        }
    }

    /// Set the introducing version
    pub const fn since(mut self, version: u16) -> Self {
        self.since_version = version;
        self
    }
}

/// Enumeration over a char or unsigned integer encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Enumeration name
    pub name: &'static str,
    /// Underlying encoding
    pub encoding: PrimitiveType,
    /// Raw value that denotes absence
    pub null_value: u64,
    /// Declared values
    pub values: &'static [ValidValue],
}

impl EnumDescriptor {
    /// Enumeration whose null is the encoding's default null
    pub const fn new(
        name: &'static str,
        encoding: PrimitiveType,
        values: &'static [ValidValue],
    ) -> Self {
        let null_value = match encoding {
            PrimitiveType::Char => 0,
            other => other.raw_max(),
        };
        Self {
            name,
            encoding,
            null_value,
            values,
        }
    }

    /// Symbolic name of `raw`, if declared
    pub fn name_of(&self, raw: u64) -> Option<&'static str> {
        self.values
            .iter()
            .find(|v| v.value == raw)
            .map(|v| v.name)
    }

    /// Raw value of `name`, if declared
    pub fn value_of(&self, name: &str) -> Option<u64> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value)
    }
}

/// Named bit of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    /// Symbolic name
    pub name: &'static str,
    /// Bit index, 0 is the least significant bit
    pub bit: u32,
    /// Schema version that introduced the choice
    pub since_version: u16,
}

impl Choice {
    /// Choice available since version 0
    pub const fn new(name: &'static str, bit: u32) -> Self {
        Self {
            name,
            bit,
            since_version: 0,
        }
    }

    /// Set the introducing version
    pub const fn since(mut self, version: u16) -> Self {
        self.since_version = version;
        self
    }
}

/// Bit set over an unsigned integer encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetDescriptor {
    /// Set name
    pub name: &'static str,
    /// Underlying encoding
    pub encoding: PrimitiveType,
    /// Declared choices
    pub choices: &'static [Choice],
}

impl SetDescriptor {
    /// Set descriptor; panics in const context when a choice exceeds the width
    pub const fn new(
        name: &'static str,
        encoding: PrimitiveType,
        choices: &'static [Choice],
    ) -> Self {
        let width = (encoding.size() * 8) as u32;
        let mut i = 0;
        while i < choices.len() {
            if choices[i].bit >= width {
                panic!("choice bit outside the set encoding");
            }
            i += 1;
        }
        Self {
            name,
            encoding,
            choices,
        }
    }

    /// Choice named `name`, if declared
    pub fn choice(&self, name: &str) -> Option<&'static Choice> {
        self.choices.iter().find(|c| c.name == name)
    }
}

/// Fixed-size record of fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeDescriptor {
    /// Composite name
    pub name: &'static str,
    /// Member fields in wire order, offsets relative to the composite
    pub fields: &'static [FieldDescriptor],
    /// Bytes occupied on the wire
    pub encoded_length: usize,
}

impl CompositeDescriptor {
    /// Composite whose length is the end of its last member
    pub const fn new(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        let mut encoded_length = 0;
        let mut i = 0;
        while i < fields.len() {
            let end = fields[i].offset + fields[i].encoded_length();
            if end > encoded_length {
                encoded_length = end;
            }
            i += 1;
        }
        Self {
            name,
            fields,
            encoded_length,
        }
    }
}

/// Offset and encoding of a primitive member inside a composite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    /// Offset inside the composite
    pub offset: usize,
    /// Member encoding
    pub primitive: PrimitiveType,
}

impl Member {
    /// Resolve member `name` of `composite`; panics in const context when absent
    pub const fn of(composite: &CompositeDescriptor, name: &str) -> Self {
        let index = require_field(composite.fields, name);
        let field = &composite.fields[index];
        match field.kind {
            FieldKind::Type(ty) => Self {
                offset: field.offset,
                primitive: ty.primitive,
            },
            _ => panic!("composite member is not a primitive type"),
        }
    }
}

/// Repeating group of fixed-size elements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupDescriptor {
    /// Group name
    pub name: &'static str,
    /// Dimension header composite
    pub dimension: &'static CompositeDescriptor,
    /// `blockLength` member of the dimension
    pub block_length_member: Member,
    /// `numInGroup` member of the dimension
    pub num_in_group_member: Member,
    /// Element block length declared by the schema
    pub block_length: usize,
    /// Element fields in wire order, offsets relative to the element
    pub fields: &'static [FieldDescriptor],
}

impl GroupDescriptor {
    /// Group descriptor; the dimension must carry `blockLength` and `numInGroup`
    pub const fn new(
        name: &'static str,
        dimension: &'static CompositeDescriptor,
        block_length: usize,
        fields: &'static [FieldDescriptor],
    ) -> Self {
        Self {
            name,
            dimension,
            block_length_member: Member::of(dimension, "blockLength"),
            num_in_group_member: Member::of(dimension, "numInGroup"),
            block_length,
            fields,
        }
    }
}

/// Length-prefixed variable data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataDescriptor {
    /// Data type name
    pub name: &'static str,
    /// Encoding composite
    pub encoding: &'static CompositeDescriptor,
    /// `length` member of the encoding
    pub length_member: Member,
    /// `varData` member of the encoding (element type)
    pub var_data_member: Member,
}

impl DataDescriptor {
    /// Data descriptor; the encoding must carry `length` and `varData`
    pub const fn new(name: &'static str, encoding: &'static CompositeDescriptor) -> Self {
        Self {
            name,
            encoding,
            length_member: Member::of(encoding, "length"),
            var_data_member: Member::of(encoding, "varData"),
        }
    }

    /// Size of the length prefix
    #[inline]
    pub const fn header_length(&self) -> usize {
        self.var_data_member.offset
    }
}

/// Kind of a field, pointing at the kind's descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Primitive scalar, array or text
    Type(&'static TypeDescriptor),
    /// Enumeration
    Enum(&'static EnumDescriptor),
    /// Bit set
    Set(&'static SetDescriptor),
    /// Composite record
    Composite(&'static CompositeDescriptor),
    /// Repeating group
    Group(&'static GroupDescriptor),
    /// Variable-length data
    Data(&'static DataDescriptor),
}

/// A field of a message, group element or composite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: &'static str,
    /// Schema id
    pub id: u16,
    /// Kind and kind descriptor
    pub kind: FieldKind,
    /// Offset inside the enclosing block (unused for groups and data)
    pub offset: usize,
    /// Presence
    pub presence: Presence,
    /// Constant value, for constant presence
    pub constant: Option<Constant>,
    /// Schema version that introduced the field
    pub since_version: u16,
}

impl FieldDescriptor {
    /// Required field available since version 0
    pub const fn new(name: &'static str, id: u16, offset: usize, kind: FieldKind) -> Self {
        Self {
            name,
            id,
            kind,
            offset,
            presence: Presence::Required,
            constant: None,
            since_version: 0,
        }
    }

    /// Mark the field optional
    pub const fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Mark the field constant with `value`
    pub const fn constant(mut self, value: Constant) -> Self {
        self.presence = Presence::Constant;
        self.constant = Some(value);
        self
    }

    /// Set the introducing version
    pub const fn since(mut self, version: u16) -> Self {
        self.since_version = version;
        self
    }

    /// Bytes the field occupies inside its block
    pub const fn encoded_length(&self) -> usize {
        if matches!(self.presence, Presence::Constant) {
            return 0;
        }
        match self.kind {
            FieldKind::Type(ty) => ty.encoded_length(),
            FieldKind::Enum(e) => e.encoding.size(),
            FieldKind::Set(s) => s.encoding.size(),
            FieldKind::Composite(c) => c.encoded_length,
            FieldKind::Group(_) | FieldKind::Data(_) => 0,
        }
    }

    /// Whether the field exists in `acting_version`
    #[inline]
    pub const fn in_version(&self, acting_version: u16) -> bool {
        self.since_version <= acting_version
    }
}

/// Schema identity shared by its messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDescriptor {
    /// Package name
    pub package: &'static str,
    /// Schema id
    pub id: u16,
    /// Current schema version
    pub version: u16,
}

/// Top-level message template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MessageDescriptor {
    /// Message name
    pub name: &'static str,
    /// Template id
    pub id: u16,
    /// Fixed block length declared by the schema
    pub block_length: usize,
    /// Fields in wire order: fixed fields, then groups, then data
    pub fields: &'static [FieldDescriptor],
    /// Owning schema
    pub schema: &'static SchemaDescriptor,
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Index of the field called `name`
pub const fn field_index(fields: &[FieldDescriptor], name: &str) -> Option<usize> {
    let mut i = 0;
    while i < fields.len() {
        if str_eq(fields[i].name, name) {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Index of the field called `name`, failing compilation when used in a
/// `const` and the name is unknown
pub const fn require_field(fields: &[FieldDescriptor], name: &str) -> usize {
    match field_index(fields, name) {
        Some(index) => index,
        None => panic!("field not found"),
    }
}

/// Descriptor of the field called `name`
pub fn find_field(fields: &'static [FieldDescriptor], name: &str) -> Option<&'static FieldDescriptor> {
    fields.iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UINT8: TypeDescriptor = TypeDescriptor::new("uint8", PrimitiveType::UInt8, 1);
    const UINT16: TypeDescriptor = TypeDescriptor::new("uint16", PrimitiveType::UInt16, 1);
    const SYMBOL: TypeDescriptor = TypeDescriptor::new("Symbol", PrimitiveType::Char, 6);

    const DIMENSION_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("blockLength", 0, 0, FieldKind::Type(&UINT16)),
        FieldDescriptor::new("numInGroup", 0, 2, FieldKind::Type(&UINT8)),
    ];
    const DIMENSION: CompositeDescriptor =
        CompositeDescriptor::new("groupSizeEncoding", DIMENSION_FIELDS);

    const SIDE_VALUES: &[ValidValue] = &[
        ValidValue::new("Buy", b'1' as u64),
        ValidValue::new("Sell", b'2' as u64),
    ];
    const SIDE: EnumDescriptor = EnumDescriptor::new("Side", PrimitiveType::Char, SIDE_VALUES);

    #[test]
    fn test_composite_length() {
        assert_eq!(DIMENSION.encoded_length, 3);
    }

    #[test]
    fn test_group_members_resolved() {
        const GROUP: GroupDescriptor = GroupDescriptor::new("entries", &DIMENSION, 12, &[]);

        assert_eq!(
            GROUP.block_length_member,
            Member {
                offset: 0,
                primitive: PrimitiveType::UInt16
            }
        );
        assert_eq!(GROUP.num_in_group_member.offset, 2);
        assert_eq!(GROUP.num_in_group_member.primitive, PrimitiveType::UInt8);
    }

    #[test]
    fn test_field_lookup() {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::new("symbol", 55, 0, FieldKind::Type(&SYMBOL)),
            FieldDescriptor::new("side", 54, 6, FieldKind::Enum(&SIDE)).optional(),
        ];
        const SIDE_INDEX: usize = require_field(FIELDS, "side");

        assert_eq!(SIDE_INDEX, 1);
        assert_eq!(field_index(FIELDS, "price"), None);
        assert_eq!(find_field(FIELDS, "symbol").map(|f| f.id), Some(55));
        assert_eq!(FIELDS[1].presence, Presence::Optional);
    }

    #[test]
    fn test_field_encoded_length() {
        let text = FieldDescriptor::new("symbol", 55, 0, FieldKind::Type(&SYMBOL));
        assert_eq!(text.encoded_length(), 6);
        assert!(SYMBOL.is_text());

        let constant = text.constant(Constant::Text("BVMF"));
        assert_eq!(constant.encoded_length(), 0);
        assert_eq!(constant.presence, Presence::Constant);
    }

    #[test]
    fn test_enum_lookup() {
        assert_eq!(SIDE.null_value, 0);
        assert_eq!(SIDE.name_of(b'2' as u64), Some("Sell"));
        assert_eq!(SIDE.value_of("Buy"), Some(b'1' as u64));
        assert_eq!(SIDE.name_of(b'9' as u64), None);

        const NUMERIC: EnumDescriptor = EnumDescriptor::new("Numeric", PrimitiveType::UInt8, &[]);
        assert_eq!(NUMERIC.null_value, 255);
    }

    #[test]
    fn test_type_defaults() {
        assert_eq!(UINT8.null(), Scalar::UInt(255));
        assert_eq!(UINT8.max(), Scalar::UInt(254));

        let overridden = UINT8.with_null(Scalar::UInt(0));
        assert_eq!(overridden.null(), Scalar::UInt(0));
    }

    #[test]
    fn test_version_gate() {
        let field = FieldDescriptor::new("tradeDate", 75, 0, FieldKind::Type(&UINT16)).since(2);
        assert!(!field.in_version(1));
        assert!(field.in_version(2));
    }
}
