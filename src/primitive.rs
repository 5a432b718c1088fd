//! Primitive wire types and the null-sentinel convention
//!
//! Every scalar, array element, enum and set is backed by one of the
//! primitive types below. Values are always little-endian on the wire and are
//! converted explicitly, never by reinterpreting memory.

use core::fmt::Debug;

/// Primitive types a schema may use as encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Single byte character (US-ASCII)
    Char,
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 8-bit integer
    UInt8,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Unsigned 64-bit integer
    UInt64,
    /// IEEE 754 single precision
    Float,
    /// IEEE 754 double precision
    Double,
}

/// A single decoded primitive value, widened to 64 bits
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Signed integer
    Int(i64),
    /// Unsigned integer or character
    UInt(u64),
    /// Floating point
    Float(f64),
}

impl Scalar {
    /// Value as unsigned integer
    #[inline]
    pub fn as_u64(self) -> u64 {
        match self {
            Scalar::Int(v) => v as u64,
            Scalar::UInt(v) => v,
            Scalar::Float(v) => v as u64,
        }
    }

    /// Value as signed integer
    #[inline]
    pub fn as_i64(self) -> i64 {
        match self {
            Scalar::Int(v) => v,
            Scalar::UInt(v) => v as i64,
            Scalar::Float(v) => v as i64,
        }
    }

    /// Value as floating point
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::UInt(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }
}

#[inline]
fn le_bytes<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&src[..N]);
    bytes
}

impl PrimitiveType {
    /// Encoded size in bytes
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            PrimitiveType::Char | PrimitiveType::Int8 | PrimitiveType::UInt8 => 1,
            PrimitiveType::Int16 | PrimitiveType::UInt16 => 2,
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float => 4,
            PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Double => 8,
        }
    }

    /// Schema name of the primitive
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Char => "char",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::UInt8 => "uint8",
            PrimitiveType::UInt16 => "uint16",
            PrimitiveType::UInt32 => "uint32",
            PrimitiveType::UInt64 => "uint64",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Whether values are unsigned integers (chars included)
    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            PrimitiveType::Char
                | PrimitiveType::UInt8
                | PrimitiveType::UInt16
                | PrimitiveType::UInt32
                | PrimitiveType::UInt64
        )
    }

    /// Whether values are floating point
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }

    /// Default null sentinel
    ///
    /// char: 0, signed: MIN, unsigned: MAX, floating point: NaN.
    pub fn null_value(self) -> Scalar {
        match self {
            PrimitiveType::Char => Scalar::UInt(0),
            PrimitiveType::Int8 => Scalar::Int(i8::MIN as i64),
            PrimitiveType::Int16 => Scalar::Int(i16::MIN as i64),
            PrimitiveType::Int32 => Scalar::Int(i32::MIN as i64),
            PrimitiveType::Int64 => Scalar::Int(i64::MIN),
            PrimitiveType::UInt8 => Scalar::UInt(u8::MAX as u64),
            PrimitiveType::UInt16 => Scalar::UInt(u16::MAX as u64),
            PrimitiveType::UInt32 => Scalar::UInt(u32::MAX as u64),
            PrimitiveType::UInt64 => Scalar::UInt(u64::MAX),
            PrimitiveType::Float | PrimitiveType::Double => Scalar::Float(f64::NAN),
        }
    }

    /// Default minimum valid value
    pub fn min_value(self) -> Scalar {
        match self {
            PrimitiveType::Char => Scalar::UInt(0x20),
            PrimitiveType::Int8 => Scalar::Int(i8::MIN as i64 + 1),
            PrimitiveType::Int16 => Scalar::Int(i16::MIN as i64 + 1),
            PrimitiveType::Int32 => Scalar::Int(i32::MIN as i64 + 1),
            PrimitiveType::Int64 => Scalar::Int(i64::MIN + 1),
            PrimitiveType::UInt8
            | PrimitiveType::UInt16
            | PrimitiveType::UInt32
            | PrimitiveType::UInt64 => Scalar::UInt(0),
            PrimitiveType::Float => Scalar::Float(f32::MIN_POSITIVE as f64),
            PrimitiveType::Double => Scalar::Float(f64::MIN_POSITIVE),
        }
    }

    /// Default maximum valid value
    pub fn max_value(self) -> Scalar {
        match self {
            PrimitiveType::Char => Scalar::UInt(0x7e),
            PrimitiveType::Int8 => Scalar::Int(i8::MAX as i64),
            PrimitiveType::Int16 => Scalar::Int(i16::MAX as i64),
            PrimitiveType::Int32 => Scalar::Int(i32::MAX as i64),
            PrimitiveType::Int64 => Scalar::Int(i64::MAX),
            PrimitiveType::UInt8 => Scalar::UInt(u8::MAX as u64 - 1),
            PrimitiveType::UInt16 => Scalar::UInt(u16::MAX as u64 - 1),
            PrimitiveType::UInt32 => Scalar::UInt(u32::MAX as u64 - 1),
            PrimitiveType::UInt64 => Scalar::UInt(u64::MAX - 1),
            PrimitiveType::Float => Scalar::Float(f32::MAX as f64),
            PrimitiveType::Double => Scalar::Float(f64::MAX),
        }
    }

    /// Largest raw integer the encoding can carry (used for length prefixes and counts)
    #[inline]
    pub const fn raw_max(self) -> u64 {
        match self.size() {
            1 => u8::MAX as u64,
            2 => u16::MAX as u64,
            4 => u32::MAX as u64,
            _ => u64::MAX,
        }
    }

    /// Whether `value` equals the `null` sentinel
    ///
    /// A NaN sentinel matches any NaN, since NaN never compares equal to itself.
    #[inline]
    pub fn is_null(self, value: Scalar, null: Scalar) -> bool {
        self.equal(value, null)
    }

    /// Compare two values as this primitive, NaN matching NaN
    pub fn equal(self, a: Scalar, b: Scalar) -> bool {
        if self.is_float() {
            let (a, b) = (a.as_f64(), b.as_f64());
            if b.is_nan() {
                return a.is_nan();
            }
            a == b
        } else if self.is_unsigned() {
            a.as_u64() == b.as_u64()
        } else {
            a.as_i64() == b.as_i64()
        }
    }

    /// Decode one value from `src` (little-endian)
    ///
    /// `src` must hold at least `self.size()` bytes.
    pub fn read(self, src: &[u8]) -> Scalar {
        match self {
            PrimitiveType::Char | PrimitiveType::UInt8 => Scalar::UInt(src[0] as u64),
            PrimitiveType::Int8 => Scalar::Int(src[0] as i8 as i64),
            PrimitiveType::Int16 => Scalar::Int(i16::from_le_bytes(le_bytes(src)) as i64),
            PrimitiveType::Int32 => Scalar::Int(i32::from_le_bytes(le_bytes(src)) as i64),
            PrimitiveType::Int64 => Scalar::Int(i64::from_le_bytes(le_bytes(src))),
            PrimitiveType::UInt16 => Scalar::UInt(u16::from_le_bytes(le_bytes(src)) as u64),
            PrimitiveType::UInt32 => Scalar::UInt(u32::from_le_bytes(le_bytes(src)) as u64),
            PrimitiveType::UInt64 => Scalar::UInt(u64::from_le_bytes(le_bytes(src))),
            PrimitiveType::Float => Scalar::Float(f32::from_le_bytes(le_bytes(src)) as f64),
            PrimitiveType::Double => Scalar::Float(f64::from_le_bytes(le_bytes(src))),
        }
    }

    /// Encode one value into `dst` (little-endian), truncating to the primitive width
    ///
    /// `dst` must hold at least `self.size()` bytes.
    pub fn write(self, dst: &mut [u8], value: Scalar) {
        match self {
            PrimitiveType::Char | PrimitiveType::UInt8 => dst[0] = value.as_u64() as u8,
            PrimitiveType::Int8 => dst[0] = value.as_i64() as i8 as u8,
            PrimitiveType::Int16 => dst[..2].copy_from_slice(&(value.as_i64() as i16).to_le_bytes()),
            PrimitiveType::Int32 => dst[..4].copy_from_slice(&(value.as_i64() as i32).to_le_bytes()),
            PrimitiveType::Int64 => dst[..8].copy_from_slice(&value.as_i64().to_le_bytes()),
            PrimitiveType::UInt16 => dst[..2].copy_from_slice(&(value.as_u64() as u16).to_le_bytes()),
            PrimitiveType::UInt32 => dst[..4].copy_from_slice(&(value.as_u64() as u32).to_le_bytes()),
            PrimitiveType::UInt64 => dst[..8].copy_from_slice(&value.as_u64().to_le_bytes()),
            PrimitiveType::Float => dst[..4].copy_from_slice(&(value.as_f64() as f32).to_le_bytes()),
            PrimitiveType::Double => dst[..8].copy_from_slice(&value.as_f64().to_le_bytes()),
        }
    }
}

/// Rust types that map one-to-one onto a wire primitive
pub trait Primitive: Copy + PartialEq + Debug + Default + 'static {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode from the first `SIZE` bytes of `src`
    fn read_le(src: &[u8]) -> Self;

    /// Encode into the first `SIZE` bytes of `dst`
    fn write_le(self, dst: &mut [u8]);

    /// Widen to a [`Scalar`]
    fn into_scalar(self) -> Scalar;

    /// Narrow from a [`Scalar`]
    fn from_scalar(value: Scalar) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty => $variant:ident, $widen:ty, $narrow:ident;)*) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn read_le(src: &[u8]) -> Self {
                    <$ty>::from_le_bytes(le_bytes(src))
                }

                #[inline]
                fn write_le(self, dst: &mut [u8]) {
                    dst[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn into_scalar(self) -> Scalar {
                    Scalar::$variant(self as $widen)
                }

                #[inline]
                fn from_scalar(value: Scalar) -> Self {
                    value.$narrow() as $ty
                }
            }
        )*
    };
}

impl_primitive! {
    u8 => UInt, u64, as_u64;
    u16 => UInt, u64, as_u64;
    u32 => UInt, u64, as_u64;
    u64 => UInt, u64, as_u64;
    i8 => Int, i64, as_i64;
    i16 => Int, i64, as_i64;
    i32 => Int, i64, as_i64;
    i64 => Int, i64, as_i64;
    f32 => Float, f64, as_f64;
    f64 => Float, f64, as_f64;
}
