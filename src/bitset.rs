//! Bit set fields
//!
//! A set is an unsigned integer whose bits are named choices. [`BitSet`] is
//! the decoded value, sized by its encoding (8, 16, 32 or 64 bits); bits the
//! schema does not name are carried through unchanged.

use core::fmt::Debug;
use core::marker::PhantomData;

use crate::error::{Error, Result};
use crate::field::Accessor;
use crate::primitive::{PrimitiveType, Scalar};
use crate::schema::{Constant, FieldDescriptor, FieldKind, SetDescriptor};

/// Decoded set value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSet {
    bits: u64,
    encoding: PrimitiveType,
}

impl BitSet {
    /// Create an empty set over `encoding`
    #[inline]
    pub const fn new(encoding: PrimitiveType) -> Self {
        Self { bits: 0, encoding }
    }

    /// Create from raw bits, masked to the encoding width
    #[inline]
    pub const fn from_bits(bits: u64, encoding: PrimitiveType) -> Self {
        Self {
            bits: bits & Self::mask(encoding),
            encoding,
        }
    }

    const fn mask(encoding: PrimitiveType) -> u64 {
        encoding.raw_max()
    }

    /// Raw bits value
    #[inline]
    pub const fn bits(&self) -> u64 {
        self.bits
    }

    /// Underlying encoding
    #[inline]
    pub const fn encoding(&self) -> PrimitiveType {
        self.encoding
    }

    /// Width of the encoding in bits
    #[inline]
    pub const fn width(&self) -> u32 {
        (self.encoding.size() * 8) as u32
    }

    fn check(&self, bit: u32) -> Result<()> {
        if bit >= self.width() {
            return Err(Error::BitOutOfRange {
                bit,
                width: self.width(),
            });
        }
        Ok(())
    }

    /// Set a bit
    #[inline]
    pub fn set(&mut self, bit: u32) -> Result<()> {
        self.check(bit)?;
        self.bits |= 1 << bit;
        Ok(())
    }

    /// Clear a bit
    #[inline]
    pub fn clear(&mut self, bit: u32) -> Result<()> {
        self.check(bit)?;
        self.bits &= !(1 << bit);
        Ok(())
    }

    /// Set or clear a bit, builder style
    #[inline]
    pub fn with(mut self, bit: u32, value: bool) -> Result<Self> {
        if value {
            self.set(bit)?;
        } else {
            self.clear(bit)?;
        }
        Ok(self)
    }

    /// Set or clear a bit known to be inside the width
    ///
    /// Bits outside the width are ignored.
    #[inline]
    pub const fn assign(self, bit: u32, value: bool) -> Self {
        if bit >= self.width() {
            return self;
        }
        let bits = if value {
            self.bits | (1 << bit)
        } else {
            self.bits & !(1 << bit)
        };
        Self {
            bits,
            encoding: self.encoding,
        }
    }

    /// Check if a bit is set
    #[inline]
    pub const fn is_set(&self, bit: u32) -> bool {
        if bit >= self.width() {
            return false;
        }
        (self.bits >> bit) & 1 != 0
    }

    /// Count number of set bits
    #[inline]
    pub const fn count_set(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Check if no bit is set
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Clear every bit
    #[inline]
    pub fn reset(&mut self) -> &mut Self {
        self.bits = 0;
        self
    }

    /// Encode to the first bytes of `buf`, returning the bytes written
    #[inline]
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.encoding.size();
        if buf.len() < size {
            return Err(Error::BufferTooShort {
                required: size,
                limit: buf.len(),
            });
        }
        self.encoding.write(buf, Scalar::UInt(self.bits));
        Ok(size)
    }

    /// Decode from the first bytes of `buf`, returning the bytes read
    #[inline]
    pub fn decode(buf: &[u8], encoding: PrimitiveType) -> Result<(Self, usize)> {
        let size = encoding.size();
        if buf.len() < size {
            return Err(Error::BufferTooShort {
                required: size,
                limit: buf.len(),
            });
        }
        let bits = encoding.read(buf).as_u64();
        Ok((Self::from_bits(bits, encoding), size))
    }

    /// Iterator over set bit indices
    #[inline]
    pub fn iter_set(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.width()).filter(move |&bit| self.is_set(bit))
    }
}

/// Rust representation of a schema set
pub trait ChoiceSet: Copy + Debug {
    /// Wrap a decoded set
    fn from_set(set: BitSet) -> Self;

    /// Unwrap into the decoded set
    fn to_set(&self) -> BitSet;
}

impl ChoiceSet for BitSet {
    #[inline]
    fn from_set(set: BitSet) -> Self {
        set
    }

    #[inline]
    fn to_set(&self) -> BitSet {
        *self
    }
}

/// View of a set field decoding to `S`
#[derive(Debug)]
pub struct SetField<'a, B, S = BitSet> {
    access: Accessor<'a, B>,
    _marker: PhantomData<S>,
}

impl<'a, B, S: ChoiceSet> SetField<'a, B, S> {
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

    /// Set descriptor
    pub fn set_descriptor(&self) -> Result<&'static SetDescriptor> {
        match self.access.field.kind {
            FieldKind::Set(desc) => Ok(desc),
            _ => Err(self.access.kind_mismatch()),
        }
    }
}

impl<'a, B: AsRef<[u8]>, S: ChoiceSet> SetField<'a, B, S> {
    /// Whether the field exists in the acting version
    #[inline]
    pub fn present(&self) -> Result<bool> {
        self.access.present()
    }

    /// Decoded set; empty outside the acting version
    pub fn bits(&self) -> Result<BitSet> {
        let desc = self.set_descriptor()?;
        match self.access.constant()? {
            Some(Constant::Scalar(value)) => {
                return Ok(BitSet::from_bits(value.as_u64(), desc.encoding))
            }
            Some(Constant::Text(_)) => return Err(self.access.kind_mismatch()),
            None => {}
        }
        if !self.access.in_acting_version() {
            return Ok(BitSet::new(desc.encoding));
        }
        let src = self
            .access
            .cursor
            .bytes(self.access.offset, desc.encoding.size())?;
        BitSet::decode(src, desc.encoding).map(|(set, _)| set)
    }

    /// Decoded value
    #[inline]
    pub fn value(&self) -> Result<S> {
        self.bits().map(S::from_set)
    }

    /// Whether `bit` is set
    pub fn test(&self, bit: u32) -> Result<bool> {
        let set = self.bits()?;
        set.check(bit)?;
        Ok(set.is_set(bit))
    }

    /// Whether the choice called `name` is set
    pub fn test_choice(&self, name: &str) -> Result<bool> {
        let choice = self
            .set_descriptor()?
            .choice(name)
            .ok_or(Error::FieldNotFound)?;
        self.test(choice.bit)
    }

    /// Declared choices with their state, in schema order
    ///
    /// Choices introduced after the acting version are skipped.
    pub fn choices(&self) -> Result<impl Iterator<Item = (&'static str, bool)>> {
        let desc = self.set_descriptor()?;
        let set = self.bits()?;
        let acting_version = self.access.cursor.acting_version();
        Ok(desc
            .choices
            .iter()
            .filter(move |c| c.since_version <= acting_version)
            .map(move |c| (c.name, set.is_set(c.bit))))
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>, S: ChoiceSet> SetField<'a, B, S> {
    fn write(&mut self, set: BitSet) -> Result<()> {
        let desc = self.set_descriptor()?;
        if let Some(Constant::Scalar(value)) = self.access.constant()? {
            if value.as_u64() == set.bits() {
                return Ok(());
            }
            return Err(Error::ConstantMismatch {
                field: self.access.field.name,
            });
        }
        self.access.ensure_in_version()?;
        let dst = self
            .access
            .cursor
            .bytes_mut(self.access.offset, desc.encoding.size())?;
        BitSet::from_bits(set.bits(), desc.encoding)
            .encode(dst)
            .map(|_| ())
    }

    /// Write the whole set
    #[inline]
    pub fn set_value(&mut self, value: S) -> Result<()> {
        self.write(value.to_set())
    }

    /// Set or clear one bit, leaving every other bit untouched
    pub fn set(&mut self, bit: u32, value: bool) -> Result<()> {
        let set = self.bits()?.with(bit, value)?;
        self.write(set)
    }

    /// Set or clear the choice called `name`
    pub fn set_choice(&mut self, name: &str, value: bool) -> Result<()> {
        let choice = self
            .set_descriptor()?
            .choice(name)
            .ok_or(Error::FieldNotFound)?;
        self.set(choice.bit, value)
    }

    /// Clear every bit of an optional set
    #[inline]
    pub fn reset(&mut self) -> Result<()> {
        self.access.reset()
    }
}
