//! Primitive-typed fields: scalars, fixed arrays and fixed-length text
//!
//! [`ScalarField`], [`ArrayField`] and [`TextField`] are the typed views used
//! by generated code. [`TypeField`] is the dynamic view reached through
//! introspection, exchanging values as [`Value`].

use core::marker::PhantomData;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::field::Accessor;
use crate::primitive::{Primitive, PrimitiveType, Scalar};
use crate::schema::{Constant, FieldDescriptor, TypeDescriptor};

/// Dynamically typed field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// Single primitive
    Scalar(Scalar),
    /// Character data, NUL padding stripped
    Text(&'a [u8]),
    /// Fixed array of primitives
    Array(ArrayView<'a>),
}

/// Borrowed little-endian array of runtime-typed primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayView<'a> {
    bytes: &'a [u8],
    primitive: PrimitiveType,
}

impl<'a> ArrayView<'a> {
    /// View `bytes` as consecutive `primitive` elements
    ///
    /// Trailing bytes that do not form a whole element are ignored.
    pub fn new(bytes: &'a [u8], primitive: PrimitiveType) -> Self {
        let whole = bytes.len() - bytes.len() % primitive.size();
        Self {
            bytes: &bytes[..whole],
            primitive,
        }
    }

    /// Element encoding
    #[inline]
    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / self.primitive.size()
    }

    /// Whether the array has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw little-endian bytes
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<Scalar> {
        let size = self.primitive.size();
        let start = index.checked_mul(size)?;
        self.bytes
            .get(start..start.checked_add(size)?)
            .map(|src| self.primitive.read(src))
    }

    /// Iterate over the elements
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + 'a {
        let primitive = self.primitive;
        self.bytes
            .chunks_exact(primitive.size())
            .map(move |src| primitive.read(src))
    }
}

/// Borrowed little-endian array of `P`
#[derive(Debug, Clone, Copy)]
pub struct Array<'a, P> {
    bytes: &'a [u8],
    _marker: PhantomData<P>,
}

impl<'a, P: Primitive> Array<'a, P> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            _marker: PhantomData,
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / P::SIZE
    }

    /// Whether the array has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Element at `index`
    #[inline]
    pub fn get(&self, index: usize) -> Option<P> {
        let start = index.checked_mul(P::SIZE)?;
        self.bytes.get(start..start.checked_add(P::SIZE)?).map(P::read_le)
    }

    /// Iterate over the elements
    pub fn iter(&self) -> impl Iterator<Item = P> + 'a {
        self.bytes.chunks_exact(P::SIZE).map(P::read_le)
    }
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

fn constant_mismatch(field: &'static FieldDescriptor) -> Error {
    tracing::debug!(field = field.name, "constant value mismatch");
    Error::ConstantMismatch { field: field.name }
}

fn constant_matches(primitive: PrimitiveType, constant: Constant, value: &Value<'_>) -> bool {
    match (constant, value) {
        (Constant::Scalar(expected), Value::Scalar(actual)) => primitive.equal(*actual, expected),
        (Constant::Text(expected), Value::Text(actual)) => expected.as_bytes() == *actual,
        _ => false,
    }
}

/// Element `index` of a constant array; text is NUL-padded past its end
fn constant_element(constant: Constant, index: usize) -> Scalar {
    match constant {
        Constant::Scalar(value) => value,
        Constant::Text(text) => {
            Scalar::UInt(text.as_bytes().get(index).copied().unwrap_or(0).into())
        }
    }
}

/// Copy `text` into the slot, zero-filling the tail
fn write_text<B: AsRef<[u8]> + AsMut<[u8]>>(
    access: &mut Accessor<'_, B>,
    capacity: usize,
    text: &[u8],
) -> Result<()> {
    if text.len() > capacity {
        return Err(Error::LengthMismatch {
            field: access.field.name,
            expected: capacity,
            actual: text.len(),
        });
    }
    let dst = access.cursor.bytes_mut(access.offset, capacity)?;
    dst[..text.len()].copy_from_slice(text);
    dst[text.len()..].fill(0);
    Ok(())
}

/// Dynamic view of a primitive-typed field
#[derive(Debug)]
pub struct TypeField<'a, B> {
    access: Accessor<'a, B>,
}

impl<'a, B> TypeField<'a, B> {
    pub(crate) fn new(access: Accessor<'a, B>) -> Self {
        Self { access }
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

    /// Type descriptor of the field
    #[inline]
    pub fn type_descriptor(&self) -> Result<&'static TypeDescriptor> {
        self.access.type_descriptor()
    }
}

impl<'a, B: AsRef<[u8]>> TypeField<'a, B> {
    /// Whether the field carries a value
    #[inline]
    pub fn present(&self) -> Result<bool> {
        self.access.present()
    }

    /// Read the value
    ///
    /// Constant fields yield the constant. Fields outside the acting version
    /// yield the null sentinel, or an empty array or text.
    pub fn value(self) -> Result<Value<'a>> {
        let ty = self.access.type_descriptor()?;
        if let Some(constant) = self.access.constant()? {
            return Ok(match constant {
                Constant::Scalar(value) => Value::Scalar(value),
                Constant::Text(text) => Value::Text(text.as_bytes()),
            });
        }

        let is_scalar = ty.length == 1 && !ty.is_text();
        if !self.access.in_acting_version() {
            return Ok(if is_scalar {
                Value::Scalar(ty.null())
            } else if ty.is_text() {
                Value::Text(&[])
            } else {
                Value::Array(ArrayView::new(&[], ty.primitive))
            });
        }

        let Accessor { cursor, offset, .. } = self.access;
        let cursor: &'a Cursor<B> = cursor;
        if is_scalar {
            return cursor.get_scalar(offset, ty.primitive).map(Value::Scalar);
        }
        let bytes = cursor.bytes(offset, ty.encoded_length())?;
        Ok(if ty.is_text() {
            Value::Text(trim_nul(bytes))
        } else {
            Value::Array(ArrayView::new(bytes, ty.primitive))
        })
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> TypeField<'a, B> {
    /// Write the value
    ///
    /// Text shorter than the slot is zero-padded; arrays must match the
    /// declared length exactly.
    pub fn set_value(mut self, value: Value<'_>) -> Result<()> {
        let ty = self.access.type_descriptor()?;
        if let Some(constant) = self.access.constant()? {
            if constant_matches(ty.primitive, constant, &value) {
                return Ok(());
            }
            return Err(constant_mismatch(self.access.field));
        }
        self.access.ensure_in_version()?;

        match value {
            Value::Scalar(scalar) if ty.length == 1 => {
                self.access
                    .cursor
                    .put_scalar(self.access.offset, ty.primitive, scalar)
            }
            Value::Text(text) if ty.primitive == PrimitiveType::Char => {
                write_text(&mut self.access, ty.length, text)
            }
            Value::Array(array) if array.primitive() == ty.primitive => {
                if array.len() != ty.length {
                    return Err(Error::LengthMismatch {
                        field: self.access.field.name,
                        expected: ty.length,
                        actual: array.len(),
                    });
                }
                self.access
                    .cursor
                    .bytes_mut(self.access.offset, ty.encoded_length())?
                    .copy_from_slice(array.as_bytes());
                Ok(())
            }
            _ => Err(self.access.kind_mismatch()),
        }
    }

    /// Mark an optional field absent
    #[inline]
    pub fn reset(mut self) -> Result<()> {
        self.access.reset()
    }
}

/// Typed view of a single-element primitive field
#[derive(Debug)]
pub struct ScalarField<'a, B, P> {
    access: Accessor<'a, B>,
    _marker: PhantomData<P>,
}

impl<'a, B, P: Primitive> ScalarField<'a, B, P> {
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

    fn checked_type(&self) -> Result<&'static TypeDescriptor> {
        let ty = self.access.type_descriptor()?;
        if ty.length != 1 || ty.primitive.size() != P::SIZE {
            return Err(self.access.kind_mismatch());
        }
        Ok(ty)
    }

    /// Null sentinel of the field type
    pub fn null_value(&self) -> Result<P> {
        self.checked_type().map(|ty| P::from_scalar(ty.null()))
    }

    /// Minimum valid value of the field type
    pub fn min_value(&self) -> Result<P> {
        self.checked_type().map(|ty| P::from_scalar(ty.min()))
    }

    /// Maximum valid value of the field type
    pub fn max_value(&self) -> Result<P> {
        self.checked_type().map(|ty| P::from_scalar(ty.max()))
    }
}

impl<'a, B: AsRef<[u8]>, P: Primitive> ScalarField<'a, B, P> {
    /// Whether the field carries a value
    #[inline]
    pub fn present(&self) -> Result<bool> {
        self.access.present()
    }

    /// Read the value; the null sentinel outside the acting version
    pub fn value(&self) -> Result<P> {
        let ty = self.checked_type()?;
        match self.access.constant()? {
            Some(Constant::Scalar(value)) => return Ok(P::from_scalar(value)),
            Some(Constant::Text(_)) => return Err(self.access.kind_mismatch()),
            None => {}
        }
        if !self.access.in_acting_version() {
            return Ok(P::from_scalar(ty.null()));
        }
        self.access.cursor.get(self.access.offset)
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>, P: Primitive> ScalarField<'a, B, P> {
    /// Write the value
    ///
    /// On a constant field this only checks that `value` equals the constant.
    pub fn set_value(&mut self, value: P) -> Result<()> {
        let ty = self.checked_type()?;
        if let Some(constant) = self.access.constant()? {
            if constant_matches(ty.primitive, constant, &Value::Scalar(value.into_scalar())) {
                return Ok(());
            }
            return Err(constant_mismatch(self.access.field));
        }
        self.access.ensure_in_version()?;
        self.access.cursor.put(self.access.offset, value)
    }

    /// Mark an optional field absent
    #[inline]
    pub fn reset(&mut self) -> Result<()> {
        self.access.reset()
    }
}

/// View of a fixed-length character field
#[derive(Debug)]
pub struct TextField<'a, B> {
    access: Accessor<'a, B>,
}

impl<'a, B> TextField<'a, B> {
    pub(crate) fn new(access: Accessor<'a, B>) -> Self {
        Self { access }
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

    /// Slot size in bytes
    pub fn capacity(&self) -> Result<usize> {
        let ty = self.access.type_descriptor()?;
        if ty.primitive != PrimitiveType::Char {
            return Err(self.access.kind_mismatch());
        }
        Ok(ty.length)
    }
}

impl<'a, B: AsRef<[u8]>> TextField<'a, B> {
    /// Whether the field carries a value (first character is not NUL)
    #[inline]
    pub fn present(&self) -> Result<bool> {
        self.access.present()
    }

    /// Read the characters up to the first NUL
    pub fn value(self) -> Result<&'a [u8]> {
        let capacity = self.capacity()?;
        if let Some(constant) = self.access.constant()? {
            return match constant {
                Constant::Text(text) => Ok(text.as_bytes()),
                Constant::Scalar(_) => Err(self.access.kind_mismatch()),
            };
        }
        if !self.access.in_acting_version() {
            return Ok(&[]);
        }
        let Accessor { cursor, offset, .. } = self.access;
        let cursor: &'a Cursor<B> = cursor;
        cursor.bytes(offset, capacity).map(trim_nul)
    }

    /// Read the characters as UTF-8
    pub fn value_str(self) -> Result<&'a str> {
        let field = self.access.field.name;
        let bytes = self.value()?;
        core::str::from_utf8(bytes).map_err(|_| Error::InvalidText { field })
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> TextField<'a, B> {
    /// Write `text`, zero-filling the rest of the slot
    pub fn set_value(&mut self, text: &[u8]) -> Result<()> {
        let capacity = self.capacity()?;
        if let Some(constant) = self.access.constant()? {
            if constant_matches(PrimitiveType::Char, constant, &Value::Text(text)) {
                return Ok(());
            }
            return Err(constant_mismatch(self.access.field));
        }
        self.access.ensure_in_version()?;
        write_text(&mut self.access, capacity, text)
    }

    /// Write a string, zero-filling the rest of the slot
    #[inline]
    pub fn set_str(&mut self, text: &str) -> Result<()> {
        self.set_value(text.as_bytes())
    }

    /// Mark an optional field absent (all NUL)
    #[inline]
    pub fn reset(&mut self) -> Result<()> {
        self.access.reset()
    }
}

/// Typed view of a fixed-length array field
#[derive(Debug)]
pub struct ArrayField<'a, B, P> {
    access: Accessor<'a, B>,
    _marker: PhantomData<P>,
}

impl<'a, B, P: Primitive> ArrayField<'a, B, P> {
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

    /// Declared number of elements
    pub fn len(&self) -> Result<usize> {
        self.checked_type().map(|ty| ty.length)
    }

    fn checked_type(&self) -> Result<&'static TypeDescriptor> {
        let ty = self.access.type_descriptor()?;
        if ty.primitive.size() != P::SIZE {
            return Err(self.access.kind_mismatch());
        }
        Ok(ty)
    }
}

impl<'a, B: AsRef<[u8]>, P: Primitive> ArrayField<'a, B, P> {
    /// Whether the field carries a value (first element is not null)
    #[inline]
    pub fn present(&self) -> Result<bool> {
        self.access.present()
    }

    /// Borrow all elements; empty outside the acting version
    ///
    /// A constant text reads as its bytes, without padding.
    pub fn value(self) -> Result<Array<'a, P>> {
        let ty = self.checked_type()?;
        match self.access.constant()? {
            Some(Constant::Text(text)) if P::SIZE == 1 => {
                return Ok(Array::new(text.as_bytes()));
            }
            Some(_) => return Err(self.access.kind_mismatch()),
            None => {}
        }
        if !self.access.in_acting_version() {
            return Ok(Array::new(&[]));
        }
        let Accessor { cursor, offset, .. } = self.access;
        let cursor: &'a Cursor<B> = cursor;
        cursor.bytes(offset, ty.encoded_length()).map(Array::new)
    }

    /// Element at `index`; the null sentinel outside the acting version
    pub fn get(&self, index: usize) -> Result<P> {
        let ty = self.checked_type()?;
        if index >= ty.length {
            return Err(Error::LengthMismatch {
                field: self.access.field.name,
                expected: ty.length,
                actual: index + 1,
            });
        }
        if let Some(constant) = self.access.constant()? {
            return Ok(P::from_scalar(constant_element(constant, index)));
        }
        if !self.access.in_acting_version() {
            return Ok(P::from_scalar(ty.null()));
        }
        self.access.cursor.get(self.access.offset + index * P::SIZE)
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>, P: Primitive> ArrayField<'a, B, P> {
    /// Write all elements; `values` must match the declared length
    ///
    /// On a constant field this only checks that `values` equal the constant.
    pub fn set_value(&mut self, values: &[P]) -> Result<()> {
        let ty = self.checked_type()?;
        if let Some(constant) = self.access.constant()? {
            let matches = values.len() == ty.length
                && values.iter().enumerate().all(|(index, value)| {
                    ty.primitive
                        .equal(value.into_scalar(), constant_element(constant, index))
                });
            if matches {
                return Ok(());
            }
            return Err(constant_mismatch(self.access.field));
        }
        self.access.ensure_in_version()?;
        if values.len() != ty.length {
            return Err(Error::LengthMismatch {
                field: self.access.field.name,
                expected: ty.length,
                actual: values.len(),
            });
        }
        let dst = self
            .access
            .cursor
            .bytes_mut(self.access.offset, ty.encoded_length())?;
        for (slot, value) in dst.chunks_exact_mut(P::SIZE).zip(values) {
            value.write_le(slot);
        }
        Ok(())
    }

    /// Write the element at `index`
    pub fn set(&mut self, index: usize, value: P) -> Result<()> {
        let ty = self.checked_type()?;
        self.access.ensure_in_version()?;
        if index >= ty.length {
            return Err(Error::LengthMismatch {
                field: self.access.field.name,
                expected: ty.length,
                actual: index + 1,
            });
        }
        if let Some(constant) = self.access.constant()? {
            if ty.primitive.equal(value.into_scalar(), constant_element(constant, index)) {
                return Ok(());
            }
            return Err(constant_mismatch(self.access.field));
        }
        self.access
            .cursor
            .put(self.access.offset + index * P::SIZE, value)
    }

    /// Fill every element with the null sentinel
    #[inline]
    pub fn reset(&mut self) -> Result<()> {
        self.access.reset()
    }
}
