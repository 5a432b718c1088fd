//! Bounds-checked buffer access with a single running position
//!
//! A [`Cursor`] owns (or borrows, depending on `B`) the message buffer, the
//! declared buffer length, the running position used by groups and
//! variable-length data, and the acting schema version. Fixed fields are read
//! and written at absolute offsets without moving the position.

use crate::error::{Error, Result};
use crate::primitive::{Primitive, PrimitiveType, Scalar};

/// Buffer, length bound, position and acting version of one message traversal
#[derive(Debug)]
pub struct Cursor<B> {
    buf: B,
    limit: usize,
    position: usize,
    acting_version: u16,
}

#[inline]
fn too_short(required: usize, limit: usize) -> Error {
    tracing::debug!(required, limit, "buffer too short");
    Error::BufferTooShort { required, limit }
}

impl<B> Cursor<B> {
    /// Current position
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Declared buffer length
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes left between the position and the limit
    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Schema version the buffer is interpreted with
    #[inline]
    pub fn acting_version(&self) -> u16 {
        self.acting_version
    }

    /// Borrow the underlying buffer
    #[inline]
    pub fn buffer(&self) -> &B {
        &self.buf
    }

    /// Give the underlying buffer back
    #[inline]
    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Verify `offset..offset + len` lies inside the limit, returning the end
    #[inline]
    pub fn check(&self, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.limit => Ok(end),
            Some(end) => Err(too_short(end, self.limit)),
            None => Err(too_short(usize::MAX, self.limit)),
        }
    }

    /// Move the position forward by `n` bytes, returning the previous position
    ///
    /// The position is left untouched when the advance would cross the limit.
    #[inline]
    pub fn advance(&mut self, n: usize) -> Result<usize> {
        let start = self.position;
        self.position = self.check(start, n)?;
        Ok(start)
    }

    /// Reset the position to `position`, discarding the current traversal
    #[inline]
    pub(crate) fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(too_short(position, self.limit));
        }
        self.position = position;
        Ok(())
    }
}

impl<B: AsRef<[u8]>> Cursor<B> {
    /// Bind `buf` with declared `length`, starting at `position`
    ///
    /// `length` may not exceed the buffer and `position` may not exceed `length`.
    pub fn new(buf: B, length: usize, position: usize, acting_version: u16) -> Result<Self> {
        let available = buf.as_ref().len();
        if length > available {
            return Err(too_short(length, available));
        }
        if position > length {
            return Err(too_short(position, length));
        }

        Ok(Self {
            buf,
            limit: length,
            position,
            acting_version,
        })
    }

    /// Borrow `len` bytes at `offset`
    #[inline]
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = self.check(offset, len)?;
        Ok(&self.buf.as_ref()[offset..end])
    }

    /// Read a typed primitive at `offset`
    #[inline]
    pub fn get<P: Primitive>(&self, offset: usize) -> Result<P> {
        self.bytes(offset, P::SIZE).map(P::read_le)
    }

    /// Read a primitive of runtime type `primitive` at `offset`
    #[inline]
    pub fn get_scalar(&self, offset: usize, primitive: PrimitiveType) -> Result<Scalar> {
        self.bytes(offset, primitive.size())
            .map(|src| primitive.read(src))
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Cursor<B> {
    /// Mutably borrow `len` bytes at `offset`
    #[inline]
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        let end = self.check(offset, len)?;
        Ok(&mut self.buf.as_mut()[offset..end])
    }

    /// Write a typed primitive at `offset`
    #[inline]
    pub fn put<P: Primitive>(&mut self, offset: usize, value: P) -> Result<()> {
        value.write_le(self.bytes_mut(offset, P::SIZE)?);
        Ok(())
    }

    /// Write a primitive of runtime type `primitive` at `offset`
    #[inline]
    pub fn put_scalar(&mut self, offset: usize, primitive: PrimitiveType, value: Scalar) -> Result<()> {
        primitive.write(self.bytes_mut(offset, primitive.size())?, value);
        Ok(())
    }
}
