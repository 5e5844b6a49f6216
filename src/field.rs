//! Bounded value holders.
//!
//! Every field has the same contract (`get`/`set`, with `set` failing
//! rather than clamping when a value is out of bounds) whatever is behind
//! it: a plain value, a window into a byte buffer, or a pair of closures.
//!
//! Byte-backed fields are split in two: a [`BitField`] descriptor which is
//! just a position, and a short-lived [`BufferField`] view which borrows the
//! buffer it reads and writes. Many descriptors can describe one buffer
//! without any of them owning it.

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FieldError;

pub trait Field<T> {
    fn get(&self) -> T;
    fn set(&mut self, value: T) -> Result<(), FieldError>;
}

pub trait IntField: Field<u64> {
    fn min(&self) -> u64;
    fn max(&self) -> u64;

    fn check(&self, value: u64) -> Result<(), FieldError> {
        if value < self.min() || value > self.max() {
            Err(FieldError::OutOfBounds {
                value,
                min: self.min(),
                max: self.max(),
            })
        } else {
            Ok(())
        }
    }
}

/// A fixed-length sequence of integer fields.
pub trait ArrayField {
    fn len(&self) -> usize;
    fn min(&self) -> u64;
    fn max(&self) -> u64;
    fn get_at(&self, index: usize) -> Result<u64, FieldError>;
    fn set_at(&mut self, index: usize, value: u64) -> Result<(), FieldError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_all(&self) -> Vec<u64> {
        (0..self.len()).filter_map(|idx| self.get_at(idx).ok()).collect()
    }

    fn set_all(&mut self, values: &[u64]) -> Result<(), FieldError> {
        if values.len() != self.len() {
            return Err(FieldError::Length {
                expected: self.len(),
                found: values.len(),
            });
        }
        // Check everything first so a failed set leaves the array untouched
        if let Some(value) = values.iter().find(|v| **v < self.min() || **v > self.max()) {
            return Err(FieldError::OutOfBounds {
                value: *value,
                min: self.min(),
                max: self.max(),
            });
        }
        values
            .iter()
            .enumerate()
            .try_for_each(|(idx, value)| self.set_at(idx, *value))
    }
}

/// Position of an unsigned little-endian value inside a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub byte: usize,
    pub bit: u8,
    pub bits: u8,
}

impl BitField {
    /// A whole-byte field of `len` bytes.
    pub const fn bytes(byte: usize, len: u8) -> Self {
        BitField {
            byte,
            bit: 0,
            bits: len * 8,
        }
    }

    /// `bits` bits starting at bit `bit` of byte `byte`.
    pub const fn bits(byte: usize, bit: u8, bits: u8) -> Self {
        BitField { byte, bit, bits }
    }

    /// Same field moved `offset` bytes further into the buffer.
    pub const fn shifted(self, offset: usize) -> Self {
        BitField {
            byte: self.byte + offset,
            bit: self.bit,
            bits: self.bits,
        }
    }

    pub const fn max_value(&self) -> u64 {
        if self.bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    /// Whether the field can be read from/written to at all. Bits must fit
    /// in one 64 bit window after the starting bit offset.
    pub fn is_well_formed(&self) -> bool {
        self.bits > 0 && self.bit < 8 && (self.bit as u32 + self.bits as u32) <= 64
    }

    /// Bytes touched by this field.
    pub fn span(&self) -> Range<usize> {
        let len = (self.bit as usize + self.bits as usize).div_ceil(8);
        self.byte..self.byte.saturating_add(len)
    }

    pub fn fits(&self, buffer_len: usize) -> bool {
        self.is_well_formed() && self.span().end <= buffer_len
    }

    fn ensure_fits(&self, buffer_len: usize) -> Result<(), FieldError> {
        if self.fits(buffer_len) {
            Ok(())
        } else {
            Err(FieldError::Index {
                index: self.span().end.saturating_sub(1),
                len: buffer_len,
            })
        }
    }

    pub fn read(&self, buf: &[u8]) -> Result<u64, FieldError> {
        self.ensure_fits(buf.len())?;
        let span = self.span();
        let nbytes = span.len();
        let raw = LittleEndian::read_uint(&buf[span], nbytes);
        Ok((raw >> self.bit) & self.max_value())
    }

    /// Writes `value` into the bit range, leaving every other bit alone.
    pub fn write(&self, buf: &mut [u8], value: u64) -> Result<(), FieldError> {
        self.ensure_fits(buf.len())?;
        if value > self.max_value() {
            return Err(FieldError::OutOfBounds {
                value,
                min: 0,
                max: self.max_value(),
            });
        }
        let span = self.span();
        let nbytes = span.len();
        let window = &mut buf[span];
        let raw = LittleEndian::read_uint(window, nbytes);
        let mask = self.max_value() << self.bit;
        let raw = (raw & !mask) | (value << self.bit);
        LittleEndian::write_uint(window, raw, nbytes);
        Ok(())
    }
}

/// A run of equally spaced [`BitField`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitArray {
    pub first: BitField,
    pub stride_bits: usize,
    pub len: usize,
}

impl BitArray {
    /// `len` elements of `size` bytes each, packed back to back.
    pub const fn bytes(byte: usize, size: u8, len: usize) -> Self {
        BitArray {
            first: BitField::bytes(byte, size),
            stride_bits: size as usize * 8,
            len,
        }
    }

    /// `len` elements of `bits` bits each, packed back to back.
    pub const fn bits(byte: usize, bit: u8, bits: u8, len: usize) -> Self {
        BitArray {
            first: BitField::bits(byte, bit, bits),
            stride_bits: bits as usize,
            len,
        }
    }

    pub const fn shifted(self, offset: usize) -> Self {
        BitArray {
            first: self.first.shifted(offset),
            stride_bits: self.stride_bits,
            len: self.len,
        }
    }

    pub fn element(&self, index: usize) -> Option<BitField> {
        if index >= self.len {
            return None;
        }
        let absolute = self
            .first
            .byte
            .checked_mul(8)?
            .checked_add(self.first.bit as usize)?
            .checked_add(index.checked_mul(self.stride_bits)?)?;
        Some(BitField {
            byte: absolute / 8,
            bit: (absolute % 8) as u8,
            bits: self.first.bits,
        })
    }

    fn element_or_err(&self, index: usize) -> Result<BitField, FieldError> {
        self.element(index).ok_or(FieldError::Index {
            index,
            len: self.len,
        })
    }
}

/// Live view of one [`BitField`] in a borrowed buffer.
pub struct BufferField<'a> {
    buf: &'a mut [u8],
    desc: BitField,
    min: u64,
    max: u64,
}

impl<'a> BufferField<'a> {
    pub fn new(buf: &'a mut [u8], desc: BitField) -> Result<Self, FieldError> {
        desc.ensure_fits(buf.len())?;
        Ok(BufferField {
            buf,
            desc,
            min: 0,
            max: desc.max_value(),
        })
    }

    /// Narrows the bounds below what the bit width allows.
    pub fn bounded(mut self, min: u64, max: u64) -> Self {
        self.min = min;
        self.max = max.min(self.desc.max_value());
        self
    }
}

impl Field<u64> for BufferField<'_> {
    fn get(&self) -> u64 {
        // The descriptor was checked against the buffer when the view was made
        self.desc.read(self.buf).unwrap_or_default()
    }

    fn set(&mut self, value: u64) -> Result<(), FieldError> {
        self.check(value)?;
        self.desc.write(self.buf, value)
    }
}

impl IntField for BufferField<'_> {
    fn min(&self) -> u64 {
        self.min
    }

    fn max(&self) -> u64 {
        self.max
    }
}

/// Live view of a [`BitArray`] in a borrowed buffer.
pub struct BufferArrayField<'a> {
    buf: &'a mut [u8],
    desc: BitArray,
    min: u64,
    max: u64,
}

impl<'a> BufferArrayField<'a> {
    pub fn new(buf: &'a mut [u8], desc: BitArray) -> Result<Self, FieldError> {
        if desc.len > 0 {
            desc.element_or_err(desc.len - 1)?.ensure_fits(buf.len())?;
        }
        Ok(BufferArrayField {
            buf,
            desc,
            min: 0,
            max: desc.first.max_value(),
        })
    }

    pub fn bounded(mut self, min: u64, max: u64) -> Self {
        self.min = min;
        self.max = max.min(self.desc.first.max_value());
        self
    }
}

impl ArrayField for BufferArrayField<'_> {
    fn len(&self) -> usize {
        self.desc.len
    }

    fn min(&self) -> u64 {
        self.min
    }

    fn max(&self) -> u64 {
        self.max
    }

    fn get_at(&self, index: usize) -> Result<u64, FieldError> {
        self.desc.element_or_err(index)?.read(self.buf)
    }

    fn set_at(&mut self, index: usize, value: u64) -> Result<(), FieldError> {
        if value < self.min || value > self.max {
            return Err(FieldError::OutOfBounds {
                value,
                min: self.min,
                max: self.max,
            });
        }
        self.desc.element_or_err(index)?.write(self.buf, value)
    }
}

/// Unbounded plain value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory<T> {
    value: T,
}

impl<T> Memory<T> {
    pub fn new(value: T) -> Self {
        Memory { value }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Clone> Field<T> for Memory<T> {
    fn get(&self) -> T {
        self.value.clone()
    }

    fn set(&mut self, value: T) -> Result<(), FieldError> {
        self.value = value;
        Ok(())
    }
}

/// Bounded integer held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryField {
    value: u64,
    min: u64,
    max: u64,
}

impl MemoryField {
    /// Panics if `value` is outside of `[min, max]`; the initial value is a
    /// constant chosen by the format.
    pub fn new(value: u64, min: u64, max: u64) -> Self {
        assert!(min <= value && value <= max, "initial value out of bounds");
        MemoryField { value, min, max }
    }
}

impl Field<u64> for MemoryField {
    fn get(&self) -> u64 {
        self.value
    }

    fn set(&mut self, value: u64) -> Result<(), FieldError> {
        self.check(value)?;
        self.value = value;
        Ok(())
    }
}

impl IntField for MemoryField {
    fn min(&self) -> u64 {
        self.min
    }

    fn max(&self) -> u64 {
        self.max
    }
}

/// Fixed-length bounded integers held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryArrayField {
    values: Vec<u64>,
    min: u64,
    max: u64,
}

impl MemoryArrayField {
    pub fn new(len: usize, initial: u64, min: u64, max: u64) -> Self {
        assert!(min <= initial && initial <= max, "initial value out of bounds");
        MemoryArrayField {
            values: vec![initial; len],
            min,
            max,
        }
    }
}

impl ArrayField for MemoryArrayField {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn min(&self) -> u64 {
        self.min
    }

    fn max(&self) -> u64 {
        self.max
    }

    fn get_at(&self, index: usize) -> Result<u64, FieldError> {
        self.values.get(index).copied().ok_or(FieldError::Index {
            index,
            len: self.values.len(),
        })
    }

    fn set_at(&mut self, index: usize, value: u64) -> Result<(), FieldError> {
        if value < self.min || value > self.max {
            return Err(FieldError::OutOfBounds {
                value,
                min: self.min,
                max: self.max,
            });
        }
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(FieldError::Index { index, len })?;
        *slot = value;
        Ok(())
    }
}

/// A field whose storage lives elsewhere and is reached through closures.
pub struct LambdaField<'a, T> {
    getter: Box<dyn Fn() -> T + 'a>,
    setter: Option<Box<dyn FnMut(T) + 'a>>,
    min: u64,
    max: u64,
}

impl<'a, T> LambdaField<'a, T> {
    pub fn new<G, S>(getter: G, setter: S) -> Self
    where
        G: Fn() -> T + 'a,
        S: FnMut(T) + 'a,
    {
        LambdaField {
            getter: Box::new(getter),
            setter: Some(Box::new(setter)),
            min: 0,
            max: u64::MAX,
        }
    }

    /// A derived value that can be read but not written.
    pub fn read_only<G>(getter: G) -> Self
    where
        G: Fn() -> T + 'a,
    {
        LambdaField {
            getter: Box::new(getter),
            setter: None,
            min: 0,
            max: u64::MAX,
        }
    }

    pub fn bounded(mut self, min: u64, max: u64) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

impl<T> Field<T> for LambdaField<'_, T>
where
    T: Copy + Into<u64>,
{
    fn get(&self) -> T {
        (self.getter)()
    }

    fn set(&mut self, value: T) -> Result<(), FieldError> {
        let raw: u64 = value.into();
        if raw < self.min || raw > self.max {
            return Err(FieldError::OutOfBounds {
                value: raw,
                min: self.min,
                max: self.max,
            });
        }
        match self.setter.as_mut() {
            Some(setter) => {
                setter(value);
                Ok(())
            }
            None => Err(FieldError::ReadOnly),
        }
    }
}

impl IntField for LambdaField<'_, u64> {
    fn min(&self) -> u64 {
        self.min
    }

    fn max(&self) -> u64 {
        self.max
    }
}

/// Wraps an integer field with conversions applied on the way in and out.
/// Bounds are those of the outer (converted) value.
pub struct Transformed<F> {
    inner: F,
    on_get: fn(u64) -> u64,
    on_set: fn(u64) -> u64,
    min: u64,
    max: u64,
}

impl<F: IntField> Transformed<F> {
    pub fn new(inner: F, on_get: fn(u64) -> u64, on_set: fn(u64) -> u64, min: u64, max: u64) -> Self {
        Transformed {
            inner,
            on_get,
            on_set,
            min,
            max,
        }
    }
}

impl<F: IntField> Field<u64> for Transformed<F> {
    fn get(&self) -> u64 {
        (self.on_get)(self.inner.get())
    }

    fn set(&mut self, value: u64) -> Result<(), FieldError> {
        self.check(value)?;
        self.inner.set((self.on_set)(value))
    }
}

impl<F: IntField> IntField for Transformed<F> {
    fn min(&self) -> u64 {
        self.min
    }

    fn max(&self) -> u64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_writes_leave_neighbours_alone() {
        let mut buf = [0xffu8; 4];
        let field = BitField::bits(1, 3, 5);
        field.write(&mut buf, 0).unwrap();
        assert_eq!(buf, [0xff, 0b0000_0111, 0xff, 0xff]);
        field.write(&mut buf, 0b10101).unwrap();
        assert_eq!(field.read(&buf).unwrap(), 0b10101);
        assert_eq!(buf[0], 0xff);
        assert_eq!(buf[2], 0xff);
    }

    #[test]
    fn straddling_bit_field() {
        let mut buf = [0u8; 4];
        let field = BitField::bits(0, 6, 5);
        field.write(&mut buf, 0b11111).unwrap();
        assert_eq!(buf, [0b1100_0000, 0b0000_0111, 0, 0]);
    }

    #[test]
    fn field_out_of_buffer() {
        let buf = [0u8; 2];
        assert!(BitField::bytes(1, 2).read(&buf).is_err());
        assert!(BitField::bits(0, 7, 58).read(&buf).is_err());
    }

    #[test]
    fn bit_array_elements() {
        let ivs = BitArray::bits(4, 0, 5, 6);
        assert_eq!(ivs.element(0), Some(BitField::bits(4, 0, 5)));
        assert_eq!(ivs.element(2), Some(BitField::bits(5, 2, 5)));
        assert_eq!(ivs.element(5), Some(BitField::bits(7, 1, 5)));
        assert_eq!(ivs.element(6), None);
    }
}
