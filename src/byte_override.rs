use serde::{Deserialize, Serialize};

use crate::error::{PortError, PortResult};
use crate::field::{BitArray, BitField};

/// Maps a byte index in a format's virtual layout to its index in the
/// physical buffer.
pub type Remap<'a> = &'a dyn Fn(usize) -> Option<usize>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Literal(u64),
    Array(Vec<u64>),
}

/// A hand-written patch applied to a format's bytes after every tag has
/// been written.
///
/// Byte mode writes `Length`-byte little-endian values (default 1); bit
/// mode (`Bit` and `Bits` both set) writes `Bits`-wide values starting at
/// bit `Bit` of `Byte`. An array value writes consecutive elements. With
/// `Virtual` set, `Byte` indexes the format's virtual layout and is
/// remapped to the physical one before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteOverrideCommand {
    #[serde(rename = "Byte")]
    pub byte: usize,
    #[serde(rename = "Bit", default, skip_serializing_if = "Option::is_none")]
    pub bit: Option<u8>,
    #[serde(rename = "Bits", default, skip_serializing_if = "Option::is_none")]
    pub bits: Option<u8>,
    #[serde(rename = "Length", default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u8>,
    #[serde(rename = "Value")]
    pub value: OverrideValue,
    #[serde(rename = "Virtual", default, skip_serializing_if = "std::ops::Not::not")]
    pub virtual_index: bool,
}

impl ByteOverrideCommand {
    pub fn bytes(byte: usize, length: u8, value: u64) -> Self {
        ByteOverrideCommand {
            byte,
            bit: None,
            bits: None,
            length: Some(length),
            value: OverrideValue::Literal(value),
            virtual_index: false,
        }
    }

    pub fn byte_array(byte: usize, values: Vec<u64>) -> Self {
        ByteOverrideCommand {
            byte,
            bit: None,
            bits: None,
            length: None,
            value: OverrideValue::Array(values),
            virtual_index: false,
        }
    }

    pub fn bit_range(byte: usize, bit: u8, bits: u8, value: u64) -> Self {
        ByteOverrideCommand {
            byte,
            bit: Some(bit),
            bits: Some(bits),
            length: None,
            value: OverrideValue::Literal(value),
            virtual_index: false,
        }
    }

    pub fn with_virtual_index(mut self) -> Self {
        self.virtual_index = true;
        self
    }

    fn layout(&self, byte: usize) -> PortResult<BitArray> {
        let count = match &self.value {
            OverrideValue::Literal(_) => 1,
            OverrideValue::Array(values) => values.len(),
        };
        let array = match (self.bit, self.bits, self.length) {
            (Some(bit), Some(bits), None) => BitArray::bits(byte, bit, bits, count),
            (None, None, length) => {
                let length = length.unwrap_or(1);
                if !(1..=8).contains(&length) {
                    return Err(PortError::InvalidOverride(format!(
                        "length {length} must be between 1 and 8 bytes"
                    )));
                }
                BitArray::bytes(byte, length, count)
            }
            _ => {
                return Err(PortError::InvalidOverride(String::from(
                    "either both Bit and Bits, or neither, must be given, and never with Length",
                )))
            }
        };
        if !array.first.is_well_formed() {
            return Err(PortError::InvalidOverride(format!(
                "bit {} with width {} does not describe a valid bit range",
                array.first.bit, array.first.bits
            )));
        }
        Ok(array)
    }

    fn values(&self) -> Vec<u64> {
        match &self.value {
            OverrideValue::Literal(value) => vec![*value],
            OverrideValue::Array(values) => values.clone(),
        }
    }

    /// Checks the command against a buffer of `buffer_len` bytes and returns
    /// the element writes it stands for, in physical positions.
    pub fn validate(
        &self,
        buffer_len: usize,
        remap: Option<Remap<'_>>,
    ) -> PortResult<Vec<(BitField, u64)>> {
        if self.byte >= buffer_len {
            return Err(PortError::InvalidOverride(format!(
                "byte {} is outside of a {buffer_len} byte buffer",
                self.byte
            )));
        }
        let virtual_layout = self.layout(self.byte)?;
        let values = self.values();
        if values.is_empty() {
            return Err(PortError::InvalidOverride(String::from("no values given")));
        }

        let physical_start = if self.virtual_index {
            let remap = remap.ok_or_else(|| {
                PortError::InvalidOverride(String::from(
                    "this format has no virtual layout to remap from",
                ))
            })?;
            let last = values.len() - 1;
            let virtual_span = virtual_layout
                .element(0)
                .map(|first| first.span().start)
                .unwrap_or(self.byte)
                ..virtual_layout
                    .element(last)
                    .map(|field| field.span().end)
                    .unwrap_or(self.byte);
            let mut physical = virtual_span.clone().map(|idx| remap(idx));
            let start = physical.next().flatten().ok_or_else(|| {
                PortError::InvalidOverride(format!("virtual byte {} has no physical position", self.byte))
            })?;
            // Every byte in the span has to land right after the previous one
            for (offset, mapped) in physical.enumerate() {
                if mapped != Some(start + offset + 1) {
                    return Err(PortError::InvalidOverride(format!(
                        "virtual bytes {}..{} are not contiguous once remapped",
                        virtual_span.start, virtual_span.end
                    )));
                }
            }
            start
        } else {
            self.byte
        };

        let layout = self.layout(physical_start)?;
        values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                let field = layout
                    .element(idx)
                    .ok_or_else(|| PortError::InvalidOverride(format!("no element {idx}")))?;
                if !field.fits(buffer_len) {
                    return Err(PortError::InvalidOverride(format!(
                        "bytes {}..{} are outside of a {buffer_len} byte buffer",
                        field.span().start,
                        field.span().end
                    )));
                }
                if value > field.max_value() {
                    return Err(PortError::InvalidOverride(format!(
                        "value {value} does not fit in {} bits",
                        field.bits
                    )));
                }
                Ok((field, value))
            })
            .collect()
    }

    pub fn apply(&self, buf: &mut [u8], remap: Option<Remap<'_>>) -> PortResult<()> {
        let writes = self.validate(buf.len(), remap)?;
        for (field, value) in writes {
            field
                .write(buf, value)
                .map_err(|err| PortError::field("Byte Override", err))?;
        }
        log::debug!("Applied byte override at byte {}", self.byte);
        Ok(())
    }
}
