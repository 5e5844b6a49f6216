//! The Generation 3 pk3 format.
//!
//! A pk3 is a 32 byte header followed by 48 bytes of data split into four
//! 12 byte substructures. On disk the substructures are permuted by
//! `PID % 24`, checksummed, and XOR-encrypted with `PID ^ OT ID`. Party
//! Pokémon carry 20 more bytes of battle stats after that.
//!
//! Porters work on [`Pk3Data`], which always holds the substructures in
//! their canonical order; [`shuffle`] and [`unshuffle`] convert between it
//! and the on-disk order.

pub mod charset;
pub mod exporter;
pub mod importer;
pub mod layout;
pub mod pid;
pub mod ribbons;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{PortError, PortResult};
use crate::field::{ArrayField, BitArray, BitField, BufferArrayField, BufferField, Field};

pub use exporter::Pk3Exporter;
pub use importer::Pk3Importer;

pub const FORMAT: &str = "pk3";

pub const PK3_SIZE_PARTY: usize = 100;
pub const PK3_SIZE_BOX: usize = 80;
const SUBSTRUCTURE_OFFSET: usize = 32;
const SUBSTRUCTURE_SIZE: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Substructure {
    Growth,
    Attacks,
    EvsConditions,
    Miscellaneous,
}

impl Substructure {
    pub const ALL: [Substructure; 4] = [
        Substructure::Growth,
        Substructure::Attacks,
        Substructure::EvsConditions,
        Substructure::Miscellaneous,
    ];

    fn canonical_offset(&self) -> usize {
        SUBSTRUCTURE_SIZE * (*self as usize)
    }
}

/// Offset of a substructure from the start of the data region once it has
/// been shuffled for `personality_value`.
pub fn get_offset_for_substructure(personality_value: u32, component: Substructure) -> usize {
    match (component, personality_value % 24) {
        (Substructure::Growth, 0..=5) => 0,
        (Substructure::Growth, 6 | 7 | 12 | 13 | 18 | 19) => SUBSTRUCTURE_SIZE,
        (Substructure::Growth, 8 | 10 | 14 | 16 | 20 | 22) => SUBSTRUCTURE_SIZE * 2,
        (Substructure::Growth, _) => SUBSTRUCTURE_SIZE * 3,
        (Substructure::Attacks, 6..=11) => 0,
        (Substructure::Attacks, 0 | 1 | 14 | 15 | 20 | 21) => SUBSTRUCTURE_SIZE,
        (Substructure::Attacks, 2 | 4 | 12 | 17 | 18 | 23) => SUBSTRUCTURE_SIZE * 2,
        (Substructure::Attacks, _) => SUBSTRUCTURE_SIZE * 3,
        (Substructure::EvsConditions, 12..=17) => 0,
        (Substructure::EvsConditions, 2 | 3 | 8 | 9 | 22 | 23) => SUBSTRUCTURE_SIZE,
        (Substructure::EvsConditions, 0 | 5 | 6 | 11 | 19 | 21) => SUBSTRUCTURE_SIZE * 2,
        (Substructure::EvsConditions, _) => SUBSTRUCTURE_SIZE * 3,
        (Substructure::Miscellaneous, 18..=23) => 0,
        (Substructure::Miscellaneous, 4 | 5 | 10 | 11 | 16 | 17) => SUBSTRUCTURE_SIZE,
        (Substructure::Miscellaneous, 1 | 3 | 7 | 9 | 13 | 15) => SUBSTRUCTURE_SIZE * 2,
        (Substructure::Miscellaneous, _) => SUBSTRUCTURE_SIZE * 3,
    }
}

/// Position in the on-disk layout of byte `index` of the canonical layout.
pub fn physical_index(index: usize, personality_value: u32, len: usize) -> Option<usize> {
    if index >= len {
        return None;
    }
    let data = SUBSTRUCTURE_OFFSET..SUBSTRUCTURE_OFFSET + 4 * SUBSTRUCTURE_SIZE;
    if !data.contains(&index) {
        return Some(index);
    }
    let relative = index - SUBSTRUCTURE_OFFSET;
    let component = Substructure::ALL[relative / SUBSTRUCTURE_SIZE];
    Some(
        SUBSTRUCTURE_OFFSET
            + get_offset_for_substructure(personality_value, component)
            + relative % SUBSTRUCTURE_SIZE,
    )
}

/// Canonical to on-disk substructure order.
pub fn shuffle(canonical: &[u8], personality_value: u32) -> Vec<u8> {
    let mut shuffled = canonical.to_vec();
    for component in Substructure::ALL {
        let from = SUBSTRUCTURE_OFFSET + component.canonical_offset();
        let to = SUBSTRUCTURE_OFFSET + get_offset_for_substructure(personality_value, component);
        shuffled[to..to + SUBSTRUCTURE_SIZE].copy_from_slice(&canonical[from..from + SUBSTRUCTURE_SIZE]);
    }
    shuffled
}

/// On-disk to canonical substructure order.
pub fn unshuffle(shuffled: &[u8], personality_value: u32) -> Vec<u8> {
    let mut canonical = shuffled.to_vec();
    for component in Substructure::ALL {
        let from = SUBSTRUCTURE_OFFSET + get_offset_for_substructure(personality_value, component);
        let to = SUBSTRUCTURE_OFFSET + component.canonical_offset();
        canonical[to..to + SUBSTRUCTURE_SIZE].copy_from_slice(&shuffled[from..from + SUBSTRUCTURE_SIZE]);
    }
    canonical
}

/// XORs the data region with `PID ^ OT ID`, read from the header. The same
/// call encrypts and decrypts.
pub fn encrypt_decrypt_pk3(pk3_data: &mut [u8]) {
    let personality_value = LittleEndian::read_u32(&pk3_data[0..4]);
    let original_trainer_id = LittleEndian::read_u32(&pk3_data[4..8]);
    let mut key = [0u8; 4];
    LittleEndian::write_u32(&mut key, personality_value ^ original_trainer_id);

    for chunk in pk3_data[SUBSTRUCTURE_OFFSET..PK3_SIZE_BOX].chunks_exact_mut(4) {
        chunk.iter_mut().zip(key).for_each(|(byte, key)| *byte ^= key);
    }
}

/// Wrapping sum of the 24 little-endian half-words of the decrypted data.
pub fn compute_checksum(pk3_unencrypted_data_region: &[u8]) -> u16 {
    pk3_unencrypted_data_region
        .chunks_exact(2)
        .map(LittleEndian::read_u16)
        .fold(0u16, u16::wrapping_add)
}

/// An unencrypted pk3 in canonical substructure order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pk3Data {
    buf: Vec<u8>,
}

impl Pk3Data {
    pub fn new(party: bool) -> Self {
        let len = if party { PK3_SIZE_PARTY } else { PK3_SIZE_BOX };
        Pk3Data { buf: vec![0u8; len] }
    }

    /// Decrypts and unshuffles an on-disk pk3. Also returns whether the
    /// stored checksum matched.
    pub fn from_pk3(pk3: &[u8]) -> PortResult<(Self, bool)> {
        if pk3.len() != PK3_SIZE_BOX && pk3.len() != PK3_SIZE_PARTY {
            return Err(PortError::Infeasible(format!(
                "a pk3 is {PK3_SIZE_BOX} or {PK3_SIZE_PARTY} bytes long, this one is {}",
                pk3.len()
            )));
        }
        let mut decrypted = pk3.to_vec();
        encrypt_decrypt_pk3(&mut decrypted);
        let checksum = compute_checksum(&decrypted[SUBSTRUCTURE_OFFSET..PK3_SIZE_BOX]);
        let stored = LittleEndian::read_u16(&decrypted[0x1c..0x1e]);
        let personality_value = LittleEndian::read_u32(&decrypted[0..4]);
        let buf = unshuffle(&decrypted, personality_value);
        Ok((Pk3Data { buf }, checksum == stored))
    }

    pub fn is_party(&self) -> bool {
        self.buf.len() == PK3_SIZE_PARTY
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn field(&mut self, tag: &str, desc: BitField) -> PortResult<BufferField<'_>> {
        BufferField::new(&mut self.buf, desc).map_err(|err| PortError::field(tag, err))
    }

    pub fn array(&mut self, tag: &str, desc: BitArray) -> PortResult<BufferArrayField<'_>> {
        BufferArrayField::new(&mut self.buf, desc).map_err(|err| PortError::field(tag, err))
    }

    pub fn set(&mut self, tag: &str, desc: BitField, value: u64) -> PortResult<()> {
        self.field(tag, desc)?
            .set(value)
            .map_err(|err| PortError::field(tag, err))
    }

    pub fn set_all(&mut self, tag: &str, desc: BitArray, values: &[u64]) -> PortResult<()> {
        self.array(tag, desc)?
            .set_all(values)
            .map_err(|err| PortError::field(tag, err))
    }

    /// Reads a value, or 0 for a party-only field of a boxed pk3.
    pub fn get(&self, desc: BitField) -> u64 {
        desc.read(&self.buf).unwrap_or_default()
    }

    pub fn get_all(&self, desc: BitArray) -> Vec<u64> {
        (0..desc.len)
            .filter_map(|idx| desc.element(idx))
            .map(|field| self.get(field))
            .collect()
    }

    pub fn bytes(&self, start: usize, len: usize) -> &[u8] {
        &self.buf[start..start + len]
    }

    pub fn write_bytes(&mut self, start: usize, bytes: &[u8]) {
        self.buf[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn personality_value(&self) -> u32 {
        self.get(layout::PID) as u32
    }

    /// Shuffles, checksums, and encrypts. `patch` runs on the shuffled,
    /// still unencrypted bytes before the checksum is taken.
    pub fn to_pk3(&self, patch: impl FnOnce(&mut [u8])) -> Vec<u8> {
        let mut pk3 = shuffle(&self.buf, self.personality_value());
        patch(&mut pk3);
        let checksum = compute_checksum(&pk3[SUBSTRUCTURE_OFFSET..PK3_SIZE_BOX]);
        LittleEndian::write_u16(&mut pk3[0x1c..0x1e], checksum);
        encrypt_decrypt_pk3(&mut pk3);
        pk3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substructure_orders_are_permutations() {
        for pid in 0..24u32 {
            let mut offsets: Vec<usize> = Substructure::ALL
                .iter()
                .map(|component| get_offset_for_substructure(pid, *component))
                .collect();
            offsets.sort_unstable();
            assert_eq!(offsets, vec![0, 12, 24, 36], "PID % 24 == {pid}");
        }
    }

    #[test]
    fn shuffle_round_trip() {
        let canonical: Vec<u8> = (0..PK3_SIZE_BOX as u8).collect();
        for pid in [0u32, 5, 13, 23, 0xdead_beef] {
            let shuffled = shuffle(&canonical, pid);
            assert_eq!(unshuffle(&shuffled, pid), canonical);
            for idx in 0..PK3_SIZE_BOX {
                let physical = physical_index(idx, pid, PK3_SIZE_BOX).unwrap();
                assert_eq!(shuffled[physical], canonical[idx]);
            }
        }
    }

    #[test]
    fn known_orders() {
        // PID % 24 == 1 is GAME
        assert_eq!(get_offset_for_substructure(1, Substructure::Attacks), 12);
        assert_eq!(get_offset_for_substructure(1, Substructure::Miscellaneous), 24);
        assert_eq!(get_offset_for_substructure(1, Substructure::EvsConditions), 36);
        // PID % 24 == 23 is MEAG
        assert_eq!(get_offset_for_substructure(23, Substructure::Miscellaneous), 0);
        assert_eq!(get_offset_for_substructure(23, Substructure::EvsConditions), 12);
        assert_eq!(get_offset_for_substructure(23, Substructure::Attacks), 24);
        assert_eq!(get_offset_for_substructure(23, Substructure::Growth), 36);
    }
}
