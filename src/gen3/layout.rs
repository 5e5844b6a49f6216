//! Positions of every pk3 value, in the unshuffled layout where the four
//! substructures sit in Growth, Attacks, EVs/Condition, Misc order.

use crate::field::{BitArray, BitField};

pub const PID: BitField = BitField::bytes(0x00, 4);
pub const TID: BitField = BitField::bytes(0x04, 2);
pub const SID: BitField = BitField::bytes(0x06, 2);
pub const NICKNAME: usize = 0x08;
pub const NICKNAME_BYTES: usize = 10;
pub const LANGUAGE: BitField = BitField::bytes(0x12, 1);
pub const IS_BAD_EGG: BitField = BitField::bits(0x13, 0, 1);
pub const HAS_SPECIES: BitField = BitField::bits(0x13, 1, 1);
pub const USE_EGG_NAME: BitField = BitField::bits(0x13, 2, 1);
pub const OT_NAME: usize = 0x14;
pub const OT_NAME_BYTES: usize = 7;
/// Circle, square, triangle, heart.
pub const MARKINGS: BitArray = BitArray::bits(0x1b, 0, 1, 4);
pub const CHECKSUM: BitField = BitField::bytes(0x1c, 2);

// Growth
pub const SPECIES: BitField = BitField::bytes(0x20, 2);
pub const ITEM: BitField = BitField::bytes(0x22, 2);
pub const EXP: BitField = BitField::bytes(0x24, 4);
pub const PP_UPS: BitArray = BitArray::bits(0x28, 0, 2, 4);
pub const FRIENDSHIP: BitField = BitField::bytes(0x29, 1);

// Attacks
pub const MOVES: BitArray = BitArray::bytes(0x2c, 2, 4);
pub const PP: BitArray = BitArray::bytes(0x34, 1, 4);

// EVs and condition. Stats are stored HP, Atk, Def, Spe, SpA, SpD.
pub const EVS: BitArray = BitArray::bytes(0x38, 1, 6);
/// Cool, beauty, cute, smart, tough, sheen.
pub const CONTEST: BitArray = BitArray::bytes(0x3e, 1, 6);

// Misc
pub const POKERUS_DAYS: BitField = BitField::bits(0x44, 0, 4);
pub const POKERUS_STRAIN: BitField = BitField::bits(0x44, 4, 4);
pub const MET_LOCATION: BitField = BitField::bytes(0x45, 1);
pub const MET_LEVEL: BitField = BitField::bits(0x46, 0, 7);
pub const ORIGIN_GAME: BitField = BitField::bits(0x46, 7, 4);
pub const BALL: BitField = BitField::bits(0x47, 3, 4);
pub const OT_GENDER: BitField = BitField::bits(0x47, 7, 1);
/// Same stat order as the EVs.
pub const IVS: BitArray = BitArray::bits(0x48, 0, 5, 6);
pub const IS_EGG: BitField = BitField::bits(0x4b, 6, 1);
pub const ABILITY_SLOT: BitField = BitField::bits(0x4b, 7, 1);
/// Cool, beauty, cute, smart, tough ranks, 0 to 4.
pub const CONTEST_RIBBONS: BitArray = BitArray::bits(0x4c, 0, 3, 5);
/// The single ribbons, starting with the Champion Ribbon at bit 15.
pub const RIBBON_FLAGS: BitArray = BitArray::bits(0x4d, 7, 1, 12);
pub const FATEFUL_ENCOUNTER: BitField = BitField::bits(0x4f, 7, 1);

// Party only
pub const STATUS: BitField = BitField::bytes(0x50, 4);
pub const LEVEL: BitField = BitField::bytes(0x54, 1);
pub const POKERUS_REMAINING: BitField = BitField::bytes(0x55, 1);
pub const CURRENT_HP: BitField = BitField::bytes(0x56, 2);
/// Max HP, Atk, Def, Spe, SpA, SpD.
pub const STATS: BitArray = BitArray::bytes(0x58, 2, 6);

/// Maps a stat in pku order (HP, Atk, Def, SpA, SpD, Spe) to its slot in
/// the pk3 order.
pub const STAT_SLOTS: [usize; 6] = [0, 1, 2, 4, 5, 3];
