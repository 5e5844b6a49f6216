//! Traits the games derive from a personality value, and a search for a
//! personality value with given traits.

use num_traits::FromPrimitive;

use crate::dex::GenderRatio;
use crate::types::{Gender, Nature};

pub const UNOWN_FORMS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ!?";

pub fn nature(pid: u32) -> Nature {
    Nature::from_u32(pid % 25).unwrap_or(Nature::Hardy)
}

pub fn is_shiny(pid: u32, tid: u16, sid: u16) -> bool {
    let xor = tid ^ sid ^ (pid >> 16) as u16 ^ (pid & 0xffff) as u16;
    xor < 8
}

/// Index of the Unown letter, 0 for A through 27 for ?.
pub fn unown_form(pid: u32) -> u8 {
    let letter = ((pid & 0x0300_0000) >> 18)
        | ((pid & 0x0003_0000) >> 12)
        | ((pid & 0x0000_0300) >> 6)
        | (pid & 0x0000_0003);
    (letter % 28) as u8
}

pub fn unown_form_index(letter: &str) -> Option<u8> {
    let mut chars = letter.trim().chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    UNOWN_FORMS
        .find(c.to_ascii_uppercase())
        .map(|idx| idx as u8)
}

pub fn unown_letter(form: u8) -> Option<char> {
    UNOWN_FORMS.chars().nth(form as usize)
}

/// The linear congruential generator the Gen 3 games draw PIDs from.
#[derive(Clone, Copy, Debug)]
pub struct Lcg(u32);

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Lcg(seed)
    }

    pub fn next_u16(&mut self) -> u16 {
        self.0 = self.0.wrapping_mul(0x41c6_4e6d).wrapping_add(0x6073);
        (self.0 >> 16) as u16
    }
}

/// What a generated PID has to agree with. `None` means anything goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PidTraits {
    pub nature: Option<Nature>,
    pub gender: Option<(GenderRatio, Gender)>,
    pub shiny: Option<bool>,
    pub unown_form: Option<u8>,
}

impl PidTraits {
    /// Names of the traits `pid` disagrees with.
    pub fn mismatches(&self, pid: u32, tid: u16, sid: u16) -> Vec<&'static str> {
        let mut wrong = Vec::new();
        if self.nature.is_some_and(|wanted| nature(pid) != wanted) {
            wrong.push("nature");
        }
        if self
            .gender
            .is_some_and(|(ratio, wanted)| ratio.gender_of(pid) != wanted)
        {
            wrong.push("gender");
        }
        if self.shiny.is_some_and(|wanted| is_shiny(pid, tid, sid) != wanted) {
            wrong.push("shininess");
        }
        if self.unown_form.is_some_and(|wanted| unown_form(pid) != wanted) {
            wrong.push("Unown form");
        }
        wrong
    }

    /// Finds a PID with every trait, deterministically from `seed`. Shiny
    /// PIDs are built directly rather than searched for.
    pub fn generate(&self, seed: u32, tid: u16, sid: u16) -> Option<u32> {
        const ATTEMPTS: usize = 1 << 20;
        let mut rng = Lcg::new(seed);
        for _ in 0..ATTEMPTS {
            let low = rng.next_u16();
            let high = rng.next_u16();
            if self.shiny == Some(true) {
                let base = tid ^ sid ^ low;
                let found = (0..8u16)
                    .map(|xor| ((base ^ xor) as u32) << 16 | low as u32)
                    .find(|pid| self.mismatches(*pid, tid, sid).is_empty());
                if found.is_some() {
                    return found;
                }
            } else {
                let pid = (high as u32) << 16 | low as u32;
                if self.mismatches(pid, tid, sid).is_empty() {
                    return Some(pid);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_traits() {
        assert_eq!(nature(24), Nature::Quirky);
        assert_eq!(nature(25), Nature::Hardy);
        assert!(is_shiny(0x0000_0007, 0, 0));
        assert!(!is_shiny(0x0000_0008, 0, 0));
        assert!(is_shiny(0x1234_5678, 0x1234, 0x5678));
        assert_eq!(unown_form(0), 0);
        assert_eq!(unown_form(0x0000_0003), 3);
        assert_eq!(unown_form_index("?"), Some(27));
        assert_eq!(unown_letter(25), Some('Z'));
    }

    #[test]
    fn generated_pids_match() {
        let traits = PidTraits {
            nature: Some(Nature::Adamant),
            gender: Some((GenderRatio::FemaleBelow(127), Gender::Female)),
            shiny: Some(true),
            unown_form: None,
        };
        let pid = traits.generate(1234, 31337, 4242).unwrap();
        assert!(traits.mismatches(pid, 31337, 4242).is_empty());
        assert_eq!(traits.generate(1234, 31337, 4242), Some(pid));
    }
}
