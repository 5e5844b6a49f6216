//! Gen 3 ribbons. Contest ribbons are stored as a rank per contest (0 for
//! none, up to 4 for Master), the rest as one bit each.

const CONTESTS: [&str; 5] = ["Cool", "Beauty", "Cute", "Smart", "Tough"];
const RANKS: [&str; 4] = ["", " Super", " Hyper", " Master"];

/// In bit order, starting from bit 15 of the ribbon word.
pub const SINGLE_RIBBONS: [&str; 12] = [
    "Champion Ribbon",
    "Winning Ribbon",
    "Victory Ribbon",
    "Artist Ribbon",
    "Effort Ribbon",
    "Battle Champion Ribbon",
    "Regional Champion Ribbon",
    "National Champion Ribbon",
    "Country Ribbon",
    "National Ribbon",
    "Earth Ribbon",
    "World Ribbon",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ribbon {
    /// Contest index and rank, 1 to 4.
    Contest(usize, u8),
    /// Index into [`SINGLE_RIBBONS`].
    Single(usize),
}

impl Ribbon {
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(idx) = SINGLE_RIBBONS
            .iter()
            .position(|ribbon| ribbon.eq_ignore_ascii_case(name))
        {
            return Some(Ribbon::Single(idx));
        }
        CONTESTS.iter().enumerate().find_map(|(contest, prefix)| {
            RANKS.iter().enumerate().find_map(|(rank, suffix)| {
                let candidate = format!("{prefix} Ribbon{suffix}");
                candidate
                    .eq_ignore_ascii_case(name)
                    .then_some(Ribbon::Contest(contest, rank as u8 + 1))
            })
        })
    }

    pub fn name(&self) -> String {
        match self {
            Ribbon::Contest(contest, rank) => {
                format!("{} Ribbon{}", CONTESTS[*contest], RANKS[(*rank as usize).saturating_sub(1)])
            }
            Ribbon::Single(idx) => SINGLE_RIBBONS[*idx].to_owned(),
        }
    }
}

/// Highest rank per contest and set bits for the single ribbons.
pub fn pack(ribbons: &[Ribbon]) -> ([u64; 5], [u64; 12]) {
    let mut ranks = [0u64; 5];
    let mut flags = [0u64; 12];
    for ribbon in ribbons {
        match ribbon {
            Ribbon::Contest(contest, rank) => ranks[*contest] = ranks[*contest].max(*rank as u64),
            Ribbon::Single(idx) => flags[*idx] = 1,
        }
    }
    (ranks, flags)
}

/// Every ribbon implied by the stored ranks and flags. A rank implies all
/// the lower ranks of that contest.
pub fn unpack(ranks: &[u64], flags: &[u64]) -> Vec<Ribbon> {
    let contest = ranks.iter().enumerate().flat_map(|(contest, rank)| {
        (1..=(*rank).min(4) as u8).map(move |rank| Ribbon::Contest(contest, rank))
    });
    let single = flags
        .iter()
        .enumerate()
        .filter(|(_, flag)| **flag != 0)
        .map(|(idx, _)| Ribbon::Single(idx));
    contest.chain(single).collect()
}
