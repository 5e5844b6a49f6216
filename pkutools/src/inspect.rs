use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use num_traits::FromPrimitive;
use pkuport::gen3::charset::Charset;
use pkuport::gen3::{layout, pid, Pk3Data};
use pkuport::types::{Language, Nature};

#[derive(Debug, Args)]
pub struct Opts {
    #[arg(long)]
    pub pk3: PathBuf,
}

/// The raw values of a decrypted pk3, before any dex lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pk3Summary {
    pub checksum_ok: bool,
    pub personality_value: u32,
    pub nature: Nature,
    pub shiny: bool,
    pub tid: u16,
    pub sid: u16,
    pub species: u16,
    pub nickname: String,
    pub ot: String,
    pub language: Option<Language>,
    pub exp: u32,
    pub item: u16,
    pub moves: Vec<u64>,
    pub ivs: Vec<u64>,
    pub evs: Vec<u64>,
    pub is_egg: bool,
    /// Only stored in the party layout.
    pub level: Option<u8>,
}

impl Pk3Summary {
    pub fn new(data: &Pk3Data, checksum_ok: bool) -> Self {
        let personality_value = data.personality_value();
        let tid = data.get(layout::TID) as u16;
        let sid = data.get(layout::SID) as u16;
        let language = Language::from_u64(data.get(layout::LANGUAGE));
        let charset = Charset::for_language(language);
        Pk3Summary {
            checksum_ok,
            personality_value,
            nature: pid::nature(personality_value),
            shiny: pid::is_shiny(personality_value, tid, sid),
            tid,
            sid,
            species: data.get(layout::SPECIES) as u16,
            nickname: charset.decode(data.bytes(layout::NICKNAME, layout::NICKNAME_BYTES)),
            ot: charset.decode(data.bytes(layout::OT_NAME, layout::OT_NAME_BYTES)),
            language,
            exp: data.get(layout::EXP) as u32,
            item: data.get(layout::ITEM) as u16,
            moves: data.get_all(layout::MOVES),
            ivs: data.get_all(layout::IVS),
            evs: data.get_all(layout::EVS),
            is_egg: data.get(layout::IS_EGG) != 0,
            level: data.is_party().then(|| data.get(layout::LEVEL) as u8),
        }
    }
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let raw = std::fs::read(&opts.pk3).with_context(|| format!("could not read {}", opts.pk3.display()))?;
    let (data, checksum_ok) = Pk3Data::from_pk3(&raw)?;
    if !checksum_ok {
        log::warn!("Checksum mismatch in {}", opts.pk3.display());
    }
    println!("{:#?}", Pk3Summary::new(&data, checksum_ok));
    Ok(())
}
