//! The Gen 3 character encodings. Japanese and international cartridges
//! share letters and digits but disagree on most of the rest of the table.

use crate::types::Language;

pub const TERMINATOR: u8 = 0xff;

const HIRAGANA: &str = "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろわをんぁぃぅぇぉゃゅょがぎぐげござじずぜぞだぢづでどばびぶべぼぱぴぷぺぽっ";
const KATAKANA: &str = "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲンァィゥェォャュョガギグゲゴザジズゼゾダヂヅデドバビブベボパピプペポッ";
/// International bytes 0x01 to 0x2e; `\0` marks unused codes.
const ACCENTED: &str = "ÀÁÂÇÈÉÊËÌ\0ÎÏÒÓÔŒÙÚÛÑßàá\0çèéêëì\0îïòóôœùúûñºª\0&+";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    International,
    Japanese,
}

impl Charset {
    pub fn for_language(language: Option<Language>) -> Self {
        match language {
            Some(Language::Japanese) => Charset::Japanese,
            _ => Charset::International,
        }
    }

    pub fn decode_char(self, byte: u8) -> Option<char> {
        let japanese = self == Charset::Japanese;
        let decoded = match byte {
            0x00 if japanese => '\u{3000}',
            0x00 => ' ',
            0x01..=0x50 if japanese => HIRAGANA.chars().nth(byte as usize - 0x01)?,
            0x51..=0xa0 if japanese => KATAKANA.chars().nth(byte as usize - 0x51)?,
            0x01..=0x2e => ACCENTED.chars().nth(byte as usize - 0x01).filter(|c| *c != '\0')?,
            0xa1..=0xaa if japanese => char::from_u32('０' as u32 + (byte - 0xa1) as u32)?,
            0xa1..=0xaa => (b'0' + (byte - 0xa1)) as char,
            0xab if japanese => '！',
            0xab => '!',
            0xac if japanese => '？',
            0xac => '?',
            0xad if japanese => '。',
            0xad => '.',
            0xae if japanese => 'ー',
            0xae => '-',
            0xaf if japanese => '・',
            0xaf => '·',
            0xb0 if japanese => '‥',
            0xb0 => '…',
            0xb1 if japanese => '『',
            0xb1 => '“',
            0xb2 if japanese => '』',
            0xb2 => '”',
            0xb3 if japanese => '「',
            0xb3 => '‘',
            0xb4 if japanese => '」',
            0xb4 => '’',
            0xb5 => '♂',
            0xb6 => '♀',
            0xb7 if japanese => '円',
            0xb8 if japanese => '．',
            0xb8 => ',',
            0xb9 => '×',
            0xba if japanese => '／',
            0xba => '/',
            0xbb..=0xd4 => (b'A' + (byte - 0xbb)) as char,
            0xd5..=0xee => (b'a' + (byte - 0xd5)) as char,
            0xf0 if !japanese => ':',
            0xf1 if !japanese => 'Ä',
            0xf2 if !japanese => 'Ö',
            0xf3 if !japanese => 'Ü',
            0xf4 if !japanese => 'ä',
            0xf5 if !japanese => 'ö',
            0xf6 if !japanese => 'ü',
            _ => return None,
        };
        Some(decoded)
    }

    pub fn encode_char(self, c: char) -> Option<u8> {
        if c == ' ' {
            return Some(0x00);
        }
        (0x00..TERMINATOR).find(|byte| self.decode_char(*byte) == Some(c))
    }

    pub fn can_encode(self, c: char) -> bool {
        self.encode_char(c).is_some()
    }

    /// Decodes up to the terminator. Bytes with no character are skipped.
    pub fn decode(self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .take_while(|byte| **byte != TERMINATOR)
            .filter_map(|byte| {
                let decoded = self.decode_char(*byte);
                if decoded.is_none() {
                    log::trace!("Skipping undefined character {byte:#04x}");
                }
                decoded
            })
            .collect()
    }

    /// Encodes into exactly `len` bytes, terminated and padded with 0xFF
    /// when shorter. Characters that can't be encoded are dropped; callers
    /// are expected to have checked the text already.
    pub fn encode(self, text: &str, len: usize) -> Vec<u8> {
        let mut bytes: Vec<u8> = text
            .chars()
            .filter_map(|c| self.encode_char(c))
            .take(len)
            .collect();
        bytes.resize(len, TERMINATOR);
        bytes
    }
}

/// Longest nickname, in characters, for a language.
pub fn nickname_len(charset: Charset) -> usize {
    match charset {
        Charset::Japanese => 5,
        Charset::International => 10,
    }
}

pub fn ot_name_len(charset: Charset) -> usize {
    match charset {
        Charset::Japanese => 5,
        Charset::International => 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn international_round_trip() {
        let bytes = Charset::International.encode("Zigzagoon", 10);
        assert_eq!(bytes[0], 0xd4);
        assert_eq!(bytes[9], TERMINATOR);
        assert_eq!(Charset::International.decode(&bytes), "Zigzagoon");
        assert_eq!(Charset::International.decode(&Charset::International.encode("Éclair", 10)), "Éclair");
    }

    #[test]
    fn japanese_kana() {
        assert_eq!(Charset::Japanese.encode_char('あ'), Some(0x01));
        assert_eq!(Charset::Japanese.encode_char('っ'), Some(0x50));
        assert_eq!(Charset::Japanese.encode_char('ア'), Some(0x51));
        assert_eq!(Charset::Japanese.encode_char('ッ'), Some(0xa0));
        assert_eq!(Charset::International.encode_char('あ'), None);
        assert_eq!(Charset::Japanese.encode_char('É'), None);
    }

    #[test]
    fn full_length_names_have_no_terminator() {
        let bytes = Charset::International.encode("ABCDEFG", 7);
        assert!(!bytes.contains(&TERMINATOR));
    }
}
