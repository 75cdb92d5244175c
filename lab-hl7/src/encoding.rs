//! Repairs for Western-European text that went through the wrong charset.

use std::borrow::Cow;

const REPLACEMENT: char = '\u{fffd}';

/// Windows-1252 / Latin-1 bytes with accented letters.
#[rustfmt::skip]
const LEGACY_TABLE: &[(u8, char)] = &[
    (0xe4, 'ä'), (0xc4, 'Ä'),
    (0xf6, 'ö'), (0xd6, 'Ö'),
    (0xfc, 'ü'), (0xdc, 'Ü'),
    (0xdf, 'ß'),
    (0xe0, 'à'), (0xc0, 'À'),
    (0xe1, 'á'), (0xc1, 'Á'),
    (0xe2, 'â'), (0xc2, 'Â'),
    (0xe3, 'ã'), (0xc3, 'Ã'),
    (0xe5, 'å'), (0xc5, 'Å'),
    (0xe6, 'æ'), (0xc6, 'Æ'),
    (0xe7, 'ç'), (0xc7, 'Ç'),
    (0xe8, 'è'), (0xc8, 'È'),
    (0xe9, 'é'), (0xc9, 'É'),
    (0xea, 'ê'), (0xca, 'Ê'),
    (0xeb, 'ë'), (0xcb, 'Ë'),
    (0xec, 'ì'), (0xcc, 'Ì'),
    (0xed, 'í'), (0xcd, 'Í'),
    (0xee, 'î'), (0xce, 'Î'),
    (0xef, 'ï'), (0xcf, 'Ï'),
    (0xf0, 'ð'), (0xd0, 'Ð'),
    (0xf1, 'ñ'), (0xd1, 'Ñ'),
    (0xf2, 'ò'), (0xd2, 'Ò'),
    (0xf3, 'ó'), (0xd3, 'Ó'),
    (0xf4, 'ô'), (0xd4, 'Ô'),
    (0xf5, 'õ'), (0xd5, 'Õ'),
    (0xf7, '÷'), (0xd7, '×'),
    (0xf8, 'ø'), (0xd8, 'Ø'),
    (0xf9, 'ù'), (0xd9, 'Ù'),
    (0xfa, 'ú'), (0xda, 'Ú'),
    (0xfb, 'û'), (0xdb, 'Û'),
    (0xfd, 'ý'), (0xdd, 'Ý'),
    (0xfe, 'þ'), (0xde, 'Þ'),
    (0xff, 'ÿ'), (0x9f, 'Ÿ'),
];

/// Known German fragments that lost their umlaut to U+FFFD.
const MOJIBAKE_FIXES: &[(&str, &str)] = &[
    ("gem\u{fffd}ss", "gemäß"),
    ("f\u{fffd}r", "für"),
    ("Veterin\u{fffd}rwesen", "Veterinärwesen"),
    (
        "Bundesamt f\u{fffd}r Lebensmittelsicherheit und Veterin\u{fffd}rwesen",
        "Bundesamt für Lebensmittelsicherheit und Veterinärwesen",
    ),
];

/// Decode single-byte Western-European text. Never fails.
pub fn decode_legacy_western_text(bytes: &[u8]) -> String {
    bytes.iter().copied().map(legacy_char).collect()
}

fn legacy_char(byte: u8) -> char {
    LEGACY_TABLE
        .iter()
        .find(|(code, _)| *code == byte)
        .map(|(_, ch)| *ch)
        // ASCII, CR/LF/TAB and unmapped bytes keep their code point
        .unwrap_or_else(|| char::from(byte))
}

/// Replace known corrupted German substrings. No-op without U+FFFD.
pub fn repair_known_mojibake(text: &str) -> Cow<'_, str> {
    if !text.contains(REPLACEMENT) {
        return Cow::Borrowed(text);
    }

    let mut repaired = text.to_string();
    for (corrupted, correct) in MOJIBAKE_FIXES {
        if repaired.contains(corrupted) {
            repaired = repaired.replace(corrupted, correct);
        }
    }
    Cow::Owned(repaired)
}
