//! CEA-608 Character Sets
//!
//! Mapping from caption data bytes (after parity strip) to Unicode:
//! - Basic North American set (0x20-0x7F, with the standard deviations)
//! - Special North American set (0x11 0x30-0x3F)
//! - Extended Spanish/Miscellaneous/French set (0x12 0x20-0x3F)
//! - Extended Portuguese/German/Danish set (0x13 0x20-0x3F)

/// Map a basic-set byte (0x20-0x7F) to its glyph.
///
/// The basic set is ASCII with a handful of deviations where the
/// standard substitutes accented characters and the solid block.
pub fn basic(byte: u8) -> Option<char> {
    if !(0x20..=0x7F).contains(&byte) {
        return None;
    }
    let c = match byte {
        0x2A => 'á',
        0x5C => 'é',
        0x5E => 'í',
        0x5F => 'ó',
        0x60 => 'ú',
        0x7B => 'ç',
        0x7C => '÷',
        0x7D => 'Ñ',
        0x7E => 'ñ',
        0x7F => '█',
        b => b as char,
    };
    Some(c)
}

/// Map a special North American character code (second byte 0x30-0x3F).
pub fn special(byte: u8) -> Option<char> {
    let c = match byte {
        0x30 => '®',
        0x31 => '°',
        0x32 => '½',
        0x33 => '¿',
        0x34 => '™',
        0x35 => '¢',
        0x36 => '£',
        0x37 => '♪',
        0x38 => 'à',
        0x39 => ' ', // transparent space
        0x3A => 'è',
        0x3B => 'â',
        0x3C => 'ê',
        0x3D => 'î',
        0x3E => 'ô',
        0x3F => 'û',
        _ => return None,
    };
    Some(c)
}

/// Map an extended Spanish/Miscellaneous/French character code
/// (second byte 0x20-0x3F of a 0x12 pair).
pub fn extended_spanish_french(byte: u8) -> Option<char> {
    let c = match byte {
        0x20 => 'Á',
        0x21 => 'É',
        0x22 => 'Ó',
        0x23 => 'Ú',
        0x24 => 'Ü',
        0x25 => 'ü',
        0x26 => '‘',
        0x27 => '¡',
        0x28 => '*',
        0x29 => '\'',
        0x2A => '—',
        0x2B => '©',
        0x2C => '℠',
        0x2D => '•',
        0x2E => '“',
        0x2F => '”',
        0x30 => 'À',
        0x31 => 'Â',
        0x32 => 'Ç',
        0x33 => 'È',
        0x34 => 'Ê',
        0x35 => 'Ë',
        0x36 => 'ë',
        0x37 => 'Î',
        0x38 => 'Ï',
        0x39 => 'ï',
        0x3A => 'Ô',
        0x3B => 'Ù',
        0x3C => 'ù',
        0x3D => 'Û',
        0x3E => '«',
        0x3F => '»',
        _ => return None,
    };
    Some(c)
}

/// Map an extended Portuguese/German/Danish character code
/// (second byte 0x20-0x3F of a 0x13 pair).
pub fn extended_portuguese_german(byte: u8) -> Option<char> {
    let c = match byte {
        0x20 => 'Ã',
        0x21 => 'ã',
        0x22 => 'Í',
        0x23 => 'Ì',
        0x24 => 'ì',
        0x25 => 'Ò',
        0x26 => 'ò',
        0x27 => 'Õ',
        0x28 => 'õ',
        0x29 => '{',
        0x2A => '}',
        0x2B => '\\',
        0x2C => '^',
        0x2D => '_',
        0x2E => '|',
        0x2F => '~',
        0x30 => 'Ä',
        0x31 => 'ä',
        0x32 => 'Ö',
        0x33 => 'ö',
        0x34 => 'ß',
        0x35 => '¥',
        0x36 => '¤',
        0x37 => '│',
        0x38 => 'Å',
        0x39 => 'å',
        0x3A => 'Ø',
        0x3B => 'ø',
        0x3C => '┌',
        0x3D => '┐',
        0x3E => '└',
        0x3F => '┘',
        _ => return None,
    };
    Some(c)
}
