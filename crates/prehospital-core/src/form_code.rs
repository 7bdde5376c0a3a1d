//! Human-readable form codes.
//!
//! Pure string functions. A code is `PHC-<YYYYMMDD>-<suffix>` where the date
//! is the day the form was created and the suffix is six random uppercase
//! alphanumerics, e.g. `PHC-20261018-7K2QXA`.

use uuid::Uuid;

pub const PREFIX: &str = "PHC";
pub const SUFFIX_LEN: usize = 6;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn format(date: jiff::civil::Date, suffix: &str) -> String {
    format!("{PREFIX}-{}-{suffix}", date.strftime("%Y%m%d"))
}

pub fn random_suffix() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()] as char)
        .collect()
}

pub fn generate(date: jiff::civil::Date) -> String {
    format(date, &random_suffix())
}

pub fn is_valid(code: &str) -> bool {
    let mut parts = code.split('-');
    let (Some(prefix), Some(date), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == PREFIX
        && date.len() == 8
        && date.bytes().all(|b| b.is_ascii_digit())
        && jiff::civil::Date::strptime("%Y%m%d", date).is_ok()
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| ALPHABET.contains(&b))
}
