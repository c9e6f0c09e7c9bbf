//! Parsers for the `cfg.toml` values. Also compiled into `build.rs`, so this
//! file only depends on `core`.

use core::fmt;
use core::net::Ipv4Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    MacLength,
    MacOctet,
    MixedSeparators,
    Ipv4,
    MissingSection,
    EmptyValue,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacLength => write!(f, "must have exactly 6 octets"),
            Self::MacOctet => write!(f, "every octet must be two hex digits"),
            Self::MixedSeparators => write!(f, "use either ':' or '-' throughout"),
            Self::Ipv4 => write!(f, "is not a dotted IPv4 address"),
            Self::MissingSection => write!(f, "section is required by the enabled feature"),
            Self::EmptyValue => write!(f, "must not be empty"),
        }
    }
}

/// Parse `DE:AD:BE:EF:FE:ED` (or the `-` separated form).
pub fn parse_mac(s: &str) -> Result<[u8; 6], ParseError> {
    let colon = s.contains(':');
    if colon && s.contains('-') {
        return Err(ParseError::MixedSeparators);
    }

    let mut mac = [0u8; 6];
    let mut parts = s.split(if colon { ':' } else { '-' });
    for octet in mac.iter_mut() {
        let part = parts.next().ok_or(ParseError::MacLength)?;
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseError::MacOctet);
        }
        *octet = u8::from_str_radix(part, 16).map_err(|_| ParseError::MacOctet)?;
    }
    if parts.next().is_some() {
        return Err(ParseError::MacLength);
    }
    Ok(mac)
}

pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr, ParseError> {
    s.parse().map_err(|_| ParseError::Ipv4)
}

/// Section of an optional integration: required when its feature is on,
/// dropped otherwise.
pub fn feature_section<T>(enabled: bool, section: Option<T>) -> Result<Option<T>, ParseError> {
    match (enabled, section) {
        (true, None) => Err(ParseError::MissingSection),
        (true, section) => Ok(section),
        (false, _) => Ok(None),
    }
}

pub fn non_empty(value: &str) -> Result<&str, ParseError> {
    if value.trim().is_empty() {
        Err(ParseError::EmptyValue)
    } else {
        Ok(value)
    }
}
