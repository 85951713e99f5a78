//! Address input validation

use alloy::primitives::Address;

/// Parse a user-supplied address string.
///
/// Surrounding whitespace is ignored. The remainder must be `0x` followed by
/// exactly 40 hex characters (either case); anything else means "no address"
/// and yields `None` rather than an error.
pub fn parse_address_input(input: &str) -> Option<Address> {
    let value = input.trim();
    if !is_address(value) {
        return None;
    }
    value.parse::<Address>().ok()
}

fn is_address(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("0x") else {
        return false;
    };
    rest.len() == 40 && rest.chars().all(|ch| ch.is_ascii_hexdigit())
}

/// Shorten an address for narrow panels: `0x1234..abcd`
pub fn short_addr(value: &str) -> String {
    if value.len() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}..{}", start, end)
}
