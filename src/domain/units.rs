//! Unit formatting for native balances

use alloy::primitives::U256;

const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Token symbol of the native currency on every supported network
pub const NATIVE_SYMBOL: &str = "ETH";

/// Format a wei amount in whole-ether units, trimming trailing zeros.
///
/// `2500000000000000000` formats as `2.5`, `1000000000000000000` as `1`.
pub fn format_ether(wei: U256) -> String {
    let unit = U256::from(WEI_PER_ETHER);
    let ether = wei / unit;
    let remainder = wei % unit;
    if remainder.is_zero() {
        ether.to_string()
    } else {
        let decimal = format!("{:0>18}", remainder.to_string())
            .trim_end_matches('0')
            .to_string();
        format!("{}.{}", ether, decimal)
    }
}

/// Balance as shown to the user, e.g. `2.5 ETH`
pub fn render_balance(wei: U256) -> String {
    format!("{} {}", format_ether(wei), NATIVE_SYMBOL)
}
