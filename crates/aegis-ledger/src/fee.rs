//! Platform fee computation (§4.5 step 3).

/// Splits a gross amount into the platform's cut and the seller's net, at `fee_rate_bps` basis
/// points (3000 = 30%). Truncates toward zero like the integer division it is; the remainder of
/// the division stays with the seller by construction (`net = gross - platform`), never lost.
pub fn split(gross_amount: i64, fee_rate_bps: i64) -> (i64, i64) {
    let platform_amount = gross_amount * fee_rate_bps / 10_000;
    let net_amount = gross_amount - platform_amount;
    (platform_amount, net_amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_percent_of_ten_thousand() {
        let (platform, net) = split(10_000, 3_000);
        assert_eq!(platform, 3_000);
        assert_eq!(net, 7_000);
    }

    #[test]
    fn truncation_favors_the_seller() {
        let (platform, net) = split(101, 3_000);
        assert_eq!(platform, 30);
        assert_eq!(net, 71);
        assert_eq!(platform + net, 101);
    }

    #[test]
    fn zero_fee_rate_keeps_everything_with_the_seller() {
        let (platform, net) = split(5_000, 0);
        assert_eq!(platform, 0);
        assert_eq!(net, 5_000);
    }
}
