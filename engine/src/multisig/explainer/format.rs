use crate::lockup::Balance;

const YOCTO_PER_NEAR: Balance = 1_000_000_000_000_000_000_000_000;
const FRACTION_DIGITS: u32 = 5;

/// Yocto-NEAR as NEAR with at most 5 fractional digits, truncated.
pub fn format_near_amount(amount: Balance) -> String {
    let whole = amount / YOCTO_PER_NEAR;
    let fraction = amount % YOCTO_PER_NEAR / 10u128.pow(24 - FRACTION_DIGITS);

    if fraction == 0 {
        if whole == 0 && amount > 0 {
            return format!("<0.{:0>width$}", 1, width = FRACTION_DIGITS as usize);
        }
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction, width = FRACTION_DIGITS as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_rendered_in_near() {
        assert_eq!(format_near_amount(0), "0");
        assert_eq!(format_near_amount(YOCTO_PER_NEAR), "1");
        assert_eq!(format_near_amount(YOCTO_PER_NEAR * 3 / 2), "1.5");
        assert_eq!(format_near_amount(12_345_678_900_000_000_000_000_000), "12.34567");
        assert_eq!(format_near_amount(10_000_000_000_000_000_000), "0.00001");
        assert_eq!(format_near_amount(1), "<0.00001");
    }
}
