use super::*;

use core::{convert::TryInto, ops::Mul};

/// Percentage with micro-percent precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, SchemaType)]
pub struct Percentage(u64);

impl Percentage {
    pub const fn from_micro_percent(micro_percent: u64) -> Self {
        Self(micro_percent)
    }

    pub const fn from_percent(percent: u64) -> Self {
        Self(percent * 1_000_000)
    }
}

/// Share of an amount, rounded down to the nearest micro CCD. Saturates at the
/// largest amount.
impl Mul<Amount> for Percentage {
    type Output = Amount;

    fn mul(self, rhs: Amount) -> Self::Output {
        Amount::from_micro_ccd(
            (rhs.micro_ccd as u128 * self.0 as u128 / 100_000_000)
                .try_into()
                .unwrap_or(u64::MAX),
        )
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;

    #[concordium_test]
    fn test_share_of_amount() {
        let ten = Percentage::from_percent(10);

        claim_eq!(ten * Amount::from_ccd(2), Amount::from_micro_ccd(200_000));
        claim_eq!(ten * Amount::zero(), Amount::zero());
    }

    #[concordium_test]
    fn test_share_rounds_down() {
        let ten = Percentage::from_percent(10);

        claim_eq!(ten * Amount::from_micro_ccd(15), Amount::from_micro_ccd(1));
        claim_eq!(ten * Amount::from_micro_ccd(9), Amount::zero());
        claim_eq!(
            Percentage::from_micro_percent(500_000) * Amount::from_micro_ccd(1_000),
            Amount::from_micro_ccd(5)
        );
    }

    #[concordium_test]
    fn test_share_of_max_amount_does_not_overflow() {
        let full = Percentage::from_percent(100);

        claim_eq!(
            full * Amount::from_micro_ccd(u64::MAX),
            Amount::from_micro_ccd(u64::MAX)
        );
    }

    #[concordium_test]
    fn test_share_above_hundred_percent_saturates() {
        let double = Percentage::from_percent(200);

        claim_eq!(double * Amount::from_micro_ccd(50), Amount::from_micro_ccd(100));
        claim_eq!(
            double * Amount::from_micro_ccd(u64::MAX),
            Amount::from_micro_ccd(u64::MAX)
        );
    }
}
