use super::*;

/// Deposits per bidder.
///
/// Only the entry of the current highest bidder is guaranteed to be accurate.
/// Outbid bidders are refunded immediately, so their entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, SchemaType)]
pub struct BidLedger {
    #[concordium(size_length = 2)]
    deposits: BTreeMap<AccountAddress, Amount>,
}

impl BidLedger {
    /// Record `amount` as the deposit of `bidder`, replacing any previous one.
    pub fn record_deposit(&mut self, bidder: AccountAddress, amount: Amount) {
        self.deposits.insert(bidder, amount);
    }

    /// Last recorded deposit of `bidder`, zero if there is none.
    pub fn amount_of(&self, bidder: &AccountAddress) -> Amount {
        self.deposits
            .get(bidder)
            .copied()
            .unwrap_or_else(Amount::zero)
    }

    pub fn clear(&mut self, bidder: &AccountAddress) {
        self.deposits.remove(bidder);
    }

    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;

    const ACCOUNT_0: AccountAddress = AccountAddress([0u8; 32]);
    const ACCOUNT_1: AccountAddress = AccountAddress([1u8; 32]);

    #[concordium_test]
    fn test_unknown_bidder_has_nothing() {
        let ledger = BidLedger::default();

        claim!(ledger.is_empty());
        claim_eq!(ledger.amount_of(&ACCOUNT_0), Amount::zero());
    }

    #[concordium_test]
    fn test_record_overwrites() {
        let mut ledger = BidLedger::default();
        ledger.record_deposit(ACCOUNT_0, Amount::from_micro_ccd(100));
        ledger.record_deposit(ACCOUNT_1, Amount::from_micro_ccd(200));
        ledger.record_deposit(ACCOUNT_0, Amount::from_micro_ccd(300));

        claim_eq!(ledger.len(), 2);
        claim_eq!(ledger.amount_of(&ACCOUNT_0), Amount::from_micro_ccd(300));
        claim_eq!(ledger.amount_of(&ACCOUNT_1), Amount::from_micro_ccd(200));
    }

    #[concordium_test]
    fn test_ledger_serialization_has_two_byte_length() {
        let mut ledger = BidLedger::default();
        ledger.record_deposit(ACCOUNT_0, Amount::from_micro_ccd(100));
        ledger.record_deposit(ACCOUNT_1, Amount::from_micro_ccd(200));

        let bytes = to_bytes(&ledger);
        claim_eq!(bytes.len(), 2 + 2 * (32 + 8));
        claim_eq!(&bytes[..2], &[2u8, 0u8][..]);

        let parsed: BidLedger = from_bytes(&bytes).expect_report("Ledger should parse");
        claim_eq!(parsed, ledger);
    }

    #[concordium_test]
    fn test_clear() {
        let mut ledger = BidLedger::default();
        ledger.record_deposit(ACCOUNT_0, Amount::from_micro_ccd(100));
        ledger.clear(&ACCOUNT_0);
        ledger.clear(&ACCOUNT_1);

        claim!(ledger.is_empty());
        claim_eq!(ledger.amount_of(&ACCOUNT_0), Amount::zero());
    }
}
