use super::*;

/// Moves CCD out of the auction's custody.
///
/// A payment either moves the full amount or nothing. Whether a payment is
/// allowed at all is decided by the caller.
pub trait FundsCustodian {
    /// Amount currently held in custody.
    fn balance(&self) -> Amount;

    /// Pay `amount` to `recipient`.
    fn pay(&mut self, recipient: &AccountAddress, amount: Amount) -> TransferResult;
}

/// Custody backed by the contract's own balance.
pub struct HostCustodian<'a, H> {
    host: &'a mut H,
}

impl<'a, H> HostCustodian<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        Self { host }
    }
}

impl<'a, H: HasHost<State>> FundsCustodian for HostCustodian<'a, H> {
    fn balance(&self) -> Amount {
        self.host.self_balance()
    }

    fn pay(&mut self, recipient: &AccountAddress, amount: Amount) -> TransferResult {
        self.host.invoke_transfer(recipient, amount)
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use crate::test::*;
    use test_infrastructure::*;

    const ACCOUNT_0: AccountAddress = AccountAddress([0u8; 32]);

    fn host_with_balance(balance: Amount) -> TestHost<State> {
        let clock = ManualClock::at(0);
        let state = State::new(ACCOUNT_0, 60, &clock).expect_report("State should be created");
        let mut host = TestHost::new(state, TestStateBuilder::new());
        host.set_self_balance(balance);
        host
    }

    #[concordium_test]
    fn test_host_custodian_pays_from_contract_balance() {
        let mut host = host_with_balance(Amount::from_micro_ccd(500));

        let mut custodian = HostCustodian::new(&mut host);
        claim_eq!(custodian.balance(), Amount::from_micro_ccd(500));
        claim!(custodian
            .pay(&ACCOUNT_0, Amount::from_micro_ccd(200))
            .is_ok());

        claim!(host.transfer_occurred(&ACCOUNT_0, Amount::from_micro_ccd(200)));
    }

    #[concordium_test]
    fn test_host_custodian_refuses_overdraft() {
        let mut host = host_with_balance(Amount::from_micro_ccd(100));

        let mut custodian = HostCustodian::new(&mut host);
        claim!(custodian
            .pay(&ACCOUNT_0, Amount::from_micro_ccd(200))
            .is_err());

        claim!(!host.transfer_occurred(&ACCOUNT_0, Amount::from_micro_ccd(200)));
    }

    #[concordium_test]
    fn test_memory_custodian_is_all_or_nothing() {
        let mut custodian = MemoryCustodian::new();
        custodian.deposit(Amount::from_micro_ccd(100));
        custodian.refuse_payments_to(ACCOUNT_0);

        claim!(matches!(
            custodian.pay(&ACCOUNT_0, Amount::from_micro_ccd(50)),
            Err(TransferError::MissingAccount)
        ));
        claim!(matches!(
            custodian.pay(&AccountAddress([1u8; 32]), Amount::from_micro_ccd(150)),
            Err(TransferError::AmountTooLarge)
        ));
        claim_eq!(custodian.balance(), Amount::from_micro_ccd(100));
        claim!(custodian.payouts().is_empty());
    }
}
