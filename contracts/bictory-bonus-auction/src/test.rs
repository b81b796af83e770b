//! Test doubles for the clock and the custodian.
use super::*;

use core::cell::Cell;

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn at(millis: u64) -> Self {
        Self {
            now: Cell::new(Timestamp::from_timestamp_millis(millis)),
        }
    }

    pub fn set(&self, millis: u64) {
        self.now.set(Timestamp::from_timestamp_millis(millis));
    }

    pub fn advance(&self, duration: Duration) {
        let now = self
            .now
            .get()
            .checked_add(duration)
            .expect("Clock overflow");
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// In-memory custody that records every payout.
pub struct MemoryCustodian {
    balance: Amount,
    received: Amount,
    payouts: Vec<(AccountAddress, Amount)>,
    refused: Vec<AccountAddress>,
}

impl MemoryCustodian {
    pub fn new() -> Self {
        Self {
            balance: Amount::zero(),
            received: Amount::zero(),
            payouts: Vec::new(),
            refused: Vec::new(),
        }
    }

    /// Credit incoming value, as the chain does for payable calls.
    pub fn deposit(&mut self, amount: Amount) {
        self.balance += amount;
        self.received += amount;
    }

    /// Make every payment to `account` fail.
    pub fn refuse_payments_to(&mut self, account: AccountAddress) {
        self.refused.push(account);
    }

    pub fn accept_payments_to(&mut self, account: &AccountAddress) {
        self.refused.retain(|refused| refused != account);
    }

    pub fn payouts(&self) -> &[(AccountAddress, Amount)] {
        &self.payouts
    }

    pub fn received(&self) -> Amount {
        self.received
    }

    /// Total paid out so far.
    pub fn paid(&self) -> Amount {
        self.payouts
            .iter()
            .fold(Amount::zero(), |total, (_, amount)| total + *amount)
    }

    pub fn paid_to(&self, account: &AccountAddress) -> Amount {
        self.payouts
            .iter()
            .filter(|(recipient, _)| recipient == account)
            .fold(Amount::zero(), |total, (_, amount)| total + *amount)
    }
}

impl FundsCustodian for MemoryCustodian {
    fn balance(&self) -> Amount {
        self.balance
    }

    fn pay(&mut self, recipient: &AccountAddress, amount: Amount) -> TransferResult {
        if self.refused.contains(recipient) {
            return Err(TransferError::MissingAccount);
        }
        let remaining = self
            .balance
            .micro_ccd
            .checked_sub(amount.micro_ccd)
            .ok_or(TransferError::AmountTooLarge)?;

        self.balance = Amount::from_micro_ccd(remaining);
        self.payouts.push((*recipient, amount));
        Ok(())
    }
}
