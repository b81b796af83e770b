use super::*;

/// Deposit of an outbid bidder plus the bonus on the bid that displaced them.
/// None if the sum does not fit in an amount.
pub fn refund_amount(deposit: Amount, new_bid: Amount) -> Option<Amount> {
    let bonus = REFUND_BONUS * new_bid;
    deposit
        .micro_ccd
        .checked_add(bonus.micro_ccd)
        .map(Amount::from_micro_ccd)
}

// Functions for creating, updating and querying the contract state.
impl State {
    /// Creates an auction owned by `owner` that accepts bids for `duration`
    /// seconds from now.
    pub fn new(owner: AccountAddress, duration: u64, clock: &impl Clock) -> ContractResult<Self> {
        ensure!(duration > 0, CustomContractError::InvalidDuration);
        let end_time =
            end_time_after(clock.now(), duration).ok_or(CustomContractError::InvalidDuration)?;

        Ok(Self {
            owner,
            end_time,
            highest_bidder: None,
            highest_bid: Amount::zero(),
            ended: false,
            paused: false,
            ledger: BidLedger::default(),
            locked: false,
        })
    }

    pub fn lock(&mut self) -> ContractResult<()> {
        ensure!(!self.locked, CustomContractError::Reentrancy);
        self.locked = true;
        Ok(())
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn phase(&self, clock: &impl Clock) -> Phase {
        Phase::at(self.end_time, clock.now())
    }

    /// Accept `amount` from `bidder` as the new highest bid.
    ///
    /// The previous highest bidder is refunded their deposit plus the bonus
    /// before the new bid is recorded. If the refund fails nothing changes.
    ///
    /// It rejects if:
    /// - Another operation is in progress.
    /// - The end time has been reached.
    /// - The auction is paused.
    /// - `amount` is not strictly higher than the highest bid.
    /// - The refund can not be paid.
    pub fn place_bid(
        &mut self,
        clock: &impl Clock,
        custodian: &mut impl FundsCustodian,
        bidder: AccountAddress,
        amount: Amount,
    ) -> ContractResult<BidOutcome> {
        self.lock()?;
        let outcome = self.try_place_bid(clock, custodian, bidder, amount);
        self.unlock();
        outcome
    }

    fn try_place_bid(
        &mut self,
        clock: &impl Clock,
        custodian: &mut impl FundsCustodian,
        bidder: AccountAddress,
        amount: Amount,
    ) -> ContractResult<BidOutcome> {
        ensure!(
            !self.phase(clock).is_closed(),
            CustomContractError::AuctionClosed
        );
        ensure!(!self.paused, CustomContractError::AuctionPaused);
        ensure!(amount > self.highest_bid, CustomContractError::BidTooLow);

        let refund = match self.highest_bidder {
            Some(previous) => Some(Refund {
                bidder: previous,
                amount: refund_amount(self.ledger.amount_of(&previous), amount)
                    .ok_or(CustomContractError::RefundTransferFailed)?,
            }),
            None => None,
        };

        // Nothing is written before the refund went through
        if let Some(refund) = refund {
            custodian
                .pay(&refund.bidder, refund.amount)
                .map_err(|_| CustomContractError::RefundTransferFailed)?;
            self.ledger.clear(&refund.bidder);
        }

        self.highest_bidder = Some(bidder);
        self.highest_bid = amount;
        self.ledger.record_deposit(bidder, amount);

        Ok(BidOutcome {
            bidder,
            amount,
            refund,
        })
    }

    /// Close the auction for good. Anyone may finalize once the end time has
    /// been reached, bids or not.
    pub fn finalize(&mut self, clock: &impl Clock) -> ContractResult<AuctionResult> {
        ensure!(!self.locked, CustomContractError::Reentrancy);
        ensure!(self.phase(clock).is_closed(), CustomContractError::TooEarly);
        ensure!(!self.ended, CustomContractError::AlreadyEnded);

        self.ended = true;

        Ok(AuctionResult {
            winner: self.highest_bidder,
            amount: self.highest_bid,
        })
    }

    pub fn set_paused(&mut self, caller: &Address, paused: bool) -> ContractResult<()> {
        ensure!(!self.locked, CustomContractError::Reentrancy);
        ensure!(
            caller.matches_account(&self.owner),
            CustomContractError::NotOwner
        );

        self.paused = paused;
        Ok(())
    }

    /// Pay everything in custody to the owner and return the paid amount.
    ///
    /// Only allowed after finalization. Repeated withdrawals pay whatever is
    /// left, which is nothing unless funds arrived in between.
    pub fn withdraw(
        &mut self,
        custodian: &mut impl FundsCustodian,
        caller: &Address,
    ) -> ContractResult<Amount> {
        self.lock()?;
        let withdrawn = self.try_withdraw(custodian, caller);
        self.unlock();
        withdrawn
    }

    fn try_withdraw(
        &mut self,
        custodian: &mut impl FundsCustodian,
        caller: &Address,
    ) -> ContractResult<Amount> {
        ensure!(
            caller.matches_account(&self.owner),
            CustomContractError::NotOwner
        );
        ensure!(self.ended, CustomContractError::NotEnded);

        let balance = custodian.balance();
        if balance > Amount::zero() {
            custodian
                .pay(&self.owner, balance)
                .map_err(|_| CustomContractError::WithdrawalTransferFailed)?;
        }

        Ok(balance)
    }

    pub fn status(&self, clock: &impl Clock) -> AuctionStatus {
        AuctionStatus {
            end_time: self.end_time,
            time_remaining: time_remaining(self.end_time, clock.now()),
            ended: self.ended,
            paused: self.paused,
        }
    }

    pub fn view(&self) -> ViewableState {
        ViewableState {
            owner: self.owner,
            end_time: self.end_time,
            highest_bidder: self.highest_bidder,
            highest_bid: self.highest_bid,
            ended: self.ended,
            paused: self.paused,
            deposits: self.ledger.len() as u32,
        }
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use crate::test::*;

    const START: u64 = 1_000;
    const HOUR: u64 = 3600;
    const OWNER: AccountAddress = AccountAddress([0u8; 32]);
    const ALICE: AccountAddress = AccountAddress([1u8; 32]);
    const BOB: AccountAddress = AccountAddress([2u8; 32]);
    const CAROL: AccountAddress = AccountAddress([3u8; 32]);
    const BICTORY: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };

    fn ccd(micro_ccd: u64) -> Amount {
        Amount::from_micro_ccd(micro_ccd)
    }

    fn owner() -> Address {
        Address::Account(OWNER)
    }

    fn end_of_hour() -> u64 {
        START + HOUR * 1000
    }

    fn new_auction(clock: &ManualClock) -> State {
        State::new(OWNER, HOUR, clock).expect_report("Auction should be created")
    }

    /// Bid the way the chain does it: the bid amount is credited before the
    /// call executes and returned to the sender if the call fails.
    fn deposit_and_bid(
        state: &mut State,
        clock: &ManualClock,
        custodian: &mut MemoryCustodian,
        bidder: AccountAddress,
        amount: Amount,
    ) -> ContractResult<BidOutcome> {
        custodian.deposit(amount);
        let outcome = state.place_bid(clock, custodian, bidder, amount);
        if outcome.is_err() {
            custodian
                .pay(&bidder, amount)
                .expect_report("Rejected bid should be returned");
        }
        outcome
    }

    fn ended_auction(clock: &ManualClock) -> State {
        let mut state = new_auction(clock);
        clock.set(end_of_hour());
        let _ = state.finalize(clock).expect_report("Finalize should pass");
        state
    }

    #[concordium_test]
    fn test_new() {
        let clock = ManualClock::at(START);
        let state = new_auction(&clock);

        claim_eq!(state.owner, OWNER);
        claim_eq!(state.end_time, Timestamp::from_timestamp_millis(end_of_hour()));
        claim_eq!(state.highest_bidder, None);
        claim_eq!(state.highest_bid, Amount::zero());
        claim!(!state.ended);
        claim!(!state.paused);
        claim!(!state.locked);
        claim!(state.ledger.is_empty());
    }

    #[concordium_test]
    fn test_new_rejects_invalid_duration() {
        let clock = ManualClock::at(START);

        claim_eq!(
            State::new(OWNER, 0, &clock),
            Err(CustomContractError::InvalidDuration)
        );
        claim_eq!(
            State::new(OWNER, u64::MAX, &clock),
            Err(CustomContractError::InvalidDuration)
        );
    }

    #[concordium_test]
    fn test_first_bid_is_recorded_without_refund() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);

        let outcome = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(1_000_000))
            .expect_report("Bidding should pass");

        claim_eq!(outcome.refund, None);
        claim_eq!(state.highest_bidder, Some(ALICE));
        claim_eq!(state.highest_bid, ccd(1_000_000));
        claim_eq!(state.ledger.amount_of(&ALICE), ccd(1_000_000));
        claim_eq!(custodian.balance(), ccd(1_000_000));
        claim!(custodian.payouts().is_empty());
    }

    #[concordium_test]
    /// Alice bids 1 CCD, Bob bids 2 CCD. Alice gets 1 CCD back plus 10% of
    /// Bob's bid.
    fn test_outbid_bidder_is_refunded_with_bonus() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);

        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(1_000_000))
            .expect_report("Alice's bid should pass");
        let outcome = deposit_and_bid(&mut state, &clock, &mut custodian, BOB, ccd(2_000_000))
            .expect_report("Bob's bid should pass");

        claim_eq!(
            outcome.refund,
            Some(Refund {
                bidder: ALICE,
                amount: ccd(1_200_000),
            })
        );
        claim_eq!(custodian.paid_to(&ALICE), ccd(1_200_000));
        claim_eq!(state.highest_bidder, Some(BOB));
        claim_eq!(state.highest_bid, ccd(2_000_000));
        claim_eq!(state.ledger.amount_of(&BOB), ccd(2_000_000));
        claim_eq!(state.ledger.amount_of(&ALICE), Amount::zero());
        claim_eq!(custodian.balance(), ccd(1_800_000));
    }

    #[concordium_test]
    fn test_bonus_is_rounded_down() {
        claim_eq!(refund_amount(ccd(100), ccd(109)), Some(ccd(110)));
        claim_eq!(refund_amount(ccd(5), ccd(9)), Some(ccd(5)));
    }

    #[concordium_test]
    fn test_refund_that_does_not_fit_rejects_bid() {
        claim_eq!(refund_amount(ccd(u64::MAX), ccd(100)), None);

        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);
        state.highest_bidder = Some(ALICE);
        state.highest_bid = ccd(u64::MAX - 10);
        state.ledger.record_deposit(ALICE, ccd(u64::MAX - 10));
        let before = state.clone();

        claim_eq!(
            state.place_bid(&clock, &mut custodian, BOB, ccd(u64::MAX - 5)),
            Err(CustomContractError::RefundTransferFailed)
        );
        claim_eq!(state, before);
        claim!(custodian.payouts().is_empty());
    }

    #[concordium_test]
    fn test_bid_equal_to_highest_is_rejected() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);

        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(1_000_000))
            .expect_report("Alice's bid should pass");
        let before = state.clone();

        claim_eq!(
            deposit_and_bid(&mut state, &clock, &mut custodian, BOB, ccd(1_000_000)),
            Err(CustomContractError::BidTooLow)
        );
        claim_eq!(
            deposit_and_bid(&mut state, &clock, &mut custodian, BOB, ccd(999_999)),
            Err(CustomContractError::BidTooLow)
        );
        claim_eq!(state, before);
    }

    #[concordium_test]
    fn test_zero_bid_is_rejected() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);

        claim_eq!(
            deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, Amount::zero()),
            Err(CustomContractError::BidTooLow)
        );
        claim_eq!(state.highest_bidder, None);
    }

    #[concordium_test]
    fn test_highest_bid_strictly_increases() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);
        let bids = [
            (ALICE, 100, true),
            (BOB, 100, false),
            (BOB, 150, true),
            (CAROL, 120, false),
            (ALICE, 151, true),
            (ALICE, 400, true),
            (CAROL, 400, false),
            (CAROL, 1_000, true),
        ];

        let mut highest = Amount::zero();
        for &(bidder, amount, accepted) in bids.iter() {
            let result = deposit_and_bid(&mut state, &clock, &mut custodian, bidder, ccd(amount));
            claim_eq!(result.is_ok(), accepted);
            if accepted {
                claim!(state.highest_bid > highest);
            }
            highest = state.highest_bid;

            let leader = state.highest_bidder.expect("There is a leader");
            claim_eq!(state.ledger.amount_of(&leader), state.highest_bid);
            claim_eq!(custodian.balance() + custodian.paid(), custodian.received());
        }

        claim_eq!(state.highest_bidder, Some(CAROL));
        claim_eq!(state.highest_bid, ccd(1_000));
    }

    #[concordium_test]
    /// The highest bidder raising their own bid is refunded like anyone else.
    fn test_highest_bidder_outbids_themselves() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);

        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(1_000))
            .expect_report("First bid should pass");
        let outcome = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(3_000))
            .expect_report("Second bid should pass");

        claim_eq!(
            outcome.refund,
            Some(Refund {
                bidder: ALICE,
                amount: ccd(1_300),
            })
        );
        claim_eq!(state.ledger.amount_of(&ALICE), ccd(3_000));
    }

    #[concordium_test]
    fn test_bid_is_rejected_from_end_time() {
        let clock = ManualClock::at(end_of_hour() - 1);
        let mut custodian = MemoryCustodian::new();
        let mut state = State::new(OWNER, HOUR, &ManualClock::at(START))
            .expect_report("Auction should be created");

        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(10))
            .expect_report("Bid right before the end should pass");

        clock.advance(Duration::from_millis(1));
        claim_eq!(
            deposit_and_bid(&mut state, &clock, &mut custodian, BOB, ccd(20)),
            Err(CustomContractError::AuctionClosed)
        );
        claim_eq!(state.highest_bidder, Some(ALICE));
    }

    #[concordium_test]
    fn test_pause_blocks_bidding() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);

        claim_eq!(state.set_paused(&owner(), true), Ok(()));
        claim_eq!(
            deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(10)),
            Err(CustomContractError::AuctionPaused)
        );

        claim_eq!(state.set_paused(&owner(), false), Ok(()));
        claim!(deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(10)).is_ok());
    }

    #[concordium_test]
    fn test_closed_is_reported_before_paused() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);
        claim_eq!(state.set_paused(&owner(), true), Ok(()));

        clock.set(end_of_hour());
        claim_eq!(
            deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(10)),
            Err(CustomContractError::AuctionClosed)
        );
    }

    #[concordium_test]
    fn test_set_paused_is_owner_only() {
        let clock = ManualClock::at(START);
        let mut state = new_auction(&clock);

        claim_eq!(
            state.set_paused(&Address::Account(ALICE), true),
            Err(CustomContractError::NotOwner)
        );
        claim_eq!(
            state.set_paused(&Address::Contract(BICTORY), true),
            Err(CustomContractError::NotOwner)
        );
        claim!(!state.paused);

        // Setting the current value again is allowed
        claim_eq!(state.set_paused(&owner(), false), Ok(()));
        claim_eq!(state.set_paused(&owner(), true), Ok(()));
        claim_eq!(state.set_paused(&owner(), true), Ok(()));
        claim!(state.paused);
    }

    #[concordium_test]
    fn test_failed_refund_changes_nothing() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);

        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(1_000))
            .expect_report("Alice's bid should pass");
        let before = state.clone();
        custodian.refuse_payments_to(ALICE);

        claim_eq!(
            state.place_bid(&clock, &mut custodian, BOB, ccd(2_000)),
            Err(CustomContractError::RefundTransferFailed)
        );

        claim_eq!(state, before);
        claim!(!state.locked);
        claim!(custodian.payouts().is_empty());
        claim_eq!(state.ledger.amount_of(&BOB), Amount::zero());
    }

    #[concordium_test]
    fn test_finalize() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);
        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(500))
            .expect_report("Bidding should pass");

        claim_eq!(state.finalize(&clock), Err(CustomContractError::TooEarly));
        clock.set(end_of_hour() - 1);
        claim_eq!(state.finalize(&clock), Err(CustomContractError::TooEarly));
        claim!(!state.ended);

        clock.set(end_of_hour());
        claim_eq!(
            state.finalize(&clock),
            Ok(AuctionResult {
                winner: Some(ALICE),
                amount: ccd(500),
            })
        );
        claim!(state.ended);

        claim_eq!(
            state.finalize(&clock),
            Err(CustomContractError::AlreadyEnded)
        );
        clock.advance(Duration::from_millis(1_000_000));
        claim_eq!(
            state.finalize(&clock),
            Err(CustomContractError::AlreadyEnded)
        );
    }

    #[concordium_test]
    /// No bids: finalize reports no winner and the owner withdraws nothing.
    fn test_bidless_auction() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);

        clock.set(end_of_hour() + 1);
        claim_eq!(
            state.finalize(&clock),
            Ok(AuctionResult {
                winner: None,
                amount: Amount::zero(),
            })
        );
        claim_eq!(
            state.withdraw(&mut custodian, &owner()),
            Ok(Amount::zero())
        );
        claim!(custodian.payouts().is_empty());
    }

    #[concordium_test]
    fn test_withdraw_requires_finalization() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);
        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(500))
            .expect_report("Bidding should pass");

        claim_eq!(
            state.withdraw(&mut custodian, &owner()),
            Err(CustomContractError::NotEnded)
        );

        // Passing the end time is not enough
        clock.set(end_of_hour() + 10);
        claim_eq!(
            state.withdraw(&mut custodian, &owner()),
            Err(CustomContractError::NotEnded)
        );
        claim_eq!(custodian.balance(), ccd(500));
    }

    #[concordium_test]
    fn test_withdraw_is_owner_only() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);
        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(500))
            .expect_report("Bidding should pass");

        for caller in [Address::Account(ALICE), Address::Contract(BICTORY)].iter() {
            claim_eq!(
                state.withdraw(&mut custodian, caller),
                Err(CustomContractError::NotOwner)
            );
        }

        clock.set(end_of_hour());
        let _ = state.finalize(&clock).expect_report("Finalize should pass");
        claim_eq!(
            state.withdraw(&mut custodian, &Address::Account(ALICE)),
            Err(CustomContractError::NotOwner)
        );
        claim_eq!(custodian.balance(), ccd(500));
    }

    #[concordium_test]
    fn test_withdraw_pays_custody_to_owner_once() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = new_auction(&clock);
        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, ALICE, ccd(1_000_000))
            .expect_report("Alice's bid should pass");
        let _ = deposit_and_bid(&mut state, &clock, &mut custodian, BOB, ccd(2_000_000))
            .expect_report("Bob's bid should pass");

        clock.set(end_of_hour());
        let _ = state.finalize(&clock).expect_report("Finalize should pass");

        claim_eq!(
            state.withdraw(&mut custodian, &owner()),
            Ok(ccd(1_800_000))
        );
        claim_eq!(custodian.paid_to(&OWNER), ccd(1_800_000));
        claim_eq!(custodian.balance(), Amount::zero());
        claim_eq!(custodian.paid(), custodian.received());

        claim_eq!(
            state.withdraw(&mut custodian, &owner()),
            Ok(Amount::zero())
        );
        claim_eq!(custodian.paid_to(&OWNER), ccd(1_800_000));
    }

    #[concordium_test]
    fn test_failed_withdrawal_can_be_retried() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = ended_auction(&clock);
        custodian.deposit(ccd(700));
        custodian.refuse_payments_to(OWNER);

        claim_eq!(
            state.withdraw(&mut custodian, &owner()),
            Err(CustomContractError::WithdrawalTransferFailed)
        );
        claim_eq!(custodian.balance(), ccd(700));
        claim!(state.ended);
        claim!(!state.locked);

        custodian.accept_payments_to(&OWNER);
        claim_eq!(state.withdraw(&mut custodian, &owner()), Ok(ccd(700)));
    }

    #[concordium_test]
    fn test_locked_auction_rejects_operations() {
        let clock = ManualClock::at(START);
        let mut custodian = MemoryCustodian::new();
        let mut state = ended_auction(&clock);
        state.locked = true;

        claim_eq!(
            state.place_bid(&clock, &mut custodian, ALICE, ccd(10)),
            Err(CustomContractError::Reentrancy)
        );
        claim_eq!(
            state.withdraw(&mut custodian, &owner()),
            Err(CustomContractError::Reentrancy)
        );
        claim_eq!(
            state.finalize(&clock),
            Err(CustomContractError::Reentrancy)
        );
        claim_eq!(
            state.set_paused(&owner(), true),
            Err(CustomContractError::Reentrancy)
        );
        claim!(state.locked);

        state.unlock();
        claim_eq!(state.lock(), Ok(()));
        claim_eq!(state.lock(), Err(CustomContractError::Reentrancy));
    }

    #[concordium_test]
    fn test_status() {
        let clock = ManualClock::at(START);
        let mut state = new_auction(&clock);

        clock.advance(Duration::from_millis(600_000));
        claim_eq!(
            state.status(&clock),
            AuctionStatus {
                end_time: Timestamp::from_timestamp_millis(end_of_hour()),
                time_remaining: Duration::from_millis(3_000_000),
                ended: false,
                paused: false,
            }
        );

        claim_eq!(state.set_paused(&owner(), true), Ok(()));
        clock.set(end_of_hour() + 5_000);
        let _ = state.finalize(&clock).expect_report("Finalize should pass");

        let status = state.status(&clock);
        claim_eq!(status.time_remaining, Duration::from_millis(0));
        claim!(status.ended);
        claim!(status.paused);
    }
}
