use super::*;

/// Runs `operation` on a copy of the state and stores the copy only if the
/// operation succeeds. The stored state stays locked while funds are moved, so
/// a call made from within a transfer is rejected.
fn transact<H, R, F>(host: &mut H, operation: F) -> ContractResult<R>
where
    H: HasHost<State>,
    F: FnOnce(&mut State, &mut HostCustodian<H>) -> ContractResult<R>,
{
    let mut staged = host.state().clone();
    host.state_mut().lock()?;

    match operation(&mut staged, &mut HostCustodian::new(host)) {
        Ok(value) => {
            *host.state_mut() = staged;
            Ok(value)
        }
        Err(error) => {
            host.state_mut().unlock();
            Err(error)
        }
    }
}

/// Init function that creates a new auction. The sender becomes the owner.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - The duration is zero or the end time is out of range.
/// - It fails to log `Initialized` event.
#[init(
    contract = "BictoryBonusAuction",
    parameter = "InitParameter",
    enable_logger
)]
fn init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    _state_builder: &mut StateBuilder<S>,
    logger: &mut impl HasLogger,
) -> InitResult<State> {
    let params: InitParameter = ctx.parameter_cursor().get()?;
    let owner = ctx.init_origin();
    let state = State::new(owner, params.duration, &SlotClock::from_context(ctx))?;

    // Event for auction initialization.
    logger
        .log(&CustomEvent::Initialized(InitializedEvent {
            owner,
            duration: params.duration,
            end_time: state.end_time,
        }))
        .map_err(CustomContractError::from)?;

    Ok(state)
}

/// Receive function in which accounts can bid before the auction end time.
/// The previous highest bidder gets their deposit back plus 10% of the new bid.
///
/// It rejects if:
/// - Sender is a contract.
/// - The end time has been reached.
/// - The auction is paused.
/// - The bid is not higher than the highest bid.
/// - The previous highest bidder can not be refunded.
/// - It fails to log `Refund` or `Bid` event.
#[receive(
    contract = "BictoryBonusAuction",
    name = "bid",
    mutable,
    payable,
    enable_logger
)]
fn bid<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let bidder = match ctx.sender() {
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress),
        Address::Account(account_address) => account_address,
    };
    let clock = SlotClock::from_context(ctx);

    let outcome = transact(host, |state, custodian| {
        state.place_bid(&clock, custodian, bidder, amount)
    })?;

    if let Some(refund) = outcome.refund {
        logger.log(&CustomEvent::Refund(refund.into()))?;
    }
    logger.log(&CustomEvent::Bid((&outcome).into()))?;

    Ok(())
}

/// Receive function used to finalize the auction. Anyone can finalize once the
/// end time has been reached.
///
/// It rejects if:
/// - The end time has not been reached yet.
/// - The auction is already finalized.
/// - It fails to log `Finalize` event.
#[receive(
    contract = "BictoryBonusAuction",
    name = "finalize",
    mutable,
    enable_logger
)]
fn finalize<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let result = host
        .state_mut()
        .finalize(&SlotClock::from_context(ctx))?;

    // Event for Finalize.
    logger.log(&CustomEvent::Finalize(result.into()))?;

    Ok(())
}

/// Receive function used by the owner to collect the contract balance after
/// finalization.
///
/// It rejects if:
/// - Sender is not the owner.
/// - The auction is not finalized.
/// - The transfer to the owner fails.
/// - It fails to log `Withdraw` event.
#[receive(
    contract = "BictoryBonusAuction",
    name = "withdraw",
    mutable,
    enable_logger
)]
fn withdraw<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let sender = ctx.sender();

    let amount = transact(host, |state, custodian| state.withdraw(custodian, &sender))?;

    logger.log(&CustomEvent::Withdraw(WithdrawEvent {
        owner: host.state().owner,
        amount,
    }))?;

    Ok(())
}

/// Pause or resume bidding. Takes the new pause flag as a parameter.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - Sender is not the owner.
/// - It fails to log `Pause` event.
#[receive(
    contract = "BictoryBonusAuction",
    name = "setPaused",
    parameter = "bool",
    mutable,
    enable_logger
)]
fn set_paused<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let paused: bool = ctx.parameter_cursor().get()?;

    host.state_mut().set_paused(&ctx.sender(), paused)?;

    logger.log(&CustomEvent::Pause(paused))?;

    Ok(())
}

/// View function that returns the end time, the time left and the flags.
#[receive(
    contract = "BictoryBonusAuction",
    name = "status",
    return_value = "AuctionStatus"
)]
fn status<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State, StateApiType = S>,
) -> ReceiveResult<AuctionStatus> {
    Ok(host.state().status(&SlotClock::from_context(ctx)))
}

/// View function that returns the contents of the state except the ledger.
#[receive(
    contract = "BictoryBonusAuction",
    name = "view",
    return_value = "ViewableState"
)]
fn view<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State, StateApiType = S>,
) -> ReceiveResult<ViewableState> {
    Ok(host.state().view())
}

/// View function that returns the deposit recorded for an account.
#[receive(
    contract = "BictoryBonusAuction",
    name = "bidOf",
    parameter = "AccountAddress",
    return_value = "Amount"
)]
fn bid_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State, StateApiType = S>,
) -> ReceiveResult<Amount> {
    let bidder: AccountAddress = ctx.parameter_cursor().get()?;

    Ok(host.state().ledger.amount_of(&bidder))
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use test_infrastructure::*;

    const START: u64 = 1_000;
    const DURATION: u64 = 3600;
    const OWNER: AccountAddress = AccountAddress([0u8; 32]);
    const ALICE: AccountAddress = AccountAddress([1u8; 32]);
    const BOB: AccountAddress = AccountAddress([2u8; 32]);
    const PROXY: ContractAddress = ContractAddress {
        index: 7,
        subindex: 0,
    };

    fn end_time() -> u64 {
        START + DURATION * 1000
    }

    fn ccd(micro_ccd: u64) -> Amount {
        Amount::from_micro_ccd(micro_ccd)
    }

    fn expect_error<E, T>(expr: Result<T, E>, err: E, msg: &str)
    where
        E: Eq + Debug,
        T: Debug,
    {
        let actual = expr.expect_err(msg);
        claim_eq!(actual, err);
    }

    fn parametrized_init_ctx<'a>(parameter_bytes: &'a [u8]) -> TestInitContext<'a> {
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER)
            .set_metadata_slot_time(Timestamp::from_timestamp_millis(START))
            .set_parameter(parameter_bytes);
        ctx
    }

    fn new_ctx<'a>(sender: AccountAddress, slot_time: u64) -> TestReceiveContext<'a> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(sender))
            .set_owner(OWNER)
            .set_metadata_slot_time(Timestamp::from_timestamp_millis(slot_time));
        ctx
    }

    fn new_host() -> TestHost<State> {
        let parameter_bytes = to_bytes(&InitParameter { duration: DURATION });
        let ctx = parametrized_init_ctx(&parameter_bytes);
        let mut state_builder = TestStateBuilder::new();
        let mut logger = TestLogger::init();

        let state = init(&ctx, &mut state_builder, &mut logger)
            .expect_report("Contract initialization results in error");
        TestHost::new(state, state_builder)
    }

    /// The chain credits the bid amount before executing the call.
    fn place_bid(
        host: &mut TestHost<State>,
        bidder: AccountAddress,
        amount: Amount,
        logger: &mut TestLogger,
    ) -> ContractResult<()> {
        let ctx = new_ctx(bidder, START + 10);
        host.set_self_balance(host.self_balance() + amount);
        bid(&ctx, host, amount, logger)
    }

    fn logged_event(logger: &TestLogger, index: usize) -> CustomEvent {
        from_bytes(&logger.logs[index]).expect_report("Event should parse")
    }

    #[concordium_test]
    /// Test that the smart-contract initialization sets the state correctly
    /// and logs the initialization event.
    fn test_init() {
        let parameter_bytes = to_bytes(&InitParameter { duration: DURATION });
        let ctx = parametrized_init_ctx(&parameter_bytes);
        let mut state_builder = TestStateBuilder::new();
        let mut logger = TestLogger::init();

        let state = init(&ctx, &mut state_builder, &mut logger)
            .expect_report("Contract initialization results in error");

        claim_eq!(state.owner, OWNER);
        claim_eq!(state.end_time, Timestamp::from_timestamp_millis(end_time()));
        claim_eq!(state.highest_bidder, None);
        claim_eq!(logger.logs.len(), 1);
        claim_eq!(
            logged_event(&logger, 0),
            CustomEvent::Initialized(InitializedEvent {
                owner: OWNER,
                duration: DURATION,
                end_time: Timestamp::from_timestamp_millis(end_time()),
            })
        );
    }

    #[concordium_test]
    fn test_init_zero_duration() {
        let parameter_bytes = to_bytes(&InitParameter { duration: 0 });
        let ctx = parametrized_init_ctx(&parameter_bytes);
        let mut state_builder = TestStateBuilder::new();
        let mut logger = TestLogger::init();

        let result = init(&ctx, &mut state_builder, &mut logger);

        claim!(result.is_err(), "Zero duration should be rejected");
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    /// Alice bids 1 CCD, Bob bids 2 CCD. Alice is refunded 1.2 CCD and both the
    /// refund and the new bid are logged.
    fn test_bid_refunds_previous_bidder() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        claim_eq!(place_bid(&mut host, ALICE, ccd(1_000_000), &mut logger), Ok(()));
        claim_eq!(place_bid(&mut host, BOB, ccd(2_000_000), &mut logger), Ok(()));

        claim!(host.transfer_occurred(&ALICE, ccd(1_200_000)));
        claim_eq!(host.state().highest_bidder, Some(BOB));
        claim_eq!(host.state().highest_bid, ccd(2_000_000));
        claim!(!host.state().locked);

        claim_eq!(logger.logs.len(), 3);
        claim_eq!(
            logged_event(&logger, 1),
            CustomEvent::Refund(RefundEvent {
                bidder: ALICE,
                amount: ccd(1_200_000),
            })
        );
        claim_eq!(
            logged_event(&logger, 2),
            CustomEvent::Bid(BidEvent {
                bidder: BOB,
                amount: ccd(2_000_000),
            })
        );
    }

    #[concordium_test]
    fn test_bid_from_contract_is_rejected() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(PROXY))
            .set_metadata_slot_time(Timestamp::from_timestamp_millis(START));

        expect_error(
            bid(&ctx, &mut host, ccd(10), &mut logger),
            CustomContractError::OnlyAccountAddress,
            "Bidding from a contract should fail",
        );
    }

    #[concordium_test]
    fn test_bid_with_equal_amount() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        claim_eq!(place_bid(&mut host, ALICE, ccd(1_000_000), &mut logger), Ok(()));
        expect_error(
            place_bid(&mut host, BOB, ccd(1_000_000), &mut logger),
            CustomContractError::BidTooLow,
            "Bidding the highest amount again should fail",
        );
        claim_eq!(host.state().highest_bidder, Some(ALICE));
    }

    #[concordium_test]
    /// A refund the contract can not pay rejects the bid and leaves the state
    /// untouched, including the lock.
    fn test_failed_refund_rejects_bid() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        claim_eq!(place_bid(&mut host, ALICE, ccd(1_000_000), &mut logger), Ok(()));
        let before = host.state().clone();

        // Not enough to cover the deposit and the bonus
        host.set_self_balance(ccd(1_100_000));
        let ctx = new_ctx(BOB, START + 20);
        expect_error(
            bid(&ctx, &mut host, ccd(2_000_000), &mut logger),
            CustomContractError::RefundTransferFailed,
            "Bid should fail when the refund can not be paid",
        );

        claim_eq!(*host.state(), before);
        claim!(!host.transfer_occurred(&ALICE, ccd(1_200_000)));
        claim_eq!(logger.logs.len(), 1);
    }

    #[concordium_test]
    fn test_call_during_operation_is_rejected() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        host.state_mut().locked = true;

        expect_error(
            place_bid(&mut host, ALICE, ccd(10), &mut logger),
            CustomContractError::Reentrancy,
            "Bidding into a locked auction should fail",
        );
        let ctx = new_ctx(OWNER, end_time());
        expect_error(
            withdraw(&ctx, &mut host, &mut logger),
            CustomContractError::Reentrancy,
            "Withdrawing from a locked auction should fail",
        );
        claim!(host.state().locked);
    }

    #[concordium_test]
    fn test_pause_and_resume() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let pause = to_bytes(&true);
        let mut ctx = new_ctx(ALICE, START);
        ctx.set_parameter(&pause);
        expect_error(
            set_paused(&ctx, &mut host, &mut logger),
            CustomContractError::NotOwner,
            "Only the owner can pause",
        );

        let mut ctx = new_ctx(OWNER, START);
        ctx.set_parameter(&pause);
        claim_eq!(set_paused(&ctx, &mut host, &mut logger), Ok(()));
        claim_eq!(logged_event(&logger, 0), CustomEvent::Pause(true));
        expect_error(
            place_bid(&mut host, ALICE, ccd(10), &mut logger),
            CustomContractError::AuctionPaused,
            "Bidding should fail while paused",
        );

        let resume = to_bytes(&false);
        let mut ctx = new_ctx(OWNER, START);
        ctx.set_parameter(&resume);
        claim_eq!(set_paused(&ctx, &mut host, &mut logger), Ok(()));
        claim_eq!(place_bid(&mut host, ALICE, ccd(10), &mut logger), Ok(()));
    }

    #[concordium_test]
    /// Test a full auction:
    /// 1. Alice and Bob bid.
    /// 2. Finalizing and withdrawing before the end time fail.
    /// 3. Withdrawing after the end time but before finalization fails.
    /// 4. Anyone finalizes, a second finalization fails.
    /// 5. Only the owner can withdraw, and gets the whole contract balance.
    fn test_auction_bid_finalize_and_withdraw() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        claim_eq!(place_bid(&mut host, ALICE, ccd(1_000_000), &mut logger), Ok(()));
        claim_eq!(place_bid(&mut host, BOB, ccd(2_000_000), &mut logger), Ok(()));

        let early = new_ctx(ALICE, end_time() - 1);
        expect_error(
            finalize(&early, &mut host, &mut logger),
            CustomContractError::TooEarly,
            "Finalizing before the end time should fail",
        );

        let owner_ctx = new_ctx(OWNER, end_time() + 1);
        expect_error(
            withdraw(&owner_ctx, &mut host, &mut logger),
            CustomContractError::NotEnded,
            "Withdrawing before finalization should fail",
        );

        let anyone = new_ctx(ALICE, end_time());
        claim_eq!(finalize(&anyone, &mut host, &mut logger), Ok(()));
        claim_eq!(
            logged_event(&logger, logger.logs.len() - 1),
            CustomEvent::Finalize(FinalizeEvent {
                winner: Some(BOB),
                amount: ccd(2_000_000),
            })
        );
        expect_error(
            finalize(&anyone, &mut host, &mut logger),
            CustomContractError::AlreadyEnded,
            "Finalizing a second time should fail",
        );

        let alice_ctx = new_ctx(ALICE, end_time() + 1);
        expect_error(
            withdraw(&alice_ctx, &mut host, &mut logger),
            CustomContractError::NotOwner,
            "Only the owner can withdraw",
        );

        let custody = host.self_balance();
        claim_eq!(withdraw(&owner_ctx, &mut host, &mut logger), Ok(()));
        claim!(host.transfer_occurred(&OWNER, custody));
        claim_eq!(
            logged_event(&logger, logger.logs.len() - 1),
            CustomEvent::Withdraw(WithdrawEvent {
                owner: OWNER,
                amount: custody,
            })
        );
    }

    #[concordium_test]
    fn test_bidless_auction() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let ctx = new_ctx(OWNER, end_time() + 1);
        claim_eq!(finalize(&ctx, &mut host, &mut logger), Ok(()));
        claim_eq!(withdraw(&ctx, &mut host, &mut logger), Ok(()));

        claim_eq!(
            logged_event(&logger, 0),
            CustomEvent::Finalize(FinalizeEvent {
                winner: None,
                amount: Amount::zero(),
            })
        );
        claim_eq!(
            logged_event(&logger, 1),
            CustomEvent::Withdraw(WithdrawEvent {
                owner: OWNER,
                amount: Amount::zero(),
            })
        );
    }

    #[concordium_test]
    fn test_views() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        claim_eq!(place_bid(&mut host, ALICE, ccd(500), &mut logger), Ok(()));

        let ctx = new_ctx(BOB, START + 1_000);
        let status = status(&ctx, &host).expect_report("Status should be returned");
        claim_eq!(
            status,
            AuctionStatus {
                end_time: Timestamp::from_timestamp_millis(end_time()),
                time_remaining: Duration::from_millis(DURATION * 1000 - 1_000),
                ended: false,
                paused: false,
            }
        );

        let view = view(&ctx, &host).expect_report("View should be returned");
        claim_eq!(view.owner, OWNER);
        claim_eq!(view.highest_bidder, Some(ALICE));
        claim_eq!(view.highest_bid, ccd(500));
        claim_eq!(view.deposits, 1);

        let parameter_bytes = to_bytes(&ALICE);
        let mut ctx = new_ctx(BOB, START);
        ctx.set_parameter(&parameter_bytes);
        claim_eq!(bid_of(&ctx, &host), Ok(ccd(500)));

        let parameter_bytes = to_bytes(&BOB);
        ctx.set_parameter(&parameter_bytes);
        claim_eq!(bid_of(&ctx, &host), Ok(Amount::zero()));
    }
}
