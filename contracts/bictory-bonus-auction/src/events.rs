use super::*;

/// Auction initialization event data.
#[derive(Debug, PartialEq, Eq, Serialize, SchemaType)]
pub struct InitializedEvent {
    /// Account receiving the proceeds.
    pub owner: AccountAddress,
    /// Auction duration in seconds.
    pub duration: u64,
    /// Bids are accepted strictly before this time.
    pub end_time: Timestamp,
}

/// Bid event data.
#[derive(Debug, PartialEq, Eq, Serialize, SchemaType)]
pub struct BidEvent {
    /// Bidder account address.
    pub bidder: AccountAddress,
    /// Bid amount.
    pub amount: Amount,
}

/// Refund event data.
#[derive(Debug, PartialEq, Eq, Serialize, SchemaType)]
pub struct RefundEvent {
    /// Outbid account address.
    pub bidder: AccountAddress,
    /// Returned deposit including the bonus.
    pub amount: Amount,
}

/// Auction finalization event data.
#[derive(Debug, PartialEq, Eq, Serialize, SchemaType)]
pub struct FinalizeEvent {
    /// Address of the auction winner, none if nobody bid.
    pub winner: Option<AccountAddress>,
    /// Winning auction bid.
    pub amount: Amount,
}

/// Withdraw event data.
#[derive(Debug, PartialEq, Eq, Serialize, SchemaType)]
pub struct WithdrawEvent {
    pub owner: AccountAddress,
    pub amount: Amount,
}

/// Tagged Custom event to be serialized for the event log.
#[derive(Debug, PartialEq, Eq)]
pub enum CustomEvent {
    Initialized(InitializedEvent),
    Bid(BidEvent),
    Refund(RefundEvent),
    Finalize(FinalizeEvent),
    Withdraw(WithdrawEvent),
    /// New value of the pause flag.
    Pause(bool),
}

impl From<&BidOutcome> for BidEvent {
    fn from(outcome: &BidOutcome) -> Self {
        Self {
            bidder: outcome.bidder,
            amount: outcome.amount,
        }
    }
}

impl From<Refund> for RefundEvent {
    fn from(refund: Refund) -> Self {
        Self {
            bidder: refund.bidder,
            amount: refund.amount,
        }
    }
}

impl From<AuctionResult> for FinalizeEvent {
    fn from(result: AuctionResult) -> Self {
        Self {
            winner: result.winner,
            amount: result.amount,
        }
    }
}

impl Serial for CustomEvent {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            CustomEvent::Initialized(event) => {
                out.write_u8(INITIALIZED_TAG)?;
                event.serial(out)
            }
            CustomEvent::Bid(event) => {
                out.write_u8(BIDING_TAG)?;
                event.serial(out)
            }
            CustomEvent::Refund(event) => {
                out.write_u8(REFUND_TAG)?;
                event.serial(out)
            }
            CustomEvent::Finalize(event) => {
                out.write_u8(FINALIZE_TAG)?;
                event.serial(out)
            }
            CustomEvent::Withdraw(event) => {
                out.write_u8(WITHDRAW_TAG)?;
                event.serial(out)
            }
            CustomEvent::Pause(paused) => {
                out.write_u8(PAUSE_TAG)?;
                paused.serial(out)
            }
        }
    }
}

impl Deserial for CustomEvent {
    fn deserial<R: Read>(source: &mut R) -> ParseResult<Self> {
        let tag = source.read_u8()?;
        match tag {
            INITIALIZED_TAG => InitializedEvent::deserial(source).map(CustomEvent::Initialized),
            BIDING_TAG => BidEvent::deserial(source).map(CustomEvent::Bid),
            REFUND_TAG => RefundEvent::deserial(source).map(CustomEvent::Refund),
            FINALIZE_TAG => FinalizeEvent::deserial(source).map(CustomEvent::Finalize),
            WITHDRAW_TAG => WithdrawEvent::deserial(source).map(CustomEvent::Withdraw),
            PAUSE_TAG => bool::deserial(source).map(CustomEvent::Pause),
            _ => Err(ParseError::default()),
        }
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;

    #[concordium_test]
    fn test_event_starts_with_tag() {
        let bytes = to_bytes(&CustomEvent::Pause(true));

        claim_eq!(bytes, vec![PAUSE_TAG, 1]);
    }

    #[concordium_test]
    fn test_unknown_tag_is_rejected() {
        let result: ParseResult<CustomEvent> = from_bytes(&[0u8, 1]);

        claim!(result.is_err());
    }
}
