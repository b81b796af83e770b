use super::*;

/// The state of the smart contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SchemaType)]
pub struct State {
    /// Account that created the auction and receives the proceeds.
    pub owner: AccountAddress,
    /// Bids are accepted strictly before this time.
    pub end_time: Timestamp,
    /// Current highest bidder, if any bid was placed.
    pub highest_bidder: Option<AccountAddress>,
    /// Current highest bid, zero before the first bid.
    pub highest_bid: Amount,
    /// Set once by a successful finalization.
    pub ended: bool,
    /// Bidding is rejected while set.
    pub paused: bool,
    /// Deposits per bidder.
    pub ledger: BidLedger,
    /// Held for the duration of an operation.
    pub locked: bool,
}

/// Type of the parameter to the `init` function.
#[derive(Debug, Serialize, SchemaType)]
pub struct InitParameter {
    /// Auction duration in seconds.
    pub duration: u64,
}

/// Return value of the `status` function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SchemaType)]
pub struct AuctionStatus {
    pub end_time: Timestamp,
    pub time_remaining: Duration,
    pub ended: bool,
    pub paused: bool,
}

/// The part of the state to be viewed using `concordium-client contract invoke`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SchemaType)]
pub struct ViewableState {
    pub owner: AccountAddress,
    pub end_time: Timestamp,
    pub highest_bidder: Option<AccountAddress>,
    pub highest_bid: Amount,
    pub ended: bool,
    pub paused: bool,
    /// Number of recorded deposits.
    pub deposits: u32,
}

/// Payment owed to a bidder who got outbid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refund {
    pub bidder: AccountAddress,
    pub amount: Amount,
}

/// Accepted bid, together with the refund that was paid for it.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidOutcome {
    pub bidder: AccountAddress,
    pub amount: Amount,
    pub refund: Option<Refund>,
}

/// Auction winner. Both fields are empty if no bids were placed.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionResult {
    pub winner: Option<AccountAddress>,
    pub amount: Amount,
}
