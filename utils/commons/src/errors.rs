use super::*;

/// The custom errors the contract can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum CustomContractError {
    /// Failed parsing the parameter (Error code: -1).
    #[from(ParseError)]
    ParseParams,
    /// Failed logging: Log is full (Error code: -2).
    LogFull,
    /// Failed logging: Log is malformed (Error code: -3).
    LogMalformed,
    /// Only account addresses can bid (Error code: -4).
    OnlyAccountAddress,
    /// Auction duration is zero or the end time is out of range (Error code: -5).
    InvalidDuration,
    /// Raised if a bid is placed at or after the auction end time (Error code: -6)
    AuctionClosed,
    /// Raised if a bid is placed while the auction is paused (Error code: -7)
    AuctionPaused,
    /// Raised if bid is not higher than the highest amount (Error code: -8)
    BidTooLow,
    /// Refunding the outbid bidder failed (Error code: -9).
    RefundTransferFailed,
    /// Raised if there is an attempt to finalize the auction before its end time
    /// (Error code: -10)
    TooEarly,
    /// The auction has already been finalized (Error code: -11).
    AlreadyEnded,
    /// Only the auction owner has access (Error code: -12).
    NotOwner,
    /// Raised on withdrawal from an auction that is not finalized (Error code: -13)
    NotEnded,
    /// Paying the proceeds to the owner failed (Error code: -14).
    WithdrawalTransferFailed,
    /// Another operation on the auction is still in progress (Error code: -15).
    Reentrancy,
}

/// Mapping the logging errors to CustomContractError.
impl From<LogError> for CustomContractError {
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}
