use super::*;

/// Tag for the Auction Initialized event.
pub const INITIALIZED_TAG: u8 = u8::MAX;

/// Tag for the Custom Biding event.
pub const BIDING_TAG: u8 = u8::MAX - 1;

/// Tag for the Refund event, issued when a bidder gets outbid.
pub const REFUND_TAG: u8 = u8::MAX - 2;

/// Tag for the Custom Finalize Biding event.
pub const FINALIZE_TAG: u8 = u8::MAX - 3;

/// Tag for the Withdraw event.
pub const WITHDRAW_TAG: u8 = u8::MAX - 4;

/// Tag for the Pause event.
pub const PAUSE_TAG: u8 = u8::MAX - 5;

/// Bonus paid to an outbid bidder, as a share of the new bid.
pub const REFUND_BONUS: Percentage = Percentage::from_percent(10);
