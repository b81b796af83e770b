use super::*;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Clock reading the slot time of the block the call is executed in.
pub struct SlotClock {
    slot_time: Timestamp,
}

impl SlotClock {
    pub fn from_context(ctx: &impl HasCommonData) -> Self {
        Self {
            slot_time: ctx.metadata().slot_time(),
        }
    }
}

impl Clock for SlotClock {
    fn now(&self) -> Timestamp {
        self.slot_time
    }
}

/// Temporal phase of the auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the end time. Bids are accepted.
    Bidding,
    /// At or after the end time.
    Closed,
}

impl Phase {
    pub fn at(end_time: Timestamp, now: Timestamp) -> Self {
        if now < end_time {
            Phase::Bidding
        } else {
            Phase::Closed
        }
    }

    pub fn is_closed(self) -> bool {
        matches!(self, Phase::Closed)
    }
}

/// Time left until `end_time`, zero once it has passed.
pub fn time_remaining(end_time: Timestamp, now: Timestamp) -> Duration {
    Duration::from_millis(
        end_time
            .timestamp_millis()
            .saturating_sub(now.timestamp_millis()),
    )
}

/// End time of an auction started at `start` and running for `seconds`.
pub fn end_time_after(start: Timestamp, seconds: u64) -> Option<Timestamp> {
    seconds
        .checked_mul(1000)
        .and_then(|millis| start.checked_add(Duration::from_millis(millis)))
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use test_infrastructure::*;

    const END: u64 = 10_000;

    fn at(millis: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(millis)
    }

    #[concordium_test]
    fn test_phase_changes_at_end_time() {
        claim_eq!(Phase::at(at(END), at(0)), Phase::Bidding);
        claim_eq!(Phase::at(at(END), at(END - 1)), Phase::Bidding);
        claim_eq!(Phase::at(at(END), at(END)), Phase::Closed);
        claim_eq!(Phase::at(at(END), at(END + 1)), Phase::Closed);
    }

    #[concordium_test]
    fn test_time_remaining_saturates() {
        claim_eq!(time_remaining(at(END), at(4_000)), Duration::from_millis(6_000));
        claim_eq!(time_remaining(at(END), at(END)), Duration::from_millis(0));
        claim_eq!(time_remaining(at(END), at(END + 500)), Duration::from_millis(0));
    }

    #[concordium_test]
    fn test_end_time_after() {
        claim_eq!(end_time_after(at(1_000), 3600), Some(at(3_601_000)));
        claim_eq!(end_time_after(at(1_000), u64::MAX), None);
        claim_eq!(end_time_after(at(u64::MAX - 10), 1), None);
    }

    #[concordium_test]
    fn test_slot_clock_reads_context() {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_metadata_slot_time(at(42));

        claim_eq!(SlotClock::from_context(&ctx).now(), at(42));
    }
}
