multiversx_sc::imports!();
multiversx_sc::derive_imports!();

// ============================================================
// Side — the two staking destinations of an epoch
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    /// No vote yet. In an epoch result: the epoch ended in a draw.
    None,
    One,
    Two,
}

impl Side {
    pub fn is_valid(&self) -> bool {
        matches!(self, Side::One | Side::Two)
    }
}

// ============================================================
// Vote — a participant's commitment within one epoch
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub struct Vote<M: ManagedTypeApi> {
    /// Fixed by the first vote of the epoch.
    pub side: Side,
    /// Cumulative EGLD committed to `side` in this epoch.
    pub stake: BigUint<M>,
}

impl<M: ManagedTypeApi> Vote<M> {
    pub fn empty() -> Self {
        Vote {
            side: Side::None,
            stake: BigUint::zero(),
        }
    }
}

// ============================================================
// Epoch balance — view over the ledger of one (epoch, side)
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub struct EpochBalance<M: ManagedTypeApi> {
    /// Seeded by the settlement of the previous epoch.
    pub carried_in: BigUint<M>,
    /// Stakes placed during this epoch.
    pub fresh: BigUint<M>,
}

impl<M: ManagedTypeApi> EpochBalance<M> {
    pub fn total(&self) -> BigUint<M> {
        &self.carried_in + &self.fresh
    }
}

// ============================================================
// Epoch Result — written once when an epoch is settled
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub struct EpochResult<M: ManagedTypeApi> {
    /// `Side::None` on a draw.
    pub winner: Side,
    /// Part of the losing side's total shared among winners pro rata.
    pub distribution_chunk: BigUint<M>,
    /// Refund percentage in force when the epoch was settled (0 on a draw).
    pub winner_refund_percentage: u64,
    pub dev_fee: BigUint<M>,
    /// Fresh balance of the winning side, the denominator of each winner's share.
    pub winner_fresh: BigUint<M>,
}

impl<M: ManagedTypeApi> EpochResult<M> {
    pub fn draw() -> Self {
        EpochResult {
            winner: Side::None,
            distribution_chunk: BigUint::zero(),
            winner_refund_percentage: 0,
            dev_fee: BigUint::zero(),
            winner_fresh: BigUint::zero(),
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner == Side::None
    }
}
