#![no_std]

multiversx_sc::imports!();

pub mod types;

use types::{EpochBalance, EpochResult, Side, Vote};

// ============================================================
// Constants
// ============================================================

/// Percentages are whole numbers out of 100
const PERCENT_DENOMINATOR: u64 = 100;

/// Epoch window: 3 hours in seconds
const DEFAULT_EPOCH_DURATION: u64 = 10_800;

/// 0.1 EGLD minimum for the first vote of an epoch
const DEFAULT_MIN_STAKE: u64 = 100_000_000_000_000_000;

/// 1 bonus token credited per accepted vote
const DEFAULT_VERSUS_BONUS: u64 = 1_000_000_000_000_000_000;

const DEFAULT_DEV_FEE_PERCENTAGE: u64 = 5;
const DEFAULT_LOSER_TO_NEXT_EPOCH_PERCENTAGE: u64 = 30;
const DEFAULT_LOSER_TO_WINNERS_PERCENTAGE: u64 = 70;
const DEFAULT_WINNER_REFUND_PERCENTAGE: u64 = 95;

// ============================================================
// Errors
// ============================================================

pub const ERR_WRONG_SIDE: &str = "Wrong side";
pub const ERR_WRONG_AMOUNT: &str = "Wrong amount";
pub const ERR_WRONG_EPOCH: &str = "Wrong epoch";
pub const ERR_WRONG_PERCENTAGE: &str = "Wrong percentage";
pub const ERR_WRONG_DURATION: &str = "Wrong duration";
pub const ERR_WRONG_MIN_STAKE: &str = "Wrong min stake";
pub const ERR_WRONG_ADDRESS: &str = "Wrong address";
pub const ERR_WRONG_TOKEN: &str = "Wrong token";
pub const ERR_WRONG_START_IDX: &str = "Wrong startIdx";
pub const ERR_WRONG_STOP_IDX: &str = "Wrong stopIdx";
pub const ERR_EPOCH_RUNNING: &str = "Epoch running";
pub const ERR_EPOCH_FINISHED: &str = "Epoch finished";
pub const ERR_EPOCH_SETTLED: &str = "Epoch settled";
pub const ERR_EPOCH_NOT_SETTLED: &str = "Epoch not settled";
pub const ERR_OTHER_SIDE_BEFORE: &str = "Other side before";
pub const ERR_NO_EPOCH: &str = "No epoch";
pub const ERR_NO_REWARD: &str = "No reward";
pub const ERR_NO_BONUS: &str = "No bonus";
pub const ERR_INSUFFICIENT_BONUS_RESERVE: &str = "Insufficient bonus reserve";

// ============================================================
// Contract
// ============================================================

#[multiversx_sc::contract]
pub trait VersusMarket {
    // ========================================================
    // Init / Upgrade
    // ========================================================

    #[init]
    fn init(&self, dev_fee_receiver: ManagedAddress, bonus_token: TokenIdentifier) {
        require!(!dev_fee_receiver.is_zero(), ERR_WRONG_ADDRESS);
        require!(bonus_token.is_valid_esdt_identifier(), ERR_WRONG_TOKEN);

        self.dev_fee_receiver().set(&dev_fee_receiver);
        self.bonus_token().set(&bonus_token);

        self.epoch_duration().set(DEFAULT_EPOCH_DURATION);
        self.min_stake().set(BigUint::from(DEFAULT_MIN_STAKE));
        self.versus_bonus().set(BigUint::from(DEFAULT_VERSUS_BONUS));
        self.dev_fee_percentage().set(DEFAULT_DEV_FEE_PERCENTAGE);
        self.loser_to_next_epoch_percentage()
            .set(DEFAULT_LOSER_TO_NEXT_EPOCH_PERCENTAGE);
        self.loser_to_winners_percentage()
            .set(DEFAULT_LOSER_TO_WINNERS_PERCENTAGE);
        self.winner_refund_percentage()
            .set(DEFAULT_WINNER_REFUND_PERCENTAGE);

        self.current_epoch().set(0u64);
        self.current_epoch_started_at()
            .set(self.blockchain().get_block_timestamp());
    }

    #[upgrade]
    fn upgrade(&self) {}

    // ========================================================
    // ENDPOINT: makeVote
    // Stake EGLD on one side of the current epoch.
    // ========================================================

    #[endpoint(makeVote)]
    #[payable("EGLD")]
    fn make_vote(&self, side: Side) {
        require!(side.is_valid(), ERR_WRONG_SIDE);
        require!(!self.is_epoch_finished(), ERR_EPOCH_FINISHED);

        let caller = self.blockchain().get_caller();
        let amount = self.call_value().egld_value().clone_value();
        require!(amount > 0u64, ERR_WRONG_AMOUNT);

        let epoch = self.current_epoch().get();
        let vote_mapper = self.votes(epoch, &caller);
        let first_vote = vote_mapper.is_empty();

        // Only the opening vote of an epoch is held to the minimum; top-ups are not.
        let mut vote = if first_vote {
            require!(amount >= self.min_stake().get(), ERR_WRONG_AMOUNT);
            Vote {
                side,
                stake: BigUint::zero(),
            }
        } else {
            let existing = vote_mapper.get();
            require!(existing.side == side, ERR_OTHER_SIDE_BEFORE);
            existing
        };

        vote.stake += &amount;
        vote_mapper.set(&vote);

        if first_vote {
            self.pool_voters(epoch, side).push(&caller);
            self.voter_epochs(&caller).push(&epoch);
        }

        self.pool_fresh(epoch, side).update(|fresh| *fresh += &amount);

        let bonus = self.versus_bonus().get();
        self.pending_bonus(&caller).update(|pending| *pending += &bonus);

        self.voted_event(epoch, &caller, side, &amount);
    }

    // ========================================================
    // ENDPOINT: finishEpoch
    // Settles the current epoch once its window has elapsed
    // and opens the next one.
    // ========================================================

    #[only_owner]
    #[endpoint(finishEpoch)]
    fn finish_epoch(&self) {
        require!(self.is_epoch_finished(), ERR_EPOCH_RUNNING);

        let epoch = self.current_epoch().get();
        require!(self.epoch_results(epoch).is_empty(), ERR_EPOCH_SETTLED);

        let balance_one = self.pool_balance(epoch, Side::One);
        let balance_two = self.pool_balance(epoch, Side::Two);
        let total_one = balance_one.total();
        let total_two = balance_two.total();
        let next_epoch = epoch + 1;

        let result = if total_one == total_two {
            // Draw: each side keeps its whole balance for the next epoch.
            self.pool_carried_in(next_epoch, Side::One).set(&total_one);
            self.pool_carried_in(next_epoch, Side::Two).set(&total_two);
            EpochResult::draw()
        } else {
            let (winner, winner_fresh, loser_total) = if total_one > total_two {
                (Side::One, balance_one.fresh, total_two)
            } else {
                (Side::Two, balance_two.fresh, total_one)
            };

            // Carried-in value is not part of the fee base.
            let dev_fee =
                &winner_fresh * self.dev_fee_percentage().get() / PERCENT_DENOMINATOR;
            let distribution_chunk =
                &loser_total * self.loser_to_winners_percentage().get() / PERCENT_DENOMINATOR;
            let carry_half = (&loser_total - &distribution_chunk) / 2u64;

            self.pool_carried_in(next_epoch, Side::One).set(&carry_half);
            self.pool_carried_in(next_epoch, Side::Two).set(&carry_half);

            if dev_fee > 0u64 {
                let receiver = self.dev_fee_receiver().get();
                self.send().direct_egld(&receiver, &dev_fee);
                self.dev_fee_transferred_event(&receiver, epoch, &dev_fee);
            }

            EpochResult {
                winner,
                distribution_chunk,
                winner_refund_percentage: self.winner_refund_percentage().get(),
                dev_fee,
                winner_fresh,
            }
        };

        self.epoch_results(epoch).set(&result);
        self.current_epoch().set(next_epoch);
        self.current_epoch_started_at()
            .set(self.blockchain().get_block_timestamp());

        self.epoch_finished_event(
            epoch,
            result.winner,
            &result.dev_fee,
            &result.distribution_chunk,
        );
    }

    // ========================================================
    // ENDPOINT: withdrawPendingReward
    // Pays out what was earned since the stored cursor. Without
    // a loop limit every settled epoch is processed.
    // ========================================================

    #[endpoint(withdrawPendingReward)]
    fn withdraw_pending_reward(&self, start_idx: u64, opt_loop_limit: OptionalValue<u64>) {
        let caller = self.blockchain().get_caller();
        let loop_limit = opt_loop_limit.into_option().unwrap_or(0);
        let (amount, updated_idx) = self.compute_pending_reward(&caller, start_idx, loop_limit);
        require!(amount > 0u64, ERR_NO_REWARD);

        self.replay_cursor(&caller).set(updated_idx);

        self.send().direct_egld(&caller, &amount);
        self.reward_withdrawn_event(&caller, updated_idx, &amount);
    }

    // ========================================================
    // ENDPOINT: withdrawPendingBonus
    // Pays the per-vote bonus in the bonus token.
    // ========================================================

    #[endpoint(withdrawPendingBonus)]
    fn withdraw_pending_bonus(&self) {
        let caller = self.blockchain().get_caller();
        let pending = self.pending_bonus(&caller).get();
        require!(pending > 0u64, ERR_NO_BONUS);

        let token = self.bonus_token().get();
        let reserve = self
            .blockchain()
            .get_sc_balance(&EgldOrEsdtTokenIdentifier::esdt(token.clone()), 0);
        require!(reserve >= pending, ERR_INSUFFICIENT_BONUS_RESERVE);

        self.pending_bonus(&caller).clear();

        self.send().direct_esdt(&caller, &token, 0, &pending);
        self.bonus_withdrawn_event(&caller, &pending);
    }

    #[only_owner]
    #[endpoint(depositBonusReserve)]
    #[payable("*")]
    fn deposit_bonus_reserve(&self) {
        let payment = self.call_value().single_esdt();
        require!(
            payment.token_identifier == self.bonus_token().get(),
            ERR_WRONG_TOKEN
        );
        require!(payment.amount > 0u64, ERR_WRONG_AMOUNT);

        self.bonus_reserve_deposited_event(&payment.token_identifier, &payment.amount);
    }

    // ========================================================
    // OWNER: configuration
    // Changes apply to epochs that are not settled yet.
    // ========================================================

    #[only_owner]
    #[endpoint(updateEpochDuration)]
    fn update_epoch_duration(&self, duration: u64) {
        require!(duration > 0, ERR_WRONG_DURATION);
        self.epoch_duration().set(duration);
        self.emit_config_updated(b"epochDuration", &BigUint::from(duration));
    }

    #[only_owner]
    #[endpoint(updateMinStake)]
    fn update_min_stake(&self, min_stake: BigUint) {
        require!(min_stake > 0u64, ERR_WRONG_MIN_STAKE);
        self.min_stake().set(&min_stake);
        self.emit_config_updated(b"minStake", &min_stake);
    }

    #[only_owner]
    #[endpoint(updateVersusBonus)]
    fn update_versus_bonus(&self, bonus: BigUint) {
        self.versus_bonus().set(&bonus);
        self.emit_config_updated(b"versusBonus", &bonus);
    }

    #[only_owner]
    #[endpoint(updateDevFeePercentage)]
    fn update_dev_fee_percentage(&self, percentage: u64) {
        self.require_valid_percentage(percentage);
        self.dev_fee_percentage().set(percentage);
        self.emit_config_updated(b"devFeePercentage", &BigUint::from(percentage));
    }

    #[only_owner]
    #[endpoint(updatePoolLoserBalanceToNextEpochPercentage)]
    fn update_loser_to_next_epoch_percentage(&self, percentage: u64) {
        self.require_valid_percentage(percentage);
        self.loser_to_next_epoch_percentage().set(percentage);
        self.emit_config_updated(
            b"poolLoserBalanceToNextEpochPercentage",
            &BigUint::from(percentage),
        );
    }

    #[only_owner]
    #[endpoint(updatePoolLoserWinnersDistributionPercentage)]
    fn update_loser_to_winners_percentage(&self, percentage: u64) {
        self.require_valid_percentage(percentage);
        self.loser_to_winners_percentage().set(percentage);
        self.emit_config_updated(
            b"poolLoserWinnersDistributionPercentage",
            &BigUint::from(percentage),
        );
    }

    #[only_owner]
    #[endpoint(updatePoolWinnerVoterRefundPercentage)]
    fn update_winner_refund_percentage(&self, percentage: u64) {
        self.require_valid_percentage(percentage);
        self.winner_refund_percentage().set(percentage);
        self.emit_config_updated(
            b"poolWinnerVoterRefundPercentage",
            &BigUint::from(percentage),
        );
    }

    #[only_owner]
    #[endpoint(updateDevFeeReceiver)]
    fn update_dev_fee_receiver(&self, receiver: ManagedAddress) {
        require!(!receiver.is_zero(), ERR_WRONG_ADDRESS);
        self.dev_fee_receiver().set(&receiver);
        self.dev_fee_receiver_updated_event(&receiver);
    }

    // ========================================================
    // INTERNAL: reward replay
    // Walks the voter's epoch list from `start_idx`. Never
    // includes the current epoch, which has no result yet.
    // ========================================================

    fn compute_pending_reward(
        &self,
        voter: &ManagedAddress,
        start_idx: u64,
        loop_limit: u64,
    ) -> (BigUint, u64) {
        let epochs = self.voter_epochs(voter);
        let len = epochs.len() as u64;
        require!(len > 0, ERR_NO_EPOCH);
        require!(
            start_idx == self.replay_cursor(voter).get(),
            ERR_WRONG_START_IDX
        );

        let stop_idx = if loop_limit == 0 {
            len
        } else {
            start_idx.saturating_add(loop_limit)
        };
        require!(stop_idx <= len, ERR_WRONG_STOP_IDX);

        let current_epoch = self.current_epoch().get();
        let mut amount = BigUint::zero();
        let mut idx = start_idx;

        while idx < stop_idx {
            let epoch = epochs.get(idx as usize + 1);
            if epoch >= current_epoch {
                break;
            }

            amount += self.epoch_reward(epoch, voter);
            idx += 1;
        }

        (amount, idx)
    }

    /// What `voter` earned in a settled `epoch` they voted in.
    fn epoch_reward(&self, epoch: u64, voter: &ManagedAddress) -> BigUint {
        let result = self.epoch_results(epoch).get();
        let vote = self.votes(epoch, voter).get();

        if result.is_draw() {
            return vote.stake;
        }
        if vote.side != result.winner {
            return BigUint::zero();
        }

        let refund = &vote.stake * result.winner_refund_percentage / PERCENT_DENOMINATOR;
        if result.winner_fresh == 0u64 {
            return refund;
        }

        let share = &vote.stake * &result.distribution_chunk / &result.winner_fresh;
        refund + share
    }

    // ========================================================
    // INTERNAL: helpers
    // ========================================================

    fn is_epoch_finished(&self) -> bool {
        self.blockchain().get_block_timestamp() >= self.epoch_finish_at()
    }

    fn epoch_finish_at(&self) -> u64 {
        self.current_epoch_started_at().get() + self.epoch_duration().get()
    }

    fn pool_balance(&self, epoch: u64, side: Side) -> EpochBalance<Self::Api> {
        EpochBalance {
            carried_in: self.pool_carried_in(epoch, side).get(),
            fresh: self.pool_fresh(epoch, side).get(),
        }
    }

    fn require_valid_percentage(&self, percentage: u64) {
        require!(
            percentage > 0 && percentage <= PERCENT_DENOMINATOR,
            ERR_WRONG_PERCENTAGE
        );
    }

    fn require_known_epoch(&self, epoch: u64) {
        require!(epoch <= self.current_epoch().get(), ERR_WRONG_EPOCH);
    }

    fn emit_config_updated(&self, parameter: &[u8], value: &BigUint) {
        self.config_updated_event(&ManagedBuffer::new_from_bytes(parameter), value);
    }

    // ========================================================
    // VIEWS — read-only queries
    // ========================================================

    #[view(calculatePendingReward)]
    fn calculate_pending_reward(
        &self,
        voter: ManagedAddress,
        start_idx: u64,
        loop_limit: u64,
    ) -> MultiValue2<BigUint, u64> {
        let (amount, updated_idx) = self.compute_pending_reward(&voter, start_idx, loop_limit);
        (amount, updated_idx).into()
    }

    #[view(getCurrentEpoch)]
    fn get_current_epoch(&self) -> u64 {
        self.current_epoch().get()
    }

    #[view(getCurrentEpochStartedAt)]
    fn get_current_epoch_started_at(&self) -> u64 {
        self.current_epoch_started_at().get()
    }

    #[view(getEpochFinishAt)]
    fn get_epoch_finish_at(&self) -> u64 {
        self.epoch_finish_at()
    }

    #[view(isEpochFinished)]
    fn get_is_epoch_finished(&self) -> bool {
        self.is_epoch_finished()
    }

    #[view(getPoolBalance)]
    fn get_pool_balance(&self, epoch: u64, side: Side) -> EpochBalance<Self::Api> {
        self.require_known_epoch(epoch);
        require!(side.is_valid(), ERR_WRONG_SIDE);
        self.pool_balance(epoch, side)
    }

    #[view(getPoolBalanceTotal)]
    fn get_pool_balance_total(&self, epoch: u64, side: Side) -> BigUint {
        self.get_pool_balance(epoch, side).total()
    }

    #[view(getVoteForVoter)]
    fn get_vote_for_voter(&self, epoch: u64, voter: &ManagedAddress) -> Vote<Self::Api> {
        self.require_known_epoch(epoch);
        let vote_mapper = self.votes(epoch, voter);
        if vote_mapper.is_empty() {
            return Vote::empty();
        }
        vote_mapper.get()
    }

    #[view(getVotersForPool)]
    fn get_voters_for_pool(&self, epoch: u64, side: Side) -> MultiValueEncoded<ManagedAddress> {
        self.require_known_epoch(epoch);
        require!(side.is_valid(), ERR_WRONG_SIDE);

        let mut result = MultiValueEncoded::new();
        for voter in self.pool_voters(epoch, side).iter() {
            result.push(voter);
        }
        result
    }

    #[view(getVotersCountForPool)]
    fn get_voters_count_for_pool(&self, epoch: u64, side: Side) -> usize {
        self.require_known_epoch(epoch);
        require!(side.is_valid(), ERR_WRONG_SIDE);
        self.pool_voters(epoch, side).len()
    }

    #[view(getEpochListForVoter)]
    fn get_epoch_list_for_voter(&self, voter: &ManagedAddress) -> MultiValueEncoded<u64> {
        let mut result = MultiValueEncoded::new();
        for epoch in self.voter_epochs(voter).iter() {
            result.push(epoch);
        }
        result
    }

    #[view(getReplayCursor)]
    fn get_replay_cursor(&self, voter: &ManagedAddress) -> u64 {
        self.replay_cursor(voter).get()
    }

    #[view(getEpochResult)]
    fn get_epoch_result(&self, epoch: u64) -> EpochResult<Self::Api> {
        require!(!self.epoch_results(epoch).is_empty(), ERR_EPOCH_NOT_SETTLED);
        self.epoch_results(epoch).get()
    }

    #[view(getPendingBonus)]
    fn get_pending_bonus(&self, voter: &ManagedAddress) -> BigUint {
        self.pending_bonus(voter).get()
    }

    #[view(getContractConfig)]
    fn get_contract_config(&self) -> MultiValue6<u64, BigUint, u64, u64, u64, u64> {
        (
            self.epoch_duration().get(),
            self.min_stake().get(),
            self.dev_fee_percentage().get(),
            self.loser_to_next_epoch_percentage().get(),
            self.loser_to_winners_percentage().get(),
            self.winner_refund_percentage().get(),
        )
            .into()
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("voted")]
    fn voted_event(
        &self,
        #[indexed] epoch: u64,
        #[indexed] voter: &ManagedAddress,
        #[indexed] side: Side,
        amount: &BigUint,
    );

    #[event("devFeeTransferred")]
    fn dev_fee_transferred_event(
        &self,
        #[indexed] receiver: &ManagedAddress,
        #[indexed] epoch: u64,
        amount: &BigUint,
    );

    #[event("epochFinished")]
    fn epoch_finished_event(
        &self,
        #[indexed] epoch: u64,
        #[indexed] winner: Side,
        #[indexed] dev_fee: &BigUint,
        distribution_chunk: &BigUint,
    );

    #[event("rewardWithdrawn")]
    fn reward_withdrawn_event(
        &self,
        #[indexed] voter: &ManagedAddress,
        #[indexed] updated_idx: u64,
        amount: &BigUint,
    );

    #[event("bonusWithdrawn")]
    fn bonus_withdrawn_event(&self, #[indexed] voter: &ManagedAddress, amount: &BigUint);

    #[event("bonusReserveDeposited")]
    fn bonus_reserve_deposited_event(
        &self,
        #[indexed] token: &TokenIdentifier,
        amount: &BigUint,
    );

    #[event("configUpdated")]
    fn config_updated_event(&self, #[indexed] parameter: &ManagedBuffer, value: &BigUint);

    #[event("devFeeReceiverUpdated")]
    fn dev_fee_receiver_updated_event(&self, #[indexed] receiver: &ManagedAddress);

    // ========================================================
    // STORAGE
    // ========================================================

    // ── Configuration ──

    #[view(getEpochDuration)]
    #[storage_mapper("epochDuration")]
    fn epoch_duration(&self) -> SingleValueMapper<u64>;

    #[view(getMinStake)]
    #[storage_mapper("minStake")]
    fn min_stake(&self) -> SingleValueMapper<BigUint>;

    #[view(getVersusBonus)]
    #[storage_mapper("versusBonus")]
    fn versus_bonus(&self) -> SingleValueMapper<BigUint>;

    #[view(getDevFeePercentage)]
    #[storage_mapper("devFeePercentage")]
    fn dev_fee_percentage(&self) -> SingleValueMapper<u64>;

    #[view(getPoolLoserBalanceToNextEpochPercentage)]
    #[storage_mapper("loserToNextEpochPercentage")]
    fn loser_to_next_epoch_percentage(&self) -> SingleValueMapper<u64>;

    #[view(getPoolLoserWinnersDistributionPercentage)]
    #[storage_mapper("loserToWinnersPercentage")]
    fn loser_to_winners_percentage(&self) -> SingleValueMapper<u64>;

    #[view(getPoolWinnerVoterRefundPercentage)]
    #[storage_mapper("winnerRefundPercentage")]
    fn winner_refund_percentage(&self) -> SingleValueMapper<u64>;

    #[view(getDevFeeReceiver)]
    #[storage_mapper("devFeeReceiver")]
    fn dev_fee_receiver(&self) -> SingleValueMapper<ManagedAddress>;

    #[view(getBonusToken)]
    #[storage_mapper("bonusToken")]
    fn bonus_token(&self) -> SingleValueMapper<TokenIdentifier>;

    // ── Epoch clock ──

    #[storage_mapper("currentEpoch")]
    fn current_epoch(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("currentEpochStartedAt")]
    fn current_epoch_started_at(&self) -> SingleValueMapper<u64>;

    // ── Epoch ledger ──

    #[storage_mapper("poolCarriedIn")]
    fn pool_carried_in(&self, epoch: u64, side: Side) -> SingleValueMapper<BigUint>;

    #[storage_mapper("poolFresh")]
    fn pool_fresh(&self, epoch: u64, side: Side) -> SingleValueMapper<BigUint>;

    #[storage_mapper("poolVoters")]
    fn pool_voters(&self, epoch: u64, side: Side) -> VecMapper<ManagedAddress>;

    #[storage_mapper("votes")]
    fn votes(&self, epoch: u64, voter: &ManagedAddress) -> SingleValueMapper<Vote<Self::Api>>;

    #[storage_mapper("epochResults")]
    fn epoch_results(&self, epoch: u64) -> SingleValueMapper<EpochResult<Self::Api>>;

    // ── Per-voter history ──

    #[storage_mapper("voterEpochs")]
    fn voter_epochs(&self, voter: &ManagedAddress) -> VecMapper<u64>;

    #[storage_mapper("replayCursor")]
    fn replay_cursor(&self, voter: &ManagedAddress) -> SingleValueMapper<u64>;

    #[storage_mapper("pendingBonus")]
    fn pending_bonus(&self, voter: &ManagedAddress) -> SingleValueMapper<BigUint>;
}
