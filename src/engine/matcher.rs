//! Crossing engine: matches a descending bid queue against an ascending ask
//! queue.
//!
//! ## Loop
//!
//! While both heads exist and `ask.price <= bid.price`:
//!
//! 1. Pop both heads and compute the settlement price (average of limits).
//! 2. Compare the bid's token demand with what the ask must spend to fill
//!    its own capacity demand (`ask_cost`).
//! 3. The smaller side settles fully and is emitted; the larger side is
//!    reduced and pushed back to its queue head as `PartiallyFilled`.
//!    Equal demand settles both.
//!
//! A step never moves value its payer cannot cover:
//!
//! - If the trade floors to zero on either side, the order whose demand
//!   rounds to nothing is set aside (or emitted, if it already traded).
//! - If a paying balance cannot cover its side plus the fee, that order is
//!   emitted at its current state (or set aside, if it never traded).
//!
//! Every step emits or sets aside at least one order, so the loop runs at
//! most `bids + asks` times. After the loop a `PartiallyFilled` head, if
//! any, is emitted too, and set-aside orders return to the front of their
//! queues.

use std::collections::{HashSet, VecDeque};

use log::{debug, info, warn};

use crate::engine::settlement::{apply_fill, MatchParams};
use crate::types::price::{format_ckb, from_fixed_price};
use crate::types::{MatchedOrder, Order, OrderStatus, OutPoint, Side};

/// One crossing between a bid and an ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub bid_id: OutPoint,
    pub ask_id: OutPoint,
    pub settlement_price: u128,
    /// Capacity moved from the bid to the ask
    pub capacity_traded: u128,
    /// Tokens moved from the ask to the bid
    pub tokens_traded: u128,
    /// Fee charged to the bid, in capacity
    pub capacity_fee: u128,
    /// Fee charged to the ask, in tokens
    pub token_fee: u128,
}

/// Result of a matching pass.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Final states, in emission order
    pub matched_orders: Vec<MatchedOrder>,

    /// Capacity fees collected from bids
    pub operator_capacity_fee: u128,

    /// Token fees collected from asks
    pub operator_token_fee: u128,

    /// Every crossing, in execution order
    pub crossings: Vec<Crossing>,

    /// Bids never touched by a crossing
    pub remaining_bids: VecDeque<Order>,

    /// Asks never touched by a crossing
    pub remaining_asks: VecDeque<Order>,
}

impl MatchOutcome {
    /// Check if the pass produced no matches
    pub fn is_empty(&self) -> bool {
        self.matched_orders.is_empty()
    }

    /// Distinct ids of matched orders, in emission order
    ///
    /// Storage marks these orders pending while the settlement is in flight.
    pub fn consumed_order_ids(&self) -> Vec<OutPoint> {
        let mut seen = HashSet::new();
        self.matched_orders
            .iter()
            .filter(|order| seen.insert(order.id.clone()))
            .map(|order| order.id.clone())
            .collect()
    }
}

/// Iterative crossing engine for one token pair.
///
/// ## Example
///
/// ```
/// use cell_dex::engine::{CrossingEngine, MatchParams};
/// use cell_dex::types::{Order, OrderState, OutPoint, Script, Side};
///
/// let bid = Order::new(
///     OutPoint::new([1u8; 32], 0), Side::Bid, 90_000_000_000,
///     Script::default(), Script::default(),
///     OrderState::new(90_270_000_000, 0, 10_000_000_000),
/// );
/// let ask = Order::new(
///     OutPoint::new([2u8; 32], 0), Side::Ask, 90_000_000_000,
///     Script::default(), Script::default(),
///     OrderState::new(0, 10_030_000_000, 90_000_000_000),
/// );
///
/// let mut engine = CrossingEngine::new(MatchParams::default(), vec![bid], vec![ask]);
/// engine.run();
///
/// assert_eq!(engine.matched_orders().len(), 2);
/// assert_eq!(engine.operator_capacity_fee(), 270_000_000);
/// assert_eq!(engine.operator_token_fee(), 30_000_000);
/// ```
#[derive(Debug)]
pub struct CrossingEngine {
    params: MatchParams,

    /// Sorted by price, highest first
    bid_queue: VecDeque<Order>,

    /// Sorted by price, lowest first
    ask_queue: VecDeque<Order>,

    operator_capacity_fee: u128,

    operator_token_fee: u128,

    matched_orders: Vec<MatchedOrder>,

    crossings: Vec<Crossing>,

    /// Untouched bids that could not trade at the head
    skipped_bids: Vec<Order>,

    skipped_asks: Vec<Order>,
}

impl CrossingEngine {
    /// Create an engine over pre-sorted queues
    ///
    /// Bids must be sorted by descending price and asks by ascending price.
    /// The engine does not re-sort.
    pub fn new(
        params: MatchParams,
        bids: impl Into<VecDeque<Order>>,
        asks: impl Into<VecDeque<Order>>,
    ) -> Self {
        Self {
            params,
            bid_queue: bids.into(),
            ask_queue: asks.into(),
            operator_capacity_fee: 0,
            operator_token_fee: 0,
            matched_orders: Vec::new(),
            crossings: Vec::new(),
            skipped_bids: Vec::new(),
            skipped_asks: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn matched_orders(&self) -> &[MatchedOrder] {
        &self.matched_orders
    }

    #[inline]
    pub fn operator_capacity_fee(&self) -> u128 {
        self.operator_capacity_fee
    }

    #[inline]
    pub fn operator_token_fee(&self) -> u128 {
        self.operator_token_fee
    }

    #[inline]
    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    #[inline]
    pub fn bid_queue(&self) -> &VecDeque<Order> {
        &self.bid_queue
    }

    #[inline]
    pub fn ask_queue(&self) -> &VecDeque<Order> {
        &self.ask_queue
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Run the crossing loop until the book no longer crosses
    ///
    /// Never fails. A book that does not cross yields no matches and no
    /// fees.
    pub fn run(&mut self) {
        while self.crosses() {
            if !self.step() {
                break;
            }
        }

        self.emit_partial_head();
        self.restore_skipped();

        if !self.matched_orders.is_empty() {
            info!(
                "matching pass settled {} orders in {} crossings, fees: {} CKB capacity, {} tokens",
                self.matched_orders.len(),
                self.crossings.len(),
                format_ckb(self.operator_capacity_fee),
                self.operator_token_fee
            );
        }
    }

    /// Consume the engine into its outcome
    pub fn into_outcome(self) -> MatchOutcome {
        MatchOutcome {
            matched_orders: self.matched_orders,
            operator_capacity_fee: self.operator_capacity_fee,
            operator_token_fee: self.operator_token_fee,
            crossings: self.crossings,
            remaining_bids: self.bid_queue,
            remaining_asks: self.ask_queue,
        }
    }

    fn crosses(&self) -> bool {
        match (self.bid_queue.front(), self.ask_queue.front()) {
            (Some(bid), Some(ask)) => ask.price <= bid.price,
            _ => false,
        }
    }

    /// Settle the two queue heads against each other.
    ///
    /// Returns `false` if the pair cannot be priced, leaving both queues
    /// unchanged.
    fn step(&mut self) -> bool {
        let (mut bid, mut ask) = match (self.bid_queue.pop_front(), self.ask_queue.pop_front()) {
            (Some(bid), Some(ask)) => (bid, ask),
            (bid, ask) => {
                self.bid_queue.extend(bid);
                self.ask_queue.extend(ask);
                return false;
            }
        };

        let settlement_price = self.params.settlement_price(ask.price, bid.price);
        let Some(ask_cost) = self.params.ask_cost(settlement_price, ask.state.order_amount) else {
            warn!(
                "settlement price rounds to zero for bid {} at {} and ask {} at {}",
                bid.id,
                from_fixed_price(bid.price, self.params.price_scale),
                ask.id,
                from_fixed_price(ask.price, self.params.price_scale)
            );
            self.bid_queue.push_front(bid);
            self.ask_queue.push_front(ask);
            return false;
        };
        let bid_cost = self.params.bid_cost(settlement_price, bid.state.order_amount);
        let wanted_tokens = bid.state.order_amount;

        // (capacity the bid pays, tokens the ask pays)
        let (capacity_traded, tokens_traded) = if wanted_tokens == ask_cost {
            (bid_cost, ask_cost)
        } else if wanted_tokens < ask_cost {
            (bid_cost, wanted_tokens)
        } else {
            (ask.state.order_amount, ask_cost)
        };

        let bid_full = wanted_tokens <= ask_cost;
        let ask_full = wanted_tokens >= ask_cost;

        if capacity_traded == 0 || tokens_traded == 0 {
            debug!(
                "crossing bid {} / ask {} at {} floors to zero ({} capacity for {} tokens)",
                bid.id, ask.id, settlement_price, capacity_traded, tokens_traded
            );
            if bid_cost == 0 {
                self.retire(bid);
                self.ask_queue.push_front(ask);
            } else {
                self.retire(ask);
                self.bid_queue.push_front(bid);
            }
            return true;
        }

        let (bid_state, bid_status) = (bid.state, bid.status);
        let Some(capacity_fee) = apply_fill(&mut bid, capacity_traded, tokens_traded, bid_full) else {
            warn!(
                "bid {} cannot cover {} capacity plus fee, holds {}",
                bid.id, capacity_traded, bid.state.capacity
            );
            self.retire(bid);
            self.ask_queue.push_front(ask);
            return true;
        };
        let Some(token_fee) = apply_fill(&mut ask, tokens_traded, capacity_traded, ask_full) else {
            warn!(
                "ask {} cannot cover {} tokens plus fee, holds {}",
                ask.id, tokens_traded, ask.state.sudt_amount
            );
            bid.state = bid_state;
            bid.status = bid_status;
            self.retire(ask);
            self.bid_queue.push_front(bid);
            return true;
        };

        self.operator_capacity_fee = self.operator_capacity_fee.saturating_add(capacity_fee);
        self.operator_token_fee = self.operator_token_fee.saturating_add(token_fee);

        debug!(
            "crossing bid {} / ask {} at {}: {} capacity for {} tokens (fees {} / {})",
            bid.id, ask.id, settlement_price, capacity_traded, tokens_traded, capacity_fee, token_fee
        );

        self.crossings.push(Crossing {
            bid_id: bid.id.clone(),
            ask_id: ask.id.clone(),
            settlement_price,
            capacity_traded,
            tokens_traded,
            capacity_fee,
            token_fee,
        });

        if bid_full {
            self.matched_orders.push(bid.to_matched());
        } else {
            self.bid_queue.push_front(bid);
        }

        if ask_full {
            self.matched_orders.push(ask.to_matched());
        } else {
            self.ask_queue.push_front(ask);
        }

        true
    }

    /// Take an order that cannot trade against the current head out of the
    /// loop. One that already traded is emitted at its current state; an
    /// untouched one is set aside and returned to its queue afterwards.
    fn retire(&mut self, mut order: Order) {
        if order.is_partially_filled() {
            order.status = OrderStatus::Settled;
            self.matched_orders.push(order.to_matched());
            return;
        }

        match order.side {
            Side::Bid => self.skipped_bids.push(order),
            Side::Ask => self.skipped_asks.push(order),
        }
    }

    fn restore_skipped(&mut self) {
        for bid in self.skipped_bids.drain(..).rev() {
            self.bid_queue.push_front(bid);
        }
        for ask in self.skipped_asks.drain(..).rev() {
            self.ask_queue.push_front(ask);
        }
    }

    /// Emit a partially filled head left over when the loop stops.
    fn emit_partial_head(&mut self) {
        if self.bid_queue.front().map_or(false, Order::is_partially_filled) {
            if let Some(mut bid) = self.bid_queue.pop_front() {
                bid.status = OrderStatus::Settled;
                self.matched_orders.push(bid.to_matched());
            }
        } else if self.ask_queue.front().map_or(false, Order::is_partially_filled) {
            if let Some(mut ask) = self.ask_queue.pop_front() {
                ask.status = OrderStatus::Settled;
                self.matched_orders.push(ask.to_matched());
            }
        }
    }
}

/// Run one matching pass over pre-sorted queues
pub fn match_orders(
    params: MatchParams,
    bids: impl Into<VecDeque<Order>>,
    asks: impl Into<VecDeque<Order>>,
) -> MatchOutcome {
    let mut engine = CrossingEngine::new(params, bids, asks);
    engine.run();
    engine.into_outcome()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::settlement::fee;
    use crate::types::{OrderState, Script};

    const PRICE_9: u64 = 90_000_000_000;
    const PRICE_11: u64 = 110_000_000_000;

    fn make_order(tag: u8, side: Side, price: u64, capacity: u128, sudt: u128, amount: u128) -> Order {
        Order::new(
            OutPoint::new([tag; 32], 0),
            side,
            price,
            Script::new([0xEE; 32], 1, vec![tag]),
            Script::default(),
            OrderState::new(capacity, sudt, amount),
        )
    }

    fn bid(tag: u8, price: u64, capacity: u128, amount: u128) -> Order {
        make_order(tag, Side::Bid, price, capacity, 0, amount)
    }

    fn ask(tag: u8, price: u64, sudt: u128, amount: u128) -> Order {
        make_order(tag, Side::Ask, price, 0, sudt, amount)
    }

    fn find(outcome: &MatchOutcome, tag: u8) -> &MatchedOrder {
        outcome
            .matched_orders
            .iter()
            .find(|o| o.id.tx_hash[0] == tag)
            .expect("order should be matched")
    }

    #[test]
    fn test_exact_match_settles_both() {
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid(1, PRICE_9, 90_270_000_000, 10_000_000_000)],
            vec![ask(2, PRICE_9, 10_030_000_000, 90_000_000_000)],
        );

        assert_eq!(outcome.matched_orders.len(), 2);
        assert_eq!(find(&outcome, 1).state, OrderState::new(0, 10_000_000_000, 0));
        assert_eq!(find(&outcome, 2).state, OrderState::new(90_000_000_000, 0, 0));
        assert_eq!(outcome.operator_capacity_fee, 270_000_000);
        assert_eq!(outcome.operator_token_fee, 30_000_000);
        assert!(outcome.remaining_bids.is_empty());
        assert!(outcome.remaining_asks.is_empty());
    }

    #[test]
    fn test_no_crossing() {
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid(1, PRICE_9, 90_270_000_000, 10_000_000_000)],
            vec![ask(2, PRICE_11, 10_030_000_000, 90_000_000_000)],
        );

        assert!(outcome.is_empty());
        assert_eq!(outcome.operator_capacity_fee, 0);
        assert_eq!(outcome.operator_token_fee, 0);
        assert_eq!(outcome.remaining_bids.len(), 1);
        assert_eq!(outcome.remaining_asks.len(), 1);
        assert_eq!(outcome.remaining_bids[0].status, OrderStatus::Open);
    }

    #[test]
    fn test_empty_queues() {
        let outcome = match_orders(MatchParams::default(), Vec::new(), vec![ask(2, PRICE_9, 1, 1)]);
        assert!(outcome.is_empty());
        assert_eq!(outcome.remaining_asks.len(), 1);
    }

    #[test]
    fn test_smaller_bid_partially_fills_ask() {
        // Ask wants 180 CKB-worth of capacity, bid only buys 10 tokens
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid(1, PRICE_9, 90_270_000_000, 10_000_000_000)],
            vec![ask(2, PRICE_9, 20_060_000_000, 180_000_000_000)],
        );

        // Bid emitted during the loop, the partial ask after it
        assert_eq!(outcome.matched_orders.len(), 2);
        assert_eq!(outcome.matched_orders[0].id.tx_hash[0], 1);
        assert_eq!(outcome.matched_orders[1].id.tx_hash[0], 2);

        let ask_state = find(&outcome, 2).state;
        assert_eq!(ask_state.capacity, 90_000_000_000);
        assert_eq!(ask_state.sudt_amount, 20_060_000_000 - 10_000_000_000 - 30_000_000);
        assert_eq!(ask_state.order_amount, 90_000_000_000);

        assert_eq!(outcome.operator_capacity_fee, 270_000_000);
        assert_eq!(outcome.operator_token_fee, 30_000_000);
        assert!(outcome.remaining_asks.is_empty());
    }

    #[test]
    fn test_partial_fill_is_emitted_when_book_stops_crossing() {
        // The second bid is too cheap to cross the partially filled ask
        let outcome = match_orders(
            MatchParams::default(),
            vec![
                bid(1, PRICE_9, 90_270_000_000, 10_000_000_000),
                bid(3, 80_000_000_000, 90_270_000_000, 10_000_000_000),
            ],
            vec![ask(2, PRICE_9, 20_060_000_000, 180_000_000_000)],
        );

        assert_eq!(outcome.matched_orders.len(), 2);
        assert_eq!(outcome.remaining_bids.len(), 1);
        assert_eq!(outcome.remaining_bids[0].id.tx_hash[0], 3);
        assert_eq!(outcome.remaining_bids[0].status, OrderStatus::Open);
    }

    #[test]
    fn test_settlement_at_average_price() {
        // Bid at 11, ask at 9: settles at 10
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid(1, PRICE_11, 200_000_000_000, 10_000_000_000)],
            vec![ask(2, PRICE_9, 20_000_000_000, 100_000_000_000)],
        );

        assert_eq!(outcome.crossings.len(), 1);
        let crossing = &outcome.crossings[0];
        assert_eq!(crossing.settlement_price, 1_000_000_000);
        assert_eq!(crossing.capacity_traded, 100_000_000_000);
        assert_eq!(crossing.tokens_traded, 10_000_000_000);

        let bid_state = find(&outcome, 1).state;
        assert_eq!(bid_state.capacity, 200_000_000_000 - 100_000_000_000 - 300_000_000);
        assert_eq!(bid_state.sudt_amount, 10_000_000_000);
    }

    #[test]
    fn test_fee_bound_per_crossing() {
        let outcome = match_orders(
            MatchParams::default(),
            vec![
                bid(1, PRICE_11, 500_000_000_000, 25_000_000_000),
                bid(2, PRICE_9, 500_000_000_000, 7_777_777_777),
            ],
            vec![
                ask(3, 85_000_000_000, 9_999_999_999, 33_333_333_333),
                ask(4, PRICE_9, 50_000_000_000, 123_456_789_012),
            ],
        );

        assert!(!outcome.crossings.is_empty());
        for crossing in &outcome.crossings {
            assert!(crossing.capacity_fee <= fee(crossing.capacity_traded));
            assert!(crossing.token_fee <= fee(crossing.tokens_traded));
        }

        let capacity_fees: u128 = outcome.crossings.iter().map(|c| c.capacity_fee).sum();
        let token_fees: u128 = outcome.crossings.iter().map(|c| c.token_fee).sum();
        assert_eq!(capacity_fees, outcome.operator_capacity_fee);
        assert_eq!(token_fees, outcome.operator_token_fee);
    }

    #[test]
    fn test_zero_settlement_price_stops_matching() {
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid(1, 1, 1_000, 1_000)],
            vec![ask(2, 1, 1_000, 1_000)],
        );

        assert!(outcome.is_empty());
        assert_eq!(outcome.remaining_bids.len(), 1);
        assert_eq!(outcome.remaining_asks.len(), 1);
    }

    #[test]
    fn test_consumed_order_ids_distinct() {
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid(1, PRICE_9, 90_270_000_000, 10_000_000_000)],
            vec![ask(2, PRICE_9, 10_030_000_000, 90_000_000_000)],
        );

        let ids = outcome.consumed_order_ids();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_scripts_copied_through() {
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid(1, PRICE_9, 90_270_000_000, 10_000_000_000)],
            vec![ask(2, PRICE_9, 10_030_000_000, 90_000_000_000)],
        );

        assert_eq!(find(&outcome, 1).lock.args, vec![1]);
        assert_eq!(find(&outcome, 2).lock.args, vec![2]);
    }

    #[test]
    fn test_unfunded_partial_ask_is_emitted_not_overdrawn() {
        // Each bid buys 3 tokens for 1 shannon of capacity; the ask runs out
        // of tokens before its capacity demand is met
        const HALF: u64 = 5_000_000_000;
        let bids: Vec<Order> = (0..100u8)
            .map(|i| make_order(i, Side::Bid, HALF, 10, 0, 3))
            .collect();
        let asks = vec![make_order(200, Side::Ask, HALF, 0, 200, 100)];

        let outcome = match_orders(MatchParams::default(), bids, asks);

        let ask_state = find(&outcome, 200).state;
        assert_eq!(ask_state, OrderState::new(66, 2, 34));
        assert_eq!(outcome.crossings.len(), 66);
        assert_eq!(outcome.matched_orders.len(), 67);
        assert_eq!(outcome.remaining_bids.len(), 34);
        assert!(outcome.remaining_bids.iter().all(|o| o.status == OrderStatus::Open));

        let tokens_out: u128 = outcome.matched_orders.iter().map(|o| o.state.sudt_amount).sum();
        assert_eq!(tokens_out + outcome.operator_token_fee, 200);
    }

    #[test]
    fn test_unfunded_partial_bid_is_emitted() {
        // The bid overpays on the first ask and cannot afford the second
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid(1, PRICE_9, 100_000_000_000, 20_000_000_000)],
            vec![
                ask(2, PRICE_9, 10_030_000_000, 90_000_000_000),
                ask(3, PRICE_9, 10_030_000_000, 90_000_000_000),
            ],
        );

        assert_eq!(outcome.crossings.len(), 1);
        let bid_state = find(&outcome, 1).state;
        assert_eq!(bid_state, OrderState::new(9_730_000_000, 10_000_000_000, 10_000_000_000));
        assert_eq!(outcome.remaining_asks.len(), 1);
        assert_eq!(outcome.remaining_asks[0].status, OrderStatus::Open);
        assert_eq!(outcome.remaining_asks[0].state.sudt_amount, 10_030_000_000);
    }

    #[test]
    fn test_zero_trade_is_not_applied() {
        // Ask wants 1 shannon at 1.0, bid at 3.0: the ask's token cost floors to 0
        let bid_order = bid(1, 30_000_000_000, 40, 10);
        let ask_order = ask(2, 10_000_000_000, 1, 1);
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid_order.clone()],
            vec![ask_order.clone()],
        );

        assert!(outcome.crossings.is_empty());
        assert!(outcome.is_empty());
        assert_eq!(outcome.remaining_bids[0], bid_order);
        assert_eq!(outcome.remaining_asks[0], ask_order);
    }

    #[test]
    fn test_dust_head_does_not_block_book() {
        // The dust ask sits in front of a tradable one
        let outcome = match_orders(
            MatchParams::default(),
            vec![bid(1, PRICE_11, 200_000_000_000, 10_000_000_000)],
            vec![
                ask(2, 10_000_000_000, 1, 1),
                ask(3, PRICE_9, 20_000_000_000, 100_000_000_000),
            ],
        );

        assert_eq!(outcome.crossings.len(), 1);
        assert_eq!(outcome.crossings[0].ask_id.tx_hash[0], 3);
        assert!(outcome.crossings.iter().all(|c| c.capacity_traded > 0 && c.tokens_traded > 0));
        assert_eq!(outcome.remaining_asks.len(), 1);
        assert_eq!(outcome.remaining_asks[0].id.tx_hash[0], 2);
    }
}
