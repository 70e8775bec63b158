//! Property tests for the codec, fee math and crossing engine.

use std::collections::HashMap;

use proptest::prelude::*;

use cell_dex::codec;
use cell_dex::engine::{apply_fill, fee};
use cell_dex::types::{LiveCell, Order, OrderState, OrderStatus, OutPoint, Script, Side};
use cell_dex::validator::DEFAULT_MIN_ORDER_CELL_CAPACITY;
use cell_dex::{match_orders, MatchParams, OrderBook, OrderValidator};

const PRICE_SCALE: u128 = 10_000_000_000;

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Bid), Just(Side::Ask)]
}

fn order(tag: u8, side: Side, price: u64, state: OrderState) -> Order {
    Order::new(
        OutPoint::new([tag; 32], 0),
        side,
        price,
        Script::default(),
        Script::default(),
        state,
    )
}

/// Cells funded with exactly what the validator requires, plus `slack`
fn dust_cell(i: usize, is_bid: bool, price: u64, amount: u128, slack: u128) -> LiveCell {
    let out_point = OutPoint::new([(i % 251) as u8; 32], i as u32);
    if is_bid {
        let cost = amount * price as u128 / PRICE_SCALE;
        LiveCell::new(
            out_point,
            DEFAULT_MIN_ORDER_CELL_CAPACITY + cost + fee(cost) + slack,
            Script::default(),
            Script::default(),
            codec::encode(0, amount, price, Side::Bid),
        )
    } else {
        let cost = amount * PRICE_SCALE / price as u128;
        LiveCell::new(
            out_point,
            DEFAULT_MIN_ORDER_CELL_CAPACITY,
            Script::default(),
            Script::default(),
            codec::encode(cost + fee(cost) + slack, amount, price, Side::Ask),
        )
    }
}

fn totals<'a>(states: impl Iterator<Item = &'a OrderState>) -> (u128, u128) {
    states.fold((0, 0), |(cap, sudt), s| (cap + s.capacity, sudt + s.sudt_amount))
}

proptest! {
    #[test]
    fn codec_decodes_what_it_encodes(
        sudt_amount in any::<u128>(),
        order_amount in any::<u128>(),
        price in any::<u64>(),
        side in side(),
    ) {
        let bytes = codec::encode(sudt_amount, order_amount, price, side);
        prop_assert_eq!(bytes.len(), codec::ORDER_PAYLOAD_LEN);
        prop_assert_eq!(codec::decode(&bytes), Ok((sudt_amount, order_amount, price, side)));
    }

    #[test]
    fn codec_rejects_wrong_width(bytes in proptest::collection::vec(any::<u8>(), 0..100)) {
        prop_assume!(bytes.len() != codec::ORDER_PAYLOAD_LEN);
        prop_assert!(codec::decode(&bytes).is_err());
    }

    #[test]
    fn fee_is_bounded(amount in any::<u128>()) {
        let charged = fee(amount);
        prop_assert!(charged <= amount / 333 + 1);
        prop_assert!(charged <= amount);
    }

    #[test]
    fn partial_fill_never_grows_demand(
        order_amount in 1u128..1_000_000_000_000,
        received in 0u128..1_000_000_000_000,
        spent in 0u128..1_000_000_000,
    ) {
        let mut o = order(1, Side::Bid, 90_000_000_000, OrderState::new(2_000_000_000, 0, order_amount));
        prop_assert!(apply_fill(&mut o, spent, received, false).is_some());

        prop_assert!(o.state.order_amount <= order_amount);
        prop_assert_eq!(o.status, OrderStatus::PartiallyFilled);
        prop_assert_eq!(o.state.sudt_amount, received);
    }

    #[test]
    fn uncrossed_book_produces_nothing(
        bid_price in 1u64..1_000_000_000_000,
        gap in 1u64..1_000_000_000,
        bid_amount in 1u128..1_000_000_000_000,
        ask_amount in 1u128..1_000_000_000_000,
    ) {
        let bid = order(1, Side::Bid, bid_price, OrderState::new(u64::MAX as u128, 0, bid_amount));
        let ask = order(2, Side::Ask, bid_price + gap, OrderState::new(0, u64::MAX as u128, ask_amount));

        let outcome = match_orders(MatchParams::default(), vec![bid], vec![ask]);
        prop_assert!(outcome.is_empty());
        prop_assert_eq!(outcome.operator_capacity_fee, 0);
        prop_assert_eq!(outcome.operator_token_fee, 0);
    }

    #[test]
    fn single_cross_conserves_balances(
        bid_price in 50_000_000_000u64..150_000_000_000,
        ask_discount in 0u64..10_000_000_000,
        bid_amount in 1_000_000u128..100_000_000_000,
        ask_amount in 1_000_000u128..1_000_000_000_000,
    ) {
        let ask_price = bid_price - ask_discount;
        let bid_state = OrderState::new(10_000_000_000_000, 0, bid_amount);
        let ask_state = OrderState::new(0, 10_000_000_000_000, ask_amount);
        let bid = order(1, Side::Bid, bid_price, bid_state);
        let ask = order(2, Side::Ask, ask_price, ask_state);

        let outcome = match_orders(MatchParams::default(), vec![bid], vec![ask]);
        prop_assert_eq!(outcome.crossings.len(), 1);
        prop_assert_eq!(outcome.matched_orders.len(), 2);

        let capacity: u128 = outcome.matched_orders.iter().map(|m| m.state.capacity).sum();
        let tokens: u128 = outcome.matched_orders.iter().map(|m| m.state.sudt_amount).sum();
        prop_assert_eq!(capacity + outcome.operator_capacity_fee, bid_state.capacity);
        prop_assert_eq!(tokens + outcome.operator_token_fee, ask_state.sudt_amount);
    }

    #[test]
    fn dust_book_conserves_and_always_progresses(
        orders in proptest::collection::vec(
            (any::<bool>(), 100_000_000u64..10_000_000_000, 1u128..1_000, 0u128..20),
            2..60,
        ),
    ) {
        let cells: Vec<LiveCell> = orders
            .iter()
            .enumerate()
            .map(|(i, &(is_bid, price, amount, slack))| dust_cell(i, is_bid, price, amount, slack))
            .collect();

        let book = OrderBook::from_cells(&OrderValidator::default(), &cells);
        let order_count = book.order_count();
        let (bids, asks) = book.into_queues();
        let initial: HashMap<OutPoint, OrderState> = bids
            .iter()
            .chain(asks.iter())
            .map(|o| (o.id.clone(), o.state))
            .collect();

        let outcome = match_orders(MatchParams::default(), bids, asks);

        let (cap_before, sudt_before) = totals(initial.values());
        let finals: Vec<OrderState> = outcome
            .matched_orders
            .iter()
            .map(|m| m.state)
            .chain(outcome.remaining_bids.iter().chain(outcome.remaining_asks.iter()).map(|o| o.state))
            .collect();
        let (cap_after, sudt_after) = totals(finals.iter());

        prop_assert_eq!(cap_before, cap_after + outcome.operator_capacity_fee);
        prop_assert_eq!(sudt_before, sudt_after + outcome.operator_token_fee);
        prop_assert_eq!(finals.len(), order_count);
        prop_assert!(outcome.crossings.len() <= order_count);

        for crossing in &outcome.crossings {
            prop_assert!(crossing.capacity_traded > 0);
            prop_assert!(crossing.tokens_traded > 0);
        }

        // Anything emitted has traded, so its demand went down
        for matched in &outcome.matched_orders {
            let before = initial[&matched.id];
            prop_assert!(matched.state.order_amount < before.order_amount);
        }

        for order in outcome.remaining_bids.iter().chain(outcome.remaining_asks.iter()) {
            prop_assert_eq!(order.status, OrderStatus::Open);
            prop_assert_eq!(order.state, initial[&order.id]);
        }
    }
}
