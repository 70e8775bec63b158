//! Cell DEX - Binary Entry Point
//!
//! Runs one matching round over a small built-in set of order cells and
//! prints the resulting settlement transaction. Reads `config.toml` from the
//! working directory if present.

use std::error::Error;
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;

use cell_dex::codec;
use cell_dex::types::price::{format_ckb, from_fixed_price, to_fixed_price};
use cell_dex::validator::DEFAULT_MIN_ORDER_CELL_CAPACITY;
use cell_dex::{
    match_orders, Deal, EngineConfig, LiveCell, OperatorCell, OrderBook, OutPoint, Script, Side,
};

fn sample_cells(price_scale: u128) -> Vec<LiveCell> {
    let token_type = Script::new([0xB0; 32], 0, vec![0x5D; 32]);
    let price = |s: &str| to_fixed_price(s, price_scale).unwrap_or_default();

    let orders = [
        // (sudt, order_amount, price, side, extra capacity)
        (0, 20_000_000_000, price("9"), Side::Bid, 180_540_000_000),
        (0, 5_000_000_000, price("8.8"), Side::Bid, 44_132_000_000),
        (10_030_000_000, 90_000_000_000, price("9"), Side::Ask, 0),
        (10_030_000_000, 90_000_000_000, price("9"), Side::Ask, 0),
        (10_030_000_000, 95_000_000_000, price("9.5"), Side::Ask, 0),
    ];

    orders
        .iter()
        .enumerate()
        .map(|(i, &(sudt, amount, price, side, extra))| {
            let tag = i as u8 + 1;
            LiveCell::new(
                OutPoint::new([tag; 32], 0),
                DEFAULT_MIN_ORDER_CELL_CAPACITY + extra,
                Script::new([0xC0; 32], 1, vec![tag; 20]),
                token_type.clone(),
                codec::encode(sudt, amount, price, side),
            )
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("===========================================");
    println!("  Cell DEX - Matching Round");
    println!("===========================================");
    println!();

    let config = EngineConfig::from_toml("config.toml")?;
    let params = config.match_params();
    let assembler = config.assembler()?;

    let cells = sample_cells(params.price_scale);
    let book = OrderBook::from_cells(&config.validator(), &cells);
    println!(
        "Order book: {} bids, {} asks (best bid {}, best ask {})",
        book.bid_count(),
        book.ask_count(),
        book.best_bid()
            .map(|p| from_fixed_price(p, params.price_scale))
            .unwrap_or_else(|| "-".into()),
        book.best_ask()
            .map(|p| from_fixed_price(p, params.price_scale))
            .unwrap_or_else(|| "-".into()),
    );

    let (bids, asks) = book.into_queues();
    let outcome = match_orders(params, bids, asks);

    println!("Matched orders:");
    for order in &outcome.matched_orders {
        println!(
            "  {:?} {} -> capacity {} CKB, tokens {}, remaining {}",
            order.side,
            order.id,
            format_ckb(order.state.capacity),
            order.state.sudt_amount,
            order.state.order_amount
        );
    }
    println!(
        "Operator fees: {} CKB, {} tokens",
        format_ckb(outcome.operator_capacity_fee),
        outcome.operator_token_fee
    );
    println!();

    let operator = OperatorCell::new(
        OutPoint::new([0xFF; 32], 0),
        1_000 * 100_000_000,
        0,
        Script::new([0xA0; 32], 1, vec![0x01; 20]),
        Script::new([0xB0; 32], 0, vec![0x5D; 32]),
    );

    let Some(tx) = assembler.build(&outcome, &operator)? else {
        println!("Nothing to settle.");
        return Ok(());
    };

    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let deal = Deal::pending(&tx, &outcome, now_ms)?;
    info!("deal {} pending for {} orders", deal.tx_hash_hex(), deal.order_ids.len());

    println!("Settlement transaction:");
    println!("  Hash:     {}", deal.tx_hash_hex());
    println!("  Size:     {} bytes", tx.serialized_size()?);
    println!("  Inputs:   {}", tx.inputs.len());
    println!("  Outputs:  {}", tx.outputs.len());
    println!("  Operator: {} CKB", format_ckb(tx.outputs[0].capacity));

    Ok(())
}
