//! Order pool allocation behavior around block boundaries

use common::{Order, OrderType, Px, Qty, Side, Ts};
use engine::{OrderPool, BLOCK_SIZE};
use rstest::rstest;

fn stamped(id: u64) -> Order {
    let mut order = Order::new(
        Px::from_i64(1_000_000 + id as i64),
        Qty::from_i64(100),
        Ts::from_nanos(id),
        Side::Buy,
        OrderType::Limit,
        1,
    );
    order.id = id;
    order
}

#[rstest]
#[case::under_one_block(BLOCK_SIZE - 1)]
#[case::exactly_one_block(BLOCK_SIZE)]
#[case::spills_into_second_block(BLOCK_SIZE + 1)]
#[case::three_blocks(2 * BLOCK_SIZE + 17)]
fn every_slot_keeps_its_contents(#[case] count: usize) {
    let mut pool = OrderPool::new();
    let refs: Vec<_> = (0..count)
        .map(|i| {
            let r = pool.allocate();
            *pool.get_mut(r) = stamped(i as u64);
            r
        })
        .collect();

    assert_eq!(pool.allocated_count(), count);
    for (i, &r) in refs.iter().enumerate() {
        let order = pool.get(r);
        assert_eq!(order.id, i as u64);
        assert_eq!(order.price, Px::from_i64(1_000_000 + i as i64));
    }
}

#[rstest]
fn memory_usage_grows_in_whole_blocks() {
    let mut pool = OrderPool::new();
    let one_block = pool.memory_usage();
    assert_eq!(one_block, BLOCK_SIZE * std::mem::size_of::<Order>());

    for _ in 0..BLOCK_SIZE {
        pool.allocate();
    }
    assert_eq!(pool.memory_usage(), one_block);

    pool.allocate();
    assert_eq!(pool.memory_usage(), 2 * one_block);
}

#[rstest]
fn reset_reuses_slots_from_the_start() {
    let mut pool = OrderPool::new();
    let first = pool.allocate();
    *pool.get_mut(first) = stamped(99);
    pool.reset();

    let recycled = pool.allocate();
    // Fresh slot, default contents.
    assert_eq!(pool.get(recycled).id, 0);
    assert_eq!(pool.allocated_count(), 1);
}
