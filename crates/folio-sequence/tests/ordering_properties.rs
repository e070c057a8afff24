use folio_model::{ArticleId, BlockContent, BlockId, OrderKey};
use folio_sequence::{InsertMode, SequenceConfig};
use folio_test_utils::seeded_manager;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn orders(min: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::btree_set(0i64..1_000, min..24).prop_map(|set| set.into_iter().collect())
}

fn mode(optimistic: bool) -> SequenceConfig {
    if optimistic {
        SequenceConfig::new().with_insert_mode(InsertMode::Optimistic { max_attempts: 3 })
    } else {
        SequenceConfig::default()
    }
}

proptest! {
    #[test]
    fn append_goes_past_every_order(orders in orders(0)) {
        let rt = runtime();
        let article = ArticleId::new();
        let manager = seeded_manager(article, &orders, SequenceConfig::default());

        let block = rt.block_on(manager.append(article, BlockContent::text("tail"))).unwrap();

        prop_assert!(orders.iter().all(|&o| block.order.value() > o));
        if orders.is_empty() {
            prop_assert_eq!(block.order, OrderKey::ZERO);
        }
    }

    #[test]
    fn insert_after_shifts_later_orders_by_one(
        orders in orders(1),
        pick in any::<prop::sample::Index>(),
        optimistic in any::<bool>(),
    ) {
        let rt = runtime();
        let article = ArticleId::new();
        let anchor = orders[pick.index(orders.len())];
        let manager = seeded_manager(article, &orders, mode(optimistic));
        let before: Vec<(BlockId, i64)> = rt
            .block_on(manager.list(article))
            .unwrap()
            .iter()
            .map(|b| (b.id, b.order.value()))
            .collect();

        let block = rt
            .block_on(manager.insert_after(article, OrderKey::new(anchor), BlockContent::text("new")))
            .unwrap();
        prop_assert_eq!(block.order.value(), anchor + 1);

        let after = rt.block_on(manager.list(article)).unwrap();
        prop_assert_eq!(after.len(), before.len() + 1);
        for (id, old) in before {
            let now = after.iter().find(|b| b.id == id).unwrap().order.value();
            let expected = if old > anchor { old + 1 } else { old };
            prop_assert_eq!(now, expected);
        }

        let unique: BTreeSet<i64> = after.iter().map(|b| b.order.value()).collect();
        prop_assert_eq!(unique.len(), after.len());
    }

    #[test]
    fn delete_keeps_other_orders(orders in orders(1), pick in any::<prop::sample::Index>()) {
        let rt = runtime();
        let article = ArticleId::new();
        let manager = seeded_manager(article, &orders, SequenceConfig::default());
        let blocks = rt.block_on(manager.list(article)).unwrap();
        let victim = blocks[pick.index(blocks.len())].id;

        rt.block_on(manager.delete(victim)).unwrap();

        let remaining: Vec<(BlockId, i64)> = rt
            .block_on(manager.list(article))
            .unwrap()
            .iter()
            .map(|b| (b.id, b.order.value()))
            .collect();
        let expected: Vec<(BlockId, i64)> = blocks
            .iter()
            .filter(|b| b.id != victim)
            .map(|b| (b.id, b.order.value()))
            .collect();
        prop_assert_eq!(remaining, expected);
    }
}
