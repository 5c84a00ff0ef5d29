//! Dashboard aggregation.
//!
//! One pure pass over the item set. No cached intermediate state: every
//! item change triggers a full recompute, so the figures can never drift
//! from the items they summarize.

use crate::core::price::clamp_price;
use crate::models::{CategoryStats, Item, StatsSnapshot};
use std::collections::HashMap;

/// Build the aggregate snapshot for the given items.
///
/// Per category: `total` over all items, `paid` over completed ones,
/// `pending` over the rest. Grand totals run over every category,
/// including ones that are hidden from the main view.
pub fn compute_stats(items: &[Item]) -> StatsSnapshot {
    let mut per_category: HashMap<_, CategoryStats> = HashMap::new();
    let mut grand_total = 0.0;
    let mut grand_paid = 0.0;

    for item in items {
        // Prices are canonical on entry; this only guards NaN leaking in.
        let price = clamp_price(item.price);

        let entry = per_category.entry(item.category_id.clone()).or_default();
        entry.total += price;
        if item.completed {
            entry.paid += price;
            grand_paid += price;
        } else {
            entry.pending += price;
        }
        grand_total += price;
    }

    StatsSnapshot {
        per_category,
        grand_total,
        grand_paid,
    }
}

/// Plain sum of item prices, used for the archived list totals.
pub fn simple_total(items: &[Item]) -> f64 {
    items.iter().map(|item| clamp_price(item.price)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;

    const EPS: f64 = 1e-9;

    fn item(category: &RecordId, price: f64, completed: bool) -> Item {
        Item {
            id: RecordId::placeholder(),
            name: "x".into(),
            price,
            category_id: category.clone(),
            owner_id: "owner".into(),
            list_id: RecordId::from("list-1"),
            completed,
            link: None,
            observation: None,
        }
    }

    #[test]
    fn empty_set_is_all_zero() {
        let snapshot = compute_stats(&[]);
        assert!(snapshot.per_category.is_empty());
        assert_eq!(snapshot.grand_total, 0.0);
        assert_eq!(snapshot.grand_paid, 0.0);
        assert_eq!(snapshot.grand_pending(), 0.0);
    }

    #[test]
    fn splits_paid_and_pending() {
        let groceries = RecordId::from("cat-groceries");
        let items = vec![
            item(&groceries, 5.5, false),
            item(&groceries, 2.0, true),
            item(&groceries, 1.5, true),
        ];
        let snapshot = compute_stats(&items);
        let stats = snapshot.category(&groceries);
        assert!((stats.total - 9.0).abs() < EPS);
        assert!((stats.paid - 3.5).abs() < EPS);
        assert!((stats.pending - 5.5).abs() < EPS);
    }

    #[test]
    fn per_category_invariant_holds() {
        let a = RecordId::from("cat-a");
        let b = RecordId::from("cat-b");
        let items = vec![
            item(&a, 10.0, false),
            item(&a, 0.3, true),
            item(&b, 1234.56, true),
            item(&b, 0.0, false),
        ];
        let snapshot = compute_stats(&items);
        let mut sum_of_totals = 0.0;
        for stats in snapshot.per_category.values() {
            assert!((stats.total - (stats.paid + stats.pending)).abs() < EPS);
            sum_of_totals += stats.total;
        }
        assert!((snapshot.grand_total - sum_of_totals).abs() < EPS);
    }

    #[test]
    fn order_independent() {
        let a = RecordId::from("cat-a");
        let b = RecordId::from("cat-b");
        let mut items = vec![
            item(&a, 1.0, false),
            item(&b, 2.0, true),
            item(&a, 3.0, true),
            item(&b, 4.0, false),
        ];
        let forward = compute_stats(&items);
        items.reverse();
        let backward = compute_stats(&items);
        assert!((forward.grand_total - backward.grand_total).abs() < EPS);
        assert!((forward.grand_paid - backward.grand_paid).abs() < EPS);
        for (id, stats) in &forward.per_category {
            let other = backward.category(id);
            assert!((stats.total - other.total).abs() < EPS);
            assert!((stats.paid - other.paid).abs() < EPS);
        }
    }

    #[test]
    fn simple_total_ignores_completion() {
        let c = RecordId::from("cat");
        let items = vec![item(&c, 1.5, true), item(&c, 2.5, false)];
        assert!((simple_total(&items) - 4.0).abs() < EPS);
    }
}
