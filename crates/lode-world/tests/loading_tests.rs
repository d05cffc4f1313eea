use std::collections::HashSet;

use lode_chunk::{ChunkCoord, ChunkStatus, ColumnCoord};
use lode_world::{ChunkStore, LoadingQueue, Mutation, MutationQueue, Spiral};
use proptest::prelude::*;

proptest! {
    #[test]
    fn spiral_visits_every_column_once(
        cx in -50i32..50, cz in -50i32..50, distance in 0i32..7,
    ) {
        let center = ColumnCoord::new(cx, cz);
        let visits: Vec<_> = Spiral::new(center, distance).collect();
        let side = 2 * distance + 3;
        prop_assert_eq!(visits.len(), (side * side) as usize);

        let unique: HashSet<_> = visits.iter().map(|v| v.column).collect();
        prop_assert_eq!(unique.len(), visits.len());

        let r = distance + 1;
        for v in &visits {
            prop_assert!((v.column.cx - cx).abs() <= r && (v.column.cz - cz).abs() <= r);
            let inner = (v.column.cx - cx).abs() <= distance && (v.column.cz - cz).abs() <= distance;
            prop_assert_eq!(v.rendered, inner);
        }
        let rendered = visits.iter().filter(|v| v.rendered).count();
        prop_assert_eq!(rendered, ((2 * distance + 1) * (2 * distance + 1)) as usize);

        prop_assert_eq!(visits[0].column, ColumnCoord::new(cx - r, cz + r));
        prop_assert_eq!(visits.last().map(|v| v.column), Some(center));
    }
}

#[test]
fn spiral_walks_edges_inward() {
    let order: Vec<_> = Spiral::new(ColumnCoord::new(0, 0), 0)
        .map(|v| (v.column.cx, v.column.cz))
        .collect();
    assert_eq!(
        order,
        vec![
            (-1, 1),
            (0, 1),
            (1, 1),
            (1, 0),
            (1, -1),
            (0, -1),
            (-1, -1),
            (-1, 0),
            (0, 0),
        ]
    );
}

#[test]
fn drain_spawns_batches_in_spiral_order() {
    let mut store = ChunkStore::new(ColumnCoord::new(0, 0), 1, 2);
    let mut queue = LoadingQueue::new(2);
    let changes = queue.rebuild(&mut store);
    assert!(changes.is_empty());
    assert_eq!(queue.len(), 25);

    let first = queue.drain(&mut store);
    assert_eq!(first, vec![ColumnCoord::new(-2, 2), ColumnCoord::new(-1, 2)]);
    assert_eq!(store.live_chunks(), 4);
    let buffer_only = store.get(ChunkCoord::new(-2, 1, 2)).unwrap();
    assert!(!buffer_only.status.contains(ChunkStatus::VISIBLE));

    while !queue.is_empty() {
        queue.drain(&mut store);
    }
    assert_eq!(store.live_chunks(), 50);
    let center = store.get(ChunkCoord::new(0, 0, 0)).unwrap();
    assert!(center.status.contains(ChunkStatus::VISIBLE));
    assert!(queue.drain(&mut store).is_empty());
}

#[test]
fn recentering_toggles_visibility_of_existing_chunks() {
    let mut store = ChunkStore::new(ColumnCoord::new(0, 0), 1, 1);
    let mut loading = LoadingQueue::new(100);
    loading.rebuild(&mut store);
    loading.drain(&mut store);
    assert!(loading.is_empty());

    let mut mutations = MutationQueue::new();
    mutations.push(Mutation::SetCenter(ColumnCoord::new(1, 0)));
    assert!(mutations.apply(&mut store).reshaped());

    let changes = loading.rebuild(&mut store);
    // Column x=2 moves from the margin into view, x=-1 leaves it.
    assert!(changes.shown.contains(&ChunkCoord::new(2, 0, 0)));
    assert!(changes.hidden.contains(&ChunkCoord::new(-1, 0, 0)));
    assert!(!changes.shown.contains(&ChunkCoord::new(0, 0, 0)));
    // Only the new far edge needs spawning.
    assert_eq!(loading.len(), 5);
    let spawned = loading.drain(&mut store);
    assert_eq!(spawned.len(), 5);
    assert!(spawned.iter().all(|c| c.cx == 3));
}
