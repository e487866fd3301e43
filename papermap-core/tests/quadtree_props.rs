use papermap_core::{partition_columns, Bounds, Marker, MarkerId, Quadtree};
use proptest::prelude::*;
use std::collections::HashSet;

/// Markers on a coarse lattice so no two share a minimum-size cell.
fn spaced_markers() -> impl Strategy<Value = Vec<Marker>> {
    (
        prop::collection::hash_set((-500i64..500, -500i64..500), 0..300),
        prop::collection::vec(0u32..200, 300),
    )
        .prop_map(|(points, radii)| {
            points
                .into_iter()
                .zip(radii)
                .enumerate()
                .map(|(i, ((x, y), r))| Marker::new(i as MarkerId + 1, x * 4, y * 4, r))
                .collect()
        })
}

fn brute_force(markers: &[Marker], center: (i64, i64), half: (i64, i64)) -> Vec<MarkerId> {
    let rect = Bounds::around(center, half);
    let mut ids: Vec<_> = markers.iter().filter(|m| m.overlaps(&rect)).map(|m| m.id).collect();
    ids.sort_unstable();
    ids
}

fn visited(tree: &Quadtree<'_>, center: (i64, i64), half: (i64, i64)) -> Vec<MarkerId> {
    let mut ids = Vec::new();
    tree.apply_if_within(center, half, |m| ids.push(m.id));
    ids.sort_unstable();
    ids
}

proptest! {
    #[test]
    fn full_window_visits_every_marker_once(markers in spaced_markers()) {
        let tree = Quadtree::build(&markers);
        prop_assert!(tree.rejected().is_empty());
        prop_assert_eq!(tree.len(), markers.len());

        let b = tree.bounds();
        let ids = visited(&tree, b.center(), (b.width(), b.height()));
        let unique: HashSet<_> = ids.iter().copied().collect();
        prop_assert_eq!(ids.len(), markers.len());
        prop_assert_eq!(unique.len(), markers.len());
    }

    #[test]
    fn query_matches_brute_force(
        markers in spaced_markers(),
        cx in -2500i64..2500,
        cy in -2500i64..2500,
        hx in 0i64..800,
        hy in 0i64..800,
    ) {
        let tree = Quadtree::build(&markers);
        prop_assert_eq!(
            visited(&tree, (cx, cy), (hx, hy)),
            brute_force(&markers, (cx, cy), (hx, hy))
        );
    }

    #[test]
    fn rebuilding_gives_same_answers(
        markers in spaced_markers(),
        cx in -2000i64..2000,
        cy in -2000i64..2000,
        half in 0i64..1000,
    ) {
        let first = Quadtree::build(&markers);
        let second = Quadtree::build(&markers);
        prop_assert_eq!(
            visited(&first, (cx, cy), (half, half)),
            visited(&second, (cx, cy), (half, half))
        );
    }

    #[test]
    fn column_ranges_cover_grid_exactly(n in 1u32..600, workers in 1usize..80) {
        let ranges = partition_columns(n, workers);
        prop_assert_eq!(ranges.len(), workers);
        let columns: Vec<u32> = ranges.iter().flat_map(|r| r.clone()).collect();
        prop_assert_eq!(columns, (1..=n).collect::<Vec<_>>());
    }
}

#[test]
fn coincident_markers_are_reported_not_lost() {
    let markers: Vec<_> = (1..=5).map(|id| Marker::new(id, 10, 10, 3)).collect();
    let tree = Quadtree::build(&markers);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.rejected().len(), 4);
    assert_eq!(visited(&tree, (10, 10), (0, 0)), vec![1]);
}
