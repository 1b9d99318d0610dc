use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use paste::paste;
use primcoll::{AvlTreeMap, CursorError, RangeError};
use rand::{rngs::StdRng, Rng, SeedableRng};

static SEED: Lazy<u64> = Lazy::new(|| {
    let mut buf = [0; 8];
    getrandom::getrandom(&mut buf).unwrap();
    let seed = u64::from_le_bytes(buf);
    println!("Random seed: {seed:#018x}");
    seed
});

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(*SEED)
}

macro_rules! generate_tree_tests {
    ($name:ident, $key:ty) => {
        paste! {
            #[test]
            fn [<$name _matches_btree_map>]() {
                let mut rng = seeded_rng();
                let mut map = AvlTreeMap::<$key, u32>::new();
                let mut oracle = BTreeMap::new();

                for round in 0..20_000u32 {
                    let key = rng.gen_range(0..300u16) as $key;
                    if rng.gen_range(0..5) < 3 {
                        assert_eq!(map.insert(key, round), oracle.insert(key, round));
                    } else {
                        assert_eq!(map.remove(key), oracle.remove(&key));
                    }
                }

                assert_eq!(map.len(), oracle.len());
                assert!(map.iter().map(|(k, v)| (k, *v)).eq(oracle.iter().map(|(k, v)| (*k, *v))));
                assert!(map.keys().rev().eq(oracle.keys().rev().copied()));
                assert_eq!(map.first_key(), oracle.keys().next().copied());
                assert_eq!(map.last_key(), oracle.keys().next_back().copied());
            }

            #[test]
            fn [<$name _views_match_btree_ranges>]() {
                let mut rng = seeded_rng();
                let map: AvlTreeMap<$key, ()> =
                    (0..200).map(|_| (rng.gen_range(0..100u16) as $key, ())).collect();
                let oracle: BTreeMap<$key, ()> = map.iter().map(|(k, v)| (k, *v)).collect();

                for _ in 0..200 {
                    let a = rng.gen_range(0..110u16) as $key;
                    let b = rng.gen_range(0..110u16) as $key;
                    let (from, to) = if a <= b { (a, b) } else { (b, a) };

                    let view = map.sub_map(from, to).unwrap();
                    assert!(view.keys().eq(oracle.range(from..to).map(|(k, _)| *k)));
                    assert_eq!(view.len(), oracle.range(from..to).count());
                    assert_eq!(view.first_key(), oracle.range(from..to).next().map(|(k, _)| *k));
                    assert_eq!(view.last_key(), oracle.range(from..to).next_back().map(|(k, _)| *k));

                    assert!(map.head_map(to).keys().eq(oracle.range(..to).map(|(k, _)| *k)));
                    assert!(map.tail_map(from).keys().rev().eq(oracle.range(from..).rev().map(|(k, _)| *k)));
                }
            }
        }
    };
}

generate_tree_tests!(i32, i32);
generate_tree_tests!(u64, u64);
generate_tree_tests!(i8, i8);

#[test]
fn doubles_scenario() {
    let mut map = AvlTreeMap::new();
    for k in [5.0, 3.0, 8.0, 1.0, 4.0, 7.0, 9.0] {
        map.insert(k, k * 2.0);
    }
    assert_eq!(map.len(), 7);
    assert_eq!(map.first_key(), Some(1.0));
    assert_eq!(map.last_key(), Some(9.0));
    assert_eq!(
        map.head_map(7.0).keys().collect::<Vec<_>>(),
        vec![1.0, 3.0, 4.0, 5.0]
    );
    assert_eq!(map.tail_map(7.0).values().copied().collect::<Vec<_>>(), vec![14.0, 16.0, 18.0]);

    assert_eq!(map.remove(5.0), Some(10.0));
    assert_eq!(
        map.keys().collect::<Vec<_>>(),
        vec![1.0, 3.0, 4.0, 7.0, 8.0, 9.0]
    );
}

#[test]
fn view_mutations_stay_in_range() {
    let mut map: AvlTreeMap<u32, String> = (0..20).map(|i| (i * 10, i.to_string())).collect();
    let mut view = map.sub_map_mut(50, 100).unwrap();

    assert_eq!(view.insert(55, "new".into()), Ok(None));
    assert_eq!(view.insert(100, "no".into()), Err(RangeError::KeyOutOfRange));
    assert_eq!(view.insert(49, "no".into()), Err(RangeError::KeyOutOfRange));
    assert_eq!(view.remove(40), None);
    assert_eq!(view.len(), 6);
    assert_eq!(
        view.tail_map_mut(30).err(),
        Some(RangeError::BoundsOutsideView)
    );

    view.clear();
    assert!(view.is_empty());
    assert_eq!(map.len(), 15);
    assert_eq!(map.get(40).map(String::as_str), Some("4"));
    assert_eq!(map.get(100).map(String::as_str), Some("10"));
    assert!(map.get(55).is_none());
}

#[test]
fn cursor_drains_in_order() {
    let mut map: AvlTreeMap<i16, i16> = (-50..50).map(|i| (i, -i)).collect();
    let mut cursor = map.cursor();
    let mut drained = Vec::new();
    while cursor.next(&map).unwrap().is_some() {
        drained.push(cursor.remove(&mut map).unwrap());
    }
    assert!(map.is_empty());
    assert_eq!(drained, (-50..50).map(|i| (i, -i)).collect::<Vec<_>>());

    map.insert(1, 1);
    assert_eq!(cursor.next(&map), Err(CursorError::ConcurrentModification));
}

#[test]
fn comparator_orders_keys_and_views() {
    let mut map = AvlTreeMap::with_comparator(|a: i32, b: i32| b.cmp(&a));
    map.extend((0..10).map(|i| (i, ())));
    assert_eq!(map.first_key(), Some(9));
    assert_eq!(map.last_key(), Some(0));

    // Under the reversed order, 7 comes before 2.
    let view = map.sub_map(7, 2).unwrap();
    assert_eq!(view.keys().collect::<Vec<_>>(), vec![7, 6, 5, 4, 3]);
    assert_eq!(map.sub_map(2, 7).err(), Some(RangeError::InvalidRange));
    assert_eq!(map.head_map(7).keys().collect::<Vec<_>>(), vec![9, 8]);
}

#[test]
fn removal_needs_no_default_values() {
    let mut map: AvlTreeMap<i32, std::fs::File> = AvlTreeMap::new();
    assert_eq!(map.remove(1).map(|_| ()), None);
    assert!(map.sub_map_mut(0, 10).unwrap().remove(1).is_none());
    map.retain(|_, _| false);
    assert!(map.is_empty());
}

#[test]
fn cursor_is_bound_to_its_map() {
    let mut a: AvlTreeMap<u32, u32> = (0..1000).map(|i| (i, i)).collect();
    let mut cursor = a.cursor();
    for _ in 0..999 {
        cursor.next(&a).unwrap();
    }

    let b: AvlTreeMap<u32, u32> = (0..1000).map(|i| (i, i)).collect();
    assert_eq!(cursor.next(&b), Err(CursorError::ConcurrentModification));
    assert_eq!(cursor.next(&a), Ok(Some(999)));
    assert_eq!(cursor.remove(&mut a), Ok((999, 999)));
}
