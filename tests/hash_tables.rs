use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use paste::paste;
use primcoll::{
    BigOpenHashMap, BigOpenHashSet, CursorError, OpenHashMap, OpenHashSet, PrimitiveKey,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const NUM_KEYS: u32 = 2_000;

static SEED: Lazy<u64> = Lazy::new(|| {
    let mut buf = [0; 8];
    getrandom::getrandom(&mut buf).unwrap();
    let seed = u64::from_le_bytes(buf);
    println!("Random seed: {seed:#018x}");
    seed
});

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(*SEED)
}

macro_rules! generate_map_tests {
    ($name:ident, $map_init:expr, $key_of:expr) => {
        paste! {
            #[test]
            fn [<$name _matches_std_hash_map>]() {
                init_logger();
                let key_of = $key_of;
                let mut rng = seeded_rng();
                let mut map = $map_init;
                let mut oracle = HashMap::new();

                for round in 0..20_000u64 {
                    let key = key_of(rng.gen_range(0..NUM_KEYS));
                    if rng.gen_range(0..3) < 2 {
                        assert_eq!(map.insert(key, round), oracle.insert(key.key_bits(), round));
                    } else {
                        assert_eq!(map.remove(key), oracle.remove(&key.key_bits()));
                    }
                }

                assert_eq!(map.len() as u64, oracle.len() as u64);
                assert_eq!(map.iter().count(), oracle.len());
                for (key, value) in map.iter() {
                    assert_eq!(oracle.get(&key.key_bits()), Some(value));
                }
            }

            #[test]
            fn [<$name _cursor_returns_every_entry_once>]() {
                init_logger();
                let key_of = $key_of;
                let mut rng = seeded_rng();
                let mut map = $map_init;
                for i in 0..NUM_KEYS {
                    map.insert(key_of(i), u64::from(i));
                }

                let mut cursor = map.cursor();
                let mut seen = HashSet::new();
                let mut removed = 0;
                while let Some(key) = cursor.next(&map).unwrap() {
                    assert!(seen.insert(key.key_bits()), "{key:?} returned twice");
                    if rng.gen_range(0..2) == 0 {
                        let (removed_key, _) = cursor.remove(&mut map).unwrap();
                        assert!(removed_key.same_key(key));
                        removed += 1;
                    }
                }
                assert_eq!(seen.len(), NUM_KEYS as usize);
                assert_eq!(map.len() as u64, u64::from(NUM_KEYS - removed));
            }

            #[test]
            fn [<$name _shrinks_back_to_initial_capacity>]() {
                init_logger();
                let key_of = $key_of;
                let mut map = $map_init;
                let initial = map.capacity() as u64;

                for i in 0..NUM_KEYS {
                    map.insert(key_of(i), u64::from(i));
                }
                assert!(map.capacity() as u64 > initial);

                for i in 0..NUM_KEYS {
                    assert_eq!(map.remove(key_of(i)), Some(u64::from(i)));
                }
                assert!(map.is_empty());
                assert_eq!(map.capacity() as u64, initial);
            }
        }
    };
}

macro_rules! generate_set_tests {
    ($name:ident, $set_init:expr, $key_of:expr) => {
        paste! {
            #[test]
            fn [<$name _set_matches_std_hash_set>]() {
                init_logger();
                let key_of = $key_of;
                let mut rng = seeded_rng();
                let mut set = $set_init;
                let mut oracle = HashSet::new();

                for _ in 0..20_000 {
                    let key = key_of(rng.gen_range(0..NUM_KEYS));
                    if rng.gen_range(0..2) == 0 {
                        assert_eq!(set.insert(key), oracle.insert(key.key_bits()));
                    } else {
                        assert_eq!(set.remove(key), oracle.remove(&key.key_bits()));
                    }
                    assert_eq!(set.contains(key), oracle.contains(&key.key_bits()));
                }

                let keys: HashSet<_> = set.iter().map(PrimitiveKey::key_bits).collect();
                assert_eq!(keys, oracle);

                set.retain(|k| k.key_bits() % 2 == 0);
                assert!(set.iter().all(|k| k.key_bits() % 2 == 0));
                set.clear();
                assert!(set.is_empty());
            }
        }
    };
}

fn int_key(i: u32) -> i32 {
    i as i32 - (NUM_KEYS / 2) as i32
}

// Keys differing only in their high bits.
fn high_bits_key(i: u32) -> i64 {
    i64::from(i) << 40
}

fn float_key(i: u32) -> f64 {
    f64::from(i) * 0.25 - 10.0
}

fn char_key(i: u32) -> char {
    char::from_u32(i).unwrap()
}

generate_map_tests!(open_i32, OpenHashMap::new(), int_key);
generate_map_tests!(open_i64, OpenHashMap::with_capacity(10), high_bits_key);
generate_map_tests!(
    open_f64,
    OpenHashMap::with_capacity_and_load_factor(100, 0.5),
    float_key
);
generate_map_tests!(
    open_char,
    OpenHashMap::builder(16).load_factor(0.9).build(),
    char_key
);

generate_map_tests!(big_i32, BigOpenHashMap::new(), int_key);
generate_map_tests!(
    big_i64,
    BigOpenHashMap::builder(16).segment_shift(3).build(),
    high_bits_key
);
generate_map_tests!(
    big_f64,
    BigOpenHashMap::builder(100).segment_shift(5).load_factor(0.5).build(),
    float_key
);
generate_map_tests!(
    big_char,
    BigOpenHashMap::builder(16).segment_shift(1).build(),
    char_key
);

generate_set_tests!(open_i32, OpenHashSet::new(), int_key);
generate_set_tests!(open_f64, OpenHashSet::with_capacity(4), float_key);
generate_set_tests!(
    big_i64,
    BigOpenHashSet::builder(8).segment_shift(2).build(),
    high_bits_key
);
generate_set_tests!(big_char, BigOpenHashSet::new(), char_key);

#[test]
fn flat_and_big_tables_agree_on_contents() {
    init_logger();
    let mut rng = seeded_rng();
    let mut flat = OpenHashMap::new();
    let mut big = BigOpenHashMap::builder(16).segment_shift(4).build();

    for round in 0..5_000u32 {
        let key = float_key(rng.gen_range(0..500u32));
        if rng.gen_range(0..4) == 0 {
            assert_eq!(flat.remove(key), big.remove(key));
        } else {
            assert_eq!(flat.insert(key, round), big.insert(key, round));
        }
    }
    assert_eq!(flat.len() as u64, big.len());
    assert_eq!(flat.capacity() as u64, big.capacity());
    for (key, value) in flat.iter() {
        assert_eq!(big.get(key), Some(value));
    }
}

#[test]
fn cursors_are_bound_to_their_table() {
    let mut a = OpenHashMap::with_capacity(1000);
    a.insert(1u64, 1u64);
    let mut cursor = a.cursor();

    let mut b = OpenHashMap::new();
    b.insert(2u64, 2u64);
    assert_eq!(cursor.next(&b), Err(CursorError::ConcurrentModification));
    assert_eq!(cursor.next(&a), Ok(Some(1)));

    let mut sets = (BigOpenHashSet::<u16>::default(), BigOpenHashSet::<u16>::default());
    sets.0.insert(1);
    sets.1.insert(1);
    let mut cursor = sets.0.cursor();
    assert_eq!(cursor.next(&sets.1), Err(CursorError::ConcurrentModification));
    assert_eq!(cursor.next(&sets.0), Ok(Some(1)));
    assert_eq!(cursor.remove(&mut sets.0), Ok(1));
    assert!(sets.0.is_empty());
    assert_eq!(OpenHashSet::<f32>::default().len(), 0);
}

#[test]
fn values_need_no_default() {
    struct Resource {
        id: u32,
    }

    let resources: Vec<Resource> = (0..100).map(|id| Resource { id }).collect();
    let mut flat: OpenHashMap<u32, &Resource> = OpenHashMap::new();
    let mut big: BigOpenHashMap<u32, &Resource> = BigOpenHashMap::new();
    for r in &resources {
        flat.insert(r.id, r);
        big.insert(r.id, r);
    }
    assert_eq!(flat.remove(40).map(|r| r.id), Some(40));
    assert_eq!(big.remove(40).map(|r| r.id), Some(40));
    flat.retain(|k, _| k < 50);
    big.retain(|k, _| k < 50);
    assert_eq!(flat.len(), 49);
    assert_eq!(big.len(), 49);
    assert!(flat.iter().all(|(k, r)| k == r.id));
    assert!(big.iter().all(|(k, r)| k == r.id));
}
