// MIT License
//
// Copyright (c) 2020 Gregory Meyer
//
// Permission is hereby granted, free of charge, to any person
// obtaining a copy of this software and associated documentation files
// (the "Software"), to deal in the Software without restriction,
// including without limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of the Software,
// and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
// BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
// ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

mod util;

use util::{colliding, DropNotifier, NoisyDropper};

use super::*;

use crate::hash::{CrapWow, FxHash};

use std::{
    cell::Cell,
    collections::HashSet,
    ffi::{CStr, CString},
    sync::Arc,
};

fn records_in_bin<V, H: ByteHasher>(map: &ArrayHash<V, H>, key: &[u8]) -> usize {
    map.bins[map.bin_index(key)].as_ref().map_or(0, Bin::len)
}

#[test]
fn insertion() {
    const MAX_VALUE: i32 = 512;

    let mut map = ArrayHash::new();

    for i in 0..MAX_VALUE {
        assert_eq!(map.insert(&i.to_string(), i).unwrap(), None);

        assert!(!map.is_empty());
        assert_eq!(map.len(), (i + 1) as usize);

        for j in 0..=i {
            assert_eq!(map.get(&j.to_string()), Some(&j));
            assert_eq!(map.insert(&j.to_string(), j).unwrap(), Some(j));
        }

        for k in i + 1..MAX_VALUE {
            assert_eq!(map.get(&k.to_string()), None);
        }
    }
}

#[test]
fn insertion_into_single_bin() {
    const MAX_VALUE: i32 = 512;

    let mut map = ArrayHash::with_bins_and_hasher(16, colliding).unwrap();

    for i in 0..MAX_VALUE {
        assert_eq!(map.insert(&i.to_le_bytes(), i).unwrap(), None);
    }

    assert_eq!(map.len(), MAX_VALUE as usize);
    assert_eq!(map.bins.iter().flatten().count(), 1);
    assert_eq!(records_in_bin(&map, b""), MAX_VALUE as usize);

    for i in 0..MAX_VALUE {
        assert_eq!(map.get(&i.to_le_bytes()), Some(&i));
    }
}

#[test]
fn removal() {
    const MAX_VALUE: i32 = 512;

    let mut map = ArrayHash::with_bins(64).unwrap();

    for i in 0..MAX_VALUE {
        assert_eq!(map.insert(&i.to_string(), i).unwrap(), None);
    }

    for i in 0..MAX_VALUE {
        assert_eq!(map.take(&i.to_string()), Some(i));
        assert!(!map.contains_key(&i.to_string()));
    }

    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.bin_bytes(), 0);

    for i in 0..MAX_VALUE {
        assert_eq!(map.get(&i.to_string()), None);
    }
}

#[test]
fn removal_from_single_bin() {
    const MAX_VALUE: i32 = 256;

    let mut map = ArrayHash::with_bins_and_hasher(4, colliding).unwrap();

    for i in 0..MAX_VALUE {
        map.insert(&i.to_string(), i).unwrap();
    }

    for i in (0..MAX_VALUE).filter(|i| i % 2 == 1) {
        assert!(map.remove(&i.to_string()));
    }

    assert_eq!(map.len(), (MAX_VALUE / 2) as usize);
    assert_eq!(records_in_bin(&map, b""), (MAX_VALUE / 2) as usize);

    for i in 0..MAX_VALUE {
        let expected = if i % 2 == 0 { Some(&i) } else { None };

        assert_eq!(map.get(&i.to_string()), expected);
    }
}

#[test]
fn assign_then_lookup() {
    let mut map = ArrayHash::with_bins(16384).unwrap();

    assert!(!map.contains_key("foo"));

    map.insert("foo", 5).unwrap();

    assert!(map.contains_key("foo"));
    assert_eq!(map.get("foo"), Some(&5));
    assert_eq!(*map.get_or_insert("foo").unwrap(), 5);
}

#[test]
fn absent_keys() {
    let mut map = ArrayHash::new();
    map.insert("present", 1).unwrap();

    assert!(!map.contains_key("absent"));
    assert!(!map.contains_key(""));
    assert_eq!(map.get("presen"), None);
    assert_eq!(map.get_mut("presentt"), None);
}

#[test]
fn reassign_updates_in_place() {
    let mut map = ArrayHash::new();

    assert!(!map.contains_key("testing"));
    assert_eq!(map.insert("testing", 5).unwrap(), None);
    assert!(map.contains_key("testing"));
    assert_eq!(map.get("testing"), Some(&5));

    let size = map.bin_bytes();

    assert_eq!(map.insert("testing", 10).unwrap(), Some(5));
    assert_eq!(map.get("testing"), Some(&10));
    assert_eq!(map.len(), 1);
    assert_eq!(records_in_bin(&map, b"testing"), 1);
    assert_eq!(map.bin_bytes(), size);
}

#[test]
fn explicit_length_prefix_is_a_distinct_key() {
    let mut map = ArrayHash::new();
    let bytes = b"foobar";

    map.insert(&bytes[..4], 5).unwrap();

    assert!(map.contains_key(&b"foob"[..]));
    assert_eq!(map.get(&b"foob"[..]), Some(&5));
    assert!(!map.contains_key(&bytes[..]));
    assert!(!map.contains_key(&bytes[..3]));
}

#[test]
fn prefix_keys_in_one_bin() {
    let mut map = ArrayHash::with_bins_and_hasher(1, colliding).unwrap();

    map.insert("foobar", 1).unwrap();
    map.insert("foo", 2).unwrap();
    map.insert("foobarbaz", 3).unwrap();

    assert_eq!(map.get("foo"), Some(&2));
    assert_eq!(map.get("foobar"), Some(&1));
    assert_eq!(map.get("foobarbaz"), Some(&3));
    assert_eq!(map.get("fooba"), None);
    assert_eq!(map.get("fo"), None);
}

#[test]
fn embedded_zero_byte() {
    let mut map = ArrayHash::new();
    let key = b"ab\0cd";
    let prefix = CString::new("ab").unwrap();

    map.insert(key, 1).unwrap();

    assert_eq!(map.get(key), Some(&1));
    assert!(!map.contains_key(&prefix));

    map.insert(&prefix, 2).unwrap();

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(key), Some(&1));
    assert_eq!(map.get(&prefix), Some(&2));
    assert_eq!(map.get("ab"), Some(&2));
}

#[test]
fn nul_terminated_keys() {
    let mut map = ArrayHash::new();
    let cstr = CStr::from_bytes_with_nul(b"foo\0").unwrap();

    map.insert(cstr, 5).unwrap();

    assert!(map.contains_key("foo"));
    assert!(map.contains_key(crate::nul_terminated(b"foo\0garbage")));
    assert_eq!(map.get(cstr), Some(&5));
    assert!(!map.contains_key(&b"foo\0"[..]));
}

#[test]
fn binary_integer_key() {
    let mut map = ArrayHash::new();
    let key = 5i32.to_ne_bytes();

    map.insert(&key, 10).unwrap();

    assert!(map.contains_key(&key));
    assert_eq!(map.get(&key), Some(&10));
}

#[test]
fn remove_then_absent() {
    let mut map = ArrayHash::new();

    map.insert("chardel", 10).unwrap();
    assert!(map.remove("chardel"));

    assert!(!map.contains_key("chardel"));
    assert!(map.is_empty());
    assert!(map.bins[map.bin_index(b"chardel")].is_none());
}

#[test]
fn remove_absent_key_mutates_nothing() {
    let mut map = ArrayHash::with_bins_and_hasher(1, colliding).unwrap();

    map.insert("foobar", 1).unwrap();
    let size = map.bin_bytes();

    assert!(!map.remove("foob"));
    assert!(!map.remove("never inserted"));

    assert_eq!(map.len(), 1);
    assert_eq!(map.bin_bytes(), size);
    assert_eq!(map.get("foobar"), Some(&1));
}

#[test]
fn reinsert_after_removal() {
    let mut map = ArrayHash::new();

    map.insert("key", 1).unwrap();
    assert_eq!(map.take("key"), Some(1));
    assert_eq!(map.take("key"), None);

    assert_eq!(map.insert("key", 2).unwrap(), None);
    assert_eq!(map.get("key"), Some(&2));
}

#[test]
fn get_or_insert_defaults() {
    let mut map = ArrayHash::<u64>::new();

    *map.get_or_insert("counter").unwrap() += 1;
    *map.get_or_insert("counter").unwrap() += 1;
    assert_eq!(*map.get_or_insert("fresh").unwrap(), 0);

    assert_eq!(map.get("counter"), Some(&2));
    assert_eq!(map.len(), 2);

    *map.get_mut("counter").unwrap() = 7;
    assert_eq!(map.get("counter"), Some(&7));
}

#[test]
fn zero_bins_is_a_config_error() {
    let err = ArrayHash::<u32>::with_bins(0).unwrap_err();

    assert!(matches!(err, Error::Config { bins: 0 }));
}

#[test]
fn bin_count_is_fixed() {
    let mut map = ArrayHash::with_bins(8).unwrap();

    for i in 0..1024 {
        map.insert(&i.to_string(), i).unwrap();
    }

    assert_eq!(map.bin_count(), 8);
    assert_eq!(ArrayHash::<u32>::new().bin_count(), DEFAULT_BIN_COUNT);
}

#[test]
fn alternative_hashers() {
    let mut crapwow = ArrayHash::with_bins_and_hasher(97, CrapWow::with_seed(3)).unwrap();
    let mut fx = ArrayHash::with_hasher(FxHash);

    for i in 0..256u32 {
        crapwow.insert(&i.to_string(), i).unwrap();
        fx.insert(&i.to_string(), i).unwrap();
    }

    for i in 0..256u32 {
        assert_eq!(crapwow.get(&i.to_string()), Some(&i));
        assert_eq!(fx.get(&i.to_string()), Some(&i));
    }

    assert_eq!(crapwow.hasher().seed(), 3);
}

#[test]
fn iteration_visits_every_entry() {
    let mut map = ArrayHash::with_bins(32).unwrap();

    for i in 0..100 {
        map.insert(&format!("key{}", i), i).unwrap();
    }

    assert_eq!(map.iter().len(), 100);

    let mut seen = HashSet::new();

    for (key, value) in &map {
        assert_eq!(key, format!("key{}", value).as_bytes());
        assert!(seen.insert(*value));
    }

    assert_eq!(seen.len(), 100);
    assert_eq!(map.keys().count(), 100);
}

#[test]
fn clear_releases_bins() {
    let mut map = ArrayHash::with_bins(4).unwrap();

    map.insert("a", 1).unwrap();
    map.insert("b", 2).unwrap();
    map.clear();

    assert!(map.is_empty());
    assert_eq!(map.bin_bytes(), 0);
    assert_eq!(map.bin_count(), 4);
    assert_eq!(map.iter().next(), None);
}

#[test]
fn debug_formats_keys_as_byte_strings() {
    let mut map = ArrayHash::with_bins(1).unwrap();
    map.insert(b"a\0", 1).unwrap();

    assert_eq!(format!("{:?}", map), "{b\"a\\x00\": 1}");
}

#[test]
fn zero_sized_values() {
    let mut map = ArrayHash::<()>::with_bins(2).unwrap();

    assert_eq!(map.insert("a", ()).unwrap(), None);
    assert_eq!(map.insert("a", ()).unwrap(), Some(()));
    assert!(map.contains_key("a"));
    assert!(map.remove("a"));
    assert!(map.is_empty());
}

#[test]
fn value_drop_on_replace() {
    let mut map = ArrayHash::new();

    let notifier = Arc::new(DropNotifier::new());
    map.insert("key", NoisyDropper::new(notifier.clone(), 0)).unwrap();
    assert!(!notifier.was_dropped());

    let previous = map
        .insert("key", NoisyDropper::new(Arc::new(DropNotifier::new()), 1))
        .unwrap();
    assert!(!notifier.was_dropped());

    drop(previous);
    assert!(notifier.was_dropped());
    assert_eq!(map.get("key").map(|v| v.elem), Some(1));
}

#[test]
fn value_drop_on_remove() {
    let mut map = ArrayHash::with_bins_and_hasher(1, colliding).unwrap();

    let notifiers: Vec<_> = (0..3).map(|_| Arc::new(DropNotifier::new())).collect();

    for (i, notifier) in notifiers.iter().enumerate() {
        map.insert(&i.to_string(), NoisyDropper::new(notifier.clone(), i))
            .unwrap();
    }

    assert!(map.remove("1"));
    assert!(notifiers[1].was_dropped());
    assert!(!notifiers[0].was_dropped());
    assert!(!notifiers[2].was_dropped());

    let taken = map.take("2").unwrap();
    assert_eq!(taken, 2);
    assert!(!notifiers[2].was_dropped());

    drop(taken);
    assert!(notifiers[2].was_dropped());
}

#[test]
fn value_drop_with_table() {
    let notifiers: Vec<_> = (0..64).map(|_| Arc::new(DropNotifier::new())).collect();

    {
        let mut map = ArrayHash::with_bins(8).unwrap();

        for (i, notifier) in notifiers.iter().enumerate() {
            map.insert(&i.to_string(), NoisyDropper::new(notifier.clone(), i))
                .unwrap();
        }

        assert!(notifiers.iter().all(|n| !n.was_dropped()));
    }

    assert!(notifiers.iter().all(|n| n.was_dropped()));
}

#[test]
fn cell_values_are_writable_through_get() {
    let mut map = ArrayHash::with_bins_and_hasher(4, colliding).unwrap();
    map.insert("k", Cell::new(1u32)).unwrap();
    map.insert("other", Cell::new(2u32)).unwrap();

    map.get("k").unwrap().set(5);
    assert_eq!(map.get("k").map(Cell::get), Some(5));

    for (key, value) in map.iter() {
        value.set(value.get() * 10 + key.len() as u32);
    }

    assert_eq!(map.get("k").map(Cell::get), Some(51));
    assert_eq!(map.get("other").map(Cell::get), Some(25));
}

#[test]
fn extend_inserts_and_overwrites() {
    let mut map = ArrayHash::with_bins(8).unwrap();
    map.insert("a", 0).unwrap();

    map.extend([("a", 1), ("b", 2)]);
    map.extend(vec![(b"c".to_vec(), 3), (b"b".to_vec(), 4)]);

    assert_eq!(map.len(), 3);
    assert_eq!(map.get("a"), Some(&1));
    assert_eq!(map.get("b"), Some(&4));
    assert_eq!(map.get("c"), Some(&3));
}
