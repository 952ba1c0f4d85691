use super::*;

use proptest::prelude::*;

/// Flat reference model: `(key, value, weight)` triples, unique per
/// `(key, value)` pair.
type Model = Vec<(Vec<u8>, String, f64)>;

#[derive(Clone, Debug)]
enum Op {
    /// Insert under a key; the discriminator picks one of two values derived
    /// from the key, so a value is only ever re-inserted with its own key.
    Insert(Vec<u8>, u8, u8),
    Remove(Vec<u8>),
    Query(Vec<u8>, Option<u8>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A tiny alphabet forces heavy prefix sharing, which is where the
    // split/collapse logic actually gets exercised.
    prop::collection::vec(b'a'..=b'd', 0..=6)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        5 => (key.clone(), 0u8..2, 1u8..=8).prop_map(|(k, d, w)| Op::Insert(k, d, w)),
        2 => key.clone().prop_map(Op::Remove),
        2 => (key.clone(), proptest::option::of(1u8..=4)).prop_map(|(k, l)| Op::Query(k, l)),
    ];
    prop::collection::vec(op, 0..=80)
}

fn item_for(key: &[u8], d: u8) -> String {
    format!("{}#{}", String::from_utf8_lossy(key), d)
}

fn model_insert(model: &mut Model, key: &[u8], value: &str, weight: f64) {
    if let Some(entry) = model.iter_mut().find(|(k, v, _)| k == key && v == value) {
        entry.2 += weight;
    } else {
        model.push((key.to_vec(), value.to_string(), weight));
    }
}

fn matches_for(model: &Model, prefix: &[u8]) -> Vec<(String, f64)> {
    model
        .iter()
        .filter(|(k, _, _)| k.starts_with(prefix))
        .map(|(_, v, w)| (v.clone(), *w))
        .collect()
}

/// Canonical order for multiset comparison: weight descending, then value.
fn normalized(mut entries: Vec<(String, f64)>) -> Vec<(String, f64)> {
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

fn check_query<T: Autocompleter<u8, String>>(
    trie: &T,
    model: &Model,
    prefix: &[u8],
    limit: Option<usize>,
) -> Result<(), TestCaseError> {
    let got: Vec<(String, f64)> = trie
        .autocomplete(prefix, limit)
        .into_iter()
        .map(|(v, w)| (v.clone(), w))
        .collect();
    let expected = matches_for(model, prefix);

    for pair in got.windows(2) {
        prop_assert!(
            pair[0].1 >= pair[1].1,
            "results not in non-increasing weight order: {:?}",
            pair
        );
    }

    match limit {
        None => {
            // Repeated reads must come back identically (stable tie order).
            let again: Vec<(String, f64)> = trie
                .autocomplete(prefix, None)
                .into_iter()
                .map(|(v, w)| (v.clone(), w))
                .collect();
            prop_assert_eq!(&got, &again);
            prop_assert_eq!(normalized(got), normalized(expected));
        }
        Some(n) => {
            // Truncation is traversal-order dependent, so only the count and
            // the validity of each returned entry are pinned down.
            prop_assert_eq!(got.len(), expected.len().min(n));
            for (v, w) in &got {
                prop_assert!(
                    expected.iter().any(|(ev, ew)| ev == v && ew == w),
                    "({}, {}) is not a match for prefix {:?}",
                    v,
                    w,
                    prefix
                );
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_both_variants_match_the_model(ops in ops_strategy(), use_average in any::<bool>()) {
        let aggregation = if use_average {
            Aggregation::Average
        } else {
            Aggregation::Sum
        };
        let mut simple: SimpleTrie<u8, String> = SimpleTrie::new(aggregation);
        let mut compressed: CompressedTrie<u8, String> = CompressedTrie::new(aggregation);
        let mut model: Model = Vec::new();

        for op in ops {
            match op {
                Op::Insert(key, d, w) => {
                    let value = item_for(&key, d);
                    let weight = f64::from(w);
                    simple.insert(value.clone(), weight, &key);
                    compressed.insert(value.clone(), weight, &key);
                    model_insert(&mut model, &key, &value, weight);
                }
                Op::Remove(key) => {
                    simple.remove(&key);
                    compressed.remove(&key);
                    model.retain(|(k, _, _)| !k.starts_with(key.as_slice()));
                }
                Op::Query(prefix, limit) => {
                    let limit = limit.map(usize::from);
                    check_query(&simple, &model, &prefix, limit)?;
                    check_query(&compressed, &model, &prefix, limit)?;
                }
            }

            prop_assert_eq!(simple.len(), model.len());
            prop_assert_eq!(compressed.len(), model.len());
            prop_assert_eq!(simple.verify_integrity(), Vec::<String>::new());
            prop_assert_eq!(compressed.verify_integrity(), Vec::<String>::new());
        }

        // Full listings agree across variants and with the model.
        check_query(&simple, &model, &[], None)?;
        check_query(&compressed, &model, &[], None)?;
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    // Distinct weights so the expected ranking is unambiguous.
    let items: Vec<(&'static [u8], f64)> = vec![
        (b"a", 6.0),
        (b"ab", 1.0),
        (b"abc", 4.0),
        (b"b", 3.0),
        (b"ba", 7.0),
        (b"bac", 2.0),
    ];

    let mut expected: Vec<(String, f64)> = items
        .iter()
        .map(|(k, w)| (String::from_utf8_lossy(k).into_owned(), *w))
        .collect();
    expected.sort_by(|a, b| b.1.total_cmp(&a.1));

    for_each_permutation(&items, |perm| {
        let mut simple: SimpleTrie<u8, String> = SimpleTrie::new(Aggregation::Sum);
        let mut compressed: CompressedTrie<u8, String> = CompressedTrie::new(Aggregation::Sum);
        for (key, weight) in &perm {
            let value = String::from_utf8_lossy(key).into_owned();
            simple.insert(value.clone(), *weight, key);
            compressed.insert(value, *weight, key);
        }

        assert_eq!(simple.len(), items.len());
        assert_eq!(compressed.len(), items.len());
        assert_eq!(simple.verify_integrity(), Vec::<String>::new());
        assert_eq!(compressed.verify_integrity(), Vec::<String>::new());

        let listing = |got: Vec<(&String, f64)>| -> Vec<(String, f64)> {
            got.into_iter().map(|(v, w)| (v.clone(), w)).collect()
        };
        assert_eq!(listing(simple.autocomplete(b"", None)), expected);
        assert_eq!(listing(compressed.autocomplete(b"", None)), expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let items: Vec<(&'static [u8], f64)> = vec![
        (b"a", 6.0),
        (b"ab", 1.0),
        (b"abc", 4.0),
        (b"b", 3.0),
        (b"ba", 7.0),
        (b"bac", 2.0),
    ];
    let removals: Vec<&'static [u8]> = vec![b"a", b"ab", b"b", b"bac"];

    for_each_permutation(&removals, |perm| {
        let mut simple: SimpleTrie<u8, String> = SimpleTrie::new(Aggregation::Sum);
        let mut compressed: CompressedTrie<u8, String> = CompressedTrie::new(Aggregation::Sum);
        let mut model: Vec<(&[u8], f64)> = items.clone();
        for (key, weight) in &items {
            let value = String::from_utf8_lossy(key).into_owned();
            simple.insert(value.clone(), *weight, key);
            compressed.insert(value, *weight, key);
        }

        for prefix in perm {
            simple.remove(prefix);
            compressed.remove(prefix);
            model.retain(|(k, _)| !k.starts_with(prefix));

            assert_eq!(simple.len(), model.len());
            assert_eq!(compressed.len(), model.len());
            assert_eq!(simple.verify_integrity(), Vec::<String>::new());
            assert_eq!(compressed.verify_integrity(), Vec::<String>::new());
        }
    });
}
