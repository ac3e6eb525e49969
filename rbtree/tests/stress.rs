//! Randomized driver: fill a tree with random keys, then drain it with one of
//! several deletion strategies, checking every invariant after each step.

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rbtree::{Error, NodeRef, RedBlackTree};
use simplelog::{Config, LevelFilter, TestLogger};

#[cfg(not(miri))]
const ROUNDS: u64 = 200;
#[cfg(miri)]
const ROUNDS: u64 = 2;

const KEYS_PER_ROUND: usize = 100;
const KEY_MAX: i32 = 10000;

#[derive(Debug, Clone, Copy)]
enum Drain {
    Root,
    Min,
    Max,
    /// A random child of the root, or the root itself once it is a leaf.
    NearRoot,
}

fn init_logging() {
    let _ = TestLogger::init(LevelFilter::Info, Config::default());
}

fn check(tree: &RedBlackTree<i32>) {
    if let Err(e) = tree.validate() {
        panic!("{e}: {tree:#?}");
    }
    let bound = 2.0 * ((tree.len() + 1) as f64).log2();
    assert!(tree.height() as f64 <= bound, "tree too tall: {tree:#?}");
}

fn fill(rng: &mut ChaCha8Rng) -> RedBlackTree<i32> {
    let mut tree = RedBlackTree::new();
    for _ in 0..KEYS_PER_ROUND {
        let key = rng.gen_range(0..KEY_MAX);
        let len = tree.len();
        match tree.insert(key) {
            Ok(node) => {
                assert_eq!(tree.key(node), Some(&key));
                assert_eq!(tree.len(), len + 1);
            }
            Err(e) => {
                assert_eq!(e, Error::DuplicateKey);
                assert_eq!(tree.len(), len);
            }
        }
        check(&tree);
    }
    tree
}

fn pick(tree: &RedBlackTree<i32>, drain: Drain, rng: &mut ChaCha8Rng) -> Option<NodeRef> {
    match drain {
        Drain::Root => tree.root(),
        Drain::Min => tree.min(),
        Drain::Max => tree.max(),
        Drain::NearRoot => {
            let root = tree.root()?;
            match (tree.left(root), tree.right(root)) {
                (None, None) => Some(root),
                (Some(child), None) | (None, Some(child)) => Some(child),
                (Some(left), Some(right)) => Some(if rng.gen() { left } else { right }),
            }
        }
    }
}

fn drain(tree: &mut RedBlackTree<i32>, drain: Drain, rng: &mut ChaCha8Rng) {
    while let Some(node) = pick(tree, drain, rng) {
        let key = *tree.key(node).unwrap();
        let len = tree.len();

        assert_eq!(tree.delete(node), Ok(key));
        assert_eq!(tree.len(), len - 1);
        assert!(!tree.contains(&key));
        check(tree);
    }
    assert!(tree.is_empty());
}

fn run(strategy: Drain, seed: u64) {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for round in 0..ROUNDS {
        let mut tree = fill(&mut rng);
        let black_height = tree.validate().unwrap();
        if round % 50 == 0 {
            info!(
                "{strategy:?} round {round}: {} keys, height {}, black height {black_height}",
                tree.len(),
                tree.height()
            );
        }
        drain(&mut tree, strategy, &mut rng);
    }
}

#[test]
fn drain_from_root() {
    run(Drain::Root, 1);
}

#[test]
fn drain_from_min() {
    run(Drain::Min, 2);
}

#[test]
fn drain_from_max() {
    run(Drain::Max, 3);
}

#[test]
fn drain_near_root() {
    run(Drain::NearRoot, 4);
}

#[test]
fn search_tracks_membership() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut tree = RedBlackTree::new();
    let mut present = vec![false; KEY_MAX as usize];

    for _ in 0..20 * KEYS_PER_ROUND {
        let key = rng.gen_range(0..KEY_MAX);
        if rng.gen_bool(0.6) {
            let inserted = tree.insert(key).is_ok();
            assert_eq!(inserted, !present[key as usize]);
            present[key as usize] = true;
        } else {
            let removed = tree.delete_key(&key).is_some();
            assert_eq!(removed, present[key as usize]);
            present[key as usize] = false;
        }
    }
    check(&tree);

    for (key, present) in present.iter().enumerate() {
        assert_eq!(tree.search(&(key as i32)).is_some(), *present);
    }
}
