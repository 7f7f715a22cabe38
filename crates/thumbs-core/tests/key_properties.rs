//! Sampled properties of cache key derivation.

use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashSet;
use thumbs_core::geometry::canonicalize;
use thumbs_core::{CacheKey, Geometry};

const SAMPLES: usize = 5_000;

fn random_string(rng: &mut StdRng, max_len: usize) -> String {
    let len = rng.gen_range(1..=max_len);
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

fn random_geometry(rng: &mut StdRng) -> String {
    let width = rng.gen_bool(0.7).then(|| rng.gen_range(1..4000));
    let height = if width.is_none() {
        Some(rng.gen_range(1..4000))
    } else {
        rng.gen_bool(0.5).then(|| rng.gen_range(1..4000))
    };
    canonicalize(width, height)
}

#[test]
fn test_identical_inputs_identical_keys() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..SAMPLES {
        let path = format!("{}/{}.jpg", random_string(&mut rng, 12), random_string(&mut rng, 12));
        let action = random_string(&mut rng, 10);
        let geometry = random_geometry(&mut rng);

        assert_eq!(
            CacheKey::derive(&path, &action, &geometry),
            CacheKey::derive(&path.clone(), &action.clone(), &geometry.clone())
        );
    }
}

#[test]
fn test_single_component_change_changes_key() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..SAMPLES {
        let path = random_string(&mut rng, 24);
        let action = random_string(&mut rng, 10);
        let geometry = random_geometry(&mut rng);
        let base = CacheKey::derive(&path, &action, &geometry);

        let other_path = format!("{}x", path);
        let other_action = format!("{}_", action);
        let other_geometry = format!("{}0", geometry);

        assert_ne!(base, CacheKey::derive(&other_path, &action, &geometry));
        assert_ne!(base, CacheKey::derive(&path, &other_action, &geometry));
        assert_ne!(base, CacheKey::derive(&path, &action, &other_geometry));
    }
}

#[test]
fn test_distinct_inputs_do_not_collide() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut inputs = HashSet::new();
    let mut keys = HashSet::new();

    for _ in 0..SAMPLES {
        let input = (
            random_string(&mut rng, 16),
            random_string(&mut rng, 8),
            random_geometry(&mut rng),
        );
        if inputs.insert(input.clone()) {
            assert!(keys.insert(CacheKey::derive(&input.0, &input.1, &input.2)));
        }
    }
}

#[test]
fn test_equivalent_geometries_share_a_key() {
    let short = Geometry::parse("resize", "120").unwrap();
    let long = Geometry::parse("resize", "120x120").unwrap();
    assert_eq!(
        CacheKey::derive("a.jpg", "resize", &short.canonical()),
        CacheKey::derive("a.jpg", "resize", &long.canonical())
    );
}
