use super::*;

#[test]
fn splitmix_is_deterministic_per_seed() {
    let mut a = 42u64;
    let mut b = 42u64;
    for _ in 0..16 {
        assert_eq!(splitmix64(&mut a), splitmix64(&mut b));
    }
    let mut c = 43u64;
    assert_ne!(splitmix64(&mut a), splitmix64(&mut c));
}

#[test]
fn rand_integer_stays_in_inclusive_bounds() {
    let mut state = 7u64;
    let mut seen_lo = false;
    let mut seen_hi = false;
    for _ in 0..2000 {
        let v = rand_integer(&mut state, 5, 10);
        assert!((5..=10).contains(&v));
        seen_lo |= v == 5;
        seen_hi |= v == 10;
    }
    assert!(seen_lo && seen_hi, "both bounds should be reachable");
}

#[test]
fn rand_integer_accepts_swapped_bounds() {
    let mut state = 7u64;
    for _ in 0..100 {
        let v = rand_integer(&mut state, 10, 5);
        assert!((5..=10).contains(&v));
    }
}

#[test]
fn rand_float_stays_in_half_open_range() {
    let mut state = 99u64;
    for _ in 0..2000 {
        let v = rand_float(&mut state, -1.5, 2.5);
        assert!((-1.5..2.5).contains(&v));
    }
}
