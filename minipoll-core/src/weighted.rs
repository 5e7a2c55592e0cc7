//! Weighted random selection.
//!
//! One draw routine serves the decision policy, social interaction choice and
//! any other "pick proportional to weight" site. The rules:
//!
//! - entries with zero, negative or non-finite weight are skipped entirely;
//! - a uniform value is drawn in `[0, total)` and the first entry whose
//!   cumulative weight reaches it wins, so earlier entries win exact ties;
//! - when nothing carries weight the caller gets `None` and picks its own
//!   fallback.

use rand::Rng;

/// Whether a weight takes part in a draw.
#[must_use]
pub fn is_usable(weight: f32) -> bool {
    weight.is_finite() && weight > 0.0
}

/// Pick one item, with probability proportional to `weight(item)`.
pub fn choose_weighted_by<'a, T, R, F>(items: &'a [T], weight: F, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f32,
{
    let total: f32 = items
        .iter()
        .map(&weight)
        .filter(|w| is_usable(*w))
        .sum();
    if !is_usable(total) {
        return None;
    }

    let draw = rng.gen_range(0.0..total);
    let mut cumulative = 0.0_f32;
    let mut last_usable = None;
    for item in items {
        let w = weight(item);
        if !is_usable(w) {
            continue;
        }
        cumulative += w;
        last_usable = Some(item);
        if cumulative >= draw {
            return Some(item);
        }
    }
    // Float rounding can leave the cumulative sum a hair below the draw.
    last_usable
}

/// Pick one value from `(value, weight)` pairs.
pub fn choose_weighted<T, R>(options: &[(T, f32)], rng: &mut R) -> Option<T>
where
    T: Copy,
    R: Rng + ?Sized,
{
    choose_weighted_by(options, |&(_, w)| w, rng).map(|&(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_options_yield_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let options: [(u8, f32); 0] = [];
        assert_eq!(choose_weighted(&options, &mut rng), None);
    }

    #[test]
    fn all_zero_or_invalid_weights_yield_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let options = [('a', 0.0), ('b', -2.0), ('c', f32::NAN), ('d', f32::INFINITY)];
        assert_eq!(choose_weighted(&options, &mut rng), None);
    }

    #[test]
    fn zero_weight_entries_are_never_chosen() {
        let mut rng = StdRng::seed_from_u64(7);
        let options = [('a', 0.0), ('b', 1.0), ('c', 0.0)];
        for _ in 0..1_000 {
            assert_eq!(choose_weighted(&options, &mut rng), Some('b'));
        }
    }

    #[test]
    fn proportions_follow_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let options = [('a', 1.0), ('b', 3.0)];
        let n = 20_000;
        let mut b_count = 0;
        for _ in 0..n {
            if choose_weighted(&options, &mut rng) == Some('b') {
                b_count += 1;
            }
        }
        let ratio = f64::from(b_count) / f64::from(n);
        assert!((ratio - 0.75).abs() < 0.02, "ratio {ratio}");
    }

    #[test]
    fn same_seed_same_sequence() {
        let options = [(1, 0.2), (2, 0.5), (3, 0.3)];
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            assert_eq!(choose_weighted(&options, &mut a), choose_weighted(&options, &mut b));
        }
    }
}
