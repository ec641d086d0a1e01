// Weighted random selection over candidate lists.
//
// Both functions are stateless: all randomness comes from the `DraftRng`
// passed in, so a fixed seed and a fixed candidate order give a fixed result.
//
// `pick_weighted` rolls `r` in `[1, total]` and walks the candidates in the
// order given, returning the first whose running weight reaches `r`. The
// walk order is the tie-break and is part of the contract: reordering the
// candidates changes which role a given seed produces.
//
// `pick_weighted_unique` is sampling without replacement built from repeated
// single picks over a shrinking list.

use role_draft_prng::DraftRng;

/// One weighted pick. Falls back to a uniform pick when every weight is 0.
/// Returns `None` only for an empty candidate list.
pub fn pick_weighted<'a, T>(
    rng: &mut DraftRng,
    candidates: &'a [T],
    weight: impl Fn(&T) -> u32,
) -> Option<&'a T> {
    let total: u64 = candidates.iter().map(|c| u64::from(weight(c))).sum();
    if total == 0 {
        return rng.choose(candidates);
    }
    let roll = rng.range_u64_inclusive(1, total);
    let mut cumulative = 0u64;
    for c in candidates {
        cumulative += u64::from(weight(c));
        if cumulative >= roll {
            return Some(c);
        }
    }
    // Unreachable while `total` is the sum of the same weights.
    candidates.last()
}

/// Up to `k` distinct candidates. Each round removes the previous pick, so
/// the result never repeats an element and has length
/// `min(k, candidates.len())`. With `weighted == false` every round is a
/// uniform pick.
pub fn pick_weighted_unique<T: Clone>(
    rng: &mut DraftRng,
    candidates: &[T],
    k: usize,
    weighted: bool,
    weight: impl Fn(&T) -> u32,
) -> Vec<T> {
    let mut remaining: Vec<T> = candidates.to_vec();
    let mut picked = Vec::with_capacity(k.min(remaining.len()));
    while picked.len() < k && !remaining.is_empty() {
        let index = if weighted {
            let chosen = pick_weighted(rng, &remaining, &weight);
            match chosen.and_then(|c| position_of(&remaining, c)) {
                Some(i) => i,
                None => break,
            }
        } else {
            rng.index(remaining.len())
        };
        picked.push(remaining.remove(index));
    }
    picked
}

/// Index of `target` by address, so equal-but-distinct values are told apart.
fn position_of<T>(items: &[T], target: &T) -> Option<usize> {
    items.iter().position(|x| std::ptr::eq(x, target))
}
