use deferred_list::DeferredList;
use rand::{rngs::StdRng, Rng};

/// Applies one uniformly chosen edit (insert, remove or set) at a random
/// valid index to both the naive reference and the deferred list.
///
/// Removed values are cross-checked on the spot.
pub fn random_edit(
    rng: &mut StdRng,
    step: u64,
    reference: &mut Vec<u64>,
    list: &mut DeferredList<u64>,
) {
    match rng.random_range(0..3u8) {
        0 => {
            let index = rng.random_range(0..=reference.len());
            reference.insert(index, step);
            list.insert(index, step).unwrap();
        }
        1 if !reference.is_empty() => {
            let index = rng.random_range(0..reference.len());
            assert_eq!(reference.remove(index), list.remove(index).unwrap());
        }
        2 if !reference.is_empty() => {
            let index = rng.random_range(0..reference.len());
            *reference.get_mut(index).unwrap() = step;
            list.set(index, step).unwrap();
        }
        _ => {}
    }
}

/// Compares a random point lookup between the reference and the list.
pub fn check_random_lookup(rng: &mut StdRng, reference: &[u64], list: &mut DeferredList<u64>) {
    assert_eq!(reference.len(), list.len());
    if reference.is_empty() {
        return;
    }
    let index = rng.random_range(0..reference.len());
    assert_eq!(reference.get(index), list.get(index).ok());
}
