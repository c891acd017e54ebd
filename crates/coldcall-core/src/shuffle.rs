use rand::seq::SliceRandom;
use rand::Rng;

/// Uniformly random permutation of `items`, in place.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}
