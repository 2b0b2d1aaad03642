// Boundary behavior for Simple Good-Turing fitting (spec §8 scenario 4):
// a corpus whose every n-gram occurs the same number of times (no
// singletons) reserves no unseen-mass, while one with singletons does; a
// corpus with exactly one distinct n-gram count degenerates gracefully
// instead of producing NaN.

use cryptogram_core::sgt::{FreqOfFreq, SgtModel};

#[test]
fn no_singletons_reserves_no_unseen_mass() {
    let mut freq = FreqOfFreq::new();
    for count in [2u64, 2, 3, 3, 3, 4] {
        freq.observe(count);
    }
    let total: u64 = [2u64, 2, 3, 3, 3, 4].iter().sum();
    let model = SgtModel::fit(&freq, total);
    assert_eq!(model.p_zero, 0.0);
}

#[test]
fn singleton_occurrences_reserve_their_share_as_unseen_mass() {
    let mut freq = FreqOfFreq::new();
    for count in [1u64, 1, 1, 2, 2, 3] {
        freq.observe(count);
    }
    let total: u64 = [1u64, 1, 1, 2, 2, 3].iter().sum();
    let model = SgtModel::fit(&freq, total);
    assert!((model.p_zero - 3.0 / total as f64).abs() < 1e-12);
}

#[test]
fn single_repeated_word_corpus_assigns_all_mass_to_the_one_ngram() {
    // One distinct n-gram type, observed 9 times: |R| == 1 and R[0] != 1,
    // so no unseen mass is reserved and that single type gets everything.
    let mut freq = FreqOfFreq::new();
    freq.observe(9);
    let model = SgtModel::fit(&freq, 9);
    assert_eq!(model.p_zero, 0.0);
    assert!((model.probability(9) - 1.0).abs() < 1e-9);
}
