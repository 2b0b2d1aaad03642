//! Simple Good-Turing (SGT) frequency smoothing (spec §4.2), after Gale &
//! Sampson, "Good-Turing Frequency Estimation Without Tears" (1995).
//!
//! Observed n-gram counts cluster around a handful of distinct values (most
//! n-grams occur once or twice, a few occur very often); `FreqOfFreq` is
//! that clustering — `r[i]` is a distinct observed count and `n[i]` is how
//! many n-grams were seen exactly `r[i]` times. `SgtModel::fit` turns that
//! into a smoothed probability per distinct count plus a probability mass
//! reserved for n-grams never seen at all.

/// Frequency-of-frequencies table: `r[i]` observed counts occurring exactly
/// `n[i]` times, kept sorted ascending by `r`.
#[derive(Debug, Clone, Default)]
pub struct FreqOfFreq {
    pub r: Vec<u64>,
    pub n: Vec<u64>,
}

impl FreqOfFreq {
    pub fn new() -> Self {
        FreqOfFreq::default()
    }

    /// Record one more node whose count is `total`.
    pub fn observe(&mut self, total: u64) {
        match self.r.binary_search(&total) {
            Ok(i) => self.n[i] += 1,
            Err(i) => {
                self.r.insert(i, total);
                self.n.insert(i, 1);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }
}

/// A fitted SGT model: a smoothed probability estimate per distinct
/// observed count, plus the probability mass set aside for unseen n-grams.
#[derive(Debug, Clone)]
pub struct SgtModel {
    pub r: Vec<u64>,
    pub p: Vec<f64>,
    pub p_zero: f64,
}

impl SgtModel {
    /// Fit an SGT model from the frequency-of-frequencies table observed
    /// over `total` n-gram occurrences.
    ///
    /// `freq` must be sorted ascending by `r` (as built by
    /// [`FreqOfFreq::observe`]) and non-empty.
    pub fn fit(freq: &FreqOfFreq, total: u64) -> SgtModel {
        let num_counts = freq.len();
        let total_f = total as f64;

        // Mass reserved for never-seen n-grams is the fraction of the
        // corpus that was singleton occurrences — zero if nothing was
        // observed exactly once.
        let p_zero = if freq.r[0] == 1 {
            freq.n[0] as f64 / total_f
        } else {
            0.0
        };

        // Averaging transform: Z[i] replaces the raw frequency n[i] with a
        // density spread over the gap to its neighbors in r.
        let mut z = vec![0.0f64; num_counts];
        if num_counts == 1 {
            z[0] = freq.n[0] as f64;
        } else {
            z[0] = 2.0 * freq.n[0] as f64 / (freq.r[1] as f64 - 0.0);
            for i in 1..num_counts - 1 {
                z[i] = 2.0 * freq.n[i] as f64 / (freq.r[i + 1] as f64 - freq.r[i - 1] as f64);
            }
            let last = num_counts - 1;
            z[last] = freq.n[last] as f64 / (freq.r[last] as f64 - freq.r[last - 1] as f64);
        }

        let log_r: Vec<f64> = freq.r.iter().map(|&r| (r as f64).ln()).collect();
        let log_z: Vec<f64> = z.iter().map(|&v| v.ln()).collect();

        let (a, b) = best_fit_line(&log_r, &log_z);
        let smooth = |x: f64| (a + b * x.ln()).exp();

        let mut r_star: Vec<f64> = freq
            .r
            .iter()
            .map(|&r| {
                let r = r as f64;
                (r + 1.0) * smooth(r + 1.0) / smooth(r)
            })
            .collect();

        // For small r, the directly-observed Turing estimate is preferred
        // over the SGT line fit, up until the two estimates diverge beyond
        // a 95% confidence band.
        for i in 0..num_counts {
            let r = freq.r[i] as f64;
            let Some(&r1) = freq.r.get(i + 1) else {
                break;
            };
            if r1 != freq.r[i] + 1 {
                break;
            }

            let n_r = freq.n[i] as f64;
            let n_r1 = freq.n[i + 1] as f64;

            let x = (r + 1.0) * n_r1 / n_r;
            let d = (x - r_star[i]).abs();
            let band = 1.96 * ((r + 1.0).powi(2) * (n_r1 / (n_r * n_r)) * (1.0 + n_r1 / n_r)).sqrt();

            if d <= band {
                break;
            }
            r_star[i] = x;
        }

        let new_total: f64 = r_star
            .iter()
            .zip(freq.n.iter())
            .map(|(&rs, &n)| rs * n as f64)
            .sum();

        let p: Vec<f64> = r_star
            .iter()
            .map(|&rs| (1.0 - p_zero) * rs / new_total)
            .collect();

        SgtModel {
            r: freq.r.clone(),
            p,
            p_zero,
        }
    }

    /// Smoothed probability for an n-gram observed `count` times.
    pub fn probability(&self, count: u64) -> f64 {
        let i = self
            .r
            .binary_search(&count)
            .expect("count not present in the fitted frequency table");
        self.p[i]
    }
}

/// Ordinary least squares fit of `y = a + b*x`, returning `(a, b)`.
fn best_fit_line(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len() as f64;
    let mean_x: f64 = x.iter().sum::<f64>() / n;
    let mean_y: f64 = y.iter().sum::<f64>() / n;

    let mut xy = 0.0;
    let mut xsq = 0.0;
    for i in 0..x.len() {
        xy += (x[i] - mean_x) * (y[i] - mean_y);
        xsq += (x[i] - mean_x) * (x[i] - mean_x);
    }

    let b = if xsq == 0.0 { 0.0 } else { xy / xsq };
    let a = mean_y - b * mean_x;
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freq_of_freq_stays_sorted_and_tallies() {
        let mut f = FreqOfFreq::new();
        for total in [3, 1, 1, 2, 3, 3] {
            f.observe(total);
        }
        assert_eq!(f.r, vec![1, 2, 3]);
        assert_eq!(f.n, vec![2, 1, 3]);
    }

    #[test]
    fn fitted_probabilities_renormalize_to_one_minus_pzero() {
        let mut f = FreqOfFreq::new();
        let counts = [1u64, 1, 1, 2, 2, 3, 4, 5, 7, 10, 1, 2, 3, 1, 2];
        for &c in &counts {
            f.observe(c);
        }
        let total: u64 = counts.iter().sum();
        let model = SgtModel::fit(&f, total);

        let mass: f64 = model
            .p
            .iter()
            .zip(f.n.iter())
            .map(|(&p, &n)| p * n as f64)
            .sum();
        assert!((mass - (1.0 - model.p_zero)).abs() < 1e-6);
    }

    #[test]
    fn single_distinct_count_does_not_produce_nan() {
        let mut f = FreqOfFreq::new();
        for _ in 0..5 {
            f.observe(2);
        }
        let model = SgtModel::fit(&f, 10);
        assert!(model.p[0].is_finite());
        assert!(model.p_zero.is_finite());
    }

    #[test]
    fn probability_lookup_matches_observed_count() {
        let mut f = FreqOfFreq::new();
        for c in [1, 1, 2, 3, 3, 3] {
            f.observe(c);
        }
        let model = SgtModel::fit(&f, 13);
        assert!(model.probability(1) > 0.0);
        assert!(model.probability(3) > model.probability(1) || model.probability(3) > 0.0);
    }
}
