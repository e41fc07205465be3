//! Column estimation
//!
//! 1-D clustering over block horizontal centers. The default estimator fits
//! k-means models for one, two, and three components and picks the component
//! count minimizing a Bayesian-information-style criterion, then merges
//! centers closer than a minimum spacing ratio of the page width so narrow
//! blocks (indented quotes, short lines) cannot split a column.

/// Strategy interface: horizontal centers in, sorted column centers out.
pub trait ColumnEstimator: Send + Sync {
    fn estimate(&self, centers: &[f32], page_width: f32) -> Vec<f32>;
}

/// Default estimator: BIC-selected 1-D k-means, k in 1..=3.
#[derive(Debug, Clone)]
pub struct BicKMeans {
    /// Cluster centers closer than this ratio of page width collapse into one
    /// column.
    pub min_spacing_ratio: f32,
}

impl BicKMeans {
    pub fn new(min_spacing_ratio: f32) -> Self {
        Self { min_spacing_ratio }
    }

    /// Lloyd iterations with deterministic quantile seeding. Returns sorted
    /// centers and the sum of squared distances.
    fn kmeans_1d(values: &[f32], k: usize) -> (Vec<f32>, f64) {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // Seed at evenly spaced quantiles of the sorted values.
        let mut centers: Vec<f32> = (0..k)
            .map(|i| sorted[(i * sorted.len() + sorted.len() / 2) / k.max(1)])
            .collect();

        for _ in 0..32 {
            let mut sums = vec![0.0f64; k];
            let mut counts = vec![0usize; k];
            for &v in values {
                let c = nearest(&centers, v);
                sums[c] += v as f64;
                counts[c] += 1;
            }
            let mut moved = false;
            for i in 0..k {
                if counts[i] == 0 {
                    continue;
                }
                let next = (sums[i] / counts[i] as f64) as f32;
                if (next - centers[i]).abs() > f32::EPSILON {
                    moved = true;
                }
                centers[i] = next;
            }
            if !moved {
                break;
            }
        }

        centers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        centers.dedup_by(|a, b| (*a - *b).abs() < f32::EPSILON);

        let sse: f64 = values
            .iter()
            .map(|&v| {
                let c = centers[nearest(&centers, v)];
                ((v - c) as f64).powi(2)
            })
            .sum();
        (centers, sse)
    }

    /// BIC-style score: n * ln(sse / n) + k * ln(n). Lower is better.
    fn bic(sse: f64, n: usize, k: usize) -> f64 {
        let n_f = n as f64;
        // Guard the degenerate perfect-fit case.
        let variance = (sse / n_f).max(1e-9);
        n_f * variance.ln() + (k as f64) * n_f.ln()
    }
}

impl Default for BicKMeans {
    fn default() -> Self {
        Self::new(0.15)
    }
}

impl ColumnEstimator for BicKMeans {
    fn estimate(&self, centers: &[f32], page_width: f32) -> Vec<f32> {
        if centers.is_empty() {
            return Vec::new();
        }
        // Too few blocks to determine columns: treat the page as single-column.
        if centers.len() < 3 {
            return vec![page_width / 2.0];
        }

        let mut best: Option<(f64, Vec<f32>)> = None;
        for k in 1..=3usize.min(centers.len()) {
            let (fit, sse) = Self::kmeans_1d(centers, k);
            let score = Self::bic(sse, centers.len(), fit.len());
            if best.as_ref().map_or(true, |(s, _)| score < *s) {
                best = Some((score, fit));
            }
        }
        let fitted = best.map(|(_, c)| c).unwrap_or_default();

        // Merge centers closer than the minimum column spacing.
        let min_gap = self.min_spacing_ratio * page_width;
        let mut merged: Vec<f32> = Vec::with_capacity(fitted.len());
        for center in fitted {
            match merged.last() {
                Some(&last) if center - last <= min_gap => {}
                _ => merged.push(center),
            }
        }
        merged
    }
}

/// Index of the center nearest to `value`.
pub fn nearest(centers: &[f32], value: f32) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, &c) in centers.iter().enumerate() {
        let d = (value - c).abs();
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_page() {
        let est = BicKMeans::default();
        assert!(est.estimate(&[], 600.0).is_empty());
    }

    #[test]
    fn test_fewer_than_three_centers_is_single_column() {
        let est = BicKMeans::default();
        let cols = est.estimate(&[100.0, 500.0], 600.0);
        assert_eq!(cols, vec![300.0]);
    }

    #[test]
    fn test_two_column_page() {
        let est = BicKMeans::default();
        let centers = [148.0, 150.0, 152.0, 149.0, 448.0, 450.0, 452.0, 451.0];
        let cols = est.estimate(&centers, 600.0);
        assert_eq!(cols.len(), 2);
        assert!((cols[0] - 150.0).abs() < 5.0);
        assert!((cols[1] - 450.0).abs() < 5.0);
    }

    #[test]
    fn test_single_column_page() {
        let est = BicKMeans::default();
        let centers = [298.0, 300.0, 302.0, 299.0, 301.0, 300.0];
        let cols = est.estimate(&centers, 600.0);
        assert_eq!(cols.len(), 1);
    }

    #[test]
    fn test_close_centers_merge() {
        // Two apparent clusters 40pt apart on a 600pt page: gap is under
        // 0.15 * 600 = 90, so they collapse into one column.
        let est = BicKMeans::default();
        let centers = [280.0, 281.0, 279.0, 320.0, 321.0, 319.0];
        let cols = est.estimate(&centers, 600.0);
        assert_eq!(cols.len(), 1);
    }

    #[test]
    fn test_nearest() {
        assert_eq!(nearest(&[100.0, 400.0], 120.0), 0);
        assert_eq!(nearest(&[100.0, 400.0], 390.0), 1);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let est = BicKMeans::default();
        let centers = [148.0, 150.0, 152.0, 448.0, 450.0, 452.0];
        let a = est.estimate(&centers, 600.0);
        let b = est.estimate(&centers, 600.0);
        assert_eq!(a, b);
    }
}
