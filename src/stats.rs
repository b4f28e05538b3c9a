use statrs::distribution::{ContinuousCDF, StudentsT};

// ---------------------------------------------------------------------------
// Welch two-sample t-test
// ---------------------------------------------------------------------------

/// Result of a two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    /// Test statistic.
    pub t: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-tailed p-value.
    pub p: f64,
}

/// Welch's t-test for two independent samples (unequal variances).
///
/// Returns `None` when either sample has fewer than 2 observations or when
/// the combined standard error is zero (both samples constant), where the
/// statistic is undefined.
pub fn welch_t(a: &[f64], b: &[f64]) -> Option<TTest> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }

    let na = a.len() as f64;
    let nb = b.len() as f64;
    let ma = mean(a);
    let mb = mean(b);
    let va = sample_variance(a, ma);
    let vb = sample_variance(b, mb);

    // Squared standard error of the mean difference
    let se2 = va / na + vb / nb;
    if !se2.is_finite() || se2 <= 0.0 {
        return None;
    }

    let t = (ma - mb) / se2.sqrt();
    let df = se2 * se2
        / ((va / na).powi(2) / (na - 1.0) + (vb / nb).powi(2) / (nb - 1.0));

    if !t.is_finite() || !df.is_finite() || df <= 0.0 {
        return None;
    }

    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => {
            let upper_tail = 1.0 - dist.cdf(t.abs());
            let p = (2.0 * upper_tail).clamp(0.0, 1.0);
            Some(TTest { t, df, p })
        }
        Err(_) => None,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n − 1 denominator).
fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

// ---------------------------------------------------------------------------
// Five-number summary (box plot geometry)
// ---------------------------------------------------------------------------

/// Min, quartiles and max of a sample; whisker ends are min/max.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Compute the five-number summary of `values`. `None` for an empty slice.
pub fn five_number(values: &[f64]) -> Option<FiveNumber> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(FiveNumber {
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Linear-interpolation quantile on a sorted slice (R type 7).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() as f64 - 1.0) * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
