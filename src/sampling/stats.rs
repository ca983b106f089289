//! Statistics of correlated Monte Carlo time series.

/// Arithmetic mean, zero for an empty series.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Estimate the integrated autocorrelation time using the initial positive
/// sequence of the autocorrelation function.
pub fn autocorrelation_time(samples: &[f64]) -> f64 {
    let n = samples.len();
    let mean = mean(samples);
    let var = samples.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n as f64;

    if n == 0 || var == 0.0 {
        return 1.0;
    }

    let mut autocorr = 1.0;
    for t in 1..n / 2 {
        let auto_t: f64 = samples[..n - t].iter()
            .zip(samples[t..].iter())
            .map(|(&x, &y)| (x - mean) * (y - mean))
            .sum::<f64>() / ((n - t) as f64 * var);

        if auto_t < 0.0 {
            break;
        }
        autocorr += 2.0 * auto_t;
    }
    autocorr
}

/// Standard error of the mean from blocks of size ⌈2τ⌉.
pub fn blocking_error(samples: &[f64], autocorrelation_time: f64) -> f64 {
    let block_size = ((2.0 * autocorrelation_time).ceil() as usize).max(1);
    let n_blocks = samples.len() / block_size;

    if n_blocks < 2 {
        return 0.0;
    }

    let block_means: Vec<f64> = samples
        .chunks_exact(block_size)
        .map(|block| block.iter().sum::<f64>() / block_size as f64)
        .collect();

    let mean = mean(&block_means);
    let variance = block_means.iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>() / (n_blocks - 1) as f64;

    (variance / n_blocks as f64).sqrt()
}
