//! Summary statistics over frame sequences.

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean and population (divide-by-N) standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    (m, var.sqrt())
}

/// Per-column mean and standard deviation of a `[row][column]` matrix.
pub fn column_mean_std(rows: &[Vec<f64>], columns: usize) -> Vec<(f64, f64)> {
    (0..columns)
        .map(|c| {
            let column: Vec<f64> = rows.iter().map(|r| r[c]).collect();
            mean_std(&column)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_std() {
        let (m, s) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(m, 5.0);
        assert_eq!(s, 2.0);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn columns() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        assert_eq!(column_mean_std(&rows, 2), vec![(2.0, 1.0), (10.0, 0.0)]);
    }
}
