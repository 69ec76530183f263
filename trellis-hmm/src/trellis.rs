//! Column-at-a-time trellis filling shared by the forward and Viterbi passes.
//!
//! Both algorithms compute column `t` from the finished column `t - 1`, and
//! every cell of a column is independent of its neighbours. [`fill_column`]
//! evaluates one column either sequentially or across rayon workers; each
//! cell runs the same sequential reduction in both modes, so results are
//! bit-identical.

use trellis_core::approx_eq_rel;

/// Evaluate `cell(s)` for every state `s` in `0..n_states`.
pub(crate) fn fill_column<T, F>(n_states: usize, parallel: bool, cell: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    let column: Vec<T> = if parallel {
        use rayon::prelude::*;
        (0..n_states).into_par_iter().map(cell).collect()
    } else {
        (0..n_states).map(cell).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let column: Vec<T> = {
        let _ = parallel;
        (0..n_states).map(cell).collect()
    };
    column
}

/// Relative tolerance under which two log scores count as the same score.
///
/// Equal probability-space products can land a few ulps apart once summed as
/// logarithms (`ln 0.2 + ln 0.35` vs `ln 0.1 + ln 0.7`).
const TIE_EPSILON: f64 = 1e-12;

fn is_tie(a: f64, b: f64) -> bool {
    a.is_finite() && b.is_finite() && approx_eq_rel(a, b, TIE_EPSILON)
}

/// Index and value of the maximum of `values`, keeping the lowest index on
/// ties. An all-impossible column yields index 0.
pub(crate) fn argmax_first<I>(values: I) -> (usize, f64)
where
    I: IntoIterator<Item = f64>,
{
    let mut iter = values.into_iter().enumerate();
    let Some((_, first)) = iter.next() else {
        return (0, f64::NEG_INFINITY);
    };
    let mut best = (0, first);
    for (i, v) in iter {
        if v > best.1 && !is_tie(v, best.1) {
            best = (i, v);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_column_preserves_order() {
        assert_eq!(fill_column(4, false, |s| s * 10), vec![0, 10, 20, 30]);
        assert_eq!(fill_column(4, true, |s| s * 10), vec![0, 10, 20, 30]);
        assert!(fill_column(0, false, |s| s).is_empty());
    }

    #[test]
    fn argmax_keeps_lowest_index_on_ties() {
        assert_eq!(argmax_first([0.1, 0.5, 0.5, 0.2]), (1, 0.5));
        assert_eq!(argmax_first([-1.0, -1.0]), (0, -1.0));
        let (i, v) = argmax_first([f64::NEG_INFINITY, f64::NEG_INFINITY]);
        assert_eq!(i, 0);
        assert_eq!(v, f64::NEG_INFINITY);
        assert_eq!(argmax_first(std::iter::empty::<f64>()).0, 0);
    }

    #[test]
    fn argmax_treats_rounded_log_sums_as_ties() {
        // 0.2 * 0.35 == 0.1 * 0.7 exactly, but not after taking logs
        let low = 0.2f64.ln() + 0.35f64.ln();
        let high = 0.1f64.ln() + 0.7f64.ln();
        assert_eq!(argmax_first([low, high]).0, 0);
        assert_eq!(argmax_first([high, low]).0, 0);
        assert_eq!(argmax_first([f64::NEG_INFINITY, -3.0]), (1, -3.0));
        assert_eq!(argmax_first([-3.0, -2.0]).0, 1);
    }
}
