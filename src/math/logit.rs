//! Multinomial-logit choice shares.

/// Share of preference for each alternative: `exp(u_i) / Σ exp(u_j)`.
///
/// Utilities are shifted by their maximum before exponentiating; the ratio is
/// unchanged and large utilities cannot overflow.
///
/// Returns `None` for an empty slice or any non-finite utility.
pub fn logit_shares(utilities: &[f64]) -> Option<Vec<f64>> {
    if utilities.is_empty() || utilities.iter().any(|u| !u.is_finite()) {
        return None;
    }
    let max = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let attractiveness: Vec<f64> = utilities.iter().map(|u| (u - max).exp()).collect();
    let total: f64 = attractiveness.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    Some(attractiveness.into_iter().map(|a| a / total).collect())
}
