use num_bigint::BigUint;

use crate::errors::RouterError;

/// Split `amount` into percentage slices of `distribution_percent`
/// granularity: `i·step` percent for `i = 1..=100/step`. Amounts are
/// computed multiply-before-divide so the only rounding is the single
/// final division; the 100% slice is exactly `amount`.
pub fn distribute_amount(
    amount: &BigUint,
    distribution_percent: u32,
) -> Result<(Vec<u32>, Vec<BigUint>), RouterError> {
    if distribution_percent == 0 || 100 % distribution_percent != 0 {
        return Err(RouterError::config(format!(
            "distributionPercent {} must divide 100 evenly",
            distribution_percent
        )));
    }
    let steps = 100 / distribution_percent;
    let mut percents = Vec::with_capacity(steps as usize);
    let mut amounts = Vec::with_capacity(steps as usize);
    for i in 1..=steps {
        let percent = i * distribution_percent;
        percents.push(percent);
        amounts.push(amount * BigUint::from(percent) / BigUint::from(100u32));
    }
    Ok((percents, amounts))
}
