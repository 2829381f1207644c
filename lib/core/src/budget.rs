/// Split a total budget evenly across `missing` slots.
///
/// `None` means "no price ceiling" and stays `None`. Returns `None` as well
/// when nothing is missing, in which case no search should run at all.
#[inline]
#[must_use]
pub fn per_slot_budget(total: Option<f64>, missing: usize) -> Option<f64> {
    if missing == 0 {
        return None;
    }
    total
        .filter(|b| *b > 0.0)
        .map(|b| b / missing as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_split_without_rounding() {
        assert_eq!(per_slot_budget(Some(90.0), 2), Some(45.0));
        assert_eq!(per_slot_budget(Some(100.0), 3), Some(100.0 / 3.0));
    }

    #[test]
    fn test_unconstrained_stays_unconstrained() {
        assert_eq!(per_slot_budget(None, 2), None);
        assert_eq!(per_slot_budget(Some(0.0), 2), None);
    }

    #[test]
    fn test_nothing_missing() {
        assert_eq!(per_slot_budget(Some(120.0), 0), None);
    }
}
