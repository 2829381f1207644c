// Scalar filters applied to catalog records during a search
use crate::{ProductRecord, Slot};

pub trait Filter {
    fn matches(&self, product: &ProductRecord) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    SlotEquals(Slot),
    MinEcoScore(i32),
    MaxPrice(f64),
    HasEmbedding,
    And(Vec<FilterCondition>),
}

/// Conjunction of the constraints a slot search imposes.
///
/// Every unset constraint is skipped; the embedding-present check always applies.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    condition: FilterCondition,
}

impl ProductFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    pub fn constraints(slot: Option<Slot>, min_eco: Option<i32>, max_price: Option<f64>) -> Self {
        let mut conditions = vec![FilterCondition::HasEmbedding];
        if let Some(slot) = slot {
            conditions.push(FilterCondition::SlotEquals(slot));
        }
        if let Some(min_eco) = min_eco {
            conditions.push(FilterCondition::MinEcoScore(min_eco));
        }
        if let Some(max_price) = max_price {
            conditions.push(FilterCondition::MaxPrice(max_price));
        }
        Self::new(FilterCondition::And(conditions))
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    fn matches_condition(condition: &FilterCondition, product: &ProductRecord) -> bool {
        match condition {
            FilterCondition::SlotEquals(slot) => product.slot == Some(*slot),
            FilterCondition::MinEcoScore(min) => product.eco_score >= *min,
            FilterCondition::MaxPrice(max) => product.price_gbp <= *max,
            FilterCondition::HasEmbedding => product.embedding.is_some(),
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, product))
            }
        }
    }
}

impl Filter for ProductFilter {
    fn matches(&self, product: &ProductRecord) -> bool {
        Self::matches_condition(&self.condition, product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;

    fn product(slot: Option<Slot>, eco: i32, price: f64) -> ProductRecord {
        ProductRecord::new("p", slot)
            .with_eco_score(eco)
            .with_price(price)
            .with_embedding(Vector::new(vec![0.0, 1.0]))
    }

    #[test]
    fn test_unconstrained_filter_only_requires_embedding() {
        let filter = ProductFilter::constraints(None, None, None);
        assert!(filter.matches(&product(None, 0, 999.0)));
        assert!(!filter.matches(&ProductRecord::new("bare", Some(Slot::Top))));
    }

    #[test]
    fn test_slot_eco_and_price_bounds_are_inclusive() {
        let filter = ProductFilter::constraints(Some(Slot::Shoes), Some(50), Some(45.0));
        assert!(filter.matches(&product(Some(Slot::Shoes), 50, 45.0)));
        assert!(!filter.matches(&product(Some(Slot::Shoes), 49, 45.0)));
        assert!(!filter.matches(&product(Some(Slot::Shoes), 50, 45.01)));
        assert!(!filter.matches(&product(Some(Slot::Top), 80, 10.0)));
        assert!(!filter.matches(&product(None, 80, 10.0)));
    }
}
