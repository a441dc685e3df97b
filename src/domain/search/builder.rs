//! Compiles investment criteria into a structured query

use super::query::{
    FilterClause, SortClause, StructuredQuery, FEES_FIELD, PERFORMANCE_FIELD, SECTOR_FIELD,
};
use crate::domain::criteria::InvestmentCriteria;

/// Builds the search query for the given criteria
///
/// Only sectors, maximum fees and minimum performance are compiled; the other
/// criteria fields have no filter semantics yet. Results are always ordered by
/// one-year performance, best first, so empty criteria list everything.
pub fn build_query(criteria: &InvestmentCriteria) -> StructuredQuery {
    let mut query = StructuredQuery::new();

    if !criteria.sectors().is_empty() {
        query = query.with_filter(FilterClause::terms(
            SECTOR_FIELD,
            criteria.sectors().iter().cloned(),
        ));
    }

    if let Some(fees_max) = criteria.fees_max() {
        query = query.with_filter(FilterClause::at_most(FEES_FIELD, fees_max));
    }

    if let Some(min_performance) = criteria.min_performance() {
        query = query.with_filter(FilterClause::at_least(PERFORMANCE_FIELD, min_performance));
    }

    query.with_sort(SortClause::desc(PERFORMANCE_FIELD))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::SortOrder;

    #[test]
    fn test_empty_criteria_has_no_filters() {
        let query = build_query(&InvestmentCriteria::default());

        assert!(!query.has_filters());
        assert_eq!(query.sort, vec![SortClause::desc("performance_1y")]);
        assert_eq!(query.sort[0].order, SortOrder::Desc);
        assert_eq!(query.size, None);
    }

    #[test]
    fn test_fees_only() {
        let criteria = InvestmentCriteria::builder().fees_max(0.5).build();
        let query = build_query(&criteria);

        assert_eq!(query.filters, vec![FilterClause::at_most("fees", 0.5)]);
        let numeric: Vec<_> = query
            .filters
            .iter()
            .filter(|f| matches!(f, FilterClause::Range { .. }))
            .collect();
        assert_eq!(numeric.len(), 1);
    }

    #[test]
    fn test_all_compiled_fields() {
        let criteria = InvestmentCriteria::builder()
            .sector("technologie")
            .sector("esg")
            .fees_max(0.5)
            .min_performance(3.0)
            .build();

        let query = build_query(&criteria);

        assert_eq!(
            query.filters,
            vec![
                FilterClause::terms("sector", ["esg", "technologie"]),
                FilterClause::at_most("fees", 0.5),
                FilterClause::at_least("performance_1y", 3.0),
            ]
        );
    }

    #[test]
    fn test_uncompiled_fields_produce_no_clauses() {
        let criteria = InvestmentCriteria::builder()
            .region("europe")
            .product_type("capitalisant")
            .replication("physique")
            .availability("pea")
            .risk(3.0)
            .strategy("value")
            .esg(80)
            .emetteur("amundi")
            .build();

        assert!(!build_query(&criteria).has_filters());
    }

    #[test]
    fn test_build_is_deterministic_for_reordered_sets() {
        let a = InvestmentCriteria::builder()
            .sectors(["technologie", "sante", "energie"])
            .build();
        let b = InvestmentCriteria::builder()
            .sectors(["energie", "technologie", "sante"])
            .build();

        assert_eq!(build_query(&a), build_query(&b));
        assert_eq!(build_query(&a), build_query(&a));
    }

    #[test]
    fn test_zero_bound_is_a_constraint() {
        let criteria = InvestmentCriteria::builder().min_performance(0.0).build();
        let query = build_query(&criteria);

        assert_eq!(query.filters, vec![FilterClause::at_least("performance_1y", 0.0)]);
    }
}
