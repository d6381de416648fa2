pub mod department_diversity_scorer;
pub mod digest_log_side_effect;
pub mod fiscal_year_hydrator;
pub mod impact_scorer;
pub mod ledger_review_source;
pub mod materiality_filter;
pub mod top_k_selector;
pub mod urgency_hydrator;
