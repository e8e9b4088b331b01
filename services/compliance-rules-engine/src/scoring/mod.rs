pub mod aggregator;
pub mod history;

pub use aggregator::ScoreAggregator;
pub use history::HistoricalRiskAggregator;
