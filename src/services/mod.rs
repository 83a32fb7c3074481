pub mod analytics;
pub mod prediction;

pub use analytics::{LabelCounts, MetricsSnapshot, PredictionSummary, StatsTracker, TimelinePoint};
pub use prediction::{PredictionService, ServiceMode, MODEL_LABEL_THRESHOLD};
