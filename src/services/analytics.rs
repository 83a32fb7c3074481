//! Rolling prediction metrics.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::prediction::{Label, PredictionResult};
use crate::utils::math::round3;

/// One entry of the recent-predictions history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub label: Label,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub confidence: f64,
}

/// Per-label request counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl LabelCounts {
    fn increment(&mut self, label: Label) {
        match label {
            Label::Positive => self.positive += 1,
            Label::Negative => self.negative += 1,
            Label::Neutral => self.neutral += 1,
        }
    }
}

/// Point-in-time view of the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub label_counts: LabelCounts,
    pub average_confidence: f64,
    pub recent_predictions: Vec<PredictionSummary>,
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Default)]
struct TrackerState {
    total_requests: u64,
    label_counts: LabelCounts,
    confidence_sum: f64,
    history: VecDeque<PredictionSummary>,
}

/// Thread-safe aggregator of served predictions.
///
/// A single lock guards all counters and the bounded history, so a snapshot
/// never observes a half-applied record.
#[derive(Debug)]
pub struct StatsTracker {
    capacity: usize,
    state: Mutex<TrackerState>,
}

impl StatsTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(TrackerState {
                history: VecDeque::with_capacity(capacity),
                ..TrackerState::default()
            }),
        }
    }

    // Counters stay consistent even if a holder panicked, so recover the guard.
    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a served prediction, stamped with the current time.
    pub fn record(&self, result: &PredictionResult) {
        self.record_at(result, Utc::now());
    }

    pub fn record_at(&self, result: &PredictionResult, timestamp: DateTime<Utc>) {
        let mut state = self.lock();
        state.total_requests += 1;
        state.label_counts.increment(result.label);
        state.confidence_sum += result.confidence;

        if state.history.len() == self.capacity {
            state.history.pop_front();
        }
        state.history.push_back(PredictionSummary {
            label: result.label,
            confidence: result.confidence,
            timestamp,
        });
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.lock();
        let average_confidence = if state.total_requests == 0 {
            0.0
        } else {
            round3(state.confidence_sum / state.total_requests as f64)
        };

        let recent_predictions: Vec<PredictionSummary> = state.history.iter().cloned().collect();
        let timeline = recent_predictions
            .iter()
            .map(|p| TimelinePoint {
                timestamp: p.timestamp,
                confidence: p.confidence,
            })
            .collect();

        MetricsSnapshot {
            total_requests: state.total_requests,
            label_counts: state.label_counts,
            average_confidence,
            recent_predictions,
            timeline,
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new(50)
    }
}
