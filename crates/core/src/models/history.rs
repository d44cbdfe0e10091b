use serde::{Deserialize, Serialize};

/// A single timestamped total-portfolio-value observation.
///
/// Two kinds exist in one sequence: **actual** snapshots recorded after real
/// trades (permanent), and **prediction** snapshots supplied by the advisory
/// gateway (disposable, replaced wholesale on every forecast refresh).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Chronological ordering key. RFC 3339 for actual snapshots;
    /// predictions carry whatever forward-looking label the gateway supplied.
    pub timestamp: String,

    /// Total portfolio value (cash + marked holdings) at this point
    pub total_value: f64,

    /// Marks gateway-forecast points. Absent in serialized form means actual.
    #[serde(default)]
    pub is_prediction: bool,
}

impl Snapshot {
    /// A recorded (permanent) valuation observation.
    pub fn actual(timestamp: impl Into<String>, total_value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            total_value,
            is_prediction: false,
        }
    }

    /// A forecast point from the advisory gateway.
    pub fn prediction(timestamp: impl Into<String>, total_value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            total_value,
            is_prediction: true,
        }
    }
}

/// Append-only valuation time series with a volatile prediction suffix.
///
/// The sequence is always partitioned: a prefix of actual snapshots in
/// non-decreasing timestamp order, then optionally a suffix of prediction
/// snapshots. Forecast refreshes replace the suffix atomically and never
/// disturb the recorded actuals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    snapshots: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a history with a single actual snapshot (portfolio creation).
    pub fn starting_at(timestamp: impl Into<String>, total_value: f64) -> Self {
        Self {
            snapshots: vec![Snapshot::actual(timestamp, total_value)],
        }
    }

    /// Record a new actual snapshot.
    ///
    /// Any trailing prediction snapshots are dropped first: the event that
    /// produced this observation has invalidated the stale forecast.
    pub fn append_actual(&mut self, snapshot: Snapshot) {
        self.snapshots.retain(|s| !s.is_prediction);
        self.snapshots.push(Snapshot {
            is_prediction: false,
            ..snapshot
        });
    }

    /// Replace the entire prediction suffix with the supplied points.
    ///
    /// Every existing prediction snapshot is removed, then `points` are
    /// appended in the order received, all flagged as predictions. Timestamp
    /// continuity with the actual prefix is not validated — the gateway is
    /// trusted to supply forward-looking labels. Passing an empty vec clears
    /// the suffix.
    pub fn replace_predictions(&mut self, points: Vec<Snapshot>) {
        self.snapshots.retain(|s| !s.is_prediction);
        self.snapshots.extend(points.into_iter().map(|p| Snapshot {
            is_prediction: true,
            ..p
        }));
    }

    /// The full ordered sequence: actual prefix, then prediction suffix.
    #[must_use]
    pub fn series(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Number of recorded (actual) snapshots.
    #[must_use]
    pub fn actual_count(&self) -> usize {
        self.snapshots.iter().filter(|s| !s.is_prediction).count()
    }

    /// Number of forecast points currently in the suffix.
    #[must_use]
    pub fn prediction_count(&self) -> usize {
        self.snapshots.iter().filter(|s| s.is_prediction).count()
    }

    /// The most recent recorded (non-prediction) snapshot.
    #[must_use]
    pub fn latest_actual(&self) -> Option<&Snapshot> {
        self.snapshots.iter().rev().find(|s| !s.is_prediction)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
