use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::assets::color::Color;
use crate::config::WalkSettings;
use crate::foundation::core::CropArea;
use crate::foundation::error::MapleResult;
use crate::history::fingerprint::{EquipmentFingerprint, fingerprint_equipment};
use crate::history::sink::SnapshotSink;
use crate::lookup::appearance_from_info;
use crate::lookup::pose::Pose;
use crate::lookup::service::{AppearanceInfo, CharacterLookupService};
use crate::scene::model::CharacterAppearance;

/// One emitted point of a character's history.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct HistorySnapshot {
    pub date: NaiveDate,
    pub appearance: CharacterAppearance,
    pub fingerprint: EquipmentFingerprint,
}

/// Knobs for a single walk.
#[derive(Clone, Debug, PartialEq)]
pub struct WalkOptions {
    /// Maximum number of snapshots emitted.
    pub cap: usize,
    /// Oldest date visited (inclusive).
    pub boundary: NaiveDate,
    /// Delay between consecutive dates.
    pub pacing: Duration,
    /// Pinned "today"; the walk starts the day before. `None` uses the current UTC date.
    pub today: Option<NaiveDate>,
    pub default_crop: CropArea,
    pub background: Color,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::from_settings(&WalkSettings::default())
    }
}

impl WalkOptions {
    pub fn from_settings(settings: &WalkSettings) -> Self {
        Self {
            cap: settings.cap,
            boundary: settings.boundary,
            pacing: Duration::from_millis(settings.pacing_ms),
            today: None,
            default_crop: CropArea::DEFAULT_FACE,
            background: Color::WHITE,
        }
    }

    /// Newest date the walk visits.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.today
            .unwrap_or_else(|| Utc::now().date_naive())
            .pred_opt()
    }
}

/// Why a walk stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkOutcome {
    /// The cursor passed the boundary date.
    Completed,
    /// `cap` snapshots were emitted.
    CapReached,
    /// The caller cancelled; snapshots already delivered stay valid.
    Cancelled,
}

/// Summary of a finished walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct WalkReport {
    pub outcome: WalkOutcome,
    pub emitted: usize,
    /// Dates whose requests were issued.
    pub attempted: usize,
    /// Dates skipped because a request failed or had no data.
    pub skipped_failed: usize,
    /// Dates skipped because equipment matched the last emitted snapshot.
    pub skipped_unchanged: usize,
}

impl WalkReport {
    fn new() -> Self {
        Self {
            outcome: WalkOutcome::Completed,
            emitted: 0,
            attempted: 0,
            skipped_failed: 0,
            skipped_unchanged: 0,
        }
    }
}

/// Walks a character's appearance history backwards one date at a time.
///
/// A walker holds no per-walk state, so concurrent walks on one walker are independent.
#[derive(Clone)]
pub struct HistoryWalker {
    service: Arc<dyn CharacterLookupService>,
    options: WalkOptions,
}

impl std::fmt::Debug for HistoryWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryWalker")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl HistoryWalker {
    pub fn new(service: Arc<dyn CharacterLookupService>, options: WalkOptions) -> Self {
        Self { service, options }
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Walk `name` from yesterday down to the boundary, pushing distinct snapshots into `sink`.
    ///
    /// Only a failure to resolve the name is returned as an error (plus sink errors);
    /// per-date failures are skipped. Cancellation ends the walk with
    /// [`WalkOutcome::Cancelled`] and no further pushes.
    pub async fn walk(
        &self,
        name: &str,
        sink: &mut dyn SnapshotSink,
        cancel: &CancellationToken,
    ) -> MapleResult<WalkReport> {
        let mut report = WalkReport::new();
        if cancel.is_cancelled() {
            report.outcome = WalkOutcome::Cancelled;
            return Ok(report);
        }
        if self.options.cap == 0 {
            report.outcome = WalkOutcome::CapReached;
            return Ok(report);
        }

        let id = self.service.resolve_identifier(name).await?;
        let boundary = self.options.boundary;
        let Some(mut cursor) = self.options.start_date() else {
            return Ok(report);
        };
        info!(name, %id, from = %cursor, to = %boundary, cap = self.options.cap, "history walk started");

        let mut last_emitted: Option<EquipmentFingerprint> = None;
        while cursor >= boundary {
            if cancel.is_cancelled() {
                report.outcome = WalkOutcome::Cancelled;
                break;
            }

            report.attempted += 1;
            let (appearance, equipment) = tokio::join!(
                self.service.appearance(&id, Some(cursor)),
                self.service.equipment_state(&id, Some(cursor)),
            );
            if cancel.is_cancelled() {
                report.outcome = WalkOutcome::Cancelled;
                break;
            }

            match (appearance, equipment) {
                (Ok(info), Ok(payload)) => {
                    let fingerprint = fingerprint_equipment(&payload);
                    if last_emitted == Some(fingerprint) {
                        report.skipped_unchanged += 1;
                        debug!(date = %cursor, "equipment unchanged; skipping");
                    } else {
                        last_emitted = Some(fingerprint);
                        sink.push(HistorySnapshot {
                            date: cursor,
                            appearance: self.snapshot_appearance(&info),
                            fingerprint,
                        })?;
                        report.emitted += 1;
                        debug!(date = %cursor, %fingerprint, "snapshot emitted");
                        if report.emitted >= self.options.cap {
                            report.outcome = WalkOutcome::CapReached;
                            break;
                        }
                    }
                }
                (Err(e), _) | (_, Err(e)) => {
                    report.skipped_failed += 1;
                    debug!(date = %cursor, error = %e, "date skipped");
                }
            }

            cursor = match cursor.pred_opt() {
                Some(prev) if prev >= boundary => prev,
                _ => break,
            };
            if !self.options.pacing.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        report.outcome = WalkOutcome::Cancelled;
                        break;
                    }
                    _ = tokio::time::sleep(self.options.pacing) => {}
                }
            }
        }

        info!(
            name,
            outcome = ?report.outcome,
            emitted = report.emitted,
            attempted = report.attempted,
            "history walk finished"
        );
        Ok(report)
    }

    fn snapshot_appearance(&self, info: &AppearanceInfo) -> CharacterAppearance {
        let mut appearance = appearance_from_info(info, &Pose::default());
        appearance.crop = self.options.default_crop;
        appearance.background = self.options.background;
        appearance
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/walker.rs"]
mod tests;
