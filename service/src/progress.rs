//! Progress reporting for long running Solution teardowns.
//!
//! A report can reach up to three sinks at once: a callback, a console line
//! and an event channel. Whichever of them `DeleteOptions` carries is used.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use async_std::channel::Sender;
use core_types::events::{ItemProgressStatus, ProgressData, ProgressEvent};

/// Called with the rounded percent done, the job id and the per-item payload.
pub type ProgressCallback = Arc<dyn Fn(u8, Option<&str>, &ProgressData) + Send + Sync>;

#[derive(Clone, Default)]
pub struct DeleteOptions {
    pub progress_callback: Option<ProgressCallback>,
    pub console_progress: bool,
    pub job_id: Option<String>,
    pub progress_tx: Option<Sender<ProgressEvent>>,
}

impl Debug for DeleteOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteOptions")
            .field("progress_callback", &self.progress_callback.is_some())
            .field("console_progress", &self.console_progress)
            .field("job_id", &self.job_id)
            .field("progress_tx", &self.progress_tx.is_some())
            .finish()
    }
}

impl DeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress_callback(
        mut self,
        callback: impl Fn(u8, Option<&str>, &ProgressData) + Send + Sync + 'static,
    ) -> Self {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn with_console_progress(mut self, console_progress: bool) -> Self {
        self.console_progress = console_progress;
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_progress_tx(mut self, progress_tx: Sender<ProgressEvent>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }
}

/// Rounds and clamps a running percentage to the 0..=100 range reported to callers.
pub fn normalize_percent(percent_done: f64) -> u8 {
    if percent_done.is_nan() {
        return 0;
    }
    percent_done.round().clamp(0.0, 100.0) as u8
}

/// Console form: `<timestamp> <item id> <job id> <stage> <Label> <percent>%`.
pub fn console_line(
    timestamp_millis: i64,
    item_id: Option<&str>,
    job_id: Option<&str>,
    status: ItemProgressStatus,
    percent_done: u8,
) -> String {
    format!(
        "{} {} {} {} {}%",
        timestamp_millis,
        item_id.unwrap_or(""),
        job_id.unwrap_or(""),
        status.status_line(),
        percent_done
    )
}

/// Report progress to every sink configured in `options`.
///
/// `item_id` is `None` for overall progress ticks.
pub async fn report_progress(
    percent_done: f64,
    options: &DeleteOptions,
    item_id: Option<&str>,
    status: ItemProgressStatus,
) {
    let percent = normalize_percent(percent_done);
    tracing::debug!(
        percent,
        item_id = item_id.unwrap_or(""),
        status = %status,
        "Deletion progress"
    );

    if let Some(callback) = &options.progress_callback {
        let data = ProgressData {
            event: item_id.unwrap_or("").to_string(),
            data: status.status_line(),
        };
        callback(percent, options.job_id.as_deref(), &data);
    }

    if options.console_progress {
        println!(
            "{}",
            console_line(
                chrono::Utc::now().timestamp_millis(),
                item_id,
                options.job_id.as_deref(),
                status,
                percent,
            )
        );
    }

    if let Some(tx) = &options.progress_tx {
        tx.send(ProgressEvent::DeletionProgress {
            percent_done: percent,
            job_id: options.job_id.clone(),
            item_id: item_id.map(str::to_string),
            status,
        })
        .await
        .ok();
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordedProgress;
    use super::*;

    #[test]
    fn test_normalize_percent() {
        assert_eq!(normalize_percent(33.333), 33);
        assert_eq!(normalize_percent(66.6667), 67);
        assert_eq!(normalize_percent(120.0), 100);
        assert_eq!(normalize_percent(-3.0), 0);
        assert_eq!(normalize_percent(f64::NAN), 0);
    }

    #[test]
    fn test_console_line() {
        let line = console_line(
            1700000000000,
            Some("wm1"),
            Some("job-7"),
            ItemProgressStatus::Finished,
            40,
        );
        assert_eq!(line, "1700000000000 wm1 job-7 3 Finished 40%");

        let line = console_line(1, None, None, ItemProgressStatus::Started, 5);
        assert_eq!(line, "1   1 Started 5%");
    }

    #[async_std::test]
    async fn test_report_progress_invokes_callback() {
        let recorded = RecordedProgress::default();
        let options = recorded.options().with_job_id("job-1");

        report_progress(19.6, &options, Some("wm1"), ItemProgressStatus::Failed).await;
        report_progress(25.0, &options, None, ItemProgressStatus::Started).await;

        assert_eq!(
            recorded.snapshot(),
            vec![
                (
                    20,
                    Some("job-1".to_string()),
                    "wm1".to_string(),
                    "3 Failed".to_string()
                ),
                (
                    25,
                    Some("job-1".to_string()),
                    "".to_string(),
                    "1 Started".to_string()
                ),
            ]
        );
    }

    #[async_std::test]
    async fn test_report_progress_sends_event() {
        let (tx, rx) = async_std::channel::unbounded();
        let options = DeleteOptions::new().with_progress_tx(tx);

        report_progress(50.0, &options, Some("g1"), ItemProgressStatus::Ignored).await;

        let event = rx.try_recv().unwrap();
        assert_eq!(
            event,
            ProgressEvent::DeletionProgress {
                percent_done: 50,
                job_id: None,
                item_id: Some("g1".to_string()),
                status: ItemProgressStatus::Ignored,
            }
        );
    }

    #[async_std::test]
    async fn test_report_progress_without_sinks_is_noop() {
        report_progress(10.0, &DeleteOptions::default(), None, ItemProgressStatus::Started).await;
    }
}
