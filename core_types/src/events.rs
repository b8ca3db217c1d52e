use strum_macros::Display;

/// Per-item state reported while a Solution is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ItemProgressStatus {
    Started,
    Finished,
    Failed,
    Ignored,
}

impl ItemProgressStatus {
    pub fn stage(&self) -> u8 {
        match self {
            ItemProgressStatus::Started => 1,
            ItemProgressStatus::Finished
            | ItemProgressStatus::Failed
            | ItemProgressStatus::Ignored => 3,
        }
    }

    /// Display form used by progress callbacks and console lines, e.g. `"3 Finished"`.
    pub fn status_line(&self) -> String {
        format!("{} {}", self.stage(), self)
    }
}

/// Payload handed to a progress callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressData {
    /// Id of the item the report is about, empty for overall progress.
    pub event: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    DeletionProgress {
        percent_done: u8,
        job_id: Option<String>,
        item_id: Option<String>,
        status: ItemProgressStatus,
    },
}
