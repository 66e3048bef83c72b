//! Background conversion
//!
//! A [`ConversionJob`] runs on tokio's blocking pool. Progress is reported
//! through an unbounded channel so the foreground (a terminal, or any UI
//! loop) only ever touches [`ConversionEvent`] values, never MuPDF state.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::document::{DocumentError, DocumentResult, OutputFormat, PageSource};
use crate::mupdf::SafeDocument;

use super::{convert, output_path_for};

/// Progress of a running conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ConversionEvent {
    Started { file: PathBuf, format: OutputFormat },
    /// Document opened; text extraction is starting
    Processing,
    /// `index` pages of `total` have been extracted
    Page { index: usize, total: usize },
    Finished { output: PathBuf },
    Failed { message: String },
}

impl ConversionEvent {
    /// `Finished` or `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversionEvent::Finished { .. } | ConversionEvent::Failed { .. }
        )
    }
}

/// One input file converted to one output format
#[derive(Debug, Clone)]
pub struct ConversionJob {
    input: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
}

impl ConversionJob {
    pub fn new(input: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            input: input.into(),
            format,
            output: None,
        }
    }

    /// Write to `output` instead of next to the input
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| output_path_for(&self.input, self.format))
    }

    /// Convert an already opened source on a blocking worker
    pub fn spawn<S>(self, source: Arc<S>) -> (JobHandle, mpsc::UnboundedReceiver<ConversionEvent>)
    where
        S: PageSource + ?Sized + 'static,
    {
        self.spawn_with(move || Ok(source))
    }

    /// Open the input with MuPDF on the worker, then convert it
    pub fn spawn_file(self) -> (JobHandle, mpsc::UnboundedReceiver<ConversionEvent>) {
        let input = self.input.clone();
        self.spawn_with(move || SafeDocument::open(&input).map(Arc::new))
    }

    fn spawn_with<S, F>(self, open: F) -> (JobHandle, mpsc::UnboundedReceiver<ConversionEvent>)
    where
        S: PageSource + ?Sized + 'static,
        F: FnOnce() -> DocumentResult<Arc<S>> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let output = self.output_path();

        let task = tokio::task::spawn_blocking(move || {
            // A dropped receiver only means nobody is watching
            let emit = |event: ConversionEvent| {
                let _ = tx.send(event);
            };

            emit(ConversionEvent::Started {
                file: self.input.clone(),
                format: self.format,
            });

            let result = open().and_then(|source| {
                emit(ConversionEvent::Processing);
                convert(source.as_ref(), self.format, &output, |index, total| {
                    emit(ConversionEvent::Page { index, total })
                })
            });

            match &result {
                Ok(output) => emit(ConversionEvent::Finished {
                    output: output.clone(),
                }),
                Err(e) => {
                    tracing::warn!("Conversion of {} failed: {}", self.input.display(), e);
                    emit(ConversionEvent::Failed {
                        message: e.to_string(),
                    });
                }
            }
            result
        });

        (JobHandle { task }, rx)
    }
}

/// Handle to a spawned conversion
pub struct JobHandle {
    task: JoinHandle<DocumentResult<PathBuf>>,
}

impl JobHandle {
    /// Wait for the worker and return the written output path
    pub async fn join(self) -> DocumentResult<PathBuf> {
        self.task
            .await
            .map_err(|e| DocumentError::WorkerError(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use tempfile::TempDir;

    async fn collect(mut rx: mpsc::UnboundedReceiver<ConversionEvent>) -> Vec<ConversionEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_output_path_defaults_next_to_input() {
        let job = ConversionJob::new("/docs/report.pdf", OutputFormat::Html);
        assert_eq!(job.output_path(), PathBuf::from("/docs/report.html"));

        let job = job.with_output("/tmp/out.html");
        assert_eq!(job.output_path(), PathBuf::from("/tmp/out.html"));
    }

    #[tokio::test]
    async fn test_job_event_sequence() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("report.docx");
        let source = Arc::new(FakeSource::new(vec![
            page(0, vec![vec![line("one", 72.0, 72.0, 12.0)]]),
            page(1, vec![vec![line("two", 72.0, 72.0, 12.0)]]),
        ]));

        let (handle, rx) = ConversionJob::new("/docs/report.pdf", OutputFormat::Docx)
            .with_output(&output)
            .spawn(source);

        let written = handle.join().await.unwrap();
        assert_eq!(written, output);
        assert!(output.is_file());

        let events = collect(rx).await;
        assert_eq!(
            events,
            vec![
                ConversionEvent::Started {
                    file: PathBuf::from("/docs/report.pdf"),
                    format: OutputFormat::Docx,
                },
                ConversionEvent::Processing,
                ConversionEvent::Page { index: 1, total: 2 },
                ConversionEvent::Page { index: 2, total: 2 },
                ConversionEvent::Finished { output },
            ]
        );
    }

    #[tokio::test]
    async fn test_job_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("report.txt");
        let mut source = FakeSource::new(vec![page(0, vec![]), page(1, vec![])]);
        source.fail_at = Some(1);

        let (handle, rx) = ConversionJob::new("report.pdf", OutputFormat::Txt)
            .with_output(&output)
            .spawn(Arc::new(source));

        assert!(handle.join().await.is_err());
        assert!(!output.exists());

        let events = collect(rx).await;
        let last = events.last().unwrap();
        assert!(last.is_terminal());
        match last {
            ConversionEvent::Failed { message } => assert!(message.contains("page 2 is damaged")),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawn_file_missing_input() {
        let (handle, rx) =
            ConversionJob::new("/no/such/file.pdf", OutputFormat::Txt).spawn_file();

        assert!(matches!(handle.join().await, Err(DocumentError::NotFound(_))));

        let events = collect(rx).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ConversionEvent::Started { .. }));
        assert!(matches!(events[1], ConversionEvent::Failed { .. }));
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(ConversionEvent::Page { index: 3, total: 9 }).unwrap();
        assert_eq!(json, serde_json::json!({"event": "page", "index": 3, "total": 9}));
    }
}
