use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::dto::NewProblemsetRequest;
use crate::backend::{ApiClient, ByteStream, ImageUpload, TransformAction};
use crate::document::Document;
use crate::error::AppError;
use crate::services::preview::PdfPreview;

/// Pacing between inserted characters, a UX detail only.
pub const TRANSFORM_CHAR_DELAY: Duration = Duration::from_millis(10);
/// Image extraction streams noticeably slower in the UI.
pub const IMAGE_CHAR_DELAY: Duration = Duration::from_millis(30);

const DEFAULT_TEMPLATE: &str = "\\documentclass{article}\n\n\\begin{document}\n\n\\end{document}\n";

/// Streaming-protocol state of one editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorStatus {
    #[default]
    Idle,
    /// Selection removed, request not yet answered.
    Clearing,
    /// Response chunks are being consumed.
    Streaming,
}

impl EditorStatus {
    pub fn is_busy(self) -> bool {
        self != EditorStatus::Idle
    }
}

/// Per-character pacing configuration; tests run with zero delays.
#[derive(Debug, Clone, Copy)]
pub struct EditorOptions {
    pub char_delay: Duration,
    pub image_char_delay: Duration,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            char_delay: TRANSFORM_CHAR_DELAY,
            image_char_delay: IMAGE_CHAR_DELAY,
        }
    }
}

/// Coordinates one editable document: transform actions streaming text
/// from the backend, clipboard image extraction, the draft lifecycle and
/// compilation into the PDF preview.
///
/// Streamed characters accumulate in a staging buffer (observable via
/// [`EditorSession::subscribe_progress`]) and are spliced into the live
/// document only when the stream completes; on any failure the original
/// selection is restored verbatim. A single in-flight flag rejects
/// re-entrant invocations.
pub struct EditorSession {
    api: Arc<dyn ApiClient>,
    document: Document,
    title: String,
    problemset_id: Option<i64>,
    path: String,
    status: EditorStatus,
    options: EditorOptions,
    progress: watch::Sender<String>,
    preview: PdfPreview,
}

impl EditorSession {
    /// Fresh, not-yet-persisted document seeded with the LaTeX template.
    pub fn new_untitled(api: Arc<dyn ApiClient>, title: impl Into<String>) -> Self {
        let (progress, _) = watch::channel(String::new());
        Self {
            api,
            document: Document::new(DEFAULT_TEMPLATE),
            title: title.into(),
            problemset_id: None,
            path: "/editor".to_string(),
            status: EditorStatus::Idle,
            options: EditorOptions::default(),
            progress,
            preview: PdfPreview::new(),
        }
    }

    /// Opens an existing problemset's draft.
    pub async fn open(api: Arc<dyn ApiClient>, id: i64) -> Result<Self, AppError> {
        let problemset = api.get_problemset(id).await?;
        let mut session = Self::new_untitled(api, problemset.title.clone());
        session.document = Document::new(
            problemset
                .raw_latex
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
        );
        session.problemset_id = Some(id);
        session.path = format!("/editor/{id}");
        Ok(session)
    }

    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn status(&self) -> EditorStatus {
        self.status
    }

    pub fn problemset_id(&self) -> Option<i64> {
        self.problemset_id
    }

    /// Current address of the view, updated once an id is acquired.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn preview_path(&self) -> Option<&Path> {
        self.preview.path()
    }

    /// Watch the staging buffer grow while a stream is applied.
    pub fn subscribe_progress(&self) -> watch::Receiver<String> {
        self.progress.subscribe()
    }

    /// Runs a transform action over the current selection: the selection
    /// is removed up front, the replacement streams from the backend and
    /// is spliced in atomically on success. Without a selection this is
    /// a no-op, matching the context-menu behavior.
    pub async fn transform_selection(&mut self, action: TransformAction) -> Result<(), AppError> {
        if self.status.is_busy() {
            return Err(AppError::Busy);
        }
        let Some((anchor, original)) = self.document.take_selection() else {
            return Ok(());
        };
        self.status = EditorStatus::Clearing;
        debug!(action = action.label(), chars = original.chars().count(), "transform requested");

        let result = match self.api.transform_latex(action, &original).await {
            Ok(stream) => {
                self.status = EditorStatus::Streaming;
                self.drain_stream(stream, self.options.char_delay).await
            }
            Err(e) => Err(e),
        };

        self.status = EditorStatus::Idle;
        match result {
            Ok(staged) => {
                self.document.splice(anchor, &staged);
                info!(action = action.label(), chars = staged.chars().count(), "transform applied");
                Ok(())
            }
            Err(e) => {
                // Best effort rollback: the selection goes back verbatim.
                self.document.splice(anchor, &original);
                warn!(action = action.label(), "transform failed: {e}");
                Err(e)
            }
        }
    }

    /// Clipboard image → LaTeX, streamed into the document at the
    /// cursor. The busy flag doubles as the blocking overlay.
    pub async fn paste_image(&mut self, image: ImageUpload) -> Result<(), AppError> {
        if self.status.is_busy() {
            return Err(AppError::Busy);
        }
        self.status = EditorStatus::Streaming;
        let anchor = self.document.cursor();

        let result = match self.api.latex_from_image(image).await {
            Ok(stream) => self.drain_stream(stream, self.options.image_char_delay).await,
            Err(e) => Err(e),
        };

        self.status = EditorStatus::Idle;
        match result {
            Ok(staged) => {
                self.document.splice(anchor, &staged);
                info!(chars = staged.chars().count(), "image extraction applied");
                Ok(())
            }
            Err(e) => {
                warn!("image extraction failed: {e}");
                Err(e)
            }
        }
    }

    /// Persists the draft, creating the problemset on first save.
    pub async fn save_draft(&mut self) -> Result<i64, AppError> {
        if self.status.is_busy() {
            return Err(AppError::Busy);
        }
        let id = self.ensure_problemset_id().await?;
        self.api.save_draft(id, self.document.text()).await?;
        info!(id, "draft saved");
        Ok(id)
    }

    /// Finalizes the problemset, creating it first if needed.
    pub async fn finalize(&mut self) -> Result<i64, AppError> {
        if self.status.is_busy() {
            return Err(AppError::Busy);
        }
        let id = self.ensure_problemset_id().await?;
        self.api.finalize_problemset(id, self.document.text()).await?;
        info!(id, "problemset finalized");
        Ok(id)
    }

    /// Compiles the full document into the preview pane. The old
    /// preview is revoked up front, so a failed compile leaves no
    /// preview rather than a stale one.
    pub async fn compile(&mut self) -> Result<PathBuf, AppError> {
        if self.status.is_busy() {
            return Err(AppError::Busy);
        }
        if self.document.text().trim().is_empty() {
            return Err(AppError::Validation("LaTeX code is empty".to_string()));
        }
        self.preview.clear();

        let output = self.api.compile_latex(self.document.text()).await?;
        if !output.is_pdf() {
            return Err(AppError::Malformed(format!(
                "expected application/pdf, got {:?}",
                output.content_type
            )));
        }
        self.preview.replace(&output.bytes)
    }

    /// Save-draft toolbar button: persist, then compile.
    pub async fn save_and_compile(&mut self) -> Result<(i64, PathBuf), AppError> {
        let id = self.save_draft().await?;
        let path = self.compile().await?;
        Ok((id, path))
    }

    /// Finalize toolbar button: persist, then compile.
    pub async fn finalize_and_compile(&mut self) -> Result<(i64, PathBuf), AppError> {
        let id = self.finalize().await?;
        let path = self.compile().await?;
        Ok((id, path))
    }

    async fn ensure_problemset_id(&mut self) -> Result<i64, AppError> {
        if let Some(id) = self.problemset_id {
            return Ok(id);
        }
        let created = self
            .api
            .create_problemset(NewProblemsetRequest {
                title: self.title.clone(),
                kind: None,
                part_of: None,
                group_name: None,
            })
            .await?;
        self.problemset_id = Some(created.id);
        self.path = format!("/editor/{}", created.id);
        info!(id = created.id, "problemset created on first save");
        Ok(created.id)
    }

    /// Consumes the stream into the staging buffer, one character at a
    /// time with the configured pacing. The live document is never
    /// touched here.
    async fn drain_stream(
        &self,
        mut stream: ByteStream,
        delay: Duration,
    ) -> Result<String, AppError> {
        let mut staged = String::new();
        let mut decoder = Utf8Decoder::default();
        self.progress.send_replace(String::new());

        while let Some(chunk) = stream.next().await {
            let text = decoder.push(&chunk?)?;
            for ch in text.chars() {
                staged.push(ch);
                self.progress.send_replace(staged.clone());
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
        decoder.finish()?;
        Ok(staged)
    }
}

/// Incremental UTF-8 decoder; response chunks may split multi-byte
/// sequences anywhere.
#[derive(Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Appends `chunk` and returns every complete character so far.
    fn push(&mut self, chunk: &[u8]) -> Result<String, AppError> {
        self.pending.extend_from_slice(chunk);
        match std::str::from_utf8(&self.pending) {
            Ok(s) => {
                let out = s.to_string();
                self.pending.clear();
                Ok(out)
            }
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(AppError::Malformed(format!(
                        "invalid UTF-8 in stream at byte {}",
                        e.valid_up_to()
                    )));
                }
                // Incomplete trailing sequence: emit the valid prefix,
                // keep the tail for the next chunk.
                let valid = e.valid_up_to();
                let out = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                Ok(out)
            }
        }
    }

    /// A stream must not end in the middle of a character.
    fn finish(&self) -> Result<(), AppError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(AppError::Malformed(
                "truncated UTF-8 sequence at end of stream".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockApi;

    #[tokio::test]
    async fn test_busy_editor_rejects_overlapping_actions() {
        let api = Arc::new(MockApi::new().with_stream_text("x"));
        let mut editor = EditorSession::new_untitled(api, "t");
        editor.document_mut().select(0, 5);
        editor.status = EditorStatus::Streaming;

        assert!(matches!(
            editor.transform_selection(TransformAction::FixLatex).await,
            Err(AppError::Busy)
        ));
        assert!(matches!(editor.save_draft().await, Err(AppError::Busy)));
        assert!(matches!(editor.compile().await, Err(AppError::Busy)));
        // The guard must not have consumed the selection.
        assert!(editor.document().selection().is_some());
    }

    #[test]
    fn test_decoder_passes_ascii_through() {
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.push(b"abc").expect("ascii"), "abc");
        decoder.finish().expect("clean end");
    }

    #[test]
    fn test_decoder_joins_split_multibyte() {
        // "č" is 0xC4 0x8D; split it across chunks.
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.push(&[b'a', 0xC4]).expect("first"), "a");
        assert_eq!(decoder.push(&[0x8D, b'b']).expect("second"), "čb");
        decoder.finish().expect("clean end");
    }

    #[test]
    fn test_decoder_rejects_invalid_sequence() {
        let mut decoder = Utf8Decoder::default();
        assert!(decoder.push(&[0xFF]).is_err());
    }

    #[test]
    fn test_decoder_rejects_truncated_end() {
        let mut decoder = Utf8Decoder::default();
        decoder.push(&[0xC4]).expect("pending is fine mid-stream");
        assert!(decoder.finish().is_err());
    }
}
