//! Generation dispatch
//!
//! A [`Dispatcher`] owns the submit control and runs at most one
//! generation at a time. Every submission ends in exactly one
//! [`GenerationOutcome`]; errors from the engine are classified here and
//! never propagate further.

use crate::config::{synthesize, GenerationConfig};
use crate::engine::{GenerationEngine, PreviewTarget, ResourceStack, ResourceStackResolver};
use crate::form::FormSnapshot;
use crate::logbuf::LogBuffer;
use crate::report::IssueReport;
use crate::settings::ReportSettings;
use holo_core::{Artifact, HoloError, InputFile, Result, ValidationError};
use std::cell::{Cell, RefCell};
use tracing::{debug, error, info, warn};

/// The submit button. Disabled while a generation is in flight.
#[derive(Debug)]
pub struct SubmitControl {
    enabled: Cell<bool>,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self {
            enabled: Cell::new(true),
        }
    }
}

impl SubmitControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Disable the control until the returned guard is dropped. `None`
    /// when it is already disabled.
    pub fn try_acquire(&self) -> Option<SubmitGuard<'_>> {
        if !self.enabled.replace(false) {
            return None;
        }
        Some(SubmitGuard { control: self })
    }
}

/// Re-enables the submit control on drop, whatever the outcome
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    control: &'a SubmitControl,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.control.enabled.set(true);
    }
}

/// Terminal state of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(Artifact),
    /// The engine rejected the input; shown without a report link
    UserFacingFailure { message: String },
    /// Anything else; shown with a pre-filled issue report
    CrashFailure {
        message: String,
        stack_trace: Vec<String>,
        report: IssueReport,
    },
}

impl GenerationOutcome {
    /// Translation key of the terminal UI state
    pub fn translation_key(&self) -> &'static str {
        match self {
            GenerationOutcome::Success(_) => "button.download_pack",
            GenerationOutcome::UserFacingFailure { .. } => "pack_generation_failed",
            GenerationOutcome::CrashFailure { .. } => "pack_generation_failed.report_github_issue",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            GenerationOutcome::Success(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// Runs submissions against one engine and resource stack resolver
pub struct Dispatcher {
    engine: Box<dyn GenerationEngine>,
    resolver: Box<dyn ResourceStackResolver>,
    preview: Option<Box<dyn PreviewTarget>>,
    logs: LogBuffer,
    report: ReportSettings,
    control: SubmitControl,
    default_stack: RefCell<Option<ResourceStack>>,
}

impl Dispatcher {
    pub fn new(
        engine: Box<dyn GenerationEngine>,
        resolver: Box<dyn ResourceStackResolver>,
        logs: LogBuffer,
    ) -> Self {
        Self {
            engine,
            resolver,
            preview: None,
            logs,
            report: ReportSettings::default(),
            control: SubmitControl::new(),
            default_stack: RefCell::new(None),
        }
    }

    pub fn with_report_settings(mut self, report: ReportSettings) -> Self {
        self.report = report;
        self
    }

    pub fn with_preview(mut self, preview: Box<dyn PreviewTarget>) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn control(&self) -> &SubmitControl {
        &self.control
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    /// Validate and run one submission.
    ///
    /// `file_error` is the structure control's own validation state, set
    /// when the last pick contained files of the wrong type.
    ///
    /// Returns `Err` only when the submission never started: a validation
    /// error, or `SubmissionInFlight` while another run holds the control.
    /// Everything that goes wrong once generation starts is reported as a
    /// failure outcome.
    pub async fn submit(
        &self,
        form: &FormSnapshot,
        files: &[InputFile],
        file_error: Option<ValidationError>,
        local_packs: &[InputFile],
    ) -> Result<GenerationOutcome> {
        if !self.control.is_enabled() {
            return Err(HoloError::SubmissionInFlight);
        }
        if let Some(err) = file_error {
            return Err(err.into());
        }
        validate(form, files)?;

        let config = synthesize(form, files);
        let _guard = self.control.try_acquire().ok_or(HoloError::SubmissionInFlight)?;
        info!(files = files.len(), local_packs = local_packs.len(), "Submitting pack generation");

        let stack = match self.resource_stack(local_packs).await {
            Ok(stack) => stack,
            Err(e) => return Ok(self.classify(e)),
        };
        Ok(self.run(files, &config, &stack).await)
    }

    /// Run one generation with an already synthesized config
    pub async fn dispatch(
        &self,
        files: &[InputFile],
        config: &GenerationConfig,
        stack: &ResourceStack,
    ) -> Result<GenerationOutcome> {
        let _guard = self.control.try_acquire().ok_or(HoloError::SubmissionInFlight)?;
        Ok(self.run(files, config, stack).await)
    }

    /// The default stack, resolved once and cached
    pub async fn default_stack(&self) -> Result<ResourceStack> {
        if let Some(stack) = self.default_stack.borrow().clone() {
            return Ok(stack);
        }
        let stack = self.resolver.resolve(&[]).await?;
        debug!(stack = %stack, "Resolved default resource stack");
        *self.default_stack.borrow_mut() = Some(stack.clone());
        Ok(stack)
    }

    async fn resource_stack(&self, local_packs: &[InputFile]) -> Result<ResourceStack> {
        if !local_packs.is_empty() {
            match self.resolver.resolve(local_packs).await {
                Ok(stack) => return Ok(stack),
                Err(e) => warn!(error = %e, "Failed to load local resource packs, using default stack"),
            }
        }
        self.default_stack().await
    }

    async fn run(
        &self,
        files: &[InputFile],
        config: &GenerationConfig,
        stack: &ResourceStack,
    ) -> GenerationOutcome {
        self.logs.set_origin_time();
        let result = self
            .engine
            .generate(files, config, stack, self.preview.as_deref())
            .await;
        match result {
            Ok(artifact) => {
                info!(
                    engine = self.engine.name(),
                    pack = %artifact.name,
                    hash = %artifact.hash,
                    "Pack generated"
                );
                GenerationOutcome::Success(artifact)
            }
            Err(e) => self.classify(e),
        }
    }

    fn classify(&self, err: HoloError) -> GenerationOutcome {
        error!("Pack creation failed!\n{}", err);
        let message = err.to_string();
        if err.is_user_facing() {
            return GenerationOutcome::UserFacingFailure { message };
        }

        let stack_trace = error_chain(&err);
        debug!("{}", stack_trace.join("\n"));
        let report = IssueReport::new(&self.report, &message, crate::VERSION, &self.logs.to_json());
        GenerationOutcome::CrashFailure {
            message,
            stack_trace,
            report,
        }
    }
}

fn validate(form: &FormSnapshot, files: &[InputFile]) -> Result<()> {
    if files.is_empty() {
        return Err(ValidationError::NoFileSelected.into());
    }
    if let Some(name) = form.get("packName") {
        if name.contains('/') {
            return Err(ValidationError::InvalidPackName(name.to_string()).into());
        }
    }
    Ok(())
}

fn error_chain(err: &HoloError) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::mock::{BuiltinStackResolver, MockEngine};
    use async_trait::async_trait;
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;
    use std::task::{Context, Poll};

    /// Resolves after being polled twice
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();
        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    /// Wraps an engine, counting calls and yielding before generating
    struct CountingEngine {
        inner: Box<dyn GenerationEngine>,
        calls: Rc<Cell<usize>>,
        stacks: Rc<RefCell<Vec<String>>>,
    }

    impl CountingEngine {
        fn new(inner: Box<dyn GenerationEngine>) -> (Self, Rc<Cell<usize>>, Rc<RefCell<Vec<String>>>) {
            let calls = Rc::new(Cell::new(0));
            let stacks = Rc::new(RefCell::new(Vec::new()));
            let engine = Self {
                inner,
                calls: calls.clone(),
                stacks: stacks.clone(),
            };
            (engine, calls, stacks)
        }
    }

    #[async_trait(?Send)]
    impl GenerationEngine for CountingEngine {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(
            &self,
            files: &[InputFile],
            config: &GenerationConfig,
            stack: &ResourceStack,
            preview: Option<&dyn PreviewTarget>,
        ) -> Result<Artifact> {
            self.calls.set(self.calls.get() + 1);
            self.stacks.borrow_mut().push(stack.to_string());
            YieldOnce(false).await;
            self.inner.generate(files, config, stack, preview).await
        }
    }

    struct CountingResolver {
        resolves: Rc<Cell<usize>>,
    }

    #[async_trait(?Send)]
    impl ResourceStackResolver for CountingResolver {
        async fn resolve(&self, overrides: &[InputFile]) -> Result<ResourceStack> {
            self.resolves.set(self.resolves.get() + 1);
            BuiltinStackResolver::new().resolve(overrides).await
        }
    }

    fn structures() -> Vec<InputFile> {
        vec![InputFile::new("castle.mcstructure", b"nbt".to_vec())]
    }

    fn dispatcher(engine: MockEngine) -> (Dispatcher, Rc<Cell<usize>>, Rc<RefCell<Vec<String>>>) {
        let (engine, calls, stacks) = CountingEngine::new(Box::new(engine));
        let dispatcher = Dispatcher::new(
            Box::new(engine),
            Box::new(BuiltinStackResolver::new()),
            LogBuffer::new(),
        );
        (dispatcher, calls, stacks)
    }

    #[test]
    fn test_successful_submission() {
        let (dispatcher, calls, _) = dispatcher(MockEngine::new());
        let form = FormSnapshot::new().with("packName", "Castle");

        let outcome = pollster::block_on(dispatcher.submit(&form, &structures(), None, &[])).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.translation_key(), "button.download_pack");
        assert_eq!(outcome.artifact().unwrap().name, "Castle.holoprint.mcpack");
        assert_eq!(calls.get(), 1);
        assert!(dispatcher.control().is_enabled());
    }

    #[test]
    fn test_no_files_blocks_dispatch() {
        let (dispatcher, calls, _) = dispatcher(MockEngine::new());
        let err = pollster::block_on(dispatcher.submit(&FormSnapshot::new(), &[], None, &[])).unwrap_err();
        assert!(matches!(
            err,
            HoloError::Validation(ValidationError::NoFileSelected)
        ));
        assert_eq!(calls.get(), 0);
        assert!(dispatcher.control().is_enabled());
    }

    #[test]
    fn test_wrong_file_type_blocks_dispatch() {
        let (dispatcher, calls, _) = dispatcher(MockEngine::new());
        let file_error = Some(ValidationError::WrongFileType {
            accepted: ".mcstructure".to_string(),
        });
        let err = pollster::block_on(dispatcher.submit(
            &FormSnapshot::new(),
            &structures(),
            file_error,
            &[],
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            HoloError::Validation(ValidationError::WrongFileType { .. })
        ));
        assert_eq!(calls.get(), 0);
        assert!(dispatcher.control().is_enabled());
    }

    #[test]
    fn test_pack_name_with_slash_is_rejected() {
        let (dispatcher, calls, _) = dispatcher(MockEngine::new());
        let form = FormSnapshot::new().with("packName", "my/pack");
        let err = pollster::block_on(dispatcher.submit(&form, &structures(), None, &[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Pack name cannot contain '/': my/pack"
        );
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_user_error_is_user_facing_failure() {
        let (dispatcher, _, _) = dispatcher(MockEngine::new());
        let files = vec![InputFile::new("empty.mcstructure", Vec::new())];
        let outcome =
            pollster::block_on(dispatcher.submit(&FormSnapshot::new(), &files, None, &[])).unwrap();
        match &outcome {
            GenerationOutcome::UserFacingFailure { message } => {
                assert!(message.contains("empty.mcstructure"))
            }
            other => panic!("expected user-facing failure, got {:?}", other),
        }
        assert_eq!(outcome.translation_key(), "pack_generation_failed");
        assert!(dispatcher.control().is_enabled());
    }

    #[test]
    fn test_crash_builds_issue_report() {
        let (dispatcher, _, _) = dispatcher(MockEngine::crashing("atlas overflow\nin stitch"));
        let outcome =
            pollster::block_on(dispatcher.submit(&FormSnapshot::new(), &structures(), None, &[])).unwrap();
        match &outcome {
            GenerationOutcome::CrashFailure {
                message,
                stack_trace,
                report,
            } => {
                assert_eq!(message, "Generation error: atlas overflow\nin stitch");
                assert_eq!(stack_trace.len(), 1);
                assert!(report
                    .url
                    .contains(&*urlencoding::encode("Generation error: atlas overflow in stitch")));
                assert!(report.url.contains(&format!("&version={}&", crate::VERSION)));
            }
            other => panic!("expected crash, got {:?}", other),
        }
        assert_eq!(
            outcome.translation_key(),
            "pack_generation_failed.report_github_issue"
        );
        assert!(dispatcher.control().is_enabled());
    }

    #[test]
    fn test_second_submission_while_in_flight_is_rejected() {
        let (dispatcher, calls, _) = dispatcher(MockEngine::new());
        let form = FormSnapshot::new();
        let files = structures();

        let (first, second) = pollster::block_on(async {
            futures::join!(
                dispatcher.submit(&form, &files, None, &[]),
                dispatcher.submit(&form, &files, None, &[])
            )
        });
        assert!(first.unwrap().is_success());
        assert!(matches!(second, Err(HoloError::SubmissionInFlight)));
        assert_eq!(calls.get(), 1);
        assert!(dispatcher.control().is_enabled());
    }

    #[test]
    fn test_dispatch_is_exclusive() {
        let (dispatcher, calls, _) = dispatcher(MockEngine::new());
        let files = structures();
        let config = GenerationConfig::default();
        let stack = pollster::block_on(dispatcher.default_stack()).unwrap();

        let (first, second) = pollster::block_on(async {
            futures::join!(
                dispatcher.dispatch(&files, &config, &stack),
                dispatcher.dispatch(&files, &config, &stack)
            )
        });
        assert!(first.unwrap().is_success());
        assert!(matches!(second, Err(HoloError::SubmissionInFlight)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_bad_local_pack_falls_back_to_default_stack() {
        let (dispatcher, _, stacks) = dispatcher(MockEngine::new());
        let broken = vec![InputFile::new("readme.txt", b"hi".to_vec())];
        let outcome =
            pollster::block_on(dispatcher.submit(&FormSnapshot::new(), &structures(), None, &broken))
                .unwrap();
        assert!(outcome.is_success());
        assert_eq!(*stacks.borrow(), vec!["[vanilla]"]);

        let packs = vec![InputFile::new("Faithful.mcpack", b"zip".to_vec())];
        pollster::block_on(dispatcher.submit(&FormSnapshot::new(), &structures(), None, &packs)).unwrap();
        assert_eq!(stacks.borrow()[1], "[Faithful > vanilla]");
    }

    struct RecordingPreview {
        shown: Rc<RefCell<Vec<String>>>,
    }

    impl PreviewTarget for RecordingPreview {
        fn show_preview(&self, structure: &str, stack: &ResourceStack) {
            self.shown.borrow_mut().push(format!("{} {}", structure, stack));
        }
    }

    #[test]
    fn test_preview_target_sees_resolved_stack() {
        let shown = Rc::new(RefCell::new(Vec::new()));
        let dispatcher = Dispatcher::new(
            Box::new(MockEngine::new()),
            Box::new(BuiltinStackResolver::new()),
            LogBuffer::new(),
        )
        .with_preview(Box::new(RecordingPreview {
            shown: shown.clone(),
        }));
        let packs = vec![InputFile::new("Faithful.mcpack", b"zip".to_vec())];

        let outcome = pollster::block_on(dispatcher.submit(
            &FormSnapshot::new(),
            &structures(),
            None,
            &packs,
        ))
        .unwrap();
        assert!(outcome.is_success());
        assert_eq!(
            *shown.borrow(),
            vec!["castle.mcstructure [Faithful > vanilla]".to_string()]
        );
    }

    #[test]
    fn test_default_stack_is_cached() {
        let resolves = Rc::new(Cell::new(0));
        let dispatcher = Dispatcher::new(
            Box::new(MockEngine::new()),
            Box::new(CountingResolver {
                resolves: resolves.clone(),
            }),
            LogBuffer::new(),
        );
        for _ in 0..3 {
            pollster::block_on(dispatcher.submit(&FormSnapshot::new(), &structures(), None, &[])).unwrap();
        }
        assert_eq!(resolves.get(), 1);
    }

    #[test]
    fn test_submit_guard_reenables_on_drop() {
        let control = SubmitControl::new();
        {
            let _guard = control.try_acquire().unwrap();
            assert!(!control.is_enabled());
            assert!(control.try_acquire().is_none());
        }
        assert!(control.is_enabled());
    }
}
