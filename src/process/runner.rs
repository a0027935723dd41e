// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Pipeline runner
//!
//! Chains processes like a shell pipeline (`a | b | c`). Adjacent stages are
//! joined by OS pipes, every stage's standard error is collected, and the
//! final stage's standard output is returned.
//!
//! Every started stage is reaped before [`run_pipeline`] returns, even after a
//! failure. Stages left running after a start failure are killed first; after
//! a wait failure the remaining stages finish on their own once their pipe
//! peers are gone. Only the first error is reported.

use std::ffi::OsStr;
use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::spec::{describe_pipeline, ProcessSpec, StdinSource};
use crate::errors::{ScError, ScResult};

/// Outcome of a pipeline run
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// Standard output of the last stage
    pub output: Vec<u8>,

    /// Standard error of all stages, in stage order
    pub stderr: Vec<u8>,

    /// First start or wait failure, if any
    pub error: Option<ScError>,
}

/// Captured streams of a successful pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl PipelineOutput {
    /// Standard output decoded lossily as UTF-8
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Standard error decoded lossily as UTF-8
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

impl PipelineResult {
    /// Whether every stage started and exited successfully
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Standard error decoded lossily as UTF-8
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Turn the result into a `Result`, dropping captured streams on failure
    pub fn into_result(self) -> ScResult<PipelineOutput> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(PipelineOutput {
                stdout: self.output,
                stderr: self.stderr,
            }),
        }
    }
}

type Capture = JoinHandle<io::Result<Vec<u8>>>;

struct Started {
    index: usize,
    program: String,
    child: Child,
}

/// Run `stages` as a pipeline
///
/// An empty pipeline is a no-op and returns an empty, successful result. A
/// single stage is a plain invocation with its streams captured.
pub async fn run_pipeline(stages: Vec<ProcessSpec>) -> PipelineResult {
    if stages.is_empty() {
        return PipelineResult::default();
    }

    debug!("running pipeline: {}", describe_pipeline(&stages));

    let last = stages.len() - 1;
    let mut started: Vec<Started> = Vec::with_capacity(stages.len());
    let mut stderr_captures: Vec<(usize, Capture)> = Vec::with_capacity(stages.len());
    let mut stdout_capture: Option<Capture> = None;
    let mut stdin_feed: Option<JoinHandle<io::Result<()>>> = None;
    let mut upstream: Option<ChildStdout> = None;
    let mut error: Option<ScError> = None;

    for (index, mut spec) in stages.into_iter().enumerate() {
        let mut cmd = spec.to_command();
        let mut feed = None;

        let stdin = match upstream.take() {
            Some(pipe) => pipe.try_into(),
            None => stdin_for(std::mem::take(&mut spec.stdin), &mut feed),
        };
        match stdin {
            Ok(stdio) => {
                cmd.stdin(stdio);
            }
            Err(source) => {
                error = Some(start_failure(index, &spec.program, source));
                break;
            }
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                error = Some(start_failure(index, &spec.program, source));
                break;
            }
        };
        debug!("stage {} started: {}", index, spec);

        if let (Some(bytes), Some(mut pipe)) = (feed, child.stdin.take()) {
            stdin_feed = Some(tokio::spawn(async move {
                pipe.write_all(&bytes).await?;
                pipe.shutdown().await
            }));
        }

        if let Some(stream) = child.stderr.take() {
            stderr_captures.push((index, capture(stream)));
        }

        if index == last {
            stdout_capture = child.stdout.take().map(capture);
        } else {
            upstream = child.stdout.take();
        }

        started.push(Started {
            index,
            program: spec.program.to_string_lossy().into_owned(),
            child,
        });
    }

    // Release the read end of a pipe whose consumer never started.
    drop(upstream);

    if error.is_some() {
        for stage in &mut started {
            if let Err(e) = stage.child.start_kill() {
                debug!("stage {} could not be killed: {}", stage.index, e);
            }
        }
    }

    let programs: Vec<String> = started.iter().map(|s| s.program.clone()).collect();
    let program = |index: usize| programs.get(index).map_or("", String::as_str);

    for mut stage in started {
        let outcome = stage.child.wait().await;
        match outcome {
            Ok(status) if status.success() => {
                debug!("stage {} ({}) exited successfully", stage.index, stage.program);
            }
            Ok(status) => {
                debug!("stage {} ({}) {}", stage.index, stage.program, status);
                record(&mut error, || wait_failure(stage.index, &stage.program, describe(status)));
            }
            Err(e) => {
                record(&mut error, || wait_failure(stage.index, &stage.program, e.to_string()));
            }
        }
    }

    if let Some(feed) = stdin_feed {
        match joined(feed).await {
            Ok(()) => {}
            // The stage stopped reading; its exit status tells the story.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Err(e) => record(&mut error, || {
                wait_failure(0, program(0), format!("writing standard input: {}", e))
            }),
        }
    }

    let mut stderr = Vec::new();
    for (index, handle) in stderr_captures {
        match joined(handle).await {
            Ok(bytes) => stderr.extend_from_slice(&bytes),
            Err(e) => record(&mut error, || {
                wait_failure(index, program(index), format!("reading standard error: {}", e))
            }),
        }
    }

    let output = match stdout_capture {
        Some(handle) => match joined(handle).await {
            Ok(bytes) => bytes,
            Err(e) => {
                record(&mut error, || {
                    wait_failure(last, program(last), format!("reading standard output: {}", e))
                });
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    if let Some(ref e) = error {
        warn!("pipeline failed: {}", e);
    }

    PipelineResult {
        output,
        stderr,
        error,
    }
}

/// Run a single process and require it to succeed
pub async fn run_single(spec: ProcessSpec) -> ScResult<PipelineOutput> {
    run_pipeline(vec![spec]).await.into_result()
}

fn stdin_for(source: StdinSource, feed: &mut Option<Vec<u8>>) -> io::Result<Stdio> {
    match source {
        StdinSource::Null => Ok(Stdio::null()),
        StdinSource::Inherit => Ok(Stdio::inherit()),
        StdinSource::Bytes(bytes) => {
            *feed = Some(bytes);
            Ok(Stdio::piped())
        }
        StdinSource::File(path) => Ok(std::fs::File::open(path)?.into()),
    }
}

fn capture<R>(mut stream: R) -> Capture
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await?;
        Ok(buf)
    })
}

async fn joined<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle.await.map_err(io::Error::other)?
}

fn record<F>(slot: &mut Option<ScError>, make: F)
where
    F: FnOnce() -> ScError,
{
    if slot.is_none() {
        *slot = Some(make());
    }
}

fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {}", code),
        None => status.to_string(),
    }
}

fn start_failure(stage: usize, program: &OsStr, source: io::Error) -> ScError {
    ScError::StageStartFailure {
        stage,
        program: program.to_string_lossy().into_owned(),
        source,
    }
}

fn wait_failure(stage: usize, program: &str, reason: String) -> ScError {
    ScError::StageWaitFailure {
        stage,
        program: program.to_string(),
        reason,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;

    fn sh(script: &str) -> ProcessSpec {
        ProcessSpec::new("sh").arg("-c").arg(script)
    }

    async fn run(stages: Vec<ProcessSpec>) -> PipelineResult {
        timeout(Duration::from_secs(30), run_pipeline(stages))
            .await
            .expect("pipeline hung")
    }

    #[tokio::test]
    async fn test_empty_pipeline_is_noop() {
        let result = run(vec![]).await;
        assert!(result.output.is_empty());
        assert!(result.stderr.is_empty());
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_single_stage_captures_output() {
        let result = run(vec![ProcessSpec::new("printf").arg("X marks")]).await;
        assert!(result.is_success());
        assert_eq!(result.output, b"X marks");
        assert!(result.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_two_stages_are_piped() {
        let result = run(vec![
            ProcessSpec::new("printf").arg("hello\\n"),
            ProcessSpec::new("tr").args(["a-z", "A-Z"]),
        ])
        .await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.output, b"HELLO\n");
    }

    #[tokio::test]
    async fn test_three_stages() {
        let result = run(vec![
            ProcessSpec::new("printf").arg("b\\na\\nc\\n"),
            ProcessSpec::new("sort"),
            ProcessSpec::new("tr").arg("-d").arg("\\n"),
        ])
        .await;

        assert_eq!(result.output, b"abc");
    }

    #[tokio::test]
    async fn test_large_output_streams_between_stages() {
        let result = run(vec![
            ProcessSpec::new("head").args(["-c", "4000000", "/dev/zero"]),
            ProcessSpec::new("wc").arg("-c"),
        ])
        .await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(String::from_utf8_lossy(&result.output).trim(), "4000000");
    }

    #[tokio::test]
    async fn test_failing_first_stage_reports_wait_failure() {
        let result = run(vec![sh("exit 3"), ProcessSpec::new("cat")]).await;

        assert!(result.output.is_empty());
        match result.error {
            Some(ScError::StageWaitFailure { stage, ref reason, .. }) => {
                assert_eq!(stage, 0);
                assert_eq!(reason, "exit status 3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failing_last_stage_reports_its_index() {
        let result = run(vec![ProcessSpec::new("printf").arg("data"), sh("cat >/dev/null; exit 1")]).await;

        assert!(matches!(
            result.error,
            Some(ScError::StageWaitFailure { stage: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let result = run(vec![sh("exit 2"), sh("cat >/dev/null; exit 5")]).await;

        match result.error {
            Some(ScError::StageWaitFailure { stage, reason, .. }) => {
                assert_eq!(stage, 0);
                assert_eq!(reason, "exit status 2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stage_that_cannot_start() {
        let result = run(vec![
            ProcessSpec::new("yes"),
            ProcessSpec::new("/nonexistent/sc-test-program"),
            ProcessSpec::new("cat"),
        ])
        .await;

        match result.error {
            Some(ScError::StageStartFailure { stage, ref program, .. }) => {
                assert_eq!(stage, 1);
                assert_eq!(program, "/nonexistent/sc-test-program");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(result.output.is_empty());
    }

    #[tokio::test]
    async fn test_later_stages_are_waited_after_a_failure() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("reaped");

        let result = run(vec![
            sh("exit 2"),
            sh(&format!(
                "exec >/dev/null 2>&1; cat; sleep 0.3; touch '{}'",
                marker.display()
            )),
        ])
        .await;

        assert!(matches!(
            result.error,
            Some(ScError::StageWaitFailure { stage: 0, .. })
        ));
        assert!(marker.exists(), "stage 1 was not waited for");
    }

    #[tokio::test]
    async fn test_started_stages_are_killed_after_a_start_failure() {
        let started = std::time::Instant::now();
        let result = run(vec![
            ProcessSpec::new("sleep").arg("30"),
            ProcessSpec::new("/nonexistent/sc-test-program"),
        ])
        .await;

        assert!(matches!(
            result.error,
            Some(ScError::StageStartFailure { stage: 1, .. })
        ));
        assert!(
            started.elapsed() < Duration::from_secs(10),
            "running stage was not killed: {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_stderr_is_collected() {
        let result = run(vec![sh("echo oops >&2; printf out"), ProcessSpec::new("cat")]).await;

        assert!(result.is_success());
        assert_eq!(result.output, b"out");
        assert_eq!(result.stderr_lossy(), "oops\n");
    }

    #[tokio::test]
    async fn test_stderr_is_concatenated_in_stage_order() {
        let result = run(vec![
            sh("cat >/dev/null; echo first >&2"),
            sh("echo second >&2; cat"),
        ])
        .await;

        assert!(result.is_success());
        assert_eq!(result.stderr_lossy(), "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_stdin_bytes_feed_first_stage() {
        let result = run(vec![
            ProcessSpec::new("cat").stdin(StdinSource::Bytes(b"kind: Namespace\n".to_vec())),
            ProcessSpec::new("tr").args(["a-z", "A-Z"]),
        ])
        .await;

        assert_eq!(result.output, b"KIND: NAMESPACE\n");
    }

    #[tokio::test]
    async fn test_stdin_on_later_stage_is_ignored() {
        let result = run(vec![
            ProcessSpec::new("printf").arg("upstream"),
            ProcessSpec::new("cat").stdin(StdinSource::Bytes(b"ignored".to_vec())),
        ])
        .await;

        assert_eq!(result.output, b"upstream");
    }

    #[tokio::test]
    async fn test_stdin_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("csr.json");
        std::fs::write(&path, "{\"CN\":\"ca\"}").unwrap();

        let result = run(vec![ProcessSpec::new("cat").stdin(StdinSource::File(path))]).await;
        assert_eq!(result.output, b"{\"CN\":\"ca\"}");
    }

    #[tokio::test]
    async fn test_missing_stdin_file_is_start_failure() {
        let result = run(vec![ProcessSpec::new("cat")
            .stdin(StdinSource::File("/nonexistent/sc-input".into()))])
        .await;

        assert!(matches!(
            result.error,
            Some(ScError::StageStartFailure { stage: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_current_dir_is_applied() {
        let temp = TempDir::new().unwrap();
        let result = run(vec![sh("printf marker > out.txt").current_dir(temp.path())]).await;

        assert!(result.is_success());
        assert_eq!(std::fs::read_to_string(temp.path().join("out.txt")).unwrap(), "marker");
    }

    #[tokio::test]
    async fn test_concurrent_pipelines_do_not_share_buffers() {
        let (a, b) = tokio::join!(
            run(vec![sh("echo a-err >&2; printf a"), ProcessSpec::new("cat")]),
            run(vec![sh("echo b-err >&2; printf b"), ProcessSpec::new("cat")]),
        );

        assert_eq!(a.output, b"a");
        assert_eq!(a.stderr_lossy(), "a-err\n");
        assert_eq!(b.output, b"b");
        assert_eq!(b.stderr_lossy(), "b-err\n");
    }

    #[tokio::test]
    async fn test_run_single_into_result() {
        let output = run_single(ProcessSpec::new("printf").arg("ok")).await.unwrap();
        assert_eq!(output.stdout_lossy(), "ok");

        let err = run_single(sh("exit 1")).await.unwrap_err();
        assert!(matches!(err, ScError::StageWaitFailure { .. }));
    }
}
