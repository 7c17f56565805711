//! Orchestrator tests against in-memory collaborators.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use reel_media::{MediaDownloader, MediaError, MediaResult, SourceResolver, Transcoder};
use reel_models::{Clip, DiscoveryWindow, StagedMedia};
use reel_publish::{
    PublishCoordinator, PublishPolicy, PublishTarget, Sleeper, TargetError, TargetResult,
};
use reel_storage::{StagingStore, StorageError, StorageResult};
use reel_twitch::{ClipSource, DiscoveryError, DiscoveryResult};

use crate::config::{CleanupTiming, RunConfig, TargetKind};
use crate::error::RunError;
use crate::orchestrator::{Collaborators, Orchestrator};
use crate::report::ClipOutcome;

type Events = Arc<Mutex<Vec<String>>>;

fn push(events: &Events, event: impl Into<String>) {
    events.lock().unwrap().push(event.into());
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

#[derive(Default)]
struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

struct FakeSource {
    clips: Vec<Clip>,
    fail: bool,
    requests: Mutex<Vec<(String, DiscoveryWindow, u32)>>,
}

#[async_trait]
impl ClipSource for FakeSource {
    async fn discover(
        &self,
        game_name: &str,
        window: DiscoveryWindow,
        max_count: u32,
    ) -> DiscoveryResult<Vec<Clip>> {
        self.requests
            .lock()
            .unwrap()
            .push((game_name.to_string(), window, max_count));
        if self.fail {
            return Err(DiscoveryError::upstream(503, "unavailable"));
        }
        Ok(self.clips.iter().take(max_count as usize).cloned().collect())
    }
}

/// Resolves `https://clips/<id>` to `https://media/<id>.mp4`.
struct FakeResolver {
    events: Events,
    failing: HashSet<String>,
    empty: HashSet<String>,
}

#[async_trait]
impl SourceResolver for FakeResolver {
    async fn resolve(&self, page_url: &str) -> MediaResult<String> {
        push(&self.events, format!("resolve {}", page_url));
        if self.failing.contains(page_url) {
            return Err(MediaError::resolve_failed("yt-dlp exited with status 1"));
        }
        if self.empty.contains(page_url) {
            return Ok("  \n".to_string());
        }
        Ok(page_url.replace("https://clips/", "https://media/") + ".mp4")
    }
}

struct FakeDownloader {
    events: Events,
}

#[async_trait]
impl MediaDownloader for FakeDownloader {
    async fn download(&self, media_url: &str, dest: &Path) -> MediaResult<u64> {
        push(&self.events, format!("download {}", media_url));
        tokio::fs::create_dir_all(dest.parent().unwrap()).await?;
        tokio::fs::write(dest, b"original").await?;
        Ok(8)
    }
}

/// Writes the edited file; for `crash_on` inputs it leaves partial output
/// behind and fails.
struct FakeTranscoder {
    events: Events,
    crash_on: HashSet<String>,
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let name = input.file_name().unwrap().to_string_lossy().to_string();
        push(&self.events, format!("transcode {}", name));
        tokio::fs::create_dir_all(output.parent().unwrap()).await?;
        tokio::fs::write(output, b"edited").await?;
        if self.crash_on.contains(&name) {
            return Err(MediaError::ffmpeg_failed("encoder crashed", None, Some(139)));
        }
        Ok(())
    }
}

struct FakeStaging {
    events: Events,
    fail_upload: bool,
    objects: Mutex<HashSet<String>>,
}

#[async_trait]
impl StagingStore for FakeStaging {
    fn prefix(&self) -> &str {
        "clips"
    }

    async fn stage(&self, local: &Path, key: &str) -> StorageResult<StagedMedia> {
        push(&self.events, format!("stage {}", key));
        if self.fail_upload {
            return Err(StorageError::upload_failed("bucket unavailable"));
        }
        if !local.exists() {
            return Err(StorageError::FileNotFound(local.display().to_string()));
        }
        self.objects.lock().unwrap().insert(key.to_string());
        Ok(StagedMedia {
            key: key.to_string(),
            url: format!("https://staging/{}", key),
        })
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        push(&self.events, format!("remove {}", key));
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Reply {
    Ok,
    NotReady,
    Denied,
}

/// Publish target answering from a script per container; an exhausted
/// script answers "not ready".
struct ScriptedTarget {
    name: &'static str,
    events: Events,
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    default_script: Vec<Reply>,
    urls: Mutex<Vec<String>>,
    attempts: Mutex<u32>,
}

impl ScriptedTarget {
    fn new(name: &'static str, events: &Events, default_script: Vec<Reply>) -> Self {
        Self {
            name,
            events: Arc::clone(events),
            scripts: Mutex::new(HashMap::new()),
            default_script,
            urls: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
        }
    }

    fn attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl PublishTarget for ScriptedTarget {
    fn name(&self) -> &str {
        self.name
    }

    async fn create_container(&self, media_url: &str) -> TargetResult<String> {
        push(&self.events, format!("{} create {}", self.name, media_url));
        self.urls.lock().unwrap().push(media_url.to_string());
        let container = format!("{}-container-{}", self.name, self.urls.lock().unwrap().len());
        self.scripts
            .lock()
            .unwrap()
            .insert(container.clone(), self.default_script.clone().into());
        Ok(container)
    }

    async fn publish_container(&self, container_id: &str) -> TargetResult<Option<String>> {
        push(&self.events, format!("{} publish {}", self.name, container_id));
        *self.attempts.lock().unwrap() += 1;
        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(container_id)
            .and_then(|script| script.pop_front())
            .unwrap_or(Reply::NotReady);
        match reply {
            Reply::Ok => Ok(Some(format!("{}-media", container_id))),
            Reply::NotReady => Err(TargetError::http(400, Some(9007), "Media ID is not available")),
            Reply::Denied => Err(TargetError::http(403, Some(10), "Permission denied")),
        }
    }

    fn is_not_ready(&self, error: &TargetError) -> bool {
        error.status() == Some(400)
    }
}

fn clip(id: &str) -> Clip {
    Clip::new(id, format!("https://clips/{}", id), DiscoveryWindow::last_24h(now()), now())
}

struct Harness {
    _dir: TempDir,
    config: RunConfig,
    events: Events,
    source: Arc<FakeSource>,
    resolver: Arc<FakeResolver>,
    transcoder: Arc<FakeTranscoder>,
    staging: Arc<FakeStaging>,
    targets: Vec<Arc<ScriptedTarget>>,
    sleeper: Arc<RecordingSleeper>,
}

impl Harness {
    fn new(clip_ids: &[&str], scripts: Vec<(&'static str, Vec<Reply>)>) -> Self {
        let dir = TempDir::new().unwrap();
        let events: Events = Arc::default();

        let mut config = RunConfig::from_lookup(|_| None, Some("Valorant".into())).unwrap();
        config.root_path = dir.path().to_path_buf();
        config.clips_count = clip_ids.len().max(1) as u32;
        config.targets = vec![TargetKind::Instagram, TargetKind::Facebook];

        Self {
            _dir: dir,
            config,
            source: Arc::new(FakeSource {
                clips: clip_ids.iter().map(|id| clip(id)).collect(),
                fail: false,
                requests: Mutex::new(Vec::new()),
            }),
            resolver: Arc::new(FakeResolver {
                events: Arc::clone(&events),
                failing: HashSet::new(),
                empty: HashSet::new(),
            }),
            transcoder: Arc::new(FakeTranscoder {
                events: Arc::clone(&events),
                crash_on: HashSet::new(),
            }),
            staging: Arc::new(FakeStaging {
                events: Arc::clone(&events),
                fail_upload: false,
                objects: Mutex::new(HashSet::new()),
            }),
            targets: scripts
                .into_iter()
                .map(|(name, script)| Arc::new(ScriptedTarget::new(name, &events, script)))
                .collect(),
            sleeper: Arc::new(RecordingSleeper::default()),
            events,
        }
    }

    fn orchestrator(&self) -> Orchestrator {
        let collaborators = Collaborators {
            source: self.source.clone(),
            resolver: self.resolver.clone(),
            downloader: Arc::new(FakeDownloader {
                events: Arc::clone(&self.events),
            }),
            transcoder: self.transcoder.clone(),
            staging: self.staging.clone(),
            targets: self
                .targets
                .iter()
                .map(|t| t.clone() as Arc<dyn PublishTarget>)
                .collect(),
        };
        let coordinator =
            PublishCoordinator::new(PublishPolicy::default(), self.sleeper.clone()).unwrap();
        Orchestrator::new(self.config.clone(), collaborators, coordinator).unwrap()
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(prefix)).count()
    }

    fn edited(&self, index: usize) -> std::path::PathBuf {
        self.config
            .root_path
            .join("Valorant")
            .join("Edited")
            .join(format!("Valorant-{}.mp4", index))
    }

    fn original(&self, index: usize) -> std::path::PathBuf {
        self.config
            .root_path
            .join("Valorant")
            .join("Originals")
            .join(format!("Valorant-{}.mp4", index))
    }
}

fn both_confirm_first_try() -> Vec<(&'static str, Vec<Reply>)> {
    vec![("instagram", vec![Reply::Ok]), ("facebook", vec![Reply::Ok])]
}

#[tokio::test]
async fn test_zero_clips_is_success() {
    let harness = Harness::new(&[], both_confirm_first_try());

    let report = harness.orchestrator().run(now()).await.unwrap();

    assert!(report.clips.is_empty());
    assert_eq!(report.published_count(), 0);
    assert!(harness.events().is_empty());
    assert!(harness.sleeper.sleeps.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_discovery_uses_previous_24_hours() {
    let harness = Harness::new(&["a"], both_confirm_first_try());

    harness.orchestrator().run(now()).await.unwrap();

    let requests = harness.source.requests.lock().unwrap();
    let (game, window, count) = &requests[0];
    assert_eq!(game, "Valorant");
    assert_eq!(*count, 1);
    assert_eq!(window.ended_at(), "2024-05-01T12:00:00Z");
    assert_eq!(window.started_at(), "2024-04-30T12:00:00Z");
}

#[tokio::test]
async fn test_discovery_failure_aborts() {
    let mut harness = Harness::new(&["a"], both_confirm_first_try());
    harness.source = Arc::new(FakeSource {
        clips: vec![],
        fail: true,
        requests: Mutex::new(Vec::new()),
    });

    let aborted = harness.orchestrator().run(now()).await.unwrap_err();

    assert!(matches!(aborted.error, RunError::Discovery(_)));
    assert!(aborted.report.clips.is_empty());
}

#[tokio::test]
async fn test_single_clip_published_and_cleaned_once() {
    let harness = Harness::new(&["a"], both_confirm_first_try());

    let report = harness.orchestrator().run(now()).await.unwrap();

    match report.outcome(0) {
        Some(ClipOutcome::Published { receipts }) => {
            assert_eq!(receipts.len(), 2);
            assert_eq!(receipts[0].target, "instagram");
            assert_eq!(receipts[0].waited, Duration::from_secs(60));
            assert_eq!(receipts[1].target, "facebook");
        }
        other => panic!("expected published, got {other:?}"),
    }

    // Both targets ingest the same staged URL
    let url = "https://staging/clips/Valorant/Valorant-0.mp4";
    assert_eq!(*harness.targets[0].urls.lock().unwrap(), vec![url.to_string()]);
    assert_eq!(*harness.targets[1].urls.lock().unwrap(), vec![url.to_string()]);

    assert_eq!(harness.count("remove "), 1);
    assert!(harness.staging.objects.lock().unwrap().is_empty());
    assert!(!harness.original(0).exists());
    assert!(!harness.edited(0).exists());
}

#[tokio::test]
async fn test_resolver_failure_skips_only_that_clip() {
    let mut harness = Harness::new(&["a", "b", "c"], both_confirm_first_try());
    harness.resolver = Arc::new(FakeResolver {
        events: Arc::clone(&harness.events),
        failing: HashSet::from(["https://clips/b".to_string()]),
        empty: HashSet::new(),
    });

    let report = harness.orchestrator().run(now()).await.unwrap();

    assert_eq!(report.clips.len(), 3);
    assert_eq!(report.published_count(), 2);
    assert!(matches!(report.outcome(0), Some(ClipOutcome::Published { .. })));
    match report.outcome(1) {
        Some(ClipOutcome::Skipped { reason }) => {
            assert_eq!(reason, "Resolve failed: yt-dlp exited with status 1")
        }
        other => panic!("expected skipped, got {other:?}"),
    }
    assert!(matches!(report.outcome(2), Some(ClipOutcome::Published { .. })));

    // Clip c kept its own index
    assert_eq!(harness.count("stage clips/Valorant/Valorant-2.mp4"), 1);
    assert_eq!(harness.count("stage clips/Valorant/Valorant-1.mp4"), 0);
}

#[tokio::test]
async fn test_blank_resolved_url_is_a_skip() {
    let mut harness = Harness::new(&["a"], both_confirm_first_try());
    harness.resolver = Arc::new(FakeResolver {
        events: Arc::clone(&harness.events),
        failing: HashSet::new(),
        empty: HashSet::from(["https://clips/a".to_string()]),
    });

    let report = harness.orchestrator().run(now()).await.unwrap();

    assert!(matches!(report.outcome(0), Some(ClipOutcome::Skipped { .. })));
    assert_eq!(harness.count("download"), 0);
    assert_eq!(harness.count("instagram"), 0);
}

#[tokio::test]
async fn test_transcode_crash_removes_partial_output() {
    let mut harness = Harness::new(&["a", "b"], both_confirm_first_try());
    harness.transcoder = Arc::new(FakeTranscoder {
        events: Arc::clone(&harness.events),
        crash_on: HashSet::from(["Valorant-0.mp4".to_string()]),
    });

    let report = harness.orchestrator().run(now()).await.unwrap();

    match report.outcome(0) {
        Some(ClipOutcome::Skipped { reason }) => {
            assert!(reason.starts_with("Transcode failed: FFmpeg command failed"));
            assert_eq!(reason.matches("failed:").count(), 2);
        }
        other => panic!("expected skipped, got {other:?}"),
    }
    assert!(!harness.edited(0).exists());
    // The original of a skipped clip is left in place
    assert!(harness.original(0).exists());
    assert!(matches!(report.outcome(1), Some(ClipOutcome::Published { .. })));
}

#[tokio::test]
async fn test_all_preparation_precedes_publishing() {
    let harness = Harness::new(&["a", "b"], both_confirm_first_try());

    harness.orchestrator().run(now()).await.unwrap();

    let events = harness.events();
    let last_transcode = events.iter().rposition(|e| e.starts_with("transcode")).unwrap();
    let first_stage = events.iter().position(|e| e.starts_with("stage")).unwrap();
    assert!(last_transcode < first_stage);

    // Targets are dispatched in configured order
    let first_ig = events.iter().position(|e| e.starts_with("instagram")).unwrap();
    let first_fb = events.iter().position(|e| e.starts_with("facebook")).unwrap();
    assert!(first_ig < first_fb);
}

#[tokio::test]
async fn test_not_ready_then_confirmed() {
    let harness = Harness::new(
        &["a"],
        vec![
            (
                "instagram",
                vec![Reply::NotReady, Reply::NotReady, Reply::NotReady, Reply::Ok],
            ),
            ("facebook", vec![Reply::Ok]),
        ],
    );

    let report = harness.orchestrator().run(now()).await.unwrap();

    match report.outcome(0) {
        Some(ClipOutcome::Published { receipts }) => {
            assert_eq!(receipts[0].waited, Duration::from_secs(240));
            assert_eq!(receipts[0].attempts, 4);
        }
        other => panic!("expected published, got {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_aborts_without_cleanup() {
    let harness = Harness::new(
        &["a", "b"],
        vec![("instagram", vec![]), ("facebook", vec![Reply::Ok])],
    );

    let aborted = harness.orchestrator().run(now()).await.unwrap_err();

    assert!(matches!(aborted.error, RunError::PublishTimeout(_)));
    assert!(matches!(
        aborted.report.outcome(0),
        Some(ClipOutcome::PublishFailed { .. })
    ));
    assert_eq!(aborted.report.outcome(1), Some(&ClipOutcome::NotPublished));

    // Facebook never reached; nothing cleaned up
    assert_eq!(harness.targets[1].attempts(), 0);
    assert_eq!(harness.count("remove"), 0);
    assert!(harness.edited(0).exists());
    assert_eq!(harness.sleeper.sleeps.lock().unwrap().len(), 10);
}

#[tokio::test]
async fn test_rejection_aborts_after_first_attempt() {
    let harness = Harness::new(
        &["a", "b"],
        vec![("instagram", vec![Reply::Denied, Reply::Ok]), ("facebook", vec![Reply::Ok])],
    );

    let aborted = harness.orchestrator().run(now()).await.unwrap_err();

    assert!(matches!(aborted.error, RunError::PublishRejected(_)));
    assert_eq!(harness.targets[0].attempts(), 1);
    assert_eq!(harness.count("stage clips/Valorant/Valorant-1.mp4"), 0);
    assert_eq!(aborted.report.outcome(1), Some(&ClipOutcome::NotPublished));
    assert_eq!(harness.count("remove"), 0);
}

#[tokio::test]
async fn test_later_rejection_keeps_earlier_receipts() {
    let harness = Harness::new(
        &["a"],
        vec![("instagram", vec![Reply::Ok]), ("facebook", vec![Reply::Denied])],
    );

    let aborted = harness.orchestrator().run(now()).await.unwrap_err();

    match aborted.report.outcome(0) {
        Some(ClipOutcome::PublishFailed { receipts, .. }) => {
            assert_eq!(receipts.len(), 1);
            assert_eq!(receipts[0].target, "instagram");
        }
        other => panic!("expected publish failure, got {other:?}"),
    }
    // Default timing waits for every target before touching anything
    assert_eq!(harness.count("remove"), 0);
    assert!(harness.edited(0).exists());
}

#[tokio::test]
async fn test_after_first_confirmed_splits_cleanup() {
    let mut harness = Harness::new(
        &["a"],
        vec![("instagram", vec![Reply::Ok]), ("facebook", vec![Reply::Denied])],
    );
    harness.config.cleanup_timing = CleanupTiming::AfterFirstConfirmed;

    let aborted = harness.orchestrator().run(now()).await.unwrap_err();

    assert!(matches!(aborted.error, RunError::PublishRejected(_)));
    // Local files went after instagram confirmed; the staged object stays
    assert!(!harness.original(0).exists());
    assert!(!harness.edited(0).exists());
    assert_eq!(harness.count("remove"), 0);
}

#[tokio::test]
async fn test_after_first_confirmed_removes_staged_after_last_target() {
    let mut harness = Harness::new(&["a"], both_confirm_first_try());
    harness.config.cleanup_timing = CleanupTiming::AfterFirstConfirmed;

    harness.orchestrator().run(now()).await.unwrap();

    let events = harness.events();
    let remove = events.iter().position(|e| e.starts_with("remove")).unwrap();
    let last_fb = events.iter().rposition(|e| e.starts_with("facebook")).unwrap();
    assert!(last_fb < remove);
    assert!(harness.staging.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_staging_failure_aborts() {
    let mut harness = Harness::new(&["a"], both_confirm_first_try());
    harness.staging = Arc::new(FakeStaging {
        events: Arc::clone(&harness.events),
        fail_upload: true,
        objects: Mutex::new(HashSet::new()),
    });

    let aborted = harness.orchestrator().run(now()).await.unwrap_err();

    assert!(matches!(aborted.error, RunError::Upload(_)));
    assert_eq!(harness.count("instagram"), 0);
}

#[tokio::test]
async fn test_requires_a_target() {
    let harness = Harness::new(&["a"], vec![]);
    let collaborators = Collaborators {
        source: harness.source.clone(),
        resolver: harness.resolver.clone(),
        downloader: Arc::new(FakeDownloader {
            events: Arc::clone(&harness.events),
        }),
        transcoder: harness.transcoder.clone(),
        staging: harness.staging.clone(),
        targets: vec![],
    };
    let coordinator = PublishCoordinator::new(PublishPolicy::default(), harness.sleeper.clone()).unwrap();

    let result = Orchestrator::new(harness.config.clone(), collaborators, coordinator);

    assert!(matches!(result, Err(RunError::Config(_))));
}
