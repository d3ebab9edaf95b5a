// tests/support/mocks/platform.rs
use async_trait::async_trait;
use draft_relay::{
    application::ports::platform::{
        AccessToken, CredentialIssuer, DraftSubmission, IssuedCredential, MediaId,
        PlatformError, PlatformPublisher, PlatformUrl,
    },
    domain::{article::DraftId, media::StagedImage},
};
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// Credential endpoint that hands out `token-1`, `token-2`, ... and can be
/// scripted to fail.
pub struct ScriptedIssuer {
    calls: AtomicUsize,
    failures: Mutex<VecDeque<PlatformError>>,
    expires_in: Duration,
    delay: Duration,
}

impl Default for ScriptedIssuer {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures: Mutex::new(VecDeque::new()),
            expires_in: Duration::from_secs(7200),
            delay: Duration::ZERO,
        }
    }
}

impl ScriptedIssuer {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn fail_next(&self, err: PlatformError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialIssuer for ScriptedIssuer {
    async fn issue(&self) -> Result<IssuedCredential, PlatformError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(IssuedCredential {
            token: AccessToken::new(format!("token-{n}")),
            expires_in: self.expires_in,
        })
    }
}

/// Records every platform call and answers like the real endpoints.
#[derive(Default)]
pub struct FakePlatform {
    inline_uploads: AtomicUsize,
    cover_uploads: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    upload_delay: Mutex<Duration>,
    inline_failures: Mutex<HashMap<String, PlatformError>>,
    cover_failures: Mutex<VecDeque<PlatformError>>,
    draft_failures: Mutex<VecDeque<PlatformError>>,
    drafts: Mutex<Vec<(String, DraftSubmission)>>,
}

impl FakePlatform {
    pub fn set_upload_delay(&self, delay: Duration) {
        *self.upload_delay.lock().unwrap() = delay;
    }

    /// The next inline upload of `image` fails with `err`.
    pub fn fail_inline_once(&self, image: &str, err: PlatformError) {
        self.inline_failures
            .lock()
            .unwrap()
            .insert(image.to_string(), err);
    }

    pub fn fail_next_cover(&self, err: PlatformError) {
        self.cover_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_draft(&self, err: PlatformError) {
        self.draft_failures.lock().unwrap().push_back(err);
    }

    pub fn inline_uploads(&self) -> usize {
        self.inline_uploads.load(Ordering::SeqCst)
    }

    pub fn cover_uploads(&self) -> usize {
        self.cover_uploads.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Submitted drafts with the token each was sent with.
    pub fn drafts(&self) -> Vec<(String, DraftSubmission)> {
        self.drafts.lock().unwrap().clone()
    }

    pub fn url_for(image: &str) -> String {
        format!("https://mmbiz.qpic.cn/mmbiz_png/{image}/0")
    }

    async fn simulate_upload(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = *self.upload_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlatformPublisher for FakePlatform {
    async fn upload_inline_image(
        &self,
        _token: &AccessToken,
        image: &StagedImage,
    ) -> Result<PlatformUrl, PlatformError> {
        self.inline_uploads.fetch_add(1, Ordering::SeqCst);
        self.simulate_upload().await;
        let name = image.reference.as_str();
        if let Some(err) = self.inline_failures.lock().unwrap().remove(name) {
            return Err(err);
        }
        Ok(PlatformUrl::new(Self::url_for(name)))
    }

    async fn upload_cover_image(
        &self,
        _token: &AccessToken,
        image: &StagedImage,
    ) -> Result<MediaId, PlatformError> {
        self.cover_uploads.fetch_add(1, Ordering::SeqCst);
        self.simulate_upload().await;
        if let Some(err) = self.cover_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(MediaId::new(format!("cover-{}", image.reference)))
    }

    async fn create_draft(
        &self,
        token: &AccessToken,
        draft: &DraftSubmission,
    ) -> Result<DraftId, PlatformError> {
        if let Some(err) = self.draft_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let mut drafts = self.drafts.lock().unwrap();
        drafts.push((token.expose().to_string(), draft.clone()));
        Ok(DraftId::new(format!("draft-{}", drafts.len())).expect("draft id"))
    }
}
