use crate::sha::Sha1;
use crate::transaction::refs::RefAdvertisement;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

const PLACEHOLDER_REF_ID: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UploadConfig {
    /// Whole-request deadline in seconds, 0 disables it
    pub request_timeout_secs: u64,
    /// Response chunks that may queue up before writes start waiting on the client
    pub channel_buffer: usize,
    pub refs: Vec<RefAdvertisement>,
    pub progress: ProgressConfig,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let placeholder = Sha1::from_str(PLACEHOLDER_REF_ID).unwrap_or_default();
        Self {
            request_timeout_secs: 300,
            channel_buffer: 16,
            refs: vec![RefAdvertisement::new("refs/heads/main", placeholder)],
            progress: ProgressConfig::default(),
        }
    }
}

impl UploadConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ProgressConfig {
    pub frames: u32,
    pub frame_delay_ms: u64,
    pub width: usize,
    pub title: String,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            frames: 100,
            frame_delay_ms: 40,
            width: 40,
            title: "Loading...".to_string(),
        }
    }
}

impl ProgressConfig {
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}
