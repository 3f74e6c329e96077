use crate::callback::Transport;
use crate::error::GitInnerError;
use crate::pkt_line::PktLineWriter;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

pub use crate::transaction::version::GitProtoVersion;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub enum TransactionService {
    #[serde(rename = "git-upload-pack")]
    UploadPack,
}

impl TransactionService {
    pub fn from_string(s: &str) -> Option<TransactionService> {
        match s {
            "git-upload-pack" => Some(TransactionService::UploadPack),
            _ => None,
        }
    }
    pub fn to_string(&self) -> &'static str {
        match self {
            TransactionService::UploadPack => "git-upload-pack",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAdvertisement,
    AwaitingCommand,
    RunningLsRefs,
    RunningFetch,
    Done,
}

impl SessionState {
    fn can_advance(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (AwaitingAdvertisement, Done)
                | (AwaitingCommand, RunningLsRefs)
                | (AwaitingCommand, RunningFetch)
                | (RunningLsRefs, Done)
                | (RunningFetch, Done)
        )
    }
}

/// One protocol session. Lives for a single HTTP request and owns the
/// response transport while it does.
pub struct Transaction<T> {
    pub service: TransactionService,
    pub version: GitProtoVersion,
    state: SessionState,
    writer: PktLineWriter<T>,
    deadline: Option<Instant>,
}

impl<T: Transport> Transaction<T> {
    /// Session for a discovery (`/info/refs`) request.
    pub fn advertisement(version: GitProtoVersion, transport: T) -> Self {
        Self::with_state(version, transport, SessionState::AwaitingAdvertisement)
    }

    /// Session for a command (`/git-upload-pack`) request.
    pub fn command(version: GitProtoVersion, transport: T) -> Self {
        Self::with_state(version, transport, SessionState::AwaitingCommand)
    }

    fn with_state(version: GitProtoVersion, transport: T, state: SessionState) -> Self {
        Self {
            service: TransactionService::UploadPack,
            version,
            state,
            writer: PktLineWriter::new(transport),
            deadline: None,
        }
    }

    /// Past `deadline` the fetch loop stops producing and the session fails
    /// with [`GitInnerError::Cancelled`].
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn into_transport(self) -> T {
        self.writer.into_inner()
    }

    fn expect_state(&self, state: SessionState) -> Result<(), GitInnerError> {
        if self.state != state {
            return Err(GitInnerError::InvalidState(match state {
                SessionState::AwaitingAdvertisement => "expected a fresh advertisement session",
                SessionState::AwaitingCommand => "expected a fresh command session",
                SessionState::RunningLsRefs => "ls-refs is not running",
                SessionState::RunningFetch => "fetch is not running",
                SessionState::Done => "session is not finished",
            }));
        }
        Ok(())
    }

    fn advance(&mut self, next: SessionState) -> Result<(), GitInnerError> {
        if !self.state.can_advance(next) {
            return Err(GitInnerError::InvalidState("illegal session transition"));
        }
        tracing::trace!("session {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}

pub mod advertise;
pub mod refs;
pub mod upload;
pub mod version;
