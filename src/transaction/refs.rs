use crate::callback::Transport;
use crate::error::GitInnerError;
use crate::sha::Sha1;
use crate::transaction::upload::command::{UploadArgument, UploadRequest};
use crate::transaction::{SessionState, Transaction};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RefAdvertisement {
    pub name: String,
    pub id: Sha1,
}

impl RefAdvertisement {
    pub fn new(name: impl Into<String>, id: Sha1) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// Where `ls-refs` gets its refs from.
#[async_trait]
pub trait RefStore: Send + Sync + 'static {
    async fn refs(&self) -> Result<Vec<RefAdvertisement>, GitInnerError>;
}

/// Fixed set of refs, taken from configuration.
#[derive(Clone, Debug, Default)]
pub struct StaticRefStore {
    refs: Vec<RefAdvertisement>,
}

impl StaticRefStore {
    pub fn new(refs: Vec<RefAdvertisement>) -> Self {
        Self { refs }
    }
}

#[async_trait]
impl RefStore for StaticRefStore {
    async fn refs(&self) -> Result<Vec<RefAdvertisement>, GitInnerError> {
        Ok(self.refs.clone())
    }
}

impl<T: Transport> Transaction<T> {
    /// Answers `ls-refs`: one `<id> <name>` line per ref, then a flush.
    /// With `ref-prefix` arguments only refs matching one of them are listed.
    pub async fn ls_refs(
        &mut self,
        request: &UploadRequest,
        store: &dyn RefStore,
    ) -> Result<(), GitInnerError> {
        self.expect_state(SessionState::AwaitingCommand)?;
        self.advance(SessionState::RunningLsRefs)?;
        let prefixes: Vec<&str> = request
            .arguments
            .iter()
            .filter_map(|arg| match arg {
                UploadArgument::RefPrefix(prefix) => Some(prefix.as_str()),
                _ => None,
            })
            .collect();
        let refs = store.refs().await?;
        let mut listed = 0usize;
        for item in refs
            .iter()
            .filter(|r| prefixes.is_empty() || prefixes.iter().any(|p| r.name.starts_with(p)))
        {
            self.writer.write_line(&format!("{} {}", item.id, item.name))?;
            listed += 1;
        }
        self.writer.write_flush();
        self.writer.flush().await?;
        tracing::debug!("ls-refs listed {} of {} refs", listed, refs.len());
        self.advance(SessionState::Done)
    }
}
