use crate::callback::Transport;
use crate::capability::enums::GitCapability;
use crate::error::GitInnerError;
use crate::transaction::{SessionState, Transaction};

impl<T: Transport> Transaction<T> {
    /// Writes the v2 capability advertisement and finishes the session.
    pub async fn write_advertise_v2(&mut self) -> Result<(), GitInnerError> {
        self.expect_state(SessionState::AwaitingAdvertisement)?;
        self.writer.write_line("version 2")?;
        for capability in GitCapability::upload_v2() {
            self.writer.write_line(&capability.to_string())?;
        }
        self.writer.write_flush();
        self.writer.flush().await?;
        self.advance(SessionState::Done)
    }
}
