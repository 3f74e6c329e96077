use crate::callback::Transport;
use crate::callback::sidebend::{MAX_SIDEBAND_PAYLOAD, Muxer, SideBend, SidebandTty};
use crate::error::GitInnerError;
use crate::progress::PayloadProducer;
use crate::transaction::refs::RefStore;
use crate::transaction::upload::command::{UploadArgument, UploadCommand, UploadRequest};
use crate::transaction::{SessionState, Transaction};
use tokio::time::Instant;
use tracing::{debug, warn};

impl<T: Transport> Transaction<T> {
    /// Runs a parsed v2 command request to completion.
    pub async fn upload_pack_v2(
        &mut self,
        request: &UploadRequest,
        refs: &dyn RefStore,
        producer: &mut dyn PayloadProducer,
    ) -> Result<(), GitInnerError> {
        debug!(
            "upload-pack v2 {:?} from agent {:?}",
            request.command,
            request.agent()
        );
        match &request.command {
            UploadCommand::LsRefs => self.ls_refs(request, refs).await,
            UploadCommand::Fetch => self.fetch(request, producer).await,
            UploadCommand::Unknown(name) => Err(GitInnerError::UnknownCommand(name.clone())),
        }
    }

    /// Answers `fetch`: `packfile`, the multiplexed producer output, the
    /// flush closing the side-band section, then `done` and a final flush.
    ///
    /// A failure after `packfile` went out leaves the stream without `done`,
    /// which is how the client notices the truncation.
    pub async fn fetch(
        &mut self,
        request: &UploadRequest,
        producer: &mut dyn PayloadProducer,
    ) -> Result<(), GitInnerError> {
        self.expect_state(SessionState::AwaitingCommand)?;
        self.advance(SessionState::RunningFetch)?;
        let no_progress = request.has_argument(&UploadArgument::NoProgress);
        debug!(
            "fetch: {} wants, {} haves, done={} thin-pack={} ofs-delta={} include-tag={} no-progress={}",
            request.wants().count(),
            request.haves().count(),
            request.has_argument(&UploadArgument::Done),
            request.has_argument(&UploadArgument::ThinPack),
            request.has_argument(&UploadArgument::OfsDelta),
            request.has_argument(&UploadArgument::IncludeTag),
            no_progress,
        );

        self.writer.write_line("packfile")?;
        self.writer.flush().await?;

        let deadline = self.deadline;
        let mut mux = Muxer::new(&mut self.writer);
        let mut packets = 0usize;
        loop {
            if mux.is_closed() {
                return Err(GitInnerError::ChannelClosed);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(GitInnerError::Cancelled);
            }
            let next = match deadline {
                Some(d) => tokio::time::timeout_at(d, producer.next())
                    .await
                    .map_err(|_| GitInnerError::Cancelled)?,
                None => producer.next().await,
            };
            let (channel, data) = match next {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(err) => {
                    let message = format!("fatal: {}\n", err);
                    if let Err(report) = mux
                        .write_channel(SideBend::SidebandRemoteError, message.as_bytes())
                        .await
                    {
                        warn!("could not report producer failure: {}", report);
                    }
                    return Err(err);
                }
            };
            match channel {
                SideBend::SidebandProgress if no_progress => continue,
                SideBend::SidebandProgress => {
                    SidebandTty::new(&mut mux).write(&data).await?;
                }
                _ => {
                    for chunk in data.chunks(MAX_SIDEBAND_PAYLOAD) {
                        mux.write_channel(channel, chunk).await?;
                    }
                }
            }
            packets += 1;
        }
        mux.finish().await?;

        self.writer.write_line("done")?;
        self.writer.write_flush();
        self.writer.flush().await?;
        debug!("fetch finished after {} producer chunks", packets);
        self.advance(SessionState::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkt_line::{Packet, PktLineReader};
    use crate::progress::ScriptedProducer;
    use crate::transaction::GitProtoVersion;
    use crate::transaction::refs::StaticRefStore;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::time::Duration;

    fn decode(chunks: Vec<Bytes>) -> Vec<Packet> {
        let mut reader = PktLineReader::new(Bytes::from(chunks.concat()));
        let mut out = vec![];
        while let Some(pkt) = reader.read().unwrap() {
            out.push(pkt);
        }
        out
    }

    fn fetch_request(arguments: Vec<UploadArgument>) -> UploadRequest {
        UploadRequest {
            command: UploadCommand::Fetch,
            capabilities: vec![],
            arguments,
        }
    }

    fn data(bytes: &'static [u8]) -> Packet {
        Packet::Data(Bytes::from_static(bytes))
    }

    struct FailingProducer;

    #[async_trait]
    impl PayloadProducer for FailingProducer {
        async fn next(&mut self) -> Result<Option<(SideBend, Bytes)>, GitInnerError> {
            Err(GitInnerError::Producer("renderer crashed".to_string()))
        }
    }

    struct StalledProducer;

    #[async_trait]
    impl PayloadProducer for StalledProducer {
        async fn next(&mut self) -> Result<Option<(SideBend, Bytes)>, GitInnerError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_fetch_stream_layout() {
        let mut txn = Transaction::command(GitProtoVersion::V2, Vec::<Bytes>::new());
        let mut producer = ScriptedProducer::new(vec![
            (SideBend::SidebandProgress, Bytes::from_static(b"50%\r")),
            (SideBend::SidebandPrimary, Bytes::from_static(b"PACK")),
            (SideBend::SidebandProgress, Bytes::from_static(b"100%\n")),
        ]);
        txn.fetch(&fetch_request(vec![]), &mut producer).await.unwrap();
        assert_eq!(txn.state(), SessionState::Done);
        assert_eq!(
            decode(txn.into_transport()),
            vec![
                data(b"packfile\n"),
                data(b"\x0250%\r"),
                data(b"\x01PACK"),
                data(b"\x02100%\n"),
                Packet::Flush,
                data(b"done\n"),
                Packet::Flush,
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_flushes_each_packet() {
        let mut txn = Transaction::command(GitProtoVersion::V2, Vec::<Bytes>::new());
        let mut producer = ScriptedProducer::new(vec![
            (SideBend::SidebandProgress, Bytes::from_static(b"a")),
            (SideBend::SidebandProgress, Bytes::from_static(b"b")),
        ]);
        txn.fetch(&fetch_request(vec![]), &mut producer).await.unwrap();
        // packfile, two progress packets, closing flush, done + flush
        assert_eq!(txn.into_transport().len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_chunks_large_primary_data() {
        let mut txn = Transaction::command(GitProtoVersion::V2, Vec::<Bytes>::new());
        let big = Bytes::from(vec![9u8; MAX_SIDEBAND_PAYLOAD * 2 + 1]);
        let mut producer = ScriptedProducer::new(vec![(SideBend::SidebandPrimary, big)]);
        txn.fetch(&fetch_request(vec![]), &mut producer).await.unwrap();
        let packets = decode(txn.into_transport());
        let sizes: Vec<usize> = packets[1..4]
            .iter()
            .map(|p| p.data().unwrap().len())
            .collect();
        assert_eq!(sizes, vec![65516, 65516, 2]);
        assert!(packets[1..4].iter().all(|p| p.data().unwrap()[0] == 1));
    }

    #[tokio::test]
    async fn test_no_progress_drops_progress_channel() {
        let mut txn = Transaction::command(GitProtoVersion::V2, Vec::<Bytes>::new());
        let mut producer = ScriptedProducer::new(vec![
            (SideBend::SidebandProgress, Bytes::from_static(b"hidden")),
            (SideBend::SidebandPrimary, Bytes::from_static(b"PACK")),
        ]);
        let request = fetch_request(vec![UploadArgument::NoProgress]);
        txn.fetch(&request, &mut producer).await.unwrap();
        assert_eq!(
            decode(txn.into_transport()),
            vec![
                data(b"packfile\n"),
                data(b"\x01PACK"),
                Packet::Flush,
                data(b"done\n"),
                Packet::Flush,
            ]
        );
    }

    #[tokio::test]
    async fn test_producer_failure_reported_on_error_channel() {
        let mut txn = Transaction::command(GitProtoVersion::V2, Vec::<Bytes>::new());
        let err = txn
            .fetch(&fetch_request(vec![]), &mut FailingProducer)
            .await
            .unwrap_err();
        assert!(matches!(err, GitInnerError::Producer(_)));
        assert_eq!(txn.state(), SessionState::RunningFetch);
        let packets = decode(txn.into_transport());
        assert_eq!(packets.len(), 2);
        assert_eq!(
            packets[1],
            data(b"\x03fatal: payload producer failed: renderer crashed\n")
        );
        assert!(!packets.contains(&data(b"done\n")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cancels_stalled_producer() {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut txn =
            Transaction::command(GitProtoVersion::V2, Vec::<Bytes>::new()).with_deadline(deadline);
        let err = txn
            .fetch(&fetch_request(vec![]), &mut StalledProducer)
            .await
            .unwrap_err();
        assert!(matches!(err, GitInnerError::Cancelled));
        assert_eq!(decode(txn.into_transport()), vec![data(b"packfile\n")]);
    }

    #[tokio::test]
    async fn test_dispatch() {
        let store = StaticRefStore::default();
        let mut producer = ScriptedProducer::new(vec![]);

        let mut txn = Transaction::command(GitProtoVersion::V2, Vec::<Bytes>::new());
        let request = UploadRequest {
            command: UploadCommand::LsRefs,
            capabilities: vec![],
            arguments: vec![],
        };
        txn.upload_pack_v2(&request, &store, &mut producer).await.unwrap();
        assert_eq!(decode(txn.into_transport()), vec![Packet::Flush]);

        let mut txn = Transaction::command(GitProtoVersion::V2, Vec::<Bytes>::new());
        let request = UploadRequest {
            command: UploadCommand::Unknown("object-info".to_string()),
            capabilities: vec![],
            arguments: vec![],
        };
        let err = txn
            .upload_pack_v2(&request, &store, &mut producer)
            .await
            .unwrap_err();
        assert!(matches!(err, GitInnerError::UnknownCommand(name) if name == "object-info"));
        assert_eq!(txn.state(), SessionState::AwaitingCommand);
    }
}
