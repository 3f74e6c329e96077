use crate::capability::enums::GitCapability;
use crate::error::GitInnerError;
use crate::pkt_line::{Packet, PktLineReader};
use crate::sha::Sha1;
use bytes::Bytes;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadCommand {
    LsRefs,
    Fetch,
    Unknown(String),
}

impl UploadCommand {
    pub fn from_str(s: &str) -> Self {
        match s {
            "ls-refs" => UploadCommand::LsRefs,
            "fetch" => UploadCommand::Fetch,
            other => UploadCommand::Unknown(other.to_string()),
        }
    }
}

/// Command arguments following the delimiter packet. Only `ref-prefix` and
/// `no-progress` change what the session does, the rest only show up in the
/// fetch debug log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadArgument {
    // ls-refs
    RefPrefix(String),
    Symrefs,
    Peel,
    Unborn,
    // fetch
    Want(Sha1),
    Have(Sha1),
    Done,
    ThinPack,
    OfsDelta,
    NoProgress,
    IncludeTag,
    Other(String),
}

impl UploadArgument {
    pub fn from_line(line: &str) -> Self {
        let hash = |s: &str| Sha1::from_str(s.trim()).ok();
        match line {
            "symrefs" => Self::Symrefs,
            "peel" => Self::Peel,
            "unborn" => Self::Unborn,
            "done" => Self::Done,
            "thin-pack" => Self::ThinPack,
            "ofs-delta" => Self::OfsDelta,
            "no-progress" => Self::NoProgress,
            "include-tag" => Self::IncludeTag,
            _ => {
                if let Some(prefix) = line.strip_prefix("ref-prefix ") {
                    Self::RefPrefix(prefix.to_string())
                } else if let Some(id) = line.strip_prefix("want ").and_then(hash) {
                    Self::Want(id)
                } else if let Some(id) = line.strip_prefix("have ").and_then(hash) {
                    Self::Have(id)
                } else {
                    Self::Other(line.to_string())
                }
            }
        }
    }
}

/// A decoded protocol v2 command request:
///
/// ```text
/// command=<name>
/// <capability lines>
/// 0001
/// <argument lines>
/// 0000
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub command: UploadCommand,
    pub capabilities: Vec<GitCapability>,
    pub arguments: Vec<UploadArgument>,
}

impl UploadRequest {
    pub fn parse(body: Bytes) -> Result<UploadRequest, GitInnerError> {
        let mut reader = PktLineReader::new(body);
        let mut command = None;
        let mut capabilities = vec![];
        let mut arguments = vec![];
        let mut in_arguments = false;
        while let Some(pkt) = reader.read()? {
            match pkt {
                Packet::Flush => break,
                Packet::Delimiter => in_arguments = true,
                Packet::Data(_) => {
                    let line = pkt.as_line()?.unwrap_or_default();
                    if in_arguments {
                        arguments.push(UploadArgument::from_line(line));
                    } else if let Some(name) = line.strip_prefix("command=") {
                        if command.is_none() {
                            command = Some(UploadCommand::from_str(name));
                        }
                    } else {
                        capabilities.push(GitCapability::from_str(line));
                    }
                }
            }
        }
        Ok(UploadRequest {
            command: command.ok_or(GitInnerError::MissingCommand)?,
            capabilities,
            arguments,
        })
    }

    pub fn has_argument(&self, argument: &UploadArgument) -> bool {
        self.arguments.contains(argument)
    }

    pub fn wants(&self) -> impl Iterator<Item = &Sha1> {
        self.arguments.iter().filter_map(|arg| match arg {
            UploadArgument::Want(id) => Some(id),
            _ => None,
        })
    }

    pub fn haves(&self) -> impl Iterator<Item = &Sha1> {
        self.arguments.iter().filter_map(|arg| match arg {
            UploadArgument::Have(id) => Some(id),
            _ => None,
        })
    }

    pub fn agent(&self) -> Option<&str> {
        self.capabilities.iter().find_map(|c| match c {
            GitCapability::Agent(agent) => Some(agent.as_str()),
            _ => None,
        })
    }
}
