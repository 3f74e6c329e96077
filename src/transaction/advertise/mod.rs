use crate::error::GitInnerError;
use crate::transaction::{GitProtoVersion, TransactionService};

/// Checks a discovery request before anything is written. The protocol
/// header is checked first, then the `service` query parameter.
pub fn validate_advertisement(
    protocol_header: Option<&str>,
    service: Option<&str>,
) -> Result<(GitProtoVersion, TransactionService), GitInnerError> {
    let version = GitProtoVersion::from_header(protocol_header);
    if version != GitProtoVersion::V2 {
        return Err(GitInnerError::UnsupportedProtocol(
            protocol_header.unwrap_or_default().to_string(),
        ));
    }
    match service.and_then(TransactionService::from_string) {
        Some(service) => Ok((version, service)),
        None => Err(GitInnerError::UnsupportedService(
            service.unwrap_or_default().to_string(),
        )),
    }
}
