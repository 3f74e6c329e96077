#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitProtoVersion {
    V0 = 0,
    V1 = 1,
    V2 = 2,
    Unknown,
}

impl GitProtoVersion {
    pub fn from_str(s: &str) -> GitProtoVersion {
        match s {
            "0" => GitProtoVersion::V0,
            "1" => GitProtoVersion::V1,
            "2" => GitProtoVersion::V2,
            _ => GitProtoVersion::Unknown,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            GitProtoVersion::V0 => "0",
            GitProtoVersion::V1 => "1",
            GitProtoVersion::V2 => "2",
            GitProtoVersion::Unknown => "unknown",
        }
    }

    /// Reads the `Git-Protocol` header, a colon separated list of
    /// `key[=value]` parameters. No header or no `version` key means v0.
    pub fn from_header(header: Option<&str>) -> GitProtoVersion {
        let Some(header) = header else {
            return GitProtoVersion::V0;
        };
        header
            .split(':')
            .filter_map(|param| param.trim().strip_prefix("version="))
            .last()
            .map(GitProtoVersion::from_str)
            .unwrap_or(GitProtoVersion::V0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header() {
        assert_eq!(GitProtoVersion::from_header(Some("version=2")), GitProtoVersion::V2);
        assert_eq!(
            GitProtoVersion::from_header(Some("object-format=sha1:version=2")),
            GitProtoVersion::V2
        );
        assert_eq!(GitProtoVersion::from_header(Some("version=1")), GitProtoVersion::V1);
        assert_eq!(GitProtoVersion::from_header(Some("version=3")), GitProtoVersion::Unknown);
        assert_eq!(GitProtoVersion::from_header(Some("")), GitProtoVersion::V0);
        assert_eq!(GitProtoVersion::from_header(None), GitProtoVersion::V0);
    }

    #[test]
    fn test_str_roundtrip() {
        for v in [GitProtoVersion::V0, GitProtoVersion::V1, GitProtoVersion::V2] {
            assert_eq!(GitProtoVersion::from_str(v.to_str()), v);
        }
    }
}
