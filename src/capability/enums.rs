use std::fmt;

/// Protocol v2 capabilities, as advertised by the server or sent back by
/// the client in the capability section of a command request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GitCapability {
    /// `ls-refs` command
    LsRefs,
    /// `fetch` command
    Fetch,
    /// `server-option`, optionally with the client's value
    ServerOption(Option<String>),
    /// `object-format=<algo>`
    ObjectFormat(String),
    /// `agent=<name>`
    Agent(String),
    /// Anything not understood, kept verbatim
    Other(String),
}

impl GitCapability {
    pub fn from_str(s: &str) -> Self {
        match s {
            "ls-refs" => Self::LsRefs,
            "fetch" => Self::Fetch,
            "server-option" => Self::ServerOption(None),
            _ => {
                if let Some(agent) = s.strip_prefix("agent=") {
                    Self::Agent(agent.to_string())
                } else if let Some(format) = s.strip_prefix("object-format=") {
                    Self::ObjectFormat(format.to_string())
                } else if let Some(option) = s.strip_prefix("server-option=") {
                    Self::ServerOption(Some(option.to_string()))
                } else {
                    Self::Other(s.to_string())
                }
            }
        }
    }

    /// What this server advertises, in wire order. Only commands the session
    /// can actually run belong here.
    pub fn upload_v2() -> Vec<GitCapability> {
        vec![GitCapability::LsRefs, GitCapability::Fetch]
    }
}

impl fmt::Display for GitCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LsRefs => write!(f, "ls-refs"),
            Self::Fetch => write!(f, "fetch"),
            Self::ServerOption(None) => write!(f, "server-option"),
            Self::ServerOption(Some(option)) => write!(f, "server-option={}", option),
            Self::ObjectFormat(format) => write!(f, "object-format={}", format),
            Self::Agent(agent) => write!(f, "agent={}", agent),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_capabilities() {
        assert_eq!(GitCapability::from_str("ls-refs"), GitCapability::LsRefs);
        assert_eq!(GitCapability::from_str("fetch"), GitCapability::Fetch);
        assert_eq!(
            GitCapability::from_str("server-option"),
            GitCapability::ServerOption(None)
        );
    }

    #[test]
    fn test_parse_valued_capabilities() {
        assert_eq!(
            GitCapability::from_str("agent=git/2.40.0"),
            GitCapability::Agent("git/2.40.0".to_string())
        );
        assert_eq!(
            GitCapability::from_str("object-format=sha1"),
            GitCapability::ObjectFormat("sha1".to_string())
        );
        assert_eq!(
            GitCapability::from_str("server-option=trace"),
            GitCapability::ServerOption(Some("trace".to_string()))
        );
        assert_eq!(
            GitCapability::from_str("bundle-uri"),
            GitCapability::Other("bundle-uri".to_string())
        );
    }

    #[test]
    fn test_to_string() {
        assert_eq!(GitCapability::LsRefs.to_string(), "ls-refs");
        assert_eq!(
            GitCapability::Agent("git/2.40.0".to_string()).to_string(),
            "agent=git/2.40.0"
        );
    }

    #[test]
    fn test_advertised_order() {
        let names: Vec<String> = GitCapability::upload_v2()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(names, vec!["ls-refs", "fetch"]);
    }
}
