//! Host list files: one host per line, `#` starts a comment.

use std::path::Path;

use log::debug;

use crate::error::{ConfigError, Result};

/// Parse host list text.
///
/// Blank lines and everything after a `#` are ignored. Duplicates are kept;
/// the batch runner collapses them.
pub fn parse_host_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read and parse a host list file. An empty list is an error.
pub async fn load_host_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::HostList {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let hosts = parse_host_list(&text);
    if hosts.is_empty() {
        return Err(ConfigError::HostList {
            path: path.to_path_buf(),
            reason: "no hosts listed".to_string(),
        }
        .into());
    }

    debug!("loaded {} host(s) from {}", hosts.len(), path.display());
    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# core switches\n\
                    192.168.93.101\n\
                    \n\
                    192.168.93.102   # second floor\n\
                    \t  \n\
                    #192.168.93.103\n\
                    sw-edge-01\n";
        assert_eq!(
            parse_host_list(text),
            ["192.168.93.101", "192.168.93.102", "sw-edge-01"]
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_host_list("/nonexistent/netshell/ip_list.txt")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(matches!(err, Error::Config(ConfigError::HostList { .. })));
    }

    #[tokio::test]
    async fn test_load_rejects_empty_list() {
        let name = format!("netshell-hosts-{}.txt", std::process::id());
        let path = std::env::temp_dir().join(name);
        tokio::fs::write(&path, "# nothing here\n\n").await.unwrap();

        let result = load_host_list(&path).await;
        tokio::fs::remove_file(&path).await.unwrap();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("no hosts listed"));
    }

    #[tokio::test]
    async fn test_load_host_list() {
        let name = format!("netshell-hosts-ok-{}.txt", std::process::id());
        let path = std::env::temp_dir().join(name);
        tokio::fs::write(&path, "10.0.0.1\n# spare\n10.0.0.2\n").await.unwrap();

        let hosts = load_host_list(&path).await;
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(hosts.unwrap(), ["10.0.0.1", "10.0.0.2"]);
    }
}
