//! Interactive shell resolution
//!
//! Picks a shell executable for the host platform, honoring an optional
//! override. Availability is a filesystem existence probe of the two
//! standard binary directories, not a PATH search; on layouts where
//! neither directory holds the shells this degrades to the `sh` fallback.

use std::path::Path;

/// Directories consulted by the availability probe.
const SHELL_DIRS: [&str; 2] = ["/bin", "/usr/bin"];

/// Resolve the shell to spawn for interactive sessions.
///
/// Never fails and never returns an empty name: an unavailable override
/// logs a warning and falls through to the platform defaults, and `sh` is
/// the ultimate fallback.
pub fn resolve(requested: Option<&str>) -> String {
    resolve_for_os(requested, std::env::consts::OS)
}

fn resolve_for_os(requested: Option<&str>, os: &str) -> String {
    if let Some(requested) = requested.filter(|s| !s.is_empty()) {
        if is_available(requested) {
            return requested.to_string();
        }
        tracing::warn!(
            shell = requested,
            "requested shell is not available, using the platform default"
        );
    }

    match os {
        "windows" => "powershell".to_string(),
        "linux" => ["zsh", "bash"]
            .iter()
            .find(|shell| is_available(shell))
            .map(|shell| shell.to_string())
            .unwrap_or_else(|| "sh".to_string()),
        "macos" => "bash".to_string(),
        _ => "sh".to_string(),
    }
}

fn is_available(shell: &str) -> bool {
    SHELL_DIRS
        .iter()
        .any(|dir| Path::new(dir).join(shell).exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_defaults_to_powershell() {
        assert_eq!(resolve_for_os(None, "windows"), "powershell");
    }

    #[test]
    fn macos_defaults_to_bash() {
        assert_eq!(resolve_for_os(None, "macos"), "bash");
    }

    #[test]
    fn unknown_platform_defaults_to_sh() {
        assert_eq!(resolve_for_os(None, "freebsd"), "sh");
    }

    #[test]
    fn linux_picks_by_priority() {
        let shell = resolve_for_os(None, "linux");
        assert!(["zsh", "bash", "sh"].contains(&shell.as_str()));
        // Priority: a later entry is only returned when every earlier one
        // is missing from the probed directories.
        match shell.as_str() {
            "bash" => assert!(!is_available("zsh")),
            "sh" => assert!(!is_available("zsh") && !is_available("bash")),
            _ => {}
        }
    }

    #[test]
    fn unavailable_override_is_never_returned() {
        let shell = resolve_for_os(Some("definitely-not-a-shell"), "linux");
        assert_ne!(shell, "definitely-not-a-shell");
        assert!(["zsh", "bash", "sh"].contains(&shell.as_str()));
    }

    #[test]
    fn empty_override_is_ignored() {
        assert!(!resolve_for_os(Some(""), "linux").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn available_override_wins() {
        // `sh` exists in /bin or /usr/bin on any unix this test runs on.
        assert_eq!(resolve_for_os(Some("sh"), "linux"), "sh");
    }

    #[test]
    fn resolution_never_returns_empty() {
        for os in ["windows", "linux", "macos", "plan9"] {
            assert!(!resolve_for_os(None, os).is_empty());
        }
    }
}
