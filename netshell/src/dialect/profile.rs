//! Static dialect profile table.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use regex::bytes::Regex as BytesRegex;

use super::DialectTag;

/// How the command echo is recognized when cleaning output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoStripMode {
    /// The first line containing the command (or starting with it) is the echo.
    #[default]
    Substring,
    /// Only a line that is the command, optionally behind a prompt, is the echo.
    Exact,
}

/// The command used to request elevated privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeCommand {
    /// Always sent as-is (`enable`).
    Fixed(&'static str),
    /// Followed by the configured level when there is one (`super 3`).
    Leveled(&'static str),
}

impl PrivilegeCommand {
    /// Render the command line for an optional privilege level.
    pub fn render(&self, level: Option<&str>) -> String {
        match (self, level.map(str::trim).filter(|l| !l.is_empty())) {
            (PrivilegeCommand::Leveled(base), Some(level)) => format!("{base} {level}"),
            (PrivilegeCommand::Fixed(base), _) | (PrivilegeCommand::Leveled(base), None) => {
                (*base).to_string()
            }
        }
    }

    /// Whether this dialect accepts a privilege level argument.
    pub fn supports_level(&self) -> bool {
        matches!(self, PrivilegeCommand::Leveled(_))
    }
}

/// Behavior record for one vendor CLI.
///
/// Profiles are immutable and live in a static table; a session selects one
/// by tag and keeps it for its whole lifetime.
#[derive(Debug)]
pub struct DialectProfile {
    /// Which dialect this record describes.
    pub tag: DialectTag,

    /// Command that turns off output paging for the current session.
    pub paging_disable_command: &'static str,

    /// Command that starts the privilege dialogue.
    pub privilege_command: PrivilegeCommand,

    /// Matches a prompt at the very end of accumulated output.
    pub prompt_detect: BytesRegex,

    /// Matches a line that consists only of a prompt.
    pub prompt_strip: Regex,

    /// Echo recognition used by the output cleaner.
    pub echo_strip_mode: EchoStripMode,

    /// Lower-case banner keywords that identify this dialect.
    pub keywords: &'static [&'static str],
}

/// Profiles in detection priority order.
static PROFILES: Lazy<IndexMap<DialectTag, DialectProfile>> = Lazy::new(|| {
    [huawei(), cisco()]
        .into_iter()
        .map(|profile| (profile.tag, profile))
        .collect()
});

impl DialectProfile {
    /// Look up the profile for a dialect.
    pub fn get(tag: DialectTag) -> &'static DialectProfile {
        &PROFILES[&tag]
    }

    /// All profiles, highest detection priority first.
    pub fn all() -> impl Iterator<Item = &'static DialectProfile> {
        PROFILES.values()
    }

    /// Render the privilege command for an optional level.
    pub fn privilege_command_for(&self, level: Option<&str>) -> String {
        self.privilege_command.render(level)
    }

    /// Check whether the lower-cased banner mentions any of this profile's keywords.
    pub fn matches_banner(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

fn huawei() -> DialectProfile {
    DialectProfile {
        tag: DialectTag::Huawei,
        paging_disable_command: "screen-length 0 temporary",
        privilege_command: PrivilegeCommand::Leveled("super"),
        prompt_detect: BytesRegex::new(r"[<\[][~*]?[\w.\-/:]+[>\]]\s*$")
            .expect("built-in huawei prompt pattern"),
        prompt_strip: Regex::new(r"^[<\[][~*]?[\w.\-/:]+[>\]]\s*$")
            .expect("built-in huawei prompt pattern"),
        echo_strip_mode: EchoStripMode::Substring,
        keywords: &[
            "huawei",
            "vrp",
            "quidway",
            "sysname",
            "versatile routing platform",
        ],
    }
}

fn cisco() -> DialectProfile {
    DialectProfile {
        tag: DialectTag::Cisco,
        paging_disable_command: "terminal length 0",
        privilege_command: PrivilegeCommand::Fixed("enable"),
        prompt_detect: BytesRegex::new(r"[>#]\s*$").expect("built-in cisco prompt pattern"),
        prompt_strip: Regex::new(r"^[\w.\-/()]+[>#]\s*$")
            .expect("built-in cisco prompt pattern"),
        echo_strip_mode: EchoStripMode::Substring,
        keywords: &["cisco", "ios", "catalyst", "nexus", "nx-os"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_has_a_profile() {
        for tag in [DialectTag::Cisco, DialectTag::Huawei] {
            assert_eq!(DialectProfile::get(tag).tag, tag);
        }
        assert_eq!(DialectProfile::all().count(), 2);
    }

    #[test]
    fn test_huawei_checked_first() {
        let order: Vec<_> = DialectProfile::all().map(|p| p.tag).collect();
        assert_eq!(order, vec![DialectTag::Huawei, DialectTag::Cisco]);
    }

    #[test]
    fn test_paging_literals() {
        assert_eq!(
            DialectProfile::get(DialectTag::Cisco).paging_disable_command,
            "terminal length 0"
        );
        assert_eq!(
            DialectProfile::get(DialectTag::Huawei).paging_disable_command,
            "screen-length 0 temporary"
        );
    }

    #[test]
    fn test_privilege_commands() {
        let cisco = DialectProfile::get(DialectTag::Cisco);
        assert_eq!(cisco.privilege_command_for(None), "enable");
        assert_eq!(cisco.privilege_command_for(Some("15")), "enable");
        assert!(!cisco.privilege_command.supports_level());

        let huawei = DialectProfile::get(DialectTag::Huawei);
        assert_eq!(huawei.privilege_command_for(Some("3")), "super 3");
        assert_eq!(huawei.privilege_command_for(Some("  ")), "super");
        assert_eq!(huawei.privilege_command_for(None), "super");
    }

    #[test]
    fn test_cisco_prompt_detect_is_tail_anchored() {
        let detect = &DialectProfile::get(DialectTag::Cisco).prompt_detect;
        assert!(detect.is_match(b"output\r\nRouter#"));
        assert!(detect.is_match(b"Router> "));
        assert!(detect.is_match(b"Router(config)#\r\n"));
        assert!(!detect.is_match(b"line with # inside\r\nmore output"));
    }

    #[test]
    fn test_huawei_prompt_detect() {
        let detect = &DialectProfile::get(DialectTag::Huawei).prompt_detect;
        assert!(detect.is_match(b"output\r\n<HUAWEI>"));
        assert!(detect.is_match(b"[~HUAWEI-GigabitEthernet0/0/1]"));
        assert!(detect.is_match(b"[Quidway] "));
        assert!(!detect.is_match(b"Router#"));
        assert!(!detect.is_match(b"<HUAWEI> then more output"));
    }

    #[test]
    fn test_prompt_strip_whole_line_only() {
        let cisco = &DialectProfile::get(DialectTag::Cisco).prompt_strip;
        assert!(cisco.is_match("Router#"));
        assert!(cisco.is_match("core-sw01.lab>"));
        assert!(!cisco.is_match("Router#show version"));
        assert!(!cisco.is_match("Cisco IOS Software, Version 15.2"));

        let huawei = &DialectProfile::get(DialectTag::Huawei).prompt_strip;
        assert!(huawei.is_match("<HUAWEI>"));
        assert!(huawei.is_match("[HUAWEI]  "));
        assert!(!huawei.is_match("<HUAWEI>display version"));
    }
}
