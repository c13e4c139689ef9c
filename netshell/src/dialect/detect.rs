//! Banner-based dialect detection.

use super::{DialectProfile, DialectTag};

/// Outcome of classifying a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// The selected dialect.
    pub tag: DialectTag,

    /// True when no keyword matched and the default dialect was assumed.
    pub uncertain: bool,
}

/// Classify the output collected right after login.
///
/// Keyword sets are checked in profile priority order (huawei before cisco),
/// so a banner mentioning both vendors resolves to huawei. When nothing
/// matches the default dialect is returned with `uncertain` set; callers
/// should surface that as a warning and carry on.
pub fn detect(banner: &str) -> Detection {
    let lowered = banner.to_lowercase();

    DialectProfile::all()
        .find(|profile| profile.matches_banner(&lowered))
        .map(|profile| Detection {
            tag: profile.tag,
            uncertain: false,
        })
        .unwrap_or(Detection {
            tag: DialectTag::default(),
            uncertain: true,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huawei_banner() {
        let detection = detect("<Huawei>welcome...");
        assert_eq!(detection.tag, DialectTag::Huawei);
        assert!(!detection.uncertain);
        assert_eq!(
            detection.tag.profile().paging_disable_command,
            "screen-length 0 temporary"
        );
    }

    #[test]
    fn test_quidway_system_view() {
        let detection = detect("Info: The max number of VTY users is 5\r\n[Quidway]");
        assert_eq!(detection.tag, DialectTag::Huawei);
    }

    #[test]
    fn test_cisco_banner() {
        let detection = detect("Cisco IOS Software, C2960 Software\r\nSwitch>");
        assert_eq!(detection.tag, DialectTag::Cisco);
        assert!(!detection.uncertain);
    }

    #[test]
    fn test_huawei_wins_when_both_present() {
        let detection = detect("Migrated from Cisco Catalyst to Huawei VRP\r\n<core>");
        assert_eq!(detection.tag, DialectTag::Huawei);
    }

    #[test]
    fn test_unknown_banner_falls_back_to_cisco() {
        let detection = detect("\r\nUser Access Verification\r\n\r\nRouter>");
        assert_eq!(detection.tag, DialectTag::Cisco);
        assert!(detection.uncertain);

        let detection = detect("");
        assert_eq!(detection.tag, DialectTag::Cisco);
        assert!(detection.uncertain);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let banner = "Huawei Versatile Routing Platform Software\r\n<AR2220>";
        assert_eq!(detect(banner), detect(banner));
    }
}
