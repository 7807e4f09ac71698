//! Philosopher identities and the tri-state path flags they drive.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::UNSET_SENTINEL;

/// One of the four schools a player can declare and every option is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Philosopher {
    Kongzi,
    Laozi,
    Mozi,
    #[serde(rename = "Lord Shang")]
    LordShang,
}

impl Philosopher {
    /// Fixed presentation and table order.
    pub const ALL: [Self; 4] = [Self::Kongzi, Self::Laozi, Self::Mozi, Self::LordShang];

    /// Name shown to players and stored in choice records.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Kongzi => "Kongzi",
            Self::Laozi => "Laozi",
            Self::Mozi => "Mozi",
            Self::LordShang => "Lord Shang",
        }
    }

    /// Column prefix used by the question table (`<prefix>_option`, ...).
    #[must_use]
    pub const fn column_prefix(self) -> &'static str {
        match self {
            Self::Kongzi => "kongzi",
            Self::Laozi => "laozi",
            Self::Mozi => "mozi",
            Self::LordShang => "shang",
        }
    }

    /// Two-letter tag used by journey share codes.
    #[must_use]
    pub const fn code_tag(self) -> &'static str {
        match self {
            Self::Kongzi => "KZ",
            Self::Laozi => "LZ",
            Self::Mozi => "MZ",
            Self::LordShang => "SH",
        }
    }

    #[must_use]
    pub fn from_code_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.code_tag().eq_ignore_ascii_case(tag))
    }

    /// Answering the education question with this school sends the player to college.
    #[must_use]
    pub const fn pursues_education(self) -> bool {
        matches!(self, Self::Kongzi | Self::Laozi | Self::Mozi)
    }

    /// Answering the family question with this school means marrying and raising children.
    #[must_use]
    pub const fn starts_family(self) -> bool {
        matches!(self, Self::Kongzi | Self::Mozi)
    }

    #[must_use]
    pub fn profile(self) -> &'static PhilosopherProfile {
        match self {
            Self::Kongzi => &KONGZI,
            Self::Laozi => &LAOZI,
            Self::Mozi => &MOZI,
            Self::LordShang => &SHANG,
        }
    }
}

impl fmt::Display for Philosopher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown philosopher: {0}")]
pub struct UnknownPhilosopher(pub String);

impl FromStr for Philosopher {
    type Err = UnknownPhilosopher;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| {
                p.name().eq_ignore_ascii_case(needle)
                    || p.column_prefix().eq_ignore_ascii_case(needle)
                    || format!("{p:?}").eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownPhilosopher(needle.to_string()))
    }
}

/// Static presentation copy for a school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhilosopherProfile {
    pub full_name: &'static str,
    pub tagline: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

static KONGZI: PhilosopherProfile = PhilosopherProfile {
    full_name: "Kongzi (Confucius)",
    tagline: "Values education, personal cultivation, and relationships. Believes in the transformative power of learning and social harmony.",
    description: "You value education, personal cultivation, and relationships. You believe in the transformative power of learning and see life as a journey of self-improvement through social harmony and ritual propriety.",
    color: "#8B4513",
    icon: "孔",
};

static LAOZI: PhilosopherProfile = PhilosopherProfile {
    full_name: "Laozi (Daoism)",
    tagline: "Follows the natural flow of life and embraces spontaneity. Resists rigid structures and follows the Dao - the natural way.",
    description: "You follow the natural flow of life and embrace spontaneity. You resist rigid structures and believe in following the Dao - the natural way. Your choices reflect a preference for flexibility and authenticity over convention.",
    color: "#2E8B57",
    icon: "老",
};

static MOZI: PhilosopherProfile = PhilosopherProfile {
    full_name: "Mozi (Mohism)",
    tagline: "Pragmatic and utilitarian. Values efficiency, measurable outcomes, and making decisions based on practical consequences.",
    description: "You are pragmatic and utilitarian in your approach to life. You value efficiency, measurable outcomes, and making decisions based on their practical consequences. Your choices reflect a focus on utility and results.",
    color: "#4169E1",
    icon: "墨",
};

static SHANG: PhilosopherProfile = PhilosopherProfile {
    full_name: "Lord Shang (Legalism)",
    tagline: "Values order, discipline, and practical work. Believes in clear rules and structures that serve the state or community.",
    description: "You value order, discipline, and practical work. You believe in clear rules and structures, and prefer straightforward paths that serve the state or community. Your choices reflect a preference for duty and discipline.",
    color: "#8B0000",
    icon: "商",
};

/// Tri-state life-path flag. `Unset` only ever appears on setup rows and on
/// a player who has not answered the matching setup question yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathFlag {
    #[default]
    Unset,
    Yes,
    No,
}

impl PathFlag {
    /// Normalise a table cell: `"null"` (exact case) is `Unset`, `yes`/`no` in any case
    /// are concrete. Anything else is rejected.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value == UNSET_SENTINEL {
            return Some(Self::Unset);
        }
        if value.eq_ignore_ascii_case("yes") {
            Some(Self::Yes)
        } else if value.eq_ignore_ascii_case("no") {
            Some(Self::No)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Yes } else { Self::No }
    }

    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl fmt::Display for PathFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str(UNSET_SENTINEL),
            Self::Yes => f.write_str("yes"),
            Self::No => f.write_str("no"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_names_prefixes_and_variants() {
        assert_eq!("Lord Shang".parse::<Philosopher>(), Ok(Philosopher::LordShang));
        assert_eq!("shang".parse::<Philosopher>(), Ok(Philosopher::LordShang));
        assert_eq!("lordshang".parse::<Philosopher>(), Ok(Philosopher::LordShang));
        assert_eq!(" KONGZI ".parse::<Philosopher>(), Ok(Philosopher::Kongzi));
        assert!("Zhuangzi".parse::<Philosopher>().is_err());
    }

    #[test]
    fn path_rules_follow_the_schools() {
        let educated: Vec<_> = Philosopher::ALL
            .into_iter()
            .filter(|p| p.pursues_education())
            .collect();
        assert_eq!(
            educated,
            vec![Philosopher::Kongzi, Philosopher::Laozi, Philosopher::Mozi]
        );
        let family: Vec<_> = Philosopher::ALL
            .into_iter()
            .filter(|p| p.starts_family())
            .collect();
        assert_eq!(family, vec![Philosopher::Kongzi, Philosopher::Mozi]);
    }

    #[test]
    fn flag_sentinel_is_case_sensitive() {
        assert_eq!(PathFlag::parse("null"), Some(PathFlag::Unset));
        assert_eq!(PathFlag::parse("NULL"), None);
        assert_eq!(PathFlag::parse("Yes"), Some(PathFlag::Yes));
        assert_eq!(PathFlag::parse(" no "), Some(PathFlag::No));
        assert_eq!(PathFlag::parse("maybe"), None);
    }

    #[test]
    fn code_tags_roundtrip() {
        for p in Philosopher::ALL {
            assert_eq!(Philosopher::from_code_tag(p.code_tag()), Some(p));
        }
        assert_eq!(Philosopher::from_code_tag("kz"), Some(Philosopher::Kongzi));
        assert_eq!(Philosopher::from_code_tag("XX"), None);
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Philosopher::LordShang).unwrap();
        assert_eq!(json, "\"Lord Shang\"");
        let flag: PathFlag = serde_json::from_str("\"yes\"").unwrap();
        assert_eq!(flag, PathFlag::Yes);
    }
}
