//! The realm ladder: fixed progression tiers and the experience curve.
//!
//! `exp_needed` is persisted implicitly in every save (players bank experience against
//! it), so the constants and the evaluation order of the formula must not change.

/// One major tier of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealmTier {
    pub name: &'static str,
    /// Number of minor sub-levels in this tier.
    pub levels: u8,
    pub exp_base: u64,
}

pub const REALM_LADDER: [RealmTier; 10] = [
    RealmTier { name: "炼气期", levels: 10, exp_base: 100 },
    RealmTier { name: "筑基境", levels: 4, exp_base: 2_000 },
    RealmTier { name: "结丹境", levels: 4, exp_base: 10_000 },
    RealmTier { name: "元婴境", levels: 4, exp_base: 50_000 },
    RealmTier { name: "化神境", levels: 4, exp_base: 250_000 },
    RealmTier { name: "炼虚境", levels: 3, exp_base: 1_000_000 },
    RealmTier { name: "合体境", levels: 3, exp_base: 5_000_000 },
    RealmTier { name: "大乘境", levels: 3, exp_base: 20_000_000 },
    RealmTier { name: "渡劫期", levels: 1, exp_base: 100_000_000 },
    RealmTier { name: "真仙", levels: 1, exp_base: 0 },
];

/// Index of the last tier. Nothing lies beyond it.
pub const TERMINAL_MAJOR: u8 = (REALM_LADDER.len() - 1) as u8;

const STAGES_FOUR: [&str; 4] = ["初期", "中期", "后期", "圆满"];
const STAGES_THREE: [&str; 3] = ["初期", "中期", "后期"];

/// Everything the engine and the status screen need to know about a ladder position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmInfo {
    pub major_level: u8,
    pub minor_level: u8,
    pub full_name: String,
    pub major_name: &'static str,
    pub minor_label: String,
    pub max_minor: u8,
    pub exp_needed: u64,
}

impl RealmInfo {
    pub fn is_terminal(&self) -> bool {
        self.major_level >= TERMINAL_MAJOR
    }
}

fn clamp_major(major: u8) -> u8 {
    major.min(TERMINAL_MAJOR)
}

pub fn tier(major: u8) -> &'static RealmTier {
    &REALM_LADDER[clamp_major(major) as usize]
}

pub fn is_terminal(major: u8) -> bool {
    major >= TERMINAL_MAJOR
}

/// Display label of a minor sub-level within a tier.
pub fn minor_label(major: u8, minor: u8) -> String {
    let stage = |labels: &[&str]| {
        labels
            .get(usize::from(minor.max(1)) - 1)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("第{}阶", minor))
    };
    match clamp_major(major) {
        0 => format!("第{}层", minor),
        1..=4 => stage(&STAGES_FOUR),
        5..=7 => stage(&STAGES_THREE),
        8 => "渡劫中".to_string(),
        _ => "逍遥真仙".to_string(),
    }
}

/// `floor(exp_base * minor^1.5 * (major * 1.2 + 1))`, evaluated left to right in f64.
pub fn exp_needed(major: u8, minor: u8) -> u64 {
    let major = clamp_major(major);
    let base = tier(major).exp_base as f64;
    let value = base * f64::from(minor).powf(1.5) * (f64::from(major) * 1.2 + 1.0);
    value as u64
}

pub fn realm_info(major: u8, minor: u8) -> RealmInfo {
    let major = clamp_major(major);
    let tier = tier(major);
    let minor_label = minor_label(major, minor);
    RealmInfo {
        major_level: major,
        minor_level: minor,
        full_name: format!("{}·{}", tier.name, minor_label),
        major_name: tier.name,
        minor_label,
        max_minor: tier.levels,
        exp_needed: exp_needed(major, minor),
    }
}

/// The position reached by a successful breakthrough from `(major, minor)`.
pub fn next_position(major: u8, minor: u8) -> (u8, u8) {
    if minor >= tier(major).levels {
        (clamp_major(major.saturating_add(1)), 1)
    } else {
        (major, minor + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_curve_matches_saved_values() {
        assert_eq!(exp_needed(0, 1), 100);
        assert_eq!(exp_needed(0, 2), 282);
        assert_eq!(exp_needed(0, 10), 3162);
        assert_eq!(exp_needed(1, 1), 4400);
        assert_eq!(exp_needed(1, 4), 35200);
        // 3 * 1.2 rounds below 3.6 in binary floating point.
        assert_eq!(exp_needed(3, 1), 229_999);
        assert_eq!(exp_needed(3, 4), 1_839_999);
        assert_eq!(exp_needed(8, 1), 1_060_000_000);
        assert_eq!(exp_needed(9, 1), 0);
    }

    #[test]
    fn exp_strictly_increases_within_each_realm() {
        for (major, tier) in REALM_LADDER.iter().enumerate().take(TERMINAL_MAJOR as usize) {
            let major = major as u8;
            for minor in 1..tier.levels {
                assert!(
                    exp_needed(major, minor) < exp_needed(major, minor + 1),
                    "realm {} minor {}",
                    major,
                    minor
                );
            }
        }
    }

    #[test]
    fn labels_follow_tier_style() {
        assert_eq!(realm_info(0, 3).full_name, "炼气期·第3层");
        assert_eq!(realm_info(2, 4).full_name, "结丹境·圆满");
        assert_eq!(realm_info(6, 2).full_name, "合体境·中期");
        assert_eq!(realm_info(8, 1).full_name, "渡劫期·渡劫中");
        assert_eq!(realm_info(9, 1).full_name, "真仙·逍遥真仙");
    }

    #[test]
    fn out_of_range_major_clamps_to_terminal() {
        let info = realm_info(42, 1);
        assert_eq!(info.major_level, TERMINAL_MAJOR);
        assert_eq!(info.major_name, "真仙");
        assert!(info.is_terminal());
        assert_eq!(info.exp_needed, 0);
    }

    #[test]
    fn next_position_rolls_over_at_tier_end() {
        assert_eq!(next_position(0, 1), (0, 2));
        assert_eq!(next_position(0, 10), (1, 1));
        assert_eq!(next_position(4, 4), (5, 1));
        assert_eq!(next_position(8, 1), (9, 1));
    }
}
