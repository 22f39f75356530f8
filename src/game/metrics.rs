use crate::game::format::{
    finite_or_zero, format_abbreviated, format_decimal, format_distance, format_duration_compact,
    format_integer, format_plain, format_ratio_percent,
};
use crate::game::stats::{StatsSnapshot, WeaponRecord};

pub const PRIMARY_METRIC_COUNT: usize = 6;
pub const SECONDARY_METRIC_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
    pub caption: Option<String>,
    pub highlight: bool,
}

impl Metric {
    fn new(label: &'static str, value: String, caption: impl Into<String>) -> Self {
        Self {
            label,
            value,
            caption: Some(caption.into()),
            highlight: false,
        }
    }

    fn lead(mut self) -> Self {
        self.highlight = true;
        self
    }
}

/// Use the service's precomputed display string when it has one.
#[inline(always)]
fn precomputed_or(precomputed: Option<&str>, derive: impl FnOnce() -> String) -> String {
    match precomputed.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => derive(),
    }
}

fn kill_death(stats: &StatsSnapshot) -> f64 {
    if let Some(kd) = stats.kill_death.filter(|v| v.is_finite()) {
        return kd;
    }
    let kills = finite_or_zero(stats.kills);
    let deaths = finite_or_zero(stats.deaths);
    if deaths > 0.0 { kills / deaths } else { kills }
}

fn kills_per_minute(stats: &StatsSnapshot) -> f64 {
    if let Some(kpm) = stats.kills_per_minute.filter(|v| v.is_finite()) {
        return kpm;
    }
    let minutes = finite_or_zero(stats.seconds_played) / 60.0;
    if minutes > 0.0 {
        finite_or_zero(stats.kills) / minutes
    } else {
        0.0
    }
}

/// SPM, K/D, KPM, win rate, matches, damage. SPM leads.
pub fn build_primary(stats: &StatsSnapshot) -> [Metric; PRIMARY_METRIC_COUNT] {
    let wins = finite_or_zero(stats.wins);
    let losses = finite_or_zero(stats.loses);
    [
        Metric::new(
            "SPM",
            format_decimal(stats.score_per_minute, 0),
            "得分 / 分钟",
        )
        .lead(),
        Metric::new(
            "K/D",
            format_decimal(Some(kill_death(stats)), 2),
            format!(
                "{} 击杀 · {} 死亡",
                format_plain(stats.kills),
                format_plain(stats.deaths)
            ),
        ),
        Metric::new(
            "KPM",
            format_decimal(Some(kills_per_minute(stats)), 2),
            "击杀 / 分钟",
        ),
        Metric::new(
            "胜率",
            precomputed_or(stats.win_percent.as_deref(), || {
                format_ratio_percent(Some(wins), Some(wins + losses))
            }),
            format!(
                "{} 胜 · {} 负",
                format_plain(stats.wins),
                format_plain(stats.loses)
            ),
        ),
        Metric::new(
            "对局",
            format_integer(stats.matches_played),
            "已完成的比赛",
        ),
        Metric::new(
            "伤害",
            format_abbreviated(stats.total_damage()),
            "总伤害输出",
        ),
    ]
}

/// Best class, accuracy, headshot rate, melee, distance, playtime. Best class leads.
pub fn build_secondary(stats: &StatsSnapshot) -> [Metric; SECONDARY_METRIC_COUNT] {
    [
        Metric::new(
            "最佳兵种",
            precomputed_or(stats.best_class_label(), || "未知".to_string()),
            "偏好职业",
        )
        .lead(),
        Metric::new(
            "命中率",
            precomputed_or(stats.accuracy.as_deref(), || {
                format_ratio_percent(stats.shots_hit, stats.shots_fired)
            }),
            format!(
                "{} 命中 / {} 射击",
                format_plain(stats.shots_hit),
                format_plain(stats.shots_fired)
            ),
        ),
        Metric::new(
            "爆头率",
            precomputed_or(stats.headshots_percent.as_deref(), || {
                format_ratio_percent(stats.headshots, stats.kills)
            }),
            format!("{} 次爆头", format_plain(stats.headshots)),
        ),
        Metric::new(
            "近战击杀",
            format_integer(stats.melee_kills),
            format!("最高连杀 {}", format_plain(stats.highest_kill_streak)),
        ),
        Metric::new(
            "行程",
            format_distance(stats.total_distance()),
            "战场位移",
        ),
        Metric::new(
            "总时间",
            format_duration_compact(stats.seconds_played),
            "累计在线",
        ),
    ]
}

/// Top `count` weapons by kills, descending. Ties keep their input order.
pub fn select_top_weapons(weapons: &[WeaponRecord], count: usize) -> Vec<&WeaponRecord> {
    if count == 0 {
        return Vec::new();
    }
    let mut ranked: Vec<&WeaponRecord> = weapons.iter().collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| finite_or_zero(b.kills).total_cmp(&finite_or_zero(a.kills)));
    ranked.truncate(count);
    ranked
}

/// Title and stat line for one weapon panel. `rank` is zero-based.
pub fn weapon_lines(weapon: &WeaponRecord, rank: usize) -> (String, String) {
    let name = weapon.weapon_name.as_deref().unwrap_or("未知武器");
    let level = weapon.display_level().unwrap_or(rank as u32 + 1);
    let title = format!("{name} Lv.{level}");
    let accuracy = match weapon.accuracy.as_deref().map(str::trim) {
        Some(a) if !a.is_empty() => a,
        _ => "N/A",
    };
    let info = format!(
        "击杀 {} · KPM {} · 命中率 {}",
        format_plain(weapon.kills),
        format_decimal(weapon.kills_per_minute, 2),
        accuracy
    );
    (title, info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon(name: &str, kills: Option<f64>) -> WeaponRecord {
        WeaponRecord {
            weapon_name: Some(name.to_string()),
            kills,
            ..WeaponRecord::default()
        }
    }

    #[test]
    fn lists_have_fixed_order_and_a_single_lead() {
        let stats = StatsSnapshot::default();
        let primary = build_primary(&stats);
        let secondary = build_secondary(&stats);
        let labels: Vec<_> = primary.iter().map(|m| m.label).collect();
        assert_eq!(labels, ["SPM", "K/D", "KPM", "胜率", "对局", "伤害"]);
        let labels: Vec<_> = secondary.iter().map(|m| m.label).collect();
        assert_eq!(labels, ["最佳兵种", "命中率", "爆头率", "近战击杀", "行程", "总时间"]);
        assert_eq!(primary.iter().filter(|m| m.highlight).count(), 1);
        assert_eq!(secondary.iter().filter(|m| m.highlight).count(), 1);
        assert!(primary[0].highlight && secondary[0].highlight);
    }

    #[test]
    fn empty_snapshot_degrades_to_zero_strings() {
        let stats = StatsSnapshot::default();
        let primary = build_primary(&stats);
        let secondary = build_secondary(&stats);
        assert_eq!(primary[0].value, "0");
        assert_eq!(primary[1].value, "0.00");
        assert_eq!(primary[2].value, "0.00");
        assert_eq!(primary[3].value, "0%");
        assert_eq!(primary[4].value, "0");
        assert_eq!(primary[5].value, "0");
        assert_eq!(secondary[0].value, "未知");
        assert_eq!(secondary[1].value, "0%");
        assert_eq!(secondary[2].value, "0%");
        assert_eq!(secondary[4].value, "0m");
        assert_eq!(secondary[5].value, "0h");
    }

    #[test]
    fn precomputed_strings_win_over_local_derivation() {
        let stats = StatsSnapshot {
            win_percent: Some("61.2%".into()),
            wins: Some(1.0),
            loses: Some(1.0),
            accuracy: Some("22.0%".into()),
            shots_hit: Some(1.0),
            shots_fired: Some(2.0),
            ..StatsSnapshot::default()
        };
        assert_eq!(build_primary(&stats)[3].value, "61.2%");
        assert_eq!(build_secondary(&stats)[1].value, "22.0%");
    }

    #[test]
    fn derived_ratios_fill_in_missing_precomputed_ones() {
        let stats = StatsSnapshot {
            kills: Some(300.0),
            deaths: Some(120.0),
            seconds_played: Some(3600.0),
            wins: Some(3.0),
            loses: Some(1.0),
            shots_hit: Some(250.0),
            shots_fired: Some(1000.0),
            headshots: Some(30.0),
            ..StatsSnapshot::default()
        };
        let primary = build_primary(&stats);
        assert_eq!(primary[1].value, "2.50");
        assert_eq!(primary[1].caption.as_deref(), Some("300 击杀 · 120 死亡"));
        assert_eq!(primary[2].value, "5.00");
        assert_eq!(primary[3].value, "75.0%");
        let secondary = build_secondary(&stats);
        assert_eq!(secondary[1].value, "25.0%");
        assert_eq!(secondary[2].value, "10.0%");
    }

    #[test]
    fn zero_wins_and_shots_render_zero_percent() {
        let stats = StatsSnapshot {
            wins: Some(0.0),
            loses: Some(0.0),
            shots_hit: Some(0.0),
            shots_fired: Some(0.0),
            ..StatsSnapshot::default()
        };
        assert_eq!(build_primary(&stats)[3].value, "0%");
        assert_eq!(build_secondary(&stats)[1].value, "0%");
    }

    #[test]
    fn top_weapons_are_stable_under_ties() {
        let weapons = vec![
            weapon("a", Some(5.0)),
            weapon("b", Some(9.0)),
            weapon("c", None),
            weapon("d", Some(5.0)),
            weapon("e", Some(9.0)),
            weapon("f", Some(f64::NAN)),
        ];
        let top = select_top_weapons(&weapons, 4);
        let names: Vec<_> = top
            .iter()
            .map(|w| w.weapon_name.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["b", "e", "a", "d"]);
    }

    #[test]
    fn top_weapons_returns_min_of_n_and_available() {
        let weapons: Vec<_> = (0..4).map(|i| weapon("w", Some(f64::from(i)))).collect();
        for n in 0..8 {
            assert_eq!(select_top_weapons(&weapons, n).len(), n.min(weapons.len()));
        }
        assert!(select_top_weapons(&[], 3).is_empty());
    }

    #[test]
    fn weapon_lines_fall_back_to_rank_level_and_na_accuracy() {
        let w = weapon("M4A1", Some(1234.0));
        let (title, info) = weapon_lines(&w, 1);
        assert_eq!(title, "M4A1 Lv.2");
        assert_eq!(info, "击杀 1234 · KPM 0.00 · 命中率 N/A");
    }
}
