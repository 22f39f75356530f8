use serde::{Deserialize, Deserializer};
use serde_json::Value;

// --- Lenient field coercion ---
//
// The stats service is loosely typed: numbers sometimes arrive as strings,
// fields go missing or turn into null. Every field below is optional and
// anything that doesn't coerce cleanly is treated as absent.

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_string(&value))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        _ => None,
    })
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|v| coerce_string(v).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_weapons<'de, D>(deserializer: D) -> Result<Option<Vec<WeaponRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|v| serde_json::from_value::<WeaponRecord>(v).ok())
                .collect(),
        ),
        _ => None,
    })
}

pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

pub(crate) fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One entry of the snapshot's weapon list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub weapon_name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub alt_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kills: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kills_per_minute: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub accuracy: Option<String>,
}

impl WeaponRecord {
    #[inline(always)]
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_deref().or(self.alt_image.as_deref())
    }

    /// Explicit `level`, else a numeric `type`, else `None`.
    pub fn display_level(&self) -> Option<u32> {
        self.level
            .or_else(|| self.kind.as_deref().and_then(|k| k.trim().parse::<f64>().ok()))
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v.round() as u32)
    }
}

/// Point-in-time stats record for one player. Read-only after parsing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub has_results: Option<bool>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub errors: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub persona_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rank: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rank_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rank_img: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub best_class_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub best_class: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub seconds_played: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kills: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub deaths: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kill_death: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kills_per_minute: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score_per_minute: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wins: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub loses: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub win_percent: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub matches_played: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub damage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub damage_dealt: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub accuracy: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub shots_hit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub shots_fired: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub headshots: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub headshots_percent: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub melee_kills: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub highest_kill_streak: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance_traveled: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance_travelled: Option<f64>,

    #[serde(default, deserialize_with = "lenient_weapons")]
    pub weapons: Option<Vec<WeaponRecord>>,
}

impl StatsSnapshot {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn total_damage(&self) -> Option<f64> {
        self.damage.or(self.damage_dealt)
    }

    pub fn total_distance(&self) -> Option<f64> {
        self.distance_traveled.or(self.distance_travelled)
    }

    pub fn best_class_label(&self) -> Option<&str> {
        self.best_class_name.as_deref().or(self.best_class.as_deref())
    }

    /// Title shown on the card; falls back to the name the caller queried.
    pub fn display_name<'a>(&'a self, queried: &'a str) -> &'a str {
        self.user_name
            .as_deref()
            .or(self.persona_name.as_deref())
            .unwrap_or(queried)
    }

    pub fn rank_label(&self) -> String {
        if let Some(name) = self.rank_name.as_deref() {
            return name.to_string();
        }
        match self.rank {
            Some(r) => format!("#{}", r.round() as i64),
            None => "未知".to_string(),
        }
    }

    pub fn weapons(&self) -> &[WeaponRecord] {
        self.weapons.as_deref().unwrap_or(&[])
    }
}
