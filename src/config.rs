use crate::game::platform::Platform;
use crate::ui::card::{HEIGHT_RANGE, RenderConfig, WIDTH_RANGE};
use crate::ui::color::{DEFAULT_ACCENT_HEX, parse_hex_color};
use log::{LevelFilter, debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{LazyLock, Mutex, PoisonError};

const CONFIG_PATH: &str = "statcard.ini";
const OPTIONS: &str = "Options";

// --- Minimal INI reader ---
#[derive(Debug, Default)]
pub struct SimpleIni {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SimpleIni {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        self.parse(&content);
        Ok(())
    }

    pub fn parse(&mut self, content: &str) {
        self.sections.clear();
        let mut current_section = String::new();

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            // Section header: [SectionName]
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current_section = name.trim().to_string();
                self.sections.entry(current_section.clone()).or_default();
                continue;
            }

            // Key/value pair: key=value
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if key.is_empty() {
                    continue;
                }
                self.sections
                    .entry(current_section.clone())
                    .or_default()
                    .insert(key.to_string(), value.trim().to_string());
            }
        }
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section).and_then(|s| s.get(key)).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

// --- Clamp ranges ---
const PRIMARY_COLUMNS_RANGE: (u32, u32) = (1, 8);
const SECONDARY_COLUMNS_RANGE: (u32, u32) = (1, 6);
const TOP_WEAPONS_RANGE: (usize, usize) = (0, 10);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub default_platform: Platform,
    pub language: String,
    pub accent_color: String,
    pub card_width: u32,
    pub card_height: u32,
    pub primary_columns: u32,
    pub secondary_columns: u32,
    pub top_weapons: usize,
    pub enable_cache: bool,
    pub font_path: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_platform: Platform::Pc,
            language: "zh-CN".to_string(),
            accent_color: DEFAULT_ACCENT_HEX.to_string(),
            card_width: 800,
            card_height: 500,
            primary_columns: 6,
            secondary_columns: 3,
            top_weapons: 3,
            enable_cache: false,
            font_path: None,
            log_level: LogLevel::Warn,
        }
    }
}

impl Config {
    /// Builds a validated config from parsed INI data. Missing keys take
    /// defaults; malformed or out-of-range values are replaced and logged.
    pub fn from_ini(conf: &SimpleIni) -> Self {
        let default = Self::default();
        let opt = |key: &str| conf.get(OPTIONS, key).filter(|v| !v.is_empty());

        let default_platform = match opt("DefaultPlatform") {
            None => default.default_platform,
            Some(v) => Platform::from_alias(&v).unwrap_or_else(|| {
                warn!("Unknown DefaultPlatform '{v}', using '{}'.", default.default_platform);
                default.default_platform
            }),
        };
        let language = match opt("Language") {
            Some(v) if v.chars().count() >= 2 => v,
            Some(v) => {
                warn!("Language '{v}' is too short, using '{}'.", default.language);
                default.language.clone()
            }
            None => default.language.clone(),
        };
        let accent_color = match opt("AccentColor") {
            Some(v) if parse_hex_color(&v).is_some() => v,
            Some(v) => {
                warn!("AccentColor '{v}' is not #rgb or #rrggbb, using '{DEFAULT_ACCENT_HEX}'.");
                default.accent_color.clone()
            }
            None => default.accent_color.clone(),
        };

        Self {
            default_platform,
            language,
            accent_color,
            card_width: clamped(opt("CardWidth"), "CardWidth", default.card_width, WIDTH_RANGE),
            card_height: clamped(opt("CardHeight"), "CardHeight", default.card_height, HEIGHT_RANGE),
            primary_columns: clamped(
                opt("PrimaryMetricColumns"),
                "PrimaryMetricColumns",
                default.primary_columns,
                PRIMARY_COLUMNS_RANGE,
            ),
            secondary_columns: clamped(
                opt("SecondaryMetricColumns"),
                "SecondaryMetricColumns",
                default.secondary_columns,
                SECONDARY_COLUMNS_RANGE,
            ),
            top_weapons: clamped(opt("TopWeaponsCount"), "TopWeaponsCount", default.top_weapons, TOP_WEAPONS_RANGE),
            enable_cache: opt("EnableCache")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(default.enable_cache),
            font_path: opt("FontPath").map(PathBuf::from),
            log_level: opt("LogLevel")
                .and_then(|v| LogLevel::from_str(&v).ok())
                .unwrap_or(default.log_level),
        }
    }

    pub fn render_config(&self, player: &str, platform: Platform) -> RenderConfig {
        RenderConfig {
            player: player.to_string(),
            platform,
            accent_color: parse_hex_color(&self.accent_color),
            width: self.card_width,
            height: self.card_height,
            primary_columns: self.primary_columns,
            secondary_columns: self.secondary_columns,
            top_weapons: self.top_weapons,
        }
    }
}

fn clamped<T>(raw: Option<String>, key: &str, default: T, (lo, hi): (T, T)) -> T
where
    T: FromStr + Ord + Copy + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(v) if v < lo || v > hi => {
            let fixed = v.clamp(lo, hi);
            warn!("{key}={v} is outside {lo}..={hi}, using {fixed}.");
            fixed
        }
        Ok(v) => v,
        Err(_) => {
            warn!("{key}='{raw}' is not a number, using {default}.");
            default
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    let v = v.trim();
    if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("on") {
        Some(true)
    } else if v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no") || v.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        v.parse::<u8>().ok().map(|n| n != 0)
    }
}

static CONFIG: LazyLock<Mutex<Config>> = LazyLock::new(|| Mutex::new(Config::default()));

// --- File I/O ---

fn default_config_contents() -> String {
    let default = Config::default();
    let mut content = String::new();

    // [Options] section - keys in alphabetical order
    content.push_str("[Options]\n");
    content.push_str(&format!("AccentColor={}\n", default.accent_color));
    content.push_str(&format!("CardHeight={}\n", default.card_height));
    content.push_str(&format!("CardWidth={}\n", default.card_width));
    content.push_str(&format!("DefaultPlatform={}\n", default.default_platform));
    content.push_str(&format!(
        "EnableCache={}\n",
        if default.enable_cache { "1" } else { "0" }
    ));
    content.push_str("FontPath=\n");
    content.push_str(&format!("Language={}\n", default.language));
    content.push_str(&format!("LogLevel={}\n", default.log_level.as_str()));
    content.push_str(&format!("PrimaryMetricColumns={}\n", default.primary_columns));
    content.push_str(&format!("SecondaryMetricColumns={}\n", default.secondary_columns));
    content.push_str(&format!("TopWeaponsCount={}\n", default.top_weapons));
    content.push('\n');
    content
}

fn create_default_config_file() -> Result<(), std::io::Error> {
    info!("'{CONFIG_PATH}' not found, creating with default values.");
    std::fs::write(CONFIG_PATH, default_config_contents())
}

pub fn load() {
    if !Path::new(CONFIG_PATH).exists()
        && let Err(e) = create_default_config_file()
    {
        warn!("Failed to create default config file: {e}");
    }

    let mut conf = SimpleIni::new();
    let loaded = match conf.load(CONFIG_PATH) {
        Ok(()) => Config::from_ini(&conf),
        Err(e) => {
            warn!("Failed to read '{CONFIG_PATH}': {e}. Using defaults.");
            Config::default()
        }
    };
    debug!("Effective config: {loaded:?}");
    *CONFIG.lock().unwrap_or_else(PoisonError::into_inner) = loaded;
}

pub fn get() -> Config {
    CONFIG.lock().unwrap_or_else(PoisonError::into_inner).clone()
}
