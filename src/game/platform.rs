use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Pc,
    Ps,
    Xbox,
}

impl Platform {
    /// Code sent to the stats service.
    pub const fn api_code(self) -> &'static str {
        match self {
            Self::Pc => "pc",
            Self::Ps => "ps",
            Self::Xbox => "xbox",
        }
    }

    /// Upper-case tag printed in the card header.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Pc => "PC",
            Self::Ps => "PS",
            Self::Xbox => "XBOX",
        }
    }

    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias.trim().to_ascii_lowercase().as_str() {
            "pc" | "steam" | "origin" => Some(Self::Pc),
            "playstation" | "ps" | "psn" | "ps4" | "ps5" => Some(Self::Ps),
            "xbox" | "xbl" | "xb" | "xboxone" | "xboxseries" => Some(Self::Xbox),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_code())
    }
}

/// Absent or blank input selects `fallback`; unknown aliases are `None`.
pub fn resolve_platform(input: Option<&str>, fallback: Platform) -> Option<Platform> {
    match input.map(str::trim) {
        None | Some("") => Some(fallback),
        Some(alias) => Platform::from_alias(alias),
    }
}
