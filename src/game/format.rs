//! Display formatting for raw stat fields.
//!
//! Every function is total: absent, NaN, and infinite inputs are coerced to
//! zero and produce the function's zero string instead of "NaN"/"inf".

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86400.0;

pub const ZERO_PERCENT: &str = "0%";
const ZERO_HOURS_COARSE: &str = "0小时";
const ZERO_DURATION: &str = "0h";
const ZERO_DISTANCE: &str = "0m";

/// Coerce-or-default: the single entry point for numeric reads.
#[inline(always)]
pub fn finite_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Fixed-point rendering that rounds ties away from zero and never emits
/// a negative zero.
fn to_fixed(value: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits.min(15) as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        // Already integral at this magnitude; nothing left to round.
        return format!("{value:.digits$}");
    }
    let rounded = scaled.round() / scale;
    let rounded = if rounded == 0.0 || !rounded.is_finite() {
        0.0
    } else {
        rounded
    };
    format!("{rounded:.digits$}")
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Rounded integer with comma thousands separators ("1,234,567").
pub fn format_integer(value: Option<f64>) -> String {
    let n = finite_or_zero(value).round();
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = format!("{:.0}", n.abs());
    let grouped = group_thousands(&magnitude);
    if n < 0.0 { format!("-{grouped}") } else { grouped }
}

/// Rounded integer without grouping, used inside captions.
pub fn format_plain(value: Option<f64>) -> String {
    to_fixed(finite_or_zero(value), 0)
}

pub fn format_decimal(value: Option<f64>, digits: usize) -> String {
    to_fixed(finite_or_zero(value), digits)
}

/// Below 1,000 the rounded integer, then one-decimal `K` / `M` bands.
///
/// Bands are picked on the raw magnitude, so 999_999 lands in the `K` band
/// and renders as "1000.0K"; 1_000_000 is the first "1.0M".
pub fn format_abbreviated(value: Option<f64>) -> String {
    let n = finite_or_zero(value);
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if magnitude >= 1_000_000.0 {
        format!("{}M", to_fixed(n / 1_000_000.0, 1))
    } else if magnitude >= 1_000.0 {
        format!("{}K", to_fixed(n / 1_000.0, 1))
    } else {
        to_fixed(n, 0)
    }
}

/// `part / total` as a one-decimal percentage; "0%" when `total <= 0`.
/// Quotients past `f64::MAX` saturate there.
pub fn format_ratio_percent(part: Option<f64>, total: Option<f64>) -> String {
    let part = finite_or_zero(part);
    let total = finite_or_zero(total);
    if total <= 0.0 {
        return ZERO_PERCENT.to_string();
    }
    let pct = part / total * 100.0;
    if pct.is_nan() {
        return ZERO_PERCENT.to_string();
    }
    let pct = if pct.is_infinite() {
        f64::MAX.copysign(pct)
    } else {
        pct
    };
    format!("{}%", to_fixed(pct, 1))
}

pub fn format_distance(meters: Option<f64>) -> String {
    let m = finite_or_zero(meters);
    if m <= 0.0 {
        return ZERO_DISTANCE.to_string();
    }
    if m >= 1_000.0 {
        let km = m / 1_000.0;
        if km >= 1_000.0 {
            return format!("{}k KM", to_fixed(km / 1_000.0, 1));
        }
        return format!("{} KM", to_fixed(km, 1));
    }
    format!("{} m", to_fixed(m, 0))
}

/// Hours under a day, otherwise days plus (non-zero) remaining hours.
pub fn format_playtime_coarse(seconds: Option<f64>) -> String {
    let total = finite_or_zero(seconds);
    if total <= 0.0 {
        return ZERO_HOURS_COARSE.to_string();
    }
    let hours = total / SECONDS_PER_HOUR;
    if hours < 24.0 {
        return format!("{}小时", to_fixed(hours, 0));
    }
    // Days stay f64 so very large totals print in full instead of saturating.
    let mut days = (hours / 24.0).floor();
    let mut remain = (hours % 24.0).round() as u32;
    if remain >= 24 {
        days += 1.0;
        remain = 0;
    }
    if remain == 0 {
        format!("{days:.0}天")
    } else {
        format!("{days:.0}天{remain}小时")
    }
}

/// "3d 4h", "5h 12m", "12m"; minutes are dropped once days are shown.
pub fn format_duration_compact(seconds: Option<f64>) -> String {
    let total = finite_or_zero(seconds);
    if total <= 0.0 {
        return ZERO_DURATION.to_string();
    }
    let days = (total / SECONDS_PER_DAY).floor();
    let hours = ((total % SECONDS_PER_DAY) / SECONDS_PER_HOUR).floor() as u32;
    let minutes = ((total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE).floor() as u32;

    let mut parts: Vec<String> = Vec::with_capacity(3);
    if days > 0.0 {
        parts.push(format!("{days:.0}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if days == 0.0 && minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if parts.is_empty() {
        return ZERO_DURATION.to_string();
    }
    parts.join(" ")
}
