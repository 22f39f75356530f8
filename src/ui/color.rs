/// Accepts "#rgb", "#rgba", "#rrggbb", "#rrggbbaa" (or without '#').
/// Panics on invalid input; use only with trusted literals.
/// Evaluated at COMPILE TIME if assigned to a const/static.
pub const fn rgba_hex(s: &str) -> [f32; 4] {
    let bytes = s.as_bytes();

    // Handle optional '#' by offsetting start index
    let (bytes, len) = if !bytes.is_empty() && bytes[0] == b'#' {
        let (_, rem) = bytes.split_at(1);
        (rem, s.len() - 1)
    } else {
        (bytes, s.len())
    };

    const fn val(b: u8) -> u8 {
        match hex_digit(b) {
            Some(v) => v,
            None => panic!("invalid hex digit in color string"),
        }
    }

    const fn byte2(h: u8, l: u8) -> u8 {
        (val(h) << 4) | val(l)
    }

    // Expand 4-bit color to 8-bit (e.g. F -> FF)
    const fn rep(n: u8) -> u8 {
        (val(n) << 4) | val(n)
    }

    let (r, g, b, a) = match len {
        3 => (rep(bytes[0]), rep(bytes[1]), rep(bytes[2]), 0xFF),
        4 => (rep(bytes[0]), rep(bytes[1]), rep(bytes[2]), rep(bytes[3])),
        6 => (
            byte2(bytes[0], bytes[1]),
            byte2(bytes[2], bytes[3]),
            byte2(bytes[4], bytes[5]),
            0xFF,
        ),
        8 => (
            byte2(bytes[0], bytes[1]),
            byte2(bytes[2], bytes[3]),
            byte2(bytes[4], bytes[5]),
            byte2(bytes[6], bytes[7]),
        ),
        _ => panic!("color hex string must be 3, 4, 6, or 8 digits"),
    };

    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    ]
}

#[inline(always)]
const fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(10 + (b - b'a')),
        b'A'..=b'F' => Some(10 + (b - b'A')),
        _ => None,
    }
}

/// Runtime counterpart of [`rgba_hex`] for caller-supplied colors.
/// Only "#rgb" and "#rrggbb" are accepted; anything else is `None`.
pub fn parse_hex_color(s: &str) -> Option<[f32; 4]> {
    let digits = s.trim().strip_prefix('#')?;
    let nibbles: Vec<u8> = digits.bytes().map(hex_digit).collect::<Option<_>>()?;
    let (r, g, b) = match nibbles[..] {
        [r, g, b] => ((r << 4) | r, (g << 4) | g, (b << 4) | b),
        [r1, r0, g1, g0, b1, b0] => ((r1 << 4) | r0, (g1 << 4) | g0, (b1 << 4) | b0),
        _ => return None,
    };
    Some([
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        1.0,
    ])
}

#[inline(always)]
pub const fn with_alpha(c: [f32; 4], alpha: f32) -> [f32; 4] {
    [c[0], c[1], c[2], alpha]
}

/* =========================== CARD PALETTE =========================== */

pub const DEFAULT_ACCENT_HEX: &str = "#2563eb";
pub const DEFAULT_ACCENT: [f32; 4] = rgba_hex(DEFAULT_ACCENT_HEX);

pub const BACKGROUND_TOP: [f32; 4] = rgba_hex("#050b16");
pub const BACKGROUND_BOTTOM: [f32; 4] = rgba_hex("#00040a");
pub const PANEL: [f32; 4] = rgba_hex("#0f172a");
pub const PANEL_EMPHASIS: [f32; 4] = rgba_hex("#111c2d");
pub const PANEL_MUTED: [f32; 4] = rgba_hex("#1e293b");
pub const GUIDE_LINE: [f32; 4] = rgba_hex("#1f2937");
pub const BADGE_TEXT: [f32; 4] = rgba_hex("#0b1220");

pub const TEXT_TITLE: [f32; 4] = rgba_hex("#f8fafc");
pub const TEXT_STRONG: [f32; 4] = rgba_hex("#f1f5f9");
pub const TEXT_LABEL: [f32; 4] = rgba_hex("#94a3b8");
pub const TEXT_CAPTION: [f32; 4] = rgba_hex("#cbd5f5");
pub const TEXT_MUTED: [f32; 4] = rgba_hex("#64748b");
pub const TEXT_FOOTER: [f32; 4] = rgba_hex("#475569");
