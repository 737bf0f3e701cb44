//! Hex color parsing for the foreground/background render options.

/// Straight (unmultiplied) RGBA.
pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];
pub const WHITE: Rgba = [255, 255, 255, 255];

/// Default foreground color of a new request.
pub const DEFAULT_FG_COLOR: &str = "#FFFFFF";

/// Parses `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex(value: &str) -> Option<Rgba> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 | 4 => {
            let mut out = [0, 0, 0, 255];
            for (i, slot) in out.iter_mut().enumerate().take(hex.len()) {
                let n = nibble(i)?;
                *slot = n * 17;
            }
            Some(out)
        }
        6 | 8 => {
            let mut out = [0, 0, 0, 255];
            for (i, slot) in out.iter_mut().enumerate().take(hex.len() / 2) {
                *slot = byte(i * 2)?;
            }
            Some(out)
        }
        _ => None,
    }
}

/// Formats as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
pub fn to_hex(color: Rgba) -> String {
    let [r, g, b, a] = color;
    if a == 255 {
        format!("#{r:02X}{g:02X}{b:02X}")
    } else {
        format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
    }
}
