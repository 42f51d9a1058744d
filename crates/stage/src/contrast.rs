use seedconfig::Color;

/// 8-bit sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parses `#rgb` or `#rrggbb`; the leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let digit = |c: u8| -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        };
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = digit(bytes[0])?;
                let g = digit(bytes[1])?;
                let b = digit(bytes[2])?;
                Some(Self {
                    r: (r << 4) | r,
                    g: (g << 4) | g,
                    b: (b << 4) | b,
                })
            }
            6 => {
                let pair =
                    |i: usize| -> Option<u8> { Some((digit(bytes[i])? << 4) | digit(bytes[i + 1])?) };
                Some(Self {
                    r: pair(0)?,
                    g: pair(2)?,
                    b: pair(4)?,
                })
            }
            _ => None,
        }
    }

    /// WCAG relative luminance.
    pub fn relative_luminance(&self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = f64::from(c) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }
}

/// WCAG contrast ratio in `[1, 21]`, or `None` if either colour does not parse.
pub fn contrast_ratio(a: &Color, b: &Color) -> Option<f64> {
    let la = Rgb::from_hex(a.as_str())?.relative_luminance();
    let lb = Rgb::from_hex(b.as_str())?.relative_luminance();
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    Some((lighter + 0.05) / (darker + 0.05))
}

/// Picks the candidate with the highest WCAG contrast against `background`.
pub fn best_contrast<'a>(background: &Color, candidates: &'a [Color]) -> Option<&'a Color> {
    best_contrast_by(background, candidates, |bg, candidate| {
        contrast_ratio(bg, candidate).unwrap_or(0.0)
    })
}

/// Picks the candidate whose `ratio` against `background` is strictly greatest.
///
/// The first candidate reaching the maximum wins. Returns `None` only when
/// `candidates` is empty; if no ratio is positive the first candidate is used.
pub fn best_contrast_by<'a, F>(
    background: &Color,
    candidates: &'a [Color],
    mut ratio: F,
) -> Option<&'a Color>
where
    F: FnMut(&Color, &Color) -> f64,
{
    let mut best_idx = 0;
    let mut best = 0.0;
    for (idx, candidate) in candidates.iter().enumerate() {
        let value = ratio(background, candidate);
        if value > best {
            best = value;
            best_idx = idx;
        }
    }
    candidates.get(best_idx)
}
