//! Token palette and UI colours: hex → ratatui Color, one style per token kind.

use puyotui::TokenKind;
use ratatui::style::Color;
use thiserror::Error;

use crate::Palette;

/// How a single token kind is drawn: a colour and a two-column glyph, so
/// kinds stay distinguishable once the palette runs out of clear hues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStyle {
    pub color: Color,
    pub glyph: &'static str,
}

#[derive(Debug, Clone)]
pub struct Theme {
    /// Indexed by `TokenKind`; its length is how many kinds the UI can show.
    pub tokens: Vec<TokenStyle>,
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, difficulty).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key hints).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// One Dark-ish hues first, so beginner/intermediate games get the most
/// distinct colours; the tail relies more on the glyph.
const NORMAL_TOKENS: [(&str, &str); 20] = [
    ("#E06C75", "()"),
    ("#61AFEF", "[]"),
    ("#98C379", "<>"),
    ("#E5C07B", "{}"),
    ("#C678DD", "@@"),
    ("#56B6C2", "##"),
    ("#D19A66", "$$"),
    ("#BE5046", "%%"),
    ("#528BFF", "&&"),
    ("#7EC16E", "**"),
    ("#F0A45D", "++"),
    ("#A9A1E1", "=="),
    ("#4DB5BD", "~~"),
    ("#FF6AC1", "//"),
    ("#ABB2BF", "\\\\"),
    ("#E2B86B", "^^"),
    ("#73C991", "oo"),
    ("#FF8C8C", "xx"),
    ("#8CAAEE", "::"),
    ("#C8AE9D", "!!"),
];

const HIGH_CONTRAST_TOKENS: [(&str, &str); 20] = [
    ("#FF0000", "()"),
    ("#0088FF", "[]"),
    ("#00FF00", "<>"),
    ("#FFFF00", "{}"),
    ("#FF00FF", "@@"),
    ("#00FFFF", "##"),
    ("#FF8800", "$$"),
    ("#FFFFFF", "%%"),
    ("#FF0000", "&&"),
    ("#0088FF", "**"),
    ("#00FF00", "++"),
    ("#FFFF00", "=="),
    ("#FF00FF", "~~"),
    ("#00FFFF", "//"),
    ("#FF8800", "\\\\"),
    ("#FFFFFF", "^^"),
    ("#FF0000", "oo"),
    ("#0088FF", "xx"),
    ("#00FF00", "::"),
    ("#FFFF00", "!!"),
];

impl Theme {
    pub fn for_palette(palette: Palette) -> Result<Self, ThemeError> {
        match palette {
            Palette::Normal => Ok(Self {
                tokens: token_styles(&NORMAL_TOKENS)?,
                bg: parse_hex("#282C34")?,
                div_line: parse_hex("#3F444F")?,
                main_fg: parse_hex("#ABB2BF")?,
                title: parse_hex("#E5C07B")?,
                inactive_fg: parse_hex("#5C6370")?,
            }),
            Palette::HighContrast => Ok(Self {
                tokens: token_styles(&HIGH_CONTRAST_TOKENS)?,
                bg: Color::Black,
                div_line: Color::White,
                main_fg: Color::White,
                title: Color::Yellow,
                inactive_fg: Color::Gray,
            }),
        }
    }

    /// Number of token kinds this theme can draw.
    #[inline]
    pub fn token_kinds(&self) -> usize {
        self.tokens.len()
    }

    /// Style for a token kind; wraps if the engine hands out more kinds
    /// than configured, which validation already rules out.
    #[inline]
    pub fn token(&self, kind: TokenKind) -> TokenStyle {
        self.tokens[kind.index() % self.tokens.len()]
    }
}

fn token_styles(table: &[(&str, &'static str)]) -> Result<Vec<TokenStyle>, ThemeError> {
    table
        .iter()
        .map(|&(hex, glyph)| {
            Ok(TokenStyle {
                color: parse_hex(hex)?,
                glyph,
            })
        })
        .collect()
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>, scale: u8| {
        s.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .map(|v| v * scale)
            .ok_or_else(|| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2, 1)?, channel(2..4, 1)?, channel(4..6, 1)?),
        3 => (channel(0..1, 17)?, channel(1..2, 17)?, channel(2..3, 17)?),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_every_palette_covers_advanced() {
        for palette in [Palette::Normal, Palette::HighContrast] {
            let theme = Theme::for_palette(palette).unwrap();
            assert!(theme.token_kinds() >= puyotui::Difficulty::Advanced.token_kinds());
        }
    }

    #[test]
    fn test_glyphs_are_distinct_and_two_wide() {
        let theme = Theme::for_palette(Palette::Normal).unwrap();
        let mut glyphs: Vec<_> = theme.tokens.iter().map(|t| t.glyph).collect();
        assert!(glyphs.iter().all(|g| g.chars().count() == 2));
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), theme.token_kinds());
    }
}
