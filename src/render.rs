//! Caption formatting for terminal output
//!
//! Applies the emotion style table to caption entries: an emoji prefix
//! when the emoticon toggle is on, and truecolor ANSI from the light or
//! dark palette when the colour toggle is on. Interim text renders
//! dimmed, the way the original shows not-yet-final "ghost" text.

use crate::captions::CaptionEntry;
use crate::preferences;
use crate::styles;

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

/// Display settings resolved from user preferences
#[derive(Debug, Clone, Copy)]
pub(crate) struct Renderer {
    pub emoticons: bool,
    pub colours: bool,
    pub dark_mode: bool,
}

impl Renderer {
    pub fn from_preferences() -> Self {
        Self {
            emoticons: preferences::get_show_emoticons(),
            colours: preferences::get_show_colours(),
            dark_mode: preferences::get_dark_mode(),
        }
    }

    /// Format one caption entry as a styled line
    pub fn caption_line(&self, entry: &CaptionEntry) -> String {
        let style = entry.emotion.as_deref().and_then(styles::style_for);

        let mut line = String::new();
        if self.emoticons {
            if let Some(style) = style {
                line.push_str(style.emoji);
                line.push(' ');
            }
        }

        let color = if self.colours {
            style.and_then(|s| {
                hex_to_ansi(if self.dark_mode {
                    s.dark_color
                } else {
                    s.light_color
                })
            })
        } else {
            None
        };

        match color {
            Some(code) => {
                line.push_str(&code);
                line.push_str(&entry.text);
                line.push_str(RESET);
            }
            None => line.push_str(&entry.text),
        }
        line
    }

    /// Format interim (ghost) text
    pub fn interim_line(&self, text: &str) -> String {
        format!("{DIM}{text}{RESET}")
    }
}

/// Convert a "#RRGGBB" hex color to an ANSI truecolor escape
fn hex_to_ansi(hex: &str) -> Option<String> {
    let hex = hex.strip_prefix('#')?;
    // Length is in bytes; the slices below would split a non-ASCII char
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(format!("\x1b[38;2;{r};{g};{b}m"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, emotion: Option<&str>) -> CaptionEntry {
        CaptionEntry {
            text: text.to_string(),
            emotion: emotion.map(str::to_string),
        }
    }

    #[test]
    fn test_hex_to_ansi() {
        assert_eq!(
            hex_to_ansi("#22C55E").as_deref(),
            Some("\x1b[38;2;34;197;94m")
        );
        assert!(hex_to_ansi("22C55E").is_none());
        assert!(hex_to_ansi("#22C5").is_none());
        assert!(hex_to_ansi("#GGGGGG").is_none());
        // Six bytes but not six ASCII digits; must not panic
        assert!(hex_to_ansi("#\u{e9}\u{e9}\u{e9}").is_none());
    }

    #[test]
    fn test_plain_line_when_toggles_off() {
        let renderer = Renderer {
            emoticons: false,
            colours: false,
            dark_mode: true,
        };
        assert_eq!(
            renderer.caption_line(&entry("hello", Some("Happy"))),
            "hello"
        );
    }

    #[test]
    fn test_emoji_prefix_when_enabled() {
        let renderer = Renderer {
            emoticons: true,
            colours: false,
            dark_mode: true,
        };
        let line = renderer.caption_line(&entry("hello", Some("Happy")));
        assert!(line.starts_with("\u{1F60A} "));
        assert!(line.ends_with("hello"));
    }

    #[test]
    fn test_colored_line_uses_theme_palette() {
        let renderer = Renderer {
            emoticons: false,
            colours: true,
            dark_mode: false,
        };
        let line = renderer.caption_line(&entry("hello", Some("Happy")));
        // Light palette for Happy is #22C55E
        assert!(line.contains("\x1b[38;2;34;197;94m"));
        assert!(line.ends_with(RESET));
    }

    #[test]
    fn test_unknown_emotion_renders_plain() {
        let renderer = Renderer {
            emoticons: true,
            colours: true,
            dark_mode: true,
        };
        assert_eq!(
            renderer.caption_line(&entry("hm", Some("Sarcastic"))),
            "hm"
        );
        assert_eq!(renderer.caption_line(&entry("hm", None)), "hm");
    }

    #[test]
    fn test_interim_line_is_dimmed() {
        let renderer = Renderer {
            emoticons: true,
            colours: true,
            dark_mode: true,
        };
        assert_eq!(renderer.interim_line("typing"), "\x1b[2mtyping\x1b[0m");
    }
}
