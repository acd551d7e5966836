//! Emotion style table
//!
//! Maps classifier emotion labels to the display styling used when
//! rendering captions: a font family, light/dark theme colors, and an
//! emoji. Unknown labels have no style and render plain.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Display styling for one emotion label
#[derive(Debug, Clone, Copy)]
pub(crate) struct EmotionStyle {
    pub font_family: &'static str,
    pub light_color: &'static str,
    pub dark_color: &'static str,
    pub emoji: &'static str,
}

static EMOTION_STYLES: Lazy<HashMap<&'static str, EmotionStyle>> = Lazy::new(|| {
    HashMap::from([
        (
            "Anger",
            EmotionStyle {
                font_family: "Archivo Black",
                light_color: "#E53935",
                dark_color: "#FF7A70",
                emoji: "\u{1F621}",
            },
        ),
        (
            "Calm",
            EmotionStyle {
                font_family: "Source Serif 4",
                light_color: "#2A7FB8",
                dark_color: "#8ED1F2",
                emoji: "\u{1F60C}",
            },
        ),
        (
            "Disgust",
            EmotionStyle {
                font_family: "Jersey 10",
                light_color: "#7A8B3A",
                dark_color: "#B2C18A",
                emoji: "\u{1F922}",
            },
        ),
        (
            "Fear",
            EmotionStyle {
                font_family: "Red Hat Mono",
                light_color: "#6D28D9",
                dark_color: "#A78BFA",
                emoji: "\u{1F628}",
            },
        ),
        (
            "Happy",
            EmotionStyle {
                font_family: "Nunito",
                light_color: "#22C55E",
                dark_color: "#4ADE80",
                emoji: "\u{1F60A}",
            },
        ),
        (
            "Neutral",
            EmotionStyle {
                font_family: "Satoshi",
                light_color: "#111827",
                dark_color: "#F3F4F6",
                emoji: "\u{1F610}",
            },
        ),
        (
            "Sad",
            EmotionStyle {
                font_family: "Slackside One",
                light_color: "#1D4ED8",
                dark_color: "#3B82F6",
                emoji: "\u{1F622}",
            },
        ),
        (
            "Surprised",
            EmotionStyle {
                font_family: "Asap Condensed",
                light_color: "#F59E0B",
                dark_color: "#FCD34D",
                emoji: "\u{1F632}",
            },
        ),
    ])
});

/// Look up the style for an emotion label
pub(crate) fn style_for(label: &str) -> Option<&'static EmotionStyle> {
    EMOTION_STYLES.get(label)
}
