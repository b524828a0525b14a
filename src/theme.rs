//! Color and typography themes, and the dark/light appearance.

use std::fmt;
use std::str::FromStr;

use log::warn;
use thiserror::Error;

use crate::store::{PreferenceStore, APPEARANCE_KEY, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeId {
    Terminal,
    Minimal,
    Cyber,
    Soft,
}

static THEME_ORDER: [ThemeId; 4] = [
    ThemeId::Terminal,
    ThemeId::Minimal,
    ThemeId::Cyber,
    ThemeId::Soft,
];

impl ThemeId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::Minimal => "minimal",
            Self::Cyber => "cyber",
            Self::Soft => "soft",
        }
    }

    pub fn ordered() -> &'static [ThemeId] {
        &THEME_ORDER
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme `{0}`")]
pub struct UnknownTheme(pub String);

impl FromStr for ThemeId {
    type Err = UnknownTheme;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        THEME_ORDER
            .iter()
            .copied()
            .find(|id| id.as_str() == raw)
            .ok_or_else(|| UnknownTheme(raw.to_owned()))
    }
}

#[derive(Debug)]
pub struct ThemeDescriptor {
    pub id: ThemeId,
    pub display_name: &'static str,
    pub tagline: &'static str,
    pub description: &'static str,
    pub font_family: &'static str,
    pub font_mono: &'static str,
    pub palette: [&'static str; 8],
}

const INTER: &str = r#""Inter", system-ui, sans-serif"#;
const JETBRAINS: &str = r#""JetBrains Mono", monospace"#;

static TERMINAL: ThemeDescriptor = ThemeDescriptor {
    id: ThemeId::Terminal,
    display_name: "Terminal",
    tagline: "Enter the command line",
    description: "Retro hacker aesthetic. CLI-inspired, monospace everything.",
    font_family: r#""JetBrains Mono", "Fira Code", monospace"#,
    font_mono: JETBRAINS,
    palette: [
        "#cc241d", "#98971a", "#d79921", "#458588", "#b16286", "#689d6a", "#fe8019", "#fabd2f",
    ],
};

static MINIMAL: ThemeDescriptor = ThemeDescriptor {
    id: ThemeId::Minimal,
    display_name: "Minimal",
    tagline: "Less is more",
    description: "Clean Scandinavian design. Whitespace, elegance, calm.",
    font_family: INTER,
    font_mono: JETBRAINS,
    palette: [
        "#8fbcbb", "#88c0d0", "#81a1c1", "#5e81ac", "#a3be8c", "#ebcb8b", "#d08770", "#bf616a",
    ],
};

static CYBER: ThemeDescriptor = ThemeDescriptor {
    id: ThemeId::Cyber,
    display_name: "Cyber",
    tagline: "Welcome to the grid",
    description: "Neon futuristic. Bold, high-contrast, electric.",
    font_family: INTER,
    font_mono: JETBRAINS,
    palette: [
        "#ff79c6", "#bd93f9", "#8be9fd", "#50fa7b", "#ffb86c", "#ff5555", "#f1fa8c", "#6272a4",
    ],
};

static SOFT: ThemeDescriptor = ThemeDescriptor {
    id: ThemeId::Soft,
    display_name: "Soft",
    tagline: "Cozy and warm",
    description: "Pastel comfort. Friendly, approachable, inviting.",
    font_family: INTER,
    font_mono: JETBRAINS,
    palette: [
        "#f5c2e7", "#cba6f7", "#f38ba8", "#eba0ac", "#fab387", "#f9e2af", "#a6e3a1", "#94e2d5",
    ],
};

pub fn describe_theme(id: ThemeId) -> &'static ThemeDescriptor {
    match id {
        ThemeId::Terminal => &TERMINAL,
        ThemeId::Minimal => &MINIMAL,
        ThemeId::Cyber => &CYBER,
        ThemeId::Soft => &SOFT,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Appearance {
    #[default]
    Dark,
    Light,
}

/// Background tokens the visualizers paint against.
#[derive(Debug, PartialEq, Eq)]
pub struct SurfaceTokens {
    pub bg0: &'static str,
    pub bg1: &'static str,
    pub bg2: &'static str,
    /// Near-transparent fill used to fade trails each frame.
    pub fade: &'static str,
    pub fg1: &'static str,
    pub gray: &'static str,
}

static DARK_TOKENS: SurfaceTokens = SurfaceTokens {
    bg0: "#1d2021",
    bg1: "#3c3836",
    bg2: "#504945",
    fade: "rgba(29, 32, 33, 0.02)",
    fg1: "#ebdbb2",
    gray: "#928374",
};

static LIGHT_TOKENS: SurfaceTokens = SurfaceTokens {
    bg0: "#f9f5d7",
    bg1: "#ebdbb2",
    bg2: "#d5c4a1",
    fade: "rgba(249, 245, 215, 0.02)",
    fg1: "#3c3836",
    gray: "#928374",
};

static DARK_STROKES: [&str; 7] = [
    "#fb4934", "#b8bb26", "#fabd2f", "#83a598", "#d3869b", "#8ec07c", "#928374",
];

static LIGHT_STROKES: [&str; 7] = [
    "#cc241d", "#98971a", "#d79921", "#458588", "#b16286", "#689d6a", "#928374",
];

impl Appearance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn tokens(self) -> &'static SurfaceTokens {
        match self {
            Self::Dark => &DARK_TOKENS,
            Self::Light => &LIGHT_TOKENS,
        }
    }

    /// Stroke colors for visualizer agents and particles.
    pub fn strokes(self) -> &'static [&'static str] {
        match self {
            Self::Dark => &DARK_STROKES,
            Self::Light => &LIGHT_STROKES,
        }
    }
}

pub fn hydrate_theme(raw: Option<&str>) -> ThemeId {
    raw.and_then(|value| value.parse().ok())
        .unwrap_or(THEME_ORDER[0])
}

pub fn hydrate_appearance(raw: Option<&str>) -> Appearance {
    raw.and_then(Appearance::parse).unwrap_or_default()
}

pub struct ThemeRuntime {
    store: Option<Box<dyn PreferenceStore>>,
    current: ThemeId,
    appearance: Appearance,
    /// Set once the user has chosen an appearance; system changes are
    /// ignored from then on.
    appearance_saved: bool,
}

impl ThemeRuntime {
    pub fn new(store: Box<dyn PreferenceStore>) -> Self {
        let theme = store.get(THEME_KEY);
        let appearance = store.get(APPEARANCE_KEY);
        let current = hydrate_theme(theme.as_deref());
        if let Some(raw) = theme.as_deref().filter(|raw| *raw != current.as_str()) {
            warn!("ignoring unrecognized theme preference `{raw}`");
        }
        Self {
            store: Some(store),
            current,
            appearance: hydrate_appearance(appearance.as_deref()),
            appearance_saved: appearance.as_deref().and_then(Appearance::parse).is_some(),
        }
    }

    pub fn detached() -> Self {
        Self {
            store: None,
            current: THEME_ORDER[0],
            appearance: Appearance::default(),
            appearance_saved: false,
        }
    }

    pub fn current(&self) -> ThemeId {
        self.current
    }

    pub fn descriptor(&self) -> &'static ThemeDescriptor {
        describe_theme(self.current)
    }

    pub fn appearance(&self) -> Appearance {
        self.appearance
    }

    pub fn set_theme(&mut self, theme: ThemeId) {
        self.current = theme;
        self.persist(THEME_KEY, theme.as_str());
    }

    pub fn cycle_theme(&mut self) {
        let next = THEME_ORDER
            .iter()
            .position(|&id| id == self.current)
            .map_or(0, |idx| (idx + 1) % THEME_ORDER.len());
        self.set_theme(THEME_ORDER[next]);
    }

    pub fn set_appearance(&mut self, appearance: Appearance) {
        self.appearance = appearance;
        self.appearance_saved = true;
        self.persist(APPEARANCE_KEY, appearance.as_str());
    }

    pub fn toggle_appearance(&mut self) {
        self.set_appearance(self.appearance.toggled());
    }

    /// Track the system color scheme until the user picks an appearance.
    /// Returns `true` if the appearance was updated.
    pub fn follow_system(&mut self, prefers_dark: bool) -> bool {
        if self.appearance_saved {
            return false;
        }
        self.appearance = if prefers_dark {
            Appearance::Dark
        } else {
            Appearance::Light
        };
        true
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.set(key, value) {
                warn!("could not persist {key}: {err}");
            }
        }
    }
}
