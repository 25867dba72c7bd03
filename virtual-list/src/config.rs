use core::fmt;
use core::str::FromStr;

pub const DEFAULT_OVERSCAN: usize = 2;
pub const DEFAULT_ESTIMATE_SIZE: f64 = 48.0;

/// The virtualized axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn is_horizontal(self) -> bool {
        self == Self::Horizontal
    }

    /// Style property that carries the extent along this axis.
    pub fn extent_property(self) -> &'static str {
        match self {
            Self::Vertical => "height",
            Self::Horizontal => "width",
        }
    }

    /// Style property that carries the extent across this axis.
    pub fn cross_property(self) -> &'static str {
        match self {
            Self::Vertical => "width",
            Self::Horizontal => "height",
        }
    }

    /// Formats a translation by `offset` pixels along this axis.
    pub fn translate(self, offset: u64) -> String {
        match self {
            Self::Vertical => format!("translate(0px, {offset}px)"),
            Self::Horizontal => format!("translate({offset}px, 0px)"),
        }
    }

    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("horizontal") {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        })
    }
}

/// The declarative attributes the element reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Overscan,
    EstimateSize,
    Orientation,
    PaddingStart,
    PaddingEnd,
    ScrollPaddingStart,
    ScrollPaddingEnd,
}

/// Attribute names in the order hosts should observe them.
pub const OBSERVED_ATTRIBUTES: [&str; 7] = [
    "overscan",
    "estimate-size",
    "orientation",
    "padding-start",
    "padding-end",
    "scroll-padding-start",
    "scroll-padding-end",
];

impl Attribute {
    pub const ALL: [Attribute; 7] = [
        Self::Overscan,
        Self::EstimateSize,
        Self::Orientation,
        Self::PaddingStart,
        Self::PaddingEnd,
        Self::ScrollPaddingStart,
        Self::ScrollPaddingEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Overscan => "overscan",
            Self::EstimateSize => "estimate-size",
            Self::Orientation => "orientation",
            Self::PaddingStart => "padding-start",
            Self::PaddingEnd => "padding-end",
            Self::ScrollPaddingStart => "scroll-padding-start",
            Self::ScrollPaddingEnd => "scroll-padding-end",
        }
    }
}

/// Returned when an attribute name is not one the element observes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownAttribute;

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.name() == s)
            .ok_or(UnknownAttribute)
    }
}

/// Element configuration derived from its attributes.
///
/// Malformed values never fail: each field falls back to its default (see [`Config::apply`]).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub orientation: Orientation,
    pub overscan: usize,
    /// Default per-item size in pixels, used until an item is measured.
    pub estimate_size: f64,
    pub padding_start: f64,
    pub padding_end: f64,
    pub scroll_padding_start: f64,
    pub scroll_padding_end: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            overscan: DEFAULT_OVERSCAN,
            estimate_size: DEFAULT_ESTIMATE_SIZE,
            padding_start: 0.0,
            padding_end: 0.0,
            scroll_padding_start: 0.0,
            scroll_padding_end: 0.0,
        }
    }
}

impl Config {
    /// Reads every observed attribute through `get`.
    pub fn from_attributes(mut get: impl FnMut(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        for attr in Attribute::ALL {
            config.apply(attr, get(attr.name()).as_deref());
        }
        config
    }

    /// Applies one attribute value (`None` means the attribute was removed).
    ///
    /// Returns `true` when the effective configuration changed.
    pub fn apply(&mut self, attr: Attribute, value: Option<&str>) -> bool {
        let prev = *self;
        match attr {
            Attribute::Overscan => self.overscan = parse_overscan(value),
            Attribute::EstimateSize => {
                self.estimate_size = parse_number(value)
                    .filter(|v| *v > 0.0)
                    .unwrap_or(DEFAULT_ESTIMATE_SIZE);
            }
            Attribute::Orientation => {
                self.orientation = value.map(Orientation::parse).unwrap_or_default();
            }
            Attribute::PaddingStart => self.padding_start = parse_padding(value),
            Attribute::PaddingEnd => self.padding_end = parse_padding(value),
            Attribute::ScrollPaddingStart => self.scroll_padding_start = parse_padding(value),
            Attribute::ScrollPaddingEnd => self.scroll_padding_end = parse_padding(value),
        }
        *self != prev
    }

    pub fn estimate_px(&self) -> u32 {
        to_px(self.estimate_size)
    }

    pub fn padding_px(&self) -> (u32, u32) {
        (to_px(self.padding_start), to_px(self.padding_end))
    }

    pub fn scroll_padding_px(&self) -> (u32, u32) {
        (to_px(self.scroll_padding_start), to_px(self.scroll_padding_end))
    }
}

/// Parses a finite number; anything else is `None`.
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_overscan(value: Option<&str>) -> usize {
    match parse_number(value) {
        // Negative clamps to zero rather than reverting to the default.
        Some(v) if v <= 0.0 => 0,
        Some(v) => v.trunc() as usize,
        None => DEFAULT_OVERSCAN,
    }
}

fn parse_padding(value: Option<&str>) -> f64 {
    parse_number(value).unwrap_or(0.0).max(0.0)
}

/// Rounds a pixel value to the engine's integer unit.
pub fn to_px(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round().min(u32::MAX as f64) as u32
}
