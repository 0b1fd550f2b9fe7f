// Exhibit configuration: one parameter set instead of one program per
// cabinet. Presets capture the known hardware revisions; a key=value
// text file (# comments, unknown keys ignored) overrides single fields.

use core::fmt;

use embedded_graphics::pixelcolor::Rgb888;

pub const MAX_STRIP_LEDS: u16 = 64;

/// Electrical level that means "ring is touching".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Pin level (true = high) read while the contact is closed.
    pub const fn active_level(self) -> bool {
        matches!(self, Polarity::ActiveHigh)
    }

    pub const fn is_active(self, level_high: bool) -> bool {
        level_high == self.active_level()
    }
}

/// What brings a result screen back to the attract screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    Delay,
    Touch,
    DelayOrTouch,
}

impl RestartPolicy {
    pub const fn uses_delay(self) -> bool {
        matches!(self, RestartPolicy::Delay | RestartPolicy::DelayOrTouch)
    }

    pub const fn uses_touch(self) -> bool {
        matches!(self, RestartPolicy::Touch | RestartPolicy::DelayOrTouch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Plates and wire pull the line high on contact.
    Classic,
    /// Inputs on internal pull-ups, contact pulls to ground.
    Pullup,
    /// Visitors tap the screen to play again.
    Touch,
}

impl Preset {
    pub const fn name(self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Pullup => "pullup",
            Preset::Touch => "touch",
        }
    }

    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"classic" => Some(Preset::Classic),
            b"pullup" => Some(Preset::Pullup),
            b"touch" => Some(Preset::Touch),
            _ => None,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// DFPlayer folder/track for one clip (`/01/002.mp3` = folder 1, track 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipBinding {
    pub folder: u8,
    pub track: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipBindings {
    pub win: ClipBinding,
    pub lose: ClipBinding,
    pub timeout: ClipBinding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorColors {
    pub idle: Rgb888,
    pub ready: Rgb888,
    pub win: Rgb888,
    pub lose: Rgb888,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub preset: Preset,
    pub polarity: Polarity,
    pub debounce_ms: u32,
    pub timeout_ms: u32,
    pub restart: RestartPolicy,
    pub restart_delay_ms: u32,
    pub abandon_ms: u32,
    pub countdown_refresh_ms: u32,
    pub game_tick_ms: u32,
    pub animation_ms: u32,
    pub pulse_step_ms: u32,
    pub brightness: u8,
    pub volume: u8, // DFPlayer scale, 0..=30
    pub strip_leds: u16,
    pub indicator_leds: u16,
    pub clips: ClipBindings,
    pub colors: IndicatorColors,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::preset(Preset::Classic)
    }
}

impl GameConfig {
    pub const fn preset(preset: Preset) -> Self {
        let base = Self {
            preset,
            polarity: Polarity::ActiveHigh,
            debounce_ms: 30,
            timeout_ms: 60_000,
            restart: RestartPolicy::Delay,
            restart_delay_ms: 7_000,
            abandon_ms: 2_000,
            countdown_refresh_ms: 100,
            game_tick_ms: 10,
            animation_ms: 5,
            pulse_step_ms: 15,
            brightness: 128,
            volume: 22,
            strip_leds: 30,
            indicator_leds: 8,
            clips: ClipBindings {
                win: ClipBinding { folder: 1, track: 1 },
                lose: ClipBinding { folder: 1, track: 2 },
                timeout: ClipBinding { folder: 1, track: 3 },
            },
            colors: IndicatorColors {
                idle: Rgb888::new(0, 104, 184),
                ready: Rgb888::new(255, 128, 0),
                win: Rgb888::new(0, 255, 0),
                lose: Rgb888::new(255, 0, 0),
            },
        };

        match preset {
            Preset::Classic => base,
            Preset::Pullup => Self {
                polarity: Polarity::ActiveLow,
                debounce_ms: 10,
                restart_delay_ms: 2_000,
                ..base
            },
            Preset::Touch => Self {
                restart: RestartPolicy::DelayOrTouch,
                restart_delay_ms: 30_000,
                ..base
            },
        }
    }

    /// Clamp every field into a range the hardware and the game can honour.
    pub fn sanitize(&mut self) {
        self.debounce_ms = self.debounce_ms.clamp(5, 100);
        self.timeout_ms = self.timeout_ms.clamp(5_000, 600_000);
        self.restart_delay_ms = self.restart_delay_ms.clamp(500, 120_000);
        self.abandon_ms = self.abandon_ms.clamp(500, 60_000);
        self.countdown_refresh_ms = self.countdown_refresh_ms.clamp(50, 1_000);
        self.game_tick_ms = self.game_tick_ms.clamp(1, 50);
        self.animation_ms = self.animation_ms.clamp(1, 100);
        self.pulse_step_ms = self.pulse_step_ms.clamp(1, 100);
        self.volume = self.volume.min(30);
        self.strip_leds = self.strip_leds.clamp(1, MAX_STRIP_LEDS);
        self.indicator_leds = self.indicator_leds.clamp(1, MAX_STRIP_LEDS);
    }
}

// Text format parser

fn trim(s: &[u8]) -> &[u8] {
    let mut start = 0;
    let mut end = s.len();
    while start < end && matches!(s[start], b' ' | b'\t' | b'\r') {
        start += 1;
    }
    while end > start && matches!(s[end - 1], b' ' | b'\t' | b'\r') {
        end -= 1;
    }
    &s[start..end]
}

fn parse_u32(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut val: u32 = 0;
    for &b in s {
        if !b.is_ascii_digit() {
            return None;
        }
        val = val.checked_mul(10)?.checked_add((b - b'0') as u32)?;
    }
    Some(val)
}

fn parse_u8(s: &[u8]) -> Option<u8> {
    parse_u32(s).and_then(|v| u8::try_from(v).ok())
}

// "1/2" -> folder 1, track 2
fn parse_clip(s: &[u8]) -> Option<ClipBinding> {
    let slash = s.iter().position(|&b| b == b'/')?;
    Some(ClipBinding {
        folder: parse_u8(trim(&s[..slash]))?,
        track: parse_u8(trim(&s[slash + 1..]))?,
    })
}

// "255,128,0"
fn parse_rgb(s: &[u8]) -> Option<Rgb888> {
    let mut parts = s.split(|&b| b == b',').map(trim);
    let r = parse_u8(parts.next()?)?;
    let g = parse_u8(parts.next()?)?;
    let b = parse_u8(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rgb888::new(r, g, b))
}

fn set<T>(field: &mut T, key: &[u8], parsed: Option<T>) {
    match parsed {
        Some(v) => *field = v,
        None => log::warn!(
            "config: bad value for {}",
            core::str::from_utf8(key).unwrap_or("?")
        ),
    }
}

fn apply_setting(key: &[u8], val: &[u8], c: &mut GameConfig) {
    match key {
        b"polarity" => {
            let parsed = match val {
                b"high" => Some(Polarity::ActiveHigh),
                b"low" => Some(Polarity::ActiveLow),
                _ => None,
            };
            set(&mut c.polarity, key, parsed);
        }
        b"restart" => {
            let parsed = match val {
                b"delay" => Some(RestartPolicy::Delay),
                b"touch" => Some(RestartPolicy::Touch),
                b"either" => Some(RestartPolicy::DelayOrTouch),
                _ => None,
            };
            set(&mut c.restart, key, parsed);
        }
        b"debounce_ms" => set(&mut c.debounce_ms, key, parse_u32(val)),
        b"timeout_ms" => set(&mut c.timeout_ms, key, parse_u32(val)),
        b"restart_ms" => set(&mut c.restart_delay_ms, key, parse_u32(val)),
        b"abandon_ms" => set(&mut c.abandon_ms, key, parse_u32(val)),
        b"countdown_ms" => set(&mut c.countdown_refresh_ms, key, parse_u32(val)),
        b"game_tick_ms" => set(&mut c.game_tick_ms, key, parse_u32(val)),
        b"animation_ms" => set(&mut c.animation_ms, key, parse_u32(val)),
        b"pulse_ms" => set(&mut c.pulse_step_ms, key, parse_u32(val)),
        b"brightness" => set(&mut c.brightness, key, parse_u8(val)),
        b"volume" => set(&mut c.volume, key, parse_u8(val)),
        b"strip_leds" => set(
            &mut c.strip_leds,
            key,
            parse_u32(val).and_then(|v| u16::try_from(v).ok()),
        ),
        b"indicator_leds" => set(
            &mut c.indicator_leds,
            key,
            parse_u32(val).and_then(|v| u16::try_from(v).ok()),
        ),
        b"clip_win" => set(&mut c.clips.win, key, parse_clip(val)),
        b"clip_lose" => set(&mut c.clips.lose, key, parse_clip(val)),
        b"clip_timeout" => set(&mut c.clips.timeout, key, parse_clip(val)),
        b"color_idle" => set(&mut c.colors.idle, key, parse_rgb(val)),
        b"color_ready" => set(&mut c.colors.ready, key, parse_rgb(val)),
        b"color_win" => set(&mut c.colors.win, key, parse_rgb(val)),
        b"color_lose" => set(&mut c.colors.lose, key, parse_rgb(val)),
        b"preset" => {} // consumed before the other keys
        _ => {}         // unknown keys silently ignored for forward compat
    }
}

fn settings(data: &[u8]) -> impl Iterator<Item = (&[u8], &[u8])> {
    data.split(|&b| b == b'\n').filter_map(|line| {
        let line = trim(line);
        if line.is_empty() || line[0] == b'#' {
            return None;
        }
        let eq = line.iter().position(|&b| b == b'=')?;
        Some((trim(&line[..eq]), trim(&line[eq + 1..])))
    })
}

/// Build a config from the text file: `preset=` picks the base values,
/// every other key overrides one field, then the result is sanitized.
pub fn parse_config(data: &[u8]) -> GameConfig {
    let preset = settings(data)
        .filter(|(key, _)| *key == b"preset")
        .filter_map(|(_, val)| {
            let preset = Preset::from_name(val);
            if preset.is_none() {
                log::warn!("config: unknown preset, keeping classic");
            }
            preset
        })
        .last()
        .unwrap_or(Preset::Classic);

    let mut config = GameConfig::preset(preset);
    for (key, val) in settings(data) {
        apply_setting(key, val, &mut config);
    }
    config.sanitize();
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_classic_defaults() {
        let config = parse_config(b"");
        assert_eq!(config, GameConfig::preset(Preset::Classic));
        assert_eq!(config.polarity, Polarity::ActiveHigh);
        assert_eq!(config.timeout_ms, 60_000);
        assert_eq!(config.restart_delay_ms, 7_000);
    }

    #[test]
    fn preset_applies_before_overrides_regardless_of_order() {
        let config = parse_config(b"restart_ms = 4000\npreset=pullup\n");
        assert_eq!(config.preset, Preset::Pullup);
        assert_eq!(config.polarity, Polarity::ActiveLow);
        assert_eq!(config.debounce_ms, 10);
        assert_eq!(config.restart_delay_ms, 4_000);
    }

    #[test]
    fn touch_preset_restarts_on_touch_or_delay() {
        let config = parse_config(b"preset=touch");
        assert!(config.restart.uses_touch());
        assert!(config.restart.uses_delay());
        assert_eq!(config.restart_delay_ms, 30_000);
    }

    #[test]
    fn comments_blank_lines_and_unknown_keys_are_ignored() {
        let text = b"# cabinet 2\n\n  timeout_ms=45000  \r\nfavourite_colour=blue\nnot a setting\n";
        let config = parse_config(text);
        assert_eq!(config.timeout_ms, 45_000);
    }

    #[test]
    fn bad_values_keep_previous_value() {
        let config = parse_config(b"debounce_ms=fast\npolarity=sideways\nbrightness=999");
        assert_eq!(config.debounce_ms, 30);
        assert_eq!(config.polarity, Polarity::ActiveHigh);
        assert_eq!(config.brightness, 128);
    }

    #[test]
    fn clips_and_colors_parse() {
        let config = parse_config(b"clip_win=2/7\ncolor_ready=10, 20 ,30\ncolor_lose=1,2\n");
        assert_eq!(config.clips.win, ClipBinding { folder: 2, track: 7 });
        assert_eq!(config.colors.ready, Rgb888::new(10, 20, 30));
        assert_eq!(config.colors.lose, Rgb888::new(255, 0, 0));
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let config = parse_config(
            b"debounce_ms=0\ntimeout_ms=1\nvolume=99\nstrip_leds=5000\nrestart=either\n",
        );
        assert_eq!(config.debounce_ms, 5);
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.volume, 30);
        assert_eq!(config.strip_leds, MAX_STRIP_LEDS);
        assert_eq!(config.restart, RestartPolicy::DelayOrTouch);
    }

    #[test]
    fn polarity_maps_levels() {
        assert!(Polarity::ActiveHigh.is_active(true));
        assert!(!Polarity::ActiveHigh.is_active(false));
        assert!(Polarity::ActiveLow.is_active(false));
        assert!(!Polarity::ActiveLow.is_active(true));
    }
}
