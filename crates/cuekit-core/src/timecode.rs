//! Frame rates and broadcast timecode arithmetic.
//!
//! Frame numbers are converted to and from `HH:MM:SS:FF` timecode using one
//! of three algorithms:
//! - non-drop-frame: plain integer division by the nominal frame rate,
//! - SMPTE drop-frame (29.97 / 59.94): frame *labels* are skipped at the start
//!   of every minute except each tenth minute so timecode tracks wall-clock time,
//! - pseudo-drop-frame (23.976 only): seconds are computed from the true frame
//!   rate and the fractional part is rounded to a 1/24 s frame label. This is
//!   an approximation and is not broadcast-legal drop frame.
//!
//! Millisecond conversions always use the exact rational frame rate and are
//! independent of the drop-frame setting.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CueKitError, Result};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;
const MILLIS_PER_SECOND: i64 = 1_000;

/// Supported nominal frame rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameRate {
    Fps23_976,
    Fps24,
    Fps25,
    Fps29_97,
    Fps30,
    Fps50,
    Fps59_94,
    Fps60,
}

impl FrameRate {
    /// Every supported rate, slowest first.
    pub const ALL: [Self; 8] = [
        Self::Fps23_976,
        Self::Fps24,
        Self::Fps25,
        Self::Fps29_97,
        Self::Fps30,
        Self::Fps50,
        Self::Fps59_94,
        Self::Fps60,
    ];

    /// Exact rate as `(numerator, denominator)` frames per second.
    pub const fn rational(self) -> (i64, i64) {
        match self {
            Self::Fps23_976 => (24_000, 1_001),
            Self::Fps24 => (24_000, 1_000),
            Self::Fps25 => (25_000, 1_000),
            Self::Fps29_97 => (30_000, 1_001),
            Self::Fps30 => (30_000, 1_000),
            Self::Fps50 => (50_000, 1_000),
            Self::Fps59_94 => (60_000, 1_001),
            Self::Fps60 => (60_000, 1_000),
        }
    }

    /// Exact rate as a rational number.
    #[inline]
    pub fn as_ratio(self) -> Rational64 {
        let (numerator, denominator) = self.rational();
        Rational64::new(numerator, denominator)
    }

    /// Frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        let (numerator, denominator) = self.rational();
        numerator as f64 / denominator as f64
    }

    /// Integer frame count labelled per timecode second (`round(fps)`).
    pub const fn time_base(self) -> i64 {
        match self {
            Self::Fps23_976 | Self::Fps24 => 24,
            Self::Fps25 => 25,
            Self::Fps29_97 | Self::Fps30 => 30,
            Self::Fps50 => 50,
            Self::Fps59_94 | Self::Fps60 => 60,
        }
    }

    /// Whether SMPTE drop-frame labelling applies to this rate.
    pub const fn supports_smpte_drop_frame(self) -> bool {
        matches!(self, Self::Fps29_97 | Self::Fps59_94)
    }

    /// Map a measured frame rate onto a supported rate by its integer part
    /// (`23.98` → 23.976, `29.97` → 29.97, `30.0` → 30, ...).
    pub fn from_fps(fps: f64) -> Result<Self> {
        if !fps.is_finite() {
            return Err(CueKitError::UnsupportedFrameRate(format!("{fps} fps")));
        }
        match fps.floor() as i64 {
            23 => Ok(Self::Fps23_976),
            24 => Ok(Self::Fps24),
            25 => Ok(Self::Fps25),
            29 => Ok(Self::Fps29_97),
            30 => Ok(Self::Fps30),
            50 => Ok(Self::Fps50),
            59 => Ok(Self::Fps59_94),
            60 => Ok(Self::Fps60),
            _ => Err(CueKitError::UnsupportedFrameRate(format!("{fps} fps"))),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Fps23_976 => "23.976",
            Self::Fps24 => "24",
            Self::Fps25 => "25",
            Self::Fps29_97 => "29.97",
            Self::Fps30 => "30",
            Self::Fps50 => "50",
            Self::Fps59_94 => "59.94",
            Self::Fps60 => "60",
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::Fps24
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps", self.label())
    }
}

/// A broadcast timecode label `HH:MM:SS:FF` (`HH:MM:SS;FF` when drop-frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timecode {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
    /// Rendered with a `;` frame separator.
    pub drop_frame: bool,
}

impl Timecode {
    /// Create a non-drop-frame timecode.
    pub const fn new(hours: u32, minutes: u32, seconds: u32, frames: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
            drop_frame: false,
        }
    }

    /// Create a drop-frame timecode.
    pub const fn new_drop_frame(hours: u32, minutes: u32, seconds: u32, frames: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
            drop_frame: true,
        }
    }

    /// `[hours, minutes, seconds, frames]`
    pub const fn as_array(&self) -> [u32; 4] {
        [self.hours, self.minutes, self.seconds, self.frames]
    }

    /// Whole seconds of the label, ignoring frames.
    pub fn total_seconds(&self) -> i64 {
        self.hours as i64 * SECONDS_PER_HOUR
            + self.minutes as i64 * SECONDS_PER_MINUTE
            + self.seconds as i64
    }

    fn total_minutes(&self) -> i64 {
        self.hours as i64 * 60 + self.minutes as i64
    }

    fn from_label_frames(total_frames: i64, time_base: i64, drop_frame: bool) -> Self {
        let total_seconds = total_frames / time_base;
        Self {
            hours: (total_seconds / SECONDS_PER_HOUR) as u32,
            minutes: ((total_seconds / SECONDS_PER_MINUTE) % 60) as u32,
            seconds: (total_seconds % 60) as u32,
            frames: (total_frames % time_base) as u32,
            drop_frame,
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.drop_frame { ';' } else { ':' };
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}",
            self.hours, self.minutes, self.seconds, separator, self.frames
        )
    }
}

impl FromStr for Timecode {
    type Err = CueKitError;

    /// Parse `HH:MM:SS:FF` (non-drop-frame) or `HH:MM:SS;FF` (drop-frame).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CueKitError::InvalidTimecode(s.to_string());

        let parts: Vec<&str> = s.split(':').collect();
        let (fields, drop_frame) = match parts.as_slice() {
            [hh, mm, ss, ff] => ([*hh, *mm, *ss, *ff], false),
            [hh, mm, ssff] => {
                let (ss, ff) = ssff.split_once(';').ok_or_else(invalid)?;
                ([*hh, *mm, ss, ff], true)
            }
            _ => return Err(invalid()),
        };

        let mut values = [0u32; 4];
        for (value, field) in values.iter_mut().zip(fields) {
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *value = field.parse().map_err(|_| invalid())?;
        }

        let [hours, minutes, seconds, frames] = values;
        Ok(Self {
            hours,
            minutes,
            seconds,
            frames,
            drop_frame,
        })
    }
}

/// A wall-clock position `HH:MM:SS.mmm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub milliseconds: u32,
}

impl Timestamp {
    /// Split a millisecond offset into its fields. Negative offsets clamp to zero.
    pub fn from_milliseconds(milliseconds: i64) -> Self {
        let ms = milliseconds.max(0);
        let total_seconds = ms / MILLIS_PER_SECOND;
        Self {
            hours: (total_seconds / SECONDS_PER_HOUR) as u32,
            minutes: ((total_seconds / SECONDS_PER_MINUTE) % 60) as u32,
            seconds: (total_seconds % 60) as u32,
            milliseconds: (ms % MILLIS_PER_SECOND) as u32,
        }
    }

    /// Total offset in milliseconds.
    pub fn to_milliseconds(&self) -> i64 {
        (self.hours as i64 * SECONDS_PER_HOUR
            + self.minutes as i64 * SECONDS_PER_MINUTE
            + self.seconds as i64)
            * MILLIS_PER_SECOND
            + self.milliseconds as i64
    }

    /// `[hours, minutes, seconds, milliseconds]`
    pub const fn as_array(&self) -> [u32; 4] {
        [self.hours, self.minutes, self.seconds, self.milliseconds]
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            self.hours, self.minutes, self.seconds, self.milliseconds
        )
    }
}

/// Which labelling algorithm a converter routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Labelling {
    NonDropFrame,
    DropFrame,
    PseudoDropFrame,
}

/// Converts frame numbers to timecode labels and wall-clock time for one
/// frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimecodeConverter {
    rate: FrameRate,
    drop_frame: bool,
}

impl TimecodeConverter {
    /// Create a converter.
    ///
    /// `drop_frame` is accepted for 29.97 and 59.94 (SMPTE drop frame) and for
    /// 23.976 (pseudo drop frame); any other combination is rejected.
    pub fn new(rate: FrameRate, drop_frame: bool) -> Result<Self> {
        if drop_frame && !(rate.supports_smpte_drop_frame() || rate == FrameRate::Fps23_976) {
            return Err(CueKitError::UnsupportedFrameRate(format!(
                "{rate} drop frame"
            )));
        }
        Ok(Self { rate, drop_frame })
    }

    /// Create a non-drop-frame converter. Never fails.
    pub const fn non_drop_frame(rate: FrameRate) -> Self {
        Self {
            rate,
            drop_frame: false,
        }
    }

    #[inline]
    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    #[inline]
    pub fn is_drop_frame(&self) -> bool {
        self.drop_frame
    }

    fn labelling(&self) -> Labelling {
        match (self.drop_frame, self.rate) {
            (false, _) => Labelling::NonDropFrame,
            (true, FrameRate::Fps23_976) => Labelling::PseudoDropFrame,
            (true, _) => Labelling::DropFrame,
        }
    }

    /// Label a frame number using the configured algorithm.
    pub fn to_timecode(&self, frame_number: i64) -> Timecode {
        match self.labelling() {
            Labelling::NonDropFrame => non_drop_frame_label(self.rate, frame_number),
            Labelling::DropFrame => drop_frame_label(self.rate, frame_number),
            Labelling::PseudoDropFrame => pseudo_drop_frame_label(self.rate, frame_number),
        }
    }

    /// Frame number of a timecode label.
    ///
    /// The label's own separator picks the algorithm, not the converter's
    /// setting: `:` labels are non-drop-frame, `;` labels are SMPTE drop
    /// frame at 29.97 / 59.94 and pseudo drop frame at 23.976. A `;` label
    /// at any other rate is rejected.
    pub fn from_timecode(&self, timecode: &Timecode) -> Result<i64> {
        if !timecode.drop_frame {
            return Ok(non_drop_frame_number(self.rate, timecode));
        }
        match self.rate {
            FrameRate::Fps23_976 => Ok(pseudo_drop_frame_number(self.rate, timecode)),
            rate if rate.supports_smpte_drop_frame() => Ok(drop_frame_number(rate, timecode)),
            rate => Err(CueKitError::InvalidTimecode(format!(
                "{timecode} is drop frame but {rate} has no drop-frame labels"
            ))),
        }
    }

    /// Parse a timecode string and convert it to a frame number.
    pub fn parse_timecode(&self, timecode: &str) -> Result<i64> {
        let parsed: Timecode = timecode.parse()?;
        self.from_timecode(&parsed)
    }

    /// Label a frame number and render it as a string.
    pub fn format_timecode(&self, frame_number: i64) -> String {
        self.to_timecode(frame_number).to_string()
    }

    /// Non-drop-frame label, regardless of the drop-frame setting.
    pub fn to_non_drop_frame_timecode(&self, frame_number: i64) -> Timecode {
        non_drop_frame_label(self.rate, frame_number)
    }

    pub fn from_non_drop_frame_timecode(&self, timecode: &Timecode) -> i64 {
        non_drop_frame_number(self.rate, timecode)
    }

    /// SMPTE drop-frame label. Only 29.97 and 59.94 are supported.
    pub fn to_drop_frame_timecode(&self, frame_number: i64) -> Result<Timecode> {
        self.ensure_smpte_drop_frame()?;
        Ok(drop_frame_label(self.rate, frame_number))
    }

    pub fn from_drop_frame_timecode(&self, timecode: &Timecode) -> Result<i64> {
        self.ensure_smpte_drop_frame()?;
        Ok(drop_frame_number(self.rate, timecode))
    }

    /// Pseudo-drop-frame label. Only 23.976 is supported.
    pub fn to_pseudo_drop_frame_timecode(&self, frame_number: i64) -> Result<Timecode> {
        self.ensure_pseudo_drop_frame()?;
        Ok(pseudo_drop_frame_label(self.rate, frame_number))
    }

    pub fn from_pseudo_drop_frame_timecode(&self, timecode: &Timecode) -> Result<i64> {
        self.ensure_pseudo_drop_frame()?;
        Ok(pseudo_drop_frame_number(self.rate, timecode))
    }

    /// Wall-clock position of a frame.
    pub fn to_timestamp(&self, frame_number: i64) -> Timestamp {
        Timestamp::from_milliseconds(self.to_milliseconds(frame_number))
    }

    /// `round(frame * 1000 / fps)`
    pub fn to_milliseconds(&self, frame_number: i64) -> i64 {
        let (numerator, denominator) = self.rate.rational();
        Rational64::new(frame_number * denominator * MILLIS_PER_SECOND, numerator)
            .round()
            .to_integer()
    }

    /// `round(ms * fps / 1000)`
    pub fn from_milliseconds(&self, milliseconds: i64) -> i64 {
        let (numerator, denominator) = self.rate.rational();
        Rational64::new(milliseconds * numerator, denominator * MILLIS_PER_SECOND)
            .round()
            .to_integer()
    }

    pub fn to_seconds(&self, frame_number: i64) -> f64 {
        self.to_milliseconds(frame_number) as f64 / MILLIS_PER_SECOND as f64
    }

    pub fn from_seconds(&self, seconds: f64) -> i64 {
        self.from_milliseconds((seconds * MILLIS_PER_SECOND as f64).round() as i64)
    }

    fn ensure_smpte_drop_frame(&self) -> Result<()> {
        if self.rate.supports_smpte_drop_frame() {
            Ok(())
        } else {
            Err(CueKitError::UnsupportedFrameRate(format!(
                "{} drop frame",
                self.rate
            )))
        }
    }

    fn ensure_pseudo_drop_frame(&self) -> Result<()> {
        if self.rate == FrameRate::Fps23_976 {
            Ok(())
        } else {
            Err(CueKitError::UnsupportedFrameRate(format!(
                "{} pseudo drop frame",
                self.rate
            )))
        }
    }
}

// ── Non-drop-frame ─────────────────────────────────────────────

fn non_drop_frame_label(rate: FrameRate, frame_number: i64) -> Timecode {
    let time_base = rate.time_base();
    let frames_per_day = time_base * SECONDS_PER_DAY;
    let frame = frame_number.rem_euclid(frames_per_day);
    Timecode::from_label_frames(frame, time_base, false)
}

fn non_drop_frame_number(rate: FrameRate, timecode: &Timecode) -> i64 {
    timecode.total_seconds() * rate.time_base() + timecode.frames as i64
}

// ── SMPTE drop-frame ───────────────────────────────────────────

/// Frame labels skipped at the top of each non-tenth minute.
fn dropped_labels(rate: FrameRate) -> i64 {
    rate.time_base() / 15
}

fn drop_frame_label(rate: FrameRate, frame_number: i64) -> Timecode {
    let time_base = rate.time_base();
    let drop = dropped_labels(rate);
    let frames_per_minute = time_base * SECONDS_PER_MINUTE - drop;
    let frames_per_10_minutes = time_base * SECONDS_PER_MINUTE * 10 - drop * 9;
    let frames_per_day = frames_per_10_minutes * 6 * 24;

    let mut frame = frame_number.rem_euclid(frames_per_day);
    let tens = frame / frames_per_10_minutes;
    let remainder = frame % frames_per_10_minutes;

    frame += drop * 9 * tens;
    if remainder > drop {
        frame += drop * ((remainder - drop) / frames_per_minute);
    }

    Timecode::from_label_frames(frame, time_base, true)
}

fn drop_frame_number(rate: FrameRate, timecode: &Timecode) -> i64 {
    let total_minutes = timecode.total_minutes();
    let nominal = timecode.total_seconds() * rate.time_base() + timecode.frames as i64;
    nominal - dropped_labels(rate) * (total_minutes - total_minutes / 10)
}

// ── Pseudo-drop-frame (23.976) ─────────────────────────────────

fn pseudo_drop_frame_label(rate: FrameRate, frame_number: i64) -> Timecode {
    let (numerator, denominator) = rate.rational();
    let time_base = rate.time_base();

    // seconds = frame / fps = frame * den / num
    let scaled = frame_number * denominator;
    let mut whole_seconds = scaled.div_euclid(numerator);
    let fraction = scaled.rem_euclid(numerator);

    // round(fraction / num * time_base), halves up
    let mut frames = (fraction * time_base * 2 + numerator) / (numerator * 2);
    if frames == time_base {
        frames = 0;
        whole_seconds += 1;
    }

    let whole_seconds = whole_seconds.rem_euclid(SECONDS_PER_DAY);
    Timecode::from_label_frames(whole_seconds * time_base + frames, time_base, true)
}

fn pseudo_drop_frame_number(rate: FrameRate, timecode: &Timecode) -> i64 {
    let (numerator, denominator) = rate.rational();
    let time_base = rate.time_base();
    let label_frames = timecode.total_seconds() * time_base + timecode.frames as i64;
    Rational64::new(label_frames * numerator, time_base * denominator)
        .round()
        .to_integer()
}
