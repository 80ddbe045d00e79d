//! Integration tests tying timecode math to the composers.

use cuekit_compose::{EdlComposer, EdlEvent};
use cuekit_core::{FrameRate, TimecodeConverter};
use proptest::prelude::*;

// ── Frame-based events ─────────────────────────────────────────

#[test]
fn frame_events_follow_converter_labelling() {
    let df = TimecodeConverter::new(FrameRate::Fps29_97, true).unwrap();
    let ndf = TimecodeConverter::non_drop_frame(FrameRate::Fps25);

    let drop = EdlComposer::new("df", vec![EdlEvent::from_frames(&df, "A", "a.mov", 17_982, 18_000)]);
    let edl = drop.compose();
    assert!(edl.contains("FCM: DROP FRAME"));
    assert!(edl.contains("00:10:00:00 00:10:00:18"));

    let plain = EdlComposer::new("ndf", vec![EdlEvent::from_frames(&ndf, "B", "b.mov", 0, 250)]);
    let edl = plain.compose();
    assert!(edl.contains("FCM: NON-DROP FRAME"));
    assert!(edl.contains("00:00:00:00 00:00:10:00"));
}

#[test]
fn drop_frame_skips_first_labels_of_minute() {
    let df = TimecodeConverter::new(FrameRate::Fps29_97, true).unwrap();
    assert_eq!(df.format_timecode(1799), "00:00:59;29");
    assert_eq!(df.format_timecode(1800), "00:01:00;02");
    assert!(df.parse_timecode("00:01:00;02").is_ok());
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn timestamps_track_milliseconds(frame in 0i64..5_000_000) {
        for rate in FrameRate::ALL {
            let conv = TimecodeConverter::non_drop_frame(rate);
            let ms = conv.to_milliseconds(frame);
            prop_assert_eq!(conv.to_timestamp(frame).to_milliseconds(), ms);
            prop_assert_eq!(conv.from_milliseconds(ms), frame);
        }
    }

    #[test]
    fn event_timecodes_parse_back(start in 0i64..2_000_000, len in 1i64..10_000) {
        let conv = TimecodeConverter::new(FrameRate::Fps59_94, true).unwrap();
        let event = EdlEvent::from_frames(&conv, "r", "c", start, start + len);
        prop_assert_eq!(conv.parse_timecode(&event.start_time).unwrap(), start);
        prop_assert_eq!(conv.parse_timecode(&event.end_time).unwrap(), start + len);
    }
}
