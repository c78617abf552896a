use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;

use crate::canvas::FaceCanvas;
use crate::clock::{next_tick_delay_ms, ClockFields};
use crate::color::Color;
use crate::complications::{count_non_empty, occupancy, ComplicationSource, SlotBounds, SlotId};
use crate::geometry::{IntRect, Rect};
use crate::measure::TextMeasurer;
use crate::painter::{rebuild_reason, HitTarget, LayoutKey, WatchFacePainter};
use crate::settings::Settings;
use crate::variants::ActiveAmbient;
use crate::veneer::Veneer;

/// How long a tapped field stays highlighted.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(100);
const TAP_HIGHLIGHT_OUTSET: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum TapOutcome {
    /// Date or seconds were tapped: open the agenda. The highlight should be
    /// cleared after [`HIGHLIGHT_DURATION`] with [`SlantedFace::unhighlight`].
    Agenda { highlight: IntRect },
    Complication { slot: SlotId },
    None,
}

/// The watch face as the host sees it: veneers and painters for both modes,
/// the complication provider, and the current display mode.
pub struct SlantedFace<C: ComplicationSource> {
    settings: Settings,
    veneers: ActiveAmbient<Veneer>,
    painters: Option<ActiveAmbient<WatchFacePainter>>,
    complications: C,
    measurer: Rc<dyn TextMeasurer>,
    ambient: bool,
}

impl<C: ComplicationSource> SlantedFace<C> {
    pub fn new(settings: Settings, mut complications: C, measurer: Rc<dyn TextMeasurer>) -> Self {
        let veneers = ActiveAmbient::build(|ambient| Veneer::from_settings(&settings, ambient));
        complications.apply_veneer(&veneers.active);
        Self {
            settings,
            veneers,
            painters: None,
            complications,
            measurer,
            ambient: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_ambient(&self) -> bool {
        self.ambient
    }

    pub fn veneer(&self) -> &Veneer {
        self.veneers.get(self.ambient)
    }

    pub fn complications(&self) -> &C {
        &self.complications
    }

    /// Mutates the complication provider. Layout changes caused by slots
    /// filling or emptying are picked up on the next render.
    pub fn update_complications<R>(&mut self, update: impl FnOnce(&mut C) -> R) -> R {
        update(&mut self.complications)
    }

    /// Painter of the current mode, once a frame has been rendered.
    pub fn painter(&self) -> Option<&WatchFacePainter> {
        self.painters
            .as_ref()
            .map(|painters| painters.get(self.ambient))
    }

    /// The settings changed: both veneers are rebuilt and painters follow on
    /// the next render.
    pub fn on_settings_changed(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        self.veneers = ActiveAmbient::build(|ambient| Veneer::from_settings(settings, ambient));
        self.complications.apply_veneer(self.veneers.get(self.ambient));
        self.painters = None;
        tracing::debug!(typeface = %settings.typeface, "settings changed");
    }

    /// Recolors the active veneer around `base` and persists the result into
    /// the held settings.
    pub fn apply_color_scheme(&mut self, base: Color) -> &Settings {
        let themed = self.veneers.active.with_color_scheme(base);
        themed.write_to(&mut self.settings);
        let settings = self.settings.clone();
        self.on_settings_changed(&settings);
        &self.settings
    }

    pub fn set_ambient(&mut self, ambient: bool) {
        if self.ambient == ambient {
            return;
        }
        self.ambient = ambient;
        self.complications.apply_veneer(self.veneers.get(ambient));
        tracing::debug!(ambient, "display mode changed");
    }

    /// Delay until the next redraw in interactive mode; ambient mode is
    /// driven by the host's minute ticks instead.
    pub fn next_frame_delay(&self, now_ms: i64) -> Option<Duration> {
        if self.ambient {
            return None;
        }
        let delay = next_tick_delay_ms(now_ms);
        Some(Duration::from_millis(delay.unsigned_abs()))
    }

    fn layout_key(&self, bounds: Rect, time: &ClockFields) -> LayoutKey {
        let veneer = self.veneers.get(self.ambient);
        LayoutKey {
            bounds,
            veneer: veneer.clone(),
            non_empty_slots: count_non_empty(&occupancy(
                &veneer.visible_slots(),
                &self.complications,
            )),
            coarse: time.coarse(),
        }
    }

    /// Brings both painters up to date for `bounds` and `time`. Returns
    /// whether they were rebuilt.
    pub fn prepare(&mut self, bounds: Rect, time: &ClockFields) -> bool {
        if let Some(painters) = &self.painters {
            let next = self.layout_key(bounds, time);
            match rebuild_reason(&painters.get(self.ambient).layout_key(), &next) {
                Some(reason) => tracing::debug!(%reason, "recalculating painter"),
                None => return false,
            }
        }

        let veneers = &self.veneers;
        let complications = &self.complications;
        let measurer = &self.measurer;
        self.painters = Some(ActiveAmbient::build(|ambient| {
            WatchFacePainter::new(
                veneers.get(ambient).clone(),
                bounds,
                time,
                complications,
                Rc::clone(measurer),
            )
        }));
        true
    }

    /// Draws one frame onto a black background.
    pub fn render(&mut self, canvas: &mut dyn FaceCanvas, bounds: Rect, time: &ClockFields) {
        self.prepare(bounds, time);
        canvas.fill(Color::BLACK);
        if let Some(painters) = &self.painters {
            painters
                .get(self.ambient)
                .draw(time, canvas, &self.complications);
        }
    }

    /// Complication rects; positions are shared by both modes.
    pub fn slot_bounds(&self) -> SlotBounds {
        self.painters
            .as_ref()
            .map(|painters| painters.active.complication_bounds())
            .unwrap_or_default()
    }

    pub fn hit_test(&self, x: f32, y: f32, time: &ClockFields) -> Option<HitTarget> {
        self.painter()?.hit_test(x, y, time)
    }

    pub fn on_tap(&mut self, x: f32, y: f32, time: &ClockFields) -> TapOutcome {
        let ambient = self.ambient;
        let Some(painters) = self.painters.as_mut() else {
            return TapOutcome::None;
        };

        let current = painters.get_mut(ambient);
        if current.is_date_tap(time, x, y) || current.is_seconds_tap(time, x, y) {
            let highlight = current
                .date_rect(time)
                .union(&current.seconds_rect(time))
                .inset(-TAP_HIGHLIGHT_OUTSET, -TAP_HIGHLIGHT_OUTSET)
                .round();
            current.highlight_rect(highlight);
            return TapOutcome::Agenda { highlight };
        }

        let active = &painters.active;
        match active.complication_bounds().slot_at(active.rotate(x, y)) {
            Some(slot) => TapOutcome::Complication { slot },
            None => TapOutcome::None,
        }
    }

    pub fn unhighlight(&mut self) {
        if let Some(painters) = self.painters.as_mut() {
            painters.both_mut(WatchFacePainter::unhighlight);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use chrono::Weekday;

    use super::{SlantedFace, TapOutcome};
    use crate::canvas::{CanvasOp, RecordingCanvas};
    use crate::clock::ClockFields;
    use crate::color::Color;
    use crate::complications::ComplicationHolder;
    use crate::geometry::Rect;
    use crate::measure::EstimateMeasurer;
    use crate::settings::Settings;

    fn face() -> SlantedFace<ComplicationHolder> {
        SlantedFace::new(
            Settings::default(),
            ComplicationHolder::new(),
            Rc::new(EstimateMeasurer),
        )
    }

    #[test]
    fn render_clears_to_black_first() {
        let mut face = face();
        let mut canvas = RecordingCanvas::new();
        face.render(
            &mut canvas,
            Rect::from_size(400.0, 400.0),
            &ClockFields::new(8, 5, 0, 2, Weekday::Mon),
        );
        assert_eq!(canvas.ops.first(), Some(&CanvasOp::Fill(Color::BLACK)));
        assert!(canvas.texts().contains(&"05"));
    }

    #[test]
    fn tap_before_first_frame_does_nothing() {
        let mut face = face();
        let time = ClockFields::new(8, 5, 0, 2, Weekday::Mon);
        assert_eq!(face.on_tap(10.0, 10.0, &time), TapOutcome::None);
        assert_eq!(face.hit_test(10.0, 10.0, &time), None);
    }

    #[test]
    fn ambient_mode_has_no_frame_timer() {
        let mut face = face();
        assert_eq!(
            face.next_frame_delay(1_250).map(|delay| delay.as_millis()),
            Some(750)
        );
        face.set_ambient(true);
        assert_eq!(face.next_frame_delay(1_250), None);
    }

    #[test]
    fn color_scheme_is_persisted_into_settings() {
        let mut face = face();
        let settings = face.apply_color_scheme(Color(0xFF00_0080)).clone();
        assert_eq!(settings.hours_color, Color(0xFF00_0080));
        assert_eq!(settings.minutes_color, Color(0xFF80_8080));
        assert_eq!(face.veneer().hours_color, Color(0xFF00_0080));
    }
}
