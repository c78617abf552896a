use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::canvas::{FaceCanvas, TextPaint};
use crate::clock::{ClockFields, CoarseFields};
use crate::color::Color;
use crate::complications::{
    count_non_empty, occupancy, partition_slots, ComplicationSource, SlotBounds, SlotId,
    MAX_NUMBER_OF_SLOTS,
};
use crate::geometry::{rotate_point, IntRect, Point, Rect, RoundedOutline};
use crate::measure::{TextMeasurer, TextStyle, Typeface};
use crate::metrics::{format_date, FieldStyles, MetricsCache, MetricsItem};
use crate::veneer::Veneer;

/// Golden ratio; hours-to-minutes size ratio when the complication column
/// has room to spare.
pub const RATIO: f32 = 1.618_034;
pub const HIGHLIGHT_COLOR: Color = Color::DKGRAY;

const LARGE_INSET: f32 = 10.0;
const SMALL_INSET: f32 = 2.0;
const SLOT_AREA_INSET: f32 = 3.0;
const DATE_HEIGHT_FACTOR: f32 = 0.7;

/// Everything a painter's cached layout depends on. Two equal keys produce
/// identical painters.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutKey {
    pub bounds: Rect,
    pub veneer: Veneer,
    pub non_empty_slots: usize,
    pub coarse: CoarseFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildReason {
    Bounds,
    Veneer,
    Complications,
    Calendar,
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bounds => "bounds changed",
            Self::Veneer => "veneer changed",
            Self::Complications => "non-empty complication count changed",
            Self::Calendar => "hour or date changed",
        };
        f.write_str(label)
    }
}

pub fn rebuild_reason(prev: &LayoutKey, next: &LayoutKey) -> Option<RebuildReason> {
    if prev.bounds != next.bounds {
        Some(RebuildReason::Bounds)
    } else if prev.veneer != next.veneer {
        Some(RebuildReason::Veneer)
    } else if prev.non_empty_slots != next.non_empty_slots {
        Some(RebuildReason::Complications)
    } else if prev.coarse != next.coarse {
        Some(RebuildReason::Calendar)
    } else {
        None
    }
}

/// A painter built for `prev` is stale for `next`. Minute and second
/// changes never count.
pub fn needs_rebuild(prev: &LayoutKey, next: &LayoutKey) -> bool {
    rebuild_reason(prev, next).is_some()
}

/// What a tap landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "target", content = "slot")]
pub enum HitTarget {
    Hours,
    Minutes,
    Seconds,
    Date,
    Complication(SlotId),
}

/// A measured field value and its baseline origin, relative to the top-left
/// of the painter bounds and before rotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedText {
    #[serde(flatten)]
    pub item: MetricsItem,
    pub origin: Point,
}

impl PlacedText {
    fn new(item: &MetricsItem, x: f32, y: f32) -> Self {
        Self {
            item: item.clone(),
            origin: Point::new(x, y),
        }
    }

    pub fn text(&self) -> &str {
        &self.item.text
    }

    /// Ink box above the baseline, in painter-local coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y - self.item.height as f32,
            self.origin.x + self.item.width as f32,
            self.origin.y,
        )
    }
}

/// Every field of one frame with its metrics and placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintData {
    pub hours: PlacedText,
    pub minutes: PlacedText,
    pub seconds: PlacedText,
    pub date: PlacedText,
    pub am_pm: String,
    pub am_pm_origin: Point,
}

/// Unrotated field rectangles of one frame, in surface coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRects {
    pub angle: f32,
    pub center: Point,
    pub hours: Rect,
    pub minutes: Rect,
    pub seconds: Rect,
    pub date: Rect,
    pub complications: SlotBounds,
}

struct FaceLayout {
    styles: FieldStyles,
    am_pm_style: TextStyle,
    metrics: MetricsCache,
    slot_bounds: SlotBounds,
}

/// Lays out and draws one veneer of the face for fixed bounds, complication
/// occupancy and coarse calendar fields. Build a new one when
/// [`needs_rebuild`] says so.
pub struct WatchFacePainter {
    veneer: Veneer,
    bounds: Rect,
    center_x: f32,
    center_y: f32,
    occupancy: Vec<(SlotId, bool)>,
    coarse: CoarseFields,
    layout: Option<FaceLayout>,
    highlight: Option<RoundedOutline>,
}

impl WatchFacePainter {
    pub fn new(
        veneer: Veneer,
        bounds: Rect,
        time: &ClockFields,
        complications: &dyn ComplicationSource,
        measurer: Rc<dyn TextMeasurer>,
    ) -> Self {
        let occupancy = occupancy(&veneer.visible_slots(), complications);
        let center_x = bounds.width() / 2.0;
        let center_y = bounds.height() / 2.0;
        let degenerate = bounds.width() <= 0.0 || bounds.height() <= 0.0;

        let layout = if degenerate {
            tracing::debug!(?bounds, "degenerate bounds, painter draws nothing");
            None
        } else {
            Some(FaceLayout::build(
                &veneer,
                bounds,
                center_x,
                center_y,
                count_non_empty(&occupancy),
                &occupancy,
                time,
                measurer,
            ))
        };

        Self {
            veneer,
            bounds,
            center_x,
            center_y,
            occupancy,
            coarse: time.coarse(),
            layout,
            highlight: None,
        }
    }

    pub fn veneer(&self) -> &Veneer {
        &self.veneer
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn layout_key(&self) -> LayoutKey {
        LayoutKey {
            bounds: self.bounds,
            veneer: self.veneer.clone(),
            non_empty_slots: count_non_empty(&self.occupancy),
            coarse: self.coarse,
        }
    }

    pub fn should_update(
        &self,
        time: &ClockFields,
        complications: &dyn ComplicationSource,
    ) -> bool {
        let next = LayoutKey {
            non_empty_slots: count_non_empty(&occupancy(
                &self.veneer.visible_slots(),
                complications,
            )),
            coarse: time.coarse(),
            ..self.layout_key()
        };
        needs_rebuild(&self.layout_key(), &next)
    }

    /// Surface point the face is rotated about.
    pub fn rotation_center(&self) -> Point {
        Point::new(
            self.bounds.left + self.center_x,
            self.bounds.top + self.center_y,
        )
    }

    pub fn complication_bounds(&self) -> SlotBounds {
        self.layout
            .as_ref()
            .map(|layout| layout.slot_bounds)
            .unwrap_or_default()
    }

    pub fn paint_data(&self, time: &ClockFields) -> Option<PaintData> {
        let layout = self.layout.as_ref()?;
        let hours = layout.metrics.hours(time.hour, self.veneer.is24h);
        let minutes = layout.metrics.minutes(time.minute);
        let seconds = layout.metrics.seconds(time.second);
        let date = layout.metrics.date(time.day_of_month, time.weekday);
        Some(self.place(time, hours, minutes, seconds, &date))
    }

    fn place(
        &self,
        time: &ClockFields,
        h: &MetricsItem,
        m: &MetricsItem,
        s: &MetricsItem,
        d: &MetricsItem,
    ) -> PaintData {
        let single_digit_shift = if h.is_single_digit() { LARGE_INSET } else { 0.0 };
        let hours_x = self.center_x - h.width as f32 - single_digit_shift;
        let hours_y = self.center_y + h.height as f32 / 2.0;

        let minutes_x = self.center_x + LARGE_INSET;
        let minutes_y = hours_y - h.height as f32 + m.height as f32;

        let seconds_x = minutes_x + m.width as f32 + LARGE_INSET;

        let (date_x, date_y, seconds_y) = if self.veneer.larger_date {
            let date_y = minutes_y + d.height as f32 + LARGE_INSET;
            (minutes_x, date_y, minutes_y)
        } else {
            let date_y = minutes_y;
            (seconds_x, date_y, date_y - d.height as f32 - 4.0 * SMALL_INSET)
        };

        let am_pm_y = seconds_y - s.height as f32 - 4.0 * SMALL_INSET;

        PaintData {
            hours: PlacedText::new(h, hours_x, hours_y),
            minutes: PlacedText::new(m, minutes_x, minutes_y),
            seconds: PlacedText::new(s, seconds_x, seconds_y),
            date: PlacedText::new(d, date_x, date_y),
            am_pm: time.am_pm().to_owned(),
            am_pm_origin: Point::new(seconds_x, am_pm_y),
        }
    }

    fn field_rect(
        &self,
        time: &ClockFields,
        field: impl Fn(&PaintData) -> &PlacedText,
    ) -> Rect {
        self.paint_data(time)
            .map(|data| self.surface_rect(field(&data)))
            .unwrap_or(Rect::EMPTY)
    }

    fn surface_rect(&self, placed: &PlacedText) -> Rect {
        placed.rect().offset(self.bounds.left, self.bounds.top)
    }

    pub fn hours_rect(&self, time: &ClockFields) -> Rect {
        self.field_rect(time, |data| &data.hours)
    }

    pub fn minutes_rect(&self, time: &ClockFields) -> Rect {
        self.field_rect(time, |data| &data.minutes)
    }

    pub fn seconds_rect(&self, time: &ClockFields) -> Rect {
        self.field_rect(time, |data| &data.seconds)
    }

    pub fn date_rect(&self, time: &ClockFields) -> Rect {
        self.field_rect(time, |data| &data.date)
    }

    pub fn frame_rects(&self, time: &ClockFields) -> FrameRects {
        let data = self.paint_data(time);
        let rect = |field: fn(&PaintData) -> &PlacedText| {
            data.as_ref()
                .map(|data| self.surface_rect(field(data)))
                .unwrap_or(Rect::EMPTY)
        };
        FrameRects {
            angle: self.veneer.angle(),
            center: self.rotation_center(),
            hours: rect(|data| &data.hours),
            minutes: rect(|data| &data.minutes),
            seconds: rect(|data| &data.seconds),
            date: rect(|data| &data.date),
            complications: self.complication_bounds(),
        }
    }

    /// Maps a surface point into the unrotated layout frame.
    pub fn rotate(&self, x: f32, y: f32) -> Point {
        rotate_point(
            Point::new(x, y),
            self.rotation_center(),
            -self.veneer.angle(),
        )
    }

    pub fn is_hours_tap(&self, time: &ClockFields, x: f32, y: f32) -> bool {
        self.hours_rect(time).contains(self.rotate(x, y))
    }

    pub fn is_minutes_tap(&self, time: &ClockFields, x: f32, y: f32) -> bool {
        self.minutes_rect(time).contains(self.rotate(x, y))
    }

    pub fn is_seconds_tap(&self, time: &ClockFields, x: f32, y: f32) -> bool {
        self.seconds_rect(time).contains(self.rotate(x, y))
    }

    pub fn is_date_tap(&self, time: &ClockFields, x: f32, y: f32) -> bool {
        self.date_rect(time).contains(self.rotate(x, y))
    }

    pub fn hit_test(&self, x: f32, y: f32, time: &ClockFields) -> Option<HitTarget> {
        let data = self.paint_data(time)?;
        let point = self.rotate(x, y);
        let fields = [
            (HitTarget::Date, &data.date),
            (HitTarget::Seconds, &data.seconds),
            (HitTarget::Minutes, &data.minutes),
            (HitTarget::Hours, &data.hours),
        ];
        let hit = fields
            .into_iter()
            .find(|(_, placed)| self.surface_rect(placed).contains(point))
            .map(|(target, _)| target)
            .or_else(|| {
                self.complication_bounds()
                    .slot_at(point)
                    .map(HitTarget::Complication)
            });
        hit
    }

    pub fn highlight_rect(&mut self, rect: IntRect) {
        self.highlight = Some(RoundedOutline::new(rect));
    }

    pub fn unhighlight(&mut self) {
        self.highlight = None;
    }

    pub fn highlighted(&self) -> Option<&RoundedOutline> {
        self.highlight.as_ref()
    }

    pub fn draw(
        &self,
        time: &ClockFields,
        canvas: &mut dyn FaceCanvas,
        complications: &dyn ComplicationSource,
    ) {
        let Some(layout) = &self.layout else {
            return;
        };
        let Some(data) = self.paint_data(time) else {
            return;
        };
        let veneer = &self.veneer;
        let antialias = !veneer.ambient;
        let paint = |color: Color| TextPaint { color, antialias };
        let at = |origin: Point| {
            Point::new(self.bounds.left + origin.x, self.bounds.top + origin.y)
        };

        canvas.save();
        canvas.rotate(veneer.angle(), self.rotation_center());
        if let Some(outline) = &self.highlight {
            canvas.fill_outline(outline, HIGHLIGHT_COLOR);
        }

        canvas.draw_text(
            data.hours.text(),
            at(data.hours.origin),
            layout.styles.for_hours(data.hours.text()),
            paint(veneer.hours_color),
        );
        canvas.draw_text(
            data.minutes.text(),
            at(data.minutes.origin),
            &layout.styles.minutes,
            paint(veneer.minutes_color),
        );
        canvas.draw_text(
            data.date.text(),
            at(data.date.origin),
            &layout.styles.date,
            paint(veneer.date_color),
        );
        if !veneer.ambient {
            canvas.draw_text(
                data.seconds.text(),
                at(data.seconds.origin),
                &layout.styles.seconds,
                paint(veneer.seconds_color),
            );
        }
        if !veneer.is24h {
            canvas.draw_text(
                &data.am_pm,
                at(data.am_pm_origin),
                &layout.am_pm_style,
                paint(veneer.am_pm_color),
            );
        }

        complications.draw(canvas, &layout.slot_bounds, time);
        canvas.restore();
    }
}

impl FaceLayout {
    #[allow(clippy::too_many_arguments)]
    fn build(
        veneer: &Veneer,
        bounds: Rect,
        center_x: f32,
        center_y: f32,
        non_empty: usize,
        occupancy: &[(SlotId, bool)],
        time: &ClockFields,
        measurer: Rc<dyn TextMeasurer>,
    ) -> Self {
        let config = veneer.typeface;
        let time_face = Typeface::Time(config.asset_id);
        let roomy = non_empty <= 2 && !veneer.larger_date;
        let (minutes_ratio, text_scale_factor) = if roomy {
            (RATIO, 1.0)
        } else {
            (2.0, 2.0 / RATIO)
        };

        let hours_size = center_y * 2.0 * config.y_size_ratio;
        let minutes_size = hours_size / minutes_ratio;
        let seconds_size = minutes_size / 2.0;
        let date_size = if veneer.larger_date {
            (hours_size / 2.0) / MAX_NUMBER_OF_SLOTS as f32 * DATE_HEIGHT_FACTOR
        } else {
            seconds_size / 4.0
        };

        let hours = TextStyle::new(time_face, hours_size).with_scale_x(config.hour_scale_x);
        let single_digit_hours =
            TextStyle::new(time_face, hours_size).with_scale_x(config.hour_scale_x_single_digit);
        let minutes = TextStyle::new(time_face, minutes_size)
            .with_scale_x(config.minutes_scale_x * text_scale_factor);
        let seconds = TextStyle::new(time_face, seconds_size)
            .with_scale_x(config.seconds_scale_x * text_scale_factor);
        let seconds_width = measurer.measure(&seconds, "00").width as f32;

        let plain_date = TextStyle::new(Typeface::Date, date_size);
        let date_room = if veneer.larger_date {
            bounds.width() / 2.0
        } else {
            seconds_width
        };
        let sample_date = format_date(time.day_of_month, time.weekday);
        let date = plain_date.with_scale_x(squeeze(
            date_room * 0.95,
            measurer.measure(&plain_date, &sample_date).width,
        ));

        let am_pm_size = if veneer.larger_date {
            minutes_size / 4.0
        } else {
            date_size
        };
        let plain_am_pm = TextStyle::new(Typeface::Date, am_pm_size);
        let am_pm_style = plain_am_pm.with_scale_x(squeeze(
            seconds_width * 0.7,
            measurer.measure(&plain_am_pm, "AM").width,
        ));

        let styles = FieldStyles {
            hours,
            single_digit_hours,
            minutes,
            seconds,
            date,
        };
        let metrics = MetricsCache::build(measurer, &styles);
        let slot_bounds = partition_slots(
            complication_area(veneer, bounds, center_x, center_y, &metrics),
            occupancy,
        );

        tracing::debug!(
            typeface = config.display_name,
            ambient = veneer.ambient,
            non_empty,
            hours_size,
            minutes_size,
            date_size,
            "built painter layout"
        );

        Self {
            styles,
            am_pm_style,
            metrics,
            slot_bounds,
        }
    }
}

/// Horizontal scale that fits `measured` into `room`, never stretching.
fn squeeze(room: f32, measured: i32) -> f32 {
    if measured <= 0 {
        return 1.0;
    }
    (room / measured as f32).min(1.0)
}

/// Column right of the minutes, below the minutes line, that the
/// complication slots share. Uses the tallest hours and minutes so slots do
/// not move as the time changes.
fn complication_area(
    veneer: &Veneer,
    bounds: Rect,
    center_x: f32,
    center_y: f32,
    metrics: &MetricsCache,
) -> Rect {
    let max_hours_height = metrics.max_hours_height(veneer.is24h) as f32;
    let max_minutes_height = metrics.max_minutes_height() as f32;
    let hours_y = center_y + max_hours_height / 2.0;
    let minutes_y = hours_y - max_hours_height + max_minutes_height;

    let left = center_x + LARGE_INSET;
    let right = center_x * 2.0;
    let bottom = (hours_y + center_y * 2.0) / 2.0;
    let mut top = minutes_y + LARGE_INSET;
    if veneer.larger_date {
        top += (bottom - top) / MAX_NUMBER_OF_SLOTS as f32 * DATE_HEIGHT_FACTOR + SLOT_AREA_INSET;
    }

    Rect::new(left, top, right, bottom).offset(bounds.left, bounds.top)
}
