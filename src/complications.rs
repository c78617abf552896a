use std::collections::HashMap;

use serde::Serialize;

use crate::canvas::{FaceCanvas, TextPaint};
use crate::clock::ClockFields;
use crate::color::Color;
use crate::geometry::{IntRect, Point, Rect};
use crate::measure::{TextStyle, Typeface};
use crate::veneer::Veneer;

pub const MAX_NUMBER_OF_SLOTS: usize = 3;
pub const FIRST_SLOT_ID: u32 = 2021;

/// Host-facing identifier of a complication slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SlotId(pub u32);

impl SlotId {
    pub fn all() -> impl Iterator<Item = SlotId> {
        (0..MAX_NUMBER_OF_SLOTS as u32).map(|index| SlotId(FIRST_SLOT_ID + index))
    }

    pub fn index(self) -> usize {
        let index = self.0.wrapping_sub(FIRST_SLOT_ID) as usize;
        assert!(index < MAX_NUMBER_OF_SLOTS, "unknown complication slot {}", self.0);
        index
    }
}

/// Host-side provider of complication content. The face only asks whether
/// a slot has anything to show, and hands it the slot rectangles to draw in.
pub trait ComplicationSource {
    fn is_empty(&self, slot: SlotId) -> bool;
    fn draw(&self, canvas: &mut dyn FaceCanvas, bounds: &SlotBounds, time: &ClockFields);

    /// Called whenever the displayed veneer changes (settings or mode).
    fn apply_veneer(&mut self, _veneer: &Veneer) {}
}

/// Rectangle per slot, in surface coordinates. Empty slots hold an empty rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SlotBounds {
    rects: [IntRect; MAX_NUMBER_OF_SLOTS],
}

impl SlotBounds {
    pub fn get(&self, slot: SlotId) -> IntRect {
        self.rects[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, IntRect)> + '_ {
        SlotId::all().zip(self.rects.iter().copied())
    }

    pub fn occupied(&self) -> impl Iterator<Item = (SlotId, IntRect)> + '_ {
        self.iter().filter(|(_, rect)| !rect.is_empty())
    }

    pub fn slot_at(&self, point: Point) -> Option<SlotId> {
        self.occupied()
            .find(|(_, rect)| rect.contains(point))
            .map(|(slot, _)| slot)
    }
}

/// Which of `slots` currently have content, in slot order.
pub fn occupancy(slots: &[SlotId], source: &dyn ComplicationSource) -> Vec<(SlotId, bool)> {
    slots
        .iter()
        .map(|&slot| (slot, !source.is_empty(slot)))
        .collect()
}

pub fn count_non_empty(occupancy: &[(SlotId, bool)]) -> usize {
    occupancy.iter().filter(|(_, occupied)| *occupied).count()
}

/// Splits `area` into equal horizontal bands, one per occupied slot in
/// order. Bands are separated by a 3 px gap when shared; a lone slot keeps
/// a 1 px margin.
pub fn partition_slots(area: Rect, occupancy: &[(SlotId, bool)]) -> SlotBounds {
    let mut bounds = SlotBounds::default();
    let occupied = count_non_empty(occupancy);
    if occupied == 0 || area.is_empty() {
        return bounds;
    }

    let inset = if occupied > 1 { 3 } else { 1 };
    let delta = (area.bottom - area.top) / occupied as f32;
    let occupied_slots = occupancy
        .iter()
        .filter(|(_, occupied)| *occupied)
        .map(|(slot, _)| *slot);
    for (position, slot) in occupied_slots.enumerate() {
        let top = area.top + delta * position as f32;
        bounds.rects[slot.index()] = IntRect::new(
            area.left as i32,
            top as i32,
            area.right as i32,
            (top + delta) as i32 - inset,
        );
    }
    bounds
}

/// Content of one slot as delivered by a complication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplicationData {
    NotConfigured,
    Empty,
    ShortText {
        text: String,
        title: Option<String>,
    },
}

impl ComplicationData {
    pub fn has_content(&self) -> bool {
        matches!(self, Self::ShortText { .. })
    }
}

/// In-memory complication provider: keeps the latest data per slot and
/// draws short-text complications.
#[derive(Debug, Clone)]
pub struct ComplicationHolder {
    data: HashMap<SlotId, ComplicationData>,
    icon_color: Color,
    text_color: Color,
    ambient: bool,
    low_bit_ambient: bool,
    burn_in_protection: bool,
}

impl Default for ComplicationHolder {
    fn default() -> Self {
        Self {
            data: HashMap::new(),
            icon_color: Color::WHITE,
            text_color: Color::GREEN,
            ambient: false,
            low_bit_ambient: false,
            burn_in_protection: false,
        }
    }
}

impl ComplicationHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` means the provider went away; the slot becomes empty.
    pub fn on_data_update(&mut self, slot: SlotId, data: Option<ComplicationData>) {
        assert!(
            SlotId::all().any(|known| known == slot),
            "unknown complication slot {}",
            slot.0
        );
        match data {
            Some(data) => {
                self.data.insert(slot, data);
            }
            None => {
                self.data.remove(&slot);
            }
        }
    }

    pub fn data(&self, slot: SlotId) -> Option<&ComplicationData> {
        self.data.get(&slot)
    }

    pub fn set_colors(&mut self, veneer: &Veneer) {
        self.icon_color = veneer.complication_icon_color;
        self.text_color = veneer.complication_text_color;
    }

    pub fn set_in_ambient_mode(&mut self, ambient: bool) {
        self.ambient = ambient;
    }

    pub fn set_properties(&mut self, low_bit_ambient: bool, burn_in_protection: bool) {
        self.low_bit_ambient = low_bit_ambient;
        self.burn_in_protection = burn_in_protection;
    }

    fn draw_slot(
        &self,
        canvas: &mut dyn FaceCanvas,
        rect: IntRect,
        text: &str,
        title: Option<&str>,
    ) {
        let antialias = !(self.ambient && self.low_bit_ambient);
        let height = rect.height() as f32;
        let left = rect.left as f32 + height * 0.2;
        // titles act as the icon; burn-in protection drops them in ambient
        let title = title.filter(|_| !(self.ambient && self.burn_in_protection));

        match title {
            Some(title) => {
                let style = TextStyle::new(Typeface::Date, height * 0.4);
                canvas.draw_text(
                    title,
                    Point::new(left, rect.top as f32 + height * 0.45),
                    &style,
                    TextPaint {
                        color: self.icon_color,
                        antialias,
                    },
                );
                canvas.draw_text(
                    text,
                    Point::new(left, rect.bottom as f32 - height * 0.1),
                    &style,
                    TextPaint {
                        color: self.text_color,
                        antialias,
                    },
                );
            }
            None => canvas.draw_text(
                text,
                Point::new(left, rect.bottom as f32 - height * 0.2),
                &TextStyle::new(Typeface::Date, height * 0.6),
                TextPaint {
                    color: self.text_color,
                    antialias,
                },
            ),
        }
    }
}

impl ComplicationSource for ComplicationHolder {
    fn is_empty(&self, slot: SlotId) -> bool {
        !self.data.get(&slot).is_some_and(ComplicationData::has_content)
    }

    fn draw(&self, canvas: &mut dyn FaceCanvas, bounds: &SlotBounds, _time: &ClockFields) {
        for (slot, rect) in bounds.occupied() {
            if let Some(ComplicationData::ShortText { text, title }) = self.data.get(&slot) {
                self.draw_slot(canvas, rect, text, title.as_deref());
            }
        }
    }

    fn apply_veneer(&mut self, veneer: &Veneer) {
        self.set_colors(veneer);
        self.set_in_ambient_mode(veneer.ambient);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::{
        partition_slots, ComplicationData, ComplicationHolder, ComplicationSource, SlotBounds,
        SlotId, FIRST_SLOT_ID,
    };
    use crate::canvas::RecordingCanvas;
    use crate::clock::ClockFields;
    use crate::geometry::{IntRect, Rect};

    fn short_text(text: &str) -> Option<ComplicationData> {
        Some(ComplicationData::ShortText {
            text: text.to_owned(),
            title: None,
        })
    }

    #[test]
    fn slot_ids_start_at_first_slot() {
        let ids = SlotId::all().collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![SlotId(FIRST_SLOT_ID), SlotId(FIRST_SLOT_ID + 1), SlotId(FIRST_SLOT_ID + 2)]
        );
        assert_eq!(SlotId(FIRST_SLOT_ID + 2).index(), 2);
    }

    #[test]
    #[should_panic(expected = "unknown complication slot")]
    fn foreign_slot_id_fails_fast() {
        SlotId(7).index();
    }

    #[test]
    #[should_panic(expected = "unknown complication slot 2024")]
    fn data_for_foreign_slot_is_rejected() {
        let mut holder = ComplicationHolder::new();
        holder.on_data_update(SlotId(FIRST_SLOT_ID + 3), short_text("7"));
    }

    #[test]
    fn lone_slot_fills_the_area_minus_one_pixel() {
        let occupancy = [(SlotId(2021), false), (SlotId(2022), true), (SlotId(2023), false)];
        let bounds = partition_slots(Rect::new(10.5, 100.0, 200.0, 160.0), &occupancy);
        assert_eq!(bounds.get(SlotId(2022)), IntRect::new(10, 100, 200, 159));
        assert!(bounds.get(SlotId(2021)).is_empty());
        assert!(bounds.get(SlotId(2023)).is_empty());
    }

    #[test]
    fn nothing_occupied_means_all_empty() {
        let occupancy = SlotId::all().map(|slot| (slot, false)).collect::<Vec<_>>();
        let bounds = partition_slots(Rect::new(0.0, 0.0, 100.0, 100.0), &occupancy);
        assert_eq!(bounds, SlotBounds::default());
        assert_eq!(bounds.occupied().count(), 0);
    }

    #[test]
    fn holder_treats_unconfigured_and_empty_as_empty() {
        let mut holder = ComplicationHolder::new();
        holder.on_data_update(SlotId(2021), Some(ComplicationData::NotConfigured));
        holder.on_data_update(SlotId(2022), Some(ComplicationData::Empty));
        holder.on_data_update(SlotId(2023), short_text("72%"));
        assert!(holder.is_empty(SlotId(2021)));
        assert!(holder.is_empty(SlotId(2022)));
        assert!(!holder.is_empty(SlotId(2023)));

        holder.on_data_update(SlotId(2023), None);
        assert!(holder.is_empty(SlotId(2023)));
    }

    #[test]
    fn holder_draws_only_into_occupied_rects() {
        let mut holder = ComplicationHolder::new();
        holder.on_data_update(SlotId(2021), short_text("72%"));
        holder.on_data_update(SlotId(2022), short_text("hidden"));
        let occupancy = [(SlotId(2021), true), (SlotId(2022), false), (SlotId(2023), false)];
        let bounds = partition_slots(Rect::new(0.0, 0.0, 100.0, 60.0), &occupancy);

        let mut canvas = RecordingCanvas::new();
        holder.draw(&mut canvas, &bounds, &ClockFields::new(10, 0, 0, 1, Weekday::Mon));
        assert_eq!(canvas.texts(), vec!["72%"]);
    }
}
