//! Chart data model — notes, lanes, sides, and the `.thapsteak` wire format.
//!
//! A chart owns its notes in an id-keyed index (for O(1) edits of identified
//! notes) plus a display order kept stably sorted by tick. All structural
//! rules live in [`Notechart::add_note`]: identity assignment, duplicate
//! rejection, and re-sorting — so imported data goes through exactly the
//! same gate as interactively placed notes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Smallest musical time unit: 192 ticks per measure.
pub const TICKS_PER_MEASURE: i64 = 192;

/// Unique note identity. Assigned by the chart on insertion, monotonically
/// increasing, never reused — even across deletions.
pub type NoteId = u64;

/// The 13 real lanes. Discriminants are the screen columns; columns 0, 2, 8,
/// 13 and everything right of E3 are structural gaps that never hold notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lane {
    Bpm = 1,
    H1 = 3,
    H2 = 4,
    H3 = 5,
    H4 = 6,
    H5 = 7,
    N1 = 9,
    N2 = 10,
    N3 = 11,
    N4 = 12,
    E1 = 14,
    E2 = 15,
    E3 = 16,
}

/// The three paired-lane groups. The BPM lane belongs to none of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaneGroup {
    Hard,
    Normal,
    Easy,
}

impl Lane {
    pub const ALL: [Lane; 13] = [
        Lane::Bpm,
        Lane::H1,
        Lane::H2,
        Lane::H3,
        Lane::H4,
        Lane::H5,
        Lane::N1,
        Lane::N2,
        Lane::N3,
        Lane::N4,
        Lane::E1,
        Lane::E2,
        Lane::E3,
    ];

    /// Screen column index.
    pub fn column(self) -> usize {
        self as usize
    }

    /// Lane at a screen column, or `None` for the gap columns.
    pub fn from_column(column: usize) -> Option<Lane> {
        Lane::ALL.iter().copied().find(|l| l.column() == column)
    }

    /// Channel name used in the exchange format.
    pub fn name(self) -> &'static str {
        match self {
            Lane::Bpm => "BPM",
            Lane::H1 => "H1",
            Lane::H2 => "H2",
            Lane::H3 => "H3",
            Lane::H4 => "H4",
            Lane::H5 => "H5",
            Lane::N1 => "N1",
            Lane::N2 => "N2",
            Lane::N3 => "N3",
            Lane::N4 => "N4",
            Lane::E1 => "E1",
            Lane::E2 => "E2",
            Lane::E3 => "E3",
        }
    }

    pub fn from_name(name: &str) -> Option<Lane> {
        Lane::ALL.iter().copied().find(|l| l.name() == name)
    }

    pub fn group(self) -> Option<LaneGroup> {
        match self.column() {
            3..=7 => Some(LaneGroup::Hard),
            9..=12 => Some(LaneGroup::Normal),
            14..=16 => Some(LaneGroup::Easy),
            _ => None,
        }
    }
}

/// Which half of a paired-lane group a note belongs to. Chains long notes
/// and flicks across the group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    None,
    Left,
    Right,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::None => "null",
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Flick direction indicator, stored as a compass angle in degrees. The
/// editor binds keys for the upper five; the lower three stay readable from
/// imported files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Right = 0,
    UpRight = 45,
    Up = 90,
    UpLeft = 135,
    Left = 180,
    DownLeft = 225,
    Down = 270,
    DownRight = 315,
}

impl Direction {
    pub fn angle(self) -> i32 {
        self as i32
    }

    pub fn from_angle(angle: i32) -> Option<Direction> {
        match angle {
            0 => Some(Direction::Right),
            45 => Some(Direction::UpRight),
            90 => Some(Direction::Up),
            135 => Some(Direction::UpLeft),
            180 => Some(Direction::Left),
            225 => Some(Direction::DownLeft),
            270 => Some(Direction::Down),
            315 => Some(Direction::DownRight),
            _ => None,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Right => "→",
            Direction::UpRight => "↗",
            Direction::Up => "↑",
            Direction::UpLeft => "↖",
            Direction::Left => "←",
            Direction::DownLeft => "↙",
            Direction::Down => "↓",
            Direction::DownRight => "↘",
        }
    }
}

/// A timed event on one lane.
#[derive(Clone, Debug)]
pub struct Note {
    /// Chart-assigned identity; 0 until the note is inserted.
    pub id: NoteId,
    pub tick: i64,
    pub lane: Lane,
    pub direction: Option<Direction>,
    pub side: Side,
    /// Marks the start of a dragged connector.
    pub is_longnote: bool,
    /// BPM number; meaningful only on the BPM lane.
    pub value: f32,
}

impl Note {
    pub fn new(tick: i64, lane: Lane) -> Self {
        Self {
            id: 0,
            tick,
            lane,
            direction: None,
            side: Side::None,
            is_longnote: false,
            value: 0.0,
        }
    }
}

// ---------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------

#[derive(Serialize, Deserialize, Default)]
struct ChartFile {
    events: Vec<ChartEvent>,
}

#[derive(Serialize, Deserialize)]
struct ChartEvent {
    #[serde(default)]
    row: i64,
    #[serde(default)]
    channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    side: Option<String>,
    #[serde(rename = "longNote", default)]
    long_note: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    angle: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f32>,
}

impl ChartEvent {
    fn from_note(note: &Note) -> Self {
        Self {
            row: note.tick,
            channel: note.lane.name().to_string(),
            side: match note.side {
                Side::None => None,
                Side::Left => Some("left".to_string()),
                Side::Right => Some("right".to_string()),
            },
            long_note: note.is_longnote,
            angle: note.direction.map(Direction::angle),
            value: (note.lane == Lane::Bpm).then_some(note.value),
        }
    }

    /// Note for this event, or `None` when the channel names no real lane.
    fn to_note(&self) -> Option<Note> {
        let lane = Lane::from_name(&self.channel)?;
        let mut note = Note::new(self.row, lane);
        note.side = match self.side.as_deref() {
            Some("left") => Side::Left,
            Some("right") => Side::Right,
            _ => Side::None,
        };
        note.is_longnote = self.long_note;
        note.direction = self.angle.and_then(Direction::from_angle);
        note.value = self.value.unwrap_or(0.0);
        Some(note)
    }
}

// ---------------------------------------------------------------
// Notechart
// ---------------------------------------------------------------

#[derive(Default)]
pub struct Notechart {
    /// Owning store, keyed by id.
    index: HashMap<NoteId, Note>,
    /// Display order: ids sorted ascending by tick, stable for equal ticks.
    order: Vec<NoteId>,
    next_id: NoteId,
    updated: bool,
}

impl Notechart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the chart has been mutated since the last [`update`](Self::update).
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Clear the dirty flag (after a save).
    pub fn update(&mut self) {
        self.updated = false;
    }

    /// Set the dirty flag.
    pub fn modify(&mut self) {
        self.updated = true;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert a note. A note already occupying the same (tick, lane) wins:
    /// the insert is silently dropped. Otherwise the note gets the next
    /// sequence id and the display order is re-sorted (stable, so equal
    /// ticks keep their insertion order).
    pub fn add_note(&mut self, mut note: Note) {
        let occupied = self
            .index
            .values()
            .any(|n| n.tick == note.tick && n.lane == note.lane);
        if occupied {
            return;
        }

        self.modify();

        note.id = self.next_id;
        self.next_id += 1;

        let id = note.id;
        self.index.insert(id, note);
        self.order.push(id);

        let index = &self.index;
        self.order.sort_by_key(|id| index[id].tick);
    }

    /// Remove a note by id. Unknown ids are a safe no-op.
    pub fn remove(&mut self, id: NoteId) {
        if self.index.remove(&id).is_some() {
            self.order.retain(|&n| n != id);
            self.modify();
        }
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.index.get(&id)
    }

    /// Set the flick direction of an identified note. No-op for unknown ids.
    pub fn set_direction(&mut self, id: NoteId, direction: Option<Direction>) {
        if let Some(note) = self.index.get_mut(&id) {
            note.direction = direction;
            self.modify();
        }
    }

    /// Set the side of an identified note. No-op for unknown ids.
    pub fn set_side(&mut self, id: NoteId, side: Side) {
        if let Some(note) = self.index.get_mut(&id) {
            note.side = side;
            self.modify();
        }
    }

    /// Notes in display order (ascending tick, stable for equal ticks).
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.order.iter().map(|id| &self.index[id])
    }

    /// True iff both lanes fall in the same paired-lane group. Always false
    /// when either note sits on the BPM lane.
    pub fn is_same_lane_group(a: &Note, b: &Note) -> bool {
        match (a.lane.group(), b.lane.group()) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }

    /// Serialize to the `.thapsteak` exchange format.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let file = ChartFile {
            events: self.notes().map(ChartEvent::from_note).collect(),
        };
        serde_json::to_string_pretty(&file)
    }

    /// Build a chart from the exchange format. The result is a fresh chart
    /// populated through [`add_note`](Self::add_note), so dedup, ordering
    /// and id assignment apply to imported data exactly as they do to
    /// interactive placement. Callers swap the result in only on success —
    /// a malformed file never destroys the open chart.
    pub fn from_json(source: &str) -> serde_json::Result<Notechart> {
        let file: ChartFile = serde_json::from_str(source)?;
        let mut chart = Notechart::new();
        for event in &file.events {
            if let Some(note) = event.to_note() {
                chart.add_note(note);
            }
        }
        Ok(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(tick: i64, lane: Lane) -> Note {
        Note::new(tick, lane)
    }

    #[test]
    fn test_notes_stay_sorted_by_tick() {
        let mut chart = Notechart::new();
        for &tick in &[96, 0, 192, 48, 48, 12] {
            chart.add_note(note(tick, Lane::H1));
            let ticks: Vec<i64> = chart.notes().map(|n| n.tick).collect();
            let mut sorted = ticks.clone();
            sorted.sort();
            assert_eq!(ticks, sorted);
        }
        // The two tick-48 inserts target the same lane; only one survives.
        assert_eq!(chart.len(), 5);
    }

    #[test]
    fn test_duplicate_position_is_silently_rejected() {
        let mut chart = Notechart::new();
        chart.add_note(note(10, Lane::N2));
        assert!(chart.is_updated());

        chart.add_note(note(10, Lane::N2));
        assert_eq!(chart.len(), 1);
        // The rejected insert leaves the dirty flag where it was.
        assert!(chart.is_updated());

        chart.update();
        chart.add_note(note(10, Lane::N2));
        assert!(!chart.is_updated());
    }

    #[test]
    fn test_ids_are_strictly_increasing_and_never_reused() {
        let mut chart = Notechart::new();
        chart.add_note(note(0, Lane::H1));
        chart.add_note(note(1, Lane::H1));
        let ids: Vec<NoteId> = chart.notes().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1]);

        chart.remove(1);
        chart.add_note(note(2, Lane::H1));
        let ids: Vec<NoteId> = chart.notes().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut chart = Notechart::new();
        chart.add_note(note(0, Lane::E1));
        chart.update();
        chart.remove(999);
        assert_eq!(chart.len(), 1);
        assert!(!chart.is_updated());
    }

    #[test]
    fn test_edits_through_index_land_in_display_order() {
        let mut chart = Notechart::new();
        chart.add_note(note(0, Lane::H2));
        let id = chart.notes().next().unwrap().id;

        chart.set_direction(id, Some(Direction::UpLeft));
        chart.set_side(id, Side::Right);

        let n = chart.notes().next().unwrap();
        assert_eq!(n.direction, Some(Direction::UpLeft));
        assert_eq!(n.side, Side::Right);

        // Unknown ids are safe no-ops.
        chart.set_direction(999, None);
        chart.set_side(999, Side::Left);
    }

    #[test]
    fn test_lane_grouping() {
        let h1 = note(0, Lane::H1);
        let h5 = note(0, Lane::H5);
        let n1 = note(0, Lane::N1);
        let bpm = note(0, Lane::Bpm);

        assert!(Notechart::is_same_lane_group(&h1, &h5));
        assert!(Notechart::is_same_lane_group(&h5, &h1));
        assert!(Notechart::is_same_lane_group(&h1, &h1));
        assert!(!Notechart::is_same_lane_group(&h5, &n1));
        assert!(!Notechart::is_same_lane_group(&bpm, &h1));
        assert!(!Notechart::is_same_lane_group(&bpm, &bpm));
    }

    #[test]
    fn test_lane_columns_and_gaps() {
        assert_eq!(Lane::from_column(1), Some(Lane::Bpm));
        assert_eq!(Lane::from_column(7), Some(Lane::H5));
        assert_eq!(Lane::from_column(16), Some(Lane::E3));
        for gap in [0, 2, 8, 13, 17, 18] {
            assert_eq!(Lane::from_column(gap), None);
        }
    }

    #[test]
    fn test_direction_angles_round_trip() {
        for angle in [0, 45, 90, 135, 180, 225, 270, 315] {
            let direction = Direction::from_angle(angle).unwrap();
            assert_eq!(direction.angle(), angle);
        }
        assert_eq!(Direction::from_angle(30), None);
        assert_eq!(Direction::from_angle(360), None);
    }

    #[test]
    fn test_lane_names_round_trip() {
        for lane in Lane::ALL {
            assert_eq!(Lane::from_name(lane.name()), Some(lane));
        }
        assert_eq!(Lane::from_name("H6"), None);
    }

    #[test]
    fn test_equal_tick_scenario_keeps_insertion_order() {
        let mut chart = Notechart::new();
        chart.add_note(note(0, Lane::H1));

        let mut h3 = note(0, Lane::H3);
        h3.side = Side::Right;
        chart.add_note(h3);

        let mut h5 = note(16, Lane::H5);
        h5.side = Side::Right;
        h5.is_longnote = true;
        chart.add_note(h5);

        let lanes: Vec<Lane> = chart.notes().map(|n| n.lane).collect();
        assert_eq!(lanes, vec![Lane::H1, Lane::H3, Lane::H5]);

        let notes: Vec<&Note> = chart.notes().collect();
        assert!(Notechart::is_same_lane_group(notes[1], notes[2]));
    }

    #[test]
    fn test_json_round_trip_preserves_note_fields() {
        let mut chart = Notechart::new();
        let mut a = note(0, Lane::H1);
        a.direction = Some(Direction::Left);
        chart.add_note(a);

        let mut b = note(96, Lane::N3);
        b.side = Side::Left;
        b.is_longnote = true;
        chart.add_note(b);

        let mut c = note(192, Lane::Bpm);
        c.value = 174.5;
        chart.add_note(c);

        let json = chart.to_json().unwrap();
        let restored = Notechart::from_json(&json).unwrap();

        let mut original: Vec<_> = chart
            .notes()
            .map(|n| (n.tick, n.lane, n.side, n.is_longnote, n.direction, n.value.to_bits()))
            .collect();
        let mut roundtrip: Vec<_> = restored
            .notes()
            .map(|n| (n.tick, n.lane, n.side, n.is_longnote, n.direction, n.value.to_bits()))
            .collect();
        original.sort_by_key(|t| (t.0, t.1.column()));
        roundtrip.sort_by_key(|t| (t.0, t.1.column()));
        assert_eq!(original, roundtrip);
    }

    #[test]
    fn test_import_defaults_and_unknown_channels() {
        let json = r#"{"events":[
            {"row": 5, "channel": "E2"},
            {"row": 5, "channel": "MYSTERY"},
            {"row": 7, "channel": "H4", "side": "right", "longNote": true, "angle": 90}
        ]}"#;
        let chart = Notechart::from_json(json).unwrap();
        assert_eq!(chart.len(), 2);

        let first = chart.notes().next().unwrap();
        assert_eq!(first.lane, Lane::E2);
        assert_eq!(first.side, Side::None);
        assert_eq!(first.direction, None);
        assert!(!first.is_longnote);
        assert_eq!(first.value, 0.0);

        let second = chart.notes().nth(1).unwrap();
        assert_eq!(second.side, Side::Right);
        assert!(second.is_longnote);
        assert_eq!(second.direction, Some(Direction::Up));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Notechart::from_json("{\"events\": [").is_err());
        assert!(Notechart::from_json("not json at all").is_err());
    }
}
