//! Data types for MuseScore to LilyPond conversion
//!
//! Three groups live here: the settings/result pair that forms the public
//! API, the structured score model built from the ordered tree, and the
//! per-part accumulation record used by the document assembler.

use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// SETTINGS AND RESULT
// ============================================================================

/// Conversion settings. Every option is optional; an unset option omits its
/// directive from the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionSettings {
    /// Paper size name for the score book (e.g. "a4", "a3landscape")
    pub score_paper_size: Option<String>,
    /// Paper size name for the part books
    pub parts_paper_size: Option<String>,
    /// Staff size for the score book
    pub score_staff_size: Option<f64>,
    /// Staff size for the part books
    pub parts_staff_size: Option<f64>,
    /// Version written by [`ConversionResult::combined`]
    pub target_lilypond_version: String,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            score_paper_size: None,
            parts_paper_size: None,
            score_staff_size: None,
            parts_staff_size: None,
            target_lilypond_version: "2.24.0".to_string(),
        }
    }
}

/// Something the converter saw but could not render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedElement {
    pub element_type: String,
    pub part_id: Option<String>,
    pub staff_id: Option<String>,
    /// 1-based measure number within the staff
    pub measure_number: Option<usize>,
    pub reason: String,
}

/// The three output buffers plus a skip report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// Music macro definitions
    pub music: String,
    /// One `\book` per part
    pub parts: String,
    /// The full score `\book`
    pub score: String,
    pub version: String,
    pub skipped_elements: Vec<SkippedElement>,
}

impl ConversionResult {
    /// Everything in one file: version header, music, score, then parts
    pub fn combined(&self) -> String {
        format!(
            "\\version \"{}\"\n\n{}\n{}\n{}",
            self.version, self.music, self.score, self.parts
        )
    }
}

// ============================================================================
// ORDER (INSTRUMENT FAMILIES AND SECTIONS)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderInfo {
    pub instruments: Vec<OrderInstrument>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderInstrument {
    pub id: String,
    pub family: Vec<InstrumentFamily>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentFamily {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub brackets: bool,
    pub bar_line_span: bool,
    pub thin_brackets: bool,
    pub family: Vec<String>,
    pub unsorted: Vec<Unsorted>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unsorted {
    pub group: Option<String>,
}

// ============================================================================
// STAFF CONTENT
// ============================================================================

/// One staff's content, independent of the part(s) that reference it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatStaff {
    pub id: String,
    pub measures: Vec<Measure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Measure {
    pub irregular: bool,
    /// Actual length when it differs from the time signature (pickups)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub len: Option<Ratio<u32>>,
    pub voices: Vec<Vec<Event>>,
}

/// Recognized voice content, in document order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Event {
    KeySig(KeySig),
    TimeSig(TimeSig),
    Tempo(Tempo),
    Rest(Rest),
    Chord(Chord),
    Clef(ClefChange),
    BarLine(BarLine),
    Fermata(Fermata),
    PlayTechAnnotation(PlayTechAnnotation),
    Spanner(Spanner),
    Dynamic(Dynamic),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySig {
    /// Signed circle-of-fifths offset
    pub concert_key: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSig {
    pub sig_n: u32,
    pub sig_d: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tempo {
    /// Beats per second, as stored by MuseScore
    pub tempo: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rest {
    pub duration_type: String,
    /// Explicit length token, present for full-measure rests
    pub duration: Option<String>,
    pub dots: u32,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chord {
    pub duration_type: String,
    pub dots: u32,
    pub notes: Vec<Note>,
    pub tremolo_subtype: Option<String>,
    pub articulations: Vec<String>,
    pub spanners: Vec<Spanner>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub midi_pitch: i32,
    pub has_accidental_mark: bool,
    pub ties: Vec<Spanner>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spanner {
    /// "Slur", "Tie", "HairPin", ...
    pub spanner_type: String,
    pub is_start: bool,
    pub is_end: bool,
    /// Subtype of the spanner body, when it has one (hairpin direction)
    pub payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClefChange {
    pub clef_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarLine {
    pub subtype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fermata {
    pub subtype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayTechAnnotation {
    pub play_tech_type: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dynamic {
    pub subtype: String,
}

// ============================================================================
// PARTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartInfo {
    pub id: String,
    pub track_name: String,
    pub instruments: Vec<InstrumentInfo>,
    pub staffs: Vec<PartStaff>,
}

impl PartInfo {
    /// Instrument id of the first instrument, used for section matching
    pub fn primary_instrument_id(&self) -> &str {
        self.instruments
            .first()
            .map(|i| i.instrument_id.as_str())
            .unwrap_or("")
    }

    pub fn primary_instrument(&self) -> Option<&InstrumentInfo> {
        self.instruments.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentInfo {
    pub id: Option<String>,
    pub long_name: String,
    pub short_name: String,
    pub track_name: String,
    pub instrument_id: String,
    pub transpose_diatonic: i32,
    pub transpose_chromatic: i32,
    /// Clef per staff number (1-based)
    pub clefs: Vec<(usize, String)>,
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub programs: Vec<String>,
    pub synti: Option<String>,
    pub midi_port: Option<u32>,
    pub midi_channel: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartStaff {
    pub id: String,
    pub default_clef: String,
    pub contents: Vec<Measure>,
}

/// A part on its own, or a contiguous run of parts of one section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum PartGroup {
    Part(PartInfo),
    Section {
        id: String,
        #[serde(rename = "barLineSpan")]
        bar_line_span: bool,
        parts: Vec<PartInfo>,
    },
}

impl PartGroup {
    /// Parts in this group, in order
    pub fn parts(&self) -> &[PartInfo] {
        match self {
            PartGroup::Part(part) => std::slice::from_ref(part),
            PartGroup::Section { parts, .. } => parts,
        }
    }
}

// ============================================================================
// METADATA
// ============================================================================

/// `metaTag` values keyed by name. Unrecognized names are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaInfo {
    pub tags: BTreeMap<String, String>,
}

impl MetaInfo {
    fn non_empty(&self, name: &str) -> Option<&str> {
        self.tags
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Work title, falling back to the movement title
    pub fn title(&self) -> Option<&str> {
        self.non_empty("workTitle")
            .or_else(|| self.non_empty("movementTitle"))
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.non_empty("subtitle")
    }

    pub fn composer(&self) -> Option<&str> {
        self.non_empty("composer")
    }

    pub fn lyricist(&self) -> Option<&str> {
        self.non_empty("lyricist")
    }

    pub fn arranger(&self) -> Option<&str> {
        self.non_empty("arranger")
    }

    pub fn copyright(&self) -> Option<&str> {
        self.non_empty("copyright")
    }
}

/// The structured model of one score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreModel {
    pub order: OrderInfo,
    pub groups: Vec<PartGroup>,
    pub meta: MetaInfo,
}

// ============================================================================
// RENDERING ACCUMULATION
// ============================================================================

/// Rendered output of one part, with identifiers already allocated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedPart {
    /// Macro identifier → rendered measures
    pub music_data: Vec<(String, Vec<String>)>,
    /// Staff blocks for the score, in order
    pub score_data: Vec<String>,
    /// One entry per part book
    pub part_data: Vec<PartBook>,
}

/// Content of one part's `\book`
#[derive(Debug, Clone, PartialEq)]
pub struct PartBook {
    /// Unique identifier, used as the output suffix
    pub id: String,
    /// Name shown in the header
    pub instrument_name: String,
    /// Staff (or piano staff) block
    pub staff: String,
}
