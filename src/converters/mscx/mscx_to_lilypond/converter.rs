//! Event rendering
//!
//! Turns a staff's flattened measures into LilyPond text, one token per
//! event. Rendering is stateful per voice: the active key and time
//! signature carry over from measure to measure, and decorations that
//! MuseScore stores *before* the note they belong to (dynamics, fermatas,
//! hairpins, playing-technique text) are buffered and attached to the next
//! chord or rest of the same voice.

use crate::converters::mscx::mscx_to_lilypond::errors::ConversionError;
use crate::converters::mscx::mscx_to_lilypond::pitch::{
    partial_for, render_key_signature, resolve_duration, spell_pitch,
};
use crate::converters::mscx::mscx_to_lilypond::types::{
    Chord, Event, KeySig, Measure, Note, PlayTechAnnotation, Rest, SkippedElement, Spanner,
    Tempo, TimeSig,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Conversion context that tracks position and skipped elements
pub struct ConversionContext {
    pub current_part_id: String,
    pub current_staff_id: Option<String>,
    pub current_measure: usize,
    pub skipped_elements: Vec<SkippedElement>,
}

impl ConversionContext {
    pub fn new(part_id: String) -> Self {
        Self {
            current_part_id: part_id,
            current_staff_id: None,
            current_measure: 0,
            skipped_elements: Vec::new(),
        }
    }

    pub fn add_skipped(&mut self, element_type: &str, reason: &str) {
        self.skipped_elements.push(SkippedElement {
            element_type: element_type.to_string(),
            part_id: Some(self.current_part_id.clone()),
            staff_id: self.current_staff_id.clone(),
            measure_number: if self.current_measure > 0 {
                Some(self.current_measure)
            } else {
                None
            },
            reason: reason.to_string(),
        });
    }
}

// ============================================================================
// DEFERRED MODIFIERS
// ============================================================================

/// Kind of decoration waiting for the next sounding event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierCategory {
    Dynamic,
    Spanner,
    Text,
    Fermata,
}

impl ModifierCategory {
    /// Order in which suffixes follow the primary token
    pub const DRAIN_ORDER: [ModifierCategory; 4] = [
        ModifierCategory::Dynamic,
        ModifierCategory::Spanner,
        ModifierCategory::Text,
        ModifierCategory::Fermata,
    ];

    fn index(self) -> usize {
        match self {
            ModifierCategory::Dynamic => 0,
            ModifierCategory::Spanner => 1,
            ModifierCategory::Text => 2,
            ModifierCategory::Fermata => 3,
        }
    }

    /// Source element name, for skip reports
    pub fn element_type(self) -> &'static str {
        match self {
            ModifierCategory::Dynamic => "Dynamic",
            ModifierCategory::Spanner => "Spanner",
            ModifierCategory::Text => "PlayTechAnnotation",
            ModifierCategory::Fermata => "Fermata",
        }
    }
}

/// One LIFO stack of rendered suffixes per category
#[derive(Debug, Default, Clone)]
pub struct DeferredModifiers {
    stacks: [Vec<String>; 4],
}

impl DeferredModifiers {
    /// Buffer a rendered suffix. Empty renderings (unknown subtypes) are
    /// not buffered.
    pub fn push(&mut self, category: ModifierCategory, suffix: String) {
        if !suffix.is_empty() {
            self.stacks[category.index()].push(suffix);
        }
    }

    /// Pop everything, category by category, into one suffix string
    pub fn drain(&mut self) -> String {
        let mut out = String::new();
        for category in ModifierCategory::DRAIN_ORDER {
            let stack = &mut self.stacks[category.index()];
            while let Some(suffix) = stack.pop() {
                out.push_str(&suffix);
            }
        }
        out
    }

    /// Remove and return whatever was never attached
    pub fn take_unconsumed(&mut self) -> Vec<(ModifierCategory, String)> {
        let mut out = Vec::new();
        for category in ModifierCategory::DRAIN_ORDER {
            out.extend(
                self.stacks[category.index()]
                    .drain(..)
                    .map(|suffix| (category, suffix)),
            );
        }
        out
    }
}

/// Rendering state of one voice
#[derive(Debug, Default, Clone)]
pub struct VoiceState {
    pub current_key_sig: Option<KeySig>,
    pub current_time_sig: Option<TimeSig>,
    pub deferred: DeferredModifiers,
}

impl VoiceState {
    /// Own key, else the key of the first voice
    fn concert_key(&self, fallback: Option<KeySig>) -> Option<i32> {
        self.current_key_sig.or(fallback).map(|k| k.concert_key)
    }
}

// ============================================================================
// STAFF / MEASURE / VOICE
// ============================================================================

/// Render every measure of a staff. Voice state persists across measures.
pub fn render_staff(
    measures: &[Measure],
    context: &mut ConversionContext,
) -> Result<Vec<String>, ConversionError> {
    let mut voice_states: Vec<VoiceState> = Vec::new();
    let mut rendered = Vec::with_capacity(measures.len());

    for (idx, measure) in measures.iter().enumerate() {
        context.current_measure = idx + 1;
        rendered.push(render_measure(measure, &mut voice_states, context)?);
    }

    Ok(rendered)
}

/// Render one measure; multiple voices become a simultaneous construct
pub fn render_measure(
    measure: &Measure,
    voice_states: &mut Vec<VoiceState>,
    context: &mut ConversionContext,
) -> Result<String, ConversionError> {
    if voice_states.len() < measure.voices.len() {
        voice_states.resize_with(measure.voices.len(), VoiceState::default);
    }

    // key signatures live in the first voice only
    let mut voice_texts = Vec::with_capacity(measure.voices.len());
    for (idx, voice) in measure.voices.iter().enumerate() {
        let fallback_key = if idx > 0 {
            voice_states[0].current_key_sig
        } else {
            None
        };
        voice_texts.push(render_voice(
            voice,
            &mut voice_states[idx],
            fallback_key,
            context,
        )?);
    }

    let body = if voice_texts.len() > 1 {
        let inner = voice_texts
            .iter()
            .map(|v| format!("{{ {} }}", v))
            .collect::<Vec<_>>()
            .join(" \\\\ ");
        format!("<< {} >>", inner)
    } else {
        voice_texts.pop().unwrap_or_default()
    };

    match measure.len {
        Some(len) => Ok(format!("{} {}", partial_for(len)?, body)),
        None => Ok(body),
    }
}

/// Render one voice of one measure
pub fn render_voice(
    events: &[Event],
    state: &mut VoiceState,
    fallback_key: Option<KeySig>,
    context: &mut ConversionContext,
) -> Result<String, ConversionError> {
    let mut tokens: Vec<String> = Vec::new();

    for event in events {
        match event {
            Event::KeySig(key) => {
                state.current_key_sig = Some(*key);
                tokens.push(render_key_signature(key.concert_key));
            }
            Event::TimeSig(time) => {
                state.current_time_sig = Some(*time);
                tokens.push(render_time_signature(time));
            }
            Event::Tempo(tempo) => {
                if let Some(text) = render_tempo(tempo) {
                    tokens.push(text);
                }
            }
            Event::Clef(clef) => tokens.push(render_clef(&clef.clef_type)),
            Event::BarLine(bar) => {
                if let Some(text) = render_bar_line(&bar.subtype) {
                    tokens.push(text);
                }
            }
            Event::Dynamic(dynamic) => state
                .deferred
                .push(ModifierCategory::Dynamic, render_dynamic(&dynamic.subtype)),
            Event::Spanner(spanner) => state
                .deferred
                .push(ModifierCategory::Spanner, render_voice_spanner(spanner)),
            Event::PlayTechAnnotation(annotation) => state
                .deferred
                .push(ModifierCategory::Text, render_play_tech(annotation)),
            Event::Fermata(fermata) => state
                .deferred
                .push(ModifierCategory::Fermata, render_fermata(&fermata.subtype)),
            Event::Rest(rest) => {
                let mut token = render_rest(rest)?;
                token.push_str(&state.deferred.drain());
                tokens.push(token);
            }
            Event::Chord(chord) => {
                let mut token = render_chord(chord, state.concert_key(fallback_key))?;
                token.push_str(&state.deferred.drain());
                tokens.push(token);
            }
        }
    }

    // Nothing left in this voice to attach to
    for (category, suffix) in state.deferred.take_unconsumed() {
        log::warn!(
            "Dropping {} '{}' at end of voice (part {}, measure {})",
            category.element_type(),
            suffix,
            context.current_part_id,
            context.current_measure
        );
        context.add_skipped(
            category.element_type(),
            &format!("No chord or rest follows '{}' in its voice", suffix),
        );
    }

    Ok(tokens.join(" "))
}

// ============================================================================
// SOUNDING EVENTS
// ============================================================================

fn duration_with_dots(token: &str, dots: u32) -> Result<String, ConversionError> {
    let duration = resolve_duration(token)?;
    Ok(format!("{}{}", duration, ".".repeat(dots as usize)))
}

/// Convert a rest; full-measure rests use their explicit length
pub fn render_rest(rest: &Rest) -> Result<String, ConversionError> {
    let token = rest.duration.as_deref().unwrap_or(&rest.duration_type);

    if rest.duration_type == "measure" {
        let letter = if rest.visible { "R" } else { "s" };
        return Ok(format!("{}{}", letter, resolve_duration(token)?));
    }

    let letter = if rest.visible { "r" } else { "s" };
    Ok(format!("{}{}", letter, duration_with_dots(token, rest.dots)?))
}

/// Convert a note name, marking explicit accidentals with `!`
pub fn render_note(note: &Note, concert_key: Option<i32>) -> String {
    let name = spell_pitch(note.midi_pitch, concert_key);
    if note.has_accidental_mark {
        format!("{}!", name)
    } else {
        name
    }
}

/// Convert a chord (or single note) with its attached marks
pub fn render_chord(chord: &Chord, concert_key: Option<i32>) -> Result<String, ConversionError> {
    let duration = duration_with_dots(&chord.duration_type, chord.dots)?;

    let notes: Vec<String> = chord
        .notes
        .iter()
        .map(|n| render_note(n, concert_key))
        .collect();

    let mut result = match notes.len() {
        0 => {
            log::warn!("Chord without notes, rendering as spacer");
            format!("s{}", duration)
        }
        1 => format!("{}{}", notes[0], duration),
        _ => format!("<{}>{}", notes.join(" "), duration),
    };

    if let Some(subtype) = &chord.tremolo_subtype {
        let mut chars = subtype.chars();
        chars.next();
        let value = chars.as_str();
        if !value.is_empty() {
            result.push(':');
            result.push_str(value);
        }
    }

    for articulation in &chord.articulations {
        result.push_str(articulation_to_lilypond(articulation));
    }

    for spanner in chord.spanners.iter().filter(|s| s.spanner_type == "Slur") {
        if spanner.is_start {
            result.push('(');
        }
        if spanner.is_end {
            result.push(')');
        }
    }

    let tied = chord.notes.iter().any(|note| {
        note.ties
            .iter()
            .any(|t| t.spanner_type == "Tie" && t.is_start)
    });
    if tied {
        result.push('~');
    }

    Ok(result)
}

// ============================================================================
// STANDALONE DIRECTIVES
// ============================================================================

pub fn render_time_signature(time: &TimeSig) -> String {
    format!("\\time {}/{}", time.sig_n, time.sig_d)
}

/// MuseScore stores tempo in quarter beats per second
pub fn render_tempo(tempo: &Tempo) -> Option<String> {
    let beats_per_second = tempo.tempo?;
    if !beats_per_second.is_finite() || beats_per_second <= 0.0 {
        return None;
    }
    let bpm = (beats_per_second * 60.0).round() as u32;
    Some(format!("\\tempo 4 = {}", bpm))
}

/// Convert a MuseScore clef name
pub fn render_clef(clef: &str) -> String {
    let name = match clef {
        "G" => "treble",
        "F" => "bass",
        "C" | "C3" => "alto",
        "C4" => "tenor",
        "C1" => "soprano",
        "C2" => "mezzosoprano",
        "G8vb" => "\"treble_8\"",
        "F8vb" => "\"bass_8\"",
        "G8va" => "\"treble^8\"",
        "G15ma" => "\"treble^15\"",
        "PERC" | "PERC2" => "percussion",
        _ => "treble",
    };
    format!("\\clef {}", name)
}

/// Convert a barline subtype; unknown subtypes render nothing
pub fn render_bar_line(subtype: &str) -> Option<String> {
    let glyph = match subtype {
        "double" => "||",
        "end" => "|.",
        "start-repeat" => ".|:",
        "end-repeat" => ":|.",
        "end-start-repeat" => ":|.|:",
        "dashed" => "!",
        "dotted" => ";",
        "heavy" => ".",
        "double-heavy" => "..",
        "reverse-end" => ".|",
        _ => return None,
    };
    Some(format!("\\bar \"{}\"", glyph))
}

// ============================================================================
// DEFERRED DECORATIONS
// ============================================================================

const DYNAMICS: [&str; 20] = [
    "pppp", "ppp", "pp", "p", "mp", "mf", "f", "ff", "fff", "ffff", "fp", "sf", "sfz", "sff",
    "sffz", "sfp", "rfz", "rf", "fz", "sfpp",
];

pub fn render_dynamic(subtype: &str) -> String {
    if DYNAMICS.contains(&subtype) {
        format!("\\{}", subtype)
    } else {
        String::new()
    }
}

pub fn render_fermata(subtype: &str) -> String {
    let (name, below) = match subtype {
        "fermataAbove" => ("fermata", false),
        "fermataBelow" => ("fermata", true),
        "fermataShortAbove" => ("shortfermata", false),
        "fermataShortBelow" => ("shortfermata", true),
        "fermataLongAbove" => ("longfermata", false),
        "fermataLongBelow" => ("longfermata", true),
        "fermataVeryShortAbove" => ("veryshortfermata", false),
        "fermataVeryShortBelow" => ("veryshortfermata", true),
        "fermataVeryLongAbove" => ("verylongfermata", false),
        "fermataVeryLongBelow" => ("verylongfermata", true),
        _ => return String::new(),
    };
    if below {
        format!("_\\{}", name)
    } else {
        format!("\\{}", name)
    }
}

/// Playing technique text above the staff (`pizz.`, `arco`, ...)
pub fn render_play_tech(annotation: &PlayTechAnnotation) -> String {
    let text = annotation
        .text
        .as_deref()
        .or(annotation.play_tech_type.as_deref())
        .map(str::trim)
        .unwrap_or("");
    if text.is_empty() {
        return String::new();
    }
    format!("^\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Voice-level spanner boundaries: hairpins and slurs
pub fn render_voice_spanner(spanner: &Spanner) -> String {
    let mut result = String::new();
    match spanner.spanner_type.as_str() {
        "HairPin" => {
            if spanner.is_start {
                let decrescendo = matches!(spanner.payload.as_deref(), Some("1") | Some("3"));
                result.push_str(if decrescendo { "\\>" } else { "\\<" });
            }
            if spanner.is_end {
                result.push_str("\\!");
            }
        }
        "Slur" => {
            if spanner.is_start {
                result.push('(');
            }
            if spanner.is_end {
                result.push(')');
            }
        }
        _ => {}
    }
    result
}

static ARTICULATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("articStaccatoAbove", "-."),
        ("articStaccatoBelow", "-."),
        ("articStaccatissimoAbove", "-!"),
        ("articStaccatissimoBelow", "-!"),
        ("articStaccatissimoStrokeAbove", "-!"),
        ("articStaccatissimoWedgeAbove", "-!"),
        ("articAccentAbove", "->"),
        ("articAccentBelow", "->"),
        ("articMarcatoAbove", "-^"),
        ("articMarcatoBelow", "-^"),
        ("articTenutoAbove", "--"),
        ("articTenutoBelow", "--"),
        ("articTenutoStaccatoAbove", "-_"),
        ("articTenutoStaccatoBelow", "-_"),
        ("articAccentStaccatoAbove", "->-."),
        ("articAccentStaccatoBelow", "->-."),
        ("articMarcatoStaccatoAbove", "-^-."),
        ("articMarcatoStaccatoBelow", "-^-."),
        ("brassMuteClosed", "-+"),
        ("stringsUpBow", "\\upbow"),
        ("stringsDownBow", "\\downbow"),
        ("stringsHarmonic", "\\flageolet"),
        ("ornamentTrill", "\\trill"),
        ("ornamentTurn", "\\turn"),
        ("ornamentMordent", "\\mordent"),
        ("ornamentShortTrill", "\\prall"),
    ])
});

/// Convert an articulation subtype; unknown kinds render nothing
pub fn articulation_to_lilypond(subtype: &str) -> &'static str {
    ARTICULATIONS.get(subtype).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::mscx::mscx_to_lilypond::types::{Dynamic, Fermata};
    use num_rational::Ratio;

    fn note(pitch: i32) -> Note {
        Note {
            midi_pitch: pitch,
            has_accidental_mark: false,
            ties: Vec::new(),
        }
    }

    fn chord(duration: &str, pitches: &[i32]) -> Chord {
        Chord {
            duration_type: duration.to_string(),
            dots: 0,
            notes: pitches.iter().map(|p| note(*p)).collect(),
            tremolo_subtype: None,
            articulations: Vec::new(),
            spanners: Vec::new(),
        }
    }

    fn rest(duration: &str) -> Rest {
        Rest {
            duration_type: duration.to_string(),
            duration: None,
            dots: 0,
            visible: true,
        }
    }

    fn spanner(kind: &str, is_start: bool, is_end: bool) -> Spanner {
        Spanner {
            spanner_type: kind.to_string(),
            is_start,
            is_end,
            payload: None,
        }
    }

    fn fermata() -> Event {
        Event::Fermata(Fermata {
            subtype: "fermataAbove".to_string(),
        })
    }

    fn dynamic(subtype: &str) -> Event {
        Event::Dynamic(Dynamic {
            subtype: subtype.to_string(),
        })
    }

    fn render(events: Vec<Event>) -> (String, ConversionContext) {
        let mut context = ConversionContext::new("P1".to_string());
        let mut state = VoiceState::default();
        let text = render_voice(&events, &mut state, None, &mut context).unwrap();
        (text, context)
    }

    #[test]
    fn test_single_note_and_chord() {
        assert_eq!(render_chord(&chord("quarter", &[60]), None).unwrap(), "c'4");
        assert_eq!(
            render_chord(&chord("half", &[60, 64, 67]), Some(0)).unwrap(),
            "<c' e' g'>2"
        );
    }

    #[test]
    fn test_chord_dots_tremolo_articulation_tie() {
        let mut c = chord("eighth", &[62]);
        c.dots = 1;
        c.tremolo_subtype = Some("r32".to_string());
        c.articulations = vec!["articStaccatoBelow".to_string(), "unknownThing".to_string()];
        c.notes[0].ties.push(spanner("Tie", true, false));
        assert_eq!(render_chord(&c, None).unwrap(), "d'8.:32-.~");
    }

    #[test]
    fn test_chord_slur_open_and_close_on_same_chord() {
        let mut c = chord("quarter", &[60]);
        c.spanners.push(spanner("Slur", true, true));
        assert_eq!(render_chord(&c, None).unwrap(), "c'4()");
    }

    #[test]
    fn test_tie_end_only_adds_nothing() {
        let mut c = chord("quarter", &[60]);
        c.notes[0].ties.push(spanner("Tie", false, true));
        assert_eq!(render_chord(&c, None).unwrap(), "c'4");
    }

    #[test]
    fn test_unknown_duration_aborts() {
        let result = render_chord(&chord("sixtyfifth", &[60]), None);
        assert_eq!(
            result,
            Err(ConversionError::UnknownDuration("sixtyfifth".to_string()))
        );
    }

    #[test]
    fn test_rests() {
        assert_eq!(render_rest(&rest("quarter")).unwrap(), "r4");

        let mut measure_rest = rest("measure");
        measure_rest.duration = Some("4/4".to_string());
        assert_eq!(render_rest(&measure_rest).unwrap(), "R1");

        let mut hidden = rest("eighth");
        hidden.visible = false;
        hidden.dots = 1;
        assert_eq!(render_rest(&hidden).unwrap(), "s8.");
    }

    #[test]
    fn test_measure_rests_in_uneven_meters() {
        for (length, expected) in [("9/8", "R1*9/8"), ("5/4", "R1*5/4"), ("2/8", "R4"), ("6/4", "R1.")] {
            let mut measure_rest = rest("measure");
            measure_rest.duration = Some(length.to_string());
            assert_eq!(render_rest(&measure_rest).unwrap(), expected);
        }
    }

    #[test]
    fn test_fermata_attaches_to_following_chord() {
        let (text, context) = render(vec![
            fermata(),
            Event::Chord(chord("quarter", &[60])),
            Event::Chord(chord("quarter", &[62])),
        ]);
        assert_eq!(text, "c'4\\fermata d'4");
        assert!(context.skipped_elements.is_empty());
    }

    #[test]
    fn test_deferred_category_order() {
        let mut hairpin = spanner("HairPin", true, false);
        hairpin.payload = Some("0".to_string());
        let (text, _) = render(vec![
            fermata(),
            Event::PlayTechAnnotation(PlayTechAnnotation {
                play_tech_type: Some("pizzicato".to_string()),
                text: Some("pizz.".to_string()),
            }),
            Event::Spanner(hairpin),
            dynamic("p"),
            Event::Rest(rest("quarter")),
        ]);
        assert_eq!(text, "r4\\p\\<^\"pizz.\"\\fermata");
    }

    #[test]
    fn test_deferred_same_category_is_lifo() {
        let (text, _) = render(vec![
            dynamic("p"),
            dynamic("sf"),
            Event::Chord(chord("quarter", &[60])),
        ]);
        assert_eq!(text, "c'4\\sf\\p");
    }

    #[test]
    fn test_trailing_modifier_is_dropped_and_reported() {
        let (text, context) = render(vec![Event::Chord(chord("quarter", &[60])), fermata()]);
        assert_eq!(text, "c'4");
        assert_eq!(context.skipped_elements.len(), 1);
        assert_eq!(context.skipped_elements[0].element_type, "Fermata");
    }

    #[test]
    fn test_trailing_modifier_never_reaches_next_measure() {
        let measures = vec![
            Measure {
                irregular: false,
                len: None,
                voices: vec![vec![Event::Chord(chord("half", &[60])), fermata()]],
            },
            Measure {
                irregular: false,
                len: None,
                voices: vec![vec![Event::Chord(chord("half", &[62]))]],
            },
        ];
        let mut context = ConversionContext::new("P1".to_string());
        let rendered = render_staff(&measures, &mut context).unwrap();
        assert_eq!(rendered, vec!["c'2".to_string(), "d'2".to_string()]);
        assert_eq!(context.skipped_elements[0].measure_number, Some(1));
    }

    #[test]
    fn test_key_signature_persists_across_measures() {
        let measures = vec![
            Measure {
                irregular: false,
                len: None,
                voices: vec![vec![
                    Event::KeySig(KeySig { concert_key: -3 }),
                    Event::Chord(chord("half", &[63])),
                ]],
            },
            Measure {
                irregular: false,
                len: None,
                voices: vec![vec![Event::Chord(chord("half", &[61]))]],
            },
        ];
        let mut context = ConversionContext::new("P1".to_string());
        let rendered = render_staff(&measures, &mut context).unwrap();
        assert_eq!(rendered[0], "\\key es \\major es'2");
        assert_eq!(rendered[1], "des'2");
    }

    #[test]
    fn test_multiple_voices_and_partial_measure() {
        let measure = Measure {
            irregular: true,
            len: Some(Ratio::new(1, 4)),
            voices: vec![
                vec![Event::Chord(chord("quarter", &[72]))],
                vec![Event::Chord(chord("quarter", &[60]))],
            ],
        };
        let mut context = ConversionContext::new("P1".to_string());
        let mut states = Vec::new();
        let text = render_measure(&measure, &mut states, &mut context).unwrap();
        assert_eq!(text, "\\partial 4 << { c''4 } \\\\ { c'4 } >>");
        assert_eq!(states.len(), 2);
    }

    #[test]
    fn test_second_voice_spells_in_first_voice_key() {
        let measure = Measure {
            irregular: false,
            len: None,
            voices: vec![
                vec![
                    Event::KeySig(KeySig { concert_key: -2 }),
                    Event::Chord(chord("whole", &[70])),
                ],
                vec![Event::Chord(chord("whole", &[63]))],
            ],
        };
        let mut context = ConversionContext::new("P1".to_string());
        let mut states = Vec::new();
        let text = render_measure(&measure, &mut states, &mut context).unwrap();
        assert_eq!(text, "<< { \\key bes \\major bes'1 } \\\\ { es'1 } >>");
    }

    #[test]
    fn test_directives() {
        assert_eq!(
            render_time_signature(&TimeSig { sig_n: 6, sig_d: 8 }),
            "\\time 6/8"
        );
        assert_eq!(
            render_tempo(&Tempo { tempo: Some(2.0) }).as_deref(),
            Some("\\tempo 4 = 120")
        );
        assert_eq!(render_tempo(&Tempo { tempo: None }), None);
        assert_eq!(render_clef("F"), "\\clef bass");
        assert_eq!(render_clef("G8vb"), "\\clef \"treble_8\"");
        assert_eq!(render_clef("weird"), "\\clef treble");
        assert_eq!(render_bar_line("double").as_deref(), Some("\\bar \"||\""));
        assert_eq!(render_bar_line("normal"), None);
    }

    #[test]
    fn test_unknown_decorations_render_empty() {
        assert_eq!(render_dynamic("other"), "");
        assert_eq!(render_fermata("fermataMystery"), "");
        assert_eq!(articulation_to_lilypond("articNothing"), "");
        assert_eq!(render_voice_spanner(&spanner("Ottava", true, false)), "");
        assert_eq!(render_fermata("fermataBelow"), "_\\fermata");
    }

    #[test]
    fn test_hairpin_boundaries() {
        let mut start = spanner("HairPin", true, false);
        start.payload = Some("1".to_string());
        assert_eq!(render_voice_spanner(&start), "\\>");
        assert_eq!(render_voice_spanner(&spanner("HairPin", false, true)), "\\!");
    }
}
