//! Pitch, duration and transposition resolvers
//!
//! MuseScore stores pitches as MIDI numbers in concert pitch and durations
//! as named or fractional tokens. Spelling is a key-signature heuristic, not
//! an enharmonic solver: the active key only chooses between sharp and flat
//! names for the black keys.

use crate::converters::mscx::mscx_to_lilypond::errors::ConversionError;
use num_rational::Ratio;
use once_cell::sync::Lazy;
use std::collections::HashMap;

// ============================================================================
// DURATIONS
// ============================================================================

/// Named duration token → LilyPond duration
static DURATION_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("long", "\\longa"),
        ("breve", "\\breve"),
        ("whole", "1"),
        ("half", "2"),
        ("quarter", "4"),
        ("eighth", "8"),
        ("16th", "16"),
        ("32nd", "32"),
        ("64th", "64"),
        ("128th", "128"),
    ])
});

/// Map a duration token to its LilyPond duration.
///
/// Named tokens come from the table. Fractional tokens (`9/8`, `1`) are
/// lengths in whole notes. Anything else is fatal: guessing would silently
/// corrupt timing.
pub fn resolve_duration(token: &str) -> Result<String, ConversionError> {
    let trimmed = token.trim();
    if let Some(duration) = DURATION_MAP.get(trimmed) {
        return Ok((*duration).to_string());
    }

    trimmed
        .parse::<Ratio<u32>>()
        .ok()
        .and_then(length_to_duration)
        .ok_or_else(|| ConversionError::UnknownDuration(token.to_string()))
}

/// Exact LilyPond duration of a length in whole notes.
///
/// Lengths that are no single note value get a multiplier (`1*9/8`).
pub fn length_to_duration(length: Ratio<u32>) -> Option<String> {
    if *length.numer() == 0 {
        return None;
    }
    Some(note_value(length).unwrap_or_else(|| format!("1*{}", length)))
}

/// Plain, dotted or double-dotted note value of exactly this length
fn note_value(length: Ratio<u32>) -> Option<String> {
    // \longa down to 128th
    (-2i32..=7).find_map(|exponent| {
        let (base, name) = if exponent < 0 {
            let whole_notes = 1u32 << (-exponent);
            let name = if exponent == -2 { "\\longa" } else { "\\breve" };
            (Ratio::from_integer(whole_notes), name.to_string())
        } else {
            let denominator = 1u32 << exponent;
            (Ratio::new(1, denominator), denominator.to_string())
        };

        (0..=2usize).find_map(|dots| {
            let dotted = base * (Ratio::from_integer(2) - Ratio::new(1, 1u32 << dots));
            (dotted == length).then(|| format!("{}{}", name, ".".repeat(dots)))
        })
    })
}

/// `\partial` directive for a measure of irregular length
pub fn partial_for(len: Ratio<u32>) -> Result<String, ConversionError> {
    let duration =
        length_to_duration(len).ok_or_else(|| ConversionError::UnknownDuration(len.to_string()))?;
    Ok(format!("\\partial {}", duration))
}

// ============================================================================
// KEY SIGNATURES
// ============================================================================

/// Major tonics on the sharp side, indexed by number of sharps
pub const POS_KEY_SIGS: [&str; 8] = ["C", "G", "D", "A", "E", "B", "Fis", "Cis"];
/// Major tonics on the flat side, indexed by number of flats
pub const NEG_KEY_SIGS: [&str; 8] = ["C", "F", "Bes", "Es", "As", "Des", "Ges", "Ces"];

/// Tonic name of the major key with the given circle-of-fifths offset.
///
/// Offsets beyond seven accidentals are clamped.
pub fn spell_key_signature(concert_key: i32) -> &'static str {
    let concert_key = concert_key.clamp(-7, 7);
    if concert_key > 0 {
        POS_KEY_SIGS[concert_key as usize]
    } else {
        NEG_KEY_SIGS[(-concert_key) as usize]
    }
}

/// `\key <tonic> \major`
pub fn render_key_signature(concert_key: i32) -> String {
    format!(
        "\\key {} \\major",
        spell_key_signature(concert_key).to_lowercase()
    )
}

// ============================================================================
// PITCH SPELLING
// ============================================================================

/// F major: B flat, and A flat over G sharp
const NOTE_NAMES_ONE_FLAT: [&str; 12] = [
    "c", "cis", "d", "es", "e", "f", "fis", "g", "as", "a", "bes", "b",
];
const NOTE_NAMES_PLAIN: [&str; 12] = [
    "c", "cis", "d", "es", "e", "f", "fis", "g", "gis", "a", "bes", "b",
];
const NOTE_NAMES_SHARP: [&str; 12] = [
    "c", "cis", "d", "dis", "e", "f", "fis", "g", "gis", "a", "ais", "b",
];
const NOTE_NAMES_FLAT: [&str; 12] = [
    "c", "des", "d", "es", "e", "f", "ges", "g", "as", "a", "bes", "b",
];

/// Largest number of octave marks emitted in either direction
pub const MAX_OCTAVE_MARKS: usize = 5;

/// Chromatic name table for the active key (`None` means no key seen yet)
fn note_names_for_key(concert_key: Option<i32>) -> &'static [&'static str; 12] {
    match concert_key.unwrap_or(0) {
        -1 => &NOTE_NAMES_ONE_FLAT,
        0 => &NOTE_NAMES_PLAIN,
        k if k > 0 => &NOTE_NAMES_SHARP,
        _ => &NOTE_NAMES_FLAT,
    }
}

/// Octave marks relative to LilyPond's unmarked octave (C3..B3).
///
/// `octave` 0 is the middle-C octave (`'`), -1 is unmarked. Marks saturate
/// at [`MAX_OCTAVE_MARKS`].
pub fn octave_marks(octave: i32) -> String {
    if octave >= 0 {
        "'".repeat(((octave + 1) as usize).min(MAX_OCTAVE_MARKS))
    } else {
        ",".repeat(((-octave - 1) as usize).min(MAX_OCTAVE_MARKS))
    }
}

/// Spell a MIDI pitch in absolute LilyPond notation (60 → `c'`)
pub fn spell_pitch(midi_pitch: i32, concert_key: Option<i32>) -> String {
    let names = note_names_for_key(concert_key);
    let name = names[midi_pitch.rem_euclid(12) as usize];
    let octave = midi_pitch.div_euclid(12) - 5;
    format!("{}{}", name, octave_marks(octave))
}

// ============================================================================
// TRANSPOSITION
// ============================================================================

const STEP_NAMES: [&str; 7] = ["c", "d", "e", "f", "g", "a", "b"];
/// Semitones from each diatonic step to the next one up (c→d ... b→c)
const STEP_UP_SEMITONES: [i32; 7] = [2, 2, 1, 2, 2, 2, 1];

/// Dutch name for a natural step with an accidental (-2..=2)
fn step_with_accidental(step: usize, accidental: i32) -> String {
    let name = STEP_NAMES[step];
    match accidental {
        0 => name.to_string(),
        1 => format!("{}is", name),
        2 => format!("{}isis", name),
        -1 if name == "e" || name == "a" => format!("{}s", name),
        -1 => format!("{}es", name),
        -2 if name == "e" || name == "a" => format!("{}ses", name),
        _ => format!("{}eses", name),
    }
}

/// Compute the pitch that a written `c'` sounds at for an instrument.
///
/// Walks `|diatonic|` scale steps away from `c'` (up for positive values)
/// and compares the semitones covered with `chromatic` to choose the
/// accidental. Whole octaves are reduced first and re-applied as octave
/// marks. Returns `None` when no transposition is needed.
pub fn compute_transposition(diatonic: i32, chromatic: i32) -> Option<String> {
    let octaves = diatonic / 7;
    let diatonic_rem = diatonic % 7;
    let chromatic_rem = chromatic % 12;

    if diatonic_rem == 0 && chromatic_rem == 0 {
        return None;
    }

    // step index from c, possibly crossing below c
    let mut step: i32 = 0;
    let mut distance: i32 = 0;
    for _ in 0..diatonic_rem.abs() {
        if diatonic_rem > 0 {
            distance += STEP_UP_SEMITONES[step.rem_euclid(7) as usize];
            step += 1;
        } else {
            step -= 1;
            distance -= STEP_UP_SEMITONES[step.rem_euclid(7) as usize];
        }
    }

    let mut accidental = chromatic_rem - distance;
    if !(-2..=2).contains(&accidental) {
        log::warn!(
            "Transposition {}/{} needs accidental {}, clamping",
            diatonic,
            chromatic,
            accidental
        );
        accidental = accidental.clamp(-2, 2);
    }

    let octave = octaves + step.div_euclid(7);
    Some(format!(
        "{}{}",
        step_with_accidental(step.rem_euclid(7) as usize, accidental),
        octave_marks(octave)
    ))
}
