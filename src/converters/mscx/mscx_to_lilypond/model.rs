//! Score-model builder
//!
//! Reads the ordered tree of a `museScore` document into a [`ScoreModel`]:
//! instrument order and sections, each staff's measures flattened to the
//! recognized event kinds, and the parts joined to their staves.
//!
//! Every multiplicity is normalized to a list here, at the boundary, so the
//! renderer never has to care whether the source had one child or many.

use crate::converters::mscx::mscx_to_lilypond::errors::{ConversionError, ParseError};
use crate::converters::mscx::mscx_to_lilypond::grouping::group_parts;
use crate::converters::mscx::mscx_to_lilypond::parser::{
    get_child_parsed, get_child_text, get_node, get_nodes, OrderedNode,
};
use crate::converters::mscx::mscx_to_lilypond::types::*;
use num_rational::Ratio;

/// Build the score model from a parsed document root
pub fn build_score_model(root: &OrderedNode) -> Result<ScoreModel, ConversionError> {
    if root.name() != "museScore" {
        return Err(ParseError::UnsupportedFormat(format!(
            "Expected <museScore> root, found <{}>",
            root.name()
        ))
        .into());
    }

    let score = get_node(root, "Score")
        .ok_or_else(|| ParseError::MissingRequiredElement("Score".to_string()))?;

    read_score(score)
}

/// Build the score model from a `Score` element
pub fn read_score(score: &OrderedNode) -> Result<ScoreModel, ConversionError> {
    let order = get_node(score, "Order")
        .map(read_order_info)
        .unwrap_or_default();
    let staves = read_staff_info(score);
    let groups = read_parts_info(score, &order, &staves)?;
    let meta = read_meta_tags(score);

    log::debug!(
        "Score model: {} staves, {} groups, {} sections",
        staves.len(),
        groups.len(),
        order.sections.len()
    );

    Ok(ScoreModel {
        order,
        groups,
        meta,
    })
}

// ============================================================================
// ORDER
// ============================================================================

pub fn read_order_info(order: &OrderedNode) -> OrderInfo {
    let instruments = get_nodes(order, "instrument")
        .into_iter()
        .map(|instrument| OrderInstrument {
            id: attribute_string(instrument, "id"),
            family: get_nodes(instrument, "family")
                .into_iter()
                .map(|family| InstrumentFamily {
                    id: attribute_string(family, "id"),
                    name: family.text().unwrap_or_default().to_string(),
                })
                .collect(),
        })
        .collect();

    let sections = get_nodes(order, "section")
        .into_iter()
        .map(|section| Section {
            id: attribute_string(section, "id"),
            brackets: attribute_flag(section, "brackets"),
            bar_line_span: attribute_flag(section, "barLineSpan"),
            thin_brackets: attribute_flag(section, "thinBrackets"),
            family: get_nodes(section, "family")
                .into_iter()
                .filter_map(|family| family.text())
                .map(str::to_string)
                .collect(),
            unsorted: get_nodes(section, "unsorted")
                .into_iter()
                .map(|unsorted| Unsorted {
                    group: unsorted.attribute("group").map(str::to_string),
                })
                .collect(),
        })
        .collect();

    OrderInfo {
        instruments,
        sections,
    }
}

fn attribute_string(node: &OrderedNode, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

fn attribute_flag(node: &OrderedNode, name: &str) -> bool {
    node.attribute(name) == Some("true")
}

// ============================================================================
// STAFF CONTENT
// ============================================================================

/// Flatten every score-level `Staff` into measures of recognized events
pub fn read_staff_info(score: &OrderedNode) -> Vec<FlatStaff> {
    get_nodes(score, "Staff")
        .into_iter()
        .map(|staff| FlatStaff {
            id: attribute_string(staff, "id"),
            measures: get_nodes(staff, "Measure")
                .into_iter()
                .map(read_measure)
                .collect(),
        })
        .collect()
}

fn read_measure(measure: &OrderedNode) -> Measure {
    let len = measure
        .attribute("len")
        .and_then(|len| match len.trim().parse::<Ratio<u32>>() {
            Ok(ratio) => Some(ratio),
            Err(_) => {
                log::warn!("Ignoring unparsable measure length '{}'", len);
                None
            }
        });

    let irregular = get_node(measure, "irregular")
        .map(|node| node.text() != Some("0"))
        .unwrap_or(false);

    Measure {
        irregular,
        len,
        voices: get_nodes(measure, "voice")
            .into_iter()
            .map(read_voice)
            .collect(),
    }
}

/// Keep the recognized children of a voice, in document order
fn read_voice(voice: &OrderedNode) -> Vec<Event> {
    voice
        .children()
        .iter()
        .filter(|child| !child.is_text_node())
        .filter_map(read_event)
        .collect()
}

/// Convert one voice child, or `None` for kinds that carry no music
pub fn read_event(node: &OrderedNode) -> Option<Event> {
    let event = match node.name() {
        "KeySig" => Event::KeySig(KeySig {
            concert_key: get_child_parsed(node, "concertKey")
                .or_else(|| get_child_parsed(node, "accidental"))
                .unwrap_or(0),
        }),
        "TimeSig" => Event::TimeSig(TimeSig {
            sig_n: get_child_parsed(node, "sigN").unwrap_or(4),
            sig_d: get_child_parsed(node, "sigD").unwrap_or(4),
        }),
        "Tempo" => Event::Tempo(Tempo {
            tempo: get_child_parsed(node, "tempo"),
        }),
        "Rest" => Event::Rest(read_rest(node)),
        "Chord" => Event::Chord(read_chord(node)),
        "Clef" => Event::Clef(ClefChange {
            clef_type: get_child_text(node, "concertClefType")
                .or_else(|| get_child_text(node, "subtype"))
                .unwrap_or_else(|| "G".to_string()),
        }),
        "BarLine" => Event::BarLine(BarLine {
            subtype: get_child_text(node, "subtype").unwrap_or_default(),
        }),
        "Fermata" => Event::Fermata(Fermata {
            subtype: get_child_text(node, "subtype").unwrap_or_default(),
        }),
        "PlayTechAnnotation" => Event::PlayTechAnnotation(PlayTechAnnotation {
            play_tech_type: get_child_text(node, "playTechType"),
            text: get_child_text(node, "text"),
        }),
        "Spanner" => Event::Spanner(read_spanner(node)),
        "Dynamic" => Event::Dynamic(Dynamic {
            subtype: get_child_text(node, "subtype").unwrap_or_default(),
        }),
        _ => return None,
    };
    Some(event)
}

fn read_rest(node: &OrderedNode) -> Rest {
    Rest {
        duration_type: get_child_text(node, "durationType").unwrap_or_default(),
        duration: get_child_text(node, "duration"),
        dots: get_child_parsed(node, "dots").unwrap_or(0),
        visible: get_child_parsed::<i32>(node, "visible")
            .map(|v| v != 0)
            .unwrap_or(true),
    }
}

fn read_chord(node: &OrderedNode) -> Chord {
    let tremolo_subtype = get_node(node, "TremoloSingleChord")
        .or_else(|| get_node(node, "Tremolo"))
        .and_then(|tremolo| get_child_text(tremolo, "subtype"));

    // ornaments share the articulation table
    let articulations = get_nodes(node, "Articulation")
        .into_iter()
        .chain(get_nodes(node, "Ornament"))
        .filter_map(|mark| get_child_text(mark, "subtype"))
        .collect();

    Chord {
        duration_type: get_child_text(node, "durationType").unwrap_or_default(),
        dots: get_child_parsed(node, "dots").unwrap_or(0),
        notes: get_nodes(node, "Note")
            .into_iter()
            .filter_map(read_note)
            .collect(),
        tremolo_subtype,
        articulations,
        spanners: get_nodes(node, "Spanner")
            .into_iter()
            .map(read_spanner)
            .collect(),
    }
}

fn read_note(node: &OrderedNode) -> Option<Note> {
    let Some(midi_pitch) = get_child_parsed::<i32>(node, "pitch") else {
        log::warn!("Note without pitch, skipping");
        return None;
    };

    Some(Note {
        midi_pitch,
        has_accidental_mark: get_node(node, "Accidental").is_some(),
        ties: get_nodes(node, "Spanner")
            .into_iter()
            .filter(|spanner| spanner.attribute("type") == Some("Tie"))
            .map(read_spanner)
            .collect(),
    })
}

/// `next` marks the start of a span, `prev` its end
fn read_spanner(node: &OrderedNode) -> Spanner {
    let spanner_type = attribute_string(node, "type");
    let payload = get_node(node, &spanner_type).and_then(|body| get_child_text(body, "subtype"));

    Spanner {
        is_start: get_node(node, "next").is_some(),
        is_end: get_node(node, "prev").is_some(),
        spanner_type,
        payload,
    }
}

// ============================================================================
// PARTS
// ============================================================================

/// Read every `Part` and group them into sections
pub fn read_parts_info(
    score: &OrderedNode,
    order: &OrderInfo,
    staves: &[FlatStaff],
) -> Result<Vec<PartGroup>, ConversionError> {
    let parts = get_nodes(score, "Part")
        .into_iter()
        .map(|part| read_part_info(part, staves))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(group_parts(parts, order))
}

/// Read one `Part` and attach the content of the staves it references
pub fn read_part_info(
    part: &OrderedNode,
    staves: &[FlatStaff],
) -> Result<PartInfo, ConversionError> {
    let id = attribute_string(part, "id");
    let instruments: Vec<InstrumentInfo> = get_nodes(part, "Instrument")
        .into_iter()
        .map(read_instrument)
        .collect();

    let track_name = get_child_text(part, "trackName")
        .filter(|name| !name.is_empty())
        .or_else(|| {
            instruments
                .first()
                .map(|i| i.long_name.clone())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| id.clone());

    let mut staffs = Vec::new();
    for (idx, staff) in get_nodes(part, "Staff").into_iter().enumerate() {
        let staff_id = attribute_string(staff, "id");
        let content = staves
            .iter()
            .find(|flat| flat.id == staff_id)
            .ok_or_else(|| ConversionError::MissingStaffReference {
                part: id.clone(),
                staff: staff_id.clone(),
            })?;

        let default_clef = get_child_text(staff, "defaultClef")
            .or_else(|| get_child_text(staff, "defaultConcertClef"))
            .or_else(|| {
                instruments
                    .first()
                    .and_then(|instrument| instrument_clef(instrument, idx + 1))
            })
            .unwrap_or_else(|| "G".to_string());

        staffs.push(PartStaff {
            id: staff_id,
            default_clef,
            contents: content.measures.clone(),
        });
    }

    Ok(PartInfo {
        id,
        track_name,
        instruments,
        staffs,
    })
}

fn instrument_clef(instrument: &InstrumentInfo, staff_number: usize) -> Option<String> {
    instrument
        .clefs
        .iter()
        .find(|(number, _)| *number == staff_number)
        .map(|(_, clef)| clef.clone())
}

fn read_instrument(node: &OrderedNode) -> InstrumentInfo {
    InstrumentInfo {
        id: node.attribute("id").map(str::to_string),
        long_name: get_child_text(node, "longName").unwrap_or_default(),
        short_name: get_child_text(node, "shortName").unwrap_or_default(),
        track_name: get_child_text(node, "trackName").unwrap_or_default(),
        instrument_id: get_child_text(node, "instrumentId").unwrap_or_default(),
        transpose_diatonic: get_child_parsed(node, "transposeDiatonic").unwrap_or(0),
        transpose_chromatic: get_child_parsed(node, "transposeChromatic").unwrap_or(0),
        clefs: get_nodes(node, "clef")
            .into_iter()
            .filter_map(|clef| {
                let staff = clef
                    .attribute("staff")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(1);
                clef.text().map(|text| (staff, text.trim().to_string()))
            })
            .collect(),
        channels: get_nodes(node, "Channel")
            .into_iter()
            .map(|channel| Channel {
                programs: get_nodes(channel, "program")
                    .into_iter()
                    .filter_map(|program| program.attribute("value"))
                    .map(str::to_string)
                    .collect(),
                synti: get_child_text(channel, "synti"),
                midi_port: get_child_parsed(channel, "midiPort"),
                midi_channel: get_child_parsed(channel, "midiChannel"),
            })
            .collect(),
    }
}

// ============================================================================
// METADATA
// ============================================================================

pub fn read_meta_tags(score: &OrderedNode) -> MetaInfo {
    let mut meta = MetaInfo::default();
    for tag in get_nodes(score, "metaTag") {
        if let Some(name) = tag.attribute("name") {
            meta.tags.insert(
                name.to_string(),
                tag.text().unwrap_or_default().trim().to_string(),
            );
        }
    }
    meta
}
