// End-to-end conversion of inline MuseScore documents

use mscx2ly_wasm::converters::mscx::{
    convert_mscx_to_lilypond, ConversionError, ConversionSettings, ParseError,
};

/// Wrap parts and staves in a minimal MuseScore 4 document
fn score(order: &str, parts: &str, staves: &str, meta: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<museScore version="4.20">
  <programVersion>4.2.1</programVersion>
  <Score>
    <Division>480</Division>
    {order}
    {parts}
    {staves}
    {meta}
  </Score>
</museScore>"#
    )
}

fn part(id: &str, name: &str, instrument_id: &str, staff_ids: &[&str], extra: &str) -> String {
    let staves: String = staff_ids
        .iter()
        .map(|staff| format!(r#"<Staff id="{}"><StaffType group="pitched"><name>stdNormal</name></StaffType></Staff>"#, staff))
        .collect();
    format!(
        r#"<Part id="{id}">
      {staves}
      <trackName>{name}</trackName>
      <Instrument id="{instrument_id}">
        <longName>{name}</longName>
        <shortName>{name}.</shortName>
        <trackName>{name}</trackName>
        <instrumentId>{instrument_id}</instrumentId>
        {extra}
        <Channel><program value="0"/></Channel>
      </Instrument>
    </Part>"#
    )
}

fn staff(id: &str, voice: &str) -> String {
    format!(r#"<Staff id="{id}"><Measure><voice>{voice}</voice></Measure></Staff>"#)
}

const C_QUARTER: &str = r#"
    <KeySig><concertKey>0</concertKey></KeySig>
    <TimeSig><sigN>4</sigN><sigD>4</sigD></TimeSig>
    <Chord><durationType>quarter</durationType><Note><pitch>60</pitch><tpc>14</tpc></Note></Chord>"#;

#[test]
fn test_single_part_c_major_quarter_note() {
    let doc = score(
        "",
        &part("1", "Flute", "wind.flutes.flute", &["1"], ""),
        &staff("1", C_QUARTER),
        "",
    );
    let result = convert_mscx_to_lilypond(&doc, None).expect("conversion should succeed");

    assert_eq!(
        result.music,
        "flute = {\n  \\key c \\major \\time 4/4 c'4 \\bar \"|.\"\n}\n"
    );
    assert!(result.score.contains("\\new Staff {"));
    assert!(result.score.contains("\\set Staff.instrumentName = \"Flute\""));
    assert!(result.score.contains("\\clef treble"));
    assert!(result.score.contains("\\flute"));
    assert!(result.parts.contains("\\bookOutputSuffix \"flute\""));
    assert!(result.parts.contains("instrument = \"Flute\""));
    assert!(result.skipped_elements.is_empty());
}

#[test]
fn test_colliding_part_names_get_distinct_identifiers() {
    let parts = format!(
        "{}{}",
        part("1", "Flute", "wind.flutes.flute", &["1"], ""),
        part("2", "Flute", "wind.flutes.flute", &["2"], "")
    );
    let staves = format!("{}{}", staff("1", C_QUARTER), staff("2", C_QUARTER));
    let result = convert_mscx_to_lilypond(&score("", &parts, &staves, ""), None).unwrap();

    assert!(result.music.contains("flute = {"));
    assert!(result.music.contains("fluteTwo = {"));
    assert!(result.score.contains("\\flute\n"));
    assert!(result.score.contains("\\fluteTwo"));
    assert!(result.parts.contains("\\bookOutputSuffix \"flute\""));
    assert!(result.parts.contains("\\bookOutputSuffix \"fluteTwo\""));
    assert_eq!(result.parts.matches("\\book {").count(), 2);
}

#[test]
fn test_unknown_duration_aborts_without_output() {
    let voice = r#"<Chord><durationType>sixtyfifth</durationType><Note><pitch>60</pitch></Note></Chord>"#;
    let doc = score(
        "",
        &part("1", "Flute", "wind.flutes.flute", &["1"], ""),
        &staff("1", voice),
        "",
    );
    let result = convert_mscx_to_lilypond(&doc, None);
    assert_eq!(
        result,
        Err(ConversionError::UnknownDuration("sixtyfifth".to_string()))
    );
}

fn measure_rest(sig_n: u32, sig_d: u32, duration: &str) -> String {
    format!(
        r#"<TimeSig><sigN>{sig_n}</sigN><sigD>{sig_d}</sigD></TimeSig>
    <Rest><durationType>measure</durationType><duration>{duration}</duration></Rest>"#
    )
}

#[test]
fn test_measure_rests_in_any_meter() {
    for (sig_n, sig_d, duration, expected) in [
        (9, 8, "9/8", "\\time 9/8 R1*9/8"),
        (5, 4, "5/4", "\\time 5/4 R1*5/4"),
        (2, 8, "2/8", "\\time 2/8 R4"),
        (7, 8, "7/8", "\\time 7/8 R2.."),
    ] {
        let doc = score(
            "",
            &part("1", "Flute", "wind.flutes.flute", &["1"], ""),
            &staff("1", &measure_rest(sig_n, sig_d, duration)),
            "",
        );
        let result = convert_mscx_to_lilypond(&doc, None).expect("measure rest should convert");
        assert!(result.music.contains(expected), "{}", result.music);
    }
}

#[test]
fn test_unreadable_measure_rest_aborts() {
    let doc = score(
        "",
        &part("1", "Flute", "wind.flutes.flute", &["1"], ""),
        &staff("1", &measure_rest(4, 4, "0/4")),
        "",
    );
    assert_eq!(
        convert_mscx_to_lilypond(&doc, None),
        Err(ConversionError::UnknownDuration("0/4".to_string()))
    );
}

#[test]
fn test_missing_staff_reference() {
    let doc = score(
        "",
        &part("1", "Oboe", "wind.reed.oboe", &["7"], ""),
        &staff("1", C_QUARTER),
        "",
    );
    assert!(matches!(
        convert_mscx_to_lilypond(&doc, None),
        Err(ConversionError::MissingStaffReference { .. })
    ));
}

#[test]
fn test_malformed_and_foreign_documents() {
    assert!(matches!(
        convert_mscx_to_lilypond("<museScore><Score>", None),
        Err(ConversionError::MalformedDocument(ParseError::InvalidXml(_)))
    ));
    assert!(matches!(
        convert_mscx_to_lilypond("<score-partwise version=\"3.1\"/>", None),
        Err(ConversionError::MalformedDocument(ParseError::UnsupportedFormat(_)))
    ));
}

#[test]
fn test_grand_staff_renders_piano_staff() {
    let piano = part(
        "1",
        "Piano",
        "keyboard.piano",
        &["1", "2"],
        r#"<clef staff="2">F</clef>"#,
    );
    let staves = format!(
        "{}{}",
        staff("1", C_QUARTER),
        staff("2", r#"<Rest><durationType>measure</durationType><duration>4/4</duration></Rest>"#)
    );
    let result = convert_mscx_to_lilypond(&score("", &piano, &staves, ""), None).unwrap();

    assert!(result.music.contains("pianoOne = {"));
    assert!(result.music.contains("pianoTwo = {\n  R1 \\bar \"|.\"\n}"));
    assert!(result.score.contains("\\new PianoStaff <<"));
    assert!(result.score.contains("\\clef bass"));
    assert!(result.parts.contains("\\new PianoStaff <<"));
    assert_eq!(result.parts.matches("\\book {").count(), 1);
}

#[test]
fn test_sections_group_contiguous_parts() {
    let order = r#"<Order id="orchestral">
      <section id="strings" brackets="true" barLineSpan="true" thinBrackets="true">
        <family>violins</family>
        <family>violas</family>
      </section>
    </Order>"#;
    let parts = format!(
        "{}{}{}",
        part("1", "Violin 1", "strings.violins.violin", &["1"], ""),
        part("2", "Violin 2", "strings.violins.violin", &["2"], ""),
        part("3", "Piano", "keyboard.piano", &["3"], "")
    );
    let staves = format!(
        "{}{}{}",
        staff("1", C_QUARTER),
        staff("2", C_QUARTER),
        staff("3", C_QUARTER)
    );
    let result = convert_mscx_to_lilypond(&score(order, &parts, &staves, ""), None).unwrap();

    assert_eq!(result.score.matches("\\new StaffGroup <<").count(), 1);
    let group_start = result.score.find("\\new StaffGroup").unwrap();
    let piano = result.score.find("\\piano").unwrap();
    let violin_one = result.score.find("\\violinOne").unwrap();
    let violin_two = result.score.find("\\violinTwo").unwrap();
    assert!(group_start < violin_one && violin_one < violin_two && violin_two < piano);
}

#[test]
fn test_transposing_instrument() {
    let clarinet = part(
        "1",
        "Clarinet",
        "wind.reed.clarinet.bflat",
        &["1"],
        "<transposeDiatonic>-1</transposeDiatonic><transposeChromatic>-2</transposeChromatic>",
    );
    let result =
        convert_mscx_to_lilypond(&score("", &clarinet, &staff("1", C_QUARTER), ""), None).unwrap();

    assert!(result.score.contains("\\transpose bes c' \\clarinet"));
    assert!(result.parts.contains("\\transpose bes c' \\clarinet"));
    // macros stay in concert pitch
    assert!(result.music.contains("c'4"));
}

#[test]
fn test_settings_and_metadata() {
    let meta = r#"<metaTag name="composer">Anon.</metaTag>
    <metaTag name="workTitle">Air</metaTag>
    <metaTag name="lyricist"></metaTag>
    <metaTag name="source">ignored</metaTag>"#;
    let doc = score(
        "",
        &part("1", "Flute", "wind.flutes.flute", &["1"], ""),
        &staff("1", C_QUARTER),
        meta,
    );
    let settings = ConversionSettings {
        score_paper_size: Some("a3landscape".to_string()),
        parts_paper_size: Some("a4".to_string()),
        score_staff_size: Some(16.0),
        parts_staff_size: None,
        ..Default::default()
    };
    let result = convert_mscx_to_lilypond(&doc, Some(settings)).unwrap();

    assert!(result.score.contains("#(set-paper-size \"a3landscape\")"));
    assert!(result.score.contains("#(layout-set-staff-size 16)"));
    assert!(result.score.contains("title = \"Air\""));
    assert!(result.parts.contains("#(set-paper-size \"a4\")"));
    assert!(!result.parts.contains("layout-set-staff-size"));
    assert!(result.parts.contains("composer = \"Anon.\""));
    assert!(!result.parts.contains("lyricist"));
}

#[test]
fn test_unset_options_emit_no_directives() {
    let doc = score(
        "",
        &part("1", "Flute", "wind.flutes.flute", &["1"], ""),
        &staff("1", C_QUARTER),
        "",
    );
    let result = convert_mscx_to_lilypond(&doc, None).unwrap();
    let everything = result.combined();

    assert!(everything.starts_with("\\version \"2.24.0\""));
    assert!(!everything.contains("\\paper"));
    assert!(!everything.contains("\\layout"));
    assert!(!result.score.contains("\\header"));
}

#[test]
fn test_decorations_attach_to_next_sounding_event() {
    let voice = r#"
        <TimeSig><sigN>2</sigN><sigD>4</sigD></TimeSig>
        <Dynamic><subtype>p</subtype></Dynamic>
        <Spanner type="HairPin"><HairPin><subtype>0</subtype></HairPin><next><location><fractions>1/4</fractions></location></next></Spanner>
        <Chord><durationType>quarter</durationType><Note><pitch>62</pitch></Note></Chord>
        <Spanner type="HairPin"><prev><location><fractions>-1/4</fractions></location></prev></Spanner>
        <Fermata><subtype>fermataAbove</subtype></Fermata>
        <Rest><durationType>quarter</durationType></Rest>
        <Dynamic><subtype>f</subtype></Dynamic>"#;
    let doc = score(
        "",
        &part("1", "Flute", "wind.flutes.flute", &["1"], ""),
        &staff("1", voice),
        "",
    );
    let result = convert_mscx_to_lilypond(&doc, None).unwrap();

    assert!(result.music.contains("\\time 2/4 d'4\\p\\< r4\\!\\fermata"));
    // the trailing dynamic has nothing to attach to
    assert_eq!(result.skipped_elements.len(), 1);
    assert_eq!(result.skipped_elements[0].element_type, "Dynamic");
    assert_eq!(result.skipped_elements[0].measure_number, Some(1));
}

#[test]
fn test_pickup_measure_and_two_voices() {
    let staves = r#"<Staff id="1">
      <Measure len="1/4">
        <voice><Chord><durationType>quarter</durationType><Note><pitch>67</pitch></Note></Chord></voice>
      </Measure>
      <Measure>
        <voice><Chord><durationType>whole</durationType><Note><pitch>72</pitch></Note></Chord></voice>
        <voice><Chord><durationType>whole</durationType><Note><pitch>60</pitch></Note></Chord></voice>
      </Measure>
    </Staff>"#;
    let doc = score(
        "",
        &part("1", "Flute", "wind.flutes.flute", &["1"], ""),
        staves,
        "",
    );
    let result = convert_mscx_to_lilypond(&doc, None).unwrap();

    assert!(result.music.contains("\\partial 4 g'4 |\n  << { c''1 } \\\\ { c'1 } >> \\bar \"|.\""));
}
