//! LilyPond document assembly
//!
//! Walks the part groups in order, renders every staff into a music macro,
//! and composes the three output buffers: the macro definitions, one
//! `\book` per part, and the full score `\book`.

use crate::converters::mscx::mscx_to_lilypond::converter::{
    render_clef, render_staff, ConversionContext,
};
use crate::converters::mscx::mscx_to_lilypond::errors::ConversionError;
use crate::converters::mscx::mscx_to_lilypond::pitch::compute_transposition;
use crate::converters::mscx::mscx_to_lilypond::templates::{
    escape_lilypond_string, render_book, BookTemplate, TemplateContext,
};
use crate::converters::mscx::mscx_to_lilypond::types::*;
use std::collections::{HashMap, HashSet};

const DIGIT_NAMES: [&str; 10] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

/// Turn a part name into a LilyPond identifier.
///
/// Lowercases, drops separators and other non-letters, and spells digits
/// as capitalized words (`"Violin 2"` → `violinTwo`).
pub fn create_valid_part_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if let Some(digit) = c.to_digit(10) {
            result.push_str(DIGIT_NAMES[digit as usize]);
        } else if c.is_ascii_alphabetic() {
            result.push(c);
        }
    }
    if result.is_empty() {
        result.push_str("part");
    }
    result
}

/// Hands out unique identifiers in request order.
///
/// The first request for a name gets the bare sanitized name; later ones get
/// a counter appended before sanitizing, so the second "Flute" becomes
/// `fluteTwo`.
#[derive(Debug, Default)]
pub struct IdentifierAllocator {
    counters: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl IdentifierAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, base_name: &str) -> String {
        let base_id = create_valid_part_name(base_name);
        let counter = self.counters.entry(base_id.clone()).or_insert(1);
        let mut candidate = base_id;
        while self.issued.contains(&candidate) {
            *counter += 1;
            candidate = create_valid_part_name(&format!("{}{}", base_name, counter));
        }
        self.issued.insert(candidate.clone());
        candidate
    }
}

/// Indent every non-empty line
fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `\id`, or the transposed form for transposing instruments
fn music_reference(id: &str, transposition: Option<&str>) -> String {
    match transposition {
        Some(tonic) => format!("\\transpose {} c' \\{}", tonic, id),
        None => format!("\\{}", id),
    }
}

/// One music macro definition
pub fn render_music_macro(id: &str, measures: &[String]) -> String {
    format!(
        "{} = {{\n  {} \\bar \"|.\"\n}}\n",
        id,
        measures.join(" |\n  ")
    )
}

/// Accumulates rendered parts over one conversion run
pub struct Assembler<'a> {
    settings: &'a ConversionSettings,
    music_ids: IdentifierAllocator,
    book_ids: IdentifierAllocator,
    data: RenderedPart,
    skipped_elements: Vec<SkippedElement>,
}

impl<'a> Assembler<'a> {
    pub fn new(settings: &'a ConversionSettings) -> Self {
        Self {
            settings,
            music_ids: IdentifierAllocator::new(),
            book_ids: IdentifierAllocator::new(),
            data: RenderedPart::default(),
            skipped_elements: Vec::new(),
        }
    }

    /// Render one part: its music macros, its score block and its book entry
    pub fn render_part(&mut self, part: &PartInfo) -> Result<RenderedPart, ConversionError> {
        let instrument = part.primary_instrument();
        let long_name = instrument
            .map(|i| i.long_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(&part.track_name);
        let short_name = instrument.map(|i| i.short_name.as_str()).unwrap_or("");
        let transposition = instrument
            .and_then(|i| compute_transposition(i.transpose_diatonic, i.transpose_chromatic));

        let mut context = ConversionContext::new(part.id.clone());
        let mut rendered = RenderedPart::default();

        let (score_block, book_staff) = if part.staffs.len() > 1 {
            let mut staves = Vec::with_capacity(part.staffs.len());
            for (idx, staff) in part.staffs.iter().enumerate() {
                context.current_staff_id = Some(staff.id.clone());
                let measures = render_staff(&staff.contents, &mut context)?;
                let id = self
                    .music_ids
                    .allocate(&format!("{}{}", part.track_name, idx + 1));
                staves.push(format!(
                    "  \\new Staff {{\n    {}\n    {}\n  }}",
                    render_clef(&staff.default_clef),
                    music_reference(&id, transposition.as_deref())
                ));
                rendered.music_data.push((id, measures));
            }

            let block = format!(
                "\\new PianoStaff <<\n  \\set PianoStaff.instrumentName = \"{}\"\n  \\set PianoStaff.shortInstrumentName = \"{}\"\n{}\n>>",
                escape_lilypond_string(long_name),
                escape_lilypond_string(short_name),
                staves.join("\n")
            );
            (block.clone(), block)
        } else if let Some(staff) = part.staffs.first() {
            context.current_staff_id = Some(staff.id.clone());
            let measures = render_staff(&staff.contents, &mut context)?;
            let id = self.music_ids.allocate(&part.track_name);
            let clef = render_clef(&staff.default_clef);
            let reference = music_reference(&id, transposition.as_deref());
            rendered.music_data.push((id, measures));

            let score_block = format!(
                "\\new Staff {{\n  \\set Staff.instrumentName = \"{}\"\n  \\set Staff.shortInstrumentName = \"{}\"\n  {}\n  {}\n}}",
                escape_lilypond_string(long_name),
                escape_lilypond_string(short_name),
                clef,
                reference
            );
            let book_staff = format!("\\new Staff {{\n  {}\n  {}\n}}", clef, reference);
            (score_block, book_staff)
        } else {
            log::warn!("Part '{}' has no staves, skipping", part.track_name);
            context.add_skipped("Part", "Part has no staves");
            self.skipped_elements.extend(context.skipped_elements);
            return Ok(rendered);
        };

        rendered.score_data.push(score_block);
        rendered.part_data.push(PartBook {
            id: self.book_ids.allocate(&part.track_name),
            instrument_name: part.track_name.clone(),
            staff: book_staff,
        });

        self.skipped_elements.extend(context.skipped_elements);
        Ok(rendered)
    }

    /// Move a rendered part's macros and book into the global maps and
    /// hand back its score blocks
    fn absorb(&mut self, rendered: RenderedPart) -> Vec<String> {
        self.data.music_data.extend(rendered.music_data);
        self.data.part_data.extend(rendered.part_data);
        rendered.score_data
    }

    /// Render one top-level group into a score block
    pub fn render_group(&mut self, group: &PartGroup) -> Result<String, ConversionError> {
        match group {
            PartGroup::Part(part) => {
                let rendered = self.render_part(part)?;
                Ok(self.absorb(rendered).join("\n"))
            }
            PartGroup::Section {
                id,
                bar_line_span,
                parts,
            } => {
                let mut blocks = Vec::new();
                for part in parts {
                    let rendered = self.render_part(part)?;
                    blocks.extend(self.absorb(rendered));
                }
                // without a shared barline the section is a bracket only
                let context = if *bar_line_span {
                    "StaffGroup"
                } else {
                    "ChoirStaff"
                };
                log::debug!("Section '{}' rendered as {}", id, context);
                Ok(format!(
                    "\\new {} <<\n{}\n>>",
                    context,
                    indent(&blocks.join("\n"), 2)
                ))
            }
        }
    }

    /// Finish the run and compose the three buffers
    pub fn finish(
        self,
        score_blocks: Vec<String>,
        meta: &MetaInfo,
    ) -> Result<ConversionResult, ConversionError> {
        let music = self
            .data
            .music_data
            .iter()
            .map(|(id, measures)| render_music_macro(id, measures))
            .collect::<String>();

        let mut parts = String::new();
        for book in &self.data.part_data {
            parts.push_str(&render_part_book(book, meta, self.settings)?);
        }

        let score = render_score_book(&score_blocks, meta, self.settings)?;

        Ok(ConversionResult {
            music,
            parts,
            score,
            version: self.settings.target_lilypond_version.clone(),
            skipped_elements: self.skipped_elements,
        })
    }
}

/// Render the `\book` of one part
pub fn render_part_book(
    book: &PartBook,
    meta: &MetaInfo,
    settings: &ConversionSettings,
) -> Result<String, ConversionError> {
    let context = TemplateContext::builder(indent(&book.staff, 4))
        .output_suffix(book.id.clone())
        .paper_size(settings.parts_paper_size.clone())
        .header_field("title", meta.title())
        .header_field("subtitle", meta.subtitle())
        .header_field("composer", meta.composer())
        .header_field("lyricist", meta.lyricist())
        .header_field("arranger", meta.arranger())
        .header_field("instrument", Some(book.instrument_name.as_str()))
        .staff_size(settings.parts_staff_size)
        .build();

    render_book(BookTemplate::Part, &context)
        .map_err(|e| ConversionError::InternalError(format!("Part template failed: {}", e)))
}

/// Render the score `\book`
pub fn render_score_book(
    score_blocks: &[String],
    meta: &MetaInfo,
    settings: &ConversionSettings,
) -> Result<String, ConversionError> {
    let context = TemplateContext::builder(indent(&score_blocks.join("\n"), 6))
        .paper_size(settings.score_paper_size.clone())
        .header_field("title", meta.title())
        .header_field("subtitle", meta.subtitle())
        .header_field("composer", meta.composer())
        .header_field("lyricist", meta.lyricist())
        .header_field("arranger", meta.arranger())
        .header_field("copyright", meta.copyright())
        .staff_size(settings.score_staff_size)
        .build();

    render_book(BookTemplate::Score, &context)
        .map_err(|e| ConversionError::InternalError(format!("Score template failed: {}", e)))
}

/// Generate the three output buffers for a score model
pub fn generate_lilypond_documents(
    model: &ScoreModel,
    settings: &ConversionSettings,
) -> Result<ConversionResult, ConversionError> {
    let mut assembler = Assembler::new(settings);
    let mut score_blocks = Vec::with_capacity(model.groups.len());

    for group in &model.groups {
        score_blocks.push(assembler.render_group(group)?);
    }

    assembler.finish(score_blocks, &model.meta)
}
