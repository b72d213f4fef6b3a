//! Section/part grouping
//!
//! The `Order` block names sections and the instrument families inside
//! them, but says nothing about where parts sit. Grouping is therefore a
//! single pass over the parts in document order: contiguous runs of parts
//! that match the same section become one [`PartGroup::Section`].

use crate::converters::mscx::mscx_to_lilypond::types::{OrderInfo, PartGroup, PartInfo, Section};

/// First section whose family list or id occurs in the instrument id
pub fn find_section<'a>(instrument_id: &str, sections: &'a [Section]) -> Option<&'a Section> {
    if instrument_id.is_empty() {
        return None;
    }
    sections.iter().find(|section| {
        let shares_family = section
            .family
            .iter()
            .any(|family| !family.is_empty() && instrument_id.contains(family.as_str()));
        let shares_id = !section.id.is_empty() && instrument_id.contains(section.id.as_str());
        shares_family || shares_id
    })
}

struct OpenSection {
    id: String,
    bar_line_span: bool,
    parts: Vec<PartInfo>,
}

impl OpenSection {
    fn close(self) -> PartGroup {
        PartGroup::Section {
            id: self.id,
            bar_line_span: self.bar_line_span,
            parts: self.parts,
        }
    }
}

/// Group parts into sections without reordering them.
///
/// A part that matches no section closes the open section before it is
/// emitted on its own, so flattening the result always yields the input
/// order.
pub fn group_parts(parts: Vec<PartInfo>, order: &OrderInfo) -> Vec<PartGroup> {
    let mut groups = Vec::new();
    let mut open: Option<OpenSection> = None;

    for part in parts {
        let section = find_section(part.primary_instrument_id(), &order.sections);

        if let Some(section) = section {
            if let Some(current) = open.as_mut().filter(|current| current.id == section.id) {
                current.parts.push(part);
                continue;
            }
        }

        if let Some(current) = open.take() {
            groups.push(current.close());
        }

        match section {
            Some(section) => {
                log::debug!("Opening section '{}' at part '{}'", section.id, part.track_name);
                open = Some(OpenSection {
                    id: section.id.clone(),
                    bar_line_span: section.bar_line_span,
                    parts: vec![part],
                });
            }
            None => groups.push(PartGroup::Part(part)),
        }
    }

    if let Some(current) = open {
        groups.push(current.close());
    }

    groups
}
