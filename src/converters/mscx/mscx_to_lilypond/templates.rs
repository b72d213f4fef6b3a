//! LilyPond book templates
//!
//! The `\book` wrappers for part books and the full score are Mustache
//! templates. Optional blocks (paper size, header, staff size) are guarded
//! by boolean flags so an unset option leaves no trace in the output.
//!
//! ## Related Files
//!
//! - `lilypond.rs` - builds the staff blocks and fills the contexts
//! - `templates/part_book.ly.mustache`, `templates/score_book.ly.mustache`

use serde::Serialize;

/// Template selection for book output
#[derive(Debug, Clone, Copy)]
pub enum BookTemplate {
    /// One instrument's part, with its own output suffix
    Part,
    /// All groups together
    Score,
}

/// One `key = "value"` line of a `\header` block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderField {
    pub key: String,
    pub value: String,
}

/// Context data for template rendering
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    /// Staff blocks, already rendered
    pub staves: String,

    /// `\bookOutputSuffix` value (part books only)
    pub output_suffix: String,

    pub has_paper_size: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_size: Option<String>,

    pub has_header: bool,
    /// Escaped header lines, in output order
    pub header: Vec<HeaderField>,

    pub has_staff_size: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_size: Option<String>,
}

impl TemplateContext {
    /// Create a new template context with required fields
    pub fn new(staves: String) -> Self {
        Self {
            staves,
            output_suffix: String::new(),
            has_paper_size: false,
            paper_size: None,
            has_header: false,
            header: Vec::new(),
            has_staff_size: false,
            staff_size: None,
        }
    }

    /// Builder pattern for fluent API
    pub fn builder(staves: String) -> TemplateContextBuilder {
        TemplateContextBuilder::new(staves)
    }
}

/// Builder for TemplateContext
pub struct TemplateContextBuilder {
    context: TemplateContext,
}

impl TemplateContextBuilder {
    pub fn new(staves: String) -> Self {
        Self {
            context: TemplateContext::new(staves),
        }
    }

    pub fn output_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.context.output_suffix = suffix.into();
        self
    }

    /// Set the paper size name (`None` omits the `\paper` block)
    pub fn paper_size(mut self, paper_size: Option<String>) -> Self {
        self.context.has_paper_size = paper_size.is_some();
        self.context.paper_size = paper_size;
        self
    }

    /// Add a header line if the value is present. The value is escaped.
    pub fn header_field(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.context.header.push(HeaderField {
                key: key.to_string(),
                value: escape_lilypond_string(value),
            });
            self.context.has_header = true;
        }
        self
    }

    /// Set the staff size (`None` omits the `\layout` block)
    pub fn staff_size(mut self, staff_size: Option<f64>) -> Self {
        self.context.has_staff_size = staff_size.is_some();
        self.context.staff_size = staff_size.map(format_staff_size);
        self
    }

    pub fn build(self) -> TemplateContext {
        self.context
    }
}

/// Whole sizes print without a fractional part (`20`, `17.5`)
pub fn format_staff_size(size: f64) -> String {
    if size.fract() == 0.0 {
        format!("{:.0}", size)
    } else {
        format!("{}", size)
    }
}

/// Escape a string for use inside LilyPond double quotes
pub fn escape_lilypond_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Get template content by type
pub fn get_template_content(template_type: BookTemplate) -> &'static str {
    match template_type {
        BookTemplate::Part => include_str!("templates/part_book.ly.mustache"),
        BookTemplate::Score => include_str!("templates/score_book.ly.mustache"),
    }
}

/// Render a book using a template
pub fn render_book(
    template_type: BookTemplate,
    context: &TemplateContext,
) -> Result<String, Box<dyn std::error::Error>> {
    let template_content = get_template_content(template_type);
    let template = mustache::compile_str(template_content)?;
    Ok(template.render_to_string(context)?)
}
