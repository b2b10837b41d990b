//! Renders errors with the `annotate_snippets` library
use annotate_snippets::{
    display_list::{DisplayList, FormatOptions},
    snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation},
};
use velvet_common::{Code, Span};

pub(crate) fn render(
    code: &Code,
    id: &str,
    title: &str,
    span: Span,
    label: &str,
    help: Option<String>,
) -> String {
    let origin = code.path.as_ref().map(|path| path.display().to_string());
    let range = annotation_range(&code.source, span);

    let mut footer = Vec::new();
    if let Some(help) = &help {
        footer.push(Annotation {
            id: None,
            label: Some(help),
            annotation_type: AnnotationType::Help,
        });
    }

    let snippet = Snippet {
        title: Some(Annotation {
            id: Some(id),
            label: Some(title),
            annotation_type: AnnotationType::Error,
        }),
        footer,
        slices: vec![Slice {
            source: &code.source,
            line_start: 1,
            origin: origin.as_deref(),
            fold: true,
            annotations: vec![SourceAnnotation {
                range,
                label,
                annotation_type: AnnotationType::Error,
            }],
        }],
        opt: FormatOptions {
            color: crate::COLORED,
            ..Default::default()
        },
    };

    DisplayList::from(snippet).to_string()
}

/// Converts the span into char offsets that always cover at least one character
fn annotation_range(source: &str, span: Span) -> (usize, usize) {
    let char_count = source.chars().count();
    let (start, end) = span.char_bounds(source);
    if start < end {
        (start, end)
    } else if start < char_count {
        (start, start + 1)
    } else {
        (char_count.saturating_sub(1), char_count)
    }
}

#[cfg(test)]
mod tests {
    use velvet_common::Span;

    use super::annotation_range;

    #[test]
    fn empty_span_is_widened() {
        assert_eq!(annotation_range("~x = ;", Span::new(5, 0)), (5, 6));
        assert_eq!(annotation_range("~x = 1", Span::new(6, 0)), (5, 6));
    }
}
