use seqalign_common::{ResidueClass, Rgb};
use seqalign_core::{ComparisonSummary, FontMetrics, RenderedView, StyledCell};
use std::fmt::Write as _;

const RESET: &str = "\x1b[0m";

fn ansi_background(color: Rgb) -> String {
    // black text stays readable on every class color
    format!("\x1b[48;2;{};{};{}m\x1b[30m", color.0, color.1, color.2)
}

/// Width of the 1-based position gutter for a comparison of `length` chars
pub fn gutter_width(length: usize) -> usize {
    length.max(1).to_string().len()
}

fn push_cells(out: &mut String, cells: &[StyledCell], use_color: bool) {
    for cell in cells {
        match cell.highlight.background() {
            Some(color) if use_color => {
                out.push_str(&ansi_background(color));
                out.push(cell.ch);
                out.push_str(RESET);
            }
            _ => out.push(cell.ch),
        }
    }
}

fn mismatch_markers(cells: &[StyledCell]) -> String {
    let markers: String = cells
        .iter()
        .map(|cell| if cell.highlight.is_mismatch() { '^' } else { ' ' })
        .collect();
    markers.trim_end().to_string()
}

/// Chunked side-by-side text. Each chunk prints the first row prefixed with
/// its 1-based start position and the second row below it. Without color the
/// mismatches are marked with `^` on a third line.
pub fn render_text(view: &RenderedView, total_len: usize, use_color: bool) -> String {
    let gutter = gutter_width(total_len);
    let mut out = String::new();

    for (index, chunk) in view.chunks.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }

        let _ = write!(out, "{:>gutter$} ", chunk.offset + 1);
        push_cells(&mut out, &chunk.first, use_color);
        out.push('\n');

        let _ = write!(out, "{:>gutter$} ", "");
        push_cells(&mut out, &chunk.second, use_color);
        out.push('\n');

        if !use_color {
            let markers = mismatch_markers(&chunk.second);
            if !markers.is_empty() {
                let _ = writeln!(out, "{:>gutter$} {}", "", markers);
            }
        }
    }

    out
}

pub fn render_legend(use_color: bool) -> String {
    let mut out = String::from("Legend:\n");
    for class in ResidueClass::ALL {
        let members = class.members();
        let swatch = if use_color {
            format!("{}{}{}", ansi_background(class.color()), members, RESET)
        } else {
            members.to_string()
        };
        let _ = writeln!(
            out,
            "  {} {} {}",
            swatch_pad(members, &swatch),
            class.label(),
            class.color()
        );
    }
    out
}

// Pads on the visible width so escape codes do not skew the columns.
fn swatch_pad(members: &str, swatch: &str) -> String {
    let padding = 10usize.saturating_sub(members.chars().count());
    format!("{}{}", swatch, " ".repeat(padding))
}

pub fn render_summary(summary: &ComparisonSummary) -> String {
    format!(
        "Length: {}  Matches: {}  Mismatches: {}  Identity: {:.1}%\n",
        summary.length,
        summary.matches,
        summary.mismatches,
        summary.identity * 100.0
    )
}

fn escape_html(ch: char) -> String {
    match ch {
        '&' => "&amp;".to_string(),
        '<' => "&lt;".to_string(),
        '>' => "&gt;".to_string(),
        '"' => "&quot;".to_string(),
        other => other.to_string(),
    }
}

fn push_html_row(out: &mut String, cells: &[StyledCell]) {
    out.push_str("<div class=\"row\">");
    for cell in cells {
        let background = cell
            .highlight
            .background()
            .map(|color| color.to_hex())
            .unwrap_or_else(|| "transparent".to_string());
        let _ = write!(
            out,
            "<span style=\"background-color:{}\">{}</span>",
            background,
            escape_html(cell.ch)
        );
    }
    out.push_str("</div>\n");
}

/// Standalone HTML page with one colored span per character
pub fn render_html(
    view: &RenderedView,
    metrics: &FontMetrics,
    summary: &ComparisonSummary,
) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Sequence comparison</title>\n<style>\n");
    let _ = writeln!(
        out,
        "body {{ font-family: {}, monospace; font-size: {}px; line-height: 2rem; }}",
        metrics.family, metrics.size
    );
    out.push_str(".chunk { margin-bottom: 1rem; white-space: pre; }\n");
    out.push_str("</style>\n</head>\n<body>\n");

    for chunk in &view.chunks {
        let _ = writeln!(out, "<div class=\"chunk\" data-offset=\"{}\">", chunk.offset);
        push_html_row(&mut out, &chunk.first);
        push_html_row(&mut out, &chunk.second);
        out.push_str("</div>\n");
    }

    let _ = writeln!(
        out,
        "<p class=\"summary\">{} positions, {} mismatches, {:.1}% identity</p>",
        summary.length,
        summary.mismatches,
        summary.identity * 100.0
    );
    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqalign_common::Alphabet;
    use seqalign_core::{
        ComparisonRenderer, MemoryClipboard, RendererOptions, Sequence, SequencePair, SurfaceSize,
    };

    fn renderer(first: &str, second: &str, width: u16) -> ComparisonRenderer {
        let alphabet = Alphabet::amino_acids();
        let pair = SequencePair::new(
            Sequence::new(first, &alphabet),
            Sequence::new(second, &alphabet),
        )
        .unwrap();
        let options = RendererOptions::default().with_metrics(FontMetrics::terminal_cell());
        let mut renderer =
            ComparisonRenderer::new(pair, options, Box::new(MemoryClipboard::new()));
        renderer.on_resize(SurfaceSize::from_cells(width, 1));
        renderer
    }

    #[test]
    fn test_plain_text_layout() {
        let renderer = renderer("ACDEFGHIKL", "ACDKFGHIKM", 4);
        let text = render_text(&renderer.render(), 10, false);
        let expected = " 1 ACDE\n   ACDK\n      ^\n\n 5 FGHI\n   FGHI\n\n 9 KL\n   KM\n    ^\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_colored_text_uses_truecolor_backgrounds() {
        let renderer = renderer("C", "G", 10);
        let text = render_text(&renderer.render(), 1, true);
        assert!(text.contains("\x1b[48;2;255;234;0m"));
        assert!(text.contains("\x1b[48;2;196;196;196m"));
        assert!(!text.contains('^'));
    }

    #[test]
    fn test_gutter_width() {
        assert_eq!(gutter_width(0), 1);
        assert_eq!(gutter_width(9), 1);
        assert_eq!(gutter_width(10), 2);
        assert_eq!(gutter_width(1234), 4);
    }

    #[test]
    fn test_html_spans() {
        let renderer = renderer("CG", "CA", 10);
        let html = render_html(&renderer.render(), &FontMetrics::default(), &renderer.summary());
        assert!(html.contains("<span style=\"background-color:#FFEA00\">C</span>"));
        assert!(html.contains("<span style=\"background-color:transparent\">C</span>"));
        assert!(html.contains("<span style=\"background-color:#67E4A6\">A</span>"));
        assert!(html.contains("font-size: 18px"));
        assert!(html.contains("50.0% identity"));
    }

    #[test]
    fn test_legend_lists_every_class() {
        let legend = render_legend(false);
        for class in ResidueClass::ALL {
            assert!(legend.contains(class.label()));
        }
        assert!(legend.contains("#FFEA00"));
    }

    #[test]
    fn test_summary_line() {
        let renderer = renderer("ACDE", "ACDF", 10);
        assert_eq!(
            render_summary(&renderer.summary()),
            "Length: 4  Matches: 3  Mismatches: 1  Identity: 75.0%\n"
        );
    }
}
