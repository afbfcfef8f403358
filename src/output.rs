//! CLI output formatting and display helpers.

use std::path::Path;

use x2pdf_core::{CategoryLabel, PipelineReport};

/// Lines printed after a successful export: the saved path, then one line
/// per category in section order.
pub(crate) fn export_report_lines(report: &PipelineReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.counts.len() + 1);
    lines.push(format!("Saved: {}", report.summary.path.display()));
    lines.extend(category_count_lines(&report.counts));
    lines
}

pub(crate) fn category_count_lines(counts: &[(CategoryLabel, usize)]) -> Vec<String> {
    counts
        .iter()
        .map(|(label, count)| format!("  {label}: {count}"))
        .collect()
}

/// Line printed after `fetch` writes the cache.
pub(crate) fn fetch_report_line(post_count: usize, cache_path: &Path) -> String {
    let noun = if post_count == 1 { "post" } else { "posts" };
    format!("Saved {post_count} {noun} to {}", cache_path.display())
}

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use x2pdf_core::{ExportSummary, PostOrigin};

    #[test]
    fn test_export_report_lines_lists_path_then_counts() {
        let report = PipelineReport {
            origin: PostOrigin::Cache,
            counts: vec![(CategoryLabel::Finance, 2), (CategoryLabel::LifeAdvice, 1)],
            summary: ExportSummary {
                path: PathBuf::from("exports/X2PDF.pdf"),
                page_count: 3,
                categories: 2,
                posts: 3,
                bytes: 1024,
            },
        };
        assert_eq!(
            export_report_lines(&report),
            vec![
                "Saved: exports/X2PDF.pdf".to_string(),
                "  Finance: 2".to_string(),
                "  Life Advice: 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_fetch_report_line_pluralizes() {
        assert_eq!(
            fetch_report_line(1, Path::new("tweets.json")),
            "Saved 1 post to tweets.json"
        );
        assert_eq!(
            fetch_report_line(7, Path::new("tweets.json")),
            "Saved 7 posts to tweets.json"
        );
    }
}
