//! Diagnostic and error reporting for netdl.
//! netdl 的诊断和错误报告。
//!
//! This crate renders evaluation errors using ariadne.
//! 本 crate 使用 ariadne 库渲染求值错误。

mod codes;
mod diagnostic;

pub use codes::ErrorCode;
pub use diagnostic::{Diagnostic, DiagnosticKind, Label, Severity};

use ariadne::{ColorGenerator, Label as AriadneLabel, Report, ReportKind, Source};

/// Render a diagnostic to stderr.
/// 将诊断信息渲染到标准错误输出。
///
/// Labels whose location carries no span are dropped from the annotated
/// source; they still appear in the plain-text form.
pub fn emit(source: &str, filename: &str, diagnostic: &Diagnostic) {
    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Note => ReportKind::Advice,
    };

    let mut colors = ColorGenerator::new();
    let mut report = Report::build(kind, filename, diagnostic.location.span.range().start)
        .with_message(&diagnostic.message);

    if let Some(code) = &diagnostic.code {
        report = report.with_code(code.as_str());
    }

    if !diagnostic.location.span.is_empty() {
        report = report.with_label(
            AriadneLabel::new((filename, diagnostic.location.span.range()))
                .with_message("error occurred here")
                .with_color(colors.next()),
        );
    }

    for label in diagnostic.labels.iter().filter(|l| !l.location.span.is_empty()) {
        let color = colors.next();
        let ariadne_label = AriadneLabel::new((filename, label.location.span.range()))
            .with_message(&label.message)
            .with_color(color);
        report = report.with_label(ariadne_label);
    }

    for note in &diagnostic.notes {
        report = report.with_note(note);
    }

    if let Some(help) = &diagnostic.help {
        report = report.with_help(help);
    }

    if report
        .finish()
        .eprint((filename, Source::from(source)))
        .is_err()
    {
        eprintln!("{diagnostic}");
    }
}
