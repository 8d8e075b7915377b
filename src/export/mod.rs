// src/export/mod.rs — Chat transcript → PDF document

pub mod pdf;

use chrono::{DateTime, Local};

use crate::chat::markdown::{render, strip_for_plaintext};
use crate::chat::session::{Message, Role};
use pdf::{Font, PdfBuilder, Style};

pub const DEFAULT_PAPER_TITLE: &str = "Research Paper Discussion";
const DOCUMENT_HEADING: &str = "Bio-Astra Dashboard - Chat Export";

const DARK_BLUE: (f32, f32, f32) = (0.0, 0.0, 0.545);
const DARK_GREEN: (f32, f32, f32) = (0.0, 0.392, 0.0);
const GREY: (f32, f32, f32) = (0.5, 0.5, 0.5);

const TITLE_STYLE: Style = Style {
    color: DARK_BLUE,
    space_after: 30.0,
    centered: true,
    ..Style::new(Font::Bold, 16.0)
};

const INFO_STYLE: Style = Style {
    color: GREY,
    space_after: 20.0,
    ..Style::new(Font::Oblique, 10.0)
};

const QUESTION_STYLE: Style = Style {
    indent: 20.0,
    color: DARK_GREEN,
    space_after: 12.0,
    ..Style::new(Font::Bold, 12.0)
};

const ANSWER_STYLE: Style = Style {
    indent: 40.0,
    space_after: 20.0,
    ..Style::new(Font::Regular, 11.0)
};

pub struct ChatTranscript<'a> {
    pub paper_title: &'a str,
    pub session_id: Option<&'a str>,
    pub messages: &'a [Message],
    pub exported_at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct ExportedPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Display text for a recorded message: markdown rendered, then flattened
/// to prose so no markers reach the document.
pub fn plaintext_content(message: &Message) -> String {
    strip_for_plaintext(&render(&message.content))
}

pub fn export_chat(transcript: &ChatTranscript<'_>) -> ExportedPdf {
    let mut pdf = PdfBuilder::new();

    pdf.paragraph(DOCUMENT_HEADING, TITLE_STYLE);
    pdf.spacer(20.0);

    if let Some(session_id) = transcript.session_id {
        let prefix: String = session_id.chars().take(8).collect();
        pdf.paragraph(&format!("Session ID: {prefix}..."), INFO_STYLE);
        pdf.spacer(10.0);
    }

    let title = transcript.paper_title.trim();
    if !title.is_empty() && title != DEFAULT_PAPER_TITLE {
        pdf.paragraph(&format!("Paper: {title}"), INFO_STYLE);
        pdf.spacer(10.0);
    }

    pdf.paragraph(
        &format!(
            "Exported on: {}",
            transcript.exported_at.format("%B %d, %Y at %I:%M %p")
        ),
        INFO_STYLE,
    );
    pdf.spacer(20.0);

    let mut question_number = 0;
    for message in transcript.messages {
        let text = plaintext_content(message);
        match message.role {
            Role::Question => {
                question_number += 1;
                pdf.paragraph(
                    &format!("Question {question_number}: {text}"),
                    QUESTION_STYLE,
                );
                pdf.spacer(10.0);
            }
            Role::Answer => {
                pdf.paragraph(
                    "Answer:",
                    Style {
                        space_after: 0.0,
                        ..ANSWER_STYLE
                    },
                );
                pdf.paragraph(&text, ANSWER_STYLE);
                pdf.spacer(20.0);
            }
        }
    }

    let pages = pdf.page_count();
    let bytes = pdf.finish();
    let filename = format!(
        "Bio_Astra_{}.pdf",
        transcript.exported_at.format("%Y%m%d_%H%M%S")
    );
    tracing::info!(
        messages = transcript.messages.len(),
        pages,
        bytes = bytes.len(),
        "Chat transcript exported"
    );

    ExportedPdf { filename, bytes }
}
