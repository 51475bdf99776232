use std::fmt;
use std::str::FromStr;

use treebank_parser::ParseError;
use treebank_protocol::SentenceId;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Download formats. Both carry the same CoNLL-U text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ExportFormat {
    Conllu,
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Conllu => "conllu",
            ExportFormat::Txt => "txt",
        }
    }

    pub fn file_name(self) -> String {
        format!("unidep.{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "conllu" => Ok(ExportFormat::Conllu),
            "txt" => Ok(ExportFormat::Txt),
            other => Err(format!("unknown export format '{}' (expected conllu or txt)", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Export {
    pub file_name: String,
    pub contents: String,
}

/// Append-only CoNLL-U text accumulated over a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    text: String,
    sentences: usize,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one sentence block (already terminated by its blank line)
    /// and returns its position in the buffer.
    pub fn append_block(&mut self, block: &str) -> SentenceId {
        self.text.push_str(block);
        self.sentences += 1;
        SentenceId::new(self.sentences as u32)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences
    }

    pub fn is_empty(&self) -> bool {
        self.sentences == 0
    }

    pub fn export(&self, format: ExportFormat) -> Export {
        Export {
            file_name: format.file_name(),
            contents: self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ImportedFile {
    pub name: String,
    pub sentences: usize,
    pub tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedImport {
    pub name: String,
    pub error: ParseError,
}

/// Outcome of importing several files: each file succeeds or fails alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<ImportedFile>,
    pub failed: Vec<FailedImport>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_only() {
        let mut buffer = OutputBuffer::new();
        assert!(buffer.is_empty());
        let first = buffer.append_block("# Text = a\n1\ta\ta\tX\t_\t_\t0\troot\t_\t_\n\n");
        let second = buffer.append_block("# Text = b\n1\tb\tb\tX\t_\t_\t0\troot\t_\t_\n\n");
        assert_eq!(first, SentenceId::new(1));
        assert_eq!(second, SentenceId::new(2));
        assert_eq!(buffer.sentence_count(), 2);
        assert!(buffer.as_str().starts_with("# Text = a\n"));
        assert!(buffer.as_str().contains("\n\n# Text = b\n"));
    }

    #[test]
    fn test_export_formats() {
        let mut buffer = OutputBuffer::new();
        buffer.append_block("x\n\n");
        let conllu = buffer.export(ExportFormat::Conllu);
        let txt = buffer.export(ExportFormat::Txt);
        assert_eq!(conllu.file_name, "unidep.conllu");
        assert_eq!(txt.file_name, "unidep.txt");
        assert_eq!(conllu.contents, txt.contents);

        assert_eq!(".TXT".parse::<ExportFormat>(), Ok(ExportFormat::Txt));
        assert!("csv".parse::<ExportFormat>().is_err());
    }
}
