use wasm_bindgen::prelude::*;
use serde::{Deserialize, Serialize};
use treebank_parser::token::TokenKind;
use treebank_parser::Tokenizer;
use treebank_protocol::{AnnotationRow, Deprel, TokenId, Upos};
use treebank_store::{ExportFormat, ImportReport, ImportedFile, SentenceChange, Session, SessionConfig};

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// A token as shown next to its ID in the browser
#[derive(Debug, Serialize, PartialEq)]
pub struct TokenView {
    pub id: u32,
    pub form: String,
    pub kind: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TagView {
    pub tag: &'static str,
    pub description: &'static str,
}

/// The option lists for the UPOS and DEPREL pickers
#[derive(Debug, Serialize)]
pub struct Vocabularies {
    pub upos: Vec<TagView>,
    pub deprel: Vec<TagView>,
}

#[derive(Debug, Deserialize)]
pub struct FileUpload {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FailedFile {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ImportSummary {
    pub imported: Vec<ImportedFile>,
    pub failed: Vec<FailedFile>,
}

impl From<ImportReport> for ImportSummary {
    fn from(report: ImportReport) -> Self {
        Self {
            imported: report.imported,
            failed: report
                .failed
                .into_iter()
                .map(|f| FailedFile {
                    name: f.name,
                    message: f.error.to_string(),
                })
                .collect(),
        }
    }
}

pub fn token_views(tokenizer: &Tokenizer, text: &str) -> Vec<TokenView> {
    tokenizer
        .tokenize(text)
        .iter()
        .enumerate()
        .map(|(i, token)| TokenView {
            id: i as u32 + 1,
            form: token.text.to_string(),
            kind: match token.kind {
                TokenKind::Word => "Word".to_string(),
                TokenKind::Isolated(_) => "Isolated".to_string(),
            },
        })
        .collect()
}

pub fn vocabularies() -> Vocabularies {
    Vocabularies {
        upos: Upos::ALL
            .iter()
            .map(|t| TagView { tag: t.as_str(), description: t.description() })
            .collect(),
        deprel: Deprel::ALL
            .iter()
            .map(|t| TagView { tag: t.as_str(), description: t.description() })
            .collect(),
    }
}

#[wasm_bindgen(js_name = vocabularies)]
pub fn vocabularies_js() -> Result<JsValue, JsValue> {
    to_js(&vocabularies())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One operator's annotation session running in the browser
#[wasm_bindgen]
pub struct AnnotatorSession {
    session: Session,
    tokenizer: Tokenizer,
}

#[wasm_bindgen]
impl AnnotatorSession {
    /// `config` is an optional `{ annotator, extra_isolating, strict_tree }` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<AnnotatorSession, JsValue> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };
        Ok(Self {
            tokenizer: config.tokenizer(),
            session: Session::new(config),
        })
    }

    pub fn tokenize(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&token_views(&self.tokenizer, text))
    }

    pub fn register(&mut self, name: &str) {
        self.session.register(name);
    }

    #[wasm_bindgen(js_name = goAnonymous)]
    pub fn go_anonymous(&mut self) {
        self.session.go_anonymous();
    }

    /// Returns how many unserialized rows were discarded (0 if none).
    #[wasm_bindgen(js_name = beginSentence)]
    pub fn begin_sentence(&mut self, text: &str) -> Result<u32, JsValue> {
        match self.session.begin_sentence(text).map_err(js_error)? {
            SentenceChange::Started => Ok(0),
            SentenceChange::Abandoned { rows } => Ok(rows as u32),
        }
    }

    /// `row` is an `AnnotationRow` object; LEMMA, XPOS, FEATS, DEPS and
    /// MISC may be omitted.
    #[wasm_bindgen(js_name = addRow)]
    pub fn add_row(&mut self, row: JsValue) -> Result<(), JsValue> {
        let row: AnnotationRow = serde_wasm_bindgen::from_value(row).map_err(js_error)?;
        self.session.add_row(row).map_err(js_error)
    }

    #[wasm_bindgen(js_name = removeRow)]
    pub fn remove_row(&mut self, id: u32) -> Result<bool, JsValue> {
        let removed = self.session.remove_row(TokenId::new(id)).map_err(js_error)?;
        Ok(removed.is_some())
    }

    /// The rows tagged so far, in ID order.
    pub fn rows(&self) -> Result<JsValue, JsValue> {
        let rows: Vec<&AnnotationRow> = self
            .session
            .document()
            .map(|doc| doc.rows().collect())
            .unwrap_or_default();
        to_js(&rows)
    }

    #[wasm_bindgen(js_name = canSerialize)]
    pub fn can_serialize(&self) -> bool {
        self.session.can_serialize()
    }

    pub fn serialize(&mut self) -> Result<String, JsValue> {
        self.session.serialize().map_err(js_error)
    }

    /// `files` is an array of `{ name, content }`.
    #[wasm_bindgen(js_name = importFiles)]
    pub fn import_files(&mut self, files: JsValue) -> Result<JsValue, JsValue> {
        let files: Vec<FileUpload> = serde_wasm_bindgen::from_value(files).map_err(js_error)?;
        let report = self
            .session
            .import_batch(files.iter().map(|f| (f.name.as_str(), f.content.as_str())));
        to_js(&ImportSummary::from(report))
    }

    pub fn export(&self, format: &str) -> Result<JsValue, JsValue> {
        let format: ExportFormat = format.parse().map_err(|e: String| JsValue::from_str(&e))?;
        to_js(&self.session.export(format))
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.state())
    }

    pub fn output(&self) -> String {
        self.session.output().as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_views() {
        let views = token_views(&Tokenizer::default(), "Hi!");
        assert_eq!(
            views,
            vec![
                TokenView { id: 1, form: "Hi".to_string(), kind: "Word".to_string() },
                TokenView { id: 2, form: "!".to_string(), kind: "Isolated".to_string() },
            ]
        );
    }

    #[test]
    fn test_symbols_are_not_called_punctuation() {
        let views = token_views(&Tokenizer::default(), "₦5©");
        let kinds: Vec<&str> = views.iter().map(|v| v.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Isolated", "Word", "Isolated"]);
    }

    #[test]
    fn test_vocabularies_cover_tagsets() {
        let vocab = vocabularies();
        assert_eq!(vocab.upos.len(), Upos::ALL.len());
        assert_eq!(vocab.deprel.len(), Deprel::ALL.len());
        assert_eq!(vocab.upos[0], TagView { tag: "ADJ", description: "adjective" });
    }

    #[test]
    fn test_import_summary_keeps_messages() {
        let mut session = Session::default();
        let report = session.import_batch([("broken.txt", "1\tonly\n")]);
        let summary = ImportSummary::from(report);
        assert!(summary.imported.is_empty());
        assert_eq!(summary.failed[0].name, "broken.txt");
        assert_eq!(summary.failed[0].message, "line 1: expected 10 tab-separated columns, found 2");
    }
}
