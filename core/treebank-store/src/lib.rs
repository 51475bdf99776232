pub mod buffer;
pub mod config;
pub mod document;
pub mod error;
pub mod serializer;
pub mod systems;

pub use buffer::{Export, ExportFormat, FailedImport, ImportReport, ImportedFile, OutputBuffer};
pub use config::SessionConfig;
pub use document::{can_serialize, Coverage, SentenceDocument, SessionState};
pub use error::{AnnotationError, RootHeadViolation};

use tracing::{debug, info, warn};
use treebank_parser::{parse_document, ParseError, ParsedDocument, Tokenizer};
use treebank_protocol::{AnnotationRow, Token, TokenId};
use treebank_validator::{check_tree, TreeIssue};

/// What happened to the previous sentence when a new one was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceChange {
    Started,
    /// The previous sentence still had this many unserialized rows.
    Abandoned { rows: usize },
}

/// All state of one operator's annotation session: identity, the sentence
/// being tagged and the accumulated output.
pub struct Session {
    config: SessionConfig,
    tokenizer: Tokenizer,
    annotator: Option<String>,
    document: Option<SentenceDocument>,
    output: OutputBuffer,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            tokenizer: config.tokenizer(),
            annotator: config.annotator.clone(),
            document: None,
            output: OutputBuffer::new(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn annotator(&self) -> Option<&str> {
        self.annotator.as_deref()
    }

    /// Sets the name written to `# ANNOTATOR`. A blank name means anonymous.
    pub fn register(&mut self, name: &str) {
        let name = name.trim();
        self.annotator = (!name.is_empty()).then(|| name.to_string());
    }

    pub fn go_anonymous(&mut self) {
        self.annotator = None;
    }

    /// Tokens of `text` as they would be numbered for annotation.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenizer.surface_tokens(text)
    }

    /// Starts tagging a new sentence. Rows of an unfinished previous
    /// sentence are dropped and reported in the result.
    pub fn begin_sentence(&mut self, text: &str) -> Result<SentenceChange, AnnotationError> {
        let tokens = self.tokenize(text);
        if tokens.is_empty() {
            return Err(AnnotationError::EmptyInput);
        }

        let abandoned = self
            .document
            .as_ref()
            .filter(|doc| !doc.is_serialized())
            .map_or(0, SentenceDocument::row_count);

        info!(tokens = tokens.len(), "sentence entered");
        self.document = Some(SentenceDocument::new(text, tokens));

        if abandoned > 0 {
            warn!(rows = abandoned, "unserialized rows of the previous sentence were discarded");
            Ok(SentenceChange::Abandoned { rows: abandoned })
        } else {
            Ok(SentenceChange::Started)
        }
    }

    pub fn document(&self) -> Option<&SentenceDocument> {
        self.document.as_ref()
    }

    fn document_mut(&mut self) -> Result<&mut SentenceDocument, AnnotationError> {
        self.document.as_mut().ok_or(AnnotationError::NoSentence)
    }

    pub fn state(&self) -> SessionState {
        self.document.as_ref().map_or(SessionState::Empty, SentenceDocument::state)
    }

    /// Adds or replaces the row for one token of the current sentence.
    pub fn add_row(&mut self, row: AnnotationRow) -> Result<(), AnnotationError> {
        let id = row.id;
        match self.document_mut()?.add_row(row) {
            Ok(replaced) => {
                debug!(%id, replaced = replaced.is_some(), "row tagged");
                Ok(())
            }
            Err(err) => {
                debug!(%id, error = %err, "row rejected");
                Err(err)
            }
        }
    }

    pub fn remove_row(&mut self, id: TokenId) -> Result<Option<AnnotationRow>, AnnotationError> {
        Ok(self.document_mut()?.remove_row(id))
    }

    pub fn coverage(&self) -> Option<Coverage> {
        self.document.as_ref().map(SentenceDocument::coverage)
    }

    pub fn can_serialize(&self) -> bool {
        self.document.as_ref().is_some_and(SentenceDocument::can_serialize)
    }

    /// Structural problems of the rows tagged so far.
    pub fn tree_issues(&self) -> Vec<TreeIssue> {
        match &self.document {
            Some(doc) => check_tree(&doc.rows().cloned().collect::<Vec<_>>()),
            None => Vec::new(),
        }
    }

    /// Converts the current sentence to a CoNLL-U block, appends it to the
    /// output and clears the rows. Returns the block.
    pub fn serialize(&mut self) -> Result<String, AnnotationError> {
        let issues = self.tree_issues();
        let strict = self.config.strict_tree;
        let annotator = self.annotator.clone();

        let doc = self.document_mut()?;
        if doc.is_serialized() {
            return Err(AnnotationError::AlreadySerialized);
        }
        let block = serializer::serialize(doc, annotator.as_deref())?;

        if !issues.is_empty() {
            if strict {
                return Err(AnnotationError::MalformedTree(issues));
            }
            for issue in &issues {
                warn!(%issue, "serializing a sentence with a malformed tree");
            }
        }

        doc.mark_serialized();
        let sentence = self.output.append_block(&block);
        info!(%sentence, "sentence serialized");
        Ok(block)
    }

    /// Parses previously produced CoNLL-U text and appends it, in canonical
    /// form, to the output.
    pub fn import_existing(&mut self, text: &str) -> Result<ParsedDocument, ParseError> {
        let parsed = parse_document(text)?;
        for sentence in &parsed.sentences {
            self.output.append_block(&serializer::render_parsed(sentence));
        }
        info!(sentences = parsed.sentences.len(), "imported existing annotations");
        Ok(parsed)
    }

    /// Imports several named files. A file that fails to parse is reported
    /// and skipped; the others are still imported.
    pub fn import_batch<'a, I>(&mut self, files: I) -> ImportReport
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut report = ImportReport::default();
        for (name, content) in files {
            match self.import_existing(content) {
                Ok(parsed) => report.imported.push(ImportedFile {
                    name: name.to_string(),
                    sentences: parsed.sentences.len(),
                    tokens: parsed.token_count(),
                }),
                Err(error) => {
                    warn!(file = name, %error, "could not parse file");
                    report.failed.push(FailedImport {
                        name: name.to_string(),
                        error,
                    });
                }
            }
        }
        report
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn export(&self, format: ExportFormat) -> Export {
        self.output.export(format)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treebank_protocol::{Deprel, Upos};

    fn tag_i_run(session: &mut Session) {
        session.add_row(AnnotationRow::new(1, "I", Upos::Pron, 2, Deprel::Nsubj)).unwrap();
        session.add_row(AnnotationRow::new(2, "run", Upos::Verb, 0, Deprel::Root)).unwrap();
        session.add_row(AnnotationRow::new(3, ".", Upos::Punct, 2, Deprel::Punct)).unwrap();
    }

    #[test]
    fn test_end_to_end() {
        let mut session = Session::default();
        assert_eq!(session.state(), SessionState::Empty);

        let forms: Vec<String> = session.tokenize("I run.").into_iter().map(|t| t.form).collect();
        assert_eq!(forms, vec!["I", "run", "."]);

        assert_eq!(session.begin_sentence("I run."), Ok(SentenceChange::Started));
        assert_eq!(session.state(), SessionState::Tokenized);
        assert!(!session.can_serialize());

        tag_i_run(&mut session);
        assert_eq!(session.state(), SessionState::FullyTagged);
        assert!(session.can_serialize());

        let block = session.serialize().unwrap();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "# ANNOTATOR = ANONYMOUS");
        assert_eq!(lines[1], "# Text = I run.");
        assert_eq!(lines[2], "1\tI\ti\tPRON\t_\t_\t2\tnsubj\t_\t_");
        assert_eq!(lines[3], "2\trun\trun\tVERB\t_\t_\t0\troot\t_\t_");
        assert_eq!(lines[4], "3\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_");

        assert_eq!(session.state(), SessionState::Serialized);
        assert_eq!(session.output().as_str(), block);
        assert_eq!(session.serialize(), Err(AnnotationError::AlreadySerialized));
    }

    #[test]
    fn test_output_accumulates_across_sentences() {
        let mut session = Session::default();
        session.register("Kola");

        session.begin_sentence("I run.").unwrap();
        tag_i_run(&mut session);
        let first = session.serialize().unwrap();

        session.begin_sentence("Go!").unwrap();
        session.add_row(AnnotationRow::new(1, "Go", Upos::Verb, 0, Deprel::Root)).unwrap();
        session.add_row(AnnotationRow::new(2, "!", Upos::Punct, 1, Deprel::Punct)).unwrap();
        let second = session.serialize().unwrap();

        assert_eq!(session.output().sentence_count(), 2);
        assert_eq!(session.output().as_str(), format!("{}{}", first, second));
        assert!(second.starts_with("# ANNOTATOR = Kola\n# Text = Go!\n"));
    }

    #[test]
    fn test_preconditions_are_typed() {
        let mut session = Session::default();
        assert_eq!(
            session.add_row(AnnotationRow::new(1, "I", Upos::Pron, 0, Deprel::Root)),
            Err(AnnotationError::NoSentence)
        );
        assert_eq!(session.serialize(), Err(AnnotationError::NoSentence));
        assert_eq!(session.begin_sentence(""), Err(AnnotationError::EmptyInput));
        assert_eq!(session.begin_sentence("  \n"), Err(AnnotationError::EmptyInput));
    }

    #[test]
    fn test_incomplete_sentence_is_not_serialized() {
        let mut session = Session::default();
        session.begin_sentence("I run.").unwrap();
        session.add_row(AnnotationRow::new(2, "run", Upos::Verb, 0, Deprel::Root)).unwrap();

        let err = session.serialize().unwrap_err();
        assert_eq!(
            err,
            AnnotationError::Incomplete {
                missing: vec![TokenId::new(1), TokenId::new(3)],
                unexpected: vec![],
            }
        );
        assert!(session.output().is_empty());
        assert_eq!(session.state(), SessionState::PartiallyTagged);
    }

    #[test]
    fn test_new_sentence_reports_abandoned_rows() {
        let mut session = Session::default();
        session.begin_sentence("I run.").unwrap();
        session.add_row(AnnotationRow::new(1, "I", Upos::Pron, 2, Deprel::Nsubj)).unwrap();

        assert_eq!(
            session.begin_sentence("Go!"),
            Ok(SentenceChange::Abandoned { rows: 1 })
        );
        assert_eq!(session.state(), SessionState::Tokenized);
    }

    #[test]
    fn test_strict_tree_blocks_cycles() {
        let config = SessionConfig {
            strict_tree: true,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config);
        session.begin_sentence("a b c").unwrap();
        session.add_row(AnnotationRow::new(1, "a", Upos::Noun, 0, Deprel::Root)).unwrap();
        session.add_row(AnnotationRow::new(2, "b", Upos::Noun, 3, Deprel::Nmod)).unwrap();
        session.add_row(AnnotationRow::new(3, "c", Upos::Noun, 2, Deprel::Nmod)).unwrap();

        assert!(matches!(session.serialize(), Err(AnnotationError::MalformedTree(_))));
        assert_eq!(session.state(), SessionState::FullyTagged);
        assert!(session.output().is_empty());

        // Without strict mode the same sentence goes through
        let mut lenient = Session::default();
        lenient.begin_sentence("a b c").unwrap();
        lenient.add_row(AnnotationRow::new(1, "a", Upos::Noun, 0, Deprel::Root)).unwrap();
        lenient.add_row(AnnotationRow::new(2, "b", Upos::Noun, 3, Deprel::Nmod)).unwrap();
        lenient.add_row(AnnotationRow::new(3, "c", Upos::Noun, 2, Deprel::Nmod)).unwrap();
        assert!(lenient.serialize().is_ok());
    }

    #[test]
    fn test_round_trip_through_import() {
        let mut session = Session::default();
        session.begin_sentence("I run.").unwrap();
        tag_i_run(&mut session);
        session.add_row(
            AnnotationRow::new(1, "I", Upos::Pron, 2, Deprel::Nsubj).with_feats("Number=Sing | Person=1"),
        ).unwrap();
        let block = session.serialize().unwrap();

        let mut fresh = Session::default();
        let parsed = fresh.import_existing(&block).unwrap();
        assert_eq!(parsed.sentences[0].text(), Some("I run."));
        assert_eq!(parsed.sentences[0].rows().next().unwrap().feats, "Number=Sing|Person=1");
        assert_eq!(fresh.output().as_str(), block);

        // Serialize again from the imported rows: same ten columns per row
        let mut again = Session::default();
        again.begin_sentence("I run.").unwrap();
        for row in parsed.sentences[0].rows() {
            again.add_row(row.clone()).unwrap();
        }
        assert_eq!(again.serialize().unwrap(), block);
    }

    #[test]
    fn test_batch_import_isolates_failures() {
        let good = "# Text = Go\n1\tGo\tgo\tVERB\t_\t_\t0\troot\t_\t_\n\n";
        let bad = "1  Go  go  VERB  _  _  0  root  _  _\n";

        let mut session = Session::default();
        let report = session.import_batch([("a.conllu", good), ("b.txt", bad), ("c.conllu", good)]);

        assert_eq!(report.imported.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "b.txt");
        assert!(!report.is_clean());
        assert_eq!(session.output().sentence_count(), 2);
    }

    #[test]
    fn test_determiner_round_trip() {
        let mut session = Session::default();
        session.begin_sentence("The cat").unwrap();
        session.add_row(AnnotationRow::new(1, "The", Upos::Det, 2, Deprel::Det)).unwrap();
        session.add_row(AnnotationRow::new(2, "cat", Upos::Noun, 0, Deprel::Root)).unwrap();
        let block = session.serialize().unwrap();
        assert!(block.contains("1\tThe\tthe\tDET\t_\t_\t2\tdet\t_\t_\n"));

        let mut fresh = Session::default();
        let parsed = fresh.import_existing(&block).unwrap();
        assert_eq!(parsed.sentences[0].rows().next().map(|row| row.deprel), Some(Deprel::Det));
        assert_eq!(fresh.output().as_str(), block);
    }

    #[test]
    fn test_import_treebank_style_file() {
        let weblog = "# sent_id = weblog-0001\n\
                      # text = I don't know.\n\
                      1\tI\tI\tPRON\tPRP\tCase=Nom|Number=Sing|Person=1\t4\tnsubj\t4:nsubj\t_\n\
                      2-3\tdon't\t_\t_\t_\t_\t_\t_\t_\t_\n\
                      2\tdo\tdo\tAUX\tVBP\tMood=Ind|Tense=Pres|VerbForm=Fin\t4\taux\t4:aux\t_\n\
                      3\tn't\tnot\tPART\tRB\t_\t4\tadvmod\t4:advmod\t_\n\
                      4\tknow\tknow\tVERB\tVB\tVerbForm=Inf\t0\troot\t0:root\tSpaceAfter=No\n\
                      5\t.\t.\tPUNCT\t.\t_\t4\tpunct\t4:punct\t_\n\
                      \n\
                      # sent_id = weblog-0002\n\
                      # text = The trip took days.\n\
                      1\tThe\tthe\tDET\tDT\t_\t2\tdet\t2:det\t_\n\
                      2\ttrip\ttrip\tNOUN\tNN\t_\t3\tnsubj\t3:nsubj\t_\n\
                      3\ttook\ttake\tVERB\tVBD\t_\t0\troot\t0:root\t_\n\
                      4\tdays\tday\tNOUN\tNNS\t_\t3\tobl:npmod\t3:obl:npmod\tSpaceAfter=No\n\
                      5\t.\t.\tPUNCT\t.\t_\t3\tpunct\t3:punct\t_\n\
                      \n";

        let mut session = Session::default();
        let report = session.import_batch([("en_ewt-sample.conllu", weblog)]);
        assert!(report.is_clean());
        assert_eq!(report.imported[0].sentences, 2);
        assert_eq!(report.imported[0].tokens, 10);
        assert_eq!(session.output().sentence_count(), 2);
        assert_eq!(session.output().as_str(), weblog);

        let parsed = parse_document(weblog).unwrap();
        for sentence in &parsed.sentences {
            let rows: Vec<AnnotationRow> = sentence.rows().cloned().collect();
            assert!(check_tree(&rows).is_empty());
        }
    }

    #[test]
    fn test_deps_duplicate_is_collapsed() {
        let mut session = Session::default();
        session.begin_sentence("I run.").unwrap();
        tag_i_run(&mut session);
        session
            .add_row(AnnotationRow::new(1, "I", Upos::Pron, 2, Deprel::Nsubj).with_deps("2 : nsubj"))
            .unwrap();
        let block = session.serialize().unwrap();
        assert!(block.contains("1\tI\ti\tPRON\t_\t_\t2\tnsubj\t_\t_\n"));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut a = Session::default();
        let b = Session::default();
        a.begin_sentence("Go!").unwrap();
        a.add_row(AnnotationRow::new(1, "Go", Upos::Verb, 0, Deprel::Root)).unwrap();
        a.add_row(AnnotationRow::new(2, "!", Upos::Punct, 1, Deprel::Punct)).unwrap();
        a.serialize().unwrap();
        assert!(b.output().is_empty());
        assert_eq!(b.state(), SessionState::Empty);
    }
}
