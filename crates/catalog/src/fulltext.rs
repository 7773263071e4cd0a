//! In-RAM English full-text index over company names.
//!
//! Names and queries go through the same analyzer: word tokenizer, lowercase,
//! English stop-word removal, English stemming. A query matches a name when
//! every distinct query term occurs in the name, mirroring
//! `to_tsvector('english', name) @@ plainto_tsquery('english', query)`.

use crate::CatalogError;
use tantivy::collector::DocSetCollector;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, STORED,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, TokenStream,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

const ANALYZER: &str = "company_en";
const WRITER_HEAP_BYTES: usize = 15_000_000;
const MAX_TOKEN_LEN: usize = 40;

pub(crate) struct FullTextIndex {
    index: Index,
    reader: IndexReader,
    name: Field,
    ordinal: Field,
}

fn english_analyzer() -> Result<TextAnalyzer, CatalogError> {
    let stop_words = StopWordFilter::new(Language::English)
        .ok_or_else(|| CatalogError::FullText("no English stop-word list".into()))?;
    Ok(TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(stop_words)
        .filter(Stemmer::new(Language::English))
        .build())
}

impl FullTextIndex {
    /// Index `names`; a name's position becomes its ordinal.
    pub(crate) fn build<'a, I>(names: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut schema = Schema::builder();
        let indexing = TextFieldIndexing::default()
            .set_tokenizer(ANALYZER)
            .set_index_option(IndexRecordOption::Basic);
        let name = schema.add_text_field("name", TextOptions::default().set_indexing_options(indexing));
        let ordinal = schema.add_u64_field("ordinal", STORED);

        let index = Index::create_in_ram(schema.build());
        index.tokenizers().register(ANALYZER, english_analyzer()?);

        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        for (position, text) in names.into_iter().enumerate() {
            let mut doc = TantivyDocument::new();
            doc.add_text(name, text);
            doc.add_u64(ordinal, position as u64);
            writer.add_document(doc)?;
        }
        writer.commit()?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        reader.reload()?;

        Ok(Self {
            index,
            reader,
            name,
            ordinal,
        })
    }

    /// Ordinals of every name containing all analyzed terms of `query`, ascending.
    pub(crate) fn matching_ordinals(&self, query: &str) -> Result<Vec<usize>, CatalogError> {
        let terms = self.analyze(query)?;
        if terms.is_empty() {
            return Err(CatalogError::MalformedFullTextQuery(format!(
                "{query:?} has no searchable terms"
            )));
        }

        let clauses: Vec<(Occur, Box<dyn Query>)> = terms
            .iter()
            .map(|text| {
                let term = Term::from_field_text(self.name, text);
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::Basic));
                (Occur::Must, query)
            })
            .collect();

        let searcher = self.reader.searcher();
        let addresses = searcher.search(&BooleanQuery::new(clauses), &DocSetCollector)?;

        let mut ordinals = Vec::with_capacity(addresses.len());
        for address in addresses {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(ordinal) = doc.get_first(self.ordinal).and_then(|v| v.as_u64()) {
                ordinals.push(ordinal as usize);
            }
        }
        ordinals.sort_unstable();
        Ok(ordinals)
    }

    fn analyze(&self, text: &str) -> Result<Vec<String>, CatalogError> {
        let mut analyzer = self
            .index
            .tokenizers()
            .get(ANALYZER)
            .ok_or_else(|| CatalogError::FullText(format!("analyzer {ANALYZER} not registered")))?;
        let mut stream = analyzer.token_stream(text);
        let mut terms: Vec<String> = Vec::new();
        while let Some(token) = stream.next() {
            if !terms.contains(&token.text) {
                terms.push(token.text.clone());
            }
        }
        Ok(terms)
    }
}
