// Topic analysis over normalized communications.
//
// Owns the vocabulary, the bag-of-words corpus, and the trained model,
// in that order: prepare_data builds the first two, build_model trains
// the third, and the reporting calls derive tables from whatever is
// currently trained. Documents whose text was fully pruned from the
// vocabulary get the sentinel assignment (-1, probability 0) instead of
// a made-up topic.

use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::Value;
use tracing::info;

use crate::error::ConfigurationError;
use crate::table::{Row, Table};

use super::corpus::{Bow, Vocabulary};
use super::lda::{GibbsLda, ModelOptions};

pub const DOCUMENT_ID: &str = "Document_Id";
pub const DOMINANT_TOPIC: &str = "Dominant_Topic";
pub const TOPIC_PROB: &str = "Topic_Prob";
pub const TOPIC_KEYWORDS: &str = "Topic_Keywords";
/// Column written by [`flag_topic`]. Capitalized to stay distinct from
/// the dictionary screen's lowercase `flag`.
pub const TOPIC_FLAG_COLUMN: &str = "Flag";
pub const TOPIC: &str = "Topic";
pub const COUNT: &str = "Count";
pub const PERCENTAGE: &str = "Percentage";

/// Keywords cell text for documents with no dominant topic.
pub const NO_DOMINANT_TOPIC: &str = "No dominant topic";

/// Keywords listed per document in the details table.
const KEYWORDS_PER_TOPIC: usize = 6;

/// Vocabulary pruning bounds: a term must appear in at least
/// `MIN_DOC_FREQUENCY` documents and at most `MAX_DOC_FRACTION` of them.
const MIN_DOC_FREQUENCY: u32 = 2;
const MAX_DOC_FRACTION: f64 = 0.9;

#[derive(Debug, Default)]
pub struct TopicAnalyzer {
    vocabulary: Option<Vocabulary>,
    corpus: Option<Vec<Bow>>,
    model: Option<GibbsLda>,
}

impl TopicAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the vocabulary and bag-of-words corpus from normalized
    /// token documents. Returns `self` so training can chain off it.
    pub fn prepare_data(&mut self, documents: &[Vec<String>]) -> &mut Self {
        let mut vocabulary = Vocabulary::build(documents);
        vocabulary.filter_extremes(MIN_DOC_FREQUENCY, MAX_DOC_FRACTION);
        let corpus: Vec<Bow> = documents
            .iter()
            .map(|doc| vocabulary.doc2bow(doc))
            .collect();

        info!(
            documents = documents.len(),
            terms = vocabulary.len(),
            "Prepared bag-of-words corpus"
        );
        self.vocabulary = Some(vocabulary);
        self.corpus = Some(corpus);
        self
    }

    /// Train a topic model on the prepared corpus. A corpus that is
    /// missing, empty, or fully pruned counts as unprepared.
    pub fn build_model(&mut self, options: &ModelOptions) -> Result<&mut Self> {
        let (vocabulary, corpus) = match (&self.vocabulary, &self.corpus) {
            (Some(v), Some(c)) if !v.is_empty() && !c.is_empty() => (v, c),
            _ => return Err(ConfigurationError::CorpusNotPrepared.into()),
        };

        let model = GibbsLda::fit(corpus, vocabulary.len(), options)?;
        info!(
            topics = options.num_topics,
            passes = options.passes,
            "Trained topic model"
        );
        self.model = Some(model);
        Ok(self)
    }

    /// Per-document assignment table: Document_Id, Dominant_Topic,
    /// Topic_Prob, Topic_Keywords. Documents with no in-vocabulary tokens
    /// get topic -1.0, probability 0.0, and the sentinel keywords text.
    pub fn topic_details(&self) -> Result<Table> {
        let (model, vocabulary, corpus) = match (&self.model, &self.vocabulary, &self.corpus) {
            (Some(m), Some(v), Some(c)) => (m, v, c),
            _ => return Err(ConfigurationError::ModelNotBuilt.into()),
        };

        let mut table = Table::new(
            [DOCUMENT_ID, DOMINANT_TOPIC, TOPIC_PROB, TOPIC_KEYWORDS]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        for doc in 0..corpus.len() {
            let distribution = model.document_topics(doc);
            let (topic, prob) = dominant_topic(&distribution);
            let keywords = if topic < 0 {
                NO_DOMINANT_TOPIC.to_string()
            } else {
                model
                    .top_words(topic as usize, KEYWORDS_PER_TOPIC)
                    .into_iter()
                    .filter_map(|(term, _)| vocabulary.term(term))
                    .collect::<Vec<_>>()
                    .join(", ")
            };

            let mut row = Row::new();
            row.insert(DOCUMENT_ID.to_string(), Value::from(doc as u64));
            row.insert(DOMINANT_TOPIC.to_string(), Value::from(topic as f64));
            row.insert(TOPIC_PROB.to_string(), Value::from(prob));
            row.insert(TOPIC_KEYWORDS.to_string(), Value::from(keywords));
            table.push_row(row);
        }
        Ok(table)
    }

    /// Top `limit` terms of every trained topic, for summary display.
    pub fn topic_terms(&self, limit: usize) -> Result<Vec<(usize, Vec<String>)>> {
        let (model, vocabulary) = match (&self.model, &self.vocabulary) {
            (Some(m), Some(v)) => (m, v),
            _ => return Err(ConfigurationError::ModelNotBuilt.into()),
        };
        Ok((0..model.num_topics())
            .map(|topic| {
                let terms = model
                    .top_words(topic, limit)
                    .into_iter()
                    .filter_map(|(term, _)| vocabulary.term(term).map(str::to_string))
                    .collect();
                (topic, terms)
            })
            .collect())
    }

    /// How many documents landed on each dominant topic: Topic, Count,
    /// Percentage. Rows are in ascending topic order, the -1 sentinel
    /// group first when present.
    pub fn topic_distribution(&self) -> Result<Table> {
        let details = self.topic_details()?;
        let total = details.len();

        let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
        for row in details.rows() {
            let topic = row
                .get(DOMINANT_TOPIC)
                .and_then(Value::as_f64)
                .unwrap_or(-1.0);
            *counts.entry(topic as i64).or_insert(0) += 1;
        }

        let mut table = Table::new(
            [TOPIC, COUNT, PERCENTAGE]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        for (topic, count) in counts {
            let mut row = Row::new();
            row.insert(TOPIC.to_string(), Value::from(topic as f64));
            row.insert(COUNT.to_string(), Value::from(count));
            row.insert(
                PERCENTAGE.to_string(),
                Value::from(count as f64 / total as f64 * 100.0),
            );
            table.push_row(row);
        }
        Ok(table)
    }
}

/// Strongest entry of a topic distribution, `(-1, 0.0)` when the
/// distribution is empty. Ties keep the earlier topic.
fn dominant_topic(distribution: &[(usize, f64)]) -> (i64, f64) {
    let mut best_topic: i64 = -1;
    let mut best_prob = 0.0;
    for &(topic, prob) in distribution {
        if prob > best_prob {
            best_prob = prob;
            best_topic = topic as i64;
        }
    }
    (best_topic, best_prob)
}

/// Flag documents whose dominant topic equals `suspicious_topic_id`,
/// by numeric equality. Returns a copy of `details` with the
/// [`TOPIC_FLAG_COLUMN`] appended.
pub fn flag_topic(details: &Table, suspicious_topic_id: f64) -> Result<Table> {
    if !details.has_column(DOMINANT_TOPIC) {
        return Err(ConfigurationError::MissingTopicColumn.into());
    }
    let flags: Vec<Value> = details
        .rows()
        .iter()
        .map(|row| {
            let dominant = row.get(DOMINANT_TOPIC).and_then(Value::as_f64);
            Value::from(if dominant == Some(suspicious_topic_id) { 1 } else { 0 })
        })
        .collect();
    details.with_column(TOPIC_FLAG_COLUMN, flags)
}
