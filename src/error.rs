// Configuration errors
//
// Every screening operation assumes some prior setup: a loaded term
// dictionary, a flagged table, a prepared corpus, a trained model. When
// that setup is missing the operation fails with one of these variants
// instead of producing a silently empty result. Callers that want to
// branch on the cause can downcast from `anyhow::Error`.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("term dictionary is empty; load terms before matching")]
    EmptyDictionary,

    #[error("table has no 'flag' column; screen it before selecting flagged rows")]
    MissingFlagColumn,

    #[error("table has no 'Dominant_Topic' column; expected a topic details table")]
    MissingTopicColumn,

    #[error("corpus is not prepared; prepare documents before training")]
    CorpusNotPrepared,

    #[error("topic model is not trained; train it before requesting topics")]
    ModelNotBuilt,
}
