// Topic modeling: corpus preparation, Gibbs LDA training, and reporting.

pub mod analyzer;
pub mod corpus;
pub mod lda;
