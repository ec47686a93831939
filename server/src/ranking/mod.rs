pub mod feature_extractor;
pub mod ranker;

pub use feature_extractor::{FeatureExtractor, FeatureVector, RankingContext, SenderSnapshot};
pub use ranker::Ranker;
