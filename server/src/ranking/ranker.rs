use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db_core::prelude::{Classification, DatabaseConnection},
    error::{AppError, AppResult},
    model::{
        ctrl::{ranking_ctrl::RankingCtrl, sender_stats_ctrl::SenderStatsCtrl},
        preferences::UserPreferences,
    },
    server_config::{cfg, FeatureWeights, TOPIC_VOCABULARY},
};

use super::feature_extractor::{FeatureExtractor, FeatureVector, RankingContext, SenderSnapshot};

/// Weighted linear combination, classification, and human-readable explanation over a
/// `FeatureVector` (SPEC_FULL §4.5). Kept separate from persistence so the scoring math stays
/// unit-testable without a database.
pub struct Ranker;

impl Ranker {
    pub fn score(features: &FeatureVector, weights: &FeatureWeights) -> f64 {
        let raw = features.sender_score * weights.sender
            + features.thread_score * weights.thread
            + features.freshness_score * weights.freshness
            + features.topic_match_score * weights.topic
            + features.noise_penalty * weights.noise_penalty;

        raw.clamp(0.0, 1.0)
    }

    pub fn classify(final_score: f64, watch_now_threshold: f64, save_threshold: f64) -> Classification {
        if final_score >= watch_now_threshold {
            Classification::WatchNow
        } else if final_score >= save_threshold {
            Classification::Save
        } else {
            Classification::Skip
        }
    }

    /// Fixed-order reasons; falls back to stating the classification and score alone when none
    /// of the five thresholds trip (SPEC_FULL §4.5).
    pub fn explain(features: &FeatureVector, final_score: f64, classification: Classification) -> String {
        let mut reasons = Vec::new();

        if features.sender_score > 0.7 {
            reasons.push("from an important sender");
        }
        if features.thread_score > 0.5 {
            reasons.push("part of an active thread");
        }
        if features.freshness_score > 0.7 {
            reasons.push("recently published");
        }
        if features.topic_match_score > 0.5 {
            reasons.push("matches your learning goals");
        }
        if features.noise_penalty < 0.7 {
            reasons.push("from a frequent sender");
        }

        if reasons.is_empty() {
            format!(
                "Classified as {} with a score of {:.2}.",
                classification_label(classification),
                final_score
            )
        } else {
            format!(
                "Classified as {} ({:.2}): {}.",
                classification_label(classification),
                final_score,
                reasons.join(", ")
            )
        }
    }

    /// Tokenizes the title, lowercases and strips non-alphanumerics, keeps tokens of length > 3
    /// present in the curated vocabulary, caps at 5 (SPEC_FULL §4.5).
    pub fn topic_tags(title: &str) -> Vec<String> {
        let mut tags = Vec::new();

        for raw in title.split_whitespace() {
            let token: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
            let token = token.to_lowercase();
            if token.len() > 3 && TOPIC_VOCABULARY.contains(&token.as_str()) && !tags.contains(&token) {
                tags.push(token);
            }
            if tags.len() == 5 {
                break;
            }
        }

        tags
    }

    /// Computes features, scores, classifies, explains, tags, and persists one Ranking row for
    /// `(user_id, link_id, now)` with caller-supplied weights, so a user's
    /// `feature_weight_overrides` can replace the configured defaults field by field
    /// (SPEC_FULL §4.5). Reads `SenderStats` itself so callers only need to supply the
    /// email/video facts.
    #[allow(clippy::too_many_arguments)]
    pub async fn rank_and_persist_with_weights(
        conn: &DatabaseConnection,
        user_id: Uuid,
        link_id: Uuid,
        sender_address: &str,
        email_received_at: DateTime<Utc>,
        thread_reply_count: i32,
        video_published_at: DateTime<Utc>,
        video_title: String,
        video_description_keywords: Vec<String>,
        learning_goals: Vec<String>,
        weights: &FeatureWeights,
    ) -> AppResult<()> {
        let sender_stats = SenderStatsCtrl::get(conn, user_id, sender_address).await?;
        let sender = sender_stats.map(|s| SenderSnapshot {
            email_count: s.email_count,
            last_email_at: s.last_email_at.with_timezone(&Utc),
            in_contacts: s.in_contacts,
        });

        let ctx = RankingContext {
            email_received_at,
            thread_reply_count,
            video_published_at,
            video_title: video_title.clone(),
            video_description_keywords,
            learning_goals,
            sender,
        };

        let features = FeatureExtractor::extract(&ctx, cfg.ranking.freshness_half_life_days);
        let final_score = Self::score(&features, weights);
        let classification = Self::classify(
            final_score,
            cfg.ranking.watch_now_threshold,
            cfg.ranking.save_threshold,
        );
        let explanation = Self::explain(&features, final_score, classification);
        let topic_tags = Self::topic_tags(&video_title);

        RankingCtrl::upsert(
            conn,
            Uuid::new_v4(),
            user_id,
            link_id,
            Utc::now(),
            features.sender_score,
            features.thread_score,
            features.freshness_score,
            features.topic_match_score,
            features.noise_penalty,
            final_score,
            classification,
            explanation,
            topic_tags,
        )
        .await?;

        Ok(())
    }

    /// Loads the join `RankInputRow` for `(user_id, link_id)` and scores it. This is the entry
    /// point the `RankCompute` queue job calls (SPEC_FULL §4.6) — it owns nothing a caller needs
    /// to assemble itself beyond the ids.
    pub async fn rank_and_persist_by_link(
        conn: &DatabaseConnection,
        user_id: Uuid,
        link_id: Uuid,
    ) -> AppResult<()> {
        let row = RankingCtrl::load_rank_input(conn, user_id, link_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("rank input for link {link_id}")))?;

        let description_keywords: Vec<String> =
            serde_json::from_value(row.description_keywords).unwrap_or_default();
        let preferences: UserPreferences =
            serde_json::from_value(row.preferences).unwrap_or_default();
        let weights = merge_weight_overrides(
            &cfg.ranking.feature_weights,
            preferences.feature_weight_overrides.as_ref(),
        );

        Self::rank_and_persist_with_weights(
            conn,
            user_id,
            link_id,
            &row.sender_address,
            row.email_received_at,
            row.thread_reply_count,
            row.video_published_at,
            row.video_title,
            description_keywords,
            preferences.learning_goals,
            &weights,
        )
        .await
    }
}

/// Replaces each configured weight with its per-user override, when present.
fn merge_weight_overrides(
    base: &FeatureWeights,
    overrides: Option<&crate::model::preferences::FeatureWeightOverrides>,
) -> FeatureWeights {
    let Some(overrides) = overrides else {
        return base.clone();
    };

    FeatureWeights {
        sender: overrides.sender.unwrap_or(base.sender),
        thread: overrides.thread.unwrap_or(base.thread),
        freshness: overrides.freshness.unwrap_or(base.freshness),
        topic: overrides.topic.unwrap_or(base.topic),
        noise_penalty: overrides.noise_penalty.unwrap_or(base.noise_penalty),
    }
}

fn classification_label(classification: Classification) -> &'static str {
    match classification {
        Classification::WatchNow => "watch now",
        Classification::Save => "save",
        Classification::Skip => "skip",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::feature_extractor::FeatureVector;

    fn weights() -> FeatureWeights {
        FeatureWeights {
            sender: 0.3,
            thread: 0.2,
            freshness: 0.2,
            topic: 0.2,
            noise_penalty: 0.1,
        }
    }

    #[test]
    fn scenario_s6_matches_spec_example() {
        let features = FeatureVector {
            sender_score: 0.9,
            thread_score: 0.6,
            freshness_score: 0.9,
            topic_match_score: 0.8,
            noise_penalty: 1.0,
        };
        let score = Ranker::score(&features, &weights());
        assert!((score - 0.83).abs() < 1e-9);

        let classification = Ranker::classify(score, 0.7, 0.4);
        assert_eq!(classification, Classification::WatchNow);

        let explanation = Ranker::explain(&features, score, classification);
        assert!(explanation.contains("from an important sender"));
        assert!(explanation.contains("part of an active thread"));
        assert!(explanation.contains("recently published"));
        assert!(explanation.contains("matches your learning goals"));
        assert!(!explanation.contains("from a frequent sender"));
    }

    #[test]
    fn classification_is_monotonic_in_score() {
        let rank = |s: f64| Ranker::classify(s, 0.7, 0.4);
        assert!(rank(0.9) == Classification::WatchNow);
        assert!(rank(0.5) == Classification::Save);
        assert!(rank(0.1) == Classification::Skip);
    }

    #[test]
    fn score_is_clamped_to_unit_interval() {
        let features = FeatureVector {
            sender_score: 1.0,
            thread_score: 1.0,
            freshness_score: 1.0,
            topic_match_score: 1.0,
            noise_penalty: 1.0,
        };
        let score = Ranker::score(
            &features,
            &FeatureWeights {
                sender: 1.0,
                thread: 1.0,
                freshness: 1.0,
                topic: 1.0,
                noise_penalty: 1.0,
            },
        );
        assert_eq!(score, 1.0);
    }

    #[test]
    fn no_reasons_falls_back_to_classification_and_score() {
        let features = FeatureVector {
            sender_score: 0.1,
            thread_score: 0.0,
            freshness_score: 0.1,
            topic_match_score: 0.2,
            noise_penalty: 1.0,
        };
        let score = Ranker::score(&features, &weights());
        let classification = Ranker::classify(score, 0.7, 0.4);
        let explanation = Ranker::explain(&features, score, classification);
        assert!(explanation.starts_with("Classified as skip"));
    }

    #[test]
    fn weight_overrides_replace_only_the_fields_set() {
        let base = weights();
        let overrides = crate::model::preferences::FeatureWeightOverrides {
            sender: Some(0.9),
            thread: None,
            freshness: None,
            topic: None,
            noise_penalty: None,
        };
        let merged = merge_weight_overrides(&base, Some(&overrides));
        assert_eq!(merged.sender, 0.9);
        assert_eq!(merged.thread, base.thread);
        assert_eq!(merged.freshness, base.freshness);
    }

    #[test]
    fn no_overrides_returns_base_weights_unchanged() {
        let base = weights();
        let merged = merge_weight_overrides(&base, None);
        assert_eq!(merged.sender, base.sender);
        assert_eq!(merged.noise_penalty, base.noise_penalty);
    }

    #[test]
    fn topic_tags_are_capped_at_five_and_vocabulary_filtered() {
        let title = "Rust Async Database Networking Security Performance Extra Words Here";
        let tags = Ranker::topic_tags(title);
        assert!(tags.len() <= 5);
        assert!(tags.contains(&"rust".to_string()));
        assert!(!tags.contains(&"extra".to_string()));
    }
}
