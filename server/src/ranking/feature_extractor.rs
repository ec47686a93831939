use chrono::{DateTime, Utc};

/// Snapshot of the fields of `SenderStats` the feature math needs, decoupled from the entity
/// type so this module stays a pure function of its inputs (SPEC_FULL §4.4).
#[derive(Debug, Clone, Copy)]
pub struct SenderSnapshot {
    pub email_count: i32,
    pub last_email_at: DateTime<Utc>,
    pub in_contacts: bool,
}

/// Everything the extractor needs to score one (user, link) pair. Built by the caller from a
/// joined read of Email, YoutubeLink, VideoMetadata and SenderStats (SPEC_FULL §4.4).
#[derive(Debug, Clone)]
pub struct RankingContext {
    pub email_received_at: DateTime<Utc>,
    pub thread_reply_count: i32,
    pub video_published_at: DateTime<Utc>,
    pub video_title: String,
    pub video_description_keywords: Vec<String>,
    pub learning_goals: Vec<String>,
    pub sender: Option<SenderSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub sender_score: f64,
    pub thread_score: f64,
    pub freshness_score: f64,
    pub topic_match_score: f64,
    pub noise_penalty: f64,
}

pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn extract(ctx: &RankingContext, freshness_half_life_days: i64) -> FeatureVector {
        FeatureVector {
            sender_score: Self::sender_score(ctx),
            thread_score: Self::thread_score(ctx.thread_reply_count),
            freshness_score: Self::freshness_score(ctx, freshness_half_life_days),
            topic_match_score: Self::topic_match_score(ctx),
            noise_penalty: Self::noise_penalty(ctx),
        }
    }

    /// `min(1, normLog * recency * contactsBoost)` for known senders, `0.1` for unknown
    /// (SPEC_FULL §4.4).
    fn sender_score(ctx: &RankingContext) -> f64 {
        let Some(sender) = &ctx.sender else {
            return 0.1;
        };

        let norm_log = (f64::from(sender.email_count + 1).ln() / 1001f64.ln()).clamp(0.0, 1.0);
        let days_since_last_email = (ctx.email_received_at - sender.last_email_at)
            .num_seconds() as f64
            / 86_400.0;
        let recency = (-days_since_last_email.max(0.0) / 30.0).exp();
        let contacts_boost = if sender.in_contacts { 1.5 } else { 1.0 };

        (norm_log * recency * contacts_boost).min(1.0)
    }

    fn thread_score(thread_reply_count: i32) -> f64 {
        (f64::from(thread_reply_count) / 3.0).min(1.0)
    }

    /// `exp(-days_since_publish / H)`; negative (future-dated) gaps are floored at 0 rather than
    /// producing a freshness score above 1 (SPEC_FULL §4.4).
    fn freshness_score(ctx: &RankingContext, half_life_days: i64) -> f64 {
        let days_since_publish = (ctx.email_received_at - ctx.video_published_at).num_seconds()
            as f64
            / 86_400.0;
        (-days_since_publish.max(0.0) / half_life_days as f64).exp()
    }

    /// `0.5` when the user has no learning goals; otherwise the fraction of goals whose keyword
    /// appears (case-insensitively) in the title+description (SPEC_FULL §4.4).
    fn topic_match_score(ctx: &RankingContext) -> f64 {
        if ctx.learning_goals.is_empty() {
            return 0.5;
        }

        let haystack = format!(
            "{} {}",
            ctx.video_title,
            ctx.video_description_keywords.join(" ")
        )
        .to_lowercase();

        let matched = ctx
            .learning_goals
            .iter()
            .filter(|goal| haystack.contains(&goal.to_lowercase()))
            .count();

        matched as f64 / ctx.learning_goals.len() as f64
    }

    /// `1 - min(email_count/100, 0.5)` for known senders (so it stays in `[0.5, 1]`), `1.0` for
    /// unknown senders. Higher is less noisy (SPEC_FULL §4.4).
    fn noise_penalty(ctx: &RankingContext) -> f64 {
        let Some(sender) = &ctx.sender else {
            return 1.0;
        };

        1.0 - (f64::from(sender.email_count) / 100.0).min(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_ctx() -> RankingContext {
        RankingContext {
            email_received_at: Utc::now(),
            thread_reply_count: 0,
            video_published_at: Utc::now(),
            video_title: "Rust async patterns".to_string(),
            video_description_keywords: vec!["tokio".to_string(), "futures".to_string()],
            learning_goals: vec![],
            sender: None,
        }
    }

    #[test]
    fn unknown_sender_scores_low_and_full_noise_penalty() {
        let ctx = base_ctx();
        assert_eq!(FeatureExtractor::sender_score(&ctx), 0.1);
        assert_eq!(FeatureExtractor::noise_penalty(&ctx), 1.0);
    }

    #[test]
    fn known_sender_with_contacts_boost_is_bounded_by_one() {
        let mut ctx = base_ctx();
        ctx.sender = Some(SenderSnapshot {
            email_count: 5000,
            last_email_at: ctx.email_received_at,
            in_contacts: true,
        });
        assert!(FeatureExtractor::sender_score(&ctx) <= 1.0);
    }

    #[test]
    fn thread_score_caps_at_one() {
        assert_eq!(FeatureExtractor::thread_score(3), 1.0);
        assert_eq!(FeatureExtractor::thread_score(9), 1.0);
        assert!((FeatureExtractor::thread_score(1) - (1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn freshness_is_one_at_publish_time_and_decays() {
        let ctx = base_ctx();
        assert!((FeatureExtractor::freshness_score(&ctx, 30) - 1.0).abs() < 1e-9);

        let mut older = ctx.clone();
        older.video_published_at = older.email_received_at - chrono::Duration::days(30);
        let decayed = FeatureExtractor::freshness_score(&older, 30);
        assert!((decayed - (-1f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn future_published_at_is_floored_not_above_one() {
        let mut ctx = base_ctx();
        ctx.video_published_at = ctx.email_received_at + chrono::Duration::days(5);
        assert_eq!(FeatureExtractor::freshness_score(&ctx, 30), 1.0);
    }

    #[test]
    fn empty_learning_goals_yields_half() {
        let ctx = base_ctx();
        assert_eq!(FeatureExtractor::topic_match_score(&ctx), 0.5);
    }

    #[test]
    fn topic_match_counts_case_insensitive_substring_hits() {
        let mut ctx = base_ctx();
        ctx.learning_goals = vec!["RUST".to_string(), "kubernetes".to_string()];
        assert!((FeatureExtractor::topic_match_score(&ctx) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn noise_penalty_stays_within_half_to_one() {
        let mut ctx = base_ctx();
        ctx.sender = Some(SenderSnapshot {
            email_count: 1000,
            last_email_at: ctx.email_received_at,
            in_contacts: false,
        });
        assert_eq!(FeatureExtractor::noise_penalty(&ctx), 0.5);
    }

    #[test]
    fn all_scores_land_in_unit_interval() {
        let mut ctx = base_ctx();
        ctx.thread_reply_count = 12;
        ctx.learning_goals = vec!["rust".to_string()];
        ctx.sender = Some(SenderSnapshot {
            email_count: 40,
            last_email_at: ctx.email_received_at - chrono::Duration::days(2),
            in_contacts: true,
        });
        let features = FeatureExtractor::extract(&ctx, 30);
        for score in [
            features.sender_score,
            features.thread_score,
            features.freshness_score,
            features.topic_match_score,
            features.noise_penalty,
        ] {
            assert!((0.0..=1.0).contains(&score), "score {score} out of bounds");
        }
    }
}
