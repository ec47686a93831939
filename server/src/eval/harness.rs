use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db_core::prelude::{Classification, DatabaseConnection, FeedbackAction},
    error::AppResult,
    model::ctrl::{
        feedback_ctrl::FeedbackCtrl, ranking_ctrl::RankingCtrl,
        youtube_link_ctrl::YoutubeLinkCtrl,
    },
};

/// Inputs to one offline run (SPEC_FULL §4.7, `GET /users/:id/eval`).
#[derive(Debug, Clone)]
pub struct EvalRequest {
    pub user_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub ks: Vec<usize>,
}

impl EvalRequest {
    pub fn with_default_ks(user_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            user_id,
            start,
            end,
            ks: vec![5, 10, 20],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    pub precision_at_k: BTreeMap<usize, f64>,
    pub coverage: f64,
    pub novelty: f64,
    pub stability: f64,
}

/// Pure, deterministic offline metrics over persisted Rankings and Feedback — no external calls,
/// no writes (SPEC_FULL §4.7).
pub struct EvaluationHarness;

impl EvaluationHarness {
    pub async fn run(conn: &DatabaseConnection, req: &EvalRequest) -> AppResult<EvalReport> {
        let rankings = RankingCtrl::rankings_in_range(conn, req.user_id, req.start, req.end).await?;
        let channel_rows =
            RankingCtrl::rankings_in_range_with_channel(conn, req.user_id, req.start, req.end)
                .await?;
        let feedback = FeedbackCtrl::in_range(conn, req.user_id, req.start, req.end).await?;
        let extracted =
            YoutubeLinkCtrl::count_extracted_in_range(conn, req.user_id, req.start, req.end).await?;

        let relevant: HashSet<Uuid> = feedback
            .iter()
            .filter(|f| {
                f.action == FeedbackAction::Watched
                    || f.relevance_label == Some(Classification::WatchNow)
            })
            .map(|f| f.link_id)
            .collect();

        let precision_at_k = req
            .ks
            .iter()
            .map(|&k| (k, Self::precision_at_k(&rankings, &relevant, k)))
            .collect();

        let coverage = Self::coverage(&rankings, extracted);
        let novelty = Self::novelty(&channel_rows);
        let stability = Self::stability(&rankings);

        Ok(EvalReport {
            precision_at_k,
            coverage,
            novelty,
            stability,
        })
    }

    /// Rankings are already ordered `final_score desc, ranked_at desc` by the query
    /// (SPEC_FULL §4.7 precision@k).
    fn precision_at_k(
        rankings: &[entity::ranking::Model],
        relevant: &HashSet<Uuid>,
        k: usize,
    ) -> f64 {
        let denom = k.min(rankings.len());
        if denom == 0 {
            return 0.0;
        }

        let hits = rankings
            .iter()
            .take(k)
            .filter(|r| relevant.contains(&r.link_id))
            .count();

        hits as f64 / denom as f64
    }

    fn coverage(rankings: &[entity::ranking::Model], extracted: u64) -> f64 {
        if extracted == 0 {
            return 0.0;
        }

        let distinct_links: HashSet<Uuid> = rankings.iter().map(|r| r.link_id).collect();
        distinct_links.len() as f64 / extracted as f64
    }

    fn novelty(channel_rows: &[crate::model::ctrl::ranking_ctrl::RankingChannelRow]) -> f64 {
        if channel_rows.is_empty() {
            return 0.0;
        }

        let distinct_channels: HashSet<&str> =
            channel_rows.iter().map(|r| r.channel_id.as_str()).collect();

        distinct_channels.len() as f64 / channel_rows.len() as f64
    }

    /// Mean Jaccard similarity of top-20 link-id sets across adjacent calendar days; 1.0 with
    /// fewer than two days of data (SPEC_FULL §4.7 stability).
    fn stability(rankings: &[entity::ranking::Model]) -> f64 {
        let mut by_day: BTreeMap<NaiveDate, Vec<&entity::ranking::Model>> = BTreeMap::new();
        for r in rankings {
            by_day
                .entry(r.ranked_at.date_naive())
                .or_default()
                .push(r);
        }

        let mut days: Vec<(NaiveDate, Vec<&entity::ranking::Model>)> = by_day.into_iter().collect();
        if days.len() < 2 {
            return 1.0;
        }

        for (_, rows) in days.iter_mut() {
            rows.sort_by(|a, b| {
                b.final_score
                    .partial_cmp(&a.final_score)
                    .unwrap()
                    .then(b.ranked_at.cmp(&a.ranked_at))
            });
        }

        let top_sets: Vec<HashSet<Uuid>> = days
            .iter()
            .map(|(_, rows)| rows.iter().take(20).map(|r| r.link_id).collect())
            .collect();

        let mut total = 0.0;
        let mut pairs = 0;
        for window in top_sets.windows(2) {
            let (s1, s2) = (&window[0], &window[1]);
            let union = s1.union(s2).count();
            let jaccard = if union == 0 {
                1.0
            } else {
                s1.intersection(s2).count() as f64 / union as f64
            };
            total += jaccard;
            pairs += 1;
        }

        total / pairs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::sea_orm_active_enums::Classification as Cls;

    fn ranking_row(link_id: Uuid, final_score: f64, ranked_at: DateTime<Utc>) -> entity::ranking::Model {
        entity::ranking::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            link_id,
            ranked_at: ranked_at.into(),
            sender_score: 0.0,
            thread_score: 0.0,
            freshness_score: 0.0,
            topic_match_score: 0.0,
            noise_penalty: 0.0,
            final_score,
            classification: Cls::WatchNow,
            explanation: String::new(),
            topic_tags: serde_json::json!([]),
        }
    }

    #[test]
    fn precision_at_k_counts_relevant_hits_over_min_k_len() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let now = Utc::now();
        let rankings = vec![
            ranking_row(a, 0.9, now),
            ranking_row(b, 0.8, now),
            ranking_row(c, 0.7, now),
        ];
        let relevant: HashSet<Uuid> = [a, c].into_iter().collect();

        assert_eq!(EvaluationHarness::precision_at_k(&rankings, &relevant, 2), 0.5);
        assert_eq!(EvaluationHarness::precision_at_k(&rankings, &relevant, 10), 2.0 / 3.0);
        assert_eq!(EvaluationHarness::precision_at_k(&rankings, &relevant, 0), 0.0);
    }

    #[test]
    fn coverage_is_zero_when_nothing_extracted() {
        assert_eq!(EvaluationHarness::coverage(&[], 0), 0.0);
    }

    #[test]
    fn coverage_divides_distinct_ranked_links_by_extracted() {
        let a = Uuid::new_v4();
        let now = Utc::now();
        let rankings = vec![ranking_row(a, 0.5, now), ranking_row(a, 0.6, now)];
        assert_eq!(EvaluationHarness::coverage(&rankings, 4), 0.25);
    }

    #[test]
    fn stability_is_one_with_fewer_than_two_days() {
        let rankings = vec![ranking_row(Uuid::new_v4(), 0.5, Utc::now())];
        assert_eq!(EvaluationHarness::stability(&rankings), 1.0);
    }

    #[test]
    fn stability_is_one_when_adjacent_days_share_the_same_top_set() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let day1 = Utc::now();
        let day2 = day1 + chrono::Duration::days(1);
        let rankings = vec![
            ranking_row(a, 0.9, day1),
            ranking_row(b, 0.8, day1),
            ranking_row(a, 0.9, day2),
            ranking_row(b, 0.8, day2),
        ];
        assert_eq!(EvaluationHarness::stability(&rankings), 1.0);
    }

    #[test]
    fn stability_is_zero_when_adjacent_days_share_nothing() {
        let day1 = Utc::now();
        let day2 = day1 + chrono::Duration::days(1);
        let rankings = vec![
            ranking_row(Uuid::new_v4(), 0.9, day1),
            ranking_row(Uuid::new_v4(), 0.8, day2),
        ];
        assert_eq!(EvaluationHarness::stability(&rankings), 0.0);
    }
}
