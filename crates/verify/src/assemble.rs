use corpus::CorpusRecord;
use extract::RelationGroup;
use serde::{Deserialize, Serialize};

use crate::engine::{Verification, VerificationOutcome};
use crate::labels::{LabelResolver, entity_link, wiki_link};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRef {
    pub name: String,
    pub link: String,
}

/// Public shape of one evidence record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceView {
    pub subject: String,
    pub object: String,
    pub predicate: String,
    pub snippet: String,
    pub link: String,
    pub source: String,
    pub probability: f64,
}

/// Verification result for one distinct relation on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationReport {
    pub subject: EntityRef,
    pub object: EntityRef,
    pub predicate: EntityRef,
    pub sentences: Vec<String>,
    #[serde(rename = "type")]
    pub outcome: VerificationOutcome,
    pub evidence: Vec<EvidenceView>,
    pub probability: f64,
}

/// Article id carried in a `source` value of the form `a:b:<article>`.
/// Anything without exactly three segments has no article.
pub fn article_id(source: &str) -> &str {
    let segments: Vec<&str> = source.split(':').collect();
    if segments.len() == 3 { segments[2] } else { "" }
}

async fn entity(labels: &LabelResolver, id: &str) -> EntityRef {
    EntityRef {
        name: labels.resolve(id).await,
        link: entity_link(id),
    }
}

async fn evidence_view(labels: &LabelResolver, record: &CorpusRecord) -> EvidenceView {
    let article = labels.resolve(article_id(&record.source)).await;

    EvidenceView {
        subject: labels.resolve(&record.subject).await,
        object: labels.resolve(&record.object).await,
        predicate: labels.resolve(&record.predicate).await,
        snippet: record.sentence.clone(),
        link: wiki_link(&article),
        source: record.source.clone(),
        probability: record.probability,
    }
}

/// Build the display record for one group and its verification.
pub async fn assemble(
    group: &RelationGroup,
    verification: &Verification,
    labels: &LabelResolver,
) -> RelationReport {
    let triple = group.triple();

    let mut evidence = Vec::with_capacity(verification.evidence.len());
    for record in &verification.evidence {
        evidence.push(evidence_view(labels, record).await);
    }

    RelationReport {
        subject: entity(labels, &triple.subject).await,
        object: entity(labels, &triple.object).await,
        predicate: entity(labels, &triple.predicate).await,
        sentences: group.sentences(),
        outcome: verification.outcome,
        evidence,
        probability: group.max_probability(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelSource;
    use async_trait::async_trait;
    use extract::{RelationCandidate, group_relations};
    use std::sync::Arc;

    struct FixedLabels;

    #[async_trait]
    impl LabelSource for FixedLabels {
        async fn label(&self, id: &str) -> anyhow::Result<String> {
            match id {
                "Q76" => Ok("Barack Obama".to_string()),
                "P26" => Ok("spouse".to_string()),
                "Q13133" => Ok("Michelle Obama".to_string()),
                "Q1" => Ok("United States of America".to_string()),
                _ => anyhow::bail!("no label"),
            }
        }
    }

    fn candidate(sentence: &str, probability: f64) -> RelationCandidate {
        RelationCandidate {
            subject: "Q76".to_string(),
            predicate: "P26".to_string(),
            object: "Q13133".to_string(),
            sentence: sentence.to_string(),
            source: "x:y:Q1".to_string(),
            probability,
        }
    }

    #[test]
    fn test_article_id() {
        assert_eq!(article_id("x:y:Q1"), "Q1");
        assert_eq!(article_id("x:Q1"), "");
        assert_eq!(article_id("a:b:c:d"), "");
        assert_eq!(article_id(""), "");
        assert_eq!(article_id("::"), "");
    }

    #[tokio::test]
    async fn test_assemble_verified() {
        let labels = LabelResolver::new(Arc::new(FixedLabels));
        let groups = group_relations(vec![candidate("bla bla", 0.7), candidate("again", 0.99)]);
        let record = CorpusRecord::from(candidate("corpus sentence", 0.5));
        let verification = Verification {
            outcome: VerificationOutcome::Verified,
            evidence: vec![record],
        };

        let report = assemble(&groups[0], &verification, &labels).await;

        assert_eq!(report.subject.name, "Barack Obama");
        assert_eq!(report.subject.link, "https://www.wikidata.org/wiki/Q76");
        assert_eq!(report.predicate.name, "spouse");
        assert_eq!(report.object.name, "Michelle Obama");
        assert_eq!(report.sentences, vec!["bla bla", "again"]);
        assert_eq!(report.probability, 0.99);

        assert_eq!(report.evidence.len(), 1);
        let ev = &report.evidence[0];
        assert_eq!(ev.subject, "Barack Obama");
        assert_eq!(ev.snippet, "corpus sentence");
        assert_eq!(ev.link, "https://en.wikipedia.org/wiki/United_States_of_America");
        assert_eq!(ev.source, "x:y:Q1");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "verified");
        assert_eq!(json["evidence"][0]["snippet"], "corpus sentence");
    }

    #[tokio::test]
    async fn test_unlabelled_ids_fall_back() {
        let labels = LabelResolver::new(Arc::new(FixedLabels));
        let mut c = candidate("s", 0.1);
        c.object = "Q999".to_string();
        c.source = "bad".to_string();
        let groups = group_relations(vec![c.clone()]);
        let verification = Verification {
            outcome: VerificationOutcome::Conflicting,
            evidence: vec![CorpusRecord::from(c)],
        };

        let report = assemble(&groups[0], &verification, &labels).await;
        assert_eq!(report.object.name, "unknown");
        assert_eq!(report.evidence[0].link, "https://en.wikipedia.org/wiki/unknown");
    }
}
