//! Retriever → Evaluator → Reranker → Combiner, once per job.
//!
//! `rank_job` is the core path; `submit_all` and `query_all` drive it over a
//! directory of job configs for the two CLI runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::errors::{PipelineError, SkipReason};
use crate::jobs::loader::{config_name, list_configs, load_job_config, JobLoad};
use crate::jobs::submission::EvaluationClient;
use crate::jobs::writer::{write_response, write_submission, SubmissionRecord};
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobSpec;
use crate::models::results::{EvaluationResult, JobRanking, QueryOutcome, RerankResult};
use crate::rerank::Reranker;
use crate::retrieval::Retriever;
use crate::scoring::combiner::{combine, final_score, CombineWeights};
use crate::scoring::evaluator::evaluate;

pub struct Pipeline {
    retriever: Arc<dyn Retriever>,
    reranker: Arc<dyn Reranker>,
    top_n: usize,
}

/// What a batch submit run did, per config file.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(String, SkipReason)>,
    pub failed: Vec<(String, String)>,
}

impl Pipeline {
    pub fn new(retriever: Arc<dyn Retriever>, reranker: Arc<dyn Reranker>, top_n: usize) -> Self {
        Self {
            retriever,
            reranker,
            top_n,
        }
    }

    pub fn backends(&self) -> (&'static str, &'static str) {
        (self.retriever.backend(), self.reranker.backend())
    }

    /// Shortlists, scores and orders candidates for one job. Never fails: every
    /// external stage has its own deterministic fallback.
    pub async fn rank_job(&self, job: &JobSpec) -> JobRanking {
        let candidates = self.retriever.retrieve(job, self.top_n).await;
        info!(
            "Retrieved {} candidates for '{}' via {}",
            candidates.len(),
            job.title,
            self.retriever.backend()
        );

        let (evaluations, reranks) = tokio::join!(
            async { evaluate_all(&candidates, job) },
            self.reranker.rerank(job, &candidates)
        );
        let reranks: HashMap<String, RerankResult> = reranks
            .into_iter()
            .map(|r| (r.candidate_id.clone(), r))
            .collect();

        combine(&candidates, &evaluations, &reranks)
    }

    /// Scores one profile against one job as a single-candidate run.
    pub async fn score_profile(&self, profile: &CandidateProfile, job: &JobSpec) -> QueryOutcome {
        let evaluation = evaluate(profile, job);
        let rerank_score = self
            .reranker
            .rerank(job, std::slice::from_ref(profile))
            .await
            .first()
            .map(|r| r.score)
            .unwrap_or(0.0);
        let combined = final_score(evaluation.score, rerank_score, &CombineWeights::default());

        QueryOutcome {
            job_title: job.title.clone(),
            evaluation: Some(evaluation),
            rerank_score: Some(rerank_score),
            final_score: Some(combined),
            skipped: false,
            reason: None,
        }
    }

    /// Ranks every config in `config.configs_dir` and writes one submission file
    /// per job. Only an unreadable configs directory aborts the run.
    pub async fn submit_all(
        &self,
        config: &Config,
        submitter: Option<&EvaluationClient>,
    ) -> Result<BatchReport, PipelineError> {
        let paths = list_configs(&config.configs_dir)?;
        info!("Found {} job configs in {}", paths.len(), config.configs_dir.display());

        let mut report = BatchReport::default();
        for path in paths {
            let name = config_name(&path);
            match self.submit_one(&path, &name, config, submitter).await {
                Ok(written) => report.written.push(written),
                Err(Outcome::Skipped(reason)) => report.skipped.push((name, reason)),
                Err(Outcome::Failed(e)) => {
                    error!("Failed to process {name}: {e}");
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        info!(
            "Batch finished: {} written, {} skipped, {} failed",
            report.written.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    async fn submit_one(
        &self,
        path: &Path,
        name: &str,
        config: &Config,
        submitter: Option<&EvaluationClient>,
    ) -> Result<PathBuf, Outcome> {
        let job = match load_job_config(path, config.force_submit_empty)? {
            JobLoad::Ready(job) => job,
            JobLoad::Skipped(reason) => return Err(Outcome::Skipped(reason)),
        };

        let ranking = self.rank_job(&job).await;
        let written = write_submission(&config.output_dir, &SubmissionRecord::new(name, &ranking))?;
        info!("Wrote {} candidates for {name} to {}", ranking.object_ids.len(), written.display());

        if config.eval_remote {
            match submitter {
                Some(client) => match client.submit(name, &ranking.object_ids).await {
                    Ok(reply) => {
                        write_response(&config.output_dir, name, &reply)?;
                    }
                    Err(e) => warn!("Submission of {name} failed: {e}"),
                },
                None => warn!("EVAL_REMOTE is set but AUTH_EMAIL is not, skipping submission of {name}"),
            }
        }
        Ok(written)
    }

    /// Scores each profile against every config in `configs_dir`, in
    /// profile-major order. Unusable configs, unreadable ones included, yield
    /// skipped outcomes; only a missing or unlistable directory is an error.
    pub async fn query_all(
        &self,
        configs_dir: &Path,
        profiles: &[CandidateProfile],
    ) -> Result<Vec<QueryOutcome>, PipelineError> {
        let paths = list_configs(configs_dir)?;

        let jobs: Vec<(String, Result<JobSpec, String>)> = paths
            .iter()
            .map(|path| {
                let name = config_name(path);
                let job = match load_job_config(path, false) {
                    Ok(JobLoad::Ready(job)) => Ok(job),
                    Ok(JobLoad::Skipped(reason)) => Err(reason.label().to_string()),
                    Err(e) => {
                        warn!("Failed to read {name}: {e}");
                        Err(UNREADABLE_CONFIG.to_string())
                    }
                };
                (name, job)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(profiles.len() * jobs.len());
        for profile in profiles {
            for (name, job) in &jobs {
                let outcome = match job {
                    Ok(job) => self.score_profile(profile, job).await,
                    Err(reason) => QueryOutcome::skipped(name.as_str(), reason.as_str()),
                };
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }
}

const UNREADABLE_CONFIG: &str = "unreadable config file";

fn evaluate_all(candidates: &[CandidateProfile], job: &JobSpec) -> HashMap<String, EvaluationResult> {
    candidates
        .iter()
        .map(|candidate| (candidate.id.clone(), evaluate(candidate, job)))
        .collect()
}

enum Outcome {
    Skipped(SkipReason),
    Failed(PipelineError),
}

impl From<PipelineError> for Outcome {
    fn from(e: PipelineError) -> Self {
        Outcome::Failed(e)
    }
}
