use std::{sync::Arc, time::Instant};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::json;
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::{
    classifier::{ClassifierAdapter, Classification, SentimentClassifier},
    comparative::{
        bucket_summaries, detailed_rows, postprocess, BucketSummaryRow, ComparativeReport,
        DetailedRow,
    },
    config::AnalysisConfig,
    error::PipelineError,
    extraction::RelevanceIndex,
    record::{OpinionRecord, SentimentLabel, SourceUnit, UnitKind},
    store::OpinionStore,
    telemetry::SentimentTelemetry,
};

/// Totals across the whole run.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RunCounters {
    /// Source units ingested.
    pub units_processed: usize,
    /// Units ingested as posts.
    pub posts_processed: usize,
    /// Units ingested as comments.
    pub comments_processed: usize,
    /// Records produced, one per relevant (sentence, provider, aspect).
    pub sentences_analyzed: usize,
    /// Records labelled `Error`.
    pub classification_errors: usize,
}

/// Throughput of one batch.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchMetrics {
    /// Batch name, e.g. the subreddit.
    pub name: String,
    /// Wall-clock seconds spent on the batch.
    pub elapsed_secs: f64,
    /// Units in the batch.
    pub units: usize,
    /// Posts among the units.
    pub posts: usize,
    /// Comments among the units.
    pub comments: usize,
    /// Records produced by the batch.
    pub sentences: usize,
    /// Units per second; zero when nothing measurable elapsed.
    pub units_per_sec: f64,
    /// Records per second; zero when nothing measurable elapsed.
    pub sentences_per_sec: f64,
    /// Records labelled `Error` in the batch.
    pub classification_errors: usize,
}

impl BatchMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn measure(name: String, elapsed_secs: f64, delta: RunCounters) -> Self {
        let RunCounters {
            units_processed: units,
            posts_processed: posts,
            comments_processed: comments,
            sentences_analyzed: sentences,
            classification_errors,
        } = delta;
        let rate = |n: usize| {
            if elapsed_secs > 0.0 {
                n as f64 / elapsed_secs
            } else {
                0.0
            }
        };
        Self {
            name,
            elapsed_secs,
            units,
            posts,
            comments,
            sentences,
            units_per_sec: rate(units),
            sentences_per_sec: rate(sentences),
            classification_errors,
        }
    }
}

impl RunCounters {
    const fn since(self, before: Self) -> Self {
        Self {
            units_processed: self.units_processed - before.units_processed,
            posts_processed: self.posts_processed - before.posts_processed,
            comments_processed: self.comments_processed - before.comments_processed,
            sentences_analyzed: self.sentences_analyzed - before.sentences_analyzed,
            classification_errors: self.classification_errors - before.classification_errors,
        }
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique run id.
    pub run_id: Uuid,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Wall-clock seconds from pipeline creation to the report.
    pub elapsed_secs: f64,
    /// Run totals.
    pub counters: RunCounters,
    /// Per-batch throughput in ingestion order.
    pub batches: Vec<BatchMetrics>,
    /// Label counts for every non-empty bucket.
    pub bucket_summary: Vec<BucketSummaryRow>,
    /// Flattened records with preview-length sentences.
    pub details: Vec<DetailedRow>,
    /// Rankings, insights and tables.
    pub report: ComparativeReport,
}

/// Drives source units through extraction and classification into one store.
#[derive(Debug)]
pub struct SentimentPipeline {
    config: AnalysisConfig,
    index: RelevanceIndex,
    classifier: ClassifierAdapter,
    store: OpinionStore,
    counters: RunCounters,
    batches: Vec<BatchMetrics>,
    telemetry: Option<SentimentTelemetry>,
    started: Instant,
}

impl SentimentPipeline {
    /// Validates `config`, compiles its matchers and opens an empty store.
    pub fn new(
        config: AnalysisConfig,
        classifier: Arc<dyn SentimentClassifier>,
        telemetry: Option<SentimentTelemetry>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let index = RelevanceIndex::from_config(&config)?;
        let classifier = ClassifierAdapter::new(classifier, config.classifier.max_chars);
        let store = OpinionStore::for_config(&config);
        let pipeline = Self {
            config,
            index,
            classifier,
            store,
            counters: RunCounters::default(),
            batches: Vec::new(),
            telemetry,
            started: Instant::now(),
        };
        pipeline.log(
            LogLevel::Info,
            "sentiment.run.start",
            json!({
                "providers": pipeline.config.providers.len(),
                "aspects": pipeline.config.aspects.len(),
                "pairs": pipeline.index.pair_count(),
            }),
        );
        Ok(pipeline)
    }

    /// Extracts, classifies and stores every relevant sentence of `unit`.
    ///
    /// Returns the number of records appended. A sentence relevant to several
    /// pairs is classified once and stored under each pair.
    pub fn ingest_unit(&mut self, unit: &SourceUnit) -> usize {
        self.counters.units_processed += 1;
        match unit.kind {
            UnitKind::Post => self.counters.posts_processed += 1,
            UnitKind::Comment => self.counters.comments_processed += 1,
        }
        let mut cache: IndexMap<String, Classification> = IndexMap::new();
        let mut records = Vec::new();
        for found in self.index.scan(unit.text()) {
            let classification = *cache
                .entry(found.sentence.clone())
                .or_insert_with(|| self.classifier.classify(&found.sentence));
            records.push(OpinionRecord {
                sentence: found.sentence,
                sentiment: classification.label,
                confidence: classification.confidence,
                source: unit.source.clone(),
                url: unit.url.clone(),
                provider: found.provider.to_string(),
                aspect: found.aspect.to_string(),
            });
        }
        let mut appended = 0;
        for record in records {
            if self.file(record).is_ok() {
                appended += 1;
            }
        }
        self.log(
            LogLevel::Debug,
            "sentiment.unit.ingested",
            json!({ "source": unit.source, "records": appended, "classified": cache.len() }),
        );
        appended
    }

    /// Ingests `units` as one named batch and records its throughput.
    pub fn ingest_batch<'a, I>(&mut self, name: impl Into<String>, units: I) -> BatchMetrics
    where
        I: IntoIterator<Item = &'a SourceUnit>,
    {
        let name = name.into();
        let started = Instant::now();
        let before = self.counters;
        for unit in units {
            self.ingest_unit(unit);
        }
        let metrics = BatchMetrics::measure(
            name,
            started.elapsed().as_secs_f64(),
            self.counters.since(before),
        );
        self.log(
            LogLevel::Info,
            "sentiment.batch.completed",
            json!({
                "batch": metrics.name,
                "units": metrics.units,
                "posts": metrics.posts,
                "comments": metrics.comments,
                "sentences": metrics.sentences,
                "elapsed_secs": metrics.elapsed_secs,
            }),
        );
        self.event(
            "sentiment.batch.completed",
            json!({
                "batch": metrics.name,
                "units": metrics.units,
                "sentences": metrics.sentences,
                "units_per_sec": metrics.units_per_sec,
                "sentences_per_sec": metrics.sentences_per_sec,
                "classification_errors": metrics.classification_errors,
            }),
        );
        self.batches.push(metrics.clone());
        metrics
    }

    /// Files a record classified elsewhere, e.g. read back from a queue.
    ///
    /// Confidence is clamped to `[0, 1]`, and forced to zero on `Error` records.
    pub fn ingest_classified(&mut self, mut record: OpinionRecord) -> Result<(), PipelineError> {
        record.confidence = if record.sentiment == SentimentLabel::Error {
            0.0
        } else {
            Classification::new(record.sentiment, record.confidence).confidence
        };
        self.file(record)
    }

    /// Run totals so far.
    #[must_use]
    pub const fn counters(&self) -> RunCounters {
        self.counters
    }

    /// Metrics of completed batches.
    #[must_use]
    pub fn batch_metrics(&self) -> &[BatchMetrics] {
        &self.batches
    }

    /// Records gathered so far.
    #[must_use]
    pub const fn store(&self) -> &OpinionStore {
        &self.store
    }

    /// Configuration the pipeline runs with.
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs comparative post-processing and closes the run.
    #[must_use]
    pub fn finish(self) -> RunReport {
        let report = postprocess(&self.store, &self.config);
        let run = RunReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
            counters: self.counters,
            batches: self.batches.clone(),
            bucket_summary: bucket_summaries(&self.store),
            details: detailed_rows(&self.store, self.config.export.sentence_preview_chars),
            report,
        };
        let leader = run
            .report
            .overall_rankings
            .first()
            .map(|overall| overall.provider.clone());
        self.log(
            LogLevel::Info,
            "sentiment.run.completed",
            json!({
                "run_id": run.run_id,
                "records": self.store.len(),
                "insights": run.report.insights.len(),
                "elapsed_secs": run.elapsed_secs,
            }),
        );
        self.event(
            "sentiment.run.completed",
            json!({
                "run_id": run.run_id,
                "units_processed": run.counters.units_processed,
                "posts_processed": run.counters.posts_processed,
                "comments_processed": run.counters.comments_processed,
                "sentences_analyzed": run.counters.sentences_analyzed,
                "classification_errors": run.counters.classification_errors,
                "leader": leader,
            }),
        );
        run
    }

    fn file(&mut self, record: OpinionRecord) -> Result<(), PipelineError> {
        let failed = record.sentiment == SentimentLabel::Error;
        if let Err(err) = self.store.push(record) {
            self.log(
                LogLevel::Warn,
                "sentiment.record.rejected",
                json!({ "reason": err.to_string() }),
            );
            return Err(err);
        }
        self.counters.sentences_analyzed += 1;
        if failed {
            self.counters.classification_errors += 1;
        }
        Ok(())
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }

    fn event(&self, event_type: &str, payload: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.event(event_type, payload);
        }
    }
}
