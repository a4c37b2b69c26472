//! Scan orchestration: enumerate, simulate and filter partitions on a fixed
//! worker pool, then merge and rank.

use super::enumerator::{Partition, Universe};
use super::filter::{OpportunityFilter, rank};
use super::format::{OpportunityRecord, ScanReport};
use super::simulator::simulate;
use crate::config::EngineConfig;
use crate::errors::Result;
use crate::models::{Candidate, Opportunity, PriceTable};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Candidates evaluated between two deadline checks.
const DEADLINE_CHECK_EVERY: usize = 256;

/// Ranked opportunities plus scan diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub opportunities: Vec<Opportunity>,
    pub truncated: bool,
    pub skipped: usize,
    pub evaluated: usize,
}

impl ScanOutcome {
    pub fn to_report(&self) -> ScanReport {
        ScanReport {
            opportunities: self.opportunities.iter().map(OpportunityRecord::from).collect(),
            truncated: self.truncated,
            skipped_count: self.skipped,
            candidates_evaluated: self.evaluated,
        }
    }
}

/// Stateless detector; configuration is the only thing kept between scans.
pub struct ArbitrageEngine {
    config: EngineConfig,
    filter: OpportunityFilter,
    pool: rayon::ThreadPool,
}

impl ArbitrageEngine {
    /// Validate `config` and spin up the worker pool.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers.unwrap_or(0))
            .thread_name(|i| format!("scan-worker-{i}"))
            .build()?;
        let filter = OpportunityFilter::new(config.min_profit_pct, config.profit_basis);
        info!(
            venues = ?config.venues,
            fee_rate = config.fee_rate,
            min_profit_pct = config.min_profit_pct,
            workers = pool.current_num_threads(),
            "[INIT] arbitrage engine ready"
        );
        Ok(Self {
            config,
            filter,
            pool,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scan `table` and return the serializable report.
    pub fn scan(&self, table: &PriceTable) -> ScanReport {
        self.detect(table).to_report()
    }

    /// Scan `table` and return the ranked opportunities.
    pub fn detect(&self, table: &PriceTable) -> ScanOutcome {
        let started = Instant::now();
        // an unrepresentable deadline is no deadline
        let deadline = self
            .config
            .limits
            .max_scan_duration
            .and_then(|d| started.checked_add(d));
        let universe = Universe::new(table, &self.config.venues, &self.config.limits);

        let mut slots: Vec<Slot> = universe
            .partitions()
            .into_iter()
            .map(|partition| Slot {
                partition,
                offset: 0,
                done: false,
            })
            .collect();
        let mut budget = self.config.limits.max_candidates;
        let mut outcome = ScanOutcome::default();
        let mut timed_out = false;
        let mut rounds = 0;

        loop {
            let pending: Vec<usize> = (0..slots.len()).filter(|&i| !slots[i].done).collect();
            if pending.is_empty() || timed_out || budget == Some(0) {
                break;
            }
            let shares: Vec<Option<usize>> = match budget {
                Some(total) => split_evenly(total, pending.len()).into_iter().map(Some).collect(),
                None => vec![None; pending.len()],
            };
            rounds += 1;

            let work: Vec<(Slot, Option<usize>)> = pending
                .iter()
                .zip(shares)
                .map(|(&i, share)| (slots[i], share))
                .collect();
            let outputs: Vec<WorkerOutput> = self.pool.install(|| {
                work.par_iter()
                    .map(|(slot, share)| self.run_partition(&universe, slot, *share, deadline))
                    .collect()
            });

            // barrier: every worker of this round has finished
            for (&i, out) in pending.iter().zip(outputs) {
                let slot = &mut slots[i];
                slot.offset += out.evaluated;
                slot.done = out.exhausted;
                outcome.evaluated += out.evaluated;
                outcome.skipped += out.skipped;
                outcome.opportunities.extend(out.opportunities);
                timed_out |= out.timed_out;
                if let Some(left) = budget.as_mut() {
                    *left = left.saturating_sub(out.evaluated);
                }
            }
        }

        outcome.truncated = slots.iter().any(|s| !s.done);
        rank(&mut outcome.opportunities);

        let elapsed = started.elapsed();
        debug!(
            assets = universe.assets().len(),
            venues = universe.venues().len(),
            partitions = slots.len(),
            rounds,
            evaluated = outcome.evaluated,
            skipped = outcome.skipped,
            found = outcome.opportunities.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "[SCAN] complete"
        );
        if outcome.truncated {
            warn!(
                evaluated = outcome.evaluated,
                timed_out,
                budget_ms = self
                    .config
                    .limits
                    .max_scan_duration
                    .map(|d| d.as_millis() as u64),
                max_candidates = self.config.limits.max_candidates,
                "[SCAN] budget exhausted, returning partial results"
            );
        }
        outcome
    }

    fn run_partition(
        &self,
        universe: &Universe<'_>,
        slot: &Slot,
        share: Option<usize>,
        deadline: Option<Instant>,
    ) -> WorkerOutput {
        match slot.partition {
            Partition::Direct(asset) => {
                self.evaluate(universe.direct_for(asset), slot.offset, share, deadline)
            }
            Partition::Triangular(first) => {
                self.evaluate(universe.triangular_from(first), slot.offset, share, deadline)
            }
        }
    }

    /// Evaluate up to `share` candidates of one partition, starting after the
    /// first `offset`, into a private buffer.
    fn evaluate<'a, I>(
        &self,
        candidates: I,
        offset: usize,
        share: Option<usize>,
        deadline: Option<Instant>,
    ) -> WorkerOutput
    where
        I: Iterator<Item = Candidate<'a>>,
    {
        let mut iter = candidates.skip(offset).peekable();
        let mut out = WorkerOutput::default();
        loop {
            if share.is_some_and(|s| out.evaluated >= s) {
                out.exhausted = iter.peek().is_none();
                break;
            }
            if let Some(deadline) = deadline {
                if out.evaluated % DEADLINE_CHECK_EVERY == 0 && Instant::now() >= deadline {
                    out.timed_out = true;
                    out.exhausted = iter.peek().is_none();
                    break;
                }
            }
            let Some(candidate) = iter.next() else {
                out.exhausted = true;
                break;
            };
            out.evaluated += 1;
            match simulate(&candidate, self.config.fee_rate) {
                Some(trade) => {
                    if let Some(opp) = self.filter.accept(&candidate, &trade) {
                        out.opportunities.push(opp);
                    }
                }
                None => out.skipped += 1,
            }
        }
        out
    }
}

/// Progress of one partition across budget rounds.
#[derive(Debug, Clone, Copy)]
struct Slot {
    partition: Partition,
    /// Candidates already evaluated; the next round resumes after them.
    offset: usize,
    done: bool,
}

#[derive(Debug, Default)]
struct WorkerOutput {
    opportunities: Vec<Opportunity>,
    evaluated: usize,
    skipped: usize,
    exhausted: bool,
    timed_out: bool,
}

/// `total` split into `parts` shares differing by at most one, larger first.
fn split_evenly(total: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return Vec::new();
    }
    let (base, extra) = (total / parts, total % parts);
    (0..parts).map(|i| base + usize::from(i < extra)).collect()
}
