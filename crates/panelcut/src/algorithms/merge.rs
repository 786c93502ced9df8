use std::collections::VecDeque;
use std::convert::Infallible;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{deadline::Deadline, error::Result, types::Rectangle};

/// One union performed by the merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MergeStep {
    /// The rectangle taken off the front of the work list
    pub kept: Rectangle,
    /// The close rectangle it absorbed
    pub absorbed: Rectangle,
    /// Their bounding union, pushed back onto the front of the work list
    pub union: Rectangle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub regions: Vec<Rectangle>,
    pub trace: Vec<MergeStep>,
}

/// Collapses fragmented empty-space detections into one rectangle per gutter.
#[derive(Debug, Clone)]
pub struct SpatialMerger {
    /// Largest signed edge gap, in pixels, still considered close
    pub threshold: i64,
}

impl SpatialMerger {
    pub fn new(threshold: i64) -> Self {
        Self { threshold }
    }

    /// Close means a small gap on both axes. A gap on one axis alone is not
    /// enough, otherwise two strips sharing a column would chain together.
    pub fn is_close(&self, a: &Rectangle, b: &Rectangle) -> bool {
        a.horizontal_gap(b) < self.threshold && a.vertical_gap(b) < self.threshold
    }

    pub fn merge(&self, candidates: Vec<Rectangle>) -> MergeOutcome {
        let Ok(outcome) = self.run(candidates, || Ok::<(), Infallible>(()));
        outcome
    }

    /// Like [`merge`](Self::merge), giving up once `deadline` passes.
    pub fn merge_within(&self, candidates: Vec<Rectangle>, deadline: &Deadline) -> Result<MergeOutcome> {
        self.run(candidates, || deadline.check())
    }

    /// Merge to a fixed point.
    ///
    /// The front of the work list is compared with the rest of the list, then
    /// with the rectangles already settled. A close partner is removed and the
    /// union goes back on the front, so it gets compared against everything
    /// again. A rectangle with no partner is settled. Each merge shrinks the
    /// total count by one, so the loop ends, and when it does no two settled
    /// rectangles are close.
    fn run<E>(
        &self,
        candidates: Vec<Rectangle>,
        mut checkpoint: impl FnMut() -> std::result::Result<(), E>,
    ) -> std::result::Result<MergeOutcome, E> {
        let mut pending: VecDeque<Rectangle> = candidates.into_iter().filter(|r| !r.is_empty()).collect();
        let mut settled: Vec<Rectangle> = Vec::with_capacity(pending.len());
        let mut steps = Vec::new();

        while let Some(current) = pending.pop_front() {
            checkpoint()?;

            let partner = match pending.iter().position(|other| self.is_close(&current, other)) {
                Some(index) => pending.remove(index),
                None => settled
                    .iter()
                    .position(|other| self.is_close(&current, other))
                    .map(|index| settled.remove(index)),
            };

            match partner {
                Some(absorbed) => {
                    let union = current.union(&absorbed);
                    trace!(?current, ?absorbed, ?union, "gutter fragments merged");
                    steps.push(MergeStep { kept: current, absorbed, union });
                    pending.push_front(union);
                }
                None => settled.push(current),
            }
        }

        debug!(gutters = settled.len(), merges = steps.len(), "empty space merged");
        Ok(MergeOutcome {
            regions: settled,
            trace: steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_fixed_point(merger: &SpatialMerger, regions: &[Rectangle]) {
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                assert!(!merger.is_close(a, b), "{a:?} and {b:?} are still close");
            }
        }
    }

    /// Deterministic scatter of small rectangles over a 1000x1000 page.
    fn scattered(count: usize, seed: u64) -> Vec<Rectangle> {
        let mut state = seed;
        let mut next = move |bound: u32| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % bound as u64) as u32
        };
        (0..count)
            .map(|_| {
                let (x, y) = (next(950), next(950));
                Rectangle::new(x, y, x + 1 + next(50), y + 1 + next(50))
            })
            .collect()
    }

    #[test]
    fn test_adjacent_fragments_merge() {
        let merger = SpatialMerger::new(10);
        let outcome = merger.merge(vec![Rectangle::new(0, 0, 100, 40), Rectangle::new(105, 0, 200, 40)]);

        assert_eq!(outcome.regions, vec![Rectangle::new(0, 0, 200, 40)]);
        assert_eq!(outcome.trace.len(), 1);
    }

    #[test]
    fn test_alignment_on_one_axis_is_not_enough() {
        let merger = SpatialMerger::new(10);
        let top = Rectangle::new(0, 0, 100, 50);
        let bottom = Rectangle::new(0, 500, 100, 550);

        assert!(!merger.is_close(&top, &bottom));
        assert_eq!(merger.merge(vec![top, bottom]).regions, vec![top, bottom]);
    }

    #[test]
    fn test_chain_collapses_transitively() {
        let merger = SpatialMerger::new(10);
        let a = Rectangle::new(0, 0, 50, 20);
        let b = Rectangle::new(55, 0, 100, 20);
        let c = Rectangle::new(105, 0, 150, 20);
        assert!(!merger.is_close(&a, &c));

        let outcome = merger.merge(vec![a, c, b]);
        assert_eq!(outcome.regions, vec![Rectangle::new(0, 0, 150, 20)]);
        assert_eq!(outcome.trace.len(), 2);
    }

    #[test]
    fn test_union_can_absorb_settled_candidate() {
        let merger = SpatialMerger::new(5);
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(13, 40, 100, 50);
        let c = Rectangle::new(50, 0, 60, 45);
        assert!(!merger.is_close(&a, &b));
        assert!(!merger.is_close(&a, &c));

        let outcome = merger.merge(vec![a, b, c]);
        assert_eq!(outcome.regions, vec![Rectangle::new(0, 0, 100, 50)]);
        assert_eq!(
            outcome.trace,
            vec![
                MergeStep { kept: b, absorbed: c, union: Rectangle::new(13, 0, 100, 50) },
                MergeStep {
                    kept: Rectangle::new(13, 0, 100, 50),
                    absorbed: a,
                    union: Rectangle::new(0, 0, 100, 50),
                },
            ]
        );
    }

    #[test]
    fn test_trace_replays_to_result() {
        let merger = SpatialMerger::new(20);
        let input = scattered(60, 7);
        let outcome = merger.merge(input.clone());

        let mut replay = input;
        for step in &outcome.trace {
            for gone in [step.kept, step.absorbed] {
                let index = replay.iter().position(|r| *r == gone).expect("step input present");
                replay.remove(index);
            }
            replay.push(step.union);
        }
        replay.sort_by_key(|r| (r.top, r.left, r.bottom, r.right));
        let mut regions = outcome.regions.clone();
        regions.sort_by_key(|r| (r.top, r.left, r.bottom, r.right));
        assert_eq!(replay, regions);
    }

    #[test]
    fn test_merging_is_idempotent() {
        let merger = SpatialMerger::new(25);
        for seed in 1..20 {
            let once = merger.merge(scattered(40, seed));
            assert_fixed_point(&merger, &once.regions);

            let twice = merger.merge(once.regions.clone());
            assert_eq!(twice.regions, once.regions);
            assert!(twice.trace.is_empty());
        }
    }

    #[test]
    fn test_empty_fragments_are_dropped() {
        let merger = SpatialMerger::new(10);
        let outcome = merger.merge(vec![Rectangle::new(5, 5, 5, 40), Rectangle::new(0, 0, 10, 10)]);
        assert_eq!(outcome.regions, vec![Rectangle::new(0, 0, 10, 10)]);
    }

    #[test]
    fn test_expired_deadline_aborts() {
        let merger = SpatialMerger::new(10);
        let deadline = Deadline::after(std::time::Duration::ZERO);
        assert!(merger.merge_within(vec![Rectangle::new(0, 0, 10, 10)], &deadline).is_err());
    }
}
