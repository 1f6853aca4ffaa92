//! Candidate ranking and randomized greedy selection.

use std::collections::HashSet;

use log::trace;
use rand::Rng;

use crate::coverage::{CoverageBitmap, GainEntry, sort_gain_desc};
use crate::tsp::TspSolver;
use crate::viewpoint::{ArrayInd, ViewpointId, ViewpointManager};

use super::LocalCoveragePlanner;

impl<S: TspSolver> LocalCoveragePlanner<S> {
    /// Build the surface and frontier candidate queues, gain-descending.
    ///
    /// A viewpoint lands in at most one queue; surface wins. Visited
    /// viewpoints, viewpoints outside exploring cells, and already
    /// selected viewpoints are skipped.
    pub(crate) fn enqueue_candidates<M: ViewpointManager>(
        &self,
        manager: &M,
        covered: &CoverageBitmap,
        frontier_covered: &CoverageBitmap,
        selected_array_inds: &[ArrayInd],
    ) -> (Vec<GainEntry>, Vec<GainEntry>) {
        let selected: HashSet<ArrayInd> = selected_array_inds.iter().copied().collect();
        let mut surface_queue = Vec::new();
        let mut frontier_queue = Vec::new();

        for id in manager.candidate_ids() {
            if manager.visited(id.into()) || !manager.in_exploring_cell(id) {
                continue;
            }
            let array_ind = manager.array_ind(id);
            if selected.contains(&array_ind) {
                continue;
            }
            let surface_gain = manager.surface_gain(covered, array_ind.into());
            if surface_gain >= self.config.min_add_point_num {
                surface_queue.push((surface_gain, id));
            } else if self.use_frontier {
                let frontier_gain = manager.frontier_gain(frontier_covered, array_ind.into());
                if frontier_gain >= self.config.min_add_frontier_point_num {
                    frontier_queue.push((frontier_gain, id));
                }
            }
        }

        sort_gain_desc(&mut surface_queue);
        if self.use_frontier {
            sort_gain_desc(&mut frontier_queue);
        }
        trace!(
            "[Coverage] enqueued {} surface / {} frontier candidates",
            surface_queue.len(),
            frontier_queue.len()
        );
        (surface_queue, frontier_queue)
    }

    /// Randomized greedy maximum-coverage pass over one queue.
    ///
    /// Works on copies of the queue and the bitmap; the caller's state is
    /// untouched. Each step draws uniformly from the top of the working
    /// queue, marks the pick's points, then re-ranks the remainder
    /// against the updated bitmap.
    pub(crate) fn select_viewpoints<M: ViewpointManager>(
        &self,
        manager: &M,
        queue: &[GainEntry],
        covered: &CoverageBitmap,
        frontier: bool,
    ) -> Vec<ViewpointId> {
        let min_gain = if frontier {
            self.config.min_add_frontier_point_num
        } else {
            self.config.min_add_point_num
        };
        if queue.is_empty() || queue[0].0 < min_gain {
            return Vec::new();
        }

        let mut covered_copy = covered.clone();
        let mut queue_copy = queue.to_vec();
        let mut selected = Vec::new();
        let mut rng = self.sample_rng();

        let mut queue_idx = rng.random_range(0..self.sample_window(queue, min_gain, queue_copy.len()));
        loop {
            let (_, cur_id) = queue_copy[queue_idx];
            let cur_array = manager.array_ind(cur_id);
            let points = if frontier {
                manager.covered_frontier_points(cur_array.into())
            } else {
                manager.covered_surface_points(cur_array.into())
            };
            covered_copy.mark_all(points);
            selected.push(cur_id);
            queue_copy.remove(queue_idx);

            for entry in queue_copy.iter_mut() {
                let array_ind = manager.array_ind(entry.1);
                entry.0 = if frontier {
                    manager.frontier_gain(&covered_copy, array_ind.into())
                } else {
                    manager.surface_gain(&covered_copy, array_ind.into())
                };
            }
            sort_gain_desc(&mut queue_copy);

            // The surface threshold terminates both modes; frontier mode
            // additionally checks its own threshold.
            if queue_copy.is_empty() || queue_copy[0].0 < self.config.min_add_point_num {
                break;
            }
            if frontier && queue_copy[0].0 < self.config.min_add_frontier_point_num {
                break;
            }

            // The window is recomputed from the ORIGINAL queue so it does
            // not collapse to 1 as the working copy drains.
            queue_idx = rng.random_range(0..self.sample_window(queue, min_gain, queue_copy.len()));
        }
        selected
    }

    /// Frontier-queue companion to the surface selection pass.
    ///
    /// Marks the frontier sets of everything already selected, re-ranks
    /// the queue against the updated bitmap, then runs the greedy pass in
    /// frontier mode. Only runs while the best frontier candidate is
    /// strictly above the threshold.
    pub(crate) fn select_from_frontier_queue<M: ViewpointManager>(
        &self,
        manager: &M,
        frontier_queue: &mut Vec<GainEntry>,
        frontier_covered: &mut CoverageBitmap,
        selected: &mut Vec<ViewpointId>,
    ) {
        if !self.use_frontier
            || frontier_queue.is_empty()
            || frontier_queue[0].0 <= self.config.min_add_frontier_point_num
        {
            return;
        }
        for &id in selected.iter() {
            frontier_covered.mark_all(manager.covered_frontier_points(id.into()));
        }
        for entry in frontier_queue.iter_mut() {
            entry.0 = manager.frontier_gain(frontier_covered, entry.1.into());
        }
        sort_gain_desc(frontier_queue);

        let picked = self.select_viewpoints(manager, frontier_queue, frontier_covered, true);
        selected.extend(picked);
    }

    /// Width of the random sampling window: entries of `queue` at or
    /// above `min_gain`, capped by configuration and by the live working
    /// queue length.
    fn sample_window(&self, queue: &[GainEntry], min_gain: usize, working_len: usize) -> usize {
        let eligible = queue.iter().filter(|entry| entry.0 >= min_gain).count();
        self.config
            .greedy_sample_range
            .min(eligible)
            .min(working_len)
    }
}
