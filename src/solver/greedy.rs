use crate::data::{Instance, Solution, Time};
use crate::solver::calculate_makespan;
use ndarray::Array1;
use std::cmp;

// List scheduling: always append the pending operation with the smallest
// earliest start, breaking ties by shorter processing time, then job id.
// Deterministic for a fixed instance and needs no seed.
pub fn find_solution(inst: &Instance) -> Solution {
  let total_ops = inst.n_ops();
  if total_ops == 0 {
    return Solution::empty();
  }

  let mut next_op = vec![0; inst.n_jobs()];
  let mut machine_available = Array1::<Time>::from_elem(inst.n_machines, 0);
  let mut job_finish_time = Array1::<Time>::from_elem(inst.n_jobs(), 0);

  let mut order = Vec::with_capacity(total_ops);
  while order.len() < total_ops {
    let chosen = inst
      .jobs
      .iter()
      .filter(|job| next_op[job.id] < job.operations.len())
      .map(|job| {
        let op_index = next_op[job.id];
        let op = &job.operations[op_index];
        let transport = inst.transport_time(job.id, op_index);
        let start = cmp::max(
          machine_available[op.machine],
          job_finish_time[job.id] + transport,
        );

        (start, op.duration, job.id, op_index, op.machine)
      })
      .min_by_key(|&(start, duration, job_id, _, _)| (start, duration, job_id))
      .expect("No schedulable operation left");

    let (start, duration, job_id, op_index, machine) = chosen;
    let finish = start + duration;

    order.push([job_id, op_index]);
    machine_available[machine] = finish;
    job_finish_time[job_id] = finish;
    next_op[job_id] += 1;
  }

  let mut solution = Solution::with_order(order);
  calculate_makespan(inst, &mut solution);

  return solution;
}
