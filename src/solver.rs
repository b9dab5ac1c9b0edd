pub mod exact;
pub mod genetic;
pub mod greedy;

use crate::data::{Instance, Solution, Time};
use itertools::Itertools;
use ndarray::Array1;
use std::cmp;
use std::error::Error;

// Replays an operation order and fills in the earliest feasible start times.
// Assumes the order is precedence-consistent; the result is meaningless
// otherwise and callers must guarantee the invariant.
pub fn calculate_makespan(inst: &Instance, solution: &mut Solution) -> Time {
  let n_ops = solution.order.len();
  let mut start_times = Array1::<Time>::from_elem(n_ops, 0);
  let mut machine_available = Array1::<Time>::from_elem(inst.n_machines, 0);
  let mut job_last_finish = Array1::<Time>::from_elem(inst.n_jobs(), 0);

  let mut makespan = 0;
  for (i, &[job, op_index]) in solution.order.iter().enumerate() {
    let op = inst.op([job, op_index]);
    let transport = inst.transport_time(job, op_index);

    let start = cmp::max(machine_available[op.machine], job_last_finish[job] + transport);
    let finish = start + op.duration;

    start_times[i] = start;
    machine_available[op.machine] = finish;
    job_last_finish[job] = finish;
    makespan = cmp::max(makespan, finish);
  }

  solution.start_times = start_times;
  solution.makespan = makespan;

  return makespan;
}

pub fn verify_solution(inst: &Instance, solution: &Solution) -> Result<(), Box<dyn Error>> {
  // Check:
  // 1. Every operation scheduled exactly once
  // 2. For every job: order and precedence (incl. transport)
  // 3. For every machine: no overlap

  if solution.order.len() != inst.n_ops() {
    Err(format!(
      "Expected {} operations in order, found {}",
      inst.n_ops(),
      solution.order.len()
    ))?;
  }
  if solution.start_times.len() != solution.order.len() {
    Err(format!(
      "Expected {} start times, found {}",
      solution.order.len(),
      solution.start_times.len()
    ))?;
  }

  let mut next_op = vec![0; inst.n_jobs()];
  let mut job_last_finish = vec![0; inst.n_jobs()];
  let mut machine_intervals = vec![Vec::new(); inst.n_machines];

  for (i, &[job, op_index]) in solution.order.iter().enumerate() {
    if job >= inst.n_jobs() || op_index >= inst.jobs[job].operations.len() {
      Err(format!("Unknown operation {:?}", [job, op_index]))?;
    }
    if op_index != next_op[job] {
      Err(format!(
        "Order violation in job {} - expected operation {}, found {}",
        job, next_op[job], op_index
      ))?;
    }
    next_op[job] += 1;

    let op = inst.op([job, op_index]);
    let start = solution.start_times[i];
    let end = start + op.duration;

    let earliest = job_last_finish[job] + inst.transport_time(job, op_index);
    if start < earliest {
      Err(format!(
        "Precedence violation in job {} - {:?}:[{}, {}] starts before {}",
        job,
        [job, op_index],
        start,
        end,
        earliest
      ))?;
    }
    job_last_finish[job] = end;

    machine_intervals[op.machine].push((start, end, [job, op_index]));
  }

  for (machine, intervals) in machine_intervals.iter().enumerate() {
    for (a, b) in intervals
      .iter()
      .sorted_by_key(|&&(start, end, op)| (start, end, op))
      .tuple_windows()
    {
      if a.1 > b.0 {
        Err(format!(
          "Overlap in machine {} - {:?}:[{}, {}] overlaps with {:?}:[{}, {}]",
          machine, a.2, a.0, a.1, b.2, b.0, b.1
        ))?;
      }
    }
  }

  Ok(())
}

pub fn print_solution(inst: &Instance, solution: &Solution) {
  for (i, &[job, op_index]) in solution.order.iter().enumerate() {
    let op = inst.op([job, op_index]);
    println!(
      "{} {} {} {}",
      job, op_index, op.machine, solution.start_times[i]
    );
  }
}
