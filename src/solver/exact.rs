use crate::data::{Duration, Instance, Op, Solution, Time};
use log::{debug, trace};
use ndarray::Array1;
use std::cmp;
use std::collections::{BinaryHeap, HashMap};

// A* over partial schedules. Optimal, but worst-case exponential in the
// operation count; callers gate the instance size.

// Composite integer key over the three state vectors. Equal states compare
// equal and the fixed layout makes the encoding collision-free.
type StateKey = Vec<u32>;

#[derive(Debug, Clone)]
struct State {
  next_op: Vec<usize>,
  machine_available: Vec<Time>,
  job_last_finish: Vec<Time>,
  // Unscheduled processing time per job, kept alongside to make the lower
  // bound O(jobs + machines) instead of a rescan of the instance.
  remaining: Vec<Duration>,
}

// Arena node; parent handles replace owned back-pointer chains.
struct Node {
  g: Time,
  parent: Option<usize>,
  scheduled: Op,
  start_time: Time,
  state: State,
  key: StateKey,
}

#[derive(Debug, PartialEq, Eq)]
struct HeapItem {
  f: Time,
  g: Time,
  node: usize,
}

impl Ord for HeapItem {
  fn cmp(&self, other: &Self) -> cmp::Ordering {
    // BinaryHeap is a max-heap; order so that the smallest f is popped
    // first. Ties prefer larger g (deeper states), then the older node.
    return other
      .f
      .cmp(&self.f)
      .then(self.g.cmp(&other.g))
      .then(other.node.cmp(&self.node));
  }
}

impl PartialOrd for HeapItem {
  fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
    return Some(self.cmp(other));
  }
}

impl State {
  fn initial(inst: &Instance) -> Self {
    let remaining = inst
      .jobs
      .iter()
      .map(|job| job.operations.iter().map(|op| op.duration).sum())
      .collect();

    return State {
      next_op: vec![0; inst.n_jobs()],
      machine_available: vec![0; inst.n_machines],
      job_last_finish: vec![0; inst.n_jobs()],
      remaining: remaining,
    };
  }

  fn key(&self) -> StateKey {
    let mut key = Vec::with_capacity(self.next_op.len() * 2 + self.machine_available.len());
    key.extend(self.next_op.iter().map(|&o| o as u32));
    key.extend(&self.machine_available);
    key.extend(&self.job_last_finish);
    return key;
  }

  fn is_goal(&self, inst: &Instance) -> bool {
    return self
      .next_op
      .iter()
      .zip(&inst.jobs)
      .all(|(&next, job)| next == job.operations.len());
  }
}

// Admissible bound on the total makespan: no machine finishes before its
// current availability, no job before its last finish plus its unscheduled
// processing time. Transport is deliberately left out - adding it without a
// minimum-over-destinations discount could overestimate.
fn lower_bound(state: &State) -> Time {
  let machine_bound = state.machine_available.iter().max().copied().unwrap_or(0);
  let job_bound = state
    .job_last_finish
    .iter()
    .zip(&state.remaining)
    .map(|(&finish, &remaining)| finish + remaining)
    .max()
    .unwrap_or(0);

  return cmp::max(machine_bound, job_bound);
}

pub fn find_solution(inst: &Instance) -> Solution {
  if inst.n_ops() == 0 {
    return Solution::empty();
  }

  let mut arena: Vec<Node> = Vec::new();
  // Maps each state key to the arena node holding the best known g.
  let mut visited: HashMap<StateKey, usize> = HashMap::new();
  let mut queue = BinaryHeap::new();

  let root_state = State::initial(inst);
  let root_key = root_state.key();
  let root_f = cmp::max(0, lower_bound(&root_state));
  arena.push(Node {
    g: 0,
    parent: None,
    scheduled: [0, 0],
    start_time: 0,
    state: root_state,
    key: root_key.clone(),
  });
  visited.insert(root_key, 0);
  queue.push(HeapItem {
    f: root_f,
    g: 0,
    node: 0,
  });

  let mut expanded = 0usize;
  while let Some(item) = queue.pop() {
    // Lazy deletion: skip entries superseded by a better path to the state.
    if visited[&arena[item.node].key] != item.node {
      continue;
    }

    if arena[item.node].state.is_goal(inst) {
      debug!(
        "Found optimum {} after {} expansions ({} states)",
        item.g,
        expanded,
        arena.len()
      );
      return reconstruct(&arena, item.node, item.g);
    }

    expanded += 1;
    let current_g = arena[item.node].g;
    for j in 0..inst.n_jobs() {
      let op_index = arena[item.node].state.next_op[j];
      if op_index >= inst.jobs[j].operations.len() {
        continue;
      }

      let op = inst.op([j, op_index]);
      let transport = inst.transport_time(j, op_index);
      let state = &arena[item.node].state;
      let start = cmp::max(
        state.machine_available[op.machine],
        state.job_last_finish[j] + transport,
      );
      let finish = start + op.duration;
      // g never decreases along a path, which is what makes the g-based
      // pruning below sound.
      let new_g = cmp::max(current_g, finish);

      let mut next_state = state.clone();
      next_state.next_op[j] += 1;
      next_state.machine_available[op.machine] = finish;
      next_state.job_last_finish[j] = finish;
      next_state.remaining[j] -= op.duration;

      let key = next_state.key();
      if let Some(&known) = visited.get(&key) {
        if arena[known].g <= new_g {
          continue;
        }
      }

      // h bounds the total makespan, not the remaining cost, so f is the
      // max of the two, never their sum.
      let f = cmp::max(new_g, lower_bound(&next_state));
      let node = arena.len();
      arena.push(Node {
        g: new_g,
        parent: Some(item.node),
        scheduled: [j, op_index],
        start_time: start,
        state: next_state,
        key: key.clone(),
      });
      visited.insert(key, node);
      queue.push(HeapItem {
        f: f,
        g: new_g,
        node: node,
      });
      trace!("Enqueued [{}, {}] with f {} g {}", j, op_index, f, new_g);
    }
  }

  // Exhausted frontier without a goal; callers must treat this as "no
  // solution found", not a zero-makespan schedule.
  debug!("Search space exhausted after {} expansions", expanded);
  return Solution::empty();
}

fn reconstruct(arena: &[Node], goal: usize, makespan: Time) -> Solution {
  let mut order = Vec::new();
  let mut start_times = Vec::new();

  let mut current = goal;
  while let Some(parent) = arena[current].parent {
    order.push(arena[current].scheduled);
    start_times.push(arena[current].start_time);
    current = parent;
  }
  order.reverse();
  start_times.reverse();

  return Solution {
    order: order,
    start_times: Array1::from(start_times),
    makespan: makespan,
  };
}
