use ndarray::{Array1, Array2};

pub type Machine = usize;
pub type Duration = u32;
pub type Time = u32;

pub type Op = [usize; 2];

#[derive(Debug, Clone)]
pub struct Operation {
  pub job: usize,
  pub index: usize,
  pub machine: Machine,
  pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct Job {
  pub id: usize,
  pub operations: Vec<Operation>,
}

#[derive(Debug, Clone)]
pub struct Instance {
  pub n_machines: usize,
  pub jobs: Vec<Job>,
  pub transport_times: Array2<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
  pub order: Vec<Op>,
  pub start_times: Array1<Time>,
  pub makespan: Time,
}

impl Job {
  pub fn new(id: usize, ops: &[(Machine, Duration)]) -> Self {
    let operations = ops
      .iter()
      .enumerate()
      .map(|(index, &(machine, duration))| Operation {
        job: id,
        index: index,
        machine: machine,
        duration: duration,
      })
      .collect();

    return Job {
      id: id,
      operations: operations,
    };
  }
}

impl Instance {
  pub fn new(jobs: Vec<Job>, n_machines: usize, transport_times: Array2<Duration>) -> Self {
    return Instance {
      n_machines: n_machines,
      jobs: jobs,
      transport_times: transport_times,
    };
  }

  pub fn with_zero_transport(jobs: Vec<Job>, n_machines: usize) -> Self {
    let transport_times = Array2::from_elem((n_machines, n_machines), 0);
    return Instance::new(jobs, n_machines, transport_times);
  }

  pub fn n_jobs(&self) -> usize {
    return self.jobs.len();
  }

  pub fn n_ops(&self) -> usize {
    return self.jobs.iter().map(|job| job.operations.len()).sum();
  }

  pub fn ops(&self) -> Vec<Op> {
    let mut nodes = Vec::new();

    for job in &self.jobs {
      for o in 0..job.operations.len() {
        nodes.push([job.id, o]);
      }
    }

    return nodes;
  }

  pub fn op(&self, op: Op) -> &Operation {
    let [j, o] = op;
    return &self.jobs[j].operations[o];
  }

  // Transport delay incurred before operation o of job j; zero for a job's
  // first operation and for consecutive operations on the same machine
  // (diagonal of the matrix).
  pub fn transport_time(&self, job: usize, op_index: usize) -> Duration {
    if op_index == 0 {
      return 0;
    }

    let operations = &self.jobs[job].operations;
    let from = operations[op_index - 1].machine;
    let to = operations[op_index].machine;
    return self.transport_times[[from, to]];
  }
}

impl Solution {
  pub fn empty() -> Self {
    return Solution::with_order(Vec::new());
  }

  pub fn with_order(order: Vec<Op>) -> Self {
    let n = order.len();
    return Solution {
      order: order,
      start_times: Array1::from_elem(n, 0),
      makespan: 0,
    };
  }

  pub fn is_empty(&self) -> bool {
    return self.order.is_empty();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn two_machine_instance() -> Instance {
    let jobs = vec![Job::new(0, &[(0, 3), (1, 4)])];
    let mut transport_times = Array2::from_elem((2, 2), 0);
    transport_times[[0, 1]] = 5;
    transport_times[[1, 0]] = 5;
    return Instance::new(jobs, 2, transport_times);
  }

  #[test]
  fn transport_time_is_zero_for_first_operation() {
    let inst = two_machine_instance();
    assert_eq!(inst.transport_time(0, 0), 0);
  }

  #[test]
  fn transport_time_uses_matrix_for_machine_change() {
    let inst = two_machine_instance();
    assert_eq!(inst.transport_time(0, 1), 5);
  }

  #[test]
  fn ops_enumerates_every_operation() {
    let jobs = vec![Job::new(0, &[(0, 1), (1, 1)]), Job::new(1, &[(1, 2)])];
    let inst = Instance::with_zero_transport(jobs, 2);
    assert_eq!(inst.n_ops(), 3);
    assert_eq!(inst.ops(), vec![[0, 0], [0, 1], [1, 0]]);
  }
}
