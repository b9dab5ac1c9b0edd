use crate::data::{Duration, Instance, Job, Machine, Operation};
use ndarray::Array2;
use std::error::Error;

// Instance format: a header "n_jobs n_machines", then for every job a row
// of machine ids followed by a row of processing times (one entry per
// operation), then the n_machines x n_machines transport matrix. Tokens are
// whitespace-separated; line breaks carry no meaning.
pub fn parse_instance(contents: &str) -> Result<Instance, Box<dyn Error>> {
  let mut tokens = contents.split_whitespace();

  let n_jobs: usize = tokens.next().ok_or("n_jobs missing")?.parse()?;
  let n_machines: usize = tokens.next().ok_or("n_machines missing")?.parse()?;
  if n_machines == 0 {
    Err("Machine count must be positive")?;
  }

  let mut jobs = Vec::with_capacity(n_jobs);
  for j in 0..n_jobs {
    let mut machines: Vec<Machine> = Vec::with_capacity(n_machines);
    for o in 0..n_machines {
      let machine = tokens
        .next()
        .ok_or_else(|| format!("Machine missing for operation {} of job {}", o, j))?
        .parse()?;
      if machine >= n_machines {
        Err(format!(
          "Machine {} out of range for operation {} of job {}",
          machine, o, j
        ))?;
      }
      machines.push(machine);
    }

    let mut operations = Vec::with_capacity(n_machines);
    for o in 0..n_machines {
      let duration: Duration = tokens
        .next()
        .ok_or_else(|| format!("Duration missing for operation {} of job {}", o, j))?
        .parse()?;
      if duration == 0 {
        Err(format!(
          "Duration must be positive for operation {} of job {}",
          o, j
        ))?;
      }
      operations.push(Operation {
        job: j,
        index: o,
        machine: machines[o],
        duration: duration,
      });
    }

    jobs.push(Job {
      id: j,
      operations: operations,
    });
  }

  let mut transport_times = Array2::<Duration>::from_elem((n_machines, n_machines), 0);
  for from in 0..n_machines {
    for to in 0..n_machines {
      let time = tokens
        .next()
        .ok_or_else(|| format!("Transport time missing for {} -> {}", from, to))?
        .parse()?;
      transport_times[[from, to]] = time;
    }
  }

  Ok(Instance::new(jobs, n_machines, transport_times))
}
