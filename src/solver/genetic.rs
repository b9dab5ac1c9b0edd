use crate::data::{Instance, Solution};
use crate::solver::calculate_makespan;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Config {
  pub population_size: usize,
  pub generations: usize,
  pub tournament_size: usize,
  pub mutation_probability: f64,
  pub seed: u64,
}

// Seed 0 means "derive from the clock" and is not reproducible; any other
// value reproduces the run bit for bit.
pub fn resolve_seed(seed: u64) -> u64 {
  if seed != 0 {
    return seed;
  }

  return SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_nanos() as u64)
    .unwrap_or(1);
}

// Chromosome: job ids, one occurrence per operation of the job. The k-th
// occurrence of job j decodes to operation k, so any permutation of the
// genes yields a precedence-consistent order and offspring never need
// repair. Bierwirth, A Generalized Permutation Approach to Job Shop
// Scheduling with Genetic Algorithms.
pub fn decode(inst: &Instance, genes: &[usize]) -> Solution {
  let mut next_op = vec![0; inst.n_jobs()];
  let mut order = Vec::with_capacity(genes.len());

  for &job in genes {
    order.push([job, next_op[job]]);
    next_op[job] += 1;
  }

  return Solution::with_order(order);
}

pub fn encode(solution: &Solution) -> Vec<usize> {
  return solution.order.iter().map(|&[job, _]| job).collect();
}

fn base_genes(inst: &Instance) -> Vec<usize> {
  let mut genes = Vec::with_capacity(inst.n_ops());
  for job in &inst.jobs {
    for _ in 0..job.operations.len() {
      genes.push(job.id);
    }
  }
  return genes;
}

pub fn generate_random_solution<R: Rng>(inst: &Instance, rng: &mut R) -> Solution {
  let mut genes = base_genes(inst);
  genes.shuffle(rng);
  return decode(inst, &genes);
}

pub fn generate_population<R: Rng>(inst: &Instance, size: usize, rng: &mut R) -> Vec<Solution> {
  return (0..size)
    .map(|_| generate_random_solution(inst, rng))
    .collect();
}

// Best of a uniform sample drawn with replacement.
pub fn tournament_selection<R: Rng>(
  inst: &Instance,
  population: &[Solution],
  tournament_size: usize,
  rng: &mut R,
) -> Solution {
  let mut best: Option<Solution> = None;

  for _ in 0..tournament_size {
    let mut contender = population[rng.gen_range(0, population.len())].clone();
    calculate_makespan(inst, &mut contender);

    let improves = match &best {
      Some(current) => contender.makespan < current.makespan,
      None => true,
    };
    if improves {
      best = Some(contender);
    }
  }

  return best.expect("Tournament size must be positive");
}

// Order crossover on the gene sequences: copy [start, end] from parent 1,
// then fill the remaining slots scanning parent 2 circularly from end+1.
// The per-job needed counts keep the child's multiset identical to the
// parents', so the result stays decodable.
pub fn order_crossover<R: Rng>(
  inst: &Instance,
  parent1: &Solution,
  parent2: &Solution,
  rng: &mut R,
) -> Solution {
  let genes1 = encode(parent1);
  let genes2 = encode(parent2);
  let n = genes1.len();
  if n == 0 {
    return Solution::empty();
  }

  let mut start = rng.gen_range(0, n);
  let mut end = rng.gen_range(0, n);
  if start > end {
    std::mem::swap(&mut start, &mut end);
  }

  let mut needed = vec![0usize; inst.n_jobs()];
  for &job in &genes1 {
    needed[job] += 1;
  }

  let mut child = vec![0; n];
  for i in start..=end {
    child[i] = genes1[i];
    needed[genes1[i]] -= 1;
  }

  let mut fill = (end + 1) % n;
  let mut scan = (end + 1) % n;
  while fill != start {
    let job = genes2[scan];
    if needed[job] > 0 {
      child[fill] = job;
      needed[job] -= 1;
      fill = (fill + 1) % n;
    }
    scan = (scan + 1) % n;
  }

  return decode(inst, &child);
}

// Swap two distinct gene positions and re-decode, invalidating any
// previously computed start times.
pub fn mutate_swap<R: Rng>(inst: &Instance, solution: &mut Solution, rng: &mut R) {
  let mut genes = encode(solution);
  if genes.len() < 2 {
    return;
  }

  let i = rng.gen_range(0, genes.len());
  let mut j = rng.gen_range(0, genes.len());
  while j == i {
    j = rng.gen_range(0, genes.len());
  }
  genes.swap(i, j);

  *solution = decode(inst, &genes);
}

// Fully generational loop: each generation is rebuilt from tournament
// parents, OX children and probabilistic swap mutation; the best solution
// ever simulated is tracked across generations.
pub fn find_solution(inst: &Instance, config: &Config) -> Solution {
  if inst.n_ops() == 0 || config.population_size == 0 {
    return Solution::empty();
  }

  let seed = resolve_seed(config.seed);
  debug!("Running with seed {}", seed);
  let mut rng = rand_chacha::ChaChaRng::seed_from_u64(seed);

  let mut population = generate_population(inst, config.population_size, &mut rng);
  let mut best = population[0].clone();
  calculate_makespan(inst, &mut best);
  for member in &population[1..] {
    let mut candidate = member.clone();
    calculate_makespan(inst, &mut candidate);
    if candidate.makespan < best.makespan {
      best = candidate;
    }
  }
  debug!("Initial population best {}", best.makespan);

  for generation in 0..config.generations {
    let mut next_population = Vec::with_capacity(config.population_size);

    while next_population.len() < config.population_size {
      let parent1 = tournament_selection(inst, &population, config.tournament_size, &mut rng);
      let parent2 = tournament_selection(inst, &population, config.tournament_size, &mut rng);

      let mut child = order_crossover(inst, &parent1, &parent2, &mut rng);
      if rng.gen_range(0.0, 1.0) < config.mutation_probability {
        mutate_swap(inst, &mut child, &mut rng);
      }

      calculate_makespan(inst, &mut child);
      if child.makespan < best.makespan {
        best = child.clone();
        debug!(
          "Improved best to {} (generation {})",
          best.makespan, generation
        );
      }

      next_population.push(child);
    }

    population = next_population;
  }

  info!(
    "Finished {} generations at {}",
    config.generations, best.makespan
  );

  return best;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data::Job;
  use crate::solver::{exact, verify_solution};
  use ndarray::Array2;
  use rand_chacha::ChaChaRng;

  fn crossing_instance() -> Instance {
    let jobs = vec![
      Job::new(0, &[(0, 3), (1, 4)]),
      Job::new(1, &[(1, 2), (0, 3)]),
    ];
    let mut transport_times = Array2::from_elem((2, 2), 0);
    transport_times[[0, 1]] = 1;
    transport_times[[1, 0]] = 1;
    return Instance::new(jobs, 2, transport_times);
  }

  fn three_job_instance() -> Instance {
    let jobs = vec![
      Job::new(0, &[(0, 2), (1, 3), (2, 2)]),
      Job::new(1, &[(1, 4), (0, 1)]),
      Job::new(2, &[(2, 3), (1, 2)]),
    ];
    let mut transport_times = Array2::from_elem((3, 3), 0);
    transport_times[[0, 1]] = 1;
    transport_times[[1, 0]] = 1;
    transport_times[[1, 2]] = 2;
    transport_times[[2, 1]] = 2;
    transport_times[[0, 2]] = 2;
    transport_times[[2, 0]] = 2;
    return Instance::new(jobs, 3, transport_times);
  }

  fn config(seed: u64) -> Config {
    return Config {
      population_size: 10,
      generations: 5,
      tournament_size: 3,
      mutation_probability: 0.2,
      seed: seed,
    };
  }

  fn assert_precedence_consistent(solution: &Solution, inst: &Instance) {
    let mut next_op = vec![0; inst.n_jobs()];
    for &[job, op_index] in &solution.order {
      assert_eq!(op_index, next_op[job]);
      next_op[job] += 1;
    }
  }

  fn job_counts(genes: &[usize], n_jobs: usize) -> Vec<usize> {
    let mut counts = vec![0; n_jobs];
    for &job in genes {
      counts[job] += 1;
    }
    return counts;
  }

  #[test]
  fn decode_is_precedence_consistent_for_any_shuffle() {
    let inst = three_job_instance();
    let mut rng = ChaChaRng::seed_from_u64(7);

    for _ in 0..50 {
      let solution = generate_random_solution(&inst, &mut rng);
      assert_eq!(solution.order.len(), inst.n_ops());
      assert_precedence_consistent(&solution, &inst);
    }
  }

  #[test]
  fn encode_inverts_decode() {
    let inst = three_job_instance();
    let genes = vec![2, 0, 1, 0, 2, 1, 0];
    let solution = decode(&inst, &genes);

    assert_eq!(encode(&solution), genes);
  }

  #[test]
  fn crossover_preserves_job_multiset() {
    let inst = three_job_instance();
    let expected = job_counts(&base_genes(&inst), inst.n_jobs());

    for seed in 1..30 {
      let mut rng = ChaChaRng::seed_from_u64(seed);
      let parent1 = generate_random_solution(&inst, &mut rng);
      let parent2 = generate_random_solution(&inst, &mut rng);

      let child = order_crossover(&inst, &parent1, &parent2, &mut rng);

      assert_eq!(job_counts(&encode(&child), inst.n_jobs()), expected);
      assert_precedence_consistent(&child, &inst);
    }
  }

  #[test]
  fn mutation_preserves_job_multiset() {
    let inst = three_job_instance();
    let expected = job_counts(&base_genes(&inst), inst.n_jobs());
    let mut rng = ChaChaRng::seed_from_u64(11);

    let mut solution = generate_random_solution(&inst, &mut rng);
    for _ in 0..20 {
      mutate_swap(&inst, &mut solution, &mut rng);
      assert_eq!(job_counts(&encode(&solution), inst.n_jobs()), expected);
      assert_precedence_consistent(&solution, &inst);
    }
  }

  #[test]
  fn tournament_returns_population_member() {
    let inst = crossing_instance();
    let mut rng = ChaChaRng::seed_from_u64(3);
    let population = generate_population(&inst, 8, &mut rng);

    let winner = tournament_selection(&inst, &population, 4, &mut rng);

    assert!(population.iter().any(|member| member.order == winner.order));
  }

  #[test]
  fn fixed_seed_reproduces_identical_solution() {
    let inst = three_job_instance();

    let first = find_solution(&inst, &config(42));
    let second = find_solution(&inst, &config(42));

    assert_eq!(first, second);
  }

  #[test]
  fn result_is_feasible_and_bounded_by_optimum() {
    let inst = crossing_instance();
    let solution = find_solution(&inst, &config(42));
    let optimum = exact::find_solution(&inst);

    verify_solution(&inst, &solution).expect("Verification failed");
    assert!(solution.makespan >= optimum.makespan);
  }

  #[test]
  fn zero_operations_yield_empty_solution() {
    let inst = Instance::with_zero_transport(Vec::new(), 1);
    let solution = find_solution(&inst, &config(1));

    assert!(solution.is_empty());
    assert_eq!(solution.makespan, 0);
  }

  #[test]
  fn independent_jobs_reach_longest_duration() {
    let jobs = vec![Job::new(0, &[(0, 5)]), Job::new(1, &[(1, 7)])];
    let inst = Instance::with_zero_transport(jobs, 2);

    assert_eq!(find_solution(&inst, &config(5)).makespan, 7);
  }
}
