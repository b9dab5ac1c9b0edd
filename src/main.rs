#[macro_use]
extern crate log;

use clap::{App, Arg};
use jobshop::parser::parse_instance;
use jobshop::solver::{calculate_makespan, exact, genetic, greedy, print_solution, verify_solution};
use std::fs;

// The exact solver is exponential; refuse instances past this operation
// count instead of letting the search run away.
const EXACT_MAX_OPS: usize = 25;

fn main() {
  env_logger::init();

  let matches = App::new("jobshop")
    .version("1.0")
    .about("Solvers for the job shop scheduling problem with transport times")
    .arg(
      Arg::with_name("instance")
        .long("instance")
        .help("Instance file name")
        .takes_value(true)
        .required(true),
    )
    .arg(
      Arg::with_name("solver")
        .long("solver")
        .help("Solver to use")
        .possible_values(&["greedy", "exact", "genetic"])
        .takes_value(true)
        .required(true),
    )
    .arg(
      Arg::with_name("seed")
        .long("seed")
        .help("Seed for rng; 0 derives a seed from the clock")
        .takes_value(true)
        .default_value("0"),
    )
    .arg(
      Arg::with_name("population-size")
        .long("population-size")
        .help("Population size for the genetic solver")
        .takes_value(true)
        .default_value("30"),
    )
    .arg(
      Arg::with_name("generations")
        .long("generations")
        .help("Generation count for the genetic solver")
        .takes_value(true)
        .default_value("100"),
    )
    .arg(
      Arg::with_name("tournament-size")
        .long("tournament-size")
        .help("Tournament size for the genetic solver")
        .takes_value(true)
        .default_value("3"),
    )
    .arg(
      Arg::with_name("mutation-probability")
        .long("mutation-probability")
        .help("Per-child mutation probability for the genetic solver")
        .takes_value(true)
        .default_value("0.2"),
    )
    .get_matches();

  let solver = matches.value_of("solver").expect("Missing solver");
  let file = matches.value_of("instance").expect("Missing instance file");
  let seed: u64 = matches
    .value_of("seed")
    .and_then(|m| m.parse().ok())
    .expect("Invalid seed");

  let contents = fs::read_to_string(file).expect("Error reading file");
  let instance = parse_instance(&contents).expect("Error parsing file");

  let mut solution = match solver {
    "greedy" => greedy::find_solution(&instance),
    "exact" => {
      if instance.n_ops() > EXACT_MAX_OPS {
        error!(
          "Instance has {} operations, exact solver is limited to {}",
          instance.n_ops(),
          EXACT_MAX_OPS
        );
        std::process::exit(1);
      }
      exact::find_solution(&instance)
    }
    "genetic" => {
      let config = genetic::Config {
        population_size: matches
          .value_of("population-size")
          .and_then(|m| m.parse().ok())
          .expect("Invalid population size"),
        generations: matches
          .value_of("generations")
          .and_then(|m| m.parse().ok())
          .expect("Invalid generation count"),
        tournament_size: matches
          .value_of("tournament-size")
          .and_then(|m| m.parse().ok())
          .expect("Invalid tournament size"),
        mutation_probability: matches
          .value_of("mutation-probability")
          .and_then(|m| m.parse().ok())
          .expect("Invalid mutation probability"),
        seed: seed,
      };
      genetic::find_solution(&instance, &config)
    }
    _ => panic!("Solver not implemented"),
  };

  if solution.is_empty() && instance.n_ops() > 0 {
    error!("No solution found");
    std::process::exit(1);
  }

  let makespan = calculate_makespan(&instance, &mut solution);
  verify_solution(&instance, &solution).expect("Verification failed");

  println!("{}", makespan);
  print_solution(&instance, &solution);
}
