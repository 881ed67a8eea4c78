use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::eyre;

use revsynth::bdd::Bdd;
use revsynth::circuit::Circuit;
use revsynth::embed::{embed, EmbedSettings, EmbedSource};
use revsynth::exact::{quantified_exact_synthesis, ExactOutcome, ExactSettings};
use revsynth::function::BooleanFunction;
use revsynth::permutation::Permutation;
use revsynth::rcbdd::Rcbdd;
use revsynth::tbs::{
    symbolic_transformation_based_synthesis, symbolic_transformation_based_synthesis_sat,
    transformation_based_synthesis, SatInput, SatTbsSettings, SymbolicTbsSettings, TbsSettings,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Reversible logic synthesis")]
struct Cli {
    /// Truth table: the image of every input pattern, comma-separated (decimal or 0x hex).
    #[arg(value_name = "TABLE", value_delimiter = ',', value_parser = parse_word, required = true)]
    table: Vec<u64>,

    /// Number of inputs. The table is embedded first if it is not a permutation.
    #[arg(long, value_name = "INT")]
    inputs: Option<usize>,

    /// Number of outputs (defaults to the number of inputs).
    #[arg(long, value_name = "INT")]
    outputs: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Transformation-based synthesis.
    Tbs {
        /// Representation used during synthesis.
        #[arg(long, value_enum, default_value = "explicit")]
        method: Method,

        /// Choose the closer side per row (explicit only).
        #[arg(long)]
        bidirectional: bool,

        /// Emit Fredkin gates for two-bit swaps.
        #[arg(long)]
        fredkin: bool,

        /// Fold emitted gates into earlier ones where possible (explicit only, needs --fredkin).
        #[arg(long)]
        lookback: bool,

        /// Encode the relation through an AIG (sat only).
        #[arg(long)]
        cnf_from_aig: bool,

        /// Keep retired constraints as assumptions (sat only).
        #[arg(long)]
        all_assumptions: bool,
    },

    /// Exact synthesis of a minimal circuit.
    Exact {
        #[arg(long, value_name = "INT", default_value = "20")]
        max_depth: usize,

        /// Allow negative controls.
        #[arg(long)]
        negative: bool,

        /// Print every minimal circuit.
        #[arg(long)]
        all_solutions: bool,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Method {
    Explicit,
    Bdd,
    Sat,
}

fn parse_word(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let result = match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    result.map_err(|e| format!("invalid value {:?}: {}", s, e))
}

fn load(args: &Cli) -> color_eyre::Result<(Permutation, Option<Circuit>)> {
    let size = args.table.len();
    if !size.is_power_of_two() {
        return Err(eyre!("table size {} is not a power of two", size));
    }
    let inputs = args.inputs.unwrap_or(size.trailing_zeros() as usize);
    let outputs = args.outputs.unwrap_or(inputs);
    let rows = args.table.iter().map(|&y| Some(y)).collect();
    let function = BooleanFunction::new(inputs, outputs, rows)?;

    if let Some(permutation) = function.to_permutation() {
        return Ok((permutation, None));
    }

    let embedding = embed(EmbedSource::Table(&function), &EmbedSettings::default())?;
    println!(
        "embedded into {} lines ({} additional), {}",
        embedding.lines, embedding.additional_lines, embedding.statistics
    );
    let template = embedding.circuit_template()?;
    let permutation = embedding
        .permutation
        .ok_or_else(|| eyre!("embedding did not produce a permutation"))?;
    Ok((permutation, Some(template)))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let (permutation, template) = load(&args)?;
    println!("permutation = {}", permutation);

    let circuit = match args.command {
        Command::Tbs {
            method,
            bidirectional,
            fredkin,
            lookback,
            cnf_from_aig,
            all_assumptions,
        } => {
            let bdd = Bdd::default();
            let (circuit, stats) = match method {
                Method::Explicit => {
                    let settings = TbsSettings {
                        bidirectional,
                        fredkin,
                        fredkin_lookback: lookback,
                        template,
                    };
                    transformation_based_synthesis(&permutation, &settings)?
                }
                Method::Bdd => {
                    let rcbdd = Rcbdd::from_permutation(&bdd, &permutation)?;
                    let settings = SymbolicTbsSettings { fredkin, template };
                    symbolic_transformation_based_synthesis(&rcbdd, &settings)?
                }
                Method::Sat => {
                    let rcbdd = Rcbdd::from_permutation(&bdd, &permutation)?;
                    let settings = SatTbsSettings {
                        cnf_from_aig,
                        all_assumptions,
                        template,
                    };
                    symbolic_transformation_based_synthesis_sat(SatInput::Relation(&rcbdd), &settings)?
                }
            };
            println!("{:?}: {}", method, stats);
            circuit
        }
        Command::Exact {
            max_depth,
            negative,
            all_solutions,
        } => {
            let settings = ExactSettings {
                max_depth,
                negative,
                all_solutions,
                template,
            };
            match quantified_exact_synthesis(&permutation, &settings)? {
                ExactOutcome::Found(solution) => {
                    println!("{} minimal circuit(s), {}", solution.num_circuits, solution.statistics);
                    for (i, other) in solution.solutions.iter().flatten().enumerate() {
                        println!("solution #{}:\n{}", i, other);
                    }
                    solution.circuit
                }
                ExactOutcome::NotFound { max_depth } => {
                    println!("No circuit with at most {} gates", max_depth);
                    return Ok(());
                }
            }
        }
    };

    assert!(circuit.realizes(&permutation));
    println!("{}", circuit);

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
