use std::{error::Error, fs, io::Read};

use ll_slr_helper::{load_grammars, Analysis, AnalysisConfig, Grammar, ParserKind, TableParser};
use log::{info, warn};

fn print_help() {
    println!("Usage: ll-slr-helper outputs [options] [grammar file]");
    println!("outputs:");
    println!("  prod: Productions");
    println!("  ff: Nullable, first and follow");
    println!("  ll1: LL(1) parsing table");
    println!("  lr0fsm: LR(0) Automata");
    println!("  slr1table: SLR(1) parsing table");
    println!("options:");
    println!("  -h: Print this help");
    println!("  -l: Print in LaTeX format");
    println!("  -j: Print in JSON format");
    println!("  -p <input>: Parse input and print the trace");
    println!("  -m <ll1|slr1>: Parser used by -p");
    println!("  -g <n>: Grammar to use from a file holding several");
    println!("  --config <file>: Analysis limits as JSON");
}

enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

macro_rules! print_output {
    ($t:expr, $format:expr) => {{
        let t = $t;
        println!(
            "{}",
            match $format {
                OutputFormat::Plain => t.to_plaintext(),
                OutputFormat::LaTeX => t.to_latex(),
                OutputFormat::JSON => serde_json::to_string(&t)?,
            }
        );
    }};
}

/// A file starting with a grammar count holds several grammars.
fn is_counted_format(input: &str) -> bool {
    input
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().parse::<usize>().is_ok())
        .unwrap_or(false)
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, Box<dyn Error>> {
    args.get(i)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("{} needs a value", flag).into())
}

fn run() -> Result<(), Box<dyn Error>> {
    const OUTPUTS: [&str; 5] = ["prod", "ff", "ll1", "lr0fsm", "slr1table"];

    let args = std::env::args().skip(1).collect::<Vec<String>>();
    let mut outputs: Vec<&str> = Vec::new();
    let mut i: usize = 0;
    while i < args.len() && OUTPUTS.contains(&args[i].as_str()) {
        outputs.push(args[i].as_str());
        i += 1;
    }

    let mut output_format = OutputFormat::Plain;
    let mut parse_input: Option<&str> = None;
    let mut mode: Option<ParserKind> = None;
    let mut grammar_index: usize = 0;
    let mut config = AnalysisConfig::default();

    while i < args.len() && args[i].starts_with('-') {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-l" => output_format = OutputFormat::LaTeX,
            "-j" => output_format = OutputFormat::JSON,
            "-p" => {
                i += 1;
                parse_input = Some(next_value(&args, i, "-p")?);
            }
            "-m" => {
                i += 1;
                mode = Some(next_value(&args, i, "-m")?.parse()?);
            }
            "-g" => {
                i += 1;
                grammar_index = next_value(&args, i, "-g")?.parse()?;
            }
            "--config" => {
                i += 1;
                config = AnalysisConfig::from_json(&fs::read_to_string(next_value(
                    &args, i, "--config",
                )?)?)?;
            }
            other => return Err(format!("unknown option {}", other).into()),
        }
        i += 1;
    }

    if i + 1 < args.len() || (outputs.is_empty() && parse_input.is_none()) {
        print_help();
        return Ok(());
    }

    let input: String = if i == args.len() {
        let mut buf = String::new();
        std::io::stdin().lock().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(args[i].as_str())?
    };

    let g = if is_counted_format(&input) {
        let mut grammars = load_grammars(&input)?;
        info!("loaded {} grammars", grammars.len());
        if grammar_index >= grammars.len() {
            return Err(format!(
                "grammar {} requested, the file holds {}",
                grammar_index,
                grammars.len()
            )
            .into());
        }
        grammars.swap_remove(grammar_index)
    } else {
        Grammar::parse(&input)?
    };

    let analysis = Analysis::new(&g, config)?;

    for output in outputs {
        match output {
            "prod" => print_output!(g.to_production_output_vec(), output_format),
            "ff" => print_output!(
                g.to_non_terminal_output_vec(&analysis.first, &analysis.follow),
                output_format
            ),
            "ll1" => print_output!(g.to_ll1_parsing_table(&analysis.ll1_table), output_format),
            "lr0fsm" => print_output!(analysis.automaton.to_output(&g), output_format),
            "slr1table" => print_output!(analysis.slr1_table.to_output(&g), output_format),
            _ => {}
        }
    }

    if let Some(text) = parse_input {
        let classification = analysis.classify();
        let kind = match mode {
            Some(kind) => kind,
            None => classification
                .preferred(None)
                .ok_or("the grammar is neither LL(1) nor SLR(1)")?,
        };

        let parser = analysis.parser(kind);
        if parser.conflict_count() > 0 {
            warn!(
                "{:?} table has {} conflicts, the first entry of each cell is used",
                parser.kind(),
                parser.conflict_count()
            );
        }
        print_output!(
            g.to_trace_output(&analysis.parse_str(kind, text)),
            output_format
        );
    }

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
