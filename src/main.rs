//! Text-command engine: reads order commands from a file or stdin and
//! writes trades, acks, and book snapshots to stdout.

use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use matchbook::{CsvParser, MatchingEngine};

fn main() -> ExitCode {
    let mut engine = MatchingEngine::new();
    let mut parser = CsvParser::new(&mut engine);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match std::env::args().nth(1) {
        Some(path) => match File::open(&path) {
            Ok(file) => parser.process_stream(BufReader::new(file), &mut out),
            Err(e) => {
                eprintln!("Error: cannot open file '{path}': {e}");
                return ExitCode::from(1);
            }
        },
        None => parser.process_stream(io::stdin().lock(), &mut out),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
