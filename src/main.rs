use std::{io, process::ExitCode};

use rowmul::{common, DotProduct, Orchestrator};

fn main() -> ExitCode {
    let config = rowmul::get_config();
    rowmul::init_logging(&config);

    // Both inputs live in this frame for the whole computation
    let (a, b) = common::fixed_inputs();

    let mut orchestrator = Orchestrator::new(config.strategy());
    let stdout = io::stdout();

    match orchestrator.run(&a, &b, &DotProduct, &mut stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
