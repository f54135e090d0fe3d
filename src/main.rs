use std::{env, path::PathBuf, process};

use violet::{
    init_tracing,
    runtime::driver::{run_file, RunOptions, EXIT_FAILURE},
};

fn main() {
    let mut file = None;
    let mut debug = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--debug" => debug = true,
            _ if file.is_none() => file = Some(PathBuf::from(arg)),
            _ => usage(),
        }
    }

    let Some(file) = file else { usage() };

    init_tracing();

    let options = RunOptions::from_env(debug);
    process::exit(run_file(&file, &options));
}

fn usage() -> ! {
    eprintln!("usage: violet <file> [--debug]");
    process::exit(EXIT_FAILURE);
}
