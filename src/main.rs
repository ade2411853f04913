//! alfred-workflow authoring CLI.

fn main() {
    alfred_workflow::logging::init();

    if let Err(e) = alfred_workflow::cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
