//! schoolgate command line entry point

fn main() {
    if let Err(e) = schoolgate::cli::run() {
        eprintln!("{}", e);
        std::process::exit(e.code().exit_code());
    }
}
