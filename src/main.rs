fn main() {
    hostswitch::logging::init();
    if let Err(e) = hostswitch::cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
