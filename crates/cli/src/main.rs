fn main() {
    if let Err(err) = codenav_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
