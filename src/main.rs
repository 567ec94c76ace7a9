fn main() {
    clientgen::init_tracing();
    let code = clientgen::run_cli(std::env::args().collect());
    std::process::exit(code);
}
