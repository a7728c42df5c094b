fn main() {
    std::process::exit(match life_forge_app::run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    });
}
