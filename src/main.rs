fn main() {
    if let Err(err) = uiforms_lib::run() {
        eprintln!("uiforms: {err:#}");
        std::process::exit(1);
    }
}
